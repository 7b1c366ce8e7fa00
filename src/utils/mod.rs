pub mod fd;
pub mod validation;
