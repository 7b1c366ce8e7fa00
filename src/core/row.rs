use serde::Serialize;

/// One tab-separated row of a genomic ordered file
///
/// The first column is the chromosome and the second the 1-based position;
/// every column, including those two, is kept verbatim in `columns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub chromosome: String,
    pub position: u64,
    pub columns: Vec<String>,
}

impl Row {
    #[must_use]
    pub fn new(chromosome: impl Into<String>, position: u64, values: &[&str]) -> Self {
        let chromosome = chromosome.into();
        let mut columns = Vec::with_capacity(values.len() + 2);
        columns.push(chromosome.clone());
        columns.push(position.to_string());
        columns.extend(values.iter().map(|v| (*v).to_string()));
        Self {
            chromosome,
            position,
            columns,
        }
    }

    /// Parse a single data line
    ///
    /// # Errors
    ///
    /// Returns a message if the line has fewer than two columns or the
    /// position is not an unsigned integer.
    pub fn parse(line: &str) -> Result<Self, String> {
        let columns: Vec<String> = line.split('\t').map(str::to_string).collect();
        if columns.len() < 2 {
            return Err(format!("expected at least 2 columns, found {}", columns.len()));
        }

        let position = columns[1]
            .trim()
            .parse::<u64>()
            .map_err(|_| format!("invalid position '{}'", columns[1]))?;

        Ok(Self {
            chromosome: columns[0].clone(),
            position,
            columns,
        })
    }

    /// Render back to a tab-separated line
    #[must_use]
    pub fn to_line(&self) -> String {
        self.columns.join("\t")
    }
}
