//! In-memory tables loaded from CSV, carried through the language as an
//! opaque host value.

use crate::types::HostValue;
use itertools::Itertools;
use std::fmt;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// The first record of the file names the columns.
    pub fn from_csv_file<P: AsRef<Path>>(path: P) -> Result<Self, csv::Error> {
        log::info!("Reading table from {}", path.as_ref().display());
        Self::from_csv(csv::Reader::from_path(path)?)
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, csv::Error> {
        Self::from_csv(csv::Reader::from_reader(reader))
    }

    fn from_csv<R: io::Read>(mut reader: csv::Reader<R>) -> Result<Self, csv::Error> {
        let headers = reader.headers()?.iter().map(String::from).collect();
        let rows = reader
            .records()
            .map(|record| record.map(|r| r.iter().map(String::from).collect()))
            .collect::<Result<Vec<Vec<String>>, _>>()?;
        log::debug!("Read {} rows", rows.len());
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

impl fmt::Display for Table {
    // Aligned columns, prefixed with the row index.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = std::iter::once(String::new()).chain(self.headers.iter().cloned());
        let mut lines: Vec<Vec<String>> = vec![header.collect()];
        for (index, row) in self.rows.iter().enumerate() {
            lines.push(
                std::iter::once(index.to_string())
                    .chain(row.iter().cloned())
                    .collect(),
            );
        }

        let columns = lines.iter().map(Vec::len).max().unwrap_or(0);
        let widths: Vec<usize> = (0..columns)
            .map(|c| {
                lines
                    .iter()
                    .filter_map(|line| line.get(c))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut rendered = lines.iter().map(|line| {
            line.iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{:>width$}", cell, width = width))
                .join("  ")
        });
        write!(f, "{}", rendered.join("\n"))
    }
}

impl HostValue for Table {
    fn type_name(&self) -> &'static str {
        "table"
    }

    fn info(&self) -> String {
        format!(
            "Expression that is a binding to a table with {} rows and {} columns",
            self.rows.len(),
            self.headers.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEOPLE: &str = "name,age\nana,31\nbernat,7\n";

    #[test]
    fn reads_headers_and_rows() {
        let table = Table::from_reader(PEOPLE.as_bytes()).unwrap();
        assert_eq!(table.headers(), &["name".to_string(), "age".to_string()]);
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.rows()[1], vec!["bernat".to_string(), "7".to_string()]);
    }

    #[test]
    fn renders_aligned_columns() {
        let table = Table::from_reader(PEOPLE.as_bytes()).unwrap();
        assert_eq!(
            table.to_string(),
            "     name  age\n0     ana   31\n1  bernat    7"
        );
    }

    #[test]
    fn ragged_rows_are_an_error() {
        assert!(Table::from_reader("a,b\n1\n".as_bytes()).is_err());
    }

    #[test]
    fn info_mentions_the_shape() {
        let table = Table::from_reader(PEOPLE.as_bytes()).unwrap();
        assert_eq!(
            table.info(),
            "Expression that is a binding to a table with 2 rows and 2 columns"
        );
    }
}
