use crate::Result;
use anyhow::bail;
use serde::{Deserialize, Serialize};

/// A raw table as produced by a `TableSource`: one header row and string cells. No cleaning
/// has been applied yet, so headers and labels may still carry stray whitespace.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S, R>(headers: impl IntoIterator<Item = S>, rows: impl IntoIterator<Item = R>) -> Result<Self>
    where
        S: Into<String>,
        R: IntoIterator<Item = S>,
    {
        let headers: Vec<String> = headers.into_iter().map(|s| s.into()).collect();
        if headers.is_empty() {
            bail!("A table needs at least one header");
        }
        let mut data = Vec::new();
        for (row_ix, row) in rows.into_iter().enumerate() {
            let values: Vec<String> = row.into_iter().map(|s| s.into()).collect();
            if values.len() > headers.len() {
                bail!(
                    "A row longer than the headers list was encountered at data row {}",
                    row_ix + 1
                );
            }
            data.push(values);
        }
        Ok(Self {
            headers,
            rows: data,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Finds a column by name, ignoring whitespace around the header.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    /// The cell at `row` and `col`. Rows shorter than the header are padded with empty cells.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
