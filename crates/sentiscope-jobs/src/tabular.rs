//! Tabular input for bulk jobs
//!
//! The batch pipeline only needs `(index, text)` rows. Reading them out of
//! an uploaded file goes through [`TabularReader`]; the bundled
//! [`CsvReader`] handles comma-separated files with RFC 4180 quoting.
//! Spreadsheet formats are not supported.

use sentiscope_core::{Error, Result};
use std::path::Path;

/// Rows read from an uploaded source, first row taken as the header
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Texts of one column with blank cells dropped, each paired with its
    /// position among the kept rows
    pub fn column_texts(&self, column: &str) -> Result<Vec<(usize, String)>> {
        let position = self
            .headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| Error::input(format!("Column \"{column}\" not found in file")))?;

        Ok(self
            .rows
            .iter()
            .filter_map(|row| row.get(position))
            .filter(|cell| !cell.trim().is_empty())
            .cloned()
            .enumerate()
            .collect())
    }
}

/// Source of tabular rows
pub trait TabularReader: Send + Sync {
    /// Read the whole table at `path`
    fn read(&self, path: &Path) -> Result<Table>;
}

/// Reader for `.csv` files
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvReader;

impl TabularReader for CsvReader {
    fn read(&self, path: &Path) -> Result<Table> {
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if !is_csv {
            return Err(Error::input(format!(
                "Unsupported file type: {} (only .csv is supported)",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        parse_csv(&content)
    }
}

/// Parse CSV text into a table.
///
/// Quoted fields may contain commas, doubled quotes and newlines. A UTF-8
/// byte order mark on the first header is ignored.
pub fn parse_csv(content: &str) -> Result<Table> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut records = parse_records(content)?.into_iter();

    let headers = match records.next() {
        Some(headers) => headers.into_iter().map(|h| h.trim().to_string()).collect(),
        None => return Err(Error::input("File is empty")),
    };

    Ok(Table {
        headers,
        rows: records.collect(),
    })
}

fn parse_records(content: &str) -> Result<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();
    let mut line = 1;

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                line += 1;
                record.push(std::mem::take(&mut field));
                push_record(&mut records, std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(Error::input(format!(
            "Unterminated quoted field starting before line {line}"
        )));
    }

    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        push_record(&mut records, record);
    }

    Ok(records)
}

/// Skip blank lines
fn push_record(records: &mut Vec<Vec<String>>, record: Vec<String>) {
    if !(record.len() == 1 && record[0].is_empty()) {
        records.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let table = parse_csv("id,reviewText\n1,Great product\n2,Bad one\n").unwrap();
        assert_eq!(table.headers, vec!["id", "reviewText"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], vec!["2", "Bad one"]);
    }

    #[test]
    fn test_parse_quoted_fields() {
        let csv = "text\r\n\"Hello, world\"\r\n\"She said \"\"wow\"\"\"\r\n\"multi\nline\"\r\n";
        let table = parse_csv(csv).unwrap();
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0][0], "Hello, world");
        assert_eq!(table.rows[1][0], "She said \"wow\"");
        assert_eq!(table.rows[2][0], "multi\nline");
    }

    #[test]
    fn test_bom_and_missing_trailing_newline() {
        let table = parse_csv("\u{feff}text\nlast row").unwrap();
        assert_eq!(table.headers, vec!["text"]);
        assert_eq!(table.rows, vec![vec!["last row".to_string()]]);
    }

    #[test]
    fn test_unterminated_quote() {
        assert!(matches!(
            parse_csv("text\n\"never closed\n"),
            Err(Error::Input(_))
        ));
    }

    #[test]
    fn test_empty_file() {
        assert!(parse_csv("").is_err());
    }

    #[test]
    fn test_column_texts_drops_blanks() {
        let table = parse_csv("id,text\n1,good\n2,\n3,   \n4,bad\n5").unwrap();
        let texts = table.column_texts("text").unwrap();
        assert_eq!(
            texts,
            vec![(0, "good".to_string()), (1, "bad".to_string())]
        );
    }

    #[test]
    fn test_missing_column() {
        let table = parse_csv("id,text\n1,good\n").unwrap();
        let err = table.column_texts("reviewText").unwrap_err();
        assert!(err.to_string().contains("reviewText"));
    }

    #[test]
    fn test_reader_rejects_spreadsheets() {
        let err = CsvReader.read(Path::new("upload.xlsx")).unwrap_err();
        assert!(matches!(err, Error::Input(_)));
    }
}
