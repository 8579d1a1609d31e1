//! Input lists: DUNS lists and identity resolution criteria.

use std::path::Path;

use crate::errors::{AppError, ResultExt};

/// Criteria of one identity resolution request, in column order.
pub type Criteria = Vec<(String, String)>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputFile {
    /// A file whose first line is `duns`: one DUNS per line.
    Duns(Vec<String>),
    /// A `|` delimited table, the first line naming the columns.
    Criteria(Vec<Criteria>),
}

/// Normalizes a DUNS: the legacy `XX-XXX-XXXX` form is collapsed and short
/// numbers are left-padded with zeros. Returns `None` for anything longer
/// than nine characters or containing non-digits.
pub fn clean_duns(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let collapsed = if bytes.len() == 11 && bytes[2] == b'-' && bytes[6] == b'-' {
        format!("{}{}{}", &input[..2], &input[3..6], &input[7..])
    } else {
        input.to_string()
    };

    if collapsed.len() > 9 || !collapsed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(format!("{:0>9}", collapsed))
}

/// Parses the content of an input file. Blank lines are ignored; invalid
/// DUNS are dropped with a warning.
pub fn parse_input(content: &str) -> InputFile {
    let mut lines = content.lines().map(str::trim).filter(|line| !line.is_empty());
    let header = lines.next().unwrap_or_default();

    if header == "duns" {
        let duns = lines
            .filter_map(|line| {
                let cleaned = clean_duns(line);
                if cleaned.is_none() {
                    tracing::warn!("⚠ Skipping invalid DUNS {}", line);
                }
                cleaned
            })
            .collect();
        return InputFile::Duns(duns);
    }

    let columns: Vec<&str> = header.split('|').collect();
    let rows = lines
        .map(|line| {
            columns
                .iter()
                .zip(line.split('|'))
                .map(|(column, value)| (column.to_string(), value.to_string()))
                .collect()
        })
        .collect();

    InputFile::Criteria(rows)
}

pub fn read_input_file(path: &Path) -> Result<InputFile, AppError> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading input file {}", path.display()))?;

    Ok(parse_input(&content))
}
