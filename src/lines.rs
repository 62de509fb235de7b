//! Plain line I/O and line classification shared by both pipelines.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::{Result, VaryError};

static NAME_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w']+").expect("name token pattern is valid"));

/// A line is numeric data when its first whitespace-delimited token starts
/// with a decimal digit.
pub fn is_data_line(line: &str) -> bool {
    line.split_whitespace()
        .next()
        .and_then(|token| token.chars().next())
        .is_some_and(|c| c.is_ascii_digit())
}

/// Parse every token after the leading row label as a float.
pub fn parse_values(line: &str, path: &Path, line_idx: usize) -> Result<Vec<f64>> {
    line.split_whitespace()
        .skip(1)
        .map(|token| parse_number(token, path, line_idx))
        .collect()
}

pub fn parse_number(token: &str, path: &Path, line_idx: usize) -> Result<f64> {
    token.parse::<f64>().map_err(|_| VaryError::InvalidNumber {
        path: path.to_path_buf(),
        line: line_idx + 1,
        token: token.to_string(),
    })
}

/// Split a delimited list of names on anything that is not a word character
/// or an apostrophe.
pub fn parse_name_list(raw: &str) -> Vec<String> {
    NAME_TOKEN
        .find_iter(raw)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Lines of a text file without their terminators. `\r\n` and `\n` both end
/// a line; a missing final newline is not recorded.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let bytes = fs::read(path).map_err(|e| VaryError::io(path, e))?;
    let raw = String::from_utf8(bytes).map_err(|e| {
        let valid = e.utf8_error().valid_up_to();
        let line = e.as_bytes()[..valid].iter().filter(|&&b| b == b'\n').count() + 1;
        VaryError::InvalidUtf8 {
            path: path.to_path_buf(),
            line,
        }
    })?;
    Ok(raw.lines().map(str::to_string).collect())
}

/// Newline-delimited name list; blank lines are ignored.
pub fn read_name_file(path: &Path) -> Result<Vec<String>> {
    Ok(read_lines(path)?
        .into_iter()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect())
}

/// Output buffer of one varied file.
#[derive(Debug, Clone, PartialEq)]
pub struct VariedLines {
    pub lines: Vec<String>,
    /// Number of lines that were rewritten.
    pub varied: usize,
}

impl VariedLines {
    pub fn write_to(&self, path: &Path) -> Result<()> {
        write_lines(path, &self.lines)
    }
}

pub fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    let mut payload = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in lines {
        payload.push_str(line);
        payload.push('\n');
    }
    fs::write(path, payload).map_err(|e| VaryError::io(path, e))
}
