//! Fixed-width column layouts recovered from terse format descriptors.
//!
//! A descriptor line such as `(5x,4(f10.5,3x))` carries four tokens:
//!
//! * a leading pad `<N>x` (first padding token),
//! * a repeat count `<N>(`,
//! * a field spec `f<width>.<precision>` (precision defaults to 6),
//! * an inter-field pad `<N>x` (second padding token).
//!
//! Exactly two padding tokens must be present. Rendering left-justifies each
//! value inside its field, so a parsed layout reproduces the column positions
//! the downstream reader expects.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::lines::read_lines;
use crate::{Result, VaryError};

/// Precision used when the field spec carries only a width.
pub const DEFAULT_PRECISION: usize = 6;

static PAD_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)x").expect("padding pattern is valid"));
static FIELD_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)f(\d+)(?:\.(\d+))?").expect("field spec pattern is valid")
});
static REPEAT_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\(").expect("repeat pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatTemplate {
    pub leading_padding: usize,
    pub width: usize,
    pub precision: usize,
    pub inter_field_padding: usize,
    pub repeat_count: usize,
}

impl FormatTemplate {
    /// Single-field layout with no padding, used for scalar lines.
    pub fn single_field(width: usize, precision: usize) -> Self {
        Self {
            leading_padding: 0,
            width,
            precision,
            inter_field_padding: 0,
            repeat_count: 1,
        }
    }

    /// Parse one descriptor line. `table` names the table type in errors.
    pub fn parse(table: &str, descriptor: &str) -> Result<Self> {
        let fail = |reason: String| VaryError::FormatParse {
            table: table.to_string(),
            reason,
        };

        let pads: Vec<&str> = PAD_TOKEN
            .captures_iter(descriptor)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .collect();
        if pads.len() != 2 {
            return Err(fail(format!(
                "expected 2 padding tokens (<N>x), found {} in '{}'",
                pads.len(),
                descriptor.trim()
            )));
        }
        let leading_padding = parse_count(pads[0], "leading padding").map_err(&fail)?;
        let inter_field_padding = parse_count(pads[1], "inter-field padding").map_err(&fail)?;

        let field = FIELD_TOKEN.captures(descriptor).ok_or_else(|| {
            fail(format!(
                "missing field spec (f<width>.<precision>) in '{}'",
                descriptor.trim()
            ))
        })?;
        let width = parse_count(&field[1], "field width").map_err(&fail)?;
        let precision = match field.get(2) {
            Some(m) => parse_count(m.as_str(), "field precision").map_err(&fail)?,
            None => DEFAULT_PRECISION,
        };

        let repeat = REPEAT_TOKEN.captures(descriptor).ok_or_else(|| {
            fail(format!(
                "missing repeat count (<N>() in '{}'",
                descriptor.trim()
            ))
        })?;
        let repeat_count = parse_count(&repeat[1], "repeat count").map_err(&fail)?;
        if repeat_count == 0 {
            return Err(fail("repeat count must be at least 1".to_string()));
        }

        Ok(Self {
            leading_padding,
            width,
            precision,
            inter_field_padding,
            repeat_count,
        })
    }

    /// Parse the last line of a descriptor file.
    pub fn from_descriptor_file(table: &str, path: &Path) -> Result<Self> {
        let lines = read_lines(path)?;
        let last = lines.last().ok_or_else(|| VaryError::FormatParse {
            table: table.to_string(),
            reason: format!("descriptor file {} is empty", path.display()),
        })?;
        Self::parse(table, last)
    }

    /// Render up to `repeat_count` values into one fixed-width line.
    ///
    /// A short final row renders only the values it has.
    pub fn render(&self, values: &[f64]) -> Result<String> {
        if values.len() > self.repeat_count {
            return Err(VaryError::TooManyValues {
                capacity: self.repeat_count,
                got: values.len(),
            });
        }

        let mut line = " ".repeat(self.leading_padding);
        for value in values {
            // Writing into a String cannot fail.
            let _ = write!(
                line,
                "{value:<width$.precision$}",
                width = self.width,
                precision = self.precision
            );
            line.extend(std::iter::repeat(' ').take(self.inter_field_padding));
        }
        Ok(line)
    }
}

fn parse_count(raw: &str, what: &str) -> std::result::Result<usize, String> {
    raw.parse::<usize>()
        .map_err(|_| format!("{what} '{raw}' is not a valid count"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_standard_descriptor() {
        let template = FormatTemplate::parse("core", "(5x,4(f10.5,3x))").unwrap();
        assert_eq!(
            template,
            FormatTemplate {
                leading_padding: 5,
                width: 10,
                precision: 5,
                inter_field_padding: 3,
                repeat_count: 4,
            }
        );
    }

    #[test]
    fn test_render_round_trip() {
        let template = FormatTemplate::parse("core", "(5x,4(f10.5,3x))").unwrap();
        let line = template.render(&[1.0, 2.0, 3.0, 4.0]).unwrap();

        let expected = format!(
            "{}{}",
            " ".repeat(5),
            ["1.00000", "2.00000", "3.00000", "4.00000"]
                .iter()
                .map(|v| format!("{v:<10}   "))
                .collect::<String>()
        );
        assert_eq!(line, expected);

        let parsed: Vec<f64> = line
            .split_whitespace()
            .map(|t| t.parse().unwrap())
            .collect();
        assert_eq!(parsed, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_render_rounds_to_precision() {
        let template = FormatTemplate::parse("t", "1x,2(f8.3,1x)").unwrap();
        let line = template.render(&[1.23456, -0.5]).unwrap();
        assert_eq!(line, " 1.235    -0.500   ");
    }

    #[test]
    fn test_width_only_field_uses_default_precision() {
        let template = FormatTemplate::parse("t", "2x,3(f12,1x)").unwrap();
        assert_eq!(template.width, 12);
        assert_eq!(template.precision, DEFAULT_PRECISION);
    }

    #[test]
    fn test_short_row_renders_available_values() {
        let template = FormatTemplate::parse("t", "(0x,3(f6.2,1x))").unwrap();
        assert_eq!(template.render(&[1.0]).unwrap(), "1.00   ");
    }

    #[test]
    fn test_too_many_values_rejected() {
        let template = FormatTemplate::parse("t", "(0x,2(f6.2,1x))").unwrap();
        assert!(matches!(
            template.render(&[1.0, 2.0, 3.0]),
            Err(VaryError::TooManyValues {
                capacity: 2,
                got: 3
            })
        ));
    }

    #[test]
    fn test_missing_tokens_name_the_table() {
        let cases = [
            "(4(f10.5,3x))",      // one padding token
            "(5x,4(f10.5,3x,2x))", // three padding tokens
            "(5x,4(e10.5,3x))",   // no field spec
            "(5x,f10.5,3x)",      // no repeat count
            "(5x,0(f10.5,3x))",   // zero repeat
            "",
        ];
        for descriptor in cases {
            match FormatTemplate::parse("reflector", descriptor) {
                Err(VaryError::FormatParse { table, .. }) => assert_eq!(table, "reflector"),
                other => panic!("expected FormatParse for '{descriptor}', got {other:?}"),
            }
        }
    }

    #[test]
    fn test_descriptor_file_uses_last_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("core.def");
        std::fs::write(&path, "header 9x\nother\n(2x,3(f9.4,1x))\n").unwrap();
        let template = FormatTemplate::from_descriptor_file("core", &path).unwrap();
        assert_eq!(template.leading_padding, 2);
        assert_eq!(template.repeat_count, 3);
    }

    #[test]
    fn test_empty_descriptor_file_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("core.def");
        std::fs::write(&path, "").unwrap();
        assert!(matches!(
            FormatTemplate::from_descriptor_file("core", &path),
            Err(VaryError::FormatParse { .. })
        ));
    }
}
