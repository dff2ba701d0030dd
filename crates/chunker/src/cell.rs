use serde::{Deserialize, Serialize};
use std::fmt;

/// A single spreadsheet cell as it ends up in a shard file.
///
/// Serialized untagged, so a record reads as plain JSON:
/// `{"Acct No": 1234567, "Branch": "B1", "Amount": 100.5, "Remarks": null}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Cell::Int(_) | Cell::Float(_))
    }

    /// Integer text for numeric cells, fraction dropped.
    ///
    /// Floats are formatted without exponent so very long account numbers
    /// stored as floats keep every digit.
    pub fn integer_text(&self) -> Option<String> {
        match self {
            Cell::Int(i) => Some(i.to_string()),
            Cell::Float(f) if f.is_finite() => Some(format!("{:.0}", f.trunc())),
            _ => None,
        }
    }

    /// Parses a raw text field (CSV) into a typed cell.
    ///
    /// Integers with a leading zero stay text: "007" is an account number,
    /// not seven.
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim();
        if s.is_empty() {
            return Cell::Empty;
        }

        let digits = s.strip_prefix('-').unwrap_or(s);
        let leading_zero = digits.len() > 1 && digits.starts_with('0') && !digits.starts_with("0.");
        if !leading_zero {
            if let Ok(i) = s.parse::<i64>() {
                return Cell::Int(i);
            }
            if s.contains('.') {
                if let Ok(f) = s.parse::<f64>() {
                    return Cell::Float(f);
                }
            }
        }

        match s {
            "true" | "TRUE" => Cell::Bool(true),
            "false" | "FALSE" => Cell::Bool(false),
            _ => Cell::Text(raw.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::Int(i) => write!(f, "{}", i),
            Cell::Float(x) => write!(f, "{}", x),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<i64> for Cell {
    fn from(i: i64) -> Self {
        Cell::Int(i)
    }
}

impl From<f64> for Cell {
    fn from(f: f64) -> Self {
        Cell::Float(f)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Cell::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_text_drops_fraction() {
        assert_eq!(Cell::Int(1234567).integer_text().as_deref(), Some("1234567"));
        assert_eq!(Cell::Float(200123.9).integer_text().as_deref(), Some("200123"));
        assert_eq!(
            Cell::Float(12345678901234567.0).integer_text().as_deref(),
            Some("12345678901234568")
        );
        assert_eq!(Cell::Float(f64::NAN).integer_text(), None);
        assert_eq!(Cell::Text("12".into()).integer_text(), None);
    }

    #[test]
    fn test_parse_keeps_leading_zeros() {
        assert_eq!(Cell::parse("007"), Cell::Text("007".into()));
        assert_eq!(Cell::parse("42"), Cell::Int(42));
        assert_eq!(Cell::parse("0"), Cell::Int(0));
        assert_eq!(Cell::parse("100.5"), Cell::Float(100.5));
        assert_eq!(Cell::parse("0.25"), Cell::Float(0.25));
        assert_eq!(Cell::parse("  "), Cell::Empty);
        assert_eq!(Cell::parse("TRUE"), Cell::Bool(true));
        assert_eq!(Cell::parse("B1"), Cell::Text("B1".into()));
    }

    #[test]
    fn test_json_shape() {
        let cells = vec![
            Cell::Empty,
            Cell::Int(0),
            Cell::Float(100.5),
            Cell::Text("B2".into()),
        ];
        let json = serde_json::to_string(&cells).unwrap();
        assert_eq!(json, r#"[null,0,100.5,"B2"]"#);

        let back: Vec<Cell> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cells);
    }
}
