//! Cell Values and Type Inference
//!
//! `CellValue` is what a record cell holds. `ValueParser` is the boundary to
//! the scalar type-inference routine; the placement algorithm only calls it
//! when a leaf asks for type guessing.

/// A typed value stored in a record cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl CellValue {
    /// Get the text if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

/// Converts raw leaf text into a typed value
///
/// Implementations must be total: text that cannot be typed comes back as
/// `CellValue::Text` unchanged.
pub trait ValueParser {
    fn parse(&self, text: &str) -> CellValue;
}

/// Integer, then finite float, otherwise the raw text
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultValueParser;

impl ValueParser for DefaultValueParser {
    fn parse(&self, text: &str) -> CellValue {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            if let Ok(n) = trimmed.parse::<i64>() {
                return CellValue::Integer(n);
            }
            if let Ok(f) = trimmed.parse::<f64>() {
                if f.is_finite() {
                    return CellValue::Float(f);
                }
            }
        }
        CellValue::Text(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer() {
        assert_eq!(DefaultValueParser.parse("42"), CellValue::Integer(42));
        assert_eq!(DefaultValueParser.parse(" -7 "), CellValue::Integer(-7));
    }

    #[test]
    fn test_float() {
        assert_eq!(DefaultValueParser.parse("3.5"), CellValue::Float(3.5));
        assert_eq!(DefaultValueParser.parse("1e3"), CellValue::Float(1000.0));
    }

    #[test]
    fn test_non_finite_stays_text() {
        assert_eq!(DefaultValueParser.parse("NaN"), CellValue::from("NaN"));
        assert_eq!(DefaultValueParser.parse("inf"), CellValue::from("inf"));
    }

    #[test]
    fn test_text_is_returned_untrimmed() {
        assert_eq!(DefaultValueParser.parse(" abc "), CellValue::from(" abc "));
        assert_eq!(DefaultValueParser.parse(""), CellValue::from(""));
    }

    #[test]
    fn test_integer_overflow_falls_back_to_float() {
        assert_eq!(
            DefaultValueParser.parse("99999999999999999999"),
            CellValue::Float(1e20)
        );
    }
}
