use std::fmt;

use crate::error::{Error, Result};

const TRUE_WORDS: &[&str] = &["1", "on", "yes", "true"];
const FALSE_WORDS: &[&str] = &["0", "off", "no", "false"];

/// The text of one option, with on-demand conversions to other types.
///
/// Instances are never edited in place: writing an option through its
/// [`Section`](crate::Section) replaces the cached instance instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypableOption {
    key: String,
    text: String,
}

impl TypableOption {
    #[must_use]
    pub(crate) fn new(key: String, text: String) -> Self {
        Self { key, text }
    }

    /// The (lowercased) name this option is stored under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn as_text(&self) -> &str {
        &self.text
    }

    /// Reads `1`/`on`/`yes`/`true` as `true` and `0`/`off`/`no`/`false` as `false`, ignoring case.
    pub fn as_boolean(&self) -> Result<bool> {
        parse_boolean(&self.text)
    }

    /// Reads an integer, falling back to rounding a float (half to even) so that `10.8` is `11`
    /// and `1.2e2` is `120`.
    ///
    /// When neither form parses, the error carries the integer parse failure.
    pub fn as_integer(&self) -> Result<i64> {
        let error = match self.text.parse::<i64>() {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        self.text
            .parse::<f64>()
            .ok()
            .map(f64::round_ties_even)
            .filter(|value| value.is_finite() && (i64::MIN as f64..i64::MAX as f64).contains(value))
            .map(|value| value as i64)
            .ok_or_else(|| Error::InvalidInteger {
                text: self.text.clone(),
                source: error,
            })
    }

    pub fn as_float(&self) -> Result<f64> {
        self.text
            .parse::<f64>()
            .map_err(|source| Error::InvalidFloat {
                text: self.text.clone(),
                source,
            })
    }
}

impl fmt::Display for TypableOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.text.fmt(f)
    }
}

impl AsRef<str> for TypableOption {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl PartialEq<str> for TypableOption {
    fn eq(&self, other: &str) -> bool {
        self.text == other
    }
}

impl PartialEq<&str> for TypableOption {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}

pub(crate) fn parse_boolean(text: &str) -> Result<bool> {
    let lowered = text.to_lowercase();

    if TRUE_WORDS.contains(&lowered.as_str()) {
        Ok(true)
    } else if FALSE_WORDS.contains(&lowered.as_str()) {
        Ok(false)
    } else {
        Err(Error::InvalidBoolean {
            text: text.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn option(text: &str) -> TypableOption {
        TypableOption::new("o".to_owned(), text.to_owned())
    }

    #[test]
    fn booleans() {
        for text in ["1", "on", "yes", "true", "ON", "Yes", "True"] {
            assert!(option(text).as_boolean().unwrap(), "{text} should be true");
        }

        for text in ["0", "off", "no", "false", "OFF", "No", "False"] {
            assert!(!option(text).as_boolean().unwrap(), "{text} should be false");
        }
    }

    #[test]
    fn integers() {
        assert_eq!(option("1").as_integer().unwrap(), 1);
        assert_eq!(option("-7").as_integer().unwrap(), -7);
        assert_eq!(option("10.1").as_integer().unwrap(), 10);
        assert_eq!(option("10.8").as_integer().unwrap(), 11);
        assert_eq!(option("1e2").as_integer().unwrap(), 100);
        assert_eq!(option("1.2e2").as_integer().unwrap(), 120);
        assert_eq!(option("2.5").as_integer().unwrap(), 2);
    }

    #[test]
    fn floats() {
        assert_eq!(option("1").as_float().unwrap(), 1.0);
        assert_eq!(option("1.").as_float().unwrap(), 1.0);
        assert_eq!(option("1.0").as_float().unwrap(), 1.0);
        assert_eq!(option("1.1e1").as_float().unwrap(), 11.0);
    }

    #[test]
    fn unknown_values() {
        let unknown = option("hohoho");

        for err in [
            unknown.as_boolean().unwrap_err(),
            unknown.as_integer().unwrap_err(),
            unknown.as_float().unwrap_err(),
        ] {
            assert_eq!(err.kind(), ErrorKind::ValueParse);
            assert!(err.to_string().contains("hohoho"));
        }
    }

    #[test]
    fn integer_failure_keeps_integer_error() {
        let err = option("inf").as_integer().unwrap_err();

        assert!(matches!(err, Error::InvalidInteger { ref text, .. } if text == "inf"));
        assert!(
            std::error::Error::source(&err)
                .is_some_and(|source| source.is::<std::num::ParseIntError>())
        );
    }

    #[test]
    fn compares_with_text() {
        let value = option("val1");

        assert_eq!(value, "val1");
        assert_eq!(value.to_string(), "val1");
        assert_eq!(value.key(), "o");
    }
}
