use std::iter::Enumerate;
use std::str::Lines;

use tracing::trace;

use crate::document::Document;
use crate::error::{Error, Result};
use crate::util::fold_key;

/// Represents an on-going parse.
#[derive(Debug, Clone)]
pub(crate) struct Parser<'a> {
    lines: Enumerate<Lines<'a>>,
    document: Document,
    section: Option<String>,
    // The option that indented lines continue.
    option: Option<String>,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
            document: Document::default(),
            section: None,
            option: None,
        }
    }
}

impl Parser<'_> {
    /// Consumes the whole input and returns the resulting store.
    pub(crate) fn into_document(mut self) -> Result<Document> {
        while let Some((index, line)) = self.lines.next() {
            let number = index + 1;

            if is_comment(line) {
                continue;
            }

            if line.starts_with(char::is_whitespace) && self.option.is_some() {
                self.continue_option(line.trim());
            } else if line.starts_with('[') {
                self.parse_section(number, line)?;
            } else if let Some(section) = self.section.clone() {
                self.parse_section_entry(&section, number, line)?;
            } else {
                return Err(Error::MissingHeader {
                    line: number,
                    text: line.to_owned(),
                });
            }
        }

        Ok(self.document)
    }

    /// Opens (or reopens, merging entries) the section named on a `[header]` line.
    fn parse_section(&mut self, number: usize, line: &str) -> Result<()> {
        let Some((section_name, _)) = line[1..].split_once(']') else {
            return Err(Error::UnterminatedHeader {
                line: number,
                text: line.to_owned(),
            });
        };

        if section_name.is_empty() {
            return Err(Error::SectionNameEmpty { line: number });
        }

        trace!(section = section_name, line = number, "section header");
        self.document.section_mut(section_name);
        self.section = Some(section_name.to_owned());
        self.option = None;

        Ok(())
    }

    fn parse_section_entry(&mut self, section: &str, number: usize, line: &str) -> Result<()> {
        let (key, value) = match line.find(['=', ':']) {
            Some(delimiter) => (&line[..delimiter], Some(&line[delimiter + 1..])),
            None => (line, None),
        };

        if key.is_empty() || key.starts_with(char::is_whitespace) {
            return Err(Error::InvalidLine {
                line: number,
                text: line.to_owned(),
            });
        }

        let key = fold_key(key.trim_end());
        let value = value.map(normalize_value);

        self.document.set_option(section, key.clone(), value);
        self.option = Some(key);

        Ok(())
    }

    fn continue_option(&mut self, value: &str) {
        if value.is_empty() {
            return;
        }

        let (Some(section), Some(key)) = (&self.section, &self.option) else {
            return;
        };

        let entries = self.document.section_mut(section);
        if let Some(slot) = entries.get_mut(key) {
            match slot {
                Some(existing) => {
                    existing.push('\n');
                    existing.push_str(value);
                }
                None => *slot = Some(value.to_owned()),
            }
        }
    }
}

fn is_comment(line: &str) -> bool {
    if line.trim().is_empty() || line.starts_with(['#', ';']) {
        return true;
    }

    line.starts_with(['r', 'R'])
        && line
            .split_whitespace()
            .next()
            .is_some_and(|word| word.eq_ignore_ascii_case("rem"))
}

/// Trims the value and strips an inline `;` comment when whitespace precedes it.
fn normalize_value(value: &str) -> String {
    let mut value = value.trim_start();

    if let Some(i) = value.find(';') {
        if value[..i].ends_with(char::is_whitespace) {
            value = &value[..i];
        }
    }

    match value.trim() {
        "\"\"" => String::new(),
        value => value.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn parse(text: &str) -> Result<Document> {
        Parser::new(text).into_document()
    }

    #[test]
    fn multiple_keys_and_values() {
        let document = parse("[Section]\nkey1 = value1\nkey2:value2\nkey3   =   value3  \n")
            .expect("failed to parse hardcoded document");
        assert_eq!(
            document.render(),
            "[Section]\nkey1 = value1\nkey2 = value2\nkey3 = value3\n\n"
        );
    }

    #[test]
    fn comments_are_skipped() {
        let document = parse(
            "# leading comment\n; another\n\n[Section] ; trailing text\nrem not a key\nREM nor this\nkey = value ; inline comment\nurl = a;b\n",
        )
        .expect("failed to parse hardcoded document");

        assert_eq!(document.option("Section", "key").unwrap(), "value");
        assert_eq!(document.option("Section", "url").unwrap(), "a;b");
        assert_eq!(document.entries("Section").unwrap().len(), 2);
    }

    #[test]
    fn leading_semicolon_is_part_of_the_value() {
        let document = parse("[Section]\nk = ;x\nj =  ;y ; comment\n")
            .expect("failed to parse hardcoded document");

        assert_eq!(document.option("Section", "k").unwrap(), ";x");
        // Only the first `;` is considered.
        assert_eq!(document.option("Section", "j").unwrap(), ";y ; comment");
    }

    #[test]
    fn multiple_sections_merge_duplicates() {
        let document = parse("[one]\na = 1\n[two]\nb = 2\n[one]\nc = 3\na = 4\n")
            .expect("failed to parse hardcoded document");

        assert_eq!(document.section_names(), ["one", "two"]);
        assert_eq!(document.render(), "[one]\na = 4\nc = 3\n\n[two]\nb = 2\n\n");
    }

    #[test]
    fn continuation_lines() {
        let document = parse("[Section]\nkey = first\n  second\n\n\tthird\nnext = x\n")
            .expect("failed to parse hardcoded document");

        assert_eq!(
            document.option("Section", "key").unwrap(),
            "first\nsecond\nthird"
        );
        assert_eq!(document.option("Section", "next").unwrap(), "x");
    }

    #[test]
    fn keys_are_folded_and_values_kept() {
        let document = parse("[Section]\nMixedCase = Keep Me\nempty = \"\"\nbare\r\n")
            .expect("failed to parse hardcoded document");

        assert_eq!(document.option("Section", "mixedcase").unwrap(), "Keep Me");
        assert_eq!(document.option("Section", "empty").unwrap(), "");
        assert!(document.has_option("Section", "bare"));
        assert_eq!(document.render(), "[Section]\nmixedcase = Keep Me\nempty = \nbare\n\n");
    }

    #[test]
    fn missing_header() {
        let err = parse("\n# comment\nkey = val\n[section1]\n").unwrap_err();

        assert!(matches!(err, Error::MissingHeader { line: 3, ref text } if text == "key = val"));
    }

    #[test]
    fn malformed_headers() {
        assert!(matches!(
            parse("[]\n").unwrap_err(),
            Error::SectionNameEmpty { line: 1 }
        ));
        assert!(matches!(
            parse("[a]\n[broken\n").unwrap_err(),
            Error::UnterminatedHeader { line: 2, .. }
        ));
    }

    #[test]
    fn line_without_key() {
        let err = parse("[Section]\n= value\n").unwrap_err();

        assert!(matches!(err, Error::InvalidLine { line: 2, .. }));
    }

    #[test]
    fn indented_line_without_open_option() {
        let err = parse("[Section]\n  key = value\n").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Syntax);
    }
}
