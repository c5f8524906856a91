use indexmap::IndexMap;

use crate::error::{Error, Result};

/// Options of one section, in insertion order. `None` marks a valueless option.
pub(crate) type Entries = IndexMap<String, Option<String>>;

/// The ordered key/value store behind a [`Config`](crate::Config).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Document {
    sections: IndexMap<String, Entries>,
}

impl Document {
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.sections.len()
    }

    pub(crate) fn has_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    pub(crate) fn section_names(&self) -> Vec<String> {
        self.sections.keys().cloned().collect()
    }

    /// Returns the entries of `name`, creating an empty section when it does not exist yet.
    pub(crate) fn section_mut(&mut self, name: &str) -> &mut Entries {
        // `entry` would need an owned key even when the section is already there.
        if !self.sections.contains_key(name) {
            self.sections.insert(name.to_owned(), Entries::new());
        }

        &mut self.sections[name]
    }

    pub(crate) fn entries(&self, name: &str) -> Result<&Entries> {
        self.sections
            .get(name)
            .ok_or_else(|| Error::SectionNotFound {
                section: name.to_owned(),
            })
    }

    pub(crate) fn remove_section(&mut self, name: &str) -> bool {
        self.sections.shift_remove(name).is_some()
    }

    pub(crate) fn has_option(&self, section: &str, key: &str) -> bool {
        self.sections
            .get(section)
            .is_some_and(|entries| entries.contains_key(key))
    }

    /// Looks up the stored text of an option; valueless options read as the empty string.
    pub(crate) fn option(&self, section: &str, key: &str) -> Result<&str> {
        self.entries(section)?
            .get(key)
            .map(|value| value.as_deref().unwrap_or_default())
            .ok_or_else(|| Error::OptionNotFound {
                section: section.to_owned(),
                key: key.to_owned(),
            })
    }

    pub(crate) fn set_option(&mut self, section: &str, key: String, value: Option<String>) {
        self.section_mut(section).insert(key, value);
    }

    pub(crate) fn remove_option(&mut self, section: &str, key: &str) -> bool {
        self.sections
            .get_mut(section)
            .is_some_and(|entries| entries.shift_remove(key).is_some())
    }

    /// Renders every section as `[name]` followed by its body and a blank line.
    pub(crate) fn render(&self) -> String {
        let mut out = String::with_capacity(1024);

        for (name, entries) in &self.sections {
            out.push('[');
            out.push_str(name);
            out.push_str("]\n");
            render_entries(entries, &mut out);
            out.push('\n');
        }

        out
    }

    /// Renders one section exactly as [`render`](Self::render) would, minus the header line.
    pub(crate) fn render_body(&self, name: &str) -> Result<String> {
        let entries = self.entries(name)?;
        let mut out = String::with_capacity(256);

        if !entries.is_empty() {
            render_entries(entries, &mut out);
            out.push('\n');
        }

        Ok(out)
    }
}

fn render_entries(entries: &Entries, out: &mut String) {
    for (key, value) in entries {
        out.push_str(key);

        if let Some(value) = value {
            out.push_str(" = ");
            // Continuation lines must stay indented to be read back into the same value.
            out.push_str(&value.replace('\n', "\n\t"));
        }

        out.push('\n');
    }
}
