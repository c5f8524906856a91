use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::document::Document;
use crate::error::{Error, Result};
use crate::option::TypableOption;
use crate::util::fold_key;

/// A view over one named section of a [`Config`](crate::Config).
///
/// The section does not need to exist in the document: it is created there on the first
/// [`set`](Self::set). Every option read through [`get`](Self::get) is cached, so repeated
/// reads of an unchanged option hand out the same [`Rc`].
#[derive(Debug)]
pub struct Section {
    document: Weak<RefCell<Document>>,
    name: String,
    options: RefCell<HashMap<String, Rc<TypableOption>>>,
}

impl Section {
    #[must_use]
    pub(crate) fn new(document: Weak<RefCell<Document>>, name: String) -> Self {
        Self {
            document,
            name,
            options: RefCell::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn document(&self) -> Result<Rc<RefCell<Document>>> {
        self.document.upgrade().ok_or_else(|| Error::Detached {
            section: self.name.clone(),
        })
    }

    /// Whether the section currently exists in its document.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.document
            .upgrade()
            .is_some_and(|document| document.borrow().has_section(&self.name))
    }

    #[must_use]
    pub fn has_option(&self, key: &str) -> bool {
        self.document
            .upgrade()
            .is_some_and(|document| document.borrow().has_option(&self.name, &fold_key(key)))
    }

    pub fn get(&self, key: &str) -> Result<Rc<TypableOption>> {
        let key = fold_key(key);
        let document = self.document()?;
        let document = document.borrow();

        let text = match document.option(&self.name, &key) {
            Ok(text) => text,
            Err(error) => {
                self.options.borrow_mut().remove(&key);
                return Err(error);
            }
        };

        let mut options = self.options.borrow_mut();

        // Another view over the same stored section may have rewritten the text.
        if let Some(option) = options.get(&key).filter(|option| option.as_text() == text) {
            return Ok(Rc::clone(option));
        }

        trace!(section = %self.name, key, "caching option");
        let option = Rc::new(TypableOption::new(key.clone(), text.to_owned()));
        options.insert(key, Rc::clone(&option));

        Ok(option)
    }

    /// Stores the [`ToString`] form of `value`, creating the section first when needed.
    pub fn set<V>(&self, key: &str, value: V) -> Result<()>
    where
        V: ToString,
    {
        let key = fold_key(key);
        let document = self.document()?;

        self.options.borrow_mut().remove(&key);
        document
            .borrow_mut()
            .set_option(&self.name, key, Some(value.to_string()));

        Ok(())
    }

    /// Removes an option. Nothing happens when it is not there.
    pub fn delete(&self, key: &str) -> Result<()> {
        let key = fold_key(key);
        let document = self.document()?;

        self.options.borrow_mut().remove(&key);
        if !document.borrow_mut().remove_option(&self.name, &key) {
            trace!(section = %self.name, key, "nothing to delete");
        }

        Ok(())
    }

    /// Option names in document order.
    pub fn keys(&self) -> Result<Vec<String>> {
        let document = self.document()?;
        let document = document.borrow();

        Ok(document.entries(&self.name)?.keys().cloned().collect())
    }

    /// Walks `(key, option)` pairs in document order.
    ///
    /// Keys are collected up front; options removed while iterating are skipped, any other
    /// failure is yielded.
    pub fn iter(
        &self,
    ) -> Result<impl Iterator<Item = Result<(String, Rc<TypableOption>)>> + '_> {
        let keys = self.keys()?;

        Ok(keys.into_iter().filter_map(|key| match self.get(&key) {
            Ok(option) => Some(Ok((key, option))),
            Err(Error::OptionNotFound { .. }) => None,
            Err(error) => Some(Err(error)),
        }))
    }

    /// Renders the options as `key = value` lines, without the `[name]` header.
    pub fn render(&self) -> Result<String> {
        self.document()?.borrow().render_body(&self.name)
    }

    pub(crate) fn invalidate(&self) {
        self.options.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::parser::Parser;

    fn document(text: &str) -> Rc<RefCell<Document>> {
        Rc::new(RefCell::new(
            Parser::new(text)
                .into_document()
                .expect("failed to parse hardcoded document"),
        ))
    }

    #[test]
    fn repeated_reads_share_an_instance() {
        let document = document("[default]\nname = myself\nkeys = 10\n");
        let section = Section::new(Rc::downgrade(&document), "default".to_owned());

        let first = section.get("name").unwrap();
        assert!(Rc::ptr_eq(&first, &section.get("name").unwrap()));
        assert!(Rc::ptr_eq(&first, &section.get("NAME").unwrap()));
        assert_eq!(section.get("keys").unwrap().as_integer().unwrap(), 10);
    }

    #[test]
    fn set_replaces_cached_option() {
        let document = document("[default]\ncount = 1\n");
        let section = Section::new(Rc::downgrade(&document), "default".to_owned());

        let before = section.get("count").unwrap();
        section.set("count", 100).unwrap();
        let after = section.get("count").unwrap();

        assert!(!Rc::ptr_eq(&before, &after));
        assert_eq!(before.as_integer().unwrap(), 1);
        assert_eq!(after.as_integer().unwrap(), 100);
    }

    #[test]
    fn set_materializes_section() {
        let document = document("[default]\n");
        let section = Section::new(Rc::downgrade(&document), "universe".to_owned());

        assert!(!section.exists());
        assert_eq!(section.get("answer").unwrap_err().kind(), ErrorKind::NotFound);

        section.set("answer", 42).unwrap();

        assert!(section.exists());
        assert_eq!(section.get("answer").unwrap().as_text(), "42");
        assert_eq!(document.borrow().section_names(), ["default", "universe"]);
    }

    #[test]
    fn delete_is_silent_when_absent() {
        let document = document("[default]\nname = myself\n");
        let section = Section::new(Rc::downgrade(&document), "default".to_owned());

        section.get("name").unwrap();
        section.delete("name").unwrap();
        section.delete("name").unwrap();

        assert!(!section.has_option("name"));
        assert!(matches!(
            section.get("name").unwrap_err(),
            Error::OptionNotFound { .. }
        ));
    }

    #[test]
    fn iteration_is_restartable() {
        let document = document("[default]\nname = myself\ncount = 1\nkeys = 10\n");
        let section = Section::new(Rc::downgrade(&document), "default".to_owned());

        let keys = || {
            section
                .iter()
                .unwrap()
                .map(|item| item.unwrap().0)
                .collect::<Vec<_>>()
        };
        let first = keys();

        assert_eq!(first, ["name", "count", "keys"]);
        assert_eq!(first, keys());
    }

    #[test]
    fn iteration_skips_options_deleted_midway() {
        let document = document("[default]
name = myself
count = 1
keys = 10
");
        let section = Section::new(Rc::downgrade(&document), "default".to_owned());

        let mut seen = Vec::new();
        for item in section.iter().unwrap() {
            let (key, _) = item.unwrap();
            if key == "name" {
                section.delete("count").unwrap();
            }
            seen.push(key);
        }

        assert_eq!(seen, ["name", "keys"]);
    }

    #[test]
    fn iteration_reports_detached_document() {
        let document = document("[default]
name = myself
count = 1
");
        let section = Section::new(Rc::downgrade(&document), "default".to_owned());

        let mut items = section.iter().unwrap();
        drop(document);

        assert!(matches!(items.next(), Some(Err(Error::Detached { .. }))));
    }

    #[test]
    fn detached_section() {
        let document = document("[default]\nname = myself\n");
        let section = Section::new(Rc::downgrade(&document), "default".to_owned());
        drop(document);

        assert!(!section.has_option("name"));
        assert!(matches!(section.get("name").unwrap_err(), Error::Detached { .. }));
    }

    #[test]
    fn render_body() {
        let document = document("[default]\nname = myself\n");
        let section = Section::new(Rc::downgrade(&document), "default".to_owned());

        assert_eq!(section.render().unwrap(), "name = myself\n\n");
    }
}
