use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::ops::Deref;
use std::path::Path;
use std::rc::Rc;

use tracing::debug;

use crate::document::Document;
use crate::error::{Error, Result};
use crate::parser::Parser;
use crate::section::Section;

/// Name of the section that wraps documents written without any `[section]` header.
pub const ROOT_SECTION: &str = "-root-";

/// A whole INI document.
///
/// Sections are handed out as shared [`Section`] views; looking up the same name twice
/// returns the same [`Rc`], whether or not the section exists yet.
#[derive(Debug, Default)]
pub struct Config {
    document: Rc<RefCell<Document>>,
    sections: RefCell<HashMap<String, Rc<Section>>>,
    no_sections: bool,
}

impl Config {
    /// Parses `text`. Content with no header at all is wrapped in [`ROOT_SECTION`].
    pub fn parse(text: &str) -> Result<Self> {
        match Parser::new(text).into_document() {
            Ok(document) => Ok(Self::with_document(document, false)),
            Err(error @ Error::MissingHeader { .. }) => {
                let wrapped = format!("[{ROOT_SECTION}]\n{text}");
                let document = Parser::new(&wrapped)
                    .into_document()
                    .map_err(|error| error.lines_above(1))?;

                // A header further down means the document is malformed, not headerless.
                if document.len() != 1 {
                    return Err(error);
                }

                debug!("no section headers found, using the root section");
                Ok(Self::with_document(document, true))
            }
            Err(error) => Err(error),
        }
    }

    /// Reads the whole of `reader` and parses it. The reader is left open.
    pub fn from_reader<R>(reader: &mut R) -> Result<Self>
    where
        R: Read + ?Sized,
    {
        let mut text = String::with_capacity(4096);
        reader.read_to_string(&mut text)?;

        Self::parse(&text)
    }

    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening document");
        let mut file = fs::File::open(path)?;

        Self::from_reader(&mut file)
    }

    fn with_document(document: Document, no_sections: bool) -> Self {
        Self {
            document: Rc::new(RefCell::new(document)),
            sections: RefCell::new(HashMap::new()),
            no_sections,
        }
    }

    /// Whether the input had no header and was wrapped in [`ROOT_SECTION`].
    #[must_use]
    pub fn no_sections(&self) -> bool {
        self.no_sections
    }

    #[must_use]
    pub fn has_section(&self, name: &str) -> bool {
        self.document.borrow().has_section(name)
    }

    /// Looks up a section view, creating (but not storing) it when the name is unknown.
    pub fn section(&self, name: &str) -> Rc<Section> {
        let mut sections = self.sections.borrow_mut();

        if let Some(section) = sections.get(name) {
            return Rc::clone(section);
        }

        let section = Rc::new(Section::new(
            Rc::downgrade(&self.document),
            name.to_owned(),
        ));
        sections.insert(name.to_owned(), Rc::clone(&section));

        section
    }

    /// The synthetic section of a headerless document.
    #[must_use]
    pub fn root(&self) -> Option<Rc<Section>> {
        self.no_sections.then(|| self.section(ROOT_SECTION))
    }

    pub fn remove_section(&self, name: &str) -> Result<()> {
        if !self.document.borrow_mut().remove_section(name) {
            return Err(Error::SectionNotFound {
                section: name.to_owned(),
            });
        }

        // Views already handed out must not serve options from the removed section.
        if let Some(section) = self.sections.borrow_mut().remove(name) {
            section.invalidate();
        }

        Ok(())
    }

    /// Section names in document order.
    #[must_use]
    pub fn sections(&self) -> Vec<String> {
        self.document.borrow().section_names()
    }

    /// Walks `(name, section)` pairs for the sections present when called.
    pub fn iter(&self) -> impl Iterator<Item = (String, Rc<Section>)> + '_ {
        self.sections().into_iter().map(|name| {
            let section = self.section(&name);
            (name, section)
        })
    }

    /// Renders the whole document in canonical form.
    #[must_use]
    pub fn render(&self) -> String {
        self.document.borrow().render()
    }
}

/// A headerless document: the [`Config`] that owns the text together with its root section.
///
/// Dereferences to the root [`Section`], so bare keys are read with [`Section::get`].
#[derive(Debug)]
pub struct Root {
    config: Config,
    section: Rc<Section>,
}

impl Root {
    /// Wraps `config` when it was loaded without headers; hands it back otherwise.
    pub fn new(config: Config) -> Result<Self, Config> {
        match config.root() {
            Some(section) => Ok(Self { config, section }),
            None => Err(config),
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn section(&self) -> &Rc<Section> {
        &self.section
    }

    #[must_use]
    pub fn into_config(self) -> Config {
        self.config
    }
}

impl Deref for Root {
    type Target = Section;

    fn deref(&self) -> &Section {
        &self.section
    }
}
