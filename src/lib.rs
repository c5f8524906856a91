//! Lazily-typed access to INI configuration files.
//!
//! A loaded document is a [`Config`] of [`Section`]s, each handing out [`TypableOption`]s that
//! convert their text on demand:
//!
//! ```
//! let loaded = figs::loads("[server]\nport = 8080\ndebug = yes\n", &figs::LoadOptions::default())?;
//! let config = loaded.into_config().expect("document has headers");
//! let server = config.section("server");
//!
//! assert_eq!(server.get("port")?.as_integer()?, 8080);
//! assert!(server.get("debug")?.as_boolean()?);
//! # Ok::<(), figs::Error>(())
//! ```
//!
//! Documents without any `[section]` header load as a [`Root`], which reads bare keys directly.
#![warn(
    clippy::correctness,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::style,
    clippy::pedantic
)]

mod config;
mod document;
mod error;
mod option;
mod parser;
mod section;
mod util;

use std::fs;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::debug;

pub use config::{Config, ROOT_SECTION, Root};
pub use error::{Error, ErrorKind, Result};
pub use option::TypableOption;
pub use section::Section;
pub use util::dedent;

/// Settings accepted by [`load`], [`load_from`] and [`loads`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Return a plain [`Mapping`] instead of a [`Config`] or [`Root`].
    pub as_mapping: bool,
}

impl LoadOptions {
    /// Builds options from `name=value` style pairs, such as those given on a command line.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut options = Self::default();

        for (name, value) in pairs {
            match name {
                "as_mapping" => {
                    options.as_mapping =
                        option::parse_boolean(value).map_err(|_| Error::InvalidArgument {
                            name: format!("{name}={value}"),
                        })?;
                }
                _ => {
                    return Err(Error::InvalidArgument {
                        name: name.to_owned(),
                    });
                }
            }
        }

        Ok(options)
    }
}

/// Plain, insertion-ordered copy of a document or of one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mapping {
    Sections(IndexMap<String, IndexMap<String, String>>),
    Options(IndexMap<String, String>),
}

/// What a load produced.
#[derive(Debug)]
pub enum Loaded {
    Config(Config),
    Root(Root),
    Mapping(Mapping),
}

impl Loaded {
    fn new(config: Config, options: &LoadOptions) -> Result<Self> {
        let loaded = match Root::new(config) {
            Ok(root) if options.as_mapping => Self::Mapping(root.to_mapping()?),
            Ok(root) => Self::Root(root),
            Err(config) if options.as_mapping => Self::Mapping(config.to_mapping()?),
            Err(config) => Self::Config(config),
        };

        Ok(loaded)
    }

    #[must_use]
    pub fn into_config(self) -> Option<Config> {
        match self {
            Self::Config(config) => Some(config),
            Self::Root(root) => Some(root.into_config()),
            Self::Mapping(_) => None,
        }
    }

    #[must_use]
    pub fn into_root(self) -> Option<Root> {
        match self {
            Self::Root(root) => Some(root),
            Self::Config(_) | Self::Mapping(_) => None,
        }
    }

    #[must_use]
    pub fn into_mapping(self) -> Option<Mapping> {
        match self {
            Self::Mapping(mapping) => Some(mapping),
            Self::Config(_) | Self::Root(_) => None,
        }
    }
}

/// Something that can be written back as INI text.
pub trait Dump {
    /// The canonical text form.
    fn render(&self) -> Result<String>;

    fn to_mapping(&self) -> Result<Mapping>;
}

impl Dump for Config {
    fn render(&self) -> Result<String> {
        Ok(Config::render(self))
    }

    fn to_mapping(&self) -> Result<Mapping> {
        let mut sections = IndexMap::new();

        for (name, section) in self.iter() {
            if let Mapping::Options(options) = Dump::to_mapping(&*section)? {
                sections.insert(name, options);
            }
        }

        Ok(Mapping::Sections(sections))
    }
}

impl Dump for Section {
    fn render(&self) -> Result<String> {
        Section::render(self)
    }

    fn to_mapping(&self) -> Result<Mapping> {
        let options = self
            .iter()?
            .map(|item| item.map(|(key, option)| (key, option.as_text().to_owned())))
            .collect::<Result<_>>()?;

        Ok(Mapping::Options(options))
    }
}

impl Dump for Root {
    fn render(&self) -> Result<String> {
        Section::render(self)
    }

    fn to_mapping(&self) -> Result<Mapping> {
        Dump::to_mapping(&**self)
    }
}

impl<T> Dump for Rc<T>
where
    T: Dump + ?Sized,
{
    fn render(&self) -> Result<String> {
        (**self).render()
    }

    fn to_mapping(&self) -> Result<Mapping> {
        (**self).to_mapping()
    }
}

/// Loads the file at `path`, closing it before returning.
pub fn load<P>(path: P, options: &LoadOptions) -> Result<Loaded>
where
    P: AsRef<Path>,
{
    Loaded::new(Config::open(path)?, options)
}

/// Loads from an open reader, which stays open and owned by the caller.
pub fn load_from<R>(reader: &mut R, options: &LoadOptions) -> Result<Loaded>
where
    R: Read + ?Sized,
{
    Loaded::new(Config::from_reader(reader)?, options)
}

/// Loads from a string after removing its common indentation (see [`dedent`]).
pub fn loads(text: &str, options: &LoadOptions) -> Result<Loaded> {
    Loaded::new(Config::parse(&dedent(text))?, options)
}

/// Writes `target` to the file at `path`, replacing its contents.
pub fn dump<T, P>(target: &T, path: P) -> Result<()>
where
    T: Dump + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    debug!(path = %path.display(), "writing document");

    let mut writer = BufWriter::new(fs::File::create(path)?);
    dump_to(target, &mut writer)?;
    writer.flush()?;

    Ok(())
}

/// Writes `target` to an open writer without closing it.
pub fn dump_to<T, W>(target: &T, writer: &mut W) -> Result<()>
where
    T: Dump + ?Sized,
    W: Write + ?Sized,
{
    writer.write_all(target.render()?.as_bytes())?;

    Ok(())
}

pub fn dumps<T>(target: &T) -> Result<String>
where
    T: Dump + ?Sized,
{
    target.render()
}

pub fn to_mapping<T>(target: &T) -> Result<Mapping>
where
    T: Dump + ?Sized,
{
    target.to_mapping()
}
