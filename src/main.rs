use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use figs::{Config, LoadOptions, Loaded, Mapping, Section};
use tracing_subscriber::EnvFilter;

/// Read and edit INI configuration files.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Load option as `name=value` (e.g. `as_mapping=yes`).
    #[arg(short = 'o', long = "option", global = true, value_parser = parse_pair)]
    options: Vec<(String, String)>,

    /// Log what is being read and written.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the document in canonical form.
    Show { path: PathBuf },

    /// Print one option, optionally converted.
    Get {
        path: PathBuf,
        key: String,
        /// Section to read from; headerless documents need none.
        #[arg(short, long)]
        section: Option<String>,
        #[arg(long = "as", value_enum, default_value_t = Kind::Text)]
        kind: Kind,
    },

    /// Set one option and write the file back.
    Set {
        path: PathBuf,
        key: String,
        value: String,
        #[arg(short, long)]
        section: Option<String>,
    },

    /// List section names, or the option names of one section.
    Keys {
        path: PathBuf,
        #[arg(short, long)]
        section: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    Text,
    Bool,
    Int,
    Float,
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(name, value)| (name.trim().to_owned(), value.trim().to_owned()))
        .ok_or_else(|| format!("expected name=value, got {s:?}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = LoadOptions::from_pairs(
        cli.options
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str())),
    )?;

    match cli.command {
        Command::Show { path } => show(&path, &options),
        Command::Get {
            path,
            key,
            section,
            kind,
        } => {
            let config = open(&path)?;
            let option = pick_section(&config, section.as_deref())?.get(&key)?;

            match kind {
                Kind::Text => println!("{option}"),
                Kind::Bool => println!("{}", option.as_boolean()?),
                Kind::Int => println!("{}", option.as_integer()?),
                Kind::Float => println!("{}", option.as_float()?),
            }

            Ok(())
        }
        Command::Set {
            path,
            key,
            value,
            section,
        } => {
            let config = open(&path)?;
            let target = pick_section(&config, section.as_deref())?;
            target.set(&key, value)?;

            if config.no_sections() {
                figs::dump(&target, &path)?;
            } else {
                figs::dump(&config, &path)?;
            }

            Ok(())
        }
        Command::Keys { path, section } => {
            let config = open(&path)?;

            let names = match section {
                Some(name) => config.section(&name).keys()?,
                None => match config.root() {
                    Some(root) => root.keys()?,
                    None => config.sections(),
                },
            };

            for name in names {
                println!("{name}");
            }

            Ok(())
        }
    }
}

fn open(path: &Path) -> Result<Config> {
    Config::open(path).with_context(|| format!("failed to load {}", path.display()))
}

fn pick_section(config: &Config, name: Option<&str>) -> Result<Rc<Section>> {
    match (name, config.root()) {
        (Some(name), _) => Ok(config.section(name)),
        (None, Some(root)) => Ok(root),
        (None, None) => bail!("the document has sections; pass one with --section"),
    }
}

fn show(path: &Path, options: &LoadOptions) -> Result<()> {
    let loaded = figs::load(path, options)
        .with_context(|| format!("failed to load {}", path.display()))?;

    match loaded {
        Loaded::Config(config) => print!("{}", figs::dumps(&config)?),
        Loaded::Root(root) => print!("{}", figs::dumps(&root)?),
        Loaded::Mapping(Mapping::Sections(sections)) => {
            for (name, options) in sections {
                for (key, value) in options {
                    println!("{name}.{key}={value}");
                }
            }
        }
        Loaded::Mapping(Mapping::Options(options)) => {
            for (key, value) in options {
                println!("{key}={value}");
            }
        }
    }

    Ok(())
}
