// Command-line surface: option table, clap command, settings, catalog choice.

use crate::catalog::{CatalogSource, JsonCatalog, PhpRuntimeCatalog, StubCatalog};
use crate::error::Result;
use crate::resolver::{self, Resolver};
use crate::sink::FileSink;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

pub const COMMAND_NAME: &str = "autocomplete";
pub const COMMAND_ABOUT: &str = "Build IDE files for autocomplete";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// Takes a value; falls back to the default when absent.
    Optional,
    /// Boolean switch.
    Flag,
}

#[derive(Debug, Clone, Copy)]
pub struct OptionSpec {
    pub name: &'static str,
    /// One character becomes a short flag, anything longer a long alias.
    pub alias: Option<&'static str>,
    pub kind: OptionKind,
    pub description: &'static str,
    pub default: Option<&'static str>,
}

pub const OPTIONS: &[OptionSpec] = &[
    OptionSpec {
        name: "output",
        alias: Some("out"),
        kind: OptionKind::Optional,
        description: "Output directory",
        default: Some(crate::DEFAULT_OUTPUT_DIR),
    },
    OptionSpec {
        name: "catalog",
        alias: Some("c"),
        kind: OptionKind::Optional,
        description: "Catalog file (.json) or PHP stub file/directory; reflects the PHP runtime when omitted",
        default: None,
    },
    OptionSpec {
        name: "php",
        alias: None,
        kind: OptionKind::Optional,
        description: "PHP binary reflected when no catalog is given",
        default: Some("php"),
    },
    OptionSpec {
        name: "resolver",
        alias: Some("r"),
        kind: OptionKind::Optional,
        description: "Name resolution strategy",
        default: Some("as-is"),
    },
    OptionSpec {
        name: "trace",
        alias: None,
        kind: OptionKind::Flag,
        description: "Print per-stage trace lines to stderr",
        default: None,
    },
];

impl OptionSpec {
    pub fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.name).long(self.name).help(self.description);

        if let Some(alias) = self.alias {
            let mut chars = alias.chars();
            arg = match (chars.next(), chars.next()) {
                (Some(short), None) => arg.short(short),
                _ => arg.visible_alias(alias),
            };
        }

        match self.kind {
            OptionKind::Flag => arg.action(ArgAction::SetTrue),
            OptionKind::Optional => {
                arg = arg.num_args(1).value_name(self.name);
                match self.default {
                    Some(default) => arg.default_value(default),
                    None => arg,
                }
            }
        }
    }
}

pub fn command() -> Command {
    let autocomplete = OPTIONS
        .iter()
        .fold(Command::new(COMMAND_NAME).about(COMMAND_ABOUT), |cmd, opt| cmd.arg(opt.to_arg()));

    Command::new("pipe-autocomplete")
        .about("IDE autocomplete generator for Serafim\\Pipe")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(autocomplete)
}

// ─── Settings ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub output: PathBuf,
    pub catalog: Option<PathBuf>,
    pub php: String,
    pub resolver: String,
    pub trace: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output: PathBuf::from(crate::DEFAULT_OUTPUT_DIR),
            catalog: None,
            php: "php".to_string(),
            resolver: "as-is".to_string(),
            trace: false,
        }
    }
}

impl Settings {
    /// Read settings from the `autocomplete` subcommand's matches.
    pub fn from_matches(matches: &ArgMatches) -> Self {
        let defaults = Self::default();
        let value = |name: &str| matches.get_one::<String>(name).cloned();

        Self {
            output: value("output").map(PathBuf::from).unwrap_or(defaults.output),
            catalog: value("catalog").map(PathBuf::from),
            php: value("php").unwrap_or(defaults.php),
            resolver: value("resolver").unwrap_or(defaults.resolver),
            trace: matches.get_flag("trace"),
        }
    }

    pub fn resolver(&self) -> std::result::Result<Box<dyn Resolver>, String> {
        resolver::by_name(&self.resolver).ok_or_else(|| format!("unknown resolver '{}'", self.resolver))
    }

    /// `.json` → JSON catalog, any other path → PHP stubs, none → live PHP.
    pub fn open_catalog(&self) -> Result<Box<dyn CatalogSource>> {
        match &self.catalog {
            Some(path) if path.extension().is_some_and(|ext| ext == "json") => {
                Ok(Box::new(JsonCatalog::from_file(path)?))
            }
            Some(path) => Ok(Box::new(StubCatalog::from_path(path)?)),
            None => Ok(Box::new(PhpRuntimeCatalog::new(self.php.clone()))),
        }
    }
}

/// Run the `autocomplete` command end to end.
pub fn run(settings: &Settings) -> std::result::Result<PathBuf, String> {
    let resolver = settings.resolver()?;
    let catalog = settings
        .open_catalog()
        .map_err(|e| format!("[{}] {}", e.stage(), e))?;

    crate::generate(&settings.output, catalog.as_ref(), resolver.as_ref(), &mut FileSink)
        .map_err(|e| format!("[{}] {}", e.stage(), e))
}
