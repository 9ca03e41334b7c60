//! CLI command implementations
//!
//! `expand` builds an [`Expander`] from the optional configuration file,
//! expands the input document and prints the result. `parse` prints the
//! tree of a selection expression.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::expansion::{Expander, ExpanderConfig};
use crate::filter::FilterTree;
use crate::node::Node;
use crate::observability::{log_event_with_fields, Event, Logger, Severity};
use crate::resolver::{DbRefConfig, DbRefResolver, MemoryFetcher, ResolverSet};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_input, write_json};

/// Configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Expander switches (optional, all defaulted)
    #[serde(default)]
    pub expander: ExpanderConfig,

    /// Database reference resolver (optional, disabled when absent)
    #[serde(default)]
    pub dbref: Option<DbRefConfig>,

    /// Canned backend responses, keyed by full request URL
    #[serde(default)]
    pub responses: HashMap<String, Value>,

    /// Minimum log severity (optional, default "WARN")
    #[serde(default)]
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        let path_str = path.display().to_string();
        log_event_with_fields(Event::ConfigLoaded, Severity::Info, &[("path", path_str.as_str())]);
        Ok(config)
    }

    /// Validate configuration
    fn validate(&self) -> CliResult<()> {
        self.severity()?;

        if let Some(dbref) = &self.dbref {
            dbref.validate()?;
        }

        Ok(())
    }

    /// Configured log severity, if any
    pub fn severity(&self) -> CliResult<Option<Severity>> {
        self.log_level
            .as_deref()
            .map(|level| level.parse::<Severity>().map_err(CliError::config_error))
            .transpose()
    }

    /// Build an expander with every configured resolver registered
    pub fn build_expander(&self) -> CliResult<Expander> {
        let mut resolvers = ResolverSet::new();

        if let Some(dbref) = &self.dbref {
            let fetcher = MemoryFetcher::from(self.responses.clone());
            resolvers.add(DbRefResolver::from_config(dbref, Box::new(fetcher))?)?;
        }

        Ok(Expander::with_config(resolvers, self.expander.clone()))
    }
}

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Expand {
            input,
            expand,
            fields,
            config,
        } => expand_command(&input, &expand, &fields, config.as_deref()),
        Command::Parse { expression } => parse_command(&expression),
    }
}

/// Expand a document and write it to stdout
pub fn expand_command(
    input: &Path,
    expansion: &str,
    fields: &str,
    config_path: Option<&Path>,
) -> CliResult<()> {
    let config = match config_path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(severity) = config.severity()? {
        Logger::set_min_severity(severity);
    }

    let expander = config.build_expander()?;
    let document = read_input(input)?;
    let result = expand_document(&expander, &document, expansion, fields)?;
    write_json(&result)
}

/// Expand an object, or every element of an array
pub fn expand_document(
    expander: &Expander,
    document: &Value,
    expansion: &str,
    fields: &str,
) -> CliResult<Value> {
    match document {
        Value::Object(_) => {
            let node = Node::from(document);
            Ok(Value::Object(expander.expand(&node, expansion, fields)))
        }
        Value::Array(_) => {
            let node = Node::from(document);
            let items = expander.expand_array(&node, expansion, fields);
            Ok(Value::Array(items.into_iter().map(Value::Object).collect()))
        }
        _ => Err(CliError::input_error("Input must be a JSON object or array")),
    }
}

/// Parse an expression and write its tree to stdout
pub fn parse_command(expression: &str) -> CliResult<()> {
    let tree = FilterTree::parse(expression)?;
    write_json(&serde_json::to_value(&tree)?)
}
