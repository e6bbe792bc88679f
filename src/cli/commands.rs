//! CLI command implementations
//!
//! Every command loads the config file first, then the dictionary it
//! needs. Commands write IDF text or a JSON response to `out` and never
//! touch stdout directly, so they can run against in-memory buffers.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::idf::{read_model, read_model_with, save, write_store, ImportOptions, WriteOptions};
use crate::model::Store;
use crate::observability::{init_logging, log_event_with_fields, Event};
use crate::schema::{normalize_version, Dictionary, DictionaryLoader};
use crate::value::Inputs;

use super::args::{Cli, Command};
use super::errors::{CliError, CliErrorCode, CliResult};
use super::io::{read_requests, write_response};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding `<version>.idd` dictionaries (required)
    pub dictionary_dir: String,

    /// Version used when a file has no Version record (default "8.6.0")
    #[serde(default = "default_version")]
    pub default_version: String,

    /// Write `!- field name` comments (default true)
    #[serde(default = "default_annotate")]
    pub annotate: bool,

    /// Keep required types when filtering an import (default false)
    #[serde(default)]
    pub force_required: bool,
}

fn default_version() -> String {
    "8.6.0".to_string()
}
fn default_annotate() -> bool {
    true
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        log_event_with_fields(
            Event::ConfigLoaded,
            &[
                ("path", path.display().to_string().as_str()),
                ("dictionary_dir", config.dictionary_dir.as_str()),
            ],
        );
        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.dictionary_dir.trim().is_empty() {
            return Err(CliError::config_error("dictionary_dir must not be empty"));
        }

        let version = normalize_version(&self.default_version);
        let well_formed = version.split('.').count() == 3
            && version
                .split('.')
                .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));
        if !well_formed {
            return Err(CliError::config_error(format!(
                "Invalid default_version: '{}'. Expected major.minor[.patch].",
                self.default_version
            )));
        }

        Ok(())
    }

    /// Get dictionary directory as Path
    pub fn dictionary_path(&self) -> &Path {
        Path::new(&self.dictionary_dir)
    }

    pub fn loader(&self) -> DictionaryLoader {
        DictionaryLoader::new(self.dictionary_path())
    }

    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            annotate: self.annotate,
        }
    }

    /// Loads the dictionary for `version`, or for the default version.
    fn dictionary(&self, version: Option<&str>) -> CliResult<(String, Dictionary)> {
        let version = normalize_version(version.unwrap_or(&self.default_version));
        let dictionary = self.loader().load_version(&version)?;
        Ok((version, dictionary))
    }
}

/// Main CLI entry point
///
/// Parses arguments, installs logging and dispatches to the command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    init_logging(cli.verbose);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_command(cli.command, stdin.lock(), &mut out)
}

/// Run the appropriate command based on CLI args
pub fn run_command<R: BufRead, W: Write>(cmd: Command, input: R, out: &mut W) -> CliResult<()> {
    match cmd {
        Command::Find {
            query,
            config,
            idd_version,
        } => find(&config, &query, idd_version.as_deref(), out),
        Command::Describe {
            record_type,
            config,
            idd_version,
        } => describe(&config, &record_type, idd_version.as_deref(), out),
        Command::Check { file, config } => check(&config, &file, out),
        Command::Format {
            file,
            output,
            only,
            config,
        } => format(&config, &file, output.as_deref(), only, out),
        Command::Build {
            idd_version,
            config,
        } => build(&config, idd_version.as_deref(), input, out),
        Command::Show { file, name, config } => show(&config, &file, &name, out),
    }
}

/// Lists record types matching a query.
pub fn find<W: Write>(config_path: &Path, query: &str, version: Option<&str>, out: &mut W) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let (version, dictionary) = config.dictionary(version)?;

    let types: Vec<&str> = dictionary.find(query).into_iter().map(|name| name.as_str()).collect();
    write_response(out, json!({ "version": version, "types": types }))
}

/// Prints the help lines of one record type.
pub fn describe<W: Write>(
    config_path: &Path,
    record_type: &str,
    version: Option<&str>,
    out: &mut W,
) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let (_, dictionary) = config.dictionary(version)?;

    let schema = dictionary.require(record_type)?;
    write_response(
        out,
        json!({
            "type": schema.name.as_str(),
            "group": schema.group,
            "memo": schema.memo,
            "unique": schema.unique,
            "required": schema.required,
            "fields": schema.help_lines(),
        }),
    )
}

/// Loads an IDF file and reports what it holds.
pub fn check<W: Write>(config_path: &Path, file: &Path, out: &mut W) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let store = read_model(&config.loader(), file, &config.default_version)?;

    let missing: Vec<&str> = store
        .missing_required_types()
        .into_iter()
        .map(|name| name.as_str())
        .collect();
    if !missing.is_empty() {
        tracing::warn!(file = %file.display(), missing = ?missing, "model lacks required record types");
    }

    let types: Vec<&str> = store.type_names().map(|name| name.as_str()).collect();
    write_response(
        out,
        json!({
            "records": store.len(),
            "types": types,
            "missing_required": missing,
        }),
    )
}

/// Re-renders an IDF file, to `output` when given or to `out`.
pub fn format<W: Write>(
    config_path: &Path,
    file: &Path,
    output: Option<&Path>,
    only: Vec<String>,
    out: &mut W,
) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let options = ImportOptions {
        types: if only.is_empty() { None } else { Some(only) },
        force_required: config.force_required,
    };
    let store = read_model_with(&config.loader(), file, &config.default_version, &options)?;

    match output {
        Some(path) => {
            save(&store, path, config.write_options())?;
            write_response(
                out,
                json!({ "written": path.display().to_string(), "records": store.len() }),
            )
        }
        None => Ok(write_store(&store, out, config.write_options())?),
    }
}

/// Builds a model from JSON lines `{"type": ..., "fields": {...}}`.
///
/// Unique types overwrite their single instance, so an input `Version`
/// line replaces the seeded one. The first rejected line aborts the build.
pub fn build<R: BufRead, W: Write>(
    config_path: &Path,
    version: Option<&str>,
    input: R,
    out: &mut W,
) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let (version, dictionary) = config.dictionary(version)?;
    let mut store = Store::with_version(Arc::new(dictionary), &version)?;

    for request in read_requests(input) {
        let (line, request) = request?;
        let record_type = request
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or_else(|| CliError::input_error(line, "missing string field \"type\""))?;

        let inputs = match request.get("fields") {
            None => Inputs::new(),
            Some(serde_json::Value::Object(fields)) => Inputs::from_json_object(fields).map_err(|key| {
                CliError::input_error(line, format!("field '{}' must be a number or a string", key))
            })?,
            Some(_) => return Err(CliError::input_error(line, "\"fields\" must be an object")),
        };

        let unique = store.schema(record_type).map_or(false, |schema| schema.unique);
        let added = if unique {
            store.replace_unique(record_type, &inputs).map(|_| ())
        } else {
            store.add(record_type, &inputs).map(|_| ())
        };
        added.map_err(|e| {
            CliError::new(
                CliErrorCode::ModelError,
                format!("line {}: {} [{}]", line, e, e.code()),
            )
        })?;
    }

    for missing in store.missing_required_types() {
        tracing::warn!(record_type = %missing, "built model lacks a required record type");
    }

    Ok(write_store(&store, out, config.write_options())?)
}

/// Prints one record found by name as JSON.
pub fn show<W: Write>(config_path: &Path, file: &Path, name: &str, out: &mut W) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let store = read_model(&config.loader(), file, &config.default_version)?;

    let record = store
        .get_by_name(name)
        .ok_or_else(|| CliError::not_found(name))?;
    write_response(out, record.to_json())
}
