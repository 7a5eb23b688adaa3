//! CLI command implementations
//!
//! Both commands are one-shot: load config, build the executor tree from a
//! program file, print one JSON envelope, exit. Neither touches the network;
//! `decode` serves the saved response through the in-memory backend.

use std::path::Path;

use serde_json::{json, Value};

use crate::backend::MemoryBackend;
use crate::builder::Program;
use crate::config::Config;
use crate::engine::QueryEngine;
use crate::observability::{log_event, Event, Logger};
use crate::translator::DslTranslator;

use super::args::Command;
use super::errors::CliResult;
use super::io::{read_json, write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    let result = match cmd {
        Command::Compile { program, config } => compile(&program, config.as_deref()),
        Command::Decode {
            program,
            response,
            config,
        } => decode(&program, &response, config.as_deref()),
    };

    match result {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

/// Compiles a program; returns the request body
pub fn compile(program_path: &Path, config_path: Option<&Path>) -> CliResult<Value> {
    let config = load_config(config_path)?;
    let program = load_program(program_path)?;

    let engine = QueryEngine::new(
        DslTranslator::new(config.translator_options()),
        MemoryBackend::new(),
    );
    let mut leaf = engine.build(program)?;
    let request = engine.compile(&mut leaf)?;

    Ok(json!({
        "index": leaf.source(),
        "request": request,
    }))
}

/// Decodes a saved backend response; returns the rows
pub fn decode(
    program_path: &Path,
    response_path: &Path,
    config_path: Option<&Path>,
) -> CliResult<Value> {
    let config = load_config(config_path)?;
    let program = load_program(program_path)?;
    let response = read_json(response_path)?;

    let translator = DslTranslator::new(config.translator_options());
    let mut leaf = QueryEngine::new(translator.clone(), MemoryBackend::new()).build(program)?;

    let backend = MemoryBackend::new().with_response(leaf.source(), response);
    let engine = QueryEngine::new(translator, backend);
    let rows = engine.execute(&mut leaf)?;

    Ok(rows.to_value())
}

/// Defaults apply when no config file is given
fn load_config(path: Option<&Path>) -> CliResult<Config> {
    let config = match path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    Logger::set_min_severity(config.min_severity());
    log_event(
        Event::ConfigLoaded,
        &[
            ("time_zone", config.time_zone.as_str()),
            ("log_level", config.log_level.as_str()),
        ],
    );
    Ok(config)
}

fn load_program(path: &Path) -> CliResult<Program> {
    let value = read_json(path)?;
    let program: Program = serde_json::from_value(value)?;
    Ok(program)
}
