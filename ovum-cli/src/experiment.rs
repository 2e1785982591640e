// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::path::{Path, PathBuf};

use polars::prelude::*;
use serde::Serialize;

use ovum_core::constant;
use ovum_core::error::OvumError;
use ovum_core::io;
use ovum_core::ut;

/// Print an error for a subcommand and exit with status 1
pub fn fail(command: &str, message: &str) -> ! {
    eprintln!("[ovum::{}] ERROR: {}", command, message);
    std::process::exit(1);
}

/// Requested thread count, or all available cores
pub fn resolve_threads(command: &str, threads: Option<usize>) -> usize {
    match threads {
        Some(0) => fail(command, "The number of threads must be at least 1."),
        Some(t) => t,
        None => std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or_else(|_| {
                fail(
                    command,
                    "Could not automatically assign number of threads. Please manually set the --threads (-t) argument.",
                )
            }),
    }
}

/// Output directory and bookkeeping shared by one run of a subcommand
///
/// Every logged line is printed in verbose mode and always appended to
/// `log.txt` in the output directory.
#[derive(Debug, Clone)]
pub struct ExperimentContext {
    command: String,
    output: PathBuf,
    verbose: bool,
}

impl ExperimentContext {
    /// Create a fresh output directory, adding a numeric suffix if it exists
    pub fn create<P: AsRef<Path>>(
        command: &str,
        output: P,
        verbose: bool,
    ) -> Result<ExperimentContext, OvumError> {
        let output = ut::path::create_directory(output)?;

        Ok(ExperimentContext {
            command: command.to_string(),
            output,
            verbose,
        })
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.output.join(name)
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Create a sub-directory of the output directory
    pub fn subdirectory(&self, name: &str) -> Result<PathBuf, OvumError> {
        let path = self.path(name);
        std::fs::create_dir_all(&path)
            .map_err(|_| OvumError::DirError(path.display().to_string()))?;
        Ok(path)
    }

    pub fn log(&self, desc: &str) {
        ut::track::progress_log(desc, self.verbose);

        if let Err(err) = ut::track::append_log(self.path(constant::LOG_FILE), desc) {
            eprintln!("[ovum::{}] WARNING: {}", self.command, err);
        }
    }

    /// Persist resolved parameters as `config.json` and log them
    pub fn save_config<C: Serialize>(&self, config: &C) -> Result<(), OvumError> {
        let value = serde_json::to_value(config)
            .map_err(|err| OvumError::OtherError(format!("Failed to serialize config: {}", err)))?;

        let json = serde_json::to_string_pretty(&value)
            .map_err(|err| OvumError::OtherError(format!("Failed to serialize config: {}", err)))?;

        std::fs::write(self.path(constant::CONFIG_JSON), json)
            .map_err(|err| OvumError::OtherError(format!("Failed to write config: {}", err)))?;

        if let serde_json::Value::Object(fields) = value {
            let pairs = fields
                .iter()
                .map(|(key, value)| (key.as_str(), value.to_string()))
                .collect::<Vec<(&str, String)>>();

            for line in ut::track::format_listing(&pairs).lines() {
                self.log(line);
            }
        }

        Ok(())
    }

    /// Write `errors.tsv` when any task failed
    ///
    /// Returns the number of recorded errors.
    pub fn write_errors(&self, errors: &[(String, OvumError)]) -> Result<usize, OvumError> {
        if errors.is_empty() {
            return Ok(0);
        }

        let mut table = DataFrame::new(vec![
            Column::new(
                "id".into(),
                errors.iter().map(|(id, _)| id.as_str()).collect::<Vec<&str>>(),
            ),
            Column::new(
                "kind".into(),
                errors.iter().map(|(_, err)| err.kind()).collect::<Vec<&str>>(),
            ),
            Column::new(
                "error".into(),
                errors
                    .iter()
                    .map(|(_, err)| err.to_string())
                    .collect::<Vec<String>>(),
            ),
        ])
        .map_err(|err| OvumError::TableWriteError(err.to_string()))?;

        io::write_table_tsv(&mut table, self.path(constant::ERRORS_TSV), true)?;

        Ok(errors.len())
    }

    /// Print an error and exit, leaving the output directory in place
    pub fn abort(&self, err: &OvumError) -> ! {
        let _ = ut::track::append_log(self.path(constant::LOG_FILE), &err.to_string());
        fail(&self.command, &err.to_string())
    }
}
