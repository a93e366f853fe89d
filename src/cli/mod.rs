/*
MIT License

Copyright (c) 2025 Ameyanagi

Card layouts follow the SAMMY code documentation (ORNL/TM-9179),
Section VI.B card descriptions.
*/

//! Command-line interface
//!
//! Three subcommands: `check` parses one or more parameter files and
//! reports every failure, `roundtrip` re-emits a parsed file in canonical
//! form, and `dump` converts a file to JSON.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::info;
use rayon::prelude::*;

use crate::parfile::ParameterFile;

#[derive(Parser, Debug)]
#[command(name = "sammy-par", version, about = "Codec for SAMMY parameter files")]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse parameter files and report any errors
    Check {
        /// Files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Parse a parameter file and write it back in canonical form
    Roundtrip {
        /// Input parameter file
        input: PathBuf,
        /// Output path; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Convert a parameter file to JSON
    Dump {
        /// Input parameter file
        input: PathBuf,
        /// Pretty-print the JSON
        #[arg(short, long)]
        pretty: bool,
    },
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Check { files } => check(&files),
            Command::Roundtrip { input, output } => roundtrip(&input, output.as_deref()),
            Command::Dump { input, pretty } => dump(&input, pretty),
        }
    }
}

fn check(files: &[PathBuf]) -> anyhow::Result<()> {
    let failures: Vec<(PathBuf, String)> = files
        .par_iter()
        .filter_map(|path| match ParameterFile::from_file(path) {
            Ok(_) => None,
            Err(err) => Some((path.clone(), err.to_string())),
        })
        .collect();
    info!(
        "checked {} file(s), {} failure(s)",
        files.len(),
        failures.len()
    );
    if failures.is_empty() {
        println!("{} file(s) OK", files.len());
        return Ok(());
    }
    for (path, message) in &failures {
        eprintln!("{}: {}", path.display(), message);
    }
    bail!("{} of {} file(s) failed to parse", failures.len(), files.len());
}

fn roundtrip(input: &std::path::Path, output: Option<&std::path::Path>) -> anyhow::Result<()> {
    let file = ParameterFile::from_file(input)
        .with_context(|| format!("failed to parse {}", input.display()))?;
    let text = file.to_string();
    match output {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{text}"),
    }
    Ok(())
}

fn dump(input: &std::path::Path, pretty: bool) -> anyhow::Result<()> {
    let file = ParameterFile::from_file(input)
        .with_context(|| format!("failed to parse {}", input.display()))?;
    let json = if pretty {
        serde_json::to_string_pretty(&file)?
    } else {
        serde_json::to_string(&file)?
    };
    println!("{json}");
    Ok(())
}
