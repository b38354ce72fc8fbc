//! Command dispatch

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::{NormalizeError, Normalizer};
use crate::cli::args::{Cli, Commands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::domain::Configuration;
use crate::infrastructure::{self, load_rules, InfraError};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Normalize {
            file,
            output,
            rules,
        }) => normalize(file, output.as_deref(), rules.as_deref()),
        Some(Commands::Batch { dir, rules, ext }) => batch(dir, rules.as_deref(), ext),
        Some(Commands::Check { file, rules }) => check(file, rules.as_deref()),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Ok(()),
    }
}

/// Build the normalizer once; the compiled pipeline is reused for every
/// document of the invocation.
fn build_normalizer(rules: Option<&Path>) -> CliResult<Normalizer> {
    let config = match rules {
        Some(path) => load_rules(path)?,
        None => Configuration::default(),
    };
    debug!(
        "configuration: {} ignores, {} sort rules",
        config.ignores().len(),
        config.sorts().len()
    );
    Normalizer::new(&config)
        .map_err(|e| CliError::Infra(InfraError::Normalize(NormalizeError::from(e))))
}

#[instrument(level = "debug")]
fn normalize(file: &Path, out: Option<&Path>, rules: Option<&Path>) -> CliResult<()> {
    let normalizer = build_normalizer(rules)?;
    match out {
        Some(dest) => {
            infrastructure::normalize_file(&normalizer, file, dest)?;
            output::success(&format!("{} -> {}", file.display(), dest.display()));
        }
        None => {
            let input = std::fs::read_to_string(file)
                .map_err(|e| InfraError::io(format!("reading {}", file.display()), e))?;
            let result = normalizer
                .normalize_str(&input)
                .map_err(InfraError::from)?;
            // result carries its own trailing newline
            print!("{result}");
        }
    }
    Ok(())
}

#[instrument(level = "debug")]
fn batch(dir: &Path, rules: Option<&Path>, ext: &str) -> CliResult<()> {
    let normalizer = build_normalizer(rules)?;
    let outcome = infrastructure::normalize_batch(&normalizer, dir, ext)?;
    for path in &outcome.changed {
        output::detail(&format!("normalized {}", path.display()));
    }
    output::success(&format!(
        "{} normalized, {} already canonical",
        outcome.changed.len(),
        outcome.unchanged.len()
    ));
    Ok(())
}

#[instrument(level = "debug")]
fn check(file: &Path, rules: Option<&Path>) -> CliResult<()> {
    let normalizer = build_normalizer(rules)?;
    if infrastructure::is_canonical(&normalizer, file)? {
        output::success(&format!("{} is canonical", file.display()));
        Ok(())
    } else {
        output::failure(&format!("{} differs from canonical form", file.display()));
        Err(CliError::NotCanonical(file.display().to_string()))
    }
}
