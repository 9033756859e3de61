use anyhow::{Context, Result};
use clap::Parser;
use log4j_fingerprint::cli::{Cli, Commands};
use log4j_fingerprint::config::{normalize_class_name, resolve_classes, resolve_log_config};
use log4j_fingerprint::digest::{ClassHash, hash_class};
use log4j_fingerprint::logging::init_tracing;
use log4j_fingerprint::naming::average_name_lengths_in_jar;
use log4j_fingerprint::{Fingerprinter, Identification};
use rayon::prelude::*;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::info;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&resolve_log_config(&cli)?);

    match cli.command.clone() {
        Commands::Identify { jar_path, classes } => {
            let output = identify_classes(&jar_path, &resolve_classes(&classes));
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Hash {
            jar_path,
            class_name,
        } => {
            let class_name = normalize_class_name(&class_name);
            let hash = hash_class(&jar_path, &class_name)
                .with_context(|| format!("failed to hash {class_name} in {}", jar_path.display()))?;
            let output = HashOutput { class_name, hash };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Names { jar_path } => {
            let averages = average_name_lengths_in_jar(&jar_path)
                .with_context(|| format!("failed to list classes in {}", jar_path.display()))?;
            println!("{}", serde_json::to_string_pretty(&averages)?);
        }
    }

    Ok(())
}

#[derive(Debug, Serialize)]
struct HashOutput {
    class_name: String,
    #[serde(flatten)]
    hash: ClassHash,
}

#[derive(Debug, Serialize)]
struct ClassReport {
    class_name: String,
    #[serde(flatten)]
    identification: Option<Identification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct IdentifyOutput {
    jar_path: String,
    duration_ms: u64,
    classes: Vec<ClassReport>,
}

fn identify_classes(jar_path: &Path, classes: &[String]) -> IdentifyOutput {
    let start = Instant::now();
    let fingerprinter = Fingerprinter::builtin();

    let reports: Vec<ClassReport> = classes
        .par_iter()
        .map(|class_name| match fingerprinter.identify(jar_path, class_name) {
            Ok(identification) => ClassReport {
                class_name: class_name.clone(),
                identification: Some(identification),
                error: None,
            },
            Err(e) => ClassReport {
                class_name: class_name.clone(),
                identification: None,
                error: Some(format!("{:#}", anyhow::Error::new(e))),
            },
        })
        .collect();

    let identified = reports
        .iter()
        .filter(|r| r.identification.as_ref().is_some_and(Identification::is_identified))
        .count();
    info!(
        jar = %jar_path.display(),
        classes = reports.len(),
        identified,
        "identification finished"
    );

    IdentifyOutput {
        jar_path: jar_path.to_string_lossy().to_string(),
        duration_ms: start.elapsed().as_millis() as u64,
        classes: reports,
    }
}
