use anyhow::{Result, anyhow};
use clap::ValueEnum;
use std::collections::HashSet;
use std::env;

use crate::cli::{Cli, LogFormat};
use crate::identify::DEFAULT_CLASS;

pub const LOG_ENV: &str = "LOG4J_FINGERPRINT_LOG";
pub const LOG_FORMAT_ENV: &str = "LOG4J_FINGERPRINT_LOG_FORMAT";
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub filter: String,
    pub format: LogFormat,
}

pub fn resolve_log_config(cli: &Cli) -> Result<LogConfig> {
    resolve_log_config_with(cli, |key| env::var(key).ok())
}

fn resolve_log_config_with<F>(cli: &Cli, lookup: F) -> Result<LogConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let filter = cli
        .log_level
        .clone()
        .or_else(|| lookup(LOG_ENV))
        .filter(|f| !f.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let format = match cli.log_format {
        Some(format) => format,
        None => match lookup(LOG_FORMAT_ENV) {
            Some(raw) => LogFormat::from_str(raw.trim(), true)
                .map_err(|_| anyhow!("{LOG_FORMAT_ENV} must be `text` or `json`, got `{raw}`"))?,
            None => LogFormat::default(),
        },
    };

    Ok(LogConfig { filter, format })
}

/// Classes to identify in first-seen order without duplicates, falling back
/// to [`DEFAULT_CLASS`].
pub fn resolve_classes(classes: &[String]) -> Vec<String> {
    if classes.is_empty() {
        return vec![DEFAULT_CLASS.to_string()];
    }
    let mut seen = HashSet::new();
    classes
        .iter()
        .map(|c| normalize_class_name(c))
        .filter(|c| seen.insert(c.clone()))
        .collect()
}

/// Accepts `a.b.C`, `a/b/C.class` or a pasted `import a.b.C;` line.
pub fn normalize_class_name(raw: &str) -> String {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix("import ") {
        s = rest.trim();
    }
    s = s.trim_end_matches(';').trim();
    s = s.strip_suffix(".class").unwrap_or(s);
    s.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == '/' { '.' } else { c })
        .collect()
}
