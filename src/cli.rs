use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "log4j-fingerprint")]
#[command(about = "Identify log4j-core versions inside JAR archives from class bytecode")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// tracing filter directive, e.g. `debug` or `log4j_fingerprint=trace`
    #[arg(long, value_name = "FILTER", global = true)]
    pub log_level: Option<String>,

    #[arg(long, value_enum, global = true)]
    pub log_format: Option<LogFormat>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Identify the log4j version of one or more classes in a jar
    Identify {
        jar_path: PathBuf,

        /// Fully qualified class names; defaults to JndiManager
        #[arg(value_name = "CLASS")]
        classes: Vec<String>,
    },
    /// Print the size and digests of a class, as stored in the known-hash tables
    Hash {
        jar_path: PathBuf,

        #[arg(value_name = "CLASS")]
        class_name: String,
    },
    /// Average package and class name lengths of a jar
    Names { jar_path: PathBuf },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}
