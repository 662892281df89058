//! CLI argument definitions for `wizscholar`

use clap::{builder::BoolishValueParser, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use wiz_scholar::config::ConfigOverrides;
use wiz_scholar::logger::Level;

/// CLI log level argument
///
/// Represents log levels that can be passed via CLI arguments. Converts to lowercase
/// strings for config storage and to `logger::Level` for runtime use.
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevelArg {
    /// Error-level logging
    Error,
    /// Warning-level logging
    Warn,
    /// Info-level logging
    Info,
    /// Debug-level logging
    Debug,
}

impl From<LogLevelArg> for Level {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => Self::Error,
            LogLevelArg::Warn => Self::Warn,
            LogLevelArg::Info => Self::Info,
            LogLevelArg::Debug => Self::Debug,
        }
    }
}

impl std::fmt::Display for LogLevelArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let as_str = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        };
        write!(f, "{as_str}")
    }
}

#[derive(Debug, Subcommand)]
pub enum ConfigSubcommand {
    /// Display configuration values.
    ///
    /// If a KEY is provided, displays only that configuration value.
    /// If no KEY is provided, displays all configuration values.
    Get {
        /// Optional configuration key to display (e.g., `level`, `port`, `ai.endpoint`)
        #[arg(value_name = "KEY")]
        key: Option<String>,

        /// Print storage credentials in clear text
        #[arg(long)]
        reveal: bool,
    },
    /// Set a configuration value.
    Set {
        /// Configuration key to set
        #[arg(value_name = "KEY")]
        key: String,
        /// Value to set
        #[arg(value_name = "VALUE")]
        value: String,
    },
    /// Unset a configuration value.
    Unset {
        /// Configuration key to unset
        #[arg(value_name = "KEY")]
        key: String,
    },
    /// Reset configuration to defaults (requires confirmation).
    Reset,
}

#[derive(Debug, Subcommand)]
pub enum SemesterSubcommand {
    /// Complete a new semester from subject rows.
    Add {
        /// Subject row as `NAME:CREDITS:GRADE` (repeatable; GRADE may be empty)
        #[arg(short, long = "subject", value_name = "ROW", required = true)]
        subjects: Vec<String>,
    },
    /// Replace the subjects of a recorded semester.
    Edit {
        /// 1-based semester number
        #[arg(value_name = "N")]
        index: usize,
        /// Subject row as `NAME:CREDITS:GRADE` (repeatable)
        #[arg(short, long = "subject", value_name = "ROW", required = true)]
        subjects: Vec<String>,
    },
    /// Delete a semester; later semesters are renumbered.
    Remove {
        /// 1-based semester number
        #[arg(value_name = "N")]
        index: usize,
    },
    /// List recorded semesters with their SGPA.
    List,
    /// Show the subject rows of one semester.
    Show {
        /// 1-based semester number
        #[arg(value_name = "N")]
        index: usize,
    },
    /// Delete every recorded semester (requires confirmation).
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Summary styles accepted by the AI service
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum SummaryTypeArg {
    /// Academic register (default)
    Academic,
    /// A few sentences
    Brief,
    /// Section-by-section
    Detailed,
    /// Bullet list
    BulletPoints,
}

impl From<SummaryTypeArg> for wiz_scholar::pipeline::SummaryType {
    fn from(arg: SummaryTypeArg) -> Self {
        match arg {
            SummaryTypeArg::Academic => Self::Academic,
            SummaryTypeArg::Brief => Self::Brief,
            SummaryTypeArg::Detailed => Self::Detailed,
            SummaryTypeArg::BulletPoints => Self::BulletPoints,
        }
    }
}

/// Answer styles accepted by the AI service
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum AnswerStyleArg {
    /// Short answer (default)
    Concise,
    /// Longer answer
    Detailed,
    /// Answer with reasoning
    Explanatory,
}

impl From<AnswerStyleArg> for wiz_scholar::pipeline::AnswerStyle {
    fn from(arg: AnswerStyleArg) -> Self {
        match arg {
            AnswerStyleArg::Concise => Self::Concise,
            AnswerStyleArg::Detailed => Self::Detailed,
            AnswerStyleArg::Explanatory => Self::Explanatory,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum PdfSubcommand {
    /// Upload a PDF to the pipeline server.
    Upload {
        /// Path to the PDF
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Summarize the document right after the upload
        #[arg(long)]
        summarize: bool,

        /// Summary style used with --summarize
        #[arg(long, value_enum, default_value = "academic")]
        summary_type: SummaryTypeArg,
    },
    /// Summarize an already stored PDF by its delivery URL.
    Summarize {
        /// Delivery URL returned by `pdf upload`
        #[arg(value_name = "URL")]
        pdf_url: String,

        /// Summary style
        #[arg(long, value_enum, default_value = "academic")]
        summary_type: SummaryTypeArg,

        /// Original file name, passed along to the AI service
        #[arg(long, value_name = "NAME")]
        filename: Option<String>,
    },
    /// Ask a question about an uploaded document or a piece of text.
    Ask {
        /// Question to ask
        #[arg(value_name = "QUESTION")]
        question: String,

        /// Public id of an uploaded document
        #[arg(short, long = "document", value_name = "ID", conflicts_with = "context")]
        document_id: Option<String>,

        /// Plain-text context to answer from
        #[arg(short, long, value_name = "TEXT", required_unless_present = "document_id")]
        context: Option<String>,

        /// Answer style
        #[arg(long, value_enum, default_value = "concise")]
        style: AnswerStyleArg,
    },
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    ///
    /// If no subcommand is provided, displays all configuration values.
    Config {
        #[command(subcommand)]
        subcommand: Option<ConfigSubcommand>,
    },
    /// Record, edit and inspect semesters.
    Semester {
        #[command(subcommand)]
        subcommand: SemesterSubcommand,
    },
    /// Print the cumulative GPA over all recorded semesters.
    Cgpa,
    /// Compute the SGPA future semesters need to reach a target CGPA.
    Target {
        /// Target CGPA on the ten-point scale
        #[arg(value_name = "CGPA")]
        cgpa: f64,

        /// Number of semesters still to come
        #[arg(short, long, value_name = "N", default_value_t = 1)]
        semesters: u32,
    },
    /// Generate a transcript report of all recorded semesters.
    Report {
        /// Output file path (optional; defaults to config `reports_dir`)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Report format: markdown (md) or html
        #[arg(short, long, value_name = "FORMAT", default_value = "html")]
        format: String,

        /// Title printed at the top of the transcript
        #[arg(long, default_value = "Academic Transcript")]
        title: String,
    },
    /// Run the upload/summarize pipeline server.
    Serve,
    /// Talk to a running pipeline server.
    Pdf {
        /// Server base URL (defaults to the configured host and port)
        #[arg(long, value_name = "URL", global = true)]
        server: Option<String>,

        #[command(subcommand)]
        subcommand: PdfSubcommand,
    },
}

#[derive(Parser, Debug)]
#[command(
    name = "wizscholar",
    about = "Wiz Scholar command-line interface",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    /// Set the runtime log level (error|warn|info|debug). Falls back to config if omitted.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Enable verbose output (runtime only)
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Enable debug-level logging and runtime debug flag (shorthand)
    #[arg(long = "debug")]
    pub debug_flag: bool,

    /// Write runtime logs to a file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    // --- Config overrides ---
    /// Override config logging level (stored in config file)
    #[arg(long = "config-level", value_enum)]
    pub config_level: Option<LogLevelArg>,

    /// Override config log file path
    #[arg(long = "config-log-file", value_name = "PATH")]
    pub config_log_file: Option<PathBuf>,

    /// Override config verbose flag (true/false)
    #[arg(long = "config-verbose", value_parser = BoolishValueParser::new())]
    pub config_verbose: Option<bool>,

    /// Override server bind address
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Override server port
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Override AI service endpoint
    #[arg(long = "ai-endpoint", value_name = "URL")]
    pub ai_endpoint: Option<String>,

    /// Override data directory (where semesters are stored)
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Override reports output directory
    #[arg(long = "reports-dir", value_name = "DIR")]
    pub reports_dir: Option<PathBuf>,

    /// Subcommand to execute.
    /// A subcommand is required to run the CLI.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Convert CLI flags into config overrides
    ///
    /// # Returns
    /// A `ConfigOverrides` struct with values from CLI flags, where `None` means no override.
    ///
    /// # Examples
    /// ```ignore
    /// let args = Cli::parse();
    /// let overrides = args.to_config_overrides();
    /// config.apply_overrides(&overrides);
    /// ```
    pub fn to_config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            level: self.config_level.map(|lvl| lvl.to_string()),
            file: self
                .config_log_file
                .as_ref()
                .map(|p| p.to_string_lossy().to_string()),
            verbose: self.config_verbose,
            host: self.host.clone(),
            port: self.port,
            ai_endpoint: self.ai_endpoint.clone(),
            data_dir: self
                .data_dir
                .as_ref()
                .map(|p| p.to_string_lossy().to_string()),
            reports_dir: self
                .reports_dir
                .as_ref()
                .map(|p| p.to_string_lossy().to_string()),
        }
    }
}
