use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand, ValueEnum};

use crate::logging::LogDestination;

#[derive(Parser, Debug)]
#[command(
    name = "translator",
    about = "Chunked translation against a local inference service",
    version
)]
pub struct Cli {
    /// Config file (defaults to ./translator.ron when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Session file carried between invocations
    #[arg(long, global = true)]
    pub session: Option<PathBuf>,

    /// Inference service base URL
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Maximum characters per batch for new sessions
    #[arg(long, global = true)]
    pub batch_size: Option<usize>,

    #[arg(long, global = true, value_enum, default_value_t = LogDestination::File)]
    pub log: LogDestination,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Submit a document for translation
    #[command(group(ArgGroup::new("source").required(true).args(["file", "text"])))]
    Submit {
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        text: Option<String>,
    },
    /// Ask the vision model about one or more images
    Vision {
        #[arg(long = "image", required = true)]
        images: Vec<PathBuf>,
        #[arg(long, conflicts_with = "preset")]
        prompt: Option<String>,
        #[arg(long, value_enum)]
        preset: Option<VisionPreset>,
    },
    /// Advance the session by exactly one step
    Step,
    /// Keep stepping until the session stops asking for another run
    Run,
    /// Resume a job aborted by a remote failure
    Retry,
    /// Show the current session
    Status,
    /// Print the inference service configuration
    Ping,
    /// Drop the current job and model state
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum VisionPreset {
    #[default]
    Summarize,
    Receipt,
    Label,
}

impl VisionPreset {
    pub fn prompt(self) -> &'static str {
        match self {
            VisionPreset::Summarize => "Summarize the image",
            VisionPreset::Receipt => {
                "Review the receipt image and extract transaction details. \
                 Provide the information in a nice format."
            }
            VisionPreset::Label => "Review the image and assign up to 3 category labels to it",
        }
    }
}
