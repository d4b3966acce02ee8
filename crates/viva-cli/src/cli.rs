use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "viva")]
#[command(about = "Viva - write essays, review your words", long_about = None)]
pub struct Cli {
    /// Backend origin
    #[arg(long, global = true, env = "VIVA_API_URL")]
    pub api_url: Option<String>,

    /// Directory holding storage.json
    #[arg(long, global = true, env = "VIVA_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "VIVA_TIMEOUT_SECS")]
    pub timeout: Option<u64>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in with a Google ID token
    Login {
        #[arg(long)]
        google_token: String,
    },
    /// Forget the stored token and user
    Logout,
    /// Show the current session and the backend's view of the user
    Whoami,
    /// Essays
    Essays {
        #[command(subcommand)]
        action: EssayAction,
    },
    /// Show a sentence with its expression mappings
    Sentence { id: i64 },
    /// Word review
    Words {
        #[command(subcommand)]
        action: WordAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum EssayAction {
    /// List your essays
    List,
    /// Show one essay with its sentences
    Show { id: i64 },
    /// Submit a new essay
    Submit {
        #[arg(long)]
        content: String,
        /// Image to attach
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Sentence ids of an essay
    Sentences { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum WordAction {
    /// Add a word to review
    Add(AddWordArgs),
    /// Search your words; no keyword lists all of them
    Search { keyword: Option<String> },
    /// Number of words due today
    Count,
    /// Words due today
    Due,
    /// Show one word
    Show { id: i64 },
    /// Record a review answer (quality 0-5)
    Review {
        id: i64,
        #[arg(value_parser = clap::value_parser!(i64).range(0..=5))]
        quality: i64,
    },
    /// Mark a word as known, or unknown with --unknown
    Known {
        id: i64,
        #[arg(long)]
        unknown: bool,
    },
    /// Today's review statistics
    Stat,
    /// Reviews per day between two dates (YYYY-MM-DD)
    DayStat { start: NaiveDate, end: NaiveDate },
    /// Send a corrected expression to Anki
    Anki(AnkiArgs),
}

#[derive(Args, Debug)]
pub struct AddWordArgs {
    #[arg(long)]
    pub word: String,
    #[arg(long)]
    pub wrong_word: String,
    #[arg(long)]
    pub translation: String,
    #[arg(long)]
    pub example: String,
}

#[derive(Args, Debug)]
pub struct AnkiArgs {
    #[arg(long)]
    pub sentence: String,
    /// The learner's original expression
    #[arg(long)]
    pub chinese: String,
    #[arg(long)]
    pub wrong_english: String,
    #[arg(long)]
    pub correct_english: String,
}

impl Cli {
    /// `RUST_LOG`-style default filter for the chosen verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}
