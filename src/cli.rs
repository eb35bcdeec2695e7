//! Command-line interface definitions for News Flow.
//!
//! This module defines the CLI arguments using the `clap` crate, plus the
//! line commands understood by the interactive `watch` mode. Connection
//! settings can be provided via flags, environment variables or a YAML
//! config file.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use news_flow::models::{Language, SortBy};
use std::path::PathBuf;

/// Command-line arguments for the News Flow application.
///
/// # Examples
///
/// ```sh
/// # One-shot search
/// news_flow --api-key KEY search -k "AI 人工知能" --language jp --sort-by relevancy
///
/// # Interactive form, fed line by line from stdin
/// NEWS_API_KEY=KEY news_flow watch
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a config.yaml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// NewsAPI key
    #[arg(long, env = "NEWS_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Search endpoint (defaults to https://newsapi.org/v2/everything)
    #[arg(long, env = "NEWS_API_URL", global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a single search and print the results
    Search(SearchArgs),
    /// Interactive form: read field changes from stdin, search as you type
    Watch(WatchArgs),
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Keywords; multiple words are AND-joined
    #[arg(short, long)]
    pub keyword: String,

    /// Two-letter language code
    #[arg(short, long, default_value = "jp")]
    pub language: Language,

    /// Oldest publication date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Newest publication date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// publishedAt, relevancy or popularity
    #[arg(short, long, default_value = "publishedAt")]
    pub sort_by: SortBy,

    /// Also write the raw result to this JSON file
    #[arg(short, long)]
    pub json_output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Keyword debounce in milliseconds (overrides the config file)
    #[arg(long)]
    pub debounce_ms: Option<u64>,
}

/// One line of input in `watch` mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineCommand {
    Keyword(String),
    Language(Language),
    From(Option<NaiveDate>),
    To(Option<NaiveDate>),
    Sort(SortBy),
    Search,
    Clear,
    Help,
    Quit,
}

pub const LINE_HELP: &str = "\
commands:
  k <words>          set the keyword (searched after the debounce)
  lang <code>        language: jp, en, de, es, fr, ...
  from <date|->      oldest date, YYYY-MM-DD or - to unset
  to <date|->        newest date, YYYY-MM-DD or - to unset
  sort <order>       publishedAt, relevancy or popularity
  search             search now with the current form
  clear              reset the form and results
  help               show this help
  quit               exit";

fn parse_date_arg(arg: &str) -> Result<Option<NaiveDate>, String> {
    match arg {
        "" | "-" => Ok(None),
        s => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| format!("invalid date {s:?}: {e}")),
    }
}

/// Parse one `watch` line. Unknown words are reported back to the user.
pub fn parse_line(line: &str) -> Result<LineCommand, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (word, rest) = line
        .trim_start()
        .split_once(char::is_whitespace)
        .unwrap_or((line.trim(), ""));

    match word {
        // keep inner whitespace; the keyword is trimmed downstream
        "k" | "keyword" => Ok(LineCommand::Keyword(rest.to_string())),
        "lang" | "language" => rest.trim().parse().map(LineCommand::Language),
        "from" => parse_date_arg(rest.trim()).map(LineCommand::From),
        "to" => parse_date_arg(rest.trim()).map(LineCommand::To),
        "sort" => rest.trim().parse().map(LineCommand::Sort),
        "search" | "s" => Ok(LineCommand::Search),
        "clear" => Ok(LineCommand::Clear),
        "help" | "?" => Ok(LineCommand::Help),
        "quit" | "exit" | "q" => Ok(LineCommand::Quit),
        other => Err(format!("unknown command {other:?} (try `help`)")),
    }
}
