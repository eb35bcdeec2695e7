//! # News Flow
//!
//! Terminal front-end for the `news_flow` search engine.
//!
//! ## Usage
//!
//! ```sh
//! news_flow --api-key KEY search -k "AI 人工知能" -l jp -s relevancy
//! news_flow --api-key KEY watch
//! ```
//!
//! ## Modes
//!
//! - **search**: builds one query from the flags, runs it through the
//!   orchestrator and prints the result as Markdown
//! - **watch**: runs a live [`SearchSession`]. Each stdin line is a field
//!   change, and the state is re-rendered whenever a search settles.

use clap::Parser;
use news_flow::api::NewsApiClient;
use news_flow::config::AppConfig;
use news_flow::models::SearchFilters;
use news_flow::orchestrator::{SearchOrchestrator, SearchPhase};
use news_flow::outputs::{json, markdown};
use news_flow::session::SearchSession;
use std::error::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::{Cli, Command, LINE_HELP, LineCommand, SearchArgs, WatchArgs, parse_line};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!("news_flow starting up");

    let args = Cli::parse();
    debug!(?args.config, ?args.base_url, "Parsed CLI arguments");

    let debounce_override = match &args.command {
        Command::Watch(WatchArgs { debounce_ms }) => *debounce_ms,
        Command::Search(_) => None,
    };
    let config = AppConfig::load(args.config.as_deref())?.with_overrides(
        args.api_key,
        args.base_url,
        debounce_override,
    );
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(e.into());
    }

    let client = NewsApiClient::new(&config.news_api)?;

    match args.command {
        Command::Search(search_args) => run_search(client, search_args).await?,
        Command::Watch(_) => run_watch(client, &config).await?,
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, millis = elapsed.as_millis() as u64, "Execution complete");
    Ok(())
}

/// One search straight through the orchestrator, no debounce involved.
#[instrument(level = "info", skip_all, fields(keyword = %args.keyword))]
async fn run_search(client: NewsApiClient, args: SearchArgs) -> Result<(), Box<dyn Error>> {
    let filters = SearchFilters {
        keyword: args.keyword,
        language: args.language,
        date_from: args.from,
        date_to: args.to,
        sort_by: args.sort_by,
    };
    println!("{}\n", markdown::filters_summary(&filters));

    let mut orchestrator = SearchOrchestrator::new(client);
    match orchestrator.search(&filters).await {
        None => {
            warn!("Keyword is empty; nothing to search");
            Ok(())
        }
        Some(Ok(result)) => {
            println!("{}", markdown::result_to_markdown(&result));
            if let Some(path) = &args.json_output {
                if let Err(e) = json::write_result(&result, path).await {
                    error!(path = %path.display(), error = %e, "Failed to write JSON output");
                }
            }
            Ok(())
        }
        Some(Err(info)) => {
            println!("{}", markdown::state_to_markdown(orchestrator.state()));
            Err(info.message.into())
        }
    }
}

/// Live form: stdin lines in, rendered state out.
#[instrument(level = "info", skip_all)]
async fn run_watch(client: NewsApiClient, config: &AppConfig) -> Result<(), Box<dyn Error>> {
    let mut session = SearchSession::spawn(client, &config.search);
    let mut updates = session.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{LINE_HELP}\n");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("stdin closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_line(&line) {
                    Ok(LineCommand::Keyword(k)) => session.on_keyword_input(k),
                    Ok(LineCommand::Language(l)) => session.on_language_changed(l),
                    Ok(LineCommand::From(d)) => session.on_date_from_changed(d),
                    Ok(LineCommand::To(d)) => session.on_date_to_changed(d),
                    Ok(LineCommand::Sort(s)) => session.on_sort_by_changed(s),
                    Ok(LineCommand::Search) => session.search_now(),
                    Ok(LineCommand::Clear) => {
                        session.clear();
                        println!("(cleared)");
                    }
                    Ok(LineCommand::Help) => println!("{LINE_HELP}"),
                    Ok(LineCommand::Quit) => break,
                    Err(msg) => println!("{msg}"),
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    warn!("Search session ended unexpectedly");
                    break;
                }
                let state = updates.borrow_and_update().clone();
                match state.phase {
                    SearchPhase::Loading => println!("{}", markdown::filters_summary(&session.filters())),
                    SearchPhase::Succeeded | SearchPhase::Failed => println!("{}", markdown::state_to_markdown(&state)),
                    SearchPhase::Idle => {}
                }
            }
        }
    }

    session.shutdown();
    Ok(())
}
