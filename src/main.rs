//! tablesmith - static table-page builder and search indexer

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tablesmith::config::BuildConfig;
use tablesmith::error::Result;
use tablesmith::lexicon::Lexicon;
use tablesmith::{page, search, stats, texts};

#[derive(Parser)]
#[command(name = "tablesmith")]
#[command(version, about = "Static table-page builder and search indexer", long_about = None)]
#[command(after_help = "EXAMPLES:
    tablesmith                 Full build in the current directory
    tablesmith --root site     Full build against ./site
    tablesmith pages           Rebuild pages only
    tablesmith search          Rebuild the search index only")]
struct Cli {
    /// Project root holding the fragment corpus and static assets
    #[arg(long, value_name = "DIR", default_value = ".")]
    root: PathBuf,

    /// Suppress log output
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Full build: pages, search index, buzzwords, homepage, statistics
    Build,
    /// Build pages from table fragments
    Pages,
    /// Rebuild the search index from built pages
    Search,
    /// Reassemble the homepage from the manifest
    Home,
    /// Recompute corpus statistics and data banks
    Stats,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if !cli.quiet {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "tablesmith=info".into());
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = BuildConfig::from_env(&cli.root);
    let result = match cli.command.unwrap_or(Command::Build) {
        Command::Build => full_build(&config),
        Command::Pages => page::build_pages(&config).map(|_| ()),
        Command::Search => build_search(&config),
        Command::Home => page::build_home(&config).map(|_| ()),
        Command::Stats => stats::write_stats(&config).map(|_| ()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// The full pipeline, each step exactly once. Pages must land before the
/// index scan, since synonym matching reads rendered page text.
fn full_build(config: &BuildConfig) -> Result<()> {
    page::build_pages(config)?;
    build_search(config)?;
    texts::convert_buzzwords(config)?;
    page::build_home(config)?;
    stats::write_stats(config)?;
    Ok(())
}

fn build_search(config: &BuildConfig) -> Result<()> {
    let lexicon = Lexicon::load(config);
    search::build_search_index(config, &lexicon)?;
    Ok(())
}
