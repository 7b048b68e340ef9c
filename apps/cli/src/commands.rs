//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use url::Url;

use scholarstack_merge::{
    Applied, Command as DocCommand, Highlighter, Merger, Session, strip_selected,
};
use scholarstack_scholar::{Navigation, ScholarClient, classify};
use scholarstack_shared::{
    AppConfig, FetchConfig, HtmlDocument, MergeOptions, init_config, load_config,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// ScholarStack: stack Scholar result cards into one document.
#[derive(Parser)]
#[command(
    name = "scholarstack",
    version,
    about = "Accumulate Google Scholar result cards into a single HTML document.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Merge the result cards of one or more source pages into a document.
    Merge {
        /// The accumulating document (created on first merge).
        dest: PathBuf,

        /// Source page files, merged in order.
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        /// Print the merge reports as JSON.
        #[arg(long)]
        json: bool,

        /// Report what would happen without writing the document.
        #[arg(long)]
        dry_run: bool,
    },

    /// List the result cards in a document.
    Cards {
        /// Document to inspect.
        file: PathBuf,

        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Highlight a search term in a document, or clear highlights.
    Highlight {
        /// Document to rewrite.
        file: PathBuf,

        /// Term to highlight (case-insensitive).
        #[arg(short, long, conflicts_with = "clear")]
        term: Option<String>,

        /// Remove all highlights instead.
        #[arg(long)]
        clear: bool,

        /// Write to this path instead of in place.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Remove the cards selected in the browser.
    Strip {
        /// Document to rewrite.
        file: PathBuf,

        /// Write to this path instead of in place.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Fetch a Scholar results page to a file.
    Fetch {
        /// Search query.
        query: String,

        /// Where to write the fetched page.
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    // The binary logs as `scholarstack`, the library crates under their own
    // names; keep them at the same level.
    let filter = match cli.verbose {
        0 => "scholarstack=info,scholarstack_merge=info,scholarstack_scholar=info,scholarstack_shared=info",
        1 => "scholarstack=debug,scholarstack_merge=debug,scholarstack_scholar=debug,scholarstack_shared=debug",
        _ => "scholarstack=trace,scholarstack_merge=trace,scholarstack_scholar=trace,scholarstack_shared=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Merge {
            dest,
            sources,
            json,
            dry_run,
        } => cmd_merge(&dest, &sources, json, dry_run).await,
        Command::Cards { file, json } => cmd_cards(&file, json).await,
        Command::Highlight {
            file,
            term,
            clear,
            out,
        } => cmd_highlight(&file, term.as_deref(), clear, out.as_deref()).await,
        Command::Strip { file, out } => cmd_strip(&file, out.as_deref()).await,
        Command::Fetch { query, out } => cmd_fetch(&query, &out).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_merge(dest: &Path, sources: &[PathBuf], json: bool, dry_run: bool) -> Result<()> {
    let config = load_config()?;
    let options = MergeOptions::from(&config);

    let document = HtmlDocument::load_or_empty(dest)?;
    let before_hash = document.content_hash();
    let mut session = Session::open(&options, document)?;

    for source in sources {
        let page = HtmlDocument::load(source)?;
        session.enqueue(DocCommand::Merge { source: page.text });
    }

    info!(dest = %dest.display(), sources = sources.len(), "merging");
    let applied = session.process()?;

    let mut bootstrapped = false;
    let mut reports = Vec::new();
    for (source, record) in sources.iter().zip(&applied) {
        if let Applied::Merged(report) = record {
            bootstrapped |= report.bootstrapped;
            reports.push((source, report.clone()));
        }
    }
    let appended: usize = reports.iter().map(|(_, r)| r.cards_appended).sum();
    let dropped: usize = reports.iter().map(|(_, r)| r.cards_dropped).sum();

    let document = session.into_document();
    let changed = document.content_hash() != before_hash;
    if !dry_run {
        document.save(dest)?;
    }

    if json {
        let payload = serde_json::json!({
            "dest": dest.display().to_string(),
            "bootstrapped": bootstrapped,
            "cards_appended": appended,
            "cards_dropped": dropped,
            "changed": changed,
            "dry_run": dry_run,
            "sources": reports
                .iter()
                .map(|(source, report)| {
                    serde_json::json!({
                        "source": source.display().to_string(),
                        "report": report,
                    })
                })
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!();
    if bootstrapped {
        println!("  New document bootstrapped from {}", sources[0].display());
    }
    for (source, report) in &reports {
        println!(
            "  {}: {} cards found, {} appended, {} dropped",
            source.display(),
            report.cards_found,
            report.cards_appended,
            report.cards_dropped
        );
    }
    println!(
        "  Document: {}{}",
        dest.display(),
        if dry_run { " (dry run, not written)" } else { "" }
    );
    println!();

    Ok(())
}

async fn cmd_cards(file: &Path, json: bool) -> Result<()> {
    let config = load_config()?;
    let options = MergeOptions::from(&config);
    let merger = Merger::new(options.signature)?;

    let document = HtmlDocument::load(file)?;
    let cards = merger.find_cards(&document.text)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&cards)?);
        return Ok(());
    }

    println!();
    println!("  {} result cards in {}", cards.len(), file.display());
    for (i, card) in cards.iter().enumerate() {
        let title = card.title.as_deref().unwrap_or("(untitled)");
        match &card.href {
            Some(href) => {
                let note = match Url::parse(href) {
                    Ok(url) if classify(&url) == Navigation::Stay => " [scholar]",
                    Ok(_) => " [external]",
                    Err(_) => "",
                };
                println!("  {:>3}. {title}{note}", i + 1);
                println!("       {href}");
            }
            None => println!("  {:>3}. {title}", i + 1),
        }
    }
    println!();

    Ok(())
}

async fn cmd_highlight(
    file: &Path,
    term: Option<&str>,
    clear: bool,
    out: Option<&Path>,
) -> Result<()> {
    let config = load_config()?;
    let options = MergeOptions::from(&config);
    let highlighter = Highlighter::new(&options.highlight_class)?;

    let document = HtmlDocument::load(file)?;
    let target = out.unwrap_or(file);

    if clear {
        let outcome = highlighter.unmark(&document.text)?;
        HtmlDocument::new(outcome.html).save(target)?;
        println!(
            "  Removed {} highlights, wrote {}",
            outcome.removed,
            target.display()
        );
        return Ok(());
    }

    let term = term.ok_or_else(|| eyre!("pass --term <text> or --clear"))?;
    let outcome = highlighter.apply(&document.text, term)?;
    HtmlDocument::new(outcome.html).save(target)?;
    println!(
        "  Marked {} occurrences of {term:?}, wrote {}",
        outcome.marks,
        target.display()
    );

    Ok(())
}

async fn cmd_strip(file: &Path, out: Option<&Path>) -> Result<()> {
    let config = load_config()?;
    let options = MergeOptions::from(&config);

    let document = HtmlDocument::load(file)?;
    let target = out.unwrap_or(file);

    let outcome = strip_selected(&document.text, &options.selection_class)?;
    HtmlDocument::new(outcome.html).save(target)?;
    println!(
        "  Removed {} selected elements, wrote {}",
        outcome.removed,
        target.display()
    );

    Ok(())
}

async fn cmd_fetch(query: &str, out: &Path) -> Result<()> {
    let config = load_config()?;
    let client = ScholarClient::new(&FetchConfig::from(&config))?;

    info!(query, "fetching Scholar results");

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner.set_message(format!("Fetching results for {query:?}"));

    let fetched = client.fetch_results(query).await;
    spinner.finish_and_clear();
    let page = fetched?;

    let bytes = page.html.len();
    HtmlDocument::new(page.html).save(out)?;

    println!();
    println!("  Saved {bytes} bytes to {}", out.display());
    println!("  URL:     {}", page.url);
    println!("  Status:  {}", page.status);
    println!(
        "  Charset: {}",
        page.charset.as_deref().unwrap_or("(unspecified)")
    );
    println!("  SHA-256: {}", page.content_hash);
    println!("  Fetched: {}", page.fetched_at);
    println!();

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
