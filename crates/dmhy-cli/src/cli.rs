use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dmhy_core::{
    ClientConfig, CsvLayout, NATIVE_TIME_FORMAT, ProxyConfig, SearchQuery, SearchSession,
    SessionConfig, StopReason, TimeFormat, TitleRule,
};

use crate::render::{prompt_selection, write_table};

/// Top-level CLI for the dmhy.org search tool.
#[derive(Debug, Parser)]
#[command(name = "dmhy")]
#[command(about = "Search dmhy.org and pick a magnet link", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Search dmhy.org. Ids follow the site's own query string.
    Search(SearchArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TitleRuleArg {
    Last,
    Second,
}

impl From<TitleRuleArg> for TitleRule {
    fn from(arg: TitleRuleArg) -> Self {
        match arg {
            TitleRuleArg::Last => TitleRule::LastAnchor,
            TitleRuleArg::Second => TitleRule::SecondAnchorOrFirst,
        }
    }
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Search keyword.
    #[arg(short, long)]
    pub keyword: String,

    /// Category id.
    #[arg(short, long, default_value_t = 0)]
    pub sort_id: u32,

    /// Release group id.
    #[arg(short, long, default_value_t = 0)]
    pub team_id: u32,

    /// Listing order.
    #[arg(short, long, default_value = "date-desc")]
    pub order: String,

    /// strftime pattern for release times.
    #[arg(long, default_value = NATIVE_TIME_FORMAT)]
    pub time_format: String,

    /// Stop after this many pages.
    #[arg(long, default_value_t = 999)]
    pub max_pages: u32,

    /// Which title cell link holds the title.
    #[arg(long, value_enum, default_value_t = TitleRuleArg::Last)]
    pub title_rule: TitleRuleArg,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Skip TLS certificate verification.
    #[arg(long)]
    pub insecure: bool,

    /// Proxy URL for both http and https requests.
    #[arg(long)]
    pub proxy: Option<String>,

    /// Use the http_proxy / https_proxy environment variables.
    #[arg(long, conflicts_with = "proxy")]
    pub system_proxy: bool,

    /// Convert the chosen result's size to this unit (B, KB, MB, GB, TB).
    #[arg(long)]
    pub unit: Option<String>,

    /// Append the chosen result to this CSV file.
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Write the three-column title,size,magnet CSV layout.
    #[arg(long, requires = "save")]
    pub legacy_csv: bool,

    /// Print the chosen result as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

impl SearchArgs {
    pub fn query(&self) -> SearchQuery {
        SearchQuery::new(self.keyword.clone())
            .sort_id(self.sort_id)
            .team_id(self.team_id)
            .order(self.order.clone())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout_secs: self.timeout,
            verify_tls: !self.insecure,
            proxy: self.proxy.as_ref().map(|url| ProxyConfig {
                http: Some(url.clone()),
                https: Some(url.clone()),
            }),
            use_system_proxy: self.system_proxy,
            ..ClientConfig::default()
        }
    }

    pub fn session_config(&self) -> Result<SessionConfig> {
        Ok(SessionConfig {
            time_format: TimeFormat::new(self.time_format.clone())?,
            max_pages: self.max_pages,
            title_rule: self.title_rule.into(),
        })
    }

    fn csv_layout(&self) -> CsvLayout {
        if self.legacy_csv {
            CsvLayout::Legacy
        } else {
            CsvLayout::Full
        }
    }
}

pub async fn run_from_args() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        CliCommand::Search(args) => run_search(&args).await,
    }
}

async fn run_search(args: &SearchArgs) -> Result<()> {
    let mut session = SearchSession::new(args.client_config(), args.session_config()?)
        .context("failed to set up search session")?;

    let query = args.query();
    tracing::debug!(?query, "starting search");
    let summary = session
        .search(&query)
        .await
        .with_context(|| format!("search for '{}' failed", query.keyword))?;

    if summary.stop == StopReason::PageLimit {
        tracing::warn!(
            pages = summary.pages_fetched,
            "stopped at --max-pages, results may be incomplete"
        );
    }

    if session.is_empty() {
        println!("No results for '{}'.", query.keyword);
        return Ok(());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_table(&mut out, session.results())?;

    let stdin = io::stdin();
    let Some(index) = prompt_selection(&mut stdin.lock(), &mut out, session.len())? else {
        writeln!(out, "Selection cancelled.")?;
        return Ok(());
    };

    session.select(index)?;
    if let Some(unit) = &args.unit {
        session.format_selected_size(unit)?;
    }
    if let Some(path) = &args.save {
        session
            .persist(path, args.csv_layout())
            .with_context(|| format!("failed to save to {}", path.display()))?;
        tracing::info!(path = %path.display(), "saved selection");
    }

    let Some(chosen) = session.selected() else {
        return Ok(());
    };
    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(chosen)?)?;
    } else {
        writeln!(out, "Selected {} ({})", chosen.title, chosen.size)?;
        writeln!(out, "Magnet: {}", chosen.magnet)?;
    }

    Ok(())
}
