use chrono::Local;
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use dashboard::config::{
    config_dir, load_config, resolve_output_dir, session_dir, Config, CONFIG_TEMPLATE,
};
use dashboard::error::{DashboardError, Result};
use dashboard::export::{export_file_name, run_export, selection_label, ExportStatus, ExportTracker};
use dashboard::persist::{join_ids, FileStorage, FilterSnapshot, FilterStore};
use dashboard::render::{entity_table, kpi_table, panel_table, report_table, section_status, sheet_table};
use dashboard::report::{Family, ReportKind, ReportPayload};
use dashboard::workbook::report_sheet;
use dashboard::{Entity, Filter, MonthKey, Orchestrator, ReportClient, SectionState};

#[derive(Parser)]
#[command(name = "dashboard")]
#[command(version, about = "Terminal business-intelligence dashboard with Excel export", long_about = None)]
struct Cli {
    /// Path to config directory (default: XDG config dir or ~/.dashboard)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// Directory holding the session filter and entity cache
    #[arg(long, global = true)]
    session_dir: Option<PathBuf>,

    /// Log requests and state changes to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config.toml
    Init,

    /// Show configuration and session state
    Status,

    /// Fetch and cache the entity list for a dashboard family
    Companies {
        /// retail, b2b or branches
        family: String,
    },

    /// Show or change the persisted filter
    Filter {
        #[command(subcommand)]
        action: FilterAction,
    },

    /// List the reports a family provides
    Reports {
        /// retail, b2b or branches
        family: String,
    },

    /// Print the summary KPIs
    Summary {
        /// retail, b2b or branches
        family: String,
    },

    /// Fetch one report and print it as a table
    Report {
        /// retail, b2b or branches
        family: String,

        /// Report slug from 'dashboard reports <family>'
        slug: String,
    },

    /// Fetch every report and write an .xlsx workbook
    Export {
        /// retail, b2b or branches
        family: String,

        /// Output directory (default: [export] output_dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Interactive dashboard with lazily opened panels
    Session {
        /// retail, b2b or branches
        family: String,
    },
}

#[derive(Subcommand)]
enum FilterAction {
    /// Print the persisted filter
    Show,

    /// Replace the persisted filter
    Set {
        /// Month in YYYY-MM format
        #[arg(short, long)]
        month: String,

        /// Entity id (can be repeated; none means every known entity)
        #[arg(short, long = "company", value_name = "ID")]
        company: Vec<i64>,
    },

    /// Forget the persisted filter and entity cache
    Clear,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };
    let store = FilterStore::new(FileStorage::new(cli.session_dir.unwrap_or_else(session_dir)));

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Status => cmd_status(&cfg_dir, &store),
        Commands::Companies { family } => cmd_companies(&cfg_dir, &store, family.parse()?),
        Commands::Filter { action } => match action {
            FilterAction::Show => cmd_filter_show(&store),
            FilterAction::Set { month, company } => cmd_filter_set(&store, &month, company),
            FilterAction::Clear => cmd_filter_clear(&store),
        },
        Commands::Reports { family } => cmd_reports(family.parse()?),
        Commands::Summary { family } => cmd_summary(&cfg_dir, &store, family.parse()?),
        Commands::Report { family, slug } => cmd_report(&cfg_dir, &store, family.parse()?, &slug),
        Commands::Export { family, output } => cmd_export(&cfg_dir, &store, family.parse()?, output),
        Commands::Session { family } => cmd_session(&cfg_dir, store, family.parse()?),
    }
}

type Store = FilterStore<FileStorage>;

/// Initialize config directory with the template config
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    if cfg_dir.exists() {
        return Err(DashboardError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::create_dir_all(cfg_dir.join("exports"))?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;

    println!("Initialized dashboard config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Point it at your reporting API:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Load the company list:           dashboard companies retail");
    println!("  3. Pick a month:                    dashboard filter set --month 2026-01");
    println!();
    println!("Then export a workbook:");
    println!("  dashboard export retail");

    Ok(())
}

fn load(cfg_dir: &Path) -> Result<(Config, ReportClient)> {
    let config = load_config(cfg_dir)?;
    let client = ReportClient::from_settings(&config.api);
    Ok((config, client))
}

/// Entities for `family`, cached in the session store on every fetch.
fn refresh_entities(client: &ReportClient, store: &Store, family: Family) -> Vec<Entity> {
    let entities = client.entities_or_fallback(family);
    if !entities.is_empty() {
        store.save_entities(&entities);
    }
    entities
}

/// Persisted month (else last month) over the persisted ids (else every
/// known entity).
fn effective_filter(client: &ReportClient, store: &Store, family: Family) -> Filter {
    let today = Local::now().date_naive();
    let snapshot = store.load_filter();
    let stored = snapshot.as_ref().and_then(FilterSnapshot::to_filter);

    if let Some(filter) = stored.as_ref().filter(|f| f.is_fetchable()) {
        return filter.clone();
    }
    let ids = refresh_entities(client, store, family).into_iter().map(|e| e.id);
    match stored {
        Some(filter) => Filter::for_month(filter.month(), ids),
        None => Filter::default_for(today, ids),
    }
}

fn cmd_status(cfg_dir: &Path, store: &Store) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let output_dir = resolve_output_dir(&config.export.output_dir, cfg_dir);

    println!("Config:      {}", cfg_dir.join("config.toml").display());
    println!("API:         {}", config.api.base_url);
    if config.api.timeout_secs == 0 {
        println!("Timeout:     none");
    } else {
        println!("Timeout:     {}s", config.api.timeout_secs);
    }
    println!("Months back: {}", config.api.months_back);
    println!("Export dir:  {}", output_dir.display());
    println!("Session dir: {}", store.storage().dir().display());
    match store.load_filter() {
        Some(snapshot) => println!("Filter:      {}", describe_snapshot(&snapshot)),
        None => println!("Filter:      (none, previous month over all companies)"),
    }
    println!("Cached companies: {}", store.load_entities().len());
    Ok(())
}

fn describe_snapshot(snapshot: &FilterSnapshot) -> String {
    if snapshot.company_ids.is_empty() {
        format!("{} (all companies)", snapshot.month)
    } else {
        format!("{} companies [{}]", snapshot.month, join_ids(&snapshot.company_ids))
    }
}

fn cmd_companies(cfg_dir: &Path, store: &Store, family: Family) -> Result<()> {
    let (_, client) = load(cfg_dir)?;
    let entities = refresh_entities(&client, store, family);

    if entities.is_empty() {
        println!("No companies available for {family}.");
        return Ok(());
    }
    println!("{}", entity_table(&entities));
    Ok(())
}

fn cmd_filter_show(store: &Store) -> Result<()> {
    match store.load_filter() {
        Some(snapshot) => {
            println!("Month:     {}", snapshot.month);
            if snapshot.company_ids.is_empty() {
                println!("Companies: all");
            } else {
                println!("Companies: {}", store.resolve_names(&snapshot.company_ids));
            }
        }
        None => println!("No filter set. Reports default to the previous month over all companies."),
    }
    Ok(())
}

fn cmd_filter_set(store: &Store, month: &str, company: Vec<i64>) -> Result<()> {
    let month = MonthKey::parse(month)?;
    let filter = Filter::for_month(month, company);
    let snapshot = FilterSnapshot::from_filter(&filter);
    store.save_filter(&snapshot);
    println!(
        "Filter set: {} to {} ({})",
        filter.date_from(),
        filter.date_to(),
        describe_snapshot(&snapshot)
    );
    Ok(())
}

fn cmd_filter_clear(store: &Store) -> Result<()> {
    store.clear();
    println!("Filter cleared.");
    Ok(())
}

fn cmd_reports(family: Family) -> Result<()> {
    println!("{}", report_table(family));
    Ok(())
}

fn require_fetchable(filter: &Filter) -> Result<()> {
    if filter.is_fetchable() {
        Ok(())
    } else {
        Err(DashboardError::EmptySelection)
    }
}

fn print_period(family: Family, filter: &Filter) {
    println!(
        "{} | {} to {} | {} companies",
        family.title(),
        filter.date_from(),
        filter.date_to(),
        filter.entity_ids().len()
    );
}

fn cmd_summary(cfg_dir: &Path, store: &Store, family: Family) -> Result<()> {
    let (_, client) = load(cfg_dir)?;
    let filter = effective_filter(&client, store, family);
    require_fetchable(&filter)?;

    let payload = client.fetch(family.summary(), &filter)?;
    print_period(family, &filter);
    let summary = match &payload {
        ReportPayload::Summary(summary) => Some(summary),
        _ => None,
    };
    println!("{}", kpi_table(family, summary));
    Ok(())
}

fn cmd_report(cfg_dir: &Path, store: &Store, family: Family, slug: &str) -> Result<()> {
    let kind = family.find_report(slug)?;
    let (_, client) = load(cfg_dir)?;
    let filter = effective_filter(&client, store, family);
    require_fetchable(&filter)?;

    let payload = client.fetch(kind, &filter)?;
    print_period(family, &filter);
    print_payload(family, kind, &payload);
    Ok(())
}

fn print_payload(family: Family, kind: ReportKind, payload: &ReportPayload) {
    println!("{}", kind.title());
    match payload {
        ReportPayload::Summary(summary) => println!("{}", kpi_table(family, Some(summary))),
        other => println!("{}", sheet_table(&report_sheet(kind, other))),
    }
}

fn export_selection(client: &ReportClient, store: &Store, family: Family, filter: &Filter) -> String {
    if family.exports_entity_names() && store.load_entities().is_empty() {
        refresh_entities(client, store, family);
    }
    selection_label(family, filter, store)
}

fn cmd_export(cfg_dir: &Path, store: &Store, family: Family, output: Option<PathBuf>) -> Result<()> {
    let (config, client) = load(cfg_dir)?;
    let filter = effective_filter(&client, store, family);
    require_fetchable(&filter)?;

    let dir = output.unwrap_or_else(|| resolve_output_dir(&config.export.output_dir, cfg_dir));
    let selection = export_selection(&client, store, family, &filter);
    println!("Exporting {}...", export_file_name(family, &filter));
    let path = run_export(&client, family, &filter, selection, &dir)?;
    println!("Saved: {}", path.display());
    Ok(())
}

const SESSION_HELP: &str = "\
Commands:
  panels                   list panels and their state
  summary                  show the summary KPIs
  open|close|toggle <slug> open or close a panel (first open fetches it)
  show <slug>              print a panel's data
  apply <YYYY-MM> [ids..]  replace the filter (no ids = every known company)
  export                   write the workbook for the current filter
  help                     this text
  quit                     leave the session";

fn cmd_session(cfg_dir: &Path, store: Store, family: Family) -> Result<()> {
    let (config, client) = load(cfg_dir)?;
    let filter = effective_filter(&client, &store, family);
    let output_dir = resolve_output_dir(&config.export.output_dir, cfg_dir);

    let mut session = Session {
        orchestrator: Orchestrator::new(client, family, Arc::new(filter)),
        store,
        output_dir,
        exports: ExportTracker::new(),
    };
    session.orchestrator.mount();

    let stdin = io::stdin();
    let mut out = io::stdout();
    session.run(stdin.lock(), &mut out)
}

struct Session {
    orchestrator: Orchestrator,
    store: Store,
    output_dir: PathBuf,
    exports: ExportTracker,
}

impl Session {
    fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        let family = self.orchestrator.family();
        writeln!(out, "{} session. Type 'help' for commands.", family.title())?;
        self.print_filter(out)?;

        write!(out, "{family}> ")?;
        out.flush()?;
        for line in input.lines() {
            let line = line?;
            let words: Vec<&str> = line.split_whitespace().collect();
            match words.as_slice() {
                [] => {}
                ["quit"] | ["exit"] => break,
                ["help"] => writeln!(out, "{SESSION_HELP}")?,
                words => {
                    if let Err(e) = self.dispatch(words, out) {
                        writeln!(out, "Error: {e}")?;
                    }
                }
            }
            if let ExportStatus::Failed(message) = self.exports.status() {
                writeln!(out, "(export failed: {message})")?;
            }
            write!(out, "{family}> ")?;
            out.flush()?;
        }
        writeln!(out)?;
        Ok(())
    }

    fn dispatch<W: Write>(&mut self, words: &[&str], out: &mut W) -> Result<()> {
        let family = self.orchestrator.family();
        match words {
            ["panels"] => {
                let rows = self
                    .orchestrator
                    .panels()
                    .iter()
                    .map(|p| (p.kind(), p.is_open(), p.state()));
                writeln!(out, "{}", panel_table(rows))?;
            }
            ["summary"] => {
                let state = self.orchestrator.summary();
                self.print_state(out, family.summary(), &state)?;
            }
            ["open", slug] => {
                let kind = self.panel_kind(slug)?;
                self.orchestrator.open(kind);
                self.print_panel(out, kind)?;
            }
            ["toggle", slug] => {
                let kind = self.panel_kind(slug)?;
                self.orchestrator.toggle(kind);
                self.print_panel(out, kind)?;
            }
            ["close", slug] => {
                let kind = self.panel_kind(slug)?;
                self.orchestrator.close(kind);
                writeln!(out, "{} closed.", kind.title())?;
            }
            ["show", slug] => {
                let kind = self.panel_kind(slug)?;
                if let Some(panel) = self.orchestrator.panel(kind) {
                    self.print_state(out, kind, &panel.state())?;
                }
            }
            ["apply", month, ids @ ..] => {
                let month = MonthKey::parse(month)?;
                let ids = ids
                    .iter()
                    .map(|id| {
                        id.parse::<i64>()
                            .map_err(|_| DashboardError::InvalidEntityId(id.to_string()))
                    })
                    .collect::<Result<Vec<_>>>()?;
                let filter = if ids.is_empty() {
                    let known = self.known_ids();
                    Filter::for_month(month, known)
                } else {
                    Filter::for_month(month, ids)
                };
                self.store.save_filter(&FilterSnapshot::from_filter(&filter));
                let refreshed = self.orchestrator.apply(Arc::new(filter));
                self.print_filter(out)?;
                writeln!(out, "{refreshed} open panel(s) refreshed.")?;
            }
            ["export"] => {
                let filter = self.orchestrator.filter().clone();
                let client = self.orchestrator.client().clone();
                let selection = export_selection(&client, &self.store, family, &filter);
                let dir = self.output_dir.clone();
                let result = self
                    .exports
                    .track(|| run_export(&client, family, &filter, selection, &dir));
                if let Ok(path) = result {
                    writeln!(out, "Saved: {}", path.display())?;
                }
            }
            _ => writeln!(out, "Unknown command. Type 'help' for commands.")?,
        }
        Ok(())
    }

    fn known_ids(&self) -> Vec<i64> {
        let cached = self.store.load_entities();
        let entities = if cached.is_empty() {
            refresh_entities(self.orchestrator.client(), &self.store, self.orchestrator.family())
        } else {
            cached
        };
        entities.into_iter().map(|e| e.id).collect()
    }

    fn panel_kind(&self, slug: &str) -> Result<ReportKind> {
        let family = self.orchestrator.family();
        let kind = family.find_report(slug)?;
        if kind.is_summary() {
            return Err(DashboardError::UnknownReport {
                family: family.to_string(),
                report: slug.to_string(),
            });
        }
        Ok(kind)
    }

    fn print_filter<W: Write>(&self, out: &mut W) -> Result<()> {
        let filter = self.orchestrator.filter();
        writeln!(
            out,
            "Filter: {} to {} | {} companies",
            filter.date_from(),
            filter.date_to(),
            filter.entity_ids().len()
        )?;
        Ok(())
    }

    fn print_panel<W: Write>(&self, out: &mut W, kind: ReportKind) -> Result<()> {
        if let Some(panel) = self.orchestrator.panel(kind) {
            if panel.is_open() {
                self.print_state(out, kind, &panel.state())?;
            } else {
                writeln!(out, "{} closed.", kind.title())?;
            }
        }
        Ok(())
    }

    fn print_state<W: Write>(&self, out: &mut W, kind: ReportKind, state: &SectionState) -> Result<()> {
        let family = self.orchestrator.family();
        if let Some(error) = &state.error {
            writeln!(out, "{}: error: {error}", kind.title())?;
        }
        match &state.data {
            Some(ReportPayload::Summary(summary)) => writeln!(out, "{}", kpi_table(family, Some(summary)))?,
            Some(payload) => {
                writeln!(out, "{}", kind.title())?;
                writeln!(out, "{}", sheet_table(&report_sheet(kind, payload)))?;
            }
            None if state.error.is_none() => {
                writeln!(out, "{}: {}", kind.title(), section_status(state))?;
            }
            None => {}
        }
        Ok(())
    }
}
