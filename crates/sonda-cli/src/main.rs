//! # sonda-cli
//!
//! Binary entry point for the Sonda harness.
//!
//! This crate provides:
//! - `sonda serve` — run the mock backend
//! - `sonda run <flow>` — execute one test flow and display its records
//! - `sonda records` — inspect the record history

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sonda_core::{
    DisplayMode, Flow, FlowRecord, FlowRunner, FlowStatus, HarnessConfig, HttpApi, RecordEntry,
    RecordHistory, RecordLog, Reporter, ReportSink,
};
use sonda_server::{AppState, FaultInjector};
use std::io::{IsTerminal, stdout};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// Color output mode for terminal display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorMode {
    /// Automatically detect if stdout is a TTY
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl ColorMode {
    /// Returns true if colors should be used based on mode and terminal detection.
    fn should_use_colors(self) -> bool {
        match self {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => stdout().is_terminal(),
        }
    }
}

/// Output format for the records command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format for programmatic access
    Json,
}

/// Flow selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FlowArg {
    Cadastro,
    Login,
    Edicao,
    Listagem,
}

impl FlowArg {
    fn to_flow(self) -> Flow {
        match self {
            FlowArg::Cadastro => Flow::Cadastro,
            FlowArg::Login => Flow::Login,
            FlowArg::Edicao => Flow::Edicao,
            FlowArg::Listagem => Flow::Listagem,
        }
    }
}

/// Display mode selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Monitor,
    Cliente,
}

impl ModeArg {
    fn to_mode(self) -> DisplayMode {
        match self {
            ModeArg::Monitor => DisplayMode::Monitor,
            ModeArg::Cliente => DisplayMode::Client,
        }
    }
}

/// ANSI color codes for terminal output.
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const RED: &str = "\x1b[31m";
    pub const CYAN: &str = "\x1b[36m";
}

/// Sonda - manual API test harness with randomized fault injection
#[derive(Parser, Debug)]
#[command(name = "sonda", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "sonda.yml", global = true)]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Color output mode (auto, always, never)
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    color: ColorMode,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the mock backend
    Serve(ServeArgs),

    /// Execute one test flow against the backend
    Run(RunArgs),

    /// View the record history
    Records(RecordsArgs),
}

/// Arguments for the serve subcommand.
#[derive(Parser, Debug)]
struct ServeArgs {
    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,

    /// Fixed RNG seed for reproducible fault draws
    #[arg(long)]
    seed: Option<u64>,

    /// Override the pedidos failure probability (0.0 to 1.0)
    #[arg(long)]
    list_failure_rate: Option<f64>,
}

/// Arguments for the run subcommand.
#[derive(Parser, Debug)]
struct RunArgs {
    /// Flow to execute
    #[arg(value_enum)]
    flow: FlowArg,

    /// Override the API base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Override the display mode
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Do not append records to the record log
    #[arg(long)]
    no_log: bool,
}

/// Arguments for the records subcommand.
#[derive(Parser, Debug)]
struct RecordsArgs {
    /// Show only the last N records
    #[arg(long)]
    last: Option<usize>,

    /// Filter by flow (e.g., "Listagem")
    #[arg(long)]
    flow: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Path to the record file (default: .sonda/records.jsonl)
    #[arg(long)]
    file: Option<PathBuf>,

    /// Clear the record history
    #[arg(long)]
    clear: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Serve(args) => serve_command(config, args).await,
        Commands::Run(args) => run_command(config, cli.color, args).await,
        Commands::Records(args) => records_command(cli.color, args),
    }
}

fn load_config(path: &std::path::Path) -> Result<HarnessConfig> {
    let config = if path.exists() {
        HarnessConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?
    } else {
        HarnessConfig::default()
    };

    let warnings = config
        .validate()
        .context("Configuration validation failed")?;
    for warning in &warnings {
        eprintln!("{warning}");
    }

    Ok(config)
}

async fn serve_command(config: HarnessConfig, args: ServeArgs) -> Result<()> {
    let port = args.port.unwrap_or(config.server.port);
    let rate = args
        .list_failure_rate
        .unwrap_or(config.faults.list_failure_rate);
    let seed = args.seed.or(config.faults.seed);

    let injector = match seed {
        Some(seed) => FaultInjector::seeded_with_rate(seed, rate),
        None => FaultInjector::with_rate(rate),
    };

    info!("Sonda v{}", env!("CARGO_PKG_VERSION"));
    sonda_server::serve(port, AppState::new(injector))
        .await
        .with_context(|| format!("Failed to serve on port {port}"))
}

async fn run_command(config: HarnessConfig, color_mode: ColorMode, args: RunArgs) -> Result<()> {
    let use_colors = color_mode.should_use_colors();
    let flow = args.flow.to_flow();
    let mode = args
        .mode
        .map_or(config.client.mode, ModeArg::to_mode);
    let base_url = args.base_url.unwrap_or(config.client.base_url);

    print_mode_indicator(mode, use_colors);

    let log = if args.no_log {
        None
    } else {
        Some(RecordLog::default_path())
    };
    let sink = ConsoleSink {
        use_colors,
        flow_label: flow.label(),
        log,
    };

    let api = HttpApi::new(base_url);
    let reporter = Reporter::new(mode, sink);
    let mut runner = FlowRunner::new(api, reporter);

    let start = Instant::now();
    let status = runner.run(flow).await;
    print_flow_summary(flow, status, start.elapsed().as_secs_f64(), use_colors);

    Ok(())
}

fn records_command(color_mode: ColorMode, args: RecordsArgs) -> Result<()> {
    let use_colors = color_mode.should_use_colors();

    let history = match args.file {
        Some(path) => RecordHistory::new(path),
        None => RecordHistory::default_path(),
    };

    // Handle clear command
    if args.clear {
        history.clear()?;
        if use_colors {
            println!("{}✓{} Record history cleared", colors::GREEN, colors::RESET);
        } else {
            println!("Record history cleared");
        }
        return Ok(());
    }

    if !history.exists() {
        println!("No record history found. Run `sonda run <flow>` to generate records.");
        return Ok(());
    }

    let mut entries = if let Some(n) = args.last {
        history.read_last(n)?
    } else if let Some(ref flow) = args.flow {
        history.filter_by_flow(flow)?
    } else {
        history.read_all()?
    };

    // Apply secondary filter (flow + last)
    if args.last.is_some() {
        if let Some(ref flow) = args.flow {
            entries.retain(|r| r.flow == *flow);
        }
    }

    if entries.is_empty() {
        println!("No matching records found.");
        return Ok(());
    }

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&entries)?;
            println!("{json}");
        }
        OutputFormat::Table => {
            print_records_table(&entries, use_colors);
        }
    }

    Ok(())
}

/// Sink that renders records to the terminal and mirrors them into the
/// record log.
struct ConsoleSink {
    use_colors: bool,
    flow_label: &'static str,
    log: Option<RecordLog>,
}

impl ReportSink for ConsoleSink {
    fn emit(&mut self, record: &FlowRecord) {
        use colors::*;

        let (icon, color) = if record.success {
            ("✓", GREEN)
        } else {
            ("✗", RED)
        };

        if self.use_colors {
            println!("{color}{BOLD}{icon} {}{RESET}", record.title);
        } else {
            println!("{icon} {}", record.title);
        }

        let body = serde_json::to_string_pretty(&record.body)
            .unwrap_or_else(|_| record.body.to_string());
        for line in body.lines() {
            if self.use_colors {
                println!("  {DIM}{line}{RESET}");
            } else {
                println!("  {line}");
            }
        }
        println!();

        if let Some(log) = &mut self.log {
            let entry = RecordEntry::new(self.flow_label, record);
            if let Err(e) = log.log(&entry) {
                warn!("Failed to log record: {e}");
            }
        }
    }
}

fn print_mode_indicator(mode: DisplayMode, use_colors: bool) {
    use colors::*;

    if use_colors {
        let color = match mode {
            DisplayMode::Monitor => YELLOW,
            DisplayMode::Client => CYAN,
        };
        println!("{color}{BOLD}[{}]{RESET}\n", mode.label());
    } else {
        println!("[{}]\n", mode.label());
    }
}

fn print_flow_summary(flow: Flow, status: FlowStatus, elapsed: f64, use_colors: bool) {
    use colors::*;

    let (color, icon) = match status {
        FlowStatus::Completed => (GREEN, "✓"),
        FlowStatus::Failed => (RED, "✗"),
        FlowStatus::Idle | FlowStatus::Running => (YELLOW, "⚠"),
    };

    let separator = "─".repeat(58);

    if use_colors {
        println!("{BOLD}┌{separator}┐{RESET}");
        println!("{BOLD}│{RESET} {color}{BOLD}{icon}{RESET} Fluxo {}: {color}{}{RESET}", flow.label(), status.label());
        println!("{BOLD}├{separator}┤{RESET}");
        println!("{BOLD}│{RESET}   Etapas:  {CYAN}{}{RESET}", flow.steps().len());
        println!("{BOLD}│{RESET}   Tempo:   {CYAN}{elapsed:.1}s{RESET}");
        println!("{BOLD}└{separator}┘{RESET}");
    } else {
        println!("+{}+", "-".repeat(58));
        println!("| {icon} Fluxo {}: {}", flow.label(), status.label());
        println!("+{}+", "-".repeat(58));
        println!("|   Etapas:  {}", flow.steps().len());
        println!("|   Tempo:   {elapsed:.1}s");
        println!("+{}+", "-".repeat(58));
    }
}

fn print_records_table(entries: &[RecordEntry], use_colors: bool) {
    use colors::*;

    if use_colors {
        println!("{BOLD}{DIM}  # │ Fluxo     │ Título                             │ OK │ Corpo{RESET}");
        println!("{DIM}────┼───────────┼────────────────────────────────────┼────┼─────────────────{RESET}");
    } else {
        println!("  # | Fluxo     | Título                             | OK | Corpo");
        println!("----|-----------|------------------------------------|----|-----------------");
    }

    for (i, entry) in entries.iter().enumerate() {
        let ok = if entry.success { "✓" } else { "✗" };
        let body_preview = preview(&entry.body.to_string(), 40);

        if use_colors {
            let ok_color = if entry.success { GREEN } else { RED };
            println!(
                "{DIM}{:>3}{RESET} │ {:<9} │ {:<34} │ {ok_color}{ok}{RESET}  │ {DIM}{}{RESET}",
                i + 1,
                truncate(&entry.flow, 9),
                truncate(&entry.title, 34),
                body_preview
            );
        } else {
            println!(
                "{:>3} | {:<9} | {:<34} | {ok}  | {}",
                i + 1,
                truncate(&entry.flow, 9),
                truncate(&entry.title, 34),
                body_preview
            );
        }
    }

    if use_colors {
        println!("\n{DIM}Total: {} records{RESET}", entries.len());
    } else {
        println!("\nTotal: {} records", entries.len());
    }
}

fn preview(s: &str, max_len: usize) -> String {
    let flattened = s.replace('\n', " ");
    if flattened.chars().count() > max_len {
        let cut: String = flattened.chars().take(max_len).collect();
        format!("{cut}...")
    } else {
        flattened
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len - 1).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_arg_mapping() {
        assert_eq!(FlowArg::Cadastro.to_flow(), Flow::Cadastro);
        assert_eq!(FlowArg::Login.to_flow(), Flow::Login);
        assert_eq!(FlowArg::Edicao.to_flow(), Flow::Edicao);
        assert_eq!(FlowArg::Listagem.to_flow(), Flow::Listagem);
    }

    #[test]
    fn test_mode_arg_mapping() {
        assert_eq!(ModeArg::Monitor.to_mode(), DisplayMode::Monitor);
        assert_eq!(ModeArg::Cliente.to_mode(), DisplayMode::Client);
    }

    #[test]
    fn test_truncate_handles_multibyte() {
        assert_eq!(truncate("Edição", 9), "Edição");
        assert_eq!(truncate("Iniciando Alteração de Dados", 10), "Iniciando…");
    }

    #[test]
    fn test_preview_flattens_newlines() {
        assert_eq!(preview("a\nb", 40), "a b");
        assert!(preview(&"x".repeat(60), 40).ends_with("..."));
    }
}
