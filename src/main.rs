// Entry point and high-level CLI flow.
//
// - Option [1] loads the three yearly exports, printing diagnostics.
//   Loading again replaces whatever was loaded before.
// - Option [2] composes the dashboard and writes the JSON/CSV outputs.
// - Option [3] shows the inspection backlog status, ranked per `--backlog-by`.
// - `--batch` runs [1] and [2] once without the menu.
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use once_cell::sync::Lazy;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{error, info};

use qms_dashboard::backlog::{self, BacklogMode};
use qms_dashboard::loader;
use qms_dashboard::output;
use qms_dashboard::reports;
use qms_dashboard::util;
use qms_dashboard::{compose_dashboard, DashboardConfig, YearlyData};

// In-memory app state so the CSVs are loaded once but reports can be
// generated multiple times in a single run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<YearlyData>,
}

#[derive(Parser, Debug)]
#[command(name = "qms_dashboard")]
#[command(about = "Quality inspection dashboard series from yearly CSV exports")]
struct Args {
    /// TOML config file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding dataYYy.csv files
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Output directory for generated reports
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Current (newest) reporting year
    #[arg(long)]
    year: Option<i32>,

    /// Load and generate once, without the interactive menu
    #[arg(long)]
    batch: bool,

    /// Inspection backlog CSV for menu option [3]
    #[arg(long, default_value = "data/Status.csv")]
    backlog: PathBuf,

    /// Rank backlog customers by open work orders or by total quantity
    #[arg(long, value_enum, default_value_t = BacklogMode::Count)]
    backlog_by: BacklogMode,
}

fn build_config(args: &Args) -> Result<DashboardConfig> {
    let mut config = match &args.config {
        Some(path) => DashboardConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => DashboardConfig::default(),
    };
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(year) = args.year {
        config.current_year = year;
    }
    config.validate()?;
    Ok(config)
}

fn lock_state() -> Result<std::sync::MutexGuard<'static, AppState>> {
    APP_STATE.lock().map_err(|_| anyhow!("application state lock poisoned"))
}

/// Print `prompt` and read one trimmed line. `None` once input is closed.
fn read_line(input: &mut impl BufRead, prompt: &str) -> Option<String> {
    print!("{prompt}");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match input.read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Read a single menu choice after the common "Enter choice:" prompt.
fn read_choice(input: &mut impl BufRead) -> Option<String> {
    read_line(input, "Enter choice: ")
}

/// Ask the user whether to go back to the menu after generating reports.
///
/// Returns `true` if the user chose `Y`; `N` or closed input give `false`.
fn prompt_back_to_menu(input: &mut impl BufRead) -> bool {
    while let Some(answer) = read_line(input, "Back to Report Selection (Y/N): ") {
        match answer.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
    false
}

/// Handle option [1]: load all three yearly datasets.
///
/// Nothing is stored unless every dataset loads; a failed load also drops
/// the previously loaded data.
fn handle_load(config: &DashboardConfig) -> Result<()> {
    let paths = config.dataset_paths();
    let (data, load_reports) = match loader::load_yearly(&paths) {
        Ok(loaded) => loaded,
        Err(e) => {
            lock_state()?.data = None;
            return Err(e).context("Failed to load yearly datasets");
        }
    };
    for ((path, report), year) in paths.iter().zip(&load_reports).zip(config.years()) {
        println!(
            "{}: {} rows loaded from {} ({} skipped, {} without issue date)",
            year,
            util::format_int(report.loaded_rows as u64),
            path.display(),
            util::format_int(report.parse_errors as u64),
            util::format_int(report.undated_rows as u64)
        );
    }
    println!();
    lock_state()?.data = Some(data);
    Ok(())
}

/// Handle option [2]: compose the dashboard and write every output.
fn handle_generate_reports(config: &DashboardConfig) -> Result<()> {
    let data = lock_state()?.data.clone();
    let Some(data) = data else {
        println!("Error: No data loaded. Please load the CSV files first (option 1).\n");
        return Ok(());
    };

    let dash = compose_dashboard(config, &data);
    let out = &config.output_dir;
    std::fs::create_dir_all(out)
        .with_context(|| format!("Failed to create output directory {}", out.display()))?;

    output::write_json(&out.join("dashboard.json"), &dash)?;

    let monthly = reports::monthly_table(&dash);
    output::write_table_csv(&out.join("monthly_series.csv"), &monthly)?;
    println!("Monthly series ({} reporting months close on the 25th)\n", dash.current_year);
    output::preview_series_table(&monthly);

    let urgent = reports::urgent_table(&dash);
    output::write_table_csv(&out.join("urgent_inspections.csv"), &urgent)?;
    println!("Urgent inspection status\n");
    output::preview_series_table(&urgent);

    let breakdowns = reports::breakdown_rows(&dash);
    output::write_csv(&out.join("breakdowns.csv"), &breakdowns)?;
    println!("Breakdowns (top {} plus Others)\n", config.top_n);
    output::preview_table_rows(&breakdowns, 12);

    let comparisons = reports::comparison_rows(&dash);
    output::write_csv(&out.join("comparisons.csv"), &comparisons)?;
    println!("Current vs prior year\n");
    output::preview_table_rows(&comparisons, 12);

    info!(output_dir = %out.display(), "reports written");
    println!("(Full tables exported to {})\n", out.display());
    Ok(())
}

/// Handle option [3]: inspection backlog grouped by customer.
fn handle_backlog(path: &Path, mode: BacklogMode) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    let items = backlog::load_backlog(path, today)
        .with_context(|| format!("Failed to load backlog {}", path.display()))?;
    let totals = backlog::summary(&items);
    println!(
        "Open work orders: {} (total qty {})\n",
        util::format_int(totals.total_count as u64),
        util::format_int(totals.total_qty)
    );
    let groups = backlog::group_by_customer(&items, mode);
    output::preview_table_rows(&backlog::customer_rows(&groups), 10);
    let rows = backlog::backlog_rows(&items);
    output::preview_table_rows(&rows, rows.len());
    Ok(())
}

fn report(result: Result<()>) {
    if let Err(e) = result {
        error!("{e:#}");
        eprintln!("Error: {e:#}\n");
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qms_dashboard=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;
    info!(year = config.current_year, data_dir = %config.data_dir.display(), "configuration ready");

    if args.batch {
        handle_load(&config)?;
        return handle_generate_reports(&config);
    }

    let mut input = io::stdin().lock();
    loop {
        println!("Quality Dashboard ({}):", config.current_year);
        println!("[1] Load the yearly files");
        println!("[2] Generate Reports");
        println!("[3] Inspection backlog status\n");
        let Some(choice) = read_choice(&mut input) else {
            println!();
            info!("input closed, exiting");
            break;
        };
        match choice.as_str() {
            "1" => report(handle_load(&config)),
            "2" => {
                println!();
                report(handle_generate_reports(&config));
                if !prompt_back_to_menu(&mut input) {
                    println!("Exiting the program.");
                    break;
                }
            }
            "3" => report(handle_backlog(&args.backlog, args.backlog_by)),
            _ => println!("Invalid choice. Please enter 1, 2 or 3.\n"),
        }
    }
    Ok(())
}
