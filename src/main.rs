use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, warn};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Instant;

use sales_rank::ingest::{DataSource, IngestError};
use sales_rank::load::{load_and_score, Dashboard};
use sales_rank::scoring::{self, ScoringConfig};

const EXIT_SUCCESS: i32 = 0;
const EXIT_DATA: i32 = 1;
const EXIT_NETWORK: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
enum OutputFormat {
    #[default]
    Table,
    Tsv,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Overall rankings by composite score
    Rankings {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Category leaders and per-bucket rankings
    Leaders,
    /// Rep x bucket performance matrix
    Matrix,
    /// Team quick stats
    Summary,
    /// Normalize a spreadsheet and write it as a JSON snapshot
    Convert {
        /// Spreadsheet to convert (path or glob)
        input: String,
        /// Where to write the JSON (printed when omitted)
        output: Option<PathBuf>,
    },
    /// Write a sample spreadsheet in the standard layout
    Sample {
        #[arg(default_value = "sample_sales_data.csv")]
        path: PathBuf,
    },
}

#[derive(Parser, Debug)]
#[command(name = "sales-rank")]
#[command(about = "Weekly sales rep performance dashboard", long_about = None)]
#[command(version)]
struct Cli {
    /// Spreadsheet export to read (path or glob; newest match wins)
    #[arg(short, long, global = true)]
    input: Option<String>,

    /// Public Google Sheet to read instead of a file
    #[arg(long, global = true)]
    sheet_url: Option<String>,

    /// Worksheet to read from an Excel workbook
    #[arg(short, long, global = true)]
    worksheet: Option<String>,

    /// Minimum total appointments for the overall rankings
    #[arg(short = 'm', long = "min-appts", global = true)]
    min_appts: Option<u32>,

    /// Path to config file (defaults to ~/.config/sales-rank/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn exit_code_for(e: &IngestError) -> i32 {
    if e.is_network() {
        EXIT_NETWORK
    } else {
        EXIT_DATA
    }
}

/// Load and rank, exiting with the matching code on failure
async fn load_or_exit(source: &DataSource, scoring: &ScoringConfig, verbose: bool) -> Dashboard {
    let start_time = Instant::now();
    if verbose {
        eprintln!("Loading {}", source.label());
    }
    match load_and_score(source, scoring).await {
        Ok(dashboard) => {
            if verbose {
                eprintln!(
                    "Loaded {} reps in {:?}",
                    dashboard.reps.len(),
                    start_time.elapsed()
                );
            }
            if !dashboard.rejections.is_empty() {
                eprintln!(
                    "{}",
                    sales_rank::output::format_rejections(
                        &dashboard.rejections,
                        sales_rank::output::should_use_colors()
                    )
                );
            }
            dashboard
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(exit_code_for(&e));
        }
    }
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+)
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    let cli = Cli::parse();
    sales_rank::stderr_buffer::init_logger(cli.verbose);

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config = match sales_rank::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate config at startup
    if let Err(errors) = sales_rank::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }
    let effective_scoring = config.effective_scoring();
    let min_appts = cli
        .min_appts
        .or(config.min_appointments)
        .unwrap_or(scoring::DEFAULT_MIN_APPOINTMENTS);

    // Commands that do not need the dashboard data
    match &cli.command {
        Some(Commands::Sample { path }) => {
            if let Err(e) = sales_rank::sample::write_sample_csv(path) {
                eprintln!("Error: {:#}", e);
                std::process::exit(EXIT_DATA);
            }
            println!("Sample data written to {}", path.display());
            std::process::exit(EXIT_SUCCESS);
        }
        Some(Commands::Convert { input, output }) => {
            run_convert(
                input,
                cli.worksheet.as_deref().or(config.worksheet.as_deref()),
                output.as_deref(),
                &effective_scoring,
                cli.verbose,
            )
            .await;
            std::process::exit(EXIT_SUCCESS);
        }
        _ => {}
    }

    // CLI flags win over config values
    let input = cli.input.or(config.input.clone());
    let sheet_url = cli.sheet_url.or(config.sheet_url.clone());
    let worksheet = cli.worksheet.or(config.worksheet.clone());
    let source = match DataSource::from_args(
        input.as_deref(),
        sheet_url.as_deref(),
        worksheet.as_deref(),
    ) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(exit_code_for(&e));
        }
    };
    if source == DataSource::Sample {
        warn!("No input or sheet URL given; showing sample data");
    }

    let command = match cli.command {
        Some(c) => c,
        None if std::io::stdout().is_terminal() => {
            let theme =
                sales_rank::tui::resolve_theme(config.theme.unwrap_or_default());
            let app = sales_rank::tui::App::new_loading(
                source,
                effective_scoring,
                min_appts,
                config.auto_reload_interval(),
                theme,
            );
            if let Err(e) = sales_rank::tui::run_tui(app).await {
                eprintln!("TUI error: {:#}", e);
                std::process::exit(EXIT_DATA);
            }
            std::process::exit(EXIT_SUCCESS);
        }
        None => {
            // Not a terminal: print every view
            let dashboard = load_or_exit(&source, &effective_scoring, cli.verbose).await;
            print_all(&dashboard, &effective_scoring, min_appts);
            std::process::exit(EXIT_SUCCESS);
        }
    };

    let dashboard = load_or_exit(&source, &effective_scoring, cli.verbose).await;
    let use_colors = sales_rank::output::should_use_colors();

    match command {
        Commands::Rankings { format } => {
            let ranked = scoring::filter_by_min_appointments(&dashboard.ranked, min_appts);
            match format {
                OutputFormat::Table => {
                    println!("{}", rankings_heading(min_appts));
                    println!(
                        "{}",
                        sales_rank::output::format_rankings_table(&ranked, use_colors)
                    );
                }
                OutputFormat::Tsv => {
                    let tsv = sales_rank::output::format_tsv(&ranked);
                    if !tsv.is_empty() {
                        println!("{}", tsv);
                    }
                }
                OutputFormat::Json => match sales_rank::output::format_json(&ranked) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error: failed to serialize rankings: {}", e);
                        std::process::exit(EXIT_DATA);
                    }
                },
            }
        }
        Commands::Leaders => {
            println!("{}", leaders_text(&dashboard, &effective_scoring, use_colors));
        }
        Commands::Matrix => {
            let rows = scoring::matrix_rows(&dashboard.ranked, &effective_scoring);
            println!("{}", sales_rank::output::format_matrix(&rows, use_colors));
        }
        Commands::Summary => {
            let summary =
                scoring::summary(&dashboard.reps, &dashboard.ranked, &effective_scoring);
            println!(
                "{}",
                sales_rank::output::format_summary(
                    &summary,
                    &dashboard.source_label,
                    dashboard.loaded_at,
                    use_colors
                )
            );
        }
        Commands::Sample { .. } | Commands::Convert { .. } => {}
    }

    std::process::exit(EXIT_SUCCESS);
}

fn rankings_heading(min_appts: u32) -> String {
    format!(
        "Overall Performance Rankings ({})",
        sales_rank::output::min_appts_label(min_appts)
    )
}

fn leaders_text(dashboard: &Dashboard, scoring_config: &ScoringConfig, use_colors: bool) -> String {
    let leaders = scoring::category_leaders(&dashboard.reps, scoring_config);
    let tables: Vec<_> = sales_rank::model::UnitBucket::ALL
        .into_iter()
        .map(|b| (b, scoring::category_rankings(&dashboard.reps, b, scoring_config)))
        .collect();
    sales_rank::output::format_leaders(
        &leaders,
        &tables,
        scoring_config.leader_min_appointments(),
        use_colors,
    )
}

/// Every view in sequence, for piped output
fn print_all(dashboard: &Dashboard, scoring_config: &ScoringConfig, min_appts: u32) {
    let use_colors = sales_rank::output::should_use_colors();
    let summary = scoring::summary(&dashboard.reps, &dashboard.ranked, scoring_config);
    let ranked = scoring::filter_by_min_appointments(&dashboard.ranked, min_appts);
    let rows = scoring::matrix_rows(&dashboard.ranked, scoring_config);

    println!(
        "{}",
        sales_rank::output::format_summary(
            &summary,
            &dashboard.source_label,
            dashboard.loaded_at,
            use_colors
        )
    );
    println!();
    println!("{}", rankings_heading(min_appts));
    println!(
        "{}",
        sales_rank::output::format_rankings_table(&ranked, use_colors)
    );
    println!();
    println!("{}", leaders_text(dashboard, scoring_config, use_colors));
    println!();
    println!("{}", sales_rank::output::format_matrix(&rows, use_colors));
}

async fn run_convert(
    input: &str,
    worksheet: Option<&str>,
    output: Option<&std::path::Path>,
    scoring_config: &ScoringConfig,
    verbose: bool,
) {
    let source = match DataSource::from_args(Some(input), None, worksheet) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(exit_code_for(&e));
        }
    };
    let dashboard = load_or_exit(&source, scoring_config, verbose).await;

    let stats = sales_rank::normalize::data_stats(&dashboard.reps);
    println!("{}", sales_rank::convert::format_data_stats(&stats));
    println!();

    match output {
        Some(path) => {
            if let Err(e) = sales_rank::convert::save_json_file(path, &dashboard.reps) {
                eprintln!("Error: {:#}", e);
                std::process::exit(EXIT_DATA);
            }
            println!(
                "Converted {} reps to {}",
                dashboard.reps.len(),
                path.display()
            );
        }
        None => match sales_rank::convert::json_preview(
            &dashboard.reps,
            sales_rank::convert::PREVIEW_CHARS,
        ) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {:#}", e);
                std::process::exit(EXIT_DATA);
            }
        },
    }
}
