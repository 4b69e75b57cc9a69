use clap::{Parser, Subcommand};
use log::{error, info, LevelFilter};
use std::path::PathBuf;
use std::process::ExitCode;

use logo_keyer_core::analysis::LogoAnalysis;
use logo_keyer_core::pack::PackReport;
use logo_keyer_core::sync::{SyncAction, SyncReport, VerifyReport, VerifyStatus};
use logo_keyer_core::{
    Config, FileReport, FileStatus, KeyJob, LogLevel, LogoKeyer, NamedColor, Rgb,
};

const RULE_WIDTH: usize = 80;

#[derive(Parser)]
#[command(name = "logo-keyer")]
#[command(about = "Key logo backgrounds to transparency and maintain the logo pack")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Logo pack directory
    #[arg(long, global = true)]
    logo_dir: Option<PathBuf>,

    /// Number of threads for batch keying (0 = auto, 1 = sequential)
    #[arg(long, global = true)]
    threads: Option<usize>,

    /// Write a rotating log file to this directory instead of logging to stderr
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Make background-colored pixels transparent
    RemoveBg {
        /// Images to process
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file (single input) or directory (several inputs); default overwrites
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum RGB distance to a background color
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Background color (#RRGGBB or r,g,b); replaces the configured palette unless presets are given
        #[arg(long = "color")]
        colors: Vec<Rgb>,

        /// Named presets from the configured palette to use
        #[arg(long = "preset")]
        presets: Vec<String>,
    },

    /// Key the icon-only files of the pack in place
    FixIcons {
        /// Also copy the results into the frontend
        #[arg(long)]
        sync: bool,
    },

    /// Report size, mode and transparency of every pack file
    Analyze,

    /// Create on-dark, transparent and monochrome variants
    BuildPack {
        /// Report actions without changing files
        #[arg(long)]
        dry_run: bool,
    },

    /// Copy pack files into the frontend when missing or different
    SyncAssets,

    /// Check the frontend logo files
    Verify,

    /// Generate default configuration file
    GenerateConfig {
        /// Path to save configuration file
        #[arg(default_value = "logo-keyer.json")]
        path: PathBuf,
    },
}

fn main() -> Result<ExitCode, anyhow::Error> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Set up configuration
    let mut config = match &cli.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => Config::default(),
    };

    // Override config with command line arguments
    if let Some(dir) = &cli.logo_dir {
        config.logo_dir = dir.clone();
    }
    if let Some(threads) = cli.threads {
        config.threads = threads;
    }
    config.log_level = match cli.verbose {
        0 => config.log_level,
        1 => LogLevel::Debug,
        _ => LogLevel::Trace,
    };

    init_logging(&cli, &config)?;

    let ok = match cli.command {
        Commands::GenerateConfig { path } => {
            config.save_to_file(&path)?;
            println!("Configuration file generated at: {}", path.display());
            true
        }

        Commands::RemoveBg {
            inputs,
            output,
            threshold,
            colors,
            presets,
        } => {
            if let Some(threshold) = threshold {
                config.threshold = threshold;
            }
            if !presets.is_empty() || !colors.is_empty() {
                let mut palette = if presets.is_empty() {
                    Vec::new()
                } else {
                    config.palette()?.select(presets.as_slice())?.colors().to_vec()
                };
                palette.extend(colors.iter().map(|c| NamedColor::new(c.to_string(), *c)));
                config.palette = palette;
            }

            let keyer = LogoKeyer::new(config)?;
            let jobs = remove_bg_jobs(&inputs, output.as_ref())?;

            print_header("Removing backgrounds");
            let reports = keyer.remove_backgrounds(&jobs, jobs.len() > 1)?;
            print_file_reports(&reports)
        }

        Commands::FixIcons { sync } => {
            let keyer = LogoKeyer::new(config)?;

            print_header("Removing backgrounds from logo files...");
            let reports = keyer.fix_icons()?;
            let mut ok = print_file_reports(&reports);

            if sync {
                println!("\nUpdating frontend assets...");
                ok &= print_sync_reports(&keyer.copy_assets()?);
            }
            ok
        }

        Commands::Analyze => {
            let keyer = LogoKeyer::new(config)?;
            print_analysis(&keyer.analyze()?)
        }

        Commands::BuildPack { dry_run } => {
            config.dry_run = dry_run;
            let keyer = LogoKeyer::new(config)?;

            print_header("Creating Professional Logo Asset Pack");
            print_pack_report(&keyer.build_pack()?)
        }

        Commands::SyncAssets => {
            let keyer = LogoKeyer::new(config)?;

            print_header("Verifying app logo assets...");
            print_sync_reports(&keyer.sync_assets()?)
        }

        Commands::Verify => {
            let keyer = LogoKeyer::new(config)?;

            print_header("Verifying all logo files in app:");
            print_verify_reports(&keyer.verify_assets())
        }
    };

    if ok {
        info!("Finished without errors");
        Ok(ExitCode::SUCCESS)
    } else {
        error!("Finished with errors");
        Ok(ExitCode::FAILURE)
    }
}

/// File logging uses the configured level; stderr stays quiet below warnings
/// unless `-v` is given, since reports already go to stdout
fn init_logging(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    match &cli.log_dir {
        Some(dir) => logo_keyer_core::logging::init_logger(dir, config.log_level.into())?,
        // RUST_LOG still wins when set
        None => {
            let filter = if cli.verbose == 0 {
                LevelFilter::Warn
            } else {
                config.log_level.into()
            };
            env_logger::Builder::new()
                .filter_level(filter)
                .parse_default_env()
                .init()
        }
    }
    Ok(())
}

/// One job per input; several inputs with `-o` write into that directory
fn remove_bg_jobs(inputs: &[PathBuf], output: Option<&PathBuf>) -> anyhow::Result<Vec<KeyJob>> {
    match (output, inputs) {
        (None, _) => Ok(inputs.iter().map(KeyJob::in_place).collect()),
        (Some(out), [single]) if !out.is_dir() => Ok(vec![KeyJob::new(single, out)]),
        (Some(out), _) => {
            if !out.is_dir() {
                anyhow::bail!(
                    "Output {} must be an existing directory when processing several files",
                    out.display()
                );
            }
            inputs
                .iter()
                .map(|input| {
                    let name = input
                        .file_name()
                        .ok_or_else(|| anyhow::anyhow!("Invalid input path {}", input.display()))?;
                    Ok::<_, anyhow::Error>(KeyJob::new(input, out.join(name).with_extension("png")))
                })
                .collect()
        }
    }
}

fn print_header(title: &str) {
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("{}", title);
    println!("{}", "=".repeat(RULE_WIDTH));
}

fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_file_reports(reports: &[FileReport]) -> bool {
    let mut processed = 0;
    let mut errors = 0;

    for report in reports {
        let name = display_name(&report.path);
        match &report.status {
            FileStatus::Keyed(outcome) => {
                processed += 1;
                println!("  ✓ {}: {} pixels made transparent", name, outcome.converted);
            }
            FileStatus::Skipped => println!("  SKIP: {} (not found)", name),
            FileStatus::Failed(message) => {
                errors += 1;
                println!("  ✗ {}: ERROR - {}", name, message);
            }
        }
    }

    println!("{}", "=".repeat(RULE_WIDTH));
    println!("Processed: {}, Errors: {}", processed, errors);
    errors == 0
}

fn print_analysis(results: &[LogoAnalysis]) -> bool {
    println!("Logo File Analysis");
    println!("{}", "=".repeat(RULE_WIDTH));
    println!(
        "{:<40} {:<12} {:<15} {:<12} {:<10}",
        "Filename", "Size", "Dimensions", "Transparent", "Needs Fix"
    );
    println!("{}", "-".repeat(RULE_WIDTH));

    let yes_no = |flag: bool| if flag { "YES" } else { "NO" };
    let mut needs_fix = Vec::new();

    for analysis in results {
        match &analysis.result {
            Err(message) => println!("{:<40} ERROR: {}", analysis.name, message),
            Ok(props) => {
                let dims = format!("{}x{}", props.width, props.height);
                println!(
                    "{:<40} {:<12} {:<15} {:<12} {:<10}",
                    analysis.name,
                    analysis.size,
                    dims,
                    yes_no(props.transparent),
                    yes_no(props.needs_fix)
                );
                if props.needs_fix {
                    needs_fix.push((analysis.name.as_str(), dims));
                }
            }
        }
    }

    println!("\n{}", "=".repeat(RULE_WIDTH));
    println!("Files needing fixes: {}", needs_fix.len());
    if !needs_fix.is_empty() {
        println!("\nFiles that need transparent backgrounds:");
        for (name, dims) in &needs_fix {
            println!("  - {} ({})", name, dims);
        }
    }

    // Analysis is a report; undecodable files do not fail the run
    true
}

fn print_pack_report(report: &PackReport) -> bool {
    println!("\n1. Organizing logo-with-title files...");
    for copy in &report.on_dark_copies {
        println!("   ✓ Created: {}", display_name(&copy.to));
    }

    println!("\n2. Creating transparent logo-with-title versions...");
    for file in &report.wordmarks {
        print_step_report(file);
    }

    println!("\n3. Processing monochrome versions...");
    for copy in &report.mono_backups {
        println!("   ✓ Backup: {}", display_name(&copy.to));
    }
    for file in &report.mono {
        print_step_report(file);
    }

    println!("\n{}", "=".repeat(70));
    println!("FINAL ASSET PACK SUMMARY");
    println!("{}", "=".repeat(70));
    println!("\nFiles by category:");
    for group in &report.summary {
        println!("\n  {}:", group.category.label());
        for name in &group.files {
            println!("    - {}", name);
        }
    }
    println!("\n  TOTAL: {} files", report.total_files);

    !report.has_errors()
}

fn print_step_report(report: &FileReport) {
    match &report.status {
        FileStatus::Keyed(outcome) => println!(
            "   ✓ {}: {} pixels made transparent",
            display_name(&outcome.destination),
            outcome.converted
        ),
        FileStatus::Skipped => println!("   SKIP: {}", display_name(&report.path)),
        FileStatus::Failed(message) => {
            println!("   ✗ {}: ERROR - {}", display_name(&report.path), message)
        }
    }
}

fn print_sync_reports(reports: &[SyncReport]) -> bool {
    for report in reports {
        let line = match &report.action {
            SyncAction::SourceMissing => format!(
                "ERROR: Source {} not found",
                display_name(&report.source)
            ),
            SyncAction::Created => format!(
                "CREATED: {} (copied from {})",
                report.target.display(),
                display_name(&report.source)
            ),
            SyncAction::Updated => format!("UPDATED: {} (size/mode mismatch)", report.target.display()),
            SyncAction::Unchanged => format!(
                "OK: {} (already exists and matches)",
                report.target.display()
            ),
            SyncAction::Failed(message) => {
                format!("ERROR: {} - {}", report.target.display(), message)
            }
        };
        println!("  {}", line);

        if let Some(info) = &report.info {
            println!(
                "    Size: ({}, {}), Mode: {}, Transparent: {}",
                info.width,
                info.height,
                info.mode,
                info.has_alpha()
            );
        }
    }

    println!("{}", "=".repeat(RULE_WIDTH));
    !reports.iter().any(SyncReport::is_error)
}

fn print_verify_reports(reports: &[VerifyReport]) -> bool {
    let mut ok = true;

    for report in reports {
        match &report.status {
            VerifyStatus::Ok(info) => {
                println!("✓ {}", report.path.display());
                println!(
                    "    Size: ({}, {}), Mode: {}, Transparent: {}",
                    info.width,
                    info.height,
                    info.mode,
                    info.has_alpha()
                );
            }
            VerifyStatus::NotFound => {
                ok = false;
                println!("✗ {} - NOT FOUND", report.path.display());
            }
            VerifyStatus::Error(message) => {
                ok = false;
                println!("✗ {} - ERROR: {}", report.path.display(), message);
            }
        }
    }

    println!("{}", "=".repeat(RULE_WIDTH));
    ok
}
