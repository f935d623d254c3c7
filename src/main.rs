// src/main.rs

use anyhow::{Result, bail};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use modsweep::remote::{self, ModIoClient};
use modsweep::scanner;
use modsweep::session::{Session, UserConfig};
use modsweep::snapshot::SnapshotStore;
use modsweep::sweep::executor::is_affirmative;
use modsweep::sweep::impact::format_size;
use modsweep::sweep::{SweepResult, Sweeper};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "modsweep")]
#[command(author, version, long_about = None)]
#[command(about = "Remove installed mods you are no longer subscribed to")]
struct Cli {
    /// Directory holding user.json and the snapshots
    #[arg(short = 'D', long, global = true, default_value = ".")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a mod.io token and save the session
    Setup {
        /// Mods directory to manage
        #[arg(short, long)]
        mods_path: PathBuf,
        /// OAuth2 token (https://mod.io/me/access)
        #[arg(short, long)]
        token: String,
    },
    /// Fetch subscribed mods and save subscriptions.json
    Subscriptions {
        /// Overwrite an existing snapshot without asking
        #[arg(short, long)]
        force: bool,
    },
    /// Scan the mods directory and save installedMods.json
    Scan {
        /// Overwrite an existing snapshot without asking
        #[arg(short, long)]
        force: bool,
    },
    /// Delete installed mods that are no longer subscribed
    Sweep,
    /// Show the session and snapshot counts
    Status,
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Print `question` and read one line from stdin
fn prompt(question: &str) -> Result<String> {
    print!("{} ", question);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(answer)
}

/// Ask before replacing `path`; true if it is fine to write
fn confirm_overwrite(path: &Path, force: bool) -> Result<bool> {
    if force || !path.exists() {
        return Ok(true);
    }
    let name = path.file_name().unwrap_or(path.as_os_str()).to_string_lossy();
    let answer = prompt(&format!("{} already exists. Do you want to overwrite it? (y/N):", name))?;
    Ok(is_affirmative(&answer))
}

fn sweep(data_dir: &Path) -> Result<()> {
    let session = Session::load(data_dir)?;
    let sweeper = Sweeper::new(&session);
    let plan = sweeper.plan()?;

    if plan.is_empty() {
        println!("No unsubscribed mods found.");
        return Ok(());
    }

    println!(
        "Found {} unsubscribed mod(s) to delete ({} installed, {} subscribed).",
        plan.candidates.len(),
        plan.installed.len(),
        plan.subscribed
    );
    println!(
        "Total size of mods to delete: {}",
        format_size(plan.impact.total_bytes)
    );
    for warning in plan.impact.warnings() {
        println!("  warning: could not size {}", warning);
    }
    for key in &plan.contested_keys {
        println!("  warning: '{}' is shared with a subscribed mod and will be kept", key);
    }

    if plan.mods_root_missing {
        println!();
        println!(
            "!!! WARNING: mods directory {} does not exist; check modsPath in user.json !!!",
            session.mods_root().display()
        );
    }

    if plan.risk.is_high() {
        println!();
        println!("!!! WARNING: {} !!!", plan.risk);
        println!();
    }

    if let Some(audit_path) = &plan.audit_path {
        println!(
            "Saved a list of mods to delete in {}. Please review it before confirming!",
            audit_path.display()
        );
    }

    let answer = prompt("Are you sure you want to delete these mods? (y/N):")?;
    match sweeper.execute(&plan, is_affirmative(&answer))? {
        SweepResult::NothingToDo => println!("No unsubscribed mods found."),
        SweepResult::Declined => println!("Operation cancelled."),
        SweepResult::Completed(report) => {
            for failure in report.failures() {
                println!(
                    "Error deleting mod {} ({}): {}",
                    failure.candidate.identifier,
                    failure.candidate.on_disk_key,
                    failure.error_detail.as_deref().unwrap_or("unknown error")
                );
            }
            println!(
                "\nSuccessfully deleted {} unsubscribed mod(s).",
                report.removed_count()
            );
            let failed = report.failures().count();
            if failed > 0 {
                println!("{} mod(s) could not be deleted and were kept in the list.", failed);
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let data_dir = cli.data_dir;

    match cli.command {
        Some(Commands::Setup { mods_path, token }) => {
            if !mods_path.is_dir() {
                bail!("Mods directory does not exist: {}", mods_path.display());
            }

            info!("Verifying token against mod.io");
            let profile = ModIoClient::new(token.clone())?.fetch_profile()?;

            let session = Session::new(
                &data_dir,
                UserConfig {
                    mods_path,
                    token,
                    username: profile.username,
                    profile_url: profile.profile_url,
                },
            );
            session.save()?;

            println!(
                "Logged in as {} ({})",
                session.user().username,
                session.user().profile_url
            );
            Ok(())
        }
        Some(Commands::Subscriptions { force }) => {
            let session = Session::load(&data_dir)?;
            let store = session.snapshots();

            if !confirm_overwrite(&store.subscriptions_path(), force)? {
                println!("Cancelled!");
                return Ok(());
            }

            let client = ModIoClient::new(session.token())?;
            let records = remote::refresh_subscriptions(&client, &store)?;
            println!("Saved {} subscribed mods.", records.len());
            Ok(())
        }
        Some(Commands::Scan { force }) => {
            let session = Session::load(&data_dir)?;
            let store = session.snapshots();

            if !confirm_overwrite(&store.installed_path(), force)? {
                println!("Cancelled!");
                return Ok(());
            }

            println!("Scanning for installed mods...");
            let report = scanner::scan(session.mods_root())?;
            for skipped in &report.skipped {
                println!("Error reading manifest {}: {}", skipped.path.display(), skipped.reason);
            }
            for key in &report.duplicate_keys {
                println!("warning: '{}' is claimed by more than one manifest", key);
            }

            store.save_installed(&report.items)?;
            println!("Found {} installed mods.", report.items.len());
            Ok(())
        }
        Some(Commands::Sweep) => sweep(&data_dir),
        Some(Commands::Status) => {
            match Session::load(&data_dir) {
                Ok(session) => println!(
                    "Logged in as {} ({})",
                    session.user().username,
                    session.user().profile_url
                ),
                Err(_) => println!("Not set up. Run 'modsweep setup' first."),
            }

            let store = SnapshotStore::new(&data_dir);
            if store.has_subscriptions() {
                println!("Found {} subscribed mods.", store.load_subscriptions()?.len());
            } else {
                println!("No subscribed mods found, run 'modsweep subscriptions'.");
            }
            if store.has_installed() {
                println!("Found {} installed mods.", store.load_installed()?.len());
            } else {
                println!("No installed mods found, run 'modsweep scan'.");
            }
            Ok(())
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "modsweep", &mut io::stdout());
            Ok(())
        }
        None => {
            // No command provided, show help
            println!("modsweep v{}", env!("CARGO_PKG_VERSION"));
            println!("Run 'modsweep --help' for usage information");
            Ok(())
        }
    }
}
