use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{anyhow, Context, Result};
use browser_core::{
    file_kind::is_previewable, load_settings, HttpRemoteService, MutationOutcome,
    SessionController, SessionEvent,
};
use clap::{Parser, Subcommand};
use shared::domain::{FolderStats, Location, SystemStats};
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod format;

use format::{display_name, format_memory, format_size, icon_label};

const STATS_TIMEOUT: Duration = Duration::from_secs(120);
const PREVIEW_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Parser, Debug)]
#[command(name = "desktop", about = "Drive a file browser session against a backend")]
struct Args {
    /// Settings file; `browser.toml` in the working directory when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    backend_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List a directory (home when omitted).
    Ls { path: Option<String> },
    Stats { path: Option<String> },
    /// Recompute statistics, bypassing the backend cache.
    Rescan { path: Option<String> },
    Ps,
    Kill { pid: u32 },
    Rename { path: String, new_name: String },
    Duplicate { path: String },
    Delete { path: String },
    Open { path: String },
    /// List a directory once its previews have loaded.
    Previews { path: Option<String> },
    /// Print system activity as it is polled.
    Watch {
        #[arg(long, default_value_t = 5)]
        ticks: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(url) = args.backend_url {
        settings.backend_url = url;
    }
    let remote = Arc::new(HttpRemoteService::new(&settings.backend_url)?);
    info!(backend = %remote.invoke_url(), "desktop: session configured");
    let session = SessionController::new(remote, settings)?;

    match args.command {
        Command::Ls { path } => {
            open(&session, path).await?;
            print_listing(&session).await;
        }
        Command::Stats { path } => {
            let mut events = session.subscribe_events();
            let location = open(&session, path).await?;
            wait_for(&mut events, STATS_TIMEOUT, |event| {
                matches!(event, SessionEvent::StatsUpdated { location: updated } if *updated == location)
            })
            .await?;
            print_stats(&session).await;
        }
        Command::Rescan { path } => {
            let mut events = session.subscribe_events();
            let location = open(&session, path).await?;
            wait_for(&mut events, STATS_TIMEOUT, |event| {
                matches!(event, SessionEvent::StatsUpdated { location: updated } if *updated == location)
            })
            .await?;
            session.rescan().await;
            print_stats(&session).await;
        }
        Command::Ps => {
            if !session.refresh_system_stats().await {
                return Err(anyhow!("system activity is unavailable"));
            }
            print_activity(&session).await;
        }
        Command::Kill { pid } => {
            session.refresh_system_stats().await;
            match session.kill_process(pid).await {
                MutationOutcome::Confirmed => println!("killed {pid}"),
                MutationOutcome::Reconciled { reason } => {
                    println!("could not kill {pid}: {reason}; activity reloaded")
                }
                MutationOutcome::Unreconciled { reason } => {
                    println!("could not kill {pid}: {reason}")
                }
            }
            print_activity(&session).await;
        }
        Command::Rename { path, new_name } => {
            let path = Location::new(path);
            session.rename(&path, &new_name).await?;
            println!("renamed {path} to {}", path.sibling(&new_name));
        }
        Command::Duplicate { path } => {
            let path = Location::new(path);
            session.duplicate(&path).await?;
            println!("duplicated {path}");
        }
        Command::Delete { path } => {
            let path = Location::new(path);
            session.delete(&path).await?;
            println!("deleted {path}");
        }
        Command::Open { path } => {
            session.open_file(&Location::new(path)).await;
        }
        Command::Previews { path } => {
            let mut events = session.subscribe_events();
            open(&session, path).await?;
            let wanted = session
                .snapshot()
                .await
                .files
                .iter()
                .any(is_previewable);
            if wanted {
                wait_for(&mut events, PREVIEW_TIMEOUT, |event| {
                    matches!(event, SessionEvent::PreviewsUpdated { .. })
                })
                .await?;
            }
            print_listing(&session).await;
        }
        Command::Watch { ticks } => {
            let mut events = session.subscribe_events();
            let poller = session.spawn_system_stats_poller();
            let timeout = session.settings().system_stats_poll_interval() * 3;
            for _ in 0..ticks {
                wait_for(&mut events, timeout, |event| {
                    *event == SessionEvent::ActivityUpdated
                })
                .await?;
                if let Some(stats) = session.snapshot().await.system_stats {
                    print_activity_line(&stats);
                }
            }
            poller.abort();
        }
    }

    Ok(())
}

/// Opens `path`, or the home location from the backend's quick paths.
async fn open(session: &Arc<SessionController>, path: Option<String>) -> Result<Location> {
    match path {
        Some(path) => session.navigate(Location::new(path)).await,
        None => session.start().await,
    }
    session
        .current_location()
        .await
        .context("backend did not provide a starting location")
}

async fn wait_for(
    events: &mut broadcast::Receiver<SessionEvent>,
    timeout: Duration,
    pred: impl Fn(&SessionEvent) -> bool,
) -> Result<SessionEvent> {
    tokio::time::timeout(timeout, async {
        loop {
            match events.recv().await {
                Ok(event) if pred(&event) => return Ok(event),
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(anyhow!("session closed its event stream"))
                }
            }
        }
    })
    .await
    .context("timed out waiting for the backend")?
}

async fn print_listing(session: &SessionController) {
    let snapshot = session.snapshot().await;
    let Some(location) = snapshot.listed_location else {
        println!("nothing listed");
        return;
    };
    println!("{location} ({} entries)", snapshot.files.len());
    for (file, icon) in session.icons().await {
        let size = if file.is_dir {
            "--".to_string()
        } else {
            format_size(file.size)
        };
        let modified = file
            .modified_at()
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!(
            "{:<16} {:<40} {:>10}  {}",
            icon_label(&icon),
            display_name(&file),
            size,
            modified
        );
    }
}

async fn print_stats(session: &SessionController) {
    let snapshot = session.snapshot().await;
    if let Some(disk) = snapshot.disk_stats {
        println!("total  {}", format_size(disk.total_bytes));
        println!("used   {}", format_size(disk.used_bytes));
        println!("free   {}", format_size(disk.free_bytes));
        return;
    }
    match snapshot.folder_stats {
        Some(stats) => print_folder_stats(&stats),
        None => println!("statistics unavailable"),
    }
}

fn print_folder_stats(stats: &FolderStats) {
    println!(
        "{} in {} files, {} folders",
        format_size(stats.total_size),
        stats.file_count,
        stats.folder_count
    );
    let b = &stats.breakdown;
    for (label, bytes) in [
        ("documents", b.documents),
        ("photos", b.photos),
        ("videos", b.videos),
        ("audio", b.audio),
        ("apps", b.apps),
        ("archives", b.archives),
        ("other", b.other),
    ] {
        println!("  {label:<10} {:>10}", format_size(bytes));
    }
}

async fn print_activity(session: &SessionController) {
    let Some(stats) = session.snapshot().await.system_stats else {
        println!("no activity snapshot");
        return;
    };
    print_activity_line(&stats);
    for process in &stats.top_processes {
        println!(
            "{:>7} {:<32} {:>6.1}% {:>10}",
            process.pid,
            process.name,
            process.cpu_usage,
            format_size(process.memory)
        );
    }
}

fn print_activity_line(stats: &SystemStats) {
    println!(
        "cpu {:.1}%  memory {} / {} ({:.0}%)",
        stats.cpu_usage,
        format_memory(stats.used_memory),
        format_memory(stats.total_memory),
        stats.memory_percent()
    );
}
