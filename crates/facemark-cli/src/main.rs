use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use facemark_core::{
    AttendanceLedger, CancelToken, EmbeddingStore, EnrollmentOutcome, RecognitionOutcome,
    SessionConfig, SessionController,
};

mod config;
mod replay;

use config::Config;
use replay::{load_frames, ReplayProvider};

#[derive(Parser)]
#[command(name = "facemark", about = "Face-recognition attendance: enroll identities and mark attendance")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full enrollment session for an identity
    Enroll {
        /// Identity name to enroll under
        #[arg(short, long)]
        name: String,
        /// JSONL detection capture file (one frame per line)
        #[arg(short, long)]
        frames: PathBuf,
    },
    /// Shorter capture-only enrollment (8 captures, 0.5s interval)
    Capture {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        frames: PathBuf,
    },
    /// Scan frames and mark attendance for the first recognized identity
    Mark {
        #[arg(short, long)]
        frames: PathBuf,
    },
    /// List enrolled identities and their sample counts
    List,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = Config::from_env();

    let store = EmbeddingStore::new(&cfg.store_path);
    let ledger = AttendanceLedger::new(&cfg.attendance_dir, cfg.daily_cap);
    let cancel = CancelToken::new();

    match cli.command {
        Commands::Enroll { name, frames } => {
            let controller =
                SessionController::new(&store, &ledger, cfg.match_config(), cfg.session_config());
            run_enroll(&controller, &name, &frames, &cancel)?;
        }
        Commands::Capture { name, frames } => {
            let controller = SessionController::new(
                &store,
                &ledger,
                cfg.match_config(),
                SessionConfig::capture_only(),
            );
            run_enroll(&controller, &name, &frames, &cancel)?;
        }
        Commands::Mark { frames } => {
            let controller =
                SessionController::new(&store, &ledger, cfg.match_config(), cfg.session_config());
            let frames = load_frames(&frames)?;
            match controller.run_recognition(frames, &mut ReplayProvider, &cancel)? {
                RecognitionOutcome::Marked { identity, time } => {
                    println!("Attendance marked: {identity} at {}", time.format("%H:%M:%S"));
                }
                RecognitionOutcome::LimitReached { identity } => {
                    println!("{identity} already at the daily attendance limit");
                }
                RecognitionOutcome::NoMatch => {
                    println!("No known face recognized");
                }
                RecognitionOutcome::Cancelled => {
                    println!("Scan cancelled");
                }
            }
        }
        Commands::List => {
            let snapshot = store.load()?;
            if snapshot.identities.is_empty() {
                println!("No identities enrolled");
            }
            for record in &snapshot.identities {
                println!("{}  ({} samples)", record.name, record.embeddings.len());
            }
        }
    }

    Ok(())
}

fn run_enroll(
    controller: &SessionController<'_>,
    name: &str,
    frames_path: &Path,
    cancel: &CancelToken,
) -> Result<()> {
    let frames = load_frames(frames_path)?;
    match controller.run_enrollment(name, frames, &mut ReplayProvider, cancel)? {
        EnrollmentOutcome::Completed { captures } => {
            println!("Enrollment completed: {captures} captures saved for {name}");
        }
        EnrollmentOutcome::DuplicateBlocked { identity, distance, captures_kept } => {
            println!(
                "Face already enrolled as {identity} (distance {distance:.3}); \
                 session aborted, {captures_kept} earlier captures kept"
            );
        }
        EnrollmentOutcome::Cancelled { captures } => {
            println!("Enrollment cancelled after {captures} captures");
        }
    }
    Ok(())
}
