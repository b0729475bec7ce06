//! pagewal operator CLI
//!
//! Runs recovery and inspects the log and page files of a data directory.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pagewal::storage::PageStore;
use pagewal::wal::{LogReader, LogRecord};
use pagewal::{Config, PageId, RecoveryManager, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// pagewal CLI
#[derive(Parser, Debug)]
#[command(name = "pagewal")]
#[command(about = "Write-ahead-logged page store: recovery and inspection")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./pagewal_data", global = true)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Redo committed writes from the log onto the page files
    Recover,

    /// Print every valid log record
    DumpLog,

    /// Scan the log and report its health
    VerifyLog,

    /// List persisted pages
    Pages,

    /// Show one persisted page
    ShowPage {
        /// The page id
        id: PageId,
    },
}

fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pagewal=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::builder().data_dir(&args.data_dir).build();

    match run(&config, args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config, command: Commands) -> Result<()> {
    match command {
        Commands::Recover => {
            let report = RecoveryManager::new(config)?.start_recovery()?;
            if !report.log_present {
                println!("no log at {}", config.log_path().display());
                return Ok(());
            }
            println!("records scanned:        {}", report.records_scanned);
            println!("corrupted records:      {}", report.corrupted_records);
            println!("committed transactions: {}", report.committed_transactions);
            println!("pages redone:           {}", report.pages_redone);
            println!("already up to date:     {}", report.skipped_up_to_date);
            println!("uncommitted skipped:    {}", report.skipped_uncommitted);
            println!("failed pages:           {:?}", report.failed_pages);
        }
        Commands::DumpLog => {
            let mut records = LogReader::open(&config.log_path())?.records();
            for record in records.by_ref() {
                match record? {
                    LogRecord::Write {
                        lsn,
                        taid,
                        page_id,
                        payload,
                    } => println!("{:>8} {:>8} WRITE page={} {:?}", lsn, taid, page_id, payload),
                    LogRecord::EndOfTransaction { lsn, taid } => {
                        println!("{:>8} {:>8} EOT", lsn, taid)
                    }
                }
            }
            let stats = records.stats();
            if stats.corruption_mid_log {
                println!("(corrupt frame at byte {} with more log behind it)", stats.valid_len);
            } else if stats.was_truncated {
                println!("(log ends in a damaged tail at byte {})", stats.valid_len);
            }
        }
        Commands::VerifyLog => {
            let stats = LogReader::verify(&config.log_path())?;
            println!("records:            {}", stats.records_read);
            println!("corrupted:          {}", stats.records_corrupted);
            println!("last lsn:           {}", stats.last_lsn);
            println!("max transaction id: {}", stats.max_transaction_id);
            println!("valid bytes:        {}", stats.valid_len);
            println!("damaged tail:       {}", stats.has_torn_tail());
            println!("mid-log corruption: {}", stats.corruption_mid_log);
        }
        Commands::Pages => {
            let store = PageStore::open(&config.page_dir())?;
            for id in store.page_ids()? {
                match store.read(id) {
                    Ok(Some(page)) => println!("{:>8} lsn={}", id, page.lsn),
                    Ok(None) => {}
                    Err(e) => println!("{:>8} unreadable: {}", id, e),
                }
            }
        }
        Commands::ShowPage { id } => {
            let store = PageStore::open(&config.page_dir())?;
            match store.read(id)? {
                Some(page) => println!("page {} lsn={} payload={:?}", id, page.lsn, page.payload),
                None => println!("page {} has not been persisted", id),
            }
        }
    }
    Ok(())
}
