//! Command-line interface for hardened zip extraction.
//!
//! This CLI tool extracts zip archives with traversal and bomb protection,
//! probes archive metadata, and deletes directory trees.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use zipguard::{ExtractStats, ExtractionLimits};

#[derive(Parser)]
#[command(name = "zipguard")]
#[command(version, about = "Extract zip archives safely from the command line", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract one or more archives, each into <OUT>/<archive name>
    Extract {
        /// Archive files to extract
        #[arg(required = true)]
        archives: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        out: PathBuf,

        /// JSON file with extraction limits
        #[arg(long)]
        limits: Option<PathBuf>,

        /// Maximum number of entries per archive
        #[arg(long)]
        max_entries: Option<u64>,

        /// Maximum total uncompressed bytes per archive
        #[arg(long)]
        max_total_bytes: Option<u64>,

        /// Maximum uncompressed bytes for a single entry
        #[arg(long)]
        max_entry_bytes: Option<u64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Probe archive metadata
    Probe {
        /// Archive file to probe
        archive: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete files or directory trees without following symlinks
    Delete {
        /// Paths to delete
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

/// Limit overrides given on the command line.
struct LimitArgs {
    file: Option<PathBuf>,
    max_entries: Option<u64>,
    max_total_bytes: Option<u64>,
    max_entry_bytes: Option<u64>,
}

#[derive(Serialize)]
struct ExtractReport<'a> {
    archive: &'a Path,
    destination: &'a Path,
    stats: &'a ExtractStats,
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            archives,
            out,
            limits,
            max_entries,
            max_total_bytes,
            max_entry_bytes,
            json,
        } => {
            let limit_args = LimitArgs {
                file: limits,
                max_entries,
                max_total_bytes,
                max_entry_bytes,
            };
            handle_extract(archives, out, limit_args, json)
        }
        Commands::Probe { archive, json } => handle_probe(archive, json),
        Commands::Delete { paths } => handle_delete(paths),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Build the effective limits: defaults, then the JSON file, then flags.
fn resolve_limits(args: &LimitArgs) -> Result<ExtractionLimits, Box<dyn std::error::Error>> {
    let mut limits = match &args.file {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read limits file {}: {}", path.display(), e))?;
            serde_json::from_str(&raw)
                .map_err(|e| format!("invalid limits file {}: {}", path.display(), e))?
        }
        None => ExtractionLimits::default(),
    };

    if let Some(max_entries) = args.max_entries {
        limits.max_entries = max_entries;
    }
    if let Some(max_total_bytes) = args.max_total_bytes {
        limits.max_total_uncompressed_bytes = max_total_bytes;
    }
    if args.max_entry_bytes.is_some() {
        limits.max_single_entry_bytes = args.max_entry_bytes;
    }

    Ok(limits)
}

/// Destination for one archive: `<out>/<file stem>`.
fn destination_for(archive: &Path, out: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let stem = archive
        .file_stem()
        .ok_or_else(|| format!("cannot derive a directory name from {}", archive.display()))?;
    Ok(out.join(stem))
}

fn handle_extract(
    archives: Vec<PathBuf>,
    out: PathBuf,
    limit_args: LimitArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let limits = resolve_limits(&limit_args)?;
    tracing::debug!("Using limits {:?}", limits);

    // Ctrl-C cancels the archive in flight; it is rolled back like any abort
    let cancel_flag = Arc::new(AtomicBool::new(false));
    let handler_flag = cancel_flag.clone();
    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::Relaxed);
    })?;

    for archive in &archives {
        extract_one(archive, &out, &limits, json, &cancel_flag)?;
    }

    Ok(())
}

/// Extract a single archive into `<out>/<file stem>` and report the result.
fn extract_one(
    archive: &Path,
    out: &Path,
    limits: &ExtractionLimits,
    json: bool,
    cancel_flag: &Arc<AtomicBool>,
) -> Result<(), Box<dyn std::error::Error>> {
    let destination = destination_for(archive, out)?;
    let info = zipguard::probe(archive).map_err(|e| format!("{}: {}", archive.display(), e))?;

    let progress = if json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(info.uncompressed_estimate)
    };
    progress.set_style(
        ProgressStyle::with_template(
            "{spinner} {msg:30!} [{bar:30}] {bytes}/{total_bytes} ({bytes_per_sec})",
        )?
        .progress_chars("=> "),
    );

    let bar = progress.clone();
    let progress_cb = move |file: &str, bytes: u64, _total: Option<u64>| {
        bar.set_message(file.to_string());
        bar.set_position(bytes);
        true
    };

    let result = zipguard::extract(
        archive,
        &destination,
        limits,
        &progress_cb,
        cancel_flag.clone(),
    );
    progress.finish_and_clear();

    let stats = result.map_err(|e| format!("{}: {}", archive.display(), e))?;

    if json {
        let report = ExtractReport {
            archive,
            destination: &destination,
            stats: &stats,
        };
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!(
            "{} -> {}: {} files, {} directories, {} bytes in {:.2?}",
            archive.display(),
            destination.display(),
            stats.files_extracted,
            stats.directories_created,
            stats.bytes_written,
            stats.duration
        );
    }

    Ok(())
}

fn handle_probe(archive: PathBuf, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let info = zipguard::probe(&archive)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Archive:      {}", archive.display());
    println!("Entries:      {}", info.entries);
    println!("Compressed:   {} bytes", info.compressed_bytes);
    println!("Uncompressed: {} bytes (declared)", info.uncompressed_estimate);
    println!("Encrypted:    {}", if info.encrypted { "yes" } else { "no" });
    for entry in &info.entry_list {
        let kind = if entry.is_directory { "d" } else { "-" };
        println!("  {} {:>12} {}", kind, entry.size, entry.name);
    }

    Ok(())
}

fn handle_delete(paths: Vec<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    for path in &paths {
        zipguard::delete(path).map_err(|e| format!("{}: {}", path.display(), e))?;
        tracing::info!("Deleted {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    fn no_overrides() -> LimitArgs {
        LimitArgs {
            file: None,
            max_entries: None,
            max_total_bytes: None,
            max_entry_bytes: None,
        }
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_resolve_limits_defaults() {
        let limits = resolve_limits(&no_overrides()).unwrap();
        assert_eq!(limits, ExtractionLimits::default());
    }

    #[test]
    fn test_resolve_limits_flags_override_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("limits.json");
        std::fs::write(&file, r#"{"max_entries": 5, "max_total_uncompressed_bytes": 1000}"#)
            .unwrap();

        let args = LimitArgs {
            file: Some(file),
            max_total_bytes: Some(2000),
            ..no_overrides()
        };
        let limits = resolve_limits(&args).unwrap();

        assert_eq!(limits.max_entries, 5);
        assert_eq!(limits.max_total_uncompressed_bytes, 2000);
        assert_eq!(limits.max_single_entry_bytes, None);
    }

    #[test]
    fn test_resolve_limits_bad_file() {
        let args = LimitArgs {
            file: Some(PathBuf::from("/nonexistent/limits.json")),
            ..no_overrides()
        };
        assert!(resolve_limits(&args).is_err());
    }

    #[test]
    fn test_destination_for_uses_stem() {
        let dest = destination_for(Path::new("/tmp/WarOfTheWorlds.zip"), Path::new("out")).unwrap();
        assert_eq!(dest, Path::new("out/WarOfTheWorlds"));
    }

    #[test]
    fn test_extract_error_names_archive() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.zip");

        let cancel_flag = Arc::new(AtomicBool::new(false));

        let err = extract_one(
            &missing,
            &temp_dir.path().join("out"),
            &ExtractionLimits::default(),
            true,
            &cancel_flag,
        )
        .unwrap_err();

        assert!(err.to_string().contains(&missing.display().to_string()));
    }
}
