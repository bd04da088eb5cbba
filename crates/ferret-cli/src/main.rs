//! # Ferret CLI
//!
//! Command-line interface for the ferret NTFS file-name finder.
//!
//! ## Example Usage
//!
//! ```bash
//! # Exact name (glob without wildcards)
//! ferret hosts
//!
//! # Glob across all ready NTFS volumes
//! ferret "report_*.log"
//!
//! # Regex, folders, single volume
//! ferret "^img_\d+\.(png|jpg)$" --regex
//! ferret node_modules --folders --volume C
//!
//! # Fuzzy match within 2 edits
//! ferret confg --distance 2
//! ```
//!
//! Must be run from an elevated shell: reading the MFT requires
//! administrator privileges.

use clap::Parser;
use crossbeam_channel::bounded;
use ferret_core::{
    coordinator, CancelFlag, FerretError, NamePredicate, Result, SearchSpec, VolumeSearch,
};
use ferret_ntfs::NtfsSearch;
use std::io::Write;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const EXIT_NOT_ELEVATED: u8 = 1;
const EXIT_INVALID_ARGS: u8 = 2;
const EXIT_NO_VOLUME: u8 = 3;

/// Ferret - fast file and folder name search straight from the NTFS MFT
#[derive(Parser)]
#[command(name = "ferret")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Name to search for; `*` matches any run of characters, `?` one
    name: String,

    /// Treat the name as a regular expression
    #[arg(long, conflicts_with = "distance")]
    regex: bool,

    /// Match folders instead of files
    #[arg(long)]
    folders: bool,

    /// Search a single drive letter instead of all ready NTFS volumes
    #[arg(long, value_name = "LETTER", value_parser = parse_volume)]
    volume: Option<char>,

    /// Fuzzy match: accept names within N edits of the query
    #[arg(long, value_name = "N")]
    distance: Option<u8>,

    /// Print the summary line (on by default)
    #[arg(long, overrides_with = "no_stats")]
    stats: bool,

    /// Suppress the summary line
    #[arg(long, overrides_with = "stats")]
    no_stats: bool,

    /// Sort matches lexicographically before printing
    #[arg(long)]
    sort: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all diagnostics except errors
    #[arg(short, long)]
    quiet: bool,
}

/// Accept `C`, `c` or `C:` as a volume restriction.
fn parse_volume(value: &str) -> std::result::Result<char, String> {
    let trimmed = value.strip_suffix(':').unwrap_or(value);
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) if letter.is_ascii_alphabetic() => Ok(letter.to_ascii_uppercase()),
        _ => Err(format!("'{value}' is not a drive letter")),
    }
}

fn build_predicate(cli: &Cli) -> Result<NamePredicate> {
    if cli.regex {
        NamePredicate::regex(&cli.name)
    } else if let Some(distance) = cli.distance {
        Ok(NamePredicate::fuzzy(&cli.name, distance))
    } else {
        NamePredicate::glob(&cli.name)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging. Diagnostics go to stderr; stdout carries one match
    // path per line.
    let log_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .init();

    if !ferret_ntfs::is_elevated() {
        eprintln!("{}", FerretError::NotAdministrator);
        return ExitCode::from(EXIT_NOT_ELEVATED);
    }

    let predicate = match build_predicate(&cli) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };
    let spec = SearchSpec::new(predicate, cli.folders);

    let backend = NtfsSearch::new();
    let ready = match backend.ready_volumes() {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(EXIT_NO_VOLUME);
        }
    };

    let volumes: Vec<char> = match cli.volume {
        Some(letter) if ready.contains(&letter) => vec![letter],
        Some(letter) => {
            let err = FerretError::no_eligible_volume(format!("{letter}: is not a ready NTFS volume"));
            eprintln!("{err}");
            return ExitCode::from(EXIT_NO_VOLUME);
        }
        None => ready,
    };
    if volumes.is_empty() {
        eprintln!("{}", FerretError::no_eligible_volume("no ready NTFS volumes found"));
        return ExitCode::from(EXIT_NO_VOLUME);
    }
    tracing::debug!(volumes = ?volumes, folders = cli.folders, "starting search");

    // Workers feed a bounded channel; this single thread owns stdout, so
    // each printed line is atomic.
    let (tx, rx) = bounded::<ferret_core::SearchMatch>(1024);
    let sort = cli.sort;
    let printer = std::thread::spawn(move || {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        if sort {
            let mut paths: Vec<String> = rx.iter().map(|m| m.path).collect();
            paths.sort();
            for path in paths {
                let _ = writeln!(out, "{path}");
            }
        } else {
            for m in rx {
                let _ = writeln!(out, "{}", m.path);
            }
        }
    });

    let stats = coordinator::run(&backend, &volumes, &spec, tx, &CancelFlag::new());
    let _ = printer.join();

    let show_stats = cli.stats || !cli.no_stats;
    if show_stats {
        println!(
            "Searched {} records on {} volume(s) in {:.2}s. Found {} result(s)",
            stats.searched_records,
            stats.volumes,
            stats.elapsed.as_secs_f64(),
            stats.found
        );
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_volume_accepts_letter_forms() {
        assert_eq!(parse_volume("C").unwrap(), 'C');
        assert_eq!(parse_volume("d").unwrap(), 'D');
        assert_eq!(parse_volume("E:").unwrap(), 'E');
    }

    #[test]
    fn test_parse_volume_rejects_non_letters() {
        assert!(parse_volume("CD").is_err());
        assert!(parse_volume("1").is_err());
        assert!(parse_volume("").is_err());
    }

    #[test]
    fn test_regex_conflicts_with_distance() {
        use clap::CommandFactory;
        let result = Cli::command().try_get_matches_from([
            "ferret", "name", "--regex", "--distance", "2",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_distance_rejects_out_of_range() {
        use clap::CommandFactory;
        let result =
            Cli::command().try_get_matches_from(["ferret", "name", "--distance", "300"]);
        assert!(result.is_err());
    }
}
