mod logging;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use output::{OutputWriter, RunOutput};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use vortex_core::{Algorithm, Classifier, Options};

/// Vortex - sort files into a content-addressed tree
#[derive(Parser)]
#[command(name = "vortex")]
#[command(
    about = "Move files into <destination>/<category>/<digest>.<ext>, deleting duplicates",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Directory to sort; emptied of everything recognized
    ingest: PathBuf,

    /// Destination root (created if missing)
    destination: PathBuf,

    /// Digest algorithm (sha256 or blake3)
    #[arg(long, default_value = "sha256")]
    algo: String,

    /// Extra filename to delete wherever found (desktop.ini always is)
    #[arg(long = "sentinel", value_name = "NAME")]
    sentinels: Vec<String>,

    /// Keep the ingest root even if it ends up empty
    #[arg(long)]
    keep_ingest_root: bool,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet);

    let output = OutputWriter::new(cli.json);
    match cmd_run(&cli, &output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            output.write_error(&e, 1);
            ExitCode::FAILURE
        }
    }
}

fn cmd_run(cli: &Cli, output: &OutputWriter) -> Result<()> {
    let algorithm = Algorithm::parse(&cli.algo)?;
    let options = Options {
        algorithm,
        classifier: Classifier::with_sentinels(cli.sentinels.iter().cloned()),
        keep_ingest_root: cli.keep_ingest_root,
    };

    let started_at = chrono::Local::now();
    let timer = Instant::now();

    let report = vortex_core::run(&cli.ingest, &cli.destination, options).with_context(|| {
        format!(
            "Failed to sort {} into {}",
            cli.ingest.display(),
            cli.destination.display()
        )
    })?;

    let data = RunOutput {
        success: true,
        result_code: 0,
        ingest: cli.ingest.display().to_string(),
        destination: cli.destination.display().to_string(),
        algorithm: algorithm.to_string(),
        started_at: started_at.to_rfc3339(),
        elapsed_ms: timer.elapsed().as_millis() as u64,
        report,
    };
    output.write(&data, || data.to_text())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_two_paths_required() {
        assert!(Cli::try_parse_from(["vortex"]).is_err());
        assert!(Cli::try_parse_from(["vortex", "/in"]).is_err());

        let cli = Cli::try_parse_from(["vortex", "/in", "/out"]).unwrap();
        assert_eq!(cli.ingest, PathBuf::from("/in"));
        assert_eq!(cli.destination, PathBuf::from("/out"));
        assert_eq!(cli.algo, "sha256");
        assert!(!cli.keep_ingest_root);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "vortex",
            "/in",
            "/out",
            "--algo",
            "blake3",
            "--sentinel",
            ".DS_Store",
            "--sentinel",
            "Thumbs.db",
            "--keep-ingest-root",
            "--json",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.algo, "blake3");
        assert_eq!(cli.sentinels, vec![".DS_Store", "Thumbs.db"]);
        assert!(cli.keep_ingest_root && cli.json);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["vortex", "/in", "/out", "-q", "-v"]).is_err());
    }
}
