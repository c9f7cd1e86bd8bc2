//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use nbpdf_core::{ConvertOptions, PdfExporter, CONFIG_FILE_NAME};

#[derive(Parser)]
#[command(name = "nbpdf")]
#[command(author, version, about = "Jupyter notebooks to PDF", long_about = None)]
struct Cli {
    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a notebook to PDF
    Convert {
        /// Input notebook (.ipynb)
        input: PathBuf,

        /// Output PDF file (default: input with .pdf extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Settings file (default: nbpdf.toml next to the input, if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Render code without syntax highlighting
        #[arg(long)]
        no_highlight: bool,
    },

    /// Render source files as highlighted listings
    Sources {
        /// Source files, in listing order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output PDF file
        #[arg(short, long, default_value = "sources.pdf")]
        output: PathBuf,
    },
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Convert {
            input,
            output,
            config,
            no_highlight,
        } => convert_command(&input, output.as_deref(), config.as_deref(), no_highlight),
        Commands::Sources { files, output } => sources_command(&files, &output),
    }
}

/// Send `log` and `tracing` records to stderr, filtered by `RUST_LOG`
fn init_logging(verbose: bool) {
    let default = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();
    // Already installed when called more than once in-process
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Resolve settings for a notebook
///
/// An explicit path must exist. Without one, `nbpdf.toml` next to the input
/// is used when present, else the defaults.
pub fn load_options(input: &Path, config: Option<&Path>) -> Result<ConvertOptions> {
    if let Some(path) = config {
        return ConvertOptions::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()));
    }

    let sibling = input
        .parent()
        .unwrap_or(Path::new("."))
        .join(CONFIG_FILE_NAME);
    if sibling.exists() {
        println!("  Loading config: {}", sibling.display());
        ConvertOptions::load(&sibling)
            .with_context(|| format!("Failed to load config: {}", sibling.display()))
    } else {
        Ok(ConvertOptions::default())
    }
}

/// Convert a notebook file to PDF
pub fn convert_command(
    input: &Path,
    output: Option<&Path>,
    config: Option<&Path>,
    no_highlight: bool,
) -> Result<()> {
    println!("nbpdf v{}", nbpdf_core::VERSION);
    println!("Converting: {}", input.display());

    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => input.with_extension("pdf"),
    };

    let mut options = load_options(input, config)?;
    if no_highlight {
        options.highlight.enabled = false;
    }
    tracing::debug!(?options, "Resolved settings");

    let exporter = PdfExporter::with_options(options).context("Failed to set up exporter")?;
    let (pdf, _resources) = exporter
        .from_filename(input, None)
        .with_context(|| format!("Failed to convert notebook: {}", input.display()))?;

    fs::write(&output_path, &pdf)
        .with_context(|| format!("Failed to write output: {}", output_path.display()))?;

    println!();
    println!("Conversion complete!");
    println!("  Output: {} ({} bytes)", output_path.display(), pdf.len());

    Ok(())
}

/// Render source files as listings
pub fn sources_command(files: &[PathBuf], output: &Path) -> Result<()> {
    println!("nbpdf v{}", nbpdf_core::VERSION);

    let mut listings = Vec::with_capacity(files.len());
    for path in files {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read source file: {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        println!("  Listing: {}", path.display());
        listings.push((name, source));
    }

    let exporter = PdfExporter::new().context("Failed to set up exporter")?;
    let pdf = exporter
        .render_sources(&listings)
        .context("Failed to render source listings")?;

    fs::write(output, &pdf)
        .with_context(|| format!("Failed to write output: {}", output.display()))?;

    println!();
    println!("Listing complete!");
    println!("  Output: {} ({} bytes)", output.display(), pdf.len());

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
    fn test_parse_convert() {
        let cli = Cli::parse_from(["nbpdf", "convert", "a.ipynb", "-o", "b.pdf", "--no-highlight"]);
        match cli.command {
            Commands::Convert {
                input,
                output,
                config,
                no_highlight,
            } => {
                assert_eq!(input, PathBuf::from("a.ipynb"));
                assert_eq!(output, Some(PathBuf::from("b.pdf")));
                assert_eq!(config, None);
                assert!(no_highlight);
            }
            _ => panic!("Expected convert"),
        }
    }

    #[test]
    fn test_parse_sources_requires_files() {
        assert!(Cli::try_parse_from(["nbpdf", "sources"]).is_err());
        let cli = Cli::try_parse_from(["nbpdf", "-v", "sources", "a.py", "b.py"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Sources { files, output } => {
                assert_eq!(files.len(), 2);
                assert_eq!(output, PathBuf::from("sources.pdf"));
            }
            _ => panic!("Expected sources"),
        }
    }

    #[test]
    fn test_load_options_defaults_without_config() {
        let dir = tempfile::tempdir().unwrap();
        let options = load_options(&dir.path().join("nb.ipynb"), None).unwrap();
        assert_eq!(options, ConvertOptions::default());
    }

    #[test]
    fn test_load_options_uses_sibling_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "[spacing]\ncell = 30\n").unwrap();
        let options = load_options(&dir.path().join("nb.ipynb"), None).unwrap();
        assert_eq!(options.spacing.cell, 30.0);
    }

    #[test]
    fn test_load_options_missing_explicit_config() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(load_options(&dir.path().join("nb.ipynb"), Some(&missing)).is_err());
    }
}
