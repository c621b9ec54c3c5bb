use clap::{Parser, Subcommand};
use playgroundbook::{config, output, render};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "playgroundbook")]
#[command(about = "Render Swift Playground books from ordinary playgrounds")]
#[command(long_about = "\
Render Swift Playground books from ordinary playgrounds

A YAML manifest lists the book's chapters; each chapter is an Xcode
playground next to the manifest. Single-page and multi-page playgrounds
are both accepted.

Layout:

  book.yml                         # name, chapters, imports, glossary...
  playgroundbook.toml              # Render config (optional)
  Intro.playground/                # Single-page chapter
  │   ├── Contents.swift
  │   ├── Sources/
  │   └── Resources/
  Loops.playground/                # Multi-page chapter
  │   ├── contents.xcplayground    # Page order
  │   └── Pages/While.xcplaygroundpage/Contents.swift
  Packages/Kit/Sources/*.swift     # Shared sources, copied into every chapter
  Assets/                          # Book resources (manifest `resources`)

Output:

  <Name>.playgroundbook/
  ├── Contents/
  │   ├── Manifest.plist
  │   ├── Resources/
  │   ├── Sources/
  │   └── Chapters/<chapter>/Pages/<page>.playgroundpage/
  └── Glossary.plist               # Only when the manifest has a glossary

Run 'playgroundbook gen-config' to print a documented playgroundbook.toml.")]
#[command(version)]
struct Cli {
    /// Output directory (defaults to the manifest's directory)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the book declared by a manifest
    Render {
        /// Book manifest (YAML)
        manifest: PathBuf,
    },
    /// Detect and parse every chapter without writing anything
    Check {
        /// Book manifest (YAML)
        manifest: PathBuf,
        /// Print the chapter inventory as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock playgroundbook.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Render { manifest } => {
            let base = render::base_dir(&manifest);
            let config = config::load_config(&base)?;
            let output_dir = cli.output.unwrap_or_else(|| base.clone());

            println!("==> Rendering {}", manifest.display());
            let report = render::render(&manifest, &output_dir, &config)?;
            output::print_render_output(&report, &output_dir);
        }
        Command::Check { manifest, json } => {
            let base = render::base_dir(&manifest);
            let config = config::load_config(&base)?;
            let (book, chapters) = render::check(&manifest, &config)?;
            if json {
                let summaries: Vec<_> = chapters.iter().map(|c| c.parsed.summary(&c.id)).collect();
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                output::print_check_output(&book.name, &chapters);
                println!("==> {} is valid", display_name(&manifest));
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the log subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
