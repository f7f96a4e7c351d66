mod cli;
mod commands;
mod mcp;
mod page_range;
mod pdf;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout carries command output and the MCP transport
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Mcp => {
            mcp::run_server().await?;
        }
        Commands::Pages { path } => {
            let doc = pdf::PdfDocument::open(&path)?;
            println!("{}", doc.page_count());
        }
        Commands::Extract {
            path,
            pages,
            output,
        } => {
            let written = commands::extract::run(&path, &pages, &output)?;
            println!(
                "Extracted {} page(s) to {}",
                written.page_count, written.output_path
            );
        }
        Commands::Merge { inputs, output } => {
            let written = commands::merge::run(&inputs, &output)?;
            println!(
                "Merged {} files ({} pages) into {}",
                inputs.len(),
                written.page_count,
                written.output_path
            );
        }
        Commands::Split {
            path,
            every,
            zip,
            output,
        } => {
            let report = match (every, zip) {
                (Some(chunk_size), _) => {
                    let output_dir = output.unwrap_or_else(|| PathBuf::from("."));
                    commands::split::run_chunks(&path, chunk_size, &output_dir)?
                }
                (None, true) => {
                    let archive = output.unwrap_or_else(|| PathBuf::from("split_pages.zip"));
                    commands::split::run_zip(&path, &archive)?
                }
                (None, false) => {
                    let output_dir = output.unwrap_or_else(|| PathBuf::from("."));
                    commands::split::run(&path, &output_dir)?
                }
            };
            println!(
                "Split {} pages into {} file(s)",
                report.page_count,
                report.files.len()
            );
            for file in &report.files {
                println!("  {}", file);
            }
        }
        Commands::Compress { path, output } => {
            let report = commands::compress::run(&path, &output)?;
            println!(
                "Compressed {} -> {} bytes into {}",
                report.original_bytes, report.compressed_bytes, report.output_path
            );
        }
        Commands::Number { path, output } => {
            let written = commands::number::run(&path, &output)?;
            println!(
                "Numbered {} page(s) into {}",
                written.page_count, written.output_path
            );
        }
        Commands::Blank { pages, output } => {
            let written = commands::blank::run(pages, &output)?;
            println!(
                "Generated {} blank page(s) in {}",
                written.page_count, written.output_path
            );
        }
        Commands::Images { inputs, output } => {
            let written = commands::images::run(&inputs, &output)?;
            println!(
                "Converted {} image(s) into {}",
                written.page_count, written.output_path
            );
        }
        Commands::Convert { path, output } => {
            let written = commands::convert::run(&path, &output)?;
            println!(
                "Converted {} into {} ({} page(s))",
                path.display(),
                written.output_path,
                written.page_count
            );
        }
    }

    Ok(())
}
