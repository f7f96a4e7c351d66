use crate::pdf::PdfDocument;
use anyhow::{Context, Result};
use rmcp::schemars;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CompressReport {
    pub output_path: String,
    pub original_bytes: u64,
    pub compressed_bytes: u64,
}

fn file_size(path: &Path) -> Result<u64> {
    Ok(std::fs::metadata(path)
        .with_context(|| format!("Failed to stat {}", path.display()))?
        .len())
}

/// Rewrite a PDF without unreachable objects and with deflated streams.
pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<CompressReport> {
    let input = input.as_ref();
    let output = output.as_ref();
    let original_bytes = file_size(input)?;

    let mut doc = PdfDocument::open(input)?.doc;
    doc.prune_objects();
    doc.delete_zero_length_streams();
    doc.renumber_objects();
    doc.compress();
    PdfDocument::save(&mut doc, output)?;

    let compressed_bytes = file_size(output)?;
    info!(
        original_bytes,
        compressed_bytes,
        output = %output.display(),
        "compressed PDF"
    );
    Ok(CompressReport {
        output_path: output.display().to_string(),
        original_bytes,
        compressed_bytes,
    })
}
