use crate::page_range::{self, PageSelection};
use crate::pdf::PdfDocument;
use anyhow::{Context, Result};
use rmcp::schemars;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;
use zip::write::SimpleFileOptions;

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SplitReport {
    pub files: Vec<String>,
    pub page_count: u32,
}

/// Render each selection to PDF bytes. Nothing is written to disk here.
fn render(doc: &PdfDocument, selections: &[PageSelection]) -> Result<Vec<Vec<u8>>> {
    selections
        .iter()
        .map(|selection| {
            let mut part = doc.extract_pages(selection)?;
            PdfDocument::to_bytes(&mut part)
        })
        .collect()
}

fn single_pages(page_count: u32) -> Result<Vec<PageSelection>> {
    (1..=page_count)
        .map(|page| page_range::parse(&page.to_string(), page_count).map_err(Into::into))
        .collect()
}

fn write_parts<F>(output_dir: &Path, parts: Vec<Vec<u8>>, name: F) -> Result<Vec<String>>
where
    F: Fn(usize) -> String,
{
    // Create output directory if it doesn't exist
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    let mut files = Vec::with_capacity(parts.len());
    for (i, bytes) in parts.into_iter().enumerate() {
        let path = output_dir.join(name(i + 1));
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write PDF: {}", path.display()))?;
        files.push(path.display().to_string());
    }
    Ok(files)
}

/// Split into one PDF per page, named `{stem}_{nnnn}.pdf`.
pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output_dir: Q) -> Result<SplitReport> {
    let input = input.as_ref();
    let doc = PdfDocument::open(input)?;
    let total_pages = doc.page_count();

    // Get the base name of the input file
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("page");

    let parts = render(&doc, &single_pages(total_pages)?)?;
    let files = write_parts(output_dir.as_ref(), parts, |n| format!("{}_{:04}.pdf", stem, n))?;

    info!(pages = total_pages, output = %output_dir.as_ref().display(), "split into pages");
    Ok(SplitReport {
        files,
        page_count: total_pages,
    })
}

/// Split into consecutive chunks of `chunk_size` pages, named `split_part_{k}.pdf`.
pub fn run_chunks<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    chunk_size: u32,
    output_dir: Q,
) -> Result<SplitReport> {
    let doc = PdfDocument::open(&input)?;
    let total_pages = doc.page_count();

    let windows = page_range::chunk_windows(chunk_size, total_pages)?;
    let parts = render(&doc, &windows)?;
    let files = write_parts(output_dir.as_ref(), parts, |k| format!("split_part_{}.pdf", k))?;

    info!(
        pages = total_pages,
        chunk_size,
        parts = files.len(),
        output = %output_dir.as_ref().display(),
        "split into chunks"
    );
    Ok(SplitReport {
        files,
        page_count: total_pages,
    })
}

/// Split into one PDF per page, packed into a zip archive as `page_{n}.pdf`.
pub fn run_zip<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<SplitReport> {
    let output = output.as_ref();
    let doc = PdfDocument::open(&input)?;
    let total_pages = doc.page_count();
    let parts = render(&doc, &single_pages(total_pages)?)?;

    let file = File::create(output)
        .with_context(|| format!("Failed to create archive: {}", output.display()))?;
    let mut archive = zip::ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut files = Vec::with_capacity(parts.len());
    for (i, bytes) in parts.into_iter().enumerate() {
        let name = format!("page_{}.pdf", i + 1);
        archive
            .start_file(name.as_str(), options)
            .with_context(|| format!("Failed to add {} to archive", name))?;
        archive.write_all(&bytes)?;
        files.push(name);
    }
    archive
        .finish()
        .with_context(|| format!("Failed to finish archive: {}", output.display()))?;

    info!(pages = total_pages, output = %output.display(), "split into zip archive");
    Ok(SplitReport {
        files,
        page_count: total_pages,
    })
}
