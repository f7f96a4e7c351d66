use crate::commands::Written;
use crate::pdf::build::stamp_page_numbers;
use crate::pdf::collect::PageCollector;
use crate::pdf::PdfDocument;
use anyhow::Result;
use std::path::Path;
use tracing::info;

pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<Written> {
    let doc = PdfDocument::open(&input)?;

    // Rebuilding through the collector puts inherited resources on every page
    let mut collector = PageCollector::new();
    let pages = collector.import(&doc)?;
    collector.append_all(&pages)?;
    let mut numbered = collector.finish()?;

    let page_count = stamp_page_numbers(&mut numbered)?;
    PdfDocument::save(&mut numbered, &output)?;

    info!(pages = page_count, output = %output.as_ref().display(), "inserted page numbers");
    Ok(Written {
        output_path: output.as_ref().display().to_string(),
        page_count,
    })
}
