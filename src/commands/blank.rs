use crate::commands::Written;
use crate::pdf::build::blank_pages;
use crate::pdf::collect::PageCollector;
use crate::pdf::PdfDocument;
use anyhow::Result;
use std::path::Path;
use tracing::info;

pub const MAX_PAGES: u32 = 100_000;

pub fn run<P: AsRef<Path>>(pages: u32, output: P) -> Result<Written> {
    if pages == 0 || pages > MAX_PAGES {
        anyhow::bail!("Page count must be between 1 and {}", MAX_PAGES);
    }

    let mut collector = PageCollector::new();
    blank_pages(&mut collector, pages)?;
    let mut doc = collector.finish()?;
    PdfDocument::save(&mut doc, &output)?;

    info!(pages, output = %output.as_ref().display(), "generated blank PDF");
    Ok(Written {
        output_path: output.as_ref().display().to_string(),
        page_count: pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("empty_pdf.pdf");
        run(5, &output).unwrap();
        assert_eq!(PdfDocument::open(&output).unwrap().page_count(), 5);
    }

    #[test]
    fn test_blank_page_bounds() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run(0, dir.path().join("a.pdf")).is_err());
        assert!(run(MAX_PAGES + 1, dir.path().join("b.pdf")).is_err());
    }
}
