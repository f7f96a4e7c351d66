use crate::commands::Written;
use crate::pdf::collect::PageCollector;
use crate::pdf::PdfDocument;
use anyhow::Result;
use std::path::Path;
use tracing::info;

pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(inputs: &[P], output: Q) -> Result<Written> {
    if inputs.is_empty() {
        anyhow::bail!("No input files specified");
    }

    // Load everything first so a bad input aborts before any output exists
    let docs = inputs
        .iter()
        .map(PdfDocument::open)
        .collect::<Result<Vec<_>>>()?;

    let mut collector = PageCollector::new();
    for doc in &docs {
        let pages = collector.import(doc)?;
        collector.append_all(&pages)?;
    }
    let total_pages = collector.page_count() as u32;

    let mut merged = collector.finish()?;
    PdfDocument::save(&mut merged, &output)?;

    info!(
        files = inputs.len(),
        pages = total_pages,
        output = %output.as_ref().display(),
        "merged PDFs"
    );
    Ok(Written {
        output_path: output.as_ref().display().to_string(),
        page_count: total_pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::test_support::{page_labels, sample_pdf};

    #[test]
    fn test_merge_concatenates_in_argument_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.pdf");
        let b = dir.path().join("b.pdf");
        let output = dir.path().join("merged.pdf");
        std::fs::write(&a, sample_pdf(2)).unwrap();
        std::fs::write(&b, sample_pdf(3)).unwrap();

        let written = run(&[&b, &a], &output).unwrap();
        assert_eq!(written.page_count, 5);

        let merged = PdfDocument::open(&output).unwrap();
        assert_eq!(
            page_labels(&merged),
            vec!["Page 1", "Page 2", "Page 3", "Page 1", "Page 2"]
        );
    }

    #[test]
    fn test_merge_requires_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let inputs: Vec<&Path> = Vec::new();
        assert!(run(&inputs, dir.path().join("merged.pdf")).is_err());
    }

    #[test]
    fn test_merge_bad_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.pdf");
        let bad = dir.path().join("bad.pdf");
        let output = dir.path().join("merged.pdf");
        std::fs::write(&good, sample_pdf(1)).unwrap();
        std::fs::write(&bad, b"not a pdf").unwrap();

        assert!(run(&[&good, &bad], &output).is_err());
        assert!(!output.exists());
    }
}
