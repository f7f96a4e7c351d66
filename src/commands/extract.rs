use crate::commands::Written;
use crate::page_range;
use crate::pdf::PdfDocument;
use anyhow::Result;
use std::path::Path;
use tracing::info;

pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(input: P, pages: &str, output: Q) -> Result<Written> {
    let doc = PdfDocument::open(&input)?;
    let total_pages = doc.page_count();

    let selection = page_range::parse(pages, total_pages)?;

    if selection.is_empty() {
        anyhow::bail!("No pages specified");
    }

    let mut new_doc = doc.extract_pages(&selection)?;
    PdfDocument::save(&mut new_doc, &output)?;

    info!(
        source = %doc.name,
        pages = selection.len(),
        output = %output.as_ref().display(),
        "extracted pages"
    );
    Ok(Written {
        output_path: output.as_ref().display().to_string(),
        page_count: selection.len() as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_range::{InvalidRangeSpec, Reason};
    use crate::pdf::test_support::{page_labels, sample_pdf};

    #[test]
    fn test_extract_writes_selected_pages() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        let output = dir.path().join("out.pdf");
        std::fs::write(&input, sample_pdf(10)).unwrap();

        let written = run(&input, "1,3,5-7", &output).unwrap();
        assert_eq!(written.page_count, 5);

        let out = PdfDocument::open(&output).unwrap();
        assert_eq!(
            page_labels(&out),
            vec!["Page 1", "Page 3", "Page 5", "Page 6", "Page 7"]
        );
    }

    #[test]
    fn test_invalid_spec_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        let output = dir.path().join("out.pdf");
        std::fs::write(&input, sample_pdf(5)).unwrap();

        let err = run(&input, "1,6", &output).unwrap_err();
        let spec_err = err.downcast_ref::<InvalidRangeSpec>().unwrap();
        assert_eq!(
            spec_err.reason,
            Reason::OutOfRange {
                page: 6,
                page_count: 5
            }
        );
        assert!(!output.exists());
    }
}
