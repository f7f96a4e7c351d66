use crate::commands::{images, Written};
use crate::pdf::build::text_pages;
use crate::pdf::collect::PageCollector;
use crate::pdf::PdfDocument;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Convert a single file to PDF, choosing the conversion by extension.
pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<Written> {
    let input = input.as_ref();
    let output = output.as_ref();
    let extension = input
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let written = match extension.as_str() {
        "png" | "jpg" | "jpeg" => images::run(&[input], output)?,
        "txt" => text_to_pdf(input, output)?,
        "pdf" => {
            let page_count = PdfDocument::open(input)?.page_count();
            std::fs::copy(input, output).with_context(|| {
                format!("Failed to copy {} to {}", input.display(), output.display())
            })?;
            Written {
                output_path: output.display().to_string(),
                page_count,
            }
        }
        "docx" | "pptx" => {
            anyhow::bail!("Office documents are not supported: {}", input.display())
        }
        _ => anyhow::bail!("Unsupported file type: {}", input.display()),
    };

    info!(input = %input.display(), output = %output.display(), "converted file");
    Ok(written)
}

fn text_to_pdf(input: &Path, output: &Path) -> Result<Written> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read text file: {}", input.display()))?;

    let mut collector = PageCollector::new();
    let page_count = text_pages(&mut collector, &text)? as u32;
    let mut doc = collector.finish()?;
    PdfDocument::save(&mut doc, output)?;

    Ok(Written {
        output_path: output.display().to_string(),
        page_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::test_support::{page_texts, sample_pdf};

    #[test]
    fn test_convert_text() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.TXT");
        let output = dir.path().join("converted_file.pdf");
        std::fs::write(&input, "first line\nsecond (line)\n").unwrap();

        let written = run(&input, &output).unwrap();
        assert_eq!(written.page_count, 1);

        let out = PdfDocument::open(&output).unwrap();
        assert_eq!(
            page_texts(&out)[0],
            vec!["first line", "second (line)", ""]
        );
    }

    #[test]
    fn test_convert_pdf_is_copied() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        let output = dir.path().join("out.pdf");
        std::fs::write(&input, sample_pdf(2)).unwrap();

        assert_eq!(run(&input, &output).unwrap().page_count, 2);
        assert_eq!(
            std::fs::read(&input).unwrap(),
            std::fs::read(&output).unwrap()
        );
    }

    #[test]
    fn test_convert_rejects_office_documents() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("slides.pptx");
        std::fs::write(&input, b"PK").unwrap();
        let err = run(&input, dir.path().join("out.pdf")).unwrap_err();
        assert!(err.to_string().contains("Office documents"));
    }

    #[test]
    fn test_convert_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.bin");
        std::fs::write(&input, b"\0\0").unwrap();
        assert!(run(&input, dir.path().join("out.pdf")).is_err());
    }
}
