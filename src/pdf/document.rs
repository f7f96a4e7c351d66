use anyhow::{Context, Result};
use lopdf::{Document, ObjectId};
use std::path::Path;
use tracing::debug;

use crate::page_range::PageSelection;
use crate::pdf::collect::PageCollector;

pub struct PdfDocument {
    pub doc: Document,
    pub name: String,
}

impl PdfDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let name = path.as_ref().display().to_string();
        let bytes =
            std::fs::read(&path).with_context(|| format!("Failed to open PDF: {}", name))?;
        let doc = Self::from_bytes(&bytes, &name)?;
        debug!(path = %name, pages = doc.page_count(), "opened PDF");
        Ok(doc)
    }

    pub fn from_bytes(bytes: &[u8], name: &str) -> Result<Self> {
        let doc =
            Document::load_mem(bytes).with_context(|| format!("Failed to parse PDF: {}", name))?;
        Ok(PdfDocument {
            doc,
            name: name.to_string(),
        })
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Page object IDs in document order (index 0 is the first page)
    pub fn page_ids(&self) -> Vec<ObjectId> {
        // get_pages is keyed by 1-based page number, so values come out ordered
        self.doc.get_pages().into_values().collect()
    }

    /// Build a new document from the selected pages, in selection order.
    pub fn extract_pages(&self, selection: &PageSelection) -> Result<Document> {
        let mut collector = PageCollector::new();
        let source = collector.import(self)?;
        for &index in selection.indices() {
            collector.append(source.page(index)?)?;
        }
        collector.finish()
    }

    /// Save to a file
    pub fn save<P: AsRef<Path>>(doc: &mut Document, path: P) -> Result<()> {
        doc.save(&path)
            .with_context(|| format!("Failed to save PDF: {}", path.as_ref().display()))?;
        Ok(())
    }

    /// Serialize to an in-memory buffer
    pub fn to_bytes(doc: &mut Document) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .context("Failed to serialize PDF")?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_range;
    use crate::pdf::test_support::{page_labels, sample_pdf};

    #[test]
    fn test_page_count_and_ids() {
        let doc = PdfDocument::from_bytes(&sample_pdf(4), "sample").unwrap();
        assert_eq!(doc.page_count(), 4);
        assert_eq!(doc.page_ids().len(), 4);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(PdfDocument::from_bytes(b"not a pdf", "garbage").is_err());
    }

    #[test]
    fn test_extract_keeps_order_and_duplicates() {
        let doc = PdfDocument::from_bytes(&sample_pdf(3), "sample").unwrap();
        let selection = page_range::parse("3,1,1", doc.page_count()).unwrap();
        let mut out = doc.extract_pages(&selection).unwrap();

        let bytes = PdfDocument::to_bytes(&mut out).unwrap();
        let reloaded = PdfDocument::from_bytes(&bytes, "out").unwrap();
        assert_eq!(reloaded.page_count(), 3);
        assert_eq!(page_labels(&reloaded), vec!["Page 3", "Page 1", "Page 1"]);
    }
}
