pub mod build;
pub mod collect;
pub mod document;

pub use document::PdfDocument;
