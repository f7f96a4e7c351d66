use anyhow::Result;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::commands;
use crate::pdf::PdfDocument;

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfExtractRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Pages to extract, 1-based, in output order (e.g., '1,3,5-7'); repeats are kept")]
    pub pages: String,
    #[schemars(description = "Output file path")]
    pub output: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfSplitRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Pages per part; omit to split into single pages")]
    #[serde(default)]
    pub every: Option<u32>,
    #[schemars(description = "Write single pages into a zip archive at `output` (default: false)")]
    #[serde(default)]
    pub zip: bool,
    #[schemars(description = "Output directory, or archive path when zip is true")]
    pub output: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfMergeRequest {
    #[schemars(description = "PDF files to merge, in order")]
    pub inputs: Vec<String>,
    #[schemars(description = "Output file path")]
    pub output: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfTransformRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Output file path")]
    pub output: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfBlankRequest {
    #[schemars(description = "Number of pages (1-100000, default: 1)")]
    #[serde(default = "default_blank_pages")]
    pub pages: u32,
    #[schemars(description = "Output file path")]
    pub output: String,
}

fn default_blank_pages() -> u32 {
    1
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfImagesRequest {
    #[schemars(description = "PNG or JPEG files, one page each, in order")]
    pub inputs: Vec<String>,
    #[schemars(description = "Output file path")]
    pub output: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfConvertRequest {
    #[schemars(description = "File to convert: .png, .jpg, .jpeg, .txt or .pdf")]
    pub path: String,
    #[schemars(description = "Output file path")]
    pub output: String,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PageCountResult {
    pub path: String,
    pub page_count: u32,
}

fn respond<T: Serialize>(tool: &str, result: Result<T>) -> String {
    match result {
        Ok(value) => {
            info!(tool, "tool call succeeded");
            serde_json::to_string_pretty(&value).unwrap_or_else(|e| format!("Error: {}", e))
        }
        Err(e) => {
            warn!(tool, error = %e, "tool call failed");
            format!("Error: {}", e)
        }
    }
}

#[derive(Debug, Clone)]
pub struct PdfServer {
    tool_router: ToolRouter<Self>,
}

impl PdfServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }
}

impl Default for PdfServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl PdfServer {
    #[tool(description = "Get the number of pages in a PDF")]
    fn pdf_page_count(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        let result = PdfDocument::open(&path).map(|doc| PageCountResult {
            page_count: doc.page_count(),
            path,
        });
        respond("pdf_page_count", result)
    }

    #[tool(description = "Extract pages from a PDF into a new file. Use page syntax like '1,3,5-7'; pages are written in the order given and repeats are kept.")]
    fn pdf_extract(&self, Parameters(req): Parameters<PdfExtractRequest>) -> String {
        respond(
            "pdf_extract",
            commands::extract::run(&req.path, &req.pages, &req.output),
        )
    }

    #[tool(description = "Split a PDF into single-page files, fixed-size parts, or a zip archive of single pages")]
    fn pdf_split(&self, Parameters(req): Parameters<PdfSplitRequest>) -> String {
        let result = match (req.every, req.zip) {
            (Some(_), true) => Err(anyhow::anyhow!("`every` and `zip` cannot be combined")),
            (Some(chunk_size), false) => {
                commands::split::run_chunks(&req.path, chunk_size, &req.output)
            }
            (None, true) => commands::split::run_zip(&req.path, &req.output),
            (None, false) => commands::split::run(&req.path, &req.output),
        };
        respond("pdf_split", result)
    }

    #[tool(description = "Combine multiple PDFs into one, in the order given")]
    fn pdf_merge(&self, Parameters(req): Parameters<PdfMergeRequest>) -> String {
        respond("pdf_merge", commands::merge::run(&req.inputs, &req.output))
    }

    #[tool(description = "Rewrite a PDF with unused objects removed and streams deflated")]
    fn pdf_compress(&self, Parameters(req): Parameters<PdfTransformRequest>) -> String {
        respond("pdf_compress", commands::compress::run(&req.path, &req.output))
    }

    #[tool(description = "Stamp 'Page N' near the top-left corner of every page")]
    fn pdf_number_pages(&self, Parameters(req): Parameters<PdfTransformRequest>) -> String {
        respond("pdf_number_pages", commands::number::run(&req.path, &req.output))
    }

    #[tool(description = "Generate a PDF of A4 pages, each labelled with its page number")]
    fn pdf_blank(&self, Parameters(req): Parameters<PdfBlankRequest>) -> String {
        respond("pdf_blank", commands::blank::run(req.pages, &req.output))
    }

    #[tool(description = "Combine PNG/JPEG images into a PDF, one page per image")]
    fn pdf_images_to_pdf(&self, Parameters(req): Parameters<PdfImagesRequest>) -> String {
        respond(
            "pdf_images_to_pdf",
            commands::images::run(&req.inputs, &req.output),
        )
    }

    #[tool(description = "Convert an image, text file or PDF into a PDF, chosen by file extension")]
    fn pdf_convert(&self, Parameters(req): Parameters<PdfConvertRequest>) -> String {
        respond("pdf_convert", commands::convert::run(&req.path, &req.output))
    }
}

#[tool_handler]
impl ServerHandler for PdfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "PDF toolbox. Use pdf_page_count to size a document, pdf_extract to copy pages \
                 in any order, pdf_split and pdf_merge to cut and join files, pdf_compress to \
                 shrink a file, pdf_number_pages to stamp page numbers, pdf_blank for empty \
                 documents, pdf_images_to_pdf to turn images into pages and pdf_convert for \
                 text files."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server() -> Result<()> {
    let server = PdfServer::new();
    info!("starting MCP server on stdio");

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::test_support::sample_pdf;

    #[test]
    fn test_page_count_tool() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        std::fs::write(&input, sample_pdf(3)).unwrap();

        let server = PdfServer::new();
        let out = server.pdf_page_count(Parameters(PathRequest {
            path: input.display().to_string(),
        }));
        let parsed: PageCountResult = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed.page_count, 3);
    }

    #[test]
    fn test_extract_tool_reports_range_errors() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        std::fs::write(&input, sample_pdf(3)).unwrap();

        let server = PdfServer::new();
        let out = server.pdf_extract(Parameters(PdfExtractRequest {
            path: input.display().to_string(),
            pages: "2-1".to_string(),
            output: dir.path().join("out.pdf").display().to_string(),
        }));
        assert!(out.starts_with("Error: Invalid page range"));
    }

    #[test]
    fn test_convert_tool() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.txt");
        let output = dir.path().join("converted_file.pdf");
        std::fs::write(&input, "hello\nworld").unwrap();

        let server = PdfServer::new();
        let out = server.pdf_convert(Parameters(PdfConvertRequest {
            path: input.display().to_string(),
            output: output.display().to_string(),
        }));
        let written: commands::Written = serde_json::from_str(&out).unwrap();
        assert_eq!(written.page_count, 1);
        assert!(output.exists());

        let out = server.pdf_convert(Parameters(PdfConvertRequest {
            path: dir.path().join("slides.pptx").display().to_string(),
            output: dir.path().join("slides.pdf").display().to_string(),
        }));
        assert!(out.starts_with("Error: Office documents are not supported"));
    }

    #[test]
    fn test_split_tool_rejects_every_with_zip() {
        let server = PdfServer::new();
        let out = server.pdf_split(Parameters(PdfSplitRequest {
            path: "in.pdf".to_string(),
            every: Some(2),
            zip: true,
            output: "out".to_string(),
        }));
        assert!(out.starts_with("Error:"));
    }
}
