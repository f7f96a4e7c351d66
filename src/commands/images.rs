use crate::commands::Written;
use crate::pdf::build::image_page;
use crate::pdf::collect::PageCollector;
use crate::pdf::PdfDocument;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

/// One page per image, in argument order.
pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(inputs: &[P], output: Q) -> Result<Written> {
    if inputs.is_empty() {
        anyhow::bail!("No input files specified");
    }

    let mut collector = PageCollector::new();
    for input in inputs {
        let input = input.as_ref();
        let image = image::open(input)
            .with_context(|| format!("Failed to read image: {}", input.display()))?;
        debug!(path = %input.display(), width = image.width(), height = image.height(), "decoded image");
        image_page(&mut collector, &image)?;
    }
    let page_count = collector.page_count() as u32;

    let mut doc = collector.finish()?;
    PdfDocument::save(&mut doc, &output)?;

    info!(images = inputs.len(), output = %output.as_ref().display(), "converted images");
    Ok(Written {
        output_path: output.as_ref().display().to_string(),
        page_count,
    })
}
