pub mod blank;
pub mod compress;
pub mod convert;
pub mod extract;
pub mod images;
pub mod merge;
pub mod number;
pub mod split;

use rmcp::schemars;
use serde::{Deserialize, Serialize};

/// Outcome of an operation that writes a single PDF.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Written {
    pub output_path: String,
    pub page_count: u32,
}
