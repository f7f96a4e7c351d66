use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "allpdf")]
#[command(about = "All-in-one PDF toolbox with MCP server support")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server
    Mcp,

    /// Print the number of pages in a PDF
    Pages {
        /// PDF file to inspect
        path: PathBuf,
    },

    /// Extract pages to a new PDF, in the order given
    #[command(alias = "cat")]
    Extract {
        /// PDF file to extract from
        path: PathBuf,

        /// Pages to extract (e.g., "1,3,5-7"); repeats are kept
        pages: String,

        /// Output file
        #[arg(short, long, default_value = "extracted_pages.pdf")]
        output: PathBuf,
    },

    /// Combine multiple PDFs into one
    Merge {
        /// PDF files to merge
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file
        #[arg(short, long, default_value = "merged_pdf.pdf")]
        output: PathBuf,
    },

    /// Split a PDF into single pages or fixed-size parts
    #[command(alias = "burst")]
    Split {
        /// PDF file to split
        path: PathBuf,

        /// Pages per part; parts are written as split_part_N.pdf
        #[arg(short, long, conflicts_with = "zip")]
        every: Option<u32>,

        /// Pack single pages into a zip archive instead of a directory
        #[arg(short, long)]
        zip: bool,

        /// Output directory, or archive path with --zip
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rewrite a PDF with unused objects dropped and streams deflated
    Compress {
        /// PDF file to compress
        path: PathBuf,

        /// Output file
        #[arg(short, long, default_value = "compressed_pdf.pdf")]
        output: PathBuf,
    },

    /// Stamp "Page N" on every page
    Number {
        /// PDF file to number
        path: PathBuf,

        /// Output file
        #[arg(short, long, default_value = "numbered_pdf.pdf")]
        output: PathBuf,
    },

    /// Generate a PDF of labelled A4 pages
    Blank {
        /// Number of pages (1-100000)
        #[arg(default_value = "1")]
        pages: u32,

        /// Output file
        #[arg(short, long, default_value = "empty_pdf.pdf")]
        output: PathBuf,
    },

    /// Combine PNG/JPEG images into a PDF, one page per image
    Images {
        /// Image files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file
        #[arg(short, long, default_value = "images_pdf.pdf")]
        output: PathBuf,
    },

    /// Convert an image, text or PDF file to PDF
    Convert {
        /// File to convert
        path: PathBuf,

        /// Output file
        #[arg(short, long, default_value = "converted_file.pdf")]
        output: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_extract_defaults() {
        let cli = Cli::try_parse_from(["allpdf", "cat", "in.pdf", "1,3"]).unwrap();
        match cli.command {
            Commands::Extract { pages, output, .. } => {
                assert_eq!(pages, "1,3");
                assert_eq!(output, PathBuf::from("extracted_pages.pdf"));
            }
            _ => panic!("expected extract"),
        }
    }

    #[test]
    fn test_split_every_conflicts_with_zip() {
        assert!(Cli::try_parse_from(["allpdf", "split", "in.pdf", "--every", "2", "--zip"]).is_err());
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["allpdf", "pages", "in.pdf", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
