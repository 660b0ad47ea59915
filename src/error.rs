use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which page of a chapter fell outside the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageBound {
    Start(u32),
    End(u32),
    Both { start: u32, end: u32 },
    /// Pages are 1-based; 0 never names a real page.
    Zero,
    /// Start after end, e.g. two bookmarks pointing at the same page.
    Reversed { start: u32, end: u32 },
}

impl fmt::Display for PageBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageBound::Start(page) => write!(f, "start page {} is past the last page", page),
            PageBound::End(page) => write!(f, "end page {} is past the last page", page),
            PageBound::Both { start, end } => {
                write!(f, "both pages ({}-{}) are past the last page", start, end)
            }
            PageBound::Zero => write!(f, "page numbers start at 1"),
            PageBound::Reversed { start, end } => {
                write!(f, "start page {} comes after end page {}", start, end)
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChapterfyError {
    #[error("Output folder does not exist: {}", .0.display())]
    MissingOutputFolder(PathBuf),

    #[error("PDF does not exist: {}", .0.display())]
    MissingSourceDocument(PathBuf),

    #[error("Invalid chapter syntax: {0}")]
    InvalidRangeSyntax(String),

    #[error("Invalid range: {0}")]
    InvalidRangeOrder(String),

    #[error("Chapter '{chapter}' skipped: {bound} (document has {page_count} pages)")]
    ChapterPageOutOfBounds {
        chapter: String,
        bound: PageBound,
        page_count: u32,
    },

    /// Each flag records whether that input is present.
    #[error("{}", missing_inputs_message(*pdf_path, *chapters, *output_folder))]
    MissingRequiredInput {
        pdf_path: bool,
        chapters: bool,
        output_folder: bool,
    },
}

fn missing_inputs_message(pdf_path: bool, chapters: bool, output_folder: bool) -> &'static str {
    match (pdf_path, chapters, output_folder) {
        (false, true, true) => "PDF path not present",
        (true, false, true) => "Chapters not present",
        (true, true, false) => "Output folder not present",
        (false, false, true) => "PDF path and chapters not present",
        (false, true, false) => "PDF path and output folder not present",
        (true, false, false) => "Chapters and output folder not present",
        (false, false, false) => "No inputs present",
        (true, true, true) => "All inputs present",
    }
}
