//! Chapter boundaries from bookmarks, and the per-chapter export loop.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use serde::Serialize;

use crate::chapter::Chapter;
use crate::error::{ChapterfyError, PageBound};
use crate::pdf::toc::Bookmark;
use crate::pdf::{compress_page_streams, PdfDocument};

pub const OUTPUT_EXTENSION: &str = "pdf";

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\W").expect("non-word pattern is valid"));

/// Pair each bookmark with its successor to get chapter boundaries.
///
/// A chapter runs from its bookmark's page up to the page before the next bookmark.
/// The last bookmark has no successor and produces nothing. Only candidates whose
/// name contains `keyword` (case-insensitive) are kept; an empty keyword keeps all.
pub fn derive_candidates(bookmarks: &[Bookmark], keyword: &str) -> Vec<Chapter> {
    let keyword = keyword.to_lowercase();
    bookmarks
        .windows(2)
        .map(|pair| {
            Chapter::new(
                pair[0].title.trim(),
                pair[0].page,
                pair[1].page.saturating_sub(1),
            )
        })
        .filter(|chapter| chapter.name.to_lowercase().contains(&keyword))
        .collect()
}

/// Turn a chapter name into a file stem that is safe on every common filesystem.
///
/// `/` becomes `_`, any other non-word character becomes a space, and the result is
/// trimmed. Interior runs of spaces are kept.
pub fn sanitize_file_stem(name: &str) -> String {
    let name = name.replace('/', "_");
    NON_WORD.replace_all(&name, " ").trim().to_string()
}

pub fn output_file_name(chapter: &Chapter) -> String {
    format!("{}.{}", sanitize_file_stem(&chapter.name), OUTPUT_EXTENSION)
}

/// Check a chapter's pages against the document length and each other.
pub fn check_page_bounds(chapter: &Chapter, page_count: u32) -> Result<(), ChapterfyError> {
    let bound = match (
        chapter.start_page > page_count,
        chapter.end_page > page_count,
    ) {
        (true, true) => Some(PageBound::Both {
            start: chapter.start_page,
            end: chapter.end_page,
        }),
        (true, false) => Some(PageBound::Start(chapter.start_page)),
        (false, true) => Some(PageBound::End(chapter.end_page)),
        (false, false) if chapter.start_page == 0 || chapter.end_page == 0 => {
            Some(PageBound::Zero)
        }
        (false, false) if chapter.start_page > chapter.end_page => Some(PageBound::Reversed {
            start: chapter.start_page,
            end: chapter.end_page,
        }),
        (false, false) => None,
    };

    match bound {
        Some(bound) => Err(ChapterfyError::ChapterPageOutOfBounds {
            chapter: chapter.name.clone(),
            bound,
            page_count,
        }),
        None => Ok(()),
    }
}

/// Output folder first, then the source document, matching the order users are told about.
pub fn check_export_preconditions(source: &Path, output_folder: &Path) -> Result<(), ChapterfyError> {
    if !output_folder.exists() {
        return Err(ChapterfyError::MissingOutputFolder(output_folder.to_path_buf()));
    }
    if !source.exists() {
        return Err(ChapterfyError::MissingSourceDocument(source.to_path_buf()));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportReport {
    pub written: Vec<PathBuf>,
    #[serde(skip)]
    pub skipped: Vec<ChapterfyError>,
}

/// Write one compressed PDF per chapter into `output_folder`.
///
/// A missing folder or source aborts before anything is opened. Chapters whose pages
/// are out of bounds or reversed are handed to `on_skip` as soon as they are found and
/// the rest still export. Failures while extracting or writing a chapter end the run.
pub fn export_chapters<F>(
    source: &Path,
    chapters: &[Chapter],
    output_folder: &Path,
    mut on_skip: F,
) -> Result<ExportReport>
where
    F: FnMut(&ChapterfyError) -> std::io::Result<()>,
{
    tracing::info!(pdf = %source.display(), output = %output_folder.display(), "chapterfying");
    tracing::debug!(?chapters, "chapters to export");

    check_export_preconditions(source, output_folder)?;

    let doc = PdfDocument::open(source)?;
    let page_count = doc.page_count();
    tracing::debug!(pdf = %doc.path, page_count, "opened source");
    let mut report = ExportReport::default();

    for (index, chapter) in chapters.iter().enumerate() {
        tracing::info!(
            "doing chapter {} of {}: {} (pages {}-{}, {} total)",
            index + 1,
            chapters.len(),
            chapter.name,
            chapter.start_page,
            chapter.end_page,
            chapter.page_count()
        );

        if let Err(err) = check_page_bounds(chapter, page_count) {
            tracing::warn!("{}", err);
            on_skip(&err)?;
            report.skipped.push(err);
            continue;
        }

        let output_path = output_folder.join(output_file_name(chapter));

        let mut chapter_doc = doc.extract_range(chapter.start_page, chapter.end_page)?;
        let streams = compress_page_streams(&mut chapter_doc)?;
        PdfDocument::save(&mut chapter_doc, &output_path)?;

        tracing::debug!(path = %output_path.display(), streams, "wrote chapter");
        report.written.push(output_path);
    }

    tracing::info!(
        written = report.written.len(),
        skipped = report.skipped.len(),
        "done"
    );
    Ok(report)
}
