//! Session state and the command handler behind every front end.
//!
//! [`handle`] takes the current [`Session`] and one [`Command`] and returns the next
//! session together with the [`Effect`]s the caller must carry out. Nothing in here
//! touches the filesystem.

use std::path::PathBuf;

use crate::chapter::{Chapter, CandidateTable, ChapterRegistry};
use crate::chapterizer::derive_candidates;
use crate::error::ChapterfyError;
use crate::page_range::{apply_ranges, RangeOutcome};
use crate::pdf::toc::Bookmark;

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub source: Option<PathBuf>,
    pub output_folder: Option<PathBuf>,
    pub keyword: String,
    pub bookmarks: Vec<Bookmark>,
    pub candidates: CandidateTable,
    pub registry: ChapterRegistry,
}

impl Session {
    pub fn new(keyword: impl Into<String>) -> Self {
        Session {
            keyword: keyword.into(),
            ..Default::default()
        }
    }

    /// `(pdf_path, chapters, output_folder)` presence flags.
    pub fn inputs_present(&self) -> (bool, bool, bool) {
        (
            self.source.is_some(),
            !self.registry.is_empty(),
            self.output_folder.is_some(),
        )
    }

    fn refresh_candidates(&mut self) {
        let chapters = derive_candidates(&self.bookmarks, &self.keyword);
        self.candidates = CandidateTable::from_chapters(chapters, &self.registry);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A new source document was picked; `bookmarks` are its top-level outline entries.
    DocumentSelected {
        path: PathBuf,
        bookmarks: Vec<Bookmark>,
    },
    KeywordChanged(String),
    /// Free-text ranges such as "1-5, 7-9".
    ApplyRanges(String),
    OutputFolderSelected(PathBuf),
    /// Row index into the candidate table.
    RowToggled(usize),
    Submit,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// A blocking, user-visible message.
    ShowMessage(String),
    Export {
        source: PathBuf,
        chapters: Vec<Chapter>,
        output_folder: PathBuf,
    },
    Quit,
}

impl Effect {
    fn error(err: ChapterfyError) -> Self {
        Effect::ShowMessage(err.to_string())
    }
}

pub fn handle(mut session: Session, command: Command) -> (Session, Vec<Effect>) {
    let mut effects = Vec::new();

    match command {
        Command::DocumentSelected { path, bookmarks } => {
            tracing::info!(pdf = %path.display(), bookmarks = bookmarks.len(), "document selected");
            session.source = Some(path);
            session.bookmarks = bookmarks;
            session.registry.clear();
            session.refresh_candidates();
        }
        Command::KeywordChanged(keyword) => {
            session.keyword = keyword;
            session.refresh_candidates();
        }
        Command::ApplyRanges(input) => {
            for outcome in apply_ranges(&input, &mut session.registry) {
                match outcome {
                    RangeOutcome::Accepted { chapter, added } => {
                        tracing::debug!(chapter = %chapter.name, added, "range accepted");
                    }
                    RangeOutcome::Rejected(err) => effects.push(Effect::error(err)),
                }
            }
            // Range chapters can coincide with bookmark rows.
            session.candidates.sync(&session.registry);
            tracing::debug!(chapters = ?session.registry.as_slice(), "ranges applied");
        }
        Command::OutputFolderSelected(folder) => {
            tracing::info!(output = %folder.display(), "output folder selected");
            session.output_folder = Some(folder);
        }
        Command::RowToggled(index) => {
            if !session.candidates.toggle(index, &mut session.registry) {
                tracing::debug!(index, "toggle ignored, no such row");
            }
        }
        Command::Submit => match (&session.source, &session.output_folder) {
            (Some(source), Some(output_folder)) if !session.registry.is_empty() => {
                tracing::info!("all inputs present");
                effects.push(Effect::Export {
                    source: source.clone(),
                    chapters: session.registry.as_slice().to_vec(),
                    output_folder: output_folder.clone(),
                });
            }
            _ => {
                let (pdf_path, chapters, output_folder) = session.inputs_present();
                effects.push(Effect::error(ChapterfyError::MissingRequiredInput {
                    pdf_path,
                    chapters,
                    output_folder,
                }));
            }
        },
        Command::Cancel => effects.push(Effect::Quit),
    }

    (session, effects)
}
