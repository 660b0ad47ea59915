//! Carries out the effects produced by [`session::handle`](crate::session::handle).

use std::io::Write;
use std::path::Path;

use anyhow::Result;

use crate::chapterizer::{export_chapters, ExportReport};
use crate::error::ChapterfyError;
use crate::pdf::toc::{top_level_bookmarks, Bookmark};
use crate::pdf::PdfDocument;
use crate::session::{handle, Command, Effect, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub fn load_bookmarks<P: AsRef<Path>>(path: P) -> Result<Vec<Bookmark>> {
    let doc = PdfDocument::open(&path)?;
    top_level_bookmarks(&doc.doc)
}

/// Owns a session and writes user-facing messages to `out`.
pub struct Runner<W: Write> {
    session: Session,
    out: W,
    reports: Vec<ExportReport>,
}

impl<W: Write> Runner<W> {
    pub fn new(session: Session, out: W) -> Self {
        Runner {
            session,
            out,
            reports: Vec::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_parts(self) -> (Session, W, Vec<ExportReport>) {
        (self.session, self.out, self.reports)
    }

    /// Read the document's bookmarks and select it as the source.
    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<Flow> {
        let path = path.as_ref();
        let bookmarks = load_bookmarks(path)?;
        self.dispatch(Command::DocumentSelected {
            path: path.to_path_buf(),
            bookmarks,
        })
    }

    pub fn dispatch(&mut self, command: Command) -> Result<Flow> {
        let (session, effects) = handle(std::mem::take(&mut self.session), command);
        self.session = session;

        let mut flow = Flow::Continue;
        for effect in effects {
            match effect {
                Effect::ShowMessage(message) => writeln!(self.out, "{}", message)?,
                Effect::Export {
                    source,
                    chapters,
                    output_folder,
                } => {
                    let out = &mut self.out;
                    let exported = export_chapters(&source, &chapters, &output_folder, |skip| {
                        writeln!(out, "{}", skip)
                    });
                    let report = match exported {
                        Ok(report) => report,
                        // Missing folder or document: tell the user, nothing was written.
                        Err(err) if err.is::<ChapterfyError>() => {
                            writeln!(self.out, "{}", err)?;
                            continue;
                        }
                        Err(err) => return Err(err),
                    };
                    writeln!(
                        self.out,
                        "Wrote {} chapter file(s) to {}",
                        report.written.len(),
                        output_folder.display()
                    )?;
                    self.reports.push(report);
                }
                Effect::Quit => flow = Flow::Quit,
            }
        }

        Ok(flow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::document::test_support::{build_pdf, page_labels};
    use lopdf::Document;

    #[test]
    fn test_three_bookmarks_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("book.pdf");
        build_pdf(25, &[("Intro", 1), ("Ch/1: Start", 10), ("Ch 2", 20)])
            .save(&source)
            .unwrap();
        let out = tempfile::tempdir().unwrap();

        let mut runner = Runner::new(Session::default(), Vec::new());
        runner.open(&source).unwrap();
        assert_eq!(runner.session().candidates.len(), 2);

        runner.dispatch(Command::RowToggled(0)).unwrap();
        runner.dispatch(Command::RowToggled(1)).unwrap();
        runner
            .dispatch(Command::OutputFolderSelected(out.path().to_path_buf()))
            .unwrap();
        assert_eq!(runner.dispatch(Command::Submit).unwrap(), Flow::Continue);

        let (_, messages, reports) = runner.into_parts();
        assert_eq!(reports.len(), 1);
        assert_eq!(
            String::from_utf8(messages).unwrap(),
            format!("Wrote 2 chapter file(s) to {}\n", out.path().display())
        );

        let intro = Document::load(out.path().join("Intro.pdf")).unwrap();
        assert_eq!(intro.get_pages().len(), 9);
        let start = Document::load(out.path().join("Ch_1  Start.pdf")).unwrap();
        assert_eq!(page_labels(&start).first().map(String::as_str), Some("Page 10"));
        assert_eq!(page_labels(&start).last().map(String::as_str), Some("Page 19"));
        assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_missing_output_folder_is_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("book.pdf");
        build_pdf(5, &[]).save(&source).unwrap();
        let gone = dir.path().join("gone");

        let mut runner = Runner::new(Session::default(), Vec::new());
        runner.open(&source).unwrap();
        runner.dispatch(Command::ApplyRanges("1-2".to_string())).unwrap();
        runner.dispatch(Command::OutputFolderSelected(gone.clone())).unwrap();
        runner.dispatch(Command::Submit).unwrap();

        let (_, messages, reports) = runner.into_parts();
        assert!(reports.is_empty());
        assert_eq!(
            String::from_utf8(messages).unwrap(),
            format!("Output folder does not exist: {}\n", gone.display())
        );
    }

    #[test]
    fn test_cancel_stops() {
        let mut runner = Runner::new(Session::default(), Vec::new());
        assert_eq!(runner.dispatch(Command::Cancel).unwrap(), Flow::Quit);
    }

    #[test]
    fn test_skips_are_printed_before_a_fatal_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("book.pdf");
        build_pdf(5, &[]).save(&source).unwrap();
        let out = tempfile::tempdir().unwrap();
        // A directory where the chapter file should go makes the write fail.
        std::fs::create_dir(out.path().join("1_2.pdf")).unwrap();

        let mut runner = Runner::new(Session::default(), Vec::new());
        runner.open(&source).unwrap();
        runner
            .dispatch(Command::ApplyRanges("4-9, 1-2".to_string()))
            .unwrap();
        runner
            .dispatch(Command::OutputFolderSelected(out.path().to_path_buf()))
            .unwrap();
        assert!(runner.dispatch(Command::Submit).is_err());

        let (_, messages, reports) = runner.into_parts();
        assert!(reports.is_empty());
        assert_eq!(
            String::from_utf8(messages).unwrap(),
            "Chapter '4_9' skipped: end page 9 is past the last page (document has 5 pages)\n"
        );
    }
}
