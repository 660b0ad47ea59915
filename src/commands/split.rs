use crate::chapterizer::ExportReport;
use crate::runner::Runner;
use crate::session::{Command, Session};
use anyhow::Result;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct SplitOptions {
    /// Only bookmark chapters whose title contains this (case-insensitive)
    pub keyword: String,
    /// 1-based candidate rows to export
    pub select: Vec<usize>,
    /// Export every candidate row
    pub all: bool,
    /// Extra page ranges, e.g. "1-5, 7-9"
    pub ranges: Option<String>,
}

/// Drive one non-interactive session: open, select, submit.
pub fn chapterfy<P, Q, W>(
    input: P,
    output_dir: Q,
    options: &SplitOptions,
    out: W,
) -> Result<(W, Vec<ExportReport>)>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    W: Write,
{
    let mut runner = Runner::new(Session::new(options.keyword.clone()), out);
    runner.open(input)?;

    let rows = runner.session().candidates.len();
    let indices: Vec<usize> = if options.all {
        (0..rows).collect()
    } else {
        options
            .select
            .iter()
            .filter_map(|row| row.checked_sub(1))
            .collect()
    };
    for index in indices {
        // Selecting a row twice would toggle it back off.
        let already = runner
            .session()
            .candidates
            .rows()
            .get(index)
            .is_some_and(|row| row.selected);
        if !already {
            runner.dispatch(Command::RowToggled(index))?;
        }
    }

    if let Some(ranges) = &options.ranges {
        runner.dispatch(Command::ApplyRanges(ranges.clone()))?;
    }

    runner.dispatch(Command::OutputFolderSelected(output_dir.as_ref().to_path_buf()))?;
    runner.dispatch(Command::Submit)?;

    let (_, out, reports) = runner.into_parts();
    Ok((out, reports))
}

pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output_dir: Q,
    options: &SplitOptions,
) -> Result<()> {
    let (_stdout, _reports) =
        chapterfy(input, output_dir, options, std::io::stdout().lock())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::document::test_support::build_pdf;

    fn source(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("book.pdf");
        build_pdf(
            30,
            &[
                ("Preface", 1),
                ("Chapter 1", 4),
                ("Chapter 2", 12),
                ("Index", 28),
            ],
        )
        .save(&path)
        .unwrap();
        path
    }

    fn written_names(reports: &[ExportReport]) -> Vec<String> {
        reports
            .iter()
            .flat_map(|r| &r.written)
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_all_with_keyword() {
        let dir = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let options = SplitOptions {
            keyword: "chapter".to_string(),
            all: true,
            ..Default::default()
        };

        let (_, reports) = chapterfy(source(dir.path()), out.path(), &options, Vec::new()).unwrap();
        assert_eq!(written_names(&reports), vec!["Chapter 1.pdf", "Chapter 2.pdf"]);
    }

    #[test]
    fn test_select_rows_and_ranges() {
        let dir = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let options = SplitOptions {
            select: vec![1, 1, 9],
            ranges: Some("28-30, 29-31, 4".to_string()),
            ..Default::default()
        };

        let (messages, reports) =
            chapterfy(source(dir.path()), out.path(), &options, Vec::new()).unwrap();
        assert_eq!(written_names(&reports), vec!["Preface.pdf", "28_30.pdf"]);

        let messages = String::from_utf8(messages).unwrap();
        assert!(messages.contains("Invalid chapter syntax: 4"));
        assert!(messages.contains("end page 31 is past the last page"));
    }

    #[test]
    fn test_nothing_selected() {
        let dir = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();

        let (messages, reports) = chapterfy(
            source(dir.path()),
            out.path(),
            &SplitOptions::default(),
            Vec::new(),
        )
        .unwrap();
        assert!(reports.is_empty());
        assert_eq!(String::from_utf8(messages).unwrap(), "Chapters not present\n");
    }
}
