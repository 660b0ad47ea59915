use crate::chapter::{CandidateTable, ChapterRegistry};
use crate::chapterizer::{derive_candidates, output_file_name};
use crate::runner::load_bookmarks;
use anyhow::Result;
use std::io::Write;
use std::path::Path;

pub fn run<P: AsRef<Path>>(path: P, keyword: &str) -> Result<()> {
    let bookmarks = load_bookmarks(&path)?;
    let table = CandidateTable::from_chapters(
        derive_candidates(&bookmarks, keyword),
        &ChapterRegistry::new(),
    );

    if table.is_empty() {
        println!("No chapters found.");
        return Ok(());
    }

    write_table(&table, &mut std::io::stdout().lock())?;
    Ok(())
}

/// Numbered rows, 1-based, the way `--select` and `toggle` expect them.
pub fn write_table<W: Write>(table: &CandidateTable, out: &mut W) -> Result<()> {
    for (index, row) in table.rows().iter().enumerate() {
        let mark = if row.selected { "x" } else { " " };
        writeln!(
            out,
            "[{}] {:>3}. {} (pp. {}-{}) -> {}",
            mark,
            index + 1,
            row.name,
            row.start_page,
            row.end_page,
            output_file_name(&row.chapter())
        )?;
    }
    writeln!(out, "{}", table.summary())?;
    Ok(())
}
