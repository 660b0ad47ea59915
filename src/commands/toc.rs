use crate::chapter::Chapter;
use crate::chapterizer::derive_candidates;
use crate::pdf::toc::{flatten_outline, read_outline, Bookmark, OutlineEntry};
use crate::pdf::PdfDocument;
use anyhow::Result;
use std::io::Write;
use std::path::Path;

pub fn run<P: AsRef<Path>>(path: P) -> Result<()> {
    let doc = PdfDocument::open(&path)?;
    let entries = read_outline(&doc.doc)?;
    write_outline(&entries, &mut std::io::stdout().lock())
}

/// Print the outline tree, tagging each top-level entry that starts a chapter with its span.
pub fn write_outline<W: Write>(entries: &[OutlineEntry], out: &mut W) -> Result<()> {
    if entries.is_empty() {
        writeln!(out, "No bookmarks found.")?;
        return Ok(());
    }

    // Chapters come from resolvable top-level entries, one per entry except the last.
    let bookmarks: Vec<Bookmark> = entries
        .iter()
        .filter_map(|e| e.page.map(|page| Bookmark::new(e.title.clone(), page)))
        .collect();
    let mut chapters = derive_candidates(&bookmarks, "").into_iter();

    for entry in entries {
        let chapter = entry.page.and_then(|_| chapters.next());
        write_line(out, &entry.title, entry.page, entry.level, chapter.as_ref())?;
        for child in flatten_outline(&entry.children) {
            write_line(out, &child.title, child.page, child.level, None)?;
        }
    }

    Ok(())
}

fn write_line<W: Write>(
    out: &mut W,
    title: &str,
    page: Option<u32>,
    level: u32,
    chapter: Option<&Chapter>,
) -> Result<()> {
    let indent = "  ".repeat(level as usize);
    let page_str = page.map(|p| format!(" (p. {})", p)).unwrap_or_default();
    let chapter_str = chapter
        .map(|c| format!("  [chapter {}-{}, {} pages]", c.start_page, c.end_page, c.page_count()))
        .unwrap_or_default();
    writeln!(out, "{}{}{}{}", indent, title, page_str, chapter_str)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::document::test_support::{build_pdf, build_pdf_nested};

    fn render(entries: &[OutlineEntry]) -> String {
        let mut out = Vec::new();
        write_outline(entries, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_top_level_entries_show_chapter_spans() {
        let sections: &[(&str, u32)] = &[("Section A", 3)];
        let none: &[(&str, u32)] = &[];
        let doc = build_pdf_nested(
            30,
            &[("Part I", 1, sections), ("Part II", 15, none), ("Index", 28, none)],
        );

        assert_eq!(
            render(&read_outline(&doc).unwrap()),
            "Part I (p. 1)  [chapter 1-14, 14 pages]\n\
             \x20 Section A (p. 3)\n\
             Part II (p. 15)  [chapter 15-27, 13 pages]\n\
             Index (p. 28)\n"
        );
    }

    #[test]
    fn test_no_bookmarks() {
        let doc = build_pdf(2, &[]);
        assert_eq!(render(&read_outline(&doc).unwrap()), "No bookmarks found.\n");
    }
}
