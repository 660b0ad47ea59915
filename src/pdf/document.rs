use anyhow::{Context, Result};
use lopdf::{Document, Object, ObjectId};
use std::path::Path;

pub struct PdfDocument {
    pub doc: Document,
    pub path: String,
}

impl PdfDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().display().to_string();
        let doc =
            Document::load(&path).with_context(|| format!("Failed to open PDF: {}", path_str))?;
        Ok(PdfDocument {
            doc,
            path: path_str,
        })
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Get 1-indexed page object IDs
    pub fn page_ids(&self) -> Vec<(u32, ObjectId)> {
        let mut pages: Vec<_> = self.doc.get_pages().into_iter().collect();
        pages.sort_by_key(|(num, _)| *num);
        pages
    }

    /// Copy the inclusive 1-based page range `start..=end` into a new document.
    ///
    /// Pages keep their original order. Objects only reachable from dropped pages are pruned.
    pub fn extract_range(&self, start: u32, end: u32) -> Result<Document> {
        let total = self.page_count();
        if start == 0 || end == 0 || start > total || end > total {
            anyhow::bail!("Page range {}-{} is out of range (1-{})", start, end, total);
        }
        if start > end {
            anyhow::bail!("Page range {}-{} is reversed", start, end);
        }

        let mut new_doc = self.doc.clone();

        // Get page numbers to delete (pages outside the range)
        let pages_to_delete: Vec<u32> = self
            .page_ids()
            .iter()
            .map(|(num, _)| *num)
            .filter(|num| *num < start || *num > end)
            .collect();

        if !pages_to_delete.is_empty() {
            new_doc.delete_pages(&pages_to_delete);
            new_doc.prune_objects();
        }

        Ok(new_doc)
    }

    /// Save to a file
    pub fn save<P: AsRef<Path>>(doc: &mut Document, path: P) -> Result<()> {
        doc.save(&path)
            .with_context(|| format!("Failed to save PDF: {}", path.as_ref().display()))?;
        Ok(())
    }
}

/// Flate-compress the content streams of every page in `doc`.
///
/// Streams that already carry a filter are left alone. Returns how many streams were
/// handed to the compressor; lopdf keeps a stream raw when deflate would not shrink it.
pub fn compress_page_streams(doc: &mut Document) -> Result<usize> {
    let content_ids: Vec<ObjectId> = doc
        .get_pages()
        .into_values()
        .flat_map(|page_id| doc.get_page_contents(page_id))
        .collect();

    let mut compressed = 0;
    for id in content_ids {
        if let Ok(Object::Stream(stream)) = doc.get_object_mut(id) {
            if stream.dict.has(b"Filter") {
                continue;
            }
            stream
                .compress()
                .with_context(|| format!("Failed to compress content stream {:?}", id))?;
            compressed += 1;
        }
    }

    Ok(compressed)
}
