use serde::Serialize;

/// A named, inclusive, 1-based page range that becomes one output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chapter {
    pub name: String,
    pub start_page: u32,
    pub end_page: u32,
}

impl Chapter {
    pub fn new(name: impl Into<String>, start_page: u32, end_page: u32) -> Self {
        Chapter {
            name: name.into(),
            start_page,
            end_page,
        }
    }

    pub fn page_count(&self) -> u32 {
        if self.end_page < self.start_page {
            0
        } else {
            self.end_page - self.start_page + 1
        }
    }
}

/// Confirmed chapters, in the order they were selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterRegistry {
    chapters: Vec<Chapter>,
}

impl ChapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `chapter` unless an identical one (name and both pages) is already present.
    pub fn add(&mut self, chapter: Chapter) -> bool {
        if self.contains(&chapter) {
            return false;
        }
        self.chapters.push(chapter);
        true
    }

    /// Remove the first chapter called `name`.
    ///
    /// Matches on the name only, unlike [`add`](Self::add) which compares every field.
    /// When two chapters share a name, the earlier one goes even if it is not the one
    /// a caller toggled.
    pub fn remove(&mut self, name: &str) -> Option<Chapter> {
        let index = self.chapters.iter().position(|c| c.name == name)?;
        Some(self.chapters.remove(index))
    }

    pub fn contains(&self, chapter: &Chapter) -> bool {
        self.chapters.contains(chapter)
    }

    /// Flip registry membership for the row's chapter and mark the row to match.
    ///
    /// Removal goes through [`remove`](Self::remove), so with duplicate names it may
    /// drop a different chapter. The row flag is read back from the registry afterwards
    /// and therefore always reflects membership.
    pub fn toggle(&mut self, row: &mut CandidateRow) {
        let chapter = row.chapter();
        if self.contains(&chapter) {
            tracing::debug!(chapter = %chapter.name, "removing chapter");
            self.remove(&chapter.name);
        } else {
            tracing::debug!(chapter = %chapter.name, "adding chapter");
            self.add(chapter.clone());
        }
        row.selected = self.contains(&chapter);
    }

    pub fn clear(&mut self) {
        self.chapters.clear();
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Chapter> {
        self.chapters.iter()
    }

    pub fn as_slice(&self) -> &[Chapter] {
        &self.chapters
    }
}

impl<'a> IntoIterator for &'a ChapterRegistry {
    type Item = &'a Chapter;
    type IntoIter = std::slice::Iter<'a, Chapter>;

    fn into_iter(self) -> Self::IntoIter {
        self.chapters.iter()
    }
}

/// A provisional chapter offered for selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateRow {
    pub name: String,
    pub start_page: u32,
    pub end_page: u32,
    pub selected: bool,
}

impl CandidateRow {
    pub fn chapter(&self) -> Chapter {
        Chapter::new(self.name.clone(), self.start_page, self.end_page)
    }
}

impl From<Chapter> for CandidateRow {
    fn from(chapter: Chapter) -> Self {
        CandidateRow {
            name: chapter.name,
            start_page: chapter.start_page,
            end_page: chapter.end_page,
            selected: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateTable {
    rows: Vec<CandidateRow>,
}

impl CandidateTable {
    /// Build a table from derived chapters, marking rows already in `registry`.
    pub fn from_chapters(chapters: Vec<Chapter>, registry: &ChapterRegistry) -> Self {
        let rows = chapters
            .into_iter()
            .map(|chapter| {
                let selected = registry.contains(&chapter);
                CandidateRow {
                    selected,
                    ..CandidateRow::from(chapter)
                }
            })
            .collect();
        CandidateTable { rows }
    }

    /// Toggle row `index` against `registry`. Returns false if there is no such row.
    pub fn toggle(&mut self, index: usize, registry: &mut ChapterRegistry) -> bool {
        let Some(row) = self.rows.get_mut(index) else {
            return false;
        };
        registry.toggle(row);
        self.sync(registry);
        true
    }

    /// Re-read every row's `selected` flag from `registry`.
    pub fn sync(&mut self, registry: &ChapterRegistry) {
        for row in &mut self.rows {
            row.selected = registry.contains(&row.chapter());
        }
    }

    pub fn rows(&self) -> &[CandidateRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn selected_count(&self) -> usize {
        self.rows.iter().filter(|r| r.selected).count()
    }

    pub fn summary(&self) -> String {
        format!(
            "{}/{} chapters selected",
            self.selected_count(),
            self.rows.len()
        )
    }
}
