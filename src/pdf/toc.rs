use anyhow::{Context, Result};
use lopdf::{Dictionary, Document, Object, ObjectId};
use serde::Serialize;
use std::collections::HashMap;

use super::decode_pdf_string;

/// One outline item and everything nested under it.
#[derive(Debug, Clone)]
pub struct OutlineEntry {
    pub title: String,
    pub page: Option<u32>,
    pub level: u32,
    pub children: Vec<OutlineEntry>,
}

/// A top-level bookmark whose destination resolved to a 1-based page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bookmark {
    pub title: String,
    pub page: u32,
}

impl Bookmark {
    pub fn new(title: impl Into<String>, page: u32) -> Self {
        Bookmark {
            title: title.into(),
            page,
        }
    }
}

// Outline trees in damaged files can loop through Next/First; cap the walk.
const MAX_OUTLINE_ITEMS: usize = 100_000;

/// Parse the full outline tree of `doc`.
pub fn read_outline(doc: &Document) -> Result<Vec<OutlineEntry>> {
    let catalog = doc
        .catalog()
        .with_context(|| "Failed to get document catalog")?;

    let Ok(Object::Reference(outlines_ref)) = catalog.get(b"Outlines") else {
        return Ok(Vec::new());
    };
    let Ok(outlines) = doc.get_dictionary(*outlines_ref) else {
        return Ok(Vec::new());
    };
    let Ok(Object::Reference(first)) = outlines.get(b"First") else {
        return Ok(Vec::new());
    };

    let pages: HashMap<ObjectId, u32> = doc
        .get_pages()
        .into_iter()
        .map(|(num, id)| (id, num))
        .collect();

    let mut budget = MAX_OUTLINE_ITEMS;
    Ok(read_siblings(doc, *first, &pages, 0, &mut budget))
}

/// Top-level bookmarks in outline order.
///
/// Children are not visited: a grouped entry contributes itself but none of its
/// nested items. Entries whose destination does not resolve to a page are dropped.
pub fn top_level_bookmarks(doc: &Document) -> Result<Vec<Bookmark>> {
    let bookmarks = read_outline(doc)?
        .into_iter()
        .filter_map(|entry| match entry.page {
            Some(page) => Some(Bookmark::new(entry.title, page)),
            None => {
                tracing::debug!(title = %entry.title, "bookmark has no resolvable page");
                None
            }
        })
        .collect();
    Ok(bookmarks)
}

fn read_siblings(
    doc: &Document,
    first: ObjectId,
    pages: &HashMap<ObjectId, u32>,
    level: u32,
    budget: &mut usize,
) -> Vec<OutlineEntry> {
    let mut entries = Vec::new();
    let mut next = Some(first);

    while let Some(id) = next {
        if *budget == 0 {
            tracing::warn!("outline walk stopped early, tree is too large or cyclic");
            break;
        }
        *budget -= 1;

        let Ok(item) = doc.get_dictionary(id) else {
            break;
        };

        let title = match item.get(b"Title") {
            Ok(Object::String(bytes, _)) => decode_pdf_string(bytes),
            _ => "Untitled".to_string(),
        };
        let page = item_page(doc, item, pages);
        let children = match item.get(b"First") {
            Ok(Object::Reference(child)) => read_siblings(doc, *child, pages, level + 1, budget),
            _ => Vec::new(),
        };

        entries.push(OutlineEntry {
            title,
            page,
            level,
            children,
        });

        next = match item.get(b"Next") {
            Ok(Object::Reference(r)) => Some(*r),
            _ => None,
        };
    }

    entries
}

/// Page targeted by an outline item, via `/Dest` or a `/GoTo` action.
fn item_page(doc: &Document, item: &Dictionary, pages: &HashMap<ObjectId, u32>) -> Option<u32> {
    if let Ok(dest) = item.get(b"Dest") {
        return resolve_destination(doc, dest, pages, 0);
    }

    let action = match item.get(b"A").ok()? {
        Object::Reference(r) => doc.get_dictionary(*r).ok()?,
        Object::Dictionary(d) => d,
        _ => return None,
    };
    match action.get(b"S") {
        Ok(Object::Name(kind)) if kind == b"GoTo" => {
            resolve_destination(doc, action.get(b"D").ok()?, pages, 0)
        }
        _ => None,
    }
}

fn resolve_destination(
    doc: &Document,
    dest: &Object,
    pages: &HashMap<ObjectId, u32>,
    depth: u32,
) -> Option<u32> {
    if depth > 16 {
        return None;
    }
    match dest {
        Object::String(name, _) | Object::Name(name) => {
            let target = named_destination(doc, name)?;
            resolve_destination(doc, target, pages, depth + 1)
        }
        // [page_ref /XYZ left top zoom] and friends
        Object::Array(arr) => match arr.first() {
            Some(Object::Reference(page_ref)) => pages.get(page_ref).copied(),
            _ => None,
        },
        // Named destinations may wrap the array in a dictionary under /D
        Object::Dictionary(dict) => resolve_destination(doc, dict.get(b"D").ok()?, pages, depth + 1),
        Object::Reference(r) => resolve_destination(doc, doc.get_object(*r).ok()?, pages, depth + 1),
        _ => None,
    }
}

/// Look a name up in the catalog's `/Names /Dests` tree, then the older `/Dests` dictionary.
fn named_destination<'a>(doc: &'a Document, name: &[u8]) -> Option<&'a Object> {
    let catalog = doc.catalog().ok()?;

    if let Ok(Object::Reference(names_ref)) = catalog.get(b"Names") {
        if let Ok(Object::Reference(dests_ref)) =
            doc.get_dictionary(*names_ref).and_then(|names| names.get(b"Dests"))
        {
            if let Some(found) = search_name_tree(doc, *dests_ref, name, 0) {
                return Some(found);
            }
        }
    }

    if let Ok(Object::Reference(dests_ref)) = catalog.get(b"Dests") {
        return doc.get_dictionary(*dests_ref).ok()?.get(name).ok();
    }

    None
}

fn search_name_tree<'a>(
    doc: &'a Document,
    node_id: ObjectId,
    name: &[u8],
    depth: u32,
) -> Option<&'a Object> {
    if depth > 32 {
        return None;
    }
    let node = doc.get_dictionary(node_id).ok()?;

    if let Ok(Object::Array(names)) = node.get(b"Names") {
        for pair in names.chunks_exact(2) {
            if let Object::String(key, _) = &pair[0] {
                if key == name {
                    return Some(&pair[1]);
                }
            }
        }
    }

    if let Ok(Object::Array(kids)) = node.get(b"Kids") {
        for kid in kids {
            if let Object::Reference(kid_ref) = kid {
                if let Some(found) = search_name_tree(doc, *kid_ref, name, depth + 1) {
                    return Some(found);
                }
            }
        }
    }

    None
}

/// Flatten outline entries depth-first, keeping each entry's level.
pub fn flatten_outline(entries: &[OutlineEntry]) -> Vec<FlatOutlineEntry> {
    let mut result = Vec::new();
    flatten_into(entries, &mut result);
    result
}

fn flatten_into(entries: &[OutlineEntry], result: &mut Vec<FlatOutlineEntry>) {
    for entry in entries {
        result.push(FlatOutlineEntry {
            title: entry.title.clone(),
            page: entry.page,
            level: entry.level,
        });
        flatten_into(&entry.children, result);
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FlatOutlineEntry {
    pub title: String,
    pub page: Option<u32>,
    pub level: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::document::test_support::{build_pdf, build_pdf_nested};

    #[test]
    fn test_no_outline() {
        let doc = build_pdf(3, &[]);
        assert!(read_outline(&doc).unwrap().is_empty());
        assert!(top_level_bookmarks(&doc).unwrap().is_empty());
    }

    #[test]
    fn test_flat_outline_pages() {
        let doc = build_pdf(30, &[("Intro", 1), ("Chapter 1", 10), ("Chapter 2", 20)]);
        let bookmarks = top_level_bookmarks(&doc).unwrap();
        assert_eq!(
            bookmarks,
            vec![
                Bookmark::new("Intro", 1),
                Bookmark::new("Chapter 1", 10),
                Bookmark::new("Chapter 2", 20),
            ]
        );
    }

    #[test]
    fn test_nested_entries_are_not_top_level() {
        let sections: &[(&str, u32)] = &[("Section A", 3), ("Section B", 6)];
        let none: &[(&str, u32)] = &[];
        let doc = build_pdf_nested(30, &[("Part I", 1, sections), ("Part II", 15, none)]);

        let bookmarks = top_level_bookmarks(&doc).unwrap();
        assert_eq!(
            bookmarks,
            vec![Bookmark::new("Part I", 1), Bookmark::new("Part II", 15)]
        );

        let flat = flatten_outline(&read_outline(&doc).unwrap());
        let titles: Vec<_> = flat.iter().map(|e| (e.title.as_str(), e.level)).collect();
        assert_eq!(
            titles,
            vec![("Part I", 0), ("Section A", 1), ("Section B", 1), ("Part II", 0)]
        );
    }
}
