use anyhow::Result;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router,
};
use serde::{Deserialize, Serialize};

use crate::chapter::{CandidateTable, ChapterRegistry};
use crate::chapterizer::{derive_candidates, output_file_name};
use crate::commands::split::{chapterfy, SplitOptions};
use crate::pdf::toc::{flatten_outline, read_outline};
use crate::pdf::PdfDocument;
use crate::runner::load_bookmarks;

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CandidatesRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Only keep chapters whose title contains this, case-insensitive (default: all)")]
    #[serde(default)]
    pub keyword: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ChapterfyRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Existing directory to write chapter files into")]
    pub output_folder: String,
    #[schemars(description = "Bookmark chapter title filter, case-insensitive (default: all)")]
    #[serde(default)]
    pub keyword: String,
    #[schemars(description = "1-based chapter rows to export, as numbered by pdf_chapter_candidates")]
    #[serde(default)]
    pub select: Vec<usize>,
    #[schemars(description = "Export every bookmark chapter (default: false)")]
    #[serde(default)]
    pub all: bool,
    #[schemars(description = "Extra page ranges to export as chapters (e.g., '1-5, 7-9')")]
    #[serde(default)]
    pub ranges: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChapterServer {
    tool_router: ToolRouter<Self>,
}

impl ChapterServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }
}

impl Default for ChapterServer {
    fn default() -> Self {
        Self::new()
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("Error: {}", e))
}

#[tool_router]
impl ChapterServer {
    #[tool(description = "List a PDF's bookmark tree with target pages and nesting levels, plus its page count")]
    fn pdf_bookmarks(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        let doc = match PdfDocument::open(&path) {
            Ok(d) => d,
            Err(e) => return format!("Error: {:#}", e),
        };
        match read_outline(&doc.doc) {
            Ok(entries) => to_json(&BookmarksResult {
                page_count: doc.page_count(),
                bookmarks: flatten_outline(&entries)
                    .into_iter()
                    .map(|e| BookmarkResult {
                        title: e.title,
                        page: e.page,
                        level: e.level,
                    })
                    .collect(),
            }),
            Err(e) => format!("Error: {:#}", e),
        }
    }

    #[tool(description = "Derive chapters from a PDF's top-level bookmarks: each runs from its bookmark's page to the page before the next one")]
    fn pdf_chapter_candidates(&self, Parameters(req): Parameters<CandidatesRequest>) -> String {
        let bookmarks = match load_bookmarks(&req.path) {
            Ok(b) => b,
            Err(e) => return format!("Error: {:#}", e),
        };
        let table = CandidateTable::from_chapters(
            derive_candidates(&bookmarks, &req.keyword),
            &ChapterRegistry::new(),
        );
        let result: Vec<CandidateResult> = table
            .rows()
            .iter()
            .enumerate()
            .map(|(index, row)| CandidateResult {
                row: index + 1,
                name: row.name.clone(),
                start_page: row.start_page,
                end_page: row.end_page,
                file_name: output_file_name(&row.chapter()),
            })
            .collect();
        to_json(&result)
    }

    #[tool(description = "Write selected bookmark chapters and/or page ranges of a PDF to separate compressed PDF files")]
    fn pdf_chapterfy(&self, Parameters(req): Parameters<ChapterfyRequest>) -> String {
        let options = SplitOptions {
            keyword: req.keyword,
            select: req.select,
            all: req.all,
            ranges: req.ranges,
        };
        match chapterfy(&req.path, &req.output_folder, &options, Vec::new()) {
            Ok((messages, reports)) => to_json(&ChapterfyResult {
                written: reports
                    .iter()
                    .flat_map(|r| &r.written)
                    .map(|p| p.display().to_string())
                    .collect(),
                messages: String::from_utf8_lossy(&messages)
                    .lines()
                    .map(str::to_string)
                    .collect(),
            }),
            Err(e) => format!("Error: {:#}", e),
        }
    }
}

// Result types for MCP tools

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct BookmarkResult {
    pub title: String,
    pub page: Option<u32>,
    pub level: u32,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct BookmarksResult {
    pub page_count: u32,
    pub bookmarks: Vec<BookmarkResult>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CandidateResult {
    pub row: usize,
    pub name: String,
    pub start_page: u32,
    pub end_page: u32,
    pub file_name: String,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ChapterfyResult {
    pub written: Vec<String>,
    /// Everything a user would have been told: rejected ranges, skipped chapters, totals.
    pub messages: Vec<String>,
}

#[tool_handler]
impl ServerHandler for ChapterServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "PDF chapter splitting tools. Use pdf_bookmarks to inspect the outline, \
                 pdf_chapter_candidates to see the chapters derived from top-level bookmarks, \
                 and pdf_chapterfy to write chosen chapters or page ranges to separate files."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server() -> Result<()> {
    tracing::info!("starting MCP server on stdio");
    let server = ChapterServer::new();

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::document::test_support::build_pdf;

    #[test]
    fn test_candidates_tool() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.pdf");
        build_pdf(20, &[("Chapter 1", 1), ("Chapter 2", 8), ("Index", 19)])
            .save(&path)
            .unwrap();

        let server = ChapterServer::new();
        let json = server.pdf_chapter_candidates(Parameters(CandidatesRequest {
            path: path.display().to_string(),
            keyword: String::new(),
        }));
        let rows: Vec<CandidateResult> = serde_json::from_str(&json).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].row, 2);
        assert_eq!((rows[1].start_page, rows[1].end_page), (8, 18));
        assert_eq!(rows[1].file_name, "Chapter 2.pdf");
    }

    #[test]
    fn test_chapterfy_tool_reports_messages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.pdf");
        build_pdf(10, &[]).save(&path).unwrap();
        let out = tempfile::tempdir().unwrap();

        let server = ChapterServer::new();
        let json = server.pdf_chapterfy(Parameters(ChapterfyRequest {
            path: path.display().to_string(),
            output_folder: out.path().display().to_string(),
            keyword: String::new(),
            select: Vec::new(),
            all: false,
            ranges: Some("1-3, oops".to_string()),
        }));
        let result: ChapterfyResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result.written.len(), 1);
        assert!(result.written[0].ends_with("1_3.pdf"));
        assert_eq!(result.messages[0], "Invalid chapter syntax: oops");
    }

    #[test]
    fn test_missing_file_is_error_text() {
        let server = ChapterServer::new();
        let text = server.pdf_bookmarks(Parameters(PathRequest {
            path: "/no/such/file.pdf".to_string(),
        }));
        assert!(text.starts_with("Error: Failed to open PDF"));
    }
}
