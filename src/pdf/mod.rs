pub mod document;
pub mod toc;

pub use document::{compress_page_streams, PdfDocument};

/// Decode a PDF text string: UTF-16BE when it carries a BOM, PDFDocEncoding otherwise.
pub(crate) fn decode_pdf_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        // Latin-1 is close enough for outline titles.
        _ => bytes.iter().map(|&b| b as char).collect(),
    }
}
