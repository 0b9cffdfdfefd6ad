use lopdf::{Dictionary, Document, Object};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Result;
use crate::shared::constants::TRUNCATION_MARKER;

/// Subset of the PDF document information dictionary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct DocumentInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
}

impl DocumentInfo {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.creator.is_none()
    }
}

/// What an upload learns about a PDF
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfSummary {
    pub page_count: u32,
    /// `None` when the document carries none of Title/Author/Creator
    pub info: Option<DocumentInfo>,
}

/// Text pulled out of a PDF, possibly cut short
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    pub truncated: bool,
}

/// Count pages and read document info
pub fn inspect(data: &[u8]) -> Result<PdfSummary> {
    let doc = Document::load_mem(data)?;
    let page_count = doc.get_pages().len() as u32;
    let info = read_document_info(&doc).filter(|info| !info.is_empty());

    Ok(PdfSummary { page_count, info })
}

/// Extract page text in page order, stopping once more than `max_chars`
/// characters have been collected.
pub fn extract_text(data: &[u8], max_chars: usize) -> Result<ExtractedText> {
    let doc = Document::load_mem(data)?;
    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();

    let pages = page_numbers
        .into_iter()
        .map(|page| doc.extract_text(&[page]).map_err(Into::into));

    concat_page_texts(pages, max_chars)
}

/// Concatenate page texts lazily; once the running length exceeds
/// `max_chars` the truncation marker is appended and remaining pages are
/// never pulled from the iterator.
pub fn concat_page_texts<I, E>(pages: I, max_chars: usize) -> std::result::Result<ExtractedText, E>
where
    I: IntoIterator<Item = std::result::Result<String, E>>,
{
    let mut text = String::new();
    let mut char_count = 0usize;

    for page in pages {
        let page = page?;
        char_count += page.chars().count();
        text.push_str(&page);

        if char_count > max_chars {
            text.push_str(TRUNCATION_MARKER);
            return Ok(ExtractedText {
                text,
                truncated: true,
            });
        }
    }

    Ok(ExtractedText {
        text,
        truncated: false,
    })
}

fn read_document_info(doc: &Document) -> Option<DocumentInfo> {
    let info = match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_dictionary(*id).ok()?,
        Object::Dictionary(dict) => dict,
        _ => return None,
    };

    Some(DocumentInfo {
        title: info_string(doc, info, b"Title"),
        author: info_string(doc, info, b"Author"),
        creator: info_string(doc, info, b"Creator"),
    })
}

fn info_string(doc: &Document, info: &Dictionary, key: &[u8]) -> Option<String> {
    let value = match info.get(key).ok()? {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        direct => direct,
    };

    match value {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

/// PDF text strings are either UTF-16BE with a BOM or PDFDocEncoding,
/// which matches Latin-1 for the printable range.
fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    bytes.iter().map(|&b| b as char).collect()
}
