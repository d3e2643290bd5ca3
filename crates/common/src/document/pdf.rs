//! PDF text extraction module
//!
//! Extracts text content from PDF files using lopdf.

use crate::errors::ResolveError;
use std::path::Path;
use tracing::{debug, warn};

/// Extract the text of every page, in page order, joined with single spaces
pub fn extract_text_from_pdf(path: &Path) -> Result<String, ResolveError> {
    let doc = lopdf::Document::load(path).map_err(|e| ResolveError::Extraction {
        path: path.display().to_string(),
        message: format!("Failed to load PDF: {}", e),
    })?;

    let pages = doc.get_pages();
    let mut page_texts = Vec::with_capacity(pages.len());

    debug!(page_count = pages.len(), "Extracting text from PDF");

    for (page_num, page_id) in pages.iter() {
        match extract_page_text(&doc, *page_num, *page_id) {
            Ok(page_text) => page_texts.push(page_text),
            Err(e) => {
                warn!(page = page_num, error = %e, "Failed to extract text from page, skipping");
            }
        }
    }

    let text = page_texts.join(" ");

    if text.trim().is_empty() {
        return Err(ResolveError::Extraction {
            path: path.display().to_string(),
            message: "No text content extracted from PDF".to_string(),
        });
    }

    let cleaned = clean_text(&text);

    debug!(
        original_len = text.len(),
        cleaned_len = cleaned.len(),
        "Text extraction complete"
    );

    Ok(cleaned)
}

/// Extract text from a single page, falling back to a raw content-stream scan
fn extract_page_text(
    doc: &lopdf::Document,
    page_num: u32,
    page_id: lopdf::ObjectId,
) -> Result<String, String> {
    match doc.extract_text(&[page_num]) {
        Ok(text) => Ok(text),
        Err(e) => {
            debug!(page = page_num, error = %e, "Font-aware extraction failed, scanning content stream");
            let content = doc.get_page_content(page_id).map_err(|e| e.to_string())?;
            Ok(extract_text_from_content(&content))
        }
    }
}

/// Extract text from PDF content stream
fn extract_text_from_content(content: &[u8]) -> String {
    // Text lives between BT and ET operators
    let content_str = String::from_utf8_lossy(content);
    let mut text = String::new();
    let mut in_text_block = false;
    let mut current_text = String::new();

    for line in content_str.lines() {
        let trimmed = line.trim();

        if trimmed == "BT" {
            in_text_block = true;
            continue;
        }

        if trimmed == "ET" {
            in_text_block = false;
            if !current_text.is_empty() {
                text.push_str(&current_text);
                text.push(' ');
                current_text.clear();
            }
            continue;
        }

        if in_text_block {
            if let Some(text_content) = extract_text_from_operator(trimmed) {
                current_text.push_str(&text_content);
            }
        }
    }

    text
}

/// Extract text from a PDF text-showing operator: Tj, TJ, ' or "
fn extract_text_from_operator(line: &str) -> Option<String> {
    if line.ends_with("Tj") || line.ends_with('\'') || line.ends_with('"') {
        if let (Some(start), Some(end)) = (line.find('('), line.rfind(')')) {
            if end > start {
                return Some(decode_pdf_string(&line[start + 1..end]));
            }
        }
    }

    // [(text) num (text) num] TJ
    if line.ends_with("TJ") {
        let mut result = String::new();
        let mut in_paren = false;
        let mut current = String::new();

        for ch in line.chars() {
            match ch {
                '(' => in_paren = true,
                ')' => {
                    in_paren = false;
                    result.push_str(&decode_pdf_string(&current));
                    current.clear();
                }
                _ if in_paren => current.push(ch),
                _ => {}
            }
        }

        if !result.is_empty() {
            return Some(result);
        }
    }

    None
}

/// Decode PDF string escapes, including `\ddd` octal codes (read as Latin-1)
fn decode_pdf_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }

        match chars.next() {
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some('b') => result.push('\u{8}'),
            Some('f') => result.push('\u{c}'),
            Some(first @ '0'..='7') => {
                let mut code = first.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            code = code * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                // High-order overflow is ignored
                result.push(char::from((code & 0xFF) as u8));
            }
            // Line continuation
            Some('\n') => {}
            Some(c) => result.push(c),
            None => {}
        }
    }

    result
}

/// Collapse whitespace runs, drop byte-order marks and straighten quotes
pub(crate) fn clean_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('\u{FEFF}', "")
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    fn write_sample_pdf(path: &Path, pages: &[&str]) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for page_text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*page_text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages.len() as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn test_clean_text() {
        let input = "Hello   World\n\nTest \u{201C}quoted\u{201D}";
        assert_eq!(clean_text(input), "Hello World Test \"quoted\"");
    }

    #[test]
    fn test_decode_pdf_string() {
        assert_eq!(decode_pdf_string("Hello\\nWorld"), "Hello\nWorld");
        assert_eq!(decode_pdf_string("Test\\(paren\\)"), "Test(paren)");
    }

    #[test]
    fn test_decode_octal_escapes() {
        assert_eq!(decode_pdf_string("caf\\351"), "café");
        assert_eq!(decode_pdf_string("\\101\\102C"), "ABC");
        // Fewer than three digits ends at the first non-octal character
        assert_eq!(decode_pdf_string("\\53x"), "+x");
        assert_eq!(decode_pdf_string("\\0509"), "(9");
        assert_eq!(decode_pdf_string("split\\\nline"), "splitline");
    }

    #[test]
    fn test_content_stream_scan() {
        let content = b"BT\n/F1 12 Tf\n(Java was) Tj\n[(created) -250 (in 1995)] TJ\nET\n";
        let text = extract_text_from_content(content);
        assert_eq!(text.trim(), "Java wascreatedin 1995");
    }

    #[test]
    fn test_missing_file_is_extraction_error() {
        let err = extract_text_from_pdf(Path::new("/nonexistent/java.pdf")).unwrap_err();
        assert!(matches!(err, ResolveError::Extraction { .. }));
    }

    #[test]
    fn test_garbage_file_is_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"definitely not a pdf").unwrap();

        let err = extract_text_from_pdf(&path).unwrap_err();
        assert!(matches!(err, ResolveError::Extraction { .. }));
    }

    #[test]
    fn test_extracts_pages_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("java.pdf");
        write_sample_pdf(&path, &["Java was created in 1995", "Threads share memory"]);

        let text = extract_text_from_pdf(&path).unwrap();
        let first = text.find("Java was created").expect("first page text");
        let second = text.find("Threads share memory").expect("second page text");
        assert!(first < second);
    }
}
