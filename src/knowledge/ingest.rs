//! PDF corpus ingestion: text extraction and overlapping chunking.

use std::path::Path;

use anyhow::{Context, Result};

/// Extracted text of one corpus document.
#[derive(Debug)]
pub struct Document {
    pub source: String,
    pub text: String,
}

/// Extract text from every `*.pdf` directly under `dir`. Unreadable files are
/// skipped with a warning; an absent directory or a corpus with no readable
/// text is an error (the caller downgrades it to "no knowledge").
pub fn load_corpus(dir: &Path) -> Result<Vec<Document>> {
    anyhow::ensure!(
        dir.is_dir(),
        "corpus directory {} does not exist",
        dir.display()
    );

    let mut documents = Vec::new();
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read corpus directory {}", dir.display()))?;

    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("pdf") {
            continue;
        }
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match pdf_extract::extract_text(&path) {
            Ok(text) if !text.trim().is_empty() => {
                tracing::debug!(source = %source, chars = text.len(), "extracted PDF text");
                documents.push(Document { source, text });
            }
            Ok(_) => tracing::warn!(source = %source, "PDF contained no extractable text, skipping"),
            Err(err) => {
                tracing::warn!(source = %source, error = %err, "failed to extract PDF, skipping")
            }
        }
    }

    anyhow::ensure!(
        !documents.is_empty(),
        "no readable PDF documents found in {}",
        dir.display()
    );
    Ok(documents)
}

/// Split text into fixed-size chunks with overlap, stepping only on char
/// boundaries. `overlap` must be smaller than `size`; the final chunk may be
/// shorter.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let step = size.saturating_sub(overlap).max(1);
    let chars: Vec<char> = text.chars().collect();

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + size).min(chars.len());
        let chunk: String = chars[start..end].iter().collect();
        if !chunk.trim().is_empty() {
            chunks.push(chunk);
        }
        if end == chars.len() {
            break;
        }
        start += step;
    }
    chunks
}
