use once_cell::sync::Lazy;
use regex::Regex;

static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([.!?]+\s+)").expect("valid sentence pattern"));

/// Split text into batches that respect sentence boundaries.
///
/// Each batch is at most `max_len` bytes. A run of text with no sentence
/// boundary that is itself too long is cut on character boundaries.
pub fn split_into_batches(text: &str, max_len: usize) -> Vec<String> {
    if text.len() <= max_len {
        return vec![text.to_string()];
    }

    let mut batches = Vec::new();
    let mut current_batch = String::new();
    let mut last_end = 0;

    for mat in SENTENCE_END.find_iter(text) {
        let sentence = &text[last_end..mat.end()];
        push_piece(&mut batches, &mut current_batch, sentence, max_len);
        last_end = mat.end();
    }

    if last_end < text.len() {
        push_piece(&mut batches, &mut current_batch, &text[last_end..], max_len);
    }

    flush(&mut batches, &mut current_batch);
    batches
}

fn push_piece(batches: &mut Vec<String>, current_batch: &mut String, piece: &str, max_len: usize) {
    if !current_batch.is_empty() && current_batch.len() + piece.len() > max_len {
        flush(batches, current_batch);
    }

    if piece.len() > max_len {
        flush(batches, current_batch);
        batches.extend(chunk_by_chars(piece, max_len));
    } else {
        current_batch.push_str(piece);
    }
}

fn flush(batches: &mut Vec<String>, current_batch: &mut String) {
    let trimmed = current_batch.trim();
    if !trimmed.is_empty() {
        batches.push(trimmed.to_string());
    }
    current_batch.clear();
}

fn chunk_by_chars(text: &str, max_len: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut chunk = String::new();
    for c in text.chars() {
        if chunk.len() + c.len_utf8() > max_len {
            chunks.push(std::mem::take(&mut chunk));
        }
        chunk.push(c);
    }
    if !chunk.trim().is_empty() {
        chunks.push(chunk);
    }
    chunks
}
