//! Text Chunking
//!
//! Splits arbitrary-length text into sentence units and greedily packs
//! them into bounded chunks for the speech-synthesis capability, which
//! has an undocumented input-size ceiling. Order is always preserved.

/// Maximum characters per chunk submitted to speech synthesis
pub const MAX_CHUNK_CHARS: usize = 300;

/// Splits `text` into sentences on terminal punctuation (`.`, `!`, `?`).
///
/// Terminal punctuation stays attached to its sentence; runs of terminals
/// ("?!", "...") stay together. Trailing text without a terminal becomes
/// the final sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut in_terminal_run = false;

    for ch in text.chars() {
        let is_terminal = matches!(ch, '.' | '!' | '?');

        if in_terminal_run && !is_terminal {
            let sentence = current.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();
            in_terminal_run = false;
        }

        current.push(ch);
        if is_terminal {
            in_terminal_run = true;
        }
    }

    let sentence = current.trim();
    if !sentence.is_empty() {
        sentences.push(sentence.to_string());
    }

    sentences
}

/// Packs sentences into chunks of at most `max_chars` characters.
///
/// A single sentence longer than `max_chars` becomes its own oversized
/// chunk - it is never truncated.
pub fn pack_chunks(sentences: &[String], max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in sentences {
        let sentence_len = sentence.chars().count();

        if current.is_empty() {
            current = sentence.clone();
            continue;
        }

        // +1 for the joining space
        if current.chars().count() + 1 + sentence_len <= max_chars {
            current.push(' ');
            current.push_str(sentence);
        } else {
            chunks.push(std::mem::take(&mut current));
            current = sentence.clone();
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Sentence-splits and packs in one step with the default chunk size
pub fn chunk_text(text: &str) -> Vec<String> {
    pack_chunks(&split_sentences(text), MAX_CHUNK_CHARS)
}

// =============================================================================
// Tests
// =============================================================================
