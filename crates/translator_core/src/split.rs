use crate::ConfigError;

/// Split `text` into batches of at most `max_size` characters, breaking only after a `\n`.
///
/// Lines keep their line break, so concatenating the batches reproduces `text`.
/// A single line longer than `max_size` becomes a batch of its own.
pub fn split_batches(text: &str, max_size: usize) -> Result<Vec<String>, ConfigError> {
    if max_size == 0 {
        return Err(ConfigError::ZeroBatchSize);
    }

    let mut batches = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;
    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();
        if current_len + line_len > max_size && !current.is_empty() {
            batches.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.push_str(line);
        current_len += line_len;
    }
    if !current.is_empty() {
        batches.push(current);
    }
    Ok(batches)
}

/// Cut `text` down to its first `max_chars` characters.
/// Returns the kept text and whether anything was dropped.
pub fn truncate_content(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (text[..byte_idx].to_string(), true),
        None => (text.to_string(), false),
    }
}
