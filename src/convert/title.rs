//! Display titles derived from file names.

use std::path::Path;

/// Marks a generic explanatory clip in a file name
pub const PLACEHOLDER_TOKEN: &str = "dummy";

/// Title for a video extracted from `filename`
///
/// `context_title` names the unit the clip explains and is only used for
/// placeholder clips. Names like `intro-video-es.mp4` lose their trailing
/// language segment; the first character is upper-cased and nothing else.
pub fn normalize_title(filename: &str, context_title: &str) -> String {
    if filename.contains(PLACEHOLDER_TOKEN) {
        return format!("Vídeo explicativo de la {}", context_title);
    }

    let stem = file_stem(filename);
    let segments: Vec<&str> = stem.split('-').collect();

    let title = if segments.len() > 2 {
        segments[..segments.len() - 1].join(" ")
    } else {
        stem.to_string()
    };

    capitalize_first(&title)
}

/// File name without its last extension
pub fn file_stem(filename: &str) -> &str {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename)
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
