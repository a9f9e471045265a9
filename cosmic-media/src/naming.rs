//! Upload filename handling

use chrono::Utc;
use rand::Rng;

/// Reduce a client-supplied name to its final path component
pub fn sanitize_original_name(name: &str) -> String {
    let last = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    match last {
        "" | "." | ".." => "upload".to_string(),
        other => other.to_string(),
    }
}

/// Split `name` into stem and extension (extension keeps its leading dot)
pub fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

/// Lowercased extension without the dot
pub fn extension(name: &str) -> Option<String> {
    let (_, ext) = split_name(name);
    ext.strip_prefix('.')
        .filter(|e| !e.is_empty())
        .map(|e| e.to_ascii_lowercase())
}

/// `<stem>_transparent.png`
pub fn transparent_name(name: &str) -> String {
    let (stem, _) = split_name(name);
    format!("{}_transparent.png", stem)
}

/// `<stem>-<millis>-<random><ext>`
pub fn unique_filename_with(name: &str, millis: i64, random: u32) -> String {
    let (stem, ext) = split_name(name);
    format!("{}-{}-{}{}", stem, millis, random, ext)
}

pub fn unique_filename(name: &str) -> String {
    let random = rand::thread_rng().gen_range(0..1_000_000_000);
    unique_filename_with(name, Utc::now().timestamp_millis(), random)
}

/// A bare filename safe to join onto a directory or folder path
pub fn is_safe_filename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// Content type used when serving a stored file
pub fn content_type_for(filename: &str) -> &'static str {
    match extension(filename).as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("svg") => "image/svg+xml",
        // jpg, jpeg and anything unknown
        _ => "image/jpeg",
    }
}
