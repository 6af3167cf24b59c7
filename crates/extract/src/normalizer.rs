use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize a surface form for matching: lowercase, trimmed, single-spaced.
pub fn normalize_surface(text: &str) -> String {
    let lowered = text.to_lowercase();
    WHITESPACE.replace_all(lowered.trim(), " ").to_string()
}

/// Default display form for a gazetteer entry.
///
/// Hyphens become spaces and each word gets an upper-case first letter with
/// the rest lower-cased, so "mercedes-benz" reads "Mercedes Benz" and
/// "land cruiser" reads "Land Cruiser".
pub fn display_name(surface: &str) -> String {
    normalize_surface(surface)
        .split(|c: char| c == ' ' || c == '-')
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
