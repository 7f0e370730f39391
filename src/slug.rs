use deunicode::deunicode;

/// Derive a URL slug from a title. The title is transliterated to ASCII
/// first, then letters and digits are lowercased, every other run of
/// characters becomes a single `-`, and separators are trimmed from both
/// ends. Returns an empty string when nothing alphanumeric survives.
pub fn slugify(title: &str) -> String {
    let ascii = deunicode(title);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_separator = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    slug
}
