//! Read-only display derivations shared by the public pages and the admin console.

/// `MM:SS`, or `HH:MM:SS` once the value reaches an hour.
pub fn clock(total_seconds: u32) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// Coarse `Xh Ym` / `Ym` rendering used for quiz estimates. `None` for zero.
pub fn estimated_duration(total_seconds: u64) -> Option<String> {
    if total_seconds == 0 {
        return None;
    }

    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    if hours > 0 {
        Some(format!("{hours}h {minutes}m"))
    } else {
        Some(format!("{minutes}m"))
    }
}

/// Cuts `text` to `max_chars` characters, marking the cut with `...`.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

/// Joins the first `shown` items and appends `... (+n)` for the rest.
///
/// `total` is the full collection size, which may exceed `items.len()`
/// when the caller only fetched a prefix.
pub fn preview_list<S: AsRef<str>>(items: &[S], shown: usize, total: usize) -> String {
    let mut preview = items
        .iter()
        .take(shown)
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(", ");

    if total > shown {
        preview.push_str(&format!("... (+{})", total - shown));
    }
    preview
}

/// URL-safe slug: ASCII-folded, lowercase, words joined by `-`.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;

    for ch in value.chars().flat_map(fold_ascii) {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else if ch.is_whitespace() || ch == '-' {
            pending_dash = true;
        }
    }
    slug
}

fn fold_ascii(ch: char) -> Option<char> {
    let folded = match ch {
        'á' | 'à' | 'ä' | 'â' | 'ã' | 'å' => 'a',
        'Á' | 'À' | 'Ä' | 'Â' | 'Ã' | 'Å' => 'A',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'É' | 'È' | 'Ë' | 'Ê' => 'E',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'Ó' | 'Ò' | 'Ö' | 'Ô' | 'Õ' => 'O',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ç' => 'c',
        'Ç' => 'C',
        c if c.is_ascii() => c,
        c if c.is_whitespace() => ' ',
        _ => return None,
    };
    Some(folded)
}
