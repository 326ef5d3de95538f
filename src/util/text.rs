/// Normalises feed-supplied text for output.
///
/// Control characters are dropped (tabs and line breaks become spaces), runs of
/// whitespace collapse to a single space, and the result is trimmed. Returns
/// `None` when nothing printable is left, so blank `<title/>` elements surface
/// as absent rather than as empty strings.
pub fn clean_text(s: &str) -> Option<String> {
    let mut out = String::with_capacity(s.len());
    let mut pending_space = false;

    for c in s.chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if c.is_control() {
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }

    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}
