//! Metadata text sanitization

/// Strip `<...>` markup from user-supplied metadata text.
///
/// Mirrors the form cleaning applied to title/abstract on metadata edits:
/// anything between an opening `<` and the matching `>` is dropped; an
/// unterminated `<` is kept as literal text.
pub fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        match rest[open..].find('>') {
            Some(close) => rest = &rest[open + close + 1..],
            None => {
                // No closing bracket: keep the tail verbatim
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
