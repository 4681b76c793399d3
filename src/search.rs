//! Substring matching with character offsets.

/// Find non-overlapping occurrences of `needle` in `haystack`.
///
/// Returns `(start, end)` pairs as character offsets into `haystack`, end
/// exclusive. After a match the scan resumes at its end, so `"aa"` occurs
/// twice in `"aaaa"`, not three times. Case-insensitive matching folds each
/// character to lowercase before comparing; offsets still refer to the
/// original, unfolded text.
pub fn find_matches(haystack: &str, needle: &str, case_sensitive: bool) -> Vec<(usize, usize)> {
    let needle = fold(needle, case_sensitive);
    if needle.is_empty() {
        return Vec::new();
    }

    let hay = fold(haystack, case_sensitive);
    let n = needle.len();
    let mut matches = Vec::new();
    let mut pos = 0;

    while pos + n <= hay.len() {
        let window = &hay[pos..pos + n];
        let aligned = hay[pos].first && hay.get(pos + n).map_or(true, |c| c.first);
        if aligned && window.iter().zip(&needle).all(|(h, c)| h.ch == c.ch) {
            let start = hay[pos].source;
            let end = hay[pos + n - 1].source + 1;
            matches.push((start, end));
            pos += n;
        } else {
            pos += 1;
        }
    }

    matches
}

/// A folded character and the index of the original character it came from.
struct Folded {
    ch: char,
    source: usize,
    /// First folded char produced by its source char
    first: bool,
}

fn fold(s: &str, case_sensitive: bool) -> Vec<Folded> {
    let mut out = Vec::with_capacity(s.len());
    for (source, c) in s.chars().enumerate() {
        if case_sensitive {
            out.push(Folded { ch: c, source, first: true });
        } else {
            for (i, lc) in c.to_lowercase().enumerate() {
                out.push(Folded { ch: fold_sigma(lc), source, first: i == 0 });
            }
        }
    }
    out
}

/// Final sigma only differs from `σ` by position in a word, so caseless
/// comparison treats them as one letter.
fn fold_sigma(c: char) -> char {
    if c == 'ς' {
        'σ'
    } else {
        c
    }
}
