//! Splits raw text around added (special) tokens before any other processing.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Special(&'a str),
}

/// Splits `text` at every literal occurrence of the added tokens.
///
/// `tokens` must be ordered longest first: each token is applied in turn to
/// the text segments left by the previous ones, so a shorter token that is a
/// substring of a longer one never pre-empts it. Special segments are never
/// rescanned and no empty text segment is produced around a match.
pub fn split<'a, S: AsRef<str>>(text: &'a str, tokens: &[S]) -> Vec<Segment<'a>> {
    let mut segments = vec![Segment::Text(text)];
    for token in tokens {
        let token = token.as_ref();
        if token.is_empty() {
            continue;
        }
        let mut next = Vec::with_capacity(segments.len());
        for segment in segments {
            match segment {
                Segment::Special(_) => next.push(segment),
                Segment::Text(part) => split_one(part, token, &mut next),
            }
        }
        segments = next;
    }
    segments
}

fn split_one<'a>(part: &'a str, token: &str, out: &mut Vec<Segment<'a>>) {
    let mut last_end = 0;
    let mut found = false;
    for (start, matched) in part.match_indices(token) {
        found = true;
        if start > last_end {
            out.push(Segment::Text(&part[last_end..start]));
        }
        out.push(Segment::Special(matched));
        last_end = start + matched.len();
    }
    if !found {
        out.push(Segment::Text(part));
    } else if last_end < part.len() {
        out.push(Segment::Text(&part[last_end..]));
    }
}
