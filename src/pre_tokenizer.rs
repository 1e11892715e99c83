//! GPT-2 pre-tokenization.
//!
//! The classic pattern
//! `'s|'t|'re|'ve|'m|'ll|'d| ?\p{L}+| ?\p{N}+| ?[^\s\p{L}\p{N}]+|\s+(?!\S)|\s+`
//! is expressed as six ordered segment classes. At each position the first
//! class that matches wins and takes its longest run; the segments cover the
//! input exactly.

use fancy_regex::Regex;

const CONTRACTION_PAT: &str = r"^(?:'s|'t|'re|'ve|'m|'ll|'d)";
const LETTERS_PAT: &str = r"^ ?\p{L}+";
const DIGITS_PAT: &str = r"^ ?\p{N}+";
const SYMBOLS_PAT: &str = r"^ ?[^\s\p{L}\p{N}]+";

#[derive(Debug, Clone)]
enum Matcher {
    Pattern(Regex),
    /// `\s+(?!\S)`: a whitespace run that is not directly followed by a
    /// non-space character, i.e. the run minus its last char unless it ends
    /// the text.
    TrailingWhitespace,
    /// `\s+`
    Whitespace,
}

impl Matcher {
    /// Length in bytes of the match anchored at the start of `rest`.
    fn match_len(&self, rest: &str) -> Option<usize> {
        match self {
            Matcher::Pattern(regex) => match regex.find(rest) {
                Ok(Some(m)) if m.start() == 0 && m.end() > 0 => Some(m.end()),
                _ => None,
            },
            Matcher::TrailingWhitespace => {
                let run = whitespace_run(rest);
                if run == 0 {
                    return None;
                }
                if run == rest.len() {
                    return Some(run);
                }
                // Back off one char so the next segment can take it as its
                // leading space.
                let last = rest[..run].chars().next_back()?.len_utf8();
                (run > last).then_some(run - last)
            }
            Matcher::Whitespace => Some(whitespace_run(rest)).filter(|&n| n > 0),
        }
    }
}

fn whitespace_run(s: &str) -> usize {
    s.char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map_or(s.len(), |(i, _)| i)
}

#[derive(Debug, Clone)]
pub struct PreTokenizer {
    classes: Vec<Matcher>,
}

impl Default for PreTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl PreTokenizer {
    pub fn new() -> Self {
        let pattern = |pat: &str| {
            Matcher::Pattern(Regex::new(pat).expect("invalid GPT-2 pre-tokenizer regex"))
        };
        PreTokenizer {
            classes: vec![
                pattern(CONTRACTION_PAT),
                pattern(LETTERS_PAT),
                pattern(DIGITS_PAT),
                pattern(SYMBOLS_PAT),
                Matcher::TrailingWhitespace,
                Matcher::Whitespace,
            ],
        }
    }

    /// Splits `text` into segments that cover it exactly.
    pub fn segment<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut segments = Vec::new();
        let mut pos = 0;
        while pos < text.len() {
            let rest = &text[pos..];
            let len = self
                .classes
                .iter()
                .find_map(|class| class.match_len(rest))
                .unwrap_or_else(|| rest.chars().next().map_or(rest.len(), char::len_utf8));
            segments.push(&rest[..len]);
            pos += len;
        }
        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(text: &str) -> Vec<&str> {
        PreTokenizer::new().segment(text)
    }

    #[test]
    fn splits_words_and_punctuation() {
        assert_eq!(seg("Hello, world!"), ["Hello", ",", " world", "!"]);
    }

    #[test]
    fn contractions_are_their_own_segment() {
        assert_eq!(seg("I'm can't we'll"), ["I", "'m", " can", "'t", " we", "'ll"]);
    }

    #[test]
    fn contraction_class_wins_before_letters() {
        assert_eq!(seg("'sup"), ["'s", "up"]);
    }

    #[test]
    fn digits_separate_from_letters() {
        assert_eq!(seg("abc123 456"), ["abc", "123", " 456"]);
    }

    #[test]
    fn symbols_take_an_optional_leading_space() {
        assert_eq!(seg("a ...b"), ["a", " ...", "b"]);
    }

    #[test]
    fn whitespace_before_word_leaves_one_space_for_it() {
        assert_eq!(seg("a   b"), ["a", "  ", " b"]);
    }

    #[test]
    fn trailing_whitespace_is_one_segment() {
        assert_eq!(seg("a  \n"), ["a", "  \n"]);
    }

    #[test]
    fn single_newline_before_word() {
        assert_eq!(seg("a\nb"), ["a", "\n", "b"]);
    }

    #[test]
    fn unicode_letters_are_letters() {
        assert_eq!(seg("naïve"), ["naïve"]);
        assert_eq!(seg("héllo wörld"), ["héllo", " wörld"]);
        assert_eq!(seg("你好 世界"), ["你好", " 世界"]);
    }

    #[test]
    fn emoji_is_a_symbol() {
        assert_eq!(seg("hi 🦀!"), ["hi", " 🦀!"]);
    }

    #[test]
    fn empty_text_has_no_segments() {
        assert!(seg("").is_empty());
    }

    #[test]
    fn segments_cover_the_input() {
        let text = "  It's 2024...\n\n  Ünïcödé\t— done  ";
        assert_eq!(seg(text).concat(), text);
    }
}
