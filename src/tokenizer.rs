use lazy_static::lazy_static;
use regex::{Matches, Regex};

lazy_static! {
    // numbers with separators, dotted abbreviations, words with inner joiners,
    // then any other single character
    static ref TOKEN: Regex = Regex::new(
        r"\d+(?:[.,]\d+)+|(?:\p{L}\.){2,}|[\p{L}\p{M}\p{N}_]+(?:['’.\-][\p{L}\p{M}\p{N}_]+)*|[^\s]"
    )
    .unwrap();
}

/// Split a sentence into word tokens.
///
/// Whitespace separates tokens and never ends up inside one. Punctuation becomes a token
/// of its own unless it joins two parts of a word (`o'clock`, `well-known`, `U.S.`)
/// or sits between digits (`1,000`).
pub fn tokenize(sentence: &str) -> Tokenizer<'_, '_> {
    Tokenizer {
        matches: TOKEN.find_iter(sentence),
    }
}

pub struct Tokenizer<'r, 't> {
    matches: Matches<'r, 't>,
}

impl<'r, 't> Iterator for Tokenizer<'r, 't> {
    type Item = &'t str;

    fn next(&mut self) -> Option<Self::Item> {
        self.matches.next().map(|mat| mat.as_str())
    }
}
