//! Sequence features for the case tagger.
//!
//! Each token of a sentence gets one [`FeatureVector`]: the lowercase token itself, its
//! neighbours (or a boundary flag at either end of the sentence) and up to three suffixes.
//! Training additionally gets one [`CaseCategory`] label per token.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;

use crate::case::{classify, CaseCategory};
use crate::errors::UnknownFeature;

/// Longest suffix feature extracted.
pub const MAX_SUFFIX_LEN: usize = 3;

/// Name of a feature.
///
/// The derived ordering is the order features are written in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureKey {
    /// `t[0]`, the current token
    Token,
    /// `t[-1]`, the previous token
    PrevToken,
    /// `BOS`, set when there is no previous token
    Bos,
    /// `t[+1]`, the next token
    NextToken,
    /// `EOS`, set when there is no next token
    Eos,
    /// `sufN`, the last `N` characters of the current token
    Suffix(u8),
}

impl FeatureKey {
    /// Whether the feature carries a flag rather than text.
    pub fn is_flag(self) -> bool {
        matches!(self, FeatureKey::Bos | FeatureKey::Eos)
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FeatureKey::Token => f.write_str("t[0]"),
            FeatureKey::PrevToken => f.write_str("t[-1]"),
            FeatureKey::Bos => f.write_str("BOS"),
            FeatureKey::NextToken => f.write_str("t[+1]"),
            FeatureKey::Eos => f.write_str("EOS"),
            FeatureKey::Suffix(n) => write!(f, "suf{}", n),
        }
    }
}

impl FromStr for FeatureKey {
    type Err = UnknownFeature;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s {
            "t[0]" => FeatureKey::Token,
            "t[-1]" => FeatureKey::PrevToken,
            "BOS" => FeatureKey::Bos,
            "t[+1]" => FeatureKey::NextToken,
            "EOS" => FeatureKey::Eos,
            _ => match s.strip_prefix("suf").and_then(|n| n.parse::<u8>().ok()) {
                Some(n) if n >= 1 && n as usize <= MAX_SUFFIX_LEN => FeatureKey::Suffix(n),
                _ => return Err(UnknownFeature(s.to_owned())),
            },
        };

        Ok(key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeatureValue {
    Text(String),
    Flag(bool),
}

impl FeatureValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FeatureValue::Text(text) => Some(text),
            FeatureValue::Flag(_) => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FeatureValue::Text(_) => None,
            FeatureValue::Flag(flag) => Some(*flag),
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FeatureValue::Text(text) => f.write_str(text),
            FeatureValue::Flag(true) => f.write_str("True"),
            FeatureValue::Flag(false) => f.write_str("False"),
        }
    }
}

/// Features of one token position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureVector {
    features: BTreeMap<FeatureKey, FeatureValue>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: FeatureKey, value: FeatureValue) -> Option<FeatureValue> {
        self.features.insert(key, value)
    }

    pub fn get(&self, key: FeatureKey) -> Option<&FeatureValue> {
        self.features.get(&key)
    }

    pub fn text(&self, key: FeatureKey) -> Option<&str> {
        self.get(key).and_then(FeatureValue::as_text)
    }

    /// Whether a flag is present and set.
    pub fn flag(&self, key: FeatureKey) -> bool {
        self.get(key).and_then(FeatureValue::as_flag).unwrap_or(false)
    }

    pub fn contains(&self, key: FeatureKey) -> bool {
        self.features.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Features in key order.
    pub fn iter(&self) -> impl Iterator<Item = (FeatureKey, &FeatureValue)> {
        self.features.iter().map(|(key, value)| (*key, value))
    }
}

/// Extract features and case labels from a tokenized sentence.
///
/// Both returned vectors have one entry per token. An empty sentence yields two empty vectors.
pub fn extract<S: AsRef<str>>(tokens: &[S]) -> (Vec<FeatureVector>, Vec<CaseCategory>) {
    let labels = tokens
        .iter()
        .map(|token| classify(token.as_ref()).0)
        .collect();

    (extract_features(tokens), labels)
}

/// Extract features only, for tagging text whose casing is unknown.
pub fn extract_features<S: AsRef<str>>(tokens: &[S]) -> Vec<FeatureVector> {
    let normalized: Vec<String> = tokens
        .iter()
        .map(|token| normalize(token.as_ref()))
        .collect();

    normalized
        .iter()
        .enumerate()
        .map(|(index, token)| {
            let mut vector = FeatureVector::new();
            vector.insert(FeatureKey::Token, FeatureValue::Text(token.clone()));

            match index.checked_sub(1).map(|prev| &normalized[prev]) {
                Some(prev) => vector.insert(FeatureKey::PrevToken, FeatureValue::Text(prev.clone())),
                None => vector.insert(FeatureKey::Bos, FeatureValue::Flag(true)),
            };

            match normalized.get(index + 1) {
                Some(next) => vector.insert(FeatureKey::NextToken, FeatureValue::Text(next.clone())),
                None => vector.insert(FeatureKey::Eos, FeatureValue::Flag(true)),
            };

            for (length, suffix) in suffixes(token) {
                vector.insert(
                    FeatureKey::Suffix(length as u8),
                    FeatureValue::Text(suffix.to_owned()),
                );
            }

            vector
        })
        .collect()
}

/// Run [`extract`] over many sentences on the rayon pool, keeping sentence order.
pub fn extract_batch<S>(sentences: &[Vec<S>]) -> Vec<(Vec<FeatureVector>, Vec<CaseCategory>)>
where
    S: AsRef<str> + Sync,
{
    sentences
        .par_iter()
        .map(|sentence| extract(sentence))
        .collect()
}

// colons are weight delimiters in the tagger's feature files
fn normalize(token: &str) -> String {
    token.to_lowercase().replace(':', "_")
}

/// Suffixes of a token, shortest first.
///
/// A token of `n` characters gets suffixes of length 1 up to `n - 2`, capped at
/// [`MAX_SUFFIX_LEN`], so short tokens whose suffixes would just repeat them get none.
fn suffixes(token: &str) -> impl Iterator<Item = (usize, &str)> {
    let char_count = token.chars().count();
    let longest = MAX_SUFFIX_LEN.min(char_count.saturating_sub(2));

    token
        .char_indices()
        .rev()
        .take(longest)
        .enumerate()
        .map(move |(i, (start, _))| (i + 1, &token[start..]))
}
