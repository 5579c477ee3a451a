//! Case pattern codec.
//!
//! Every token falls into one of five [`CaseCategory`] values. Four of them can be
//! regenerated from the lowercase form alone; [`CaseCategory::Mixed`] additionally
//! needs the original spelling, which is what [`classify`] hands back as recovery data.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{CaseError, UnknownCategory};
use crate::utils::{is_cased, uppercase_first_cased};

/// Letter-casing pattern of a single token.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum CaseCategory {
    /// All cased characters are lowercase: `cat`
    Lower,
    /// All cased characters are uppercase: `NASA`
    Upper,
    /// Only the first cased character is uppercase: `London`
    Title,
    /// Anything else with cased characters: `McDonald`, `iPhone`
    Mixed,
    /// No cased characters at all: `,`, `1999`
    Other,
}

impl CaseCategory {
    pub const ALL: [CaseCategory; 5] = [
        CaseCategory::Lower,
        CaseCategory::Upper,
        CaseCategory::Title,
        CaseCategory::Mixed,
        CaseCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CaseCategory::Lower => "LOWER",
            CaseCategory::Upper => "UPPER",
            CaseCategory::Title => "TITLE",
            CaseCategory::Mixed => "MIXED",
            CaseCategory::Other => "OTHER",
        }
    }
}

impl fmt::Display for CaseCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CaseCategory::ALL
            .iter()
            .copied()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_owned()))
    }
}

/// Figure out the case category of a token.
///
/// For [`CaseCategory::Mixed`] tokens the token itself is returned as recovery data,
/// since nothing else is enough to bring its casing back. Never fails: an empty token,
/// or one made only of digits and punctuation, is [`CaseCategory::Other`].
pub fn classify(token: &str) -> (CaseCategory, Option<&str>) {
    let mut cased = token.chars().filter(|&c| is_cased(c));

    let first = match cased.next() {
        None => return (CaseCategory::Other, None),
        Some(c) => c,
    };

    let mut rest_lower = true;
    let mut rest_upper = true;
    for c in cased {
        rest_lower &= c.is_lowercase();
        rest_upper &= c.is_uppercase();
    }

    let category = match (first.is_uppercase(), rest_lower, rest_upper) {
        (false, true, _) => CaseCategory::Lower,
        (true, _, true) => CaseCategory::Upper,
        (true, true, false) => CaseCategory::Title,
        _ => CaseCategory::Mixed,
    };

    match category {
        CaseCategory::Mixed => (category, Some(token)),
        _ => (category, None),
    }
}

/// Bring back the casing of a lowercase token.
///
/// `recovery` only matters for [`CaseCategory::Mixed`]. When it is missing the token
/// gets title-cased, which is the best guess we have for an unknown mixed-case word.
pub fn restore(
    lowercase_token: &str,
    category: CaseCategory,
    recovery: Option<&str>,
) -> Result<String, CaseError> {
    let restored = match category {
        CaseCategory::Lower | CaseCategory::Other => lowercase_token.to_owned(),
        CaseCategory::Upper => lowercase_token.to_uppercase(),
        CaseCategory::Title => uppercase_first_cased(lowercase_token),
        CaseCategory::Mixed => match recovery {
            Some(spelling) if spelling.to_lowercase() == lowercase_token => spelling.to_owned(),
            Some(spelling) => {
                return Err(CaseError::CategoryMismatch {
                    token: lowercase_token.to_owned(),
                    recovery: spelling.to_owned(),
                })
            }
            None => uppercase_first_cased(lowercase_token),
        },
    };

    Ok(restored)
}
