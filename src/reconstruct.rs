use rayon::prelude::*;

use crate::case::{restore, CaseCategory};
use crate::errors::CaseError;
use crate::features::extract_features;
use crate::table::MixedCaseTable;
use crate::tagger::SequenceTagger;
use crate::tokenizer::tokenize;
use crate::utils::join_with_spaces;

/// Put a sentence back together from its tokens and their predicted case categories.
///
/// Tokens are lowercased before restoring, so their input casing doesn't matter. Mixed-case
/// tokens get their spelling from `table`; when there is no table, or it doesn't know the
/// word, they are title-cased. The restored tokens are joined with single spaces.
pub fn reconstruct<S: AsRef<str>>(
    tokens: &[S],
    predicted: &[CaseCategory],
    table: Option<&MixedCaseTable>,
) -> Result<String, CaseError> {
    if tokens.len() != predicted.len() {
        return Err(CaseError::LengthMismatch {
            tokens: tokens.len(),
            labels: predicted.len(),
        });
    }

    let restored = tokens
        .iter()
        .zip(predicted)
        .map(|(token, &category)| {
            let lowercase = token.as_ref().to_lowercase();
            let recovery = match (category, table) {
                (CaseCategory::Mixed, Some(table)) => table.lookup(&lowercase),
                _ => None,
            };
            restore(&lowercase, category, recovery)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(join_with_spaces(restored.iter()))
}

/// Run [`reconstruct`] over many sentences on the rayon pool, keeping sentence order.
pub fn reconstruct_batch<S>(
    sentences: &[Vec<S>],
    predicted: &[Vec<CaseCategory>],
    table: Option<&MixedCaseTable>,
) -> Result<Vec<String>, CaseError>
where
    S: AsRef<str> + Sync,
{
    if sentences.len() != predicted.len() {
        return Err(CaseError::LengthMismatch {
            tokens: sentences.len(),
            labels: predicted.len(),
        });
    }

    sentences
        .par_iter()
        .zip(predicted)
        .map(|(tokens, labels)| reconstruct(tokens, labels, table))
        .collect()
}

/// Restores casing of raw sentences with a trained tagger and a mixed-case table.
#[derive(Debug)]
pub struct Truecaser<T> {
    tagger: T,
    table: MixedCaseTable,
}

impl<T: SequenceTagger> Truecaser<T> {
    pub fn new(tagger: T, table: MixedCaseTable) -> Self {
        Self { tagger, table }
    }

    pub fn tagger(&self) -> &T {
        &self.tagger
    }

    pub fn table(&self) -> &MixedCaseTable {
        &self.table
    }

    /// Restore word casings in a sentence.
    ///
    /// The sentence is tokenized first, so the result has single spaces between tokens.
    pub fn truecase(&self, sentence: &str) -> Result<String, CaseError> {
        let tokens: Vec<String> = tokenize(sentence).map(str::to_lowercase).collect();
        let predicted = self.tagger.predict(&extract_features(&tokens));
        reconstruct(&tokens, &predicted, Some(&self.table))
    }
}
