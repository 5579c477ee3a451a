use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::case::{classify, CaseCategory};
use crate::errors::{CaseError, ModelLoadingError, ModelSavingError};
use crate::features::{FeatureKey, FeatureVector};

/// A statistical model that maps a sentence of feature vectors to case labels.
///
/// Implement this for whatever model does the actual tagging, e.g. a CRF.
pub trait SequenceTagger {
    /// Train on sentences of features with their gold labels.
    fn fit(
        &mut self,
        features: &[Vec<FeatureVector>],
        labels: &[Vec<CaseCategory>],
    ) -> Result<(), CaseError>;

    /// Predict one label per feature vector.
    fn predict(&self, features: &[FeatureVector]) -> Vec<CaseCategory>;
}

/// Baseline tagger that picks the most frequent label of each token, ignoring context.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct UnigramTagger {
    labels: HashMap<String, CaseCategory>,
}

impl UnigramTagger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Save this tagger into a file as JSON.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelSavingError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, &self)?;
        writer.flush()?;

        Ok(())
    }

    /// Load a previously saved tagger from a file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ModelLoadingError> {
        let reader = BufReader::new(File::open(path)?);
        let tagger = serde_json::from_reader(reader)?;

        Ok(tagger)
    }

    fn fallback(vector: &FeatureVector) -> CaseCategory {
        let token = vector.text(FeatureKey::Token).unwrap_or_default();
        match classify(token).0 {
            CaseCategory::Other => CaseCategory::Other,
            _ if vector.flag(FeatureKey::Bos) => CaseCategory::Title,
            _ => CaseCategory::Lower,
        }
    }
}

impl SequenceTagger for UnigramTagger {
    fn fit(
        &mut self,
        features: &[Vec<FeatureVector>],
        labels: &[Vec<CaseCategory>],
    ) -> Result<(), CaseError> {
        if features.len() != labels.len() {
            return Err(CaseError::LengthMismatch {
                tokens: features.len(),
                labels: labels.len(),
            });
        }

        let mut counts: IndexMap<&str, IndexMap<CaseCategory, u32>> = IndexMap::new();
        for (sentence, sentence_labels) in features.iter().zip(labels) {
            if sentence.len() != sentence_labels.len() {
                return Err(CaseError::LengthMismatch {
                    tokens: sentence.len(),
                    labels: sentence_labels.len(),
                });
            }

            for (vector, label) in sentence.iter().zip(sentence_labels) {
                if let Some(token) = vector.text(FeatureKey::Token) {
                    *counts.entry(token).or_default().entry(*label).or_insert(0) += 1;
                }
            }
        }

        self.labels = counts
            .into_iter()
            .filter_map(|(token, label_counts)| {
                let mut best: Option<(CaseCategory, u32)> = None;
                for (label, count) in label_counts {
                    match best {
                        Some((_, best_count)) if best_count >= count => {}
                        _ => best = Some((label, count)),
                    }
                }
                best.map(|(label, _)| (token.to_owned(), label))
            })
            .collect();

        info!(
            "Fitted unigram tagger on {} sentences, {} known tokens",
            features.len(),
            self.labels.len()
        );

        Ok(())
    }

    fn predict(&self, features: &[FeatureVector]) -> Vec<CaseCategory> {
        features
            .iter()
            .map(|vector| {
                vector
                    .text(FeatureKey::Token)
                    .and_then(|token| self.labels.get(token))
                    .copied()
                    .unwrap_or_else(|| Self::fallback(vector))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{extract, extract_features};
    use CaseCategory::*;

    fn trained(sentences: &[&[&str]]) -> UnigramTagger {
        let (features, labels): (Vec<_>, Vec<_>) =
            sentences.iter().map(|sentence| extract(*sentence)).unzip();
        let mut tagger = UnigramTagger::new();
        tagger.fit(&features, &labels).unwrap();
        tagger
    }

    #[test]
    fn test_predict_most_frequent_label() {
        let tagger = trained(&[
            &["I", "love", "NASA"],
            &["NASA", "is", "in", "Houston"],
            &["The", "Nasa", "logo"],
        ]);
        let predicted = tagger.predict(&extract_features(&["nasa", "is", "in", "houston"]));

        assert_eq!(vec![Upper, Lower, Lower, Title], predicted);
    }

    #[test]
    fn test_predict_unknown_tokens() {
        let tagger = UnigramTagger::new();
        let predicted = tagger.predict(&extract_features(&["zebras", "run", "!"]));

        assert_eq!(vec![Title, Lower, Other], predicted);
    }

    #[test]
    fn test_fit_length_mismatch() {
        let (features, _) = extract(&["a", "b"]);
        let mut tagger = UnigramTagger::new();

        assert_eq!(
            Err(CaseError::LengthMismatch {
                tokens: 2,
                labels: 1
            }),
            tagger.fit(&[features.clone()], &[vec![Lower]])
        );
        assert_eq!(
            Err(CaseError::LengthMismatch {
                tokens: 1,
                labels: 0
            }),
            tagger.fit(&[features], &[])
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let tagger = trained(&[&["McDonald", "is", "OPEN"]]);

        tagger.save_to_file(&path).unwrap();

        assert_eq!(tagger, UnigramTagger::load_from_file(&path).unwrap());
    }
}
