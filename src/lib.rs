//! Restore letter casing in lowercased or arbitrarily cased text.
//!
//! Casing is restored in three steps: every token is assigned one of five case
//! categories, a sequence tagger predicts those categories from lowercase features,
//! and the predicted categories are turned back into cased text.
//!
//! # Examples
//!
//! Extract training data from a cased sentence:
//!
//! ```rust
//! use caseify::{extract, CaseCategory};
//!
//! let (features, labels) = extract(&["McDonald", "is", "OPEN"]);
//!
//! assert_eq!(3, features.len());
//! assert_eq!(
//!     vec![CaseCategory::Mixed, CaseCategory::Lower, CaseCategory::Upper],
//!     labels
//! );
//! ```
//!
//! Put cased text back together from predicted categories:
//!
//! ```rust
//! use caseify::{reconstruct, CaseCategory, MixedCaseTable};
//!
//! let table = MixedCaseTable::build(vec!["McDonald"]);
//! let labels = [CaseCategory::Mixed, CaseCategory::Lower, CaseCategory::Upper];
//! let text = reconstruct(&["mcdonald", "is", "open"], &labels, Some(&table)).unwrap();
//!
//! assert_eq!("McDonald is OPEN", text);
//! ```
//!
//! Train the baseline tagger and truecase new sentences:
//!
//! ```rust
//! use caseify::{extract, MixedCaseTable, SequenceTagger, Truecaser, UnigramTagger};
//!
//! let (features, labels) = extract(&["I", "visited", "NASA", "with", "my", "iPhone"]);
//! let mut tagger = UnigramTagger::new();
//! tagger.fit(&[features], &[labels]).unwrap();
//!
//! let table = MixedCaseTable::build(vec!["iPhone"]);
//! let truecaser = Truecaser::new(tagger, table);
//!
//! assert_eq!("NASA has my iPhone", truecaser.truecase("nasa has my iphone").unwrap());
//! ```

mod case;
mod config;
mod dataset;
mod errors;
mod evaluate;
mod feature_file;
mod features;
mod reconstruct;
mod table;
mod tagger;
mod tokenizer;
mod utils;

pub use crate::case::{classify, restore, CaseCategory};
pub use crate::config::PipelineConfig;
pub use crate::dataset::{
    process_file, process_lines, split_lines, ProcessedCorpus, ProcessedSplit, SplitName, Splits,
};
pub use crate::errors::*;
pub use crate::evaluate::{
    compare_files, compare_texts, evaluate_tagger, Accuracy, CategoryScores, LabelReport,
};
pub use crate::feature_file::{
    read_predictions, write_predictions, write_sentence, FeatureFileReader, FeatureSentence,
};
pub use crate::features::{
    extract, extract_batch, extract_features, FeatureKey, FeatureValue, FeatureVector,
    MAX_SUFFIX_LEN,
};
pub use crate::reconstruct::{reconstruct, reconstruct_batch, Truecaser};
pub use crate::table::{MixedCaseTable, MixedCaseTableBuilder};
pub use crate::tagger::{SequenceTagger, UnigramTagger};
pub use crate::tokenizer::{tokenize, Tokenizer};
