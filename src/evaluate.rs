use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use indexmap::IndexMap;

use crate::case::CaseCategory;
use crate::errors::{CaseError, EvaluationError};
use crate::feature_file::FeatureFileReader;
use crate::tagger::SequenceTagger;

/// How many tokens came out exactly right.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Accuracy {
    pub correct: usize,
    pub total: usize,
}

impl Accuracy {
    /// Fraction of correct tokens, zero when there were none.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

impl fmt::Display for Accuracy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.6} ({}/{})", self.ratio(), self.correct, self.total)
    }
}

/// Compare truecased sentences against gold ones, token by token.
///
/// Tokens are separated by whitespace and must match exactly, casing included.
pub fn compare_texts<G, P>(gold: G, predicted: P) -> Result<Accuracy, EvaluationError>
where
    G: IntoIterator,
    G::Item: AsRef<str>,
    P: IntoIterator,
    P::Item: AsRef<str>,
{
    let mut accuracy = Accuracy::default();
    let mut gold = gold.into_iter();
    let mut predicted = predicted.into_iter();
    let mut line = 0;

    loop {
        let (gold_line, predicted_line) = match (gold.next(), predicted.next()) {
            (Some(g), Some(p)) => (g, p),
            (None, None) => break,
            (g, p) => {
                let gold_rest = g.map_or(0, |_| 1) + gold.count();
                let predicted_rest = p.map_or(0, |_| 1) + predicted.count();
                return Err(EvaluationError::LineCountMismatch {
                    gold: line + gold_rest,
                    predicted: line + predicted_rest,
                });
            }
        };
        line += 1;

        let gold_tokens: Vec<_> = gold_line.as_ref().split_whitespace().collect();
        let predicted_tokens: Vec<_> = predicted_line.as_ref().split_whitespace().collect();
        if gold_tokens.len() != predicted_tokens.len() {
            return Err(EvaluationError::LengthMismatch {
                line,
                gold: gold_tokens.len(),
                predicted: predicted_tokens.len(),
            });
        }

        accuracy.total += gold_tokens.len();
        accuracy.correct += gold_tokens
            .iter()
            .zip(&predicted_tokens)
            .filter(|(g, p)| g == p)
            .count();
    }

    Ok(accuracy)
}

/// Compare two files of sentences, one sentence per line.
pub fn compare_files<P: AsRef<Path>, Q: AsRef<Path>>(
    gold_path: P,
    predicted_path: Q,
) -> Result<Accuracy, EvaluationError> {
    let gold = read_lines(gold_path)?;
    let predicted = read_lines(predicted_path)?;
    compare_texts(gold, predicted)
}

fn read_lines<P: AsRef<Path>>(path: P) -> io::Result<Vec<String>> {
    BufReader::new(File::open(path)?).lines().collect()
}

/// Precision, recall and F1 of a single case category.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct CategoryScores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Label-level scores over a set of predicted sentences.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelReport {
    pub accuracy: Accuracy,
    pub categories: IndexMap<CaseCategory, CategoryScores>,
}

impl LabelReport {
    pub fn from_sequences(
        gold: &[Vec<CaseCategory>],
        predicted: &[Vec<CaseCategory>],
    ) -> Result<Self, CaseError> {
        if gold.len() != predicted.len() {
            return Err(CaseError::LengthMismatch {
                tokens: gold.len(),
                labels: predicted.len(),
            });
        }

        let mut accuracy = Accuracy::default();
        let mut counts: IndexMap<CaseCategory, (usize, usize, usize)> = CaseCategory::ALL
            .iter()
            .map(|&category| (category, (0, 0, 0)))
            .collect();

        for (gold_labels, predicted_labels) in gold.iter().zip(predicted) {
            if gold_labels.len() != predicted_labels.len() {
                return Err(CaseError::LengthMismatch {
                    tokens: gold_labels.len(),
                    labels: predicted_labels.len(),
                });
            }

            for (&g, &p) in gold_labels.iter().zip(predicted_labels) {
                accuracy.total += 1;
                // (true positives, predicted, gold)
                if g == p {
                    accuracy.correct += 1;
                    counts[&g].0 += 1;
                }
                counts[&p].1 += 1;
                counts[&g].2 += 1;
            }
        }

        let categories = counts
            .into_iter()
            .map(|(category, (hits, predicted, support))| {
                let precision = fraction(hits, predicted);
                let recall = fraction(hits, support);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                let scores = CategoryScores {
                    precision,
                    recall,
                    f1,
                    support,
                };
                (category, scores)
            })
            .collect();

        Ok(Self {
            accuracy,
            categories,
        })
    }
}

impl fmt::Display for LabelReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "flat accuracy: {}", self.accuracy)?;
        writeln!(
            f,
            "{:>8} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1", "support"
        )?;
        for (category, scores) in &self.categories {
            writeln!(
                f,
                "{:>8} {:>9.3} {:>9.3} {:>9.3} {:>9}",
                category.as_str(),
                scores.precision,
                scores.recall,
                scores.f1,
                scores.support
            )?;
        }

        Ok(())
    }
}

/// Tag every sentence of a labeled feature file and score the tags against its labels.
///
/// Returns the predicted labels in file order along with the report.
pub fn evaluate_tagger<T: SequenceTagger, R: BufRead>(
    tagger: &T,
    reader: R,
) -> Result<(Vec<Vec<CaseCategory>>, LabelReport), EvaluationError> {
    let mut gold = vec![];
    let mut predicted = vec![];
    for sentence in FeatureFileReader::new(reader, true) {
        let (features, labels) = sentence?;
        predicted.push(tagger.predict(&features));
        gold.push(labels.unwrap_or_default());
    }

    let report = LabelReport::from_sequences(&gold, &predicted)?;
    Ok((predicted, report))
}

fn fraction(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FeatureFileError;
    use crate::feature_file::write_sentence;
    use crate::features::extract;
    use crate::tagger::UnigramTagger;
    use CaseCategory::*;

    #[test]
    fn test_compare_texts() {
        let accuracy = compare_texts(
            vec!["McDonald is OPEN", "Hello world"],
            vec!["Mcdonald is OPEN", "Hello world"],
        )
        .unwrap();

        assert_eq!(Accuracy { correct: 4, total: 5 }, accuracy);
        assert!((accuracy.ratio() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_compare_texts_empty() {
        let accuracy = compare_texts(Vec::<String>::new(), Vec::<String>::new()).unwrap();

        assert_eq!(0.0, accuracy.ratio());
    }

    #[test]
    fn test_compare_texts_token_mismatch() {
        let result = compare_texts(vec!["a b", "c d"], vec!["a b", "c"]);

        assert!(matches!(
            result,
            Err(EvaluationError::LengthMismatch {
                line: 2,
                gold: 2,
                predicted: 1
            })
        ));
    }

    #[test]
    fn test_compare_texts_line_mismatch() {
        let result = compare_texts(vec!["a", "b", "c"], vec!["a"]);

        assert!(matches!(
            result,
            Err(EvaluationError::LineCountMismatch {
                gold: 3,
                predicted: 1
            })
        ));
    }

    #[test]
    fn test_compare_files() {
        let dir = tempfile::tempdir().unwrap();
        let gold = dir.path().join("gold.txt");
        let predicted = dir.path().join("predicted.txt");
        std::fs::write(&gold, "I live in Paris\nNASA\n").unwrap();
        std::fs::write(&predicted, "I live in paris\nNASA\n").unwrap();

        let accuracy = compare_files(&gold, &predicted).unwrap();

        assert_eq!(Accuracy { correct: 4, total: 5 }, accuracy);
    }

    #[test]
    fn test_label_report() {
        let gold = vec![vec![Title, Lower, Upper], vec![Mixed]];
        let predicted = vec![vec![Title, Lower, Lower], vec![Title]];
        let report = LabelReport::from_sequences(&gold, &predicted).unwrap();

        assert_eq!(Accuracy { correct: 2, total: 4 }, report.accuracy);

        let title = report.categories[&Title];
        assert_eq!(1, title.support);
        assert!((title.precision - 0.5).abs() < 1e-9);
        assert!((title.recall - 1.0).abs() < 1e-9);

        let upper = report.categories[&Upper];
        assert_eq!(0.0, upper.recall);
        assert_eq!(0.0, upper.f1);
        assert_eq!(0, report.categories[&Other].support);
    }

    fn labeled_file(sentences: &[&[&str]]) -> Vec<u8> {
        let mut buffer: Vec<u8> = vec![];
        for sentence in sentences {
            let (features, labels) = extract(sentence);
            write_sentence(&mut buffer, &features, Some(&labels[..])).unwrap();
        }
        buffer
    }

    #[test]
    fn test_evaluate_tagger() {
        let training: &[&[&str]] = &[&["NASA", "sells", "the", "iPhone"]];
        let (features, labels): (Vec<_>, Vec<_>) =
            training.iter().map(|sentence| extract(sentence)).unzip();
        let mut tagger = UnigramTagger::new();
        tagger.fit(&features, &labels).unwrap();

        let file = labeled_file(&[&["The", "iPhone"], &["NASA", "AGREES"]]);
        let (predicted, report) = evaluate_tagger(&tagger, &file[..]).unwrap();

        assert_eq!(vec![vec![Lower, Mixed], vec![Upper, Lower]], predicted);
        assert_eq!(Accuracy { correct: 2, total: 4 }, report.accuracy);
        assert_eq!(1, report.categories[&Title].support);
        assert_eq!(1.0, report.categories[&Mixed].f1);
    }

    #[test]
    fn test_evaluate_tagger_needs_labels() {
        let tagger = UnigramTagger::new();
        let result = evaluate_tagger(&tagger, &b"t[0]=nasa\tBOS=True\tEOS=True\n\n"[..]);

        assert!(matches!(
            result,
            Err(EvaluationError::FeatureFile(
                FeatureFileError::MissingLabel { line: 1 }
            ))
        ));
    }

    #[test]
    fn test_label_report_length_mismatch() {
        let result = LabelReport::from_sequences(&[vec![Lower, Lower]], &[vec![Lower]]);

        assert_eq!(
            Err(CaseError::LengthMismatch {
                tokens: 2,
                labels: 1
            }),
            result
        );
    }
}
