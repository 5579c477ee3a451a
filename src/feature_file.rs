//! Reading and writing feature files in the tab-separated format CRFsuite understands.
//!
//! ```text
//! MIXED	t[0]=mcdonald	BOS=True	t[+1]=is	suf1=d	suf2=ld	suf3=ald
//! LOWER	t[0]=is	t[-1]=mcdonald	t[+1]=open
//! UPPER	t[0]=open	t[-1]=is	EOS=True	suf1=n	suf2=en
//!
//! ```
//!
//! One line per token, a blank line after every sentence. Files for tagging unlabeled text
//! have no label column.

use std::io::{self, BufRead, Write};

use crate::case::CaseCategory;
use crate::errors::{CaseError, FeatureFileError};
use crate::features::{FeatureKey, FeatureValue, FeatureVector};

/// Write one sentence worth of features, optionally prefixed by labels.
pub fn write_sentence<W: Write>(
    writer: &mut W,
    features: &[FeatureVector],
    labels: Option<&[CaseCategory]>,
) -> Result<(), FeatureFileError> {
    if let Some(labels) = labels {
        if labels.len() != features.len() {
            return Err(CaseError::LengthMismatch {
                tokens: features.len(),
                labels: labels.len(),
            }
            .into());
        }
    }

    for (index, vector) in features.iter().enumerate() {
        let mut first = true;
        if let Some(labels) = labels {
            write!(writer, "{}", labels[index])?;
            first = false;
        }

        for (key, value) in vector.iter() {
            if !first {
                writer.write_all(b"\t")?;
            }
            first = false;
            write!(writer, "{}={}", key, value)?;
        }
        writer.write_all(b"\n")?;
    }
    writer.write_all(b"\n")?;

    Ok(())
}

/// Write predicted (or gold) labels, one per line, a blank line after every sentence.
pub fn write_predictions<W: Write>(
    writer: &mut W,
    sentences: &[Vec<CaseCategory>],
) -> io::Result<()> {
    for labels in sentences {
        for label in labels {
            writeln!(writer, "{}", label)?;
        }
        writer.write_all(b"\n")?;
    }

    Ok(())
}

/// Read labels written by [`write_predictions`].
pub fn read_predictions<R: BufRead>(reader: R) -> Result<Vec<Vec<CaseCategory>>, FeatureFileError> {
    let mut sentences = vec![];
    let mut current = vec![];

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                sentences.push(std::mem::take(&mut current));
            }
            continue;
        }

        let label: CaseCategory = line.parse().map_err(|_| FeatureFileError::UnknownLabel {
            line: index + 1,
            label: line.to_owned(),
        })?;
        current.push(label);
    }

    if !current.is_empty() {
        sentences.push(current);
    }

    Ok(sentences)
}

/// A sentence read back from a feature file.
pub type FeatureSentence = (Vec<FeatureVector>, Option<Vec<CaseCategory>>);

/// Iterates over the sentences of a feature file.
pub struct FeatureFileReader<R> {
    lines: std::iter::Enumerate<io::Lines<R>>,
    labeled: bool,
}

impl<R: BufRead> FeatureFileReader<R> {
    /// `labeled` tells whether every line starts with a case label.
    pub fn new(reader: R, labeled: bool) -> Self {
        Self {
            lines: reader.lines().enumerate(),
            labeled,
        }
    }

    fn parse_line(
        &self,
        line_number: usize,
        line: &str,
    ) -> Result<(FeatureVector, Option<CaseCategory>), FeatureFileError> {
        let mut fields = line.split('\t');

        let label = if self.labeled {
            let field = match fields.next() {
                Some(field) if !field.is_empty() && !field.contains('=') => field,
                _ => return Err(FeatureFileError::MissingLabel { line: line_number }),
            };
            let label: CaseCategory = field.parse().map_err(|_| FeatureFileError::UnknownLabel {
                line: line_number,
                label: field.to_owned(),
            })?;
            Some(label)
        } else {
            None
        };

        let mut vector = FeatureVector::new();
        for field in fields.filter(|field| !field.is_empty()) {
            let (name, value) = match field.find('=') {
                Some(position) => (&field[..position], Some(&field[position + 1..])),
                None => (field, None),
            };

            let key: FeatureKey = name.parse().map_err(|_| FeatureFileError::UnknownFeature {
                line: line_number,
                key: name.to_owned(),
            })?;

            let value = match (key.is_flag(), value) {
                (true, None) | (true, Some("True")) => FeatureValue::Flag(true),
                (true, Some("False")) => FeatureValue::Flag(false),
                (false, Some(text)) => FeatureValue::Text(text.to_owned()),
                _ => {
                    return Err(FeatureFileError::MalformedFeature {
                        line: line_number,
                        field: field.to_owned(),
                    })
                }
            };
            vector.insert(key, value);
        }

        Ok((vector, label))
    }
}

impl<R: BufRead> Iterator for FeatureFileReader<R> {
    type Item = Result<FeatureSentence, FeatureFileError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut features = vec![];
        let mut labels = vec![];

        loop {
            let (index, line) = match self.lines.next() {
                Some((index, line)) => (index, line),
                None => break,
            };
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };

            if line.trim().is_empty() {
                if features.is_empty() {
                    continue;
                }
                break;
            }

            match self.parse_line(index + 1, line.trim_end_matches('\r')) {
                Ok((vector, label)) => {
                    features.push(vector);
                    labels.extend(label);
                }
                Err(e) => return Some(Err(e)),
            }
        }

        if features.is_empty() {
            return None;
        }

        let labels = if self.labeled { Some(labels) } else { None };
        Some(Ok((features, labels)))
    }
}
