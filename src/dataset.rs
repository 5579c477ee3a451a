use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::case::CaseCategory;
use crate::config::PipelineConfig;
use crate::errors::{DatasetError, SplitError};
use crate::feature_file::{write_predictions, write_sentence};
use crate::features::{extract_batch, FeatureVector};
use crate::table::MixedCaseTable;
use crate::tokenizer::tokenize;

const TABLE_FILENAME: &str = "mixed_tokens.json";
const TABLE_CHUNK_SIZE: usize = 4096;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SplitName {
    Train,
    Test,
    Dev,
}

impl SplitName {
    pub const ALL: [SplitName; 3] = [SplitName::Train, SplitName::Test, SplitName::Dev];

    pub fn as_str(self) -> &'static str {
        match self {
            SplitName::Train => "train",
            SplitName::Test => "test",
            SplitName::Dev => "dev",
        }
    }
}

impl fmt::Display for SplitName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Train, test and dev portions of something.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Splits<T> {
    pub train: T,
    pub test: T,
    pub dev: T,
}

impl<T> Splits<T> {
    pub fn get(&self, name: SplitName) -> &T {
        match name {
            SplitName::Train => &self.train,
            SplitName::Test => &self.test,
            SplitName::Dev => &self.dev,
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, mut f: F) -> Splits<U> {
        Splits {
            train: f(self.train),
            test: f(self.test),
            dev: f(self.dev),
        }
    }
}

/// Shuffle lines with the configured seed and cut them into train, test and dev.
///
/// The same seed always yields the same split. After shuffling only the first
/// `max_sentences` lines are kept. Train and test get `floor(n * ratio)` lines each,
/// dev gets whatever remains.
pub fn split_lines<T>(
    mut lines: Vec<T>,
    config: &PipelineConfig,
) -> Result<Splits<Vec<T>>, SplitError> {
    config.validate()?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    lines.shuffle(&mut rng);

    if let Some(max_sentences) = config.max_sentences {
        lines.truncate(max_sentences);
    }

    let total = lines.len();
    let train_end = (total as f64 * config.train_ratio) as usize;
    let test_end = (train_end + (total as f64 * config.test_ratio) as usize).min(total);

    let dev = lines.split_off(test_end);
    let test = lines.split_off(train_end);

    debug!(
        "Split {} lines into {} train, {} test, {} dev",
        total,
        lines.len(),
        test.len(),
        dev.len()
    );

    Ok(Splits {
        train: lines,
        test,
        dev,
    })
}

/// Sentences of one split with everything derived from them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedSplit {
    pub lines: Vec<String>,
    pub tokens: Vec<Vec<String>>,
    pub features: Vec<Vec<FeatureVector>>,
    pub labels: Vec<Vec<CaseCategory>>,
}

impl ProcessedSplit {
    fn from_lines(lines: Vec<String>) -> Self {
        let tokens: Vec<Vec<String>> = lines
            .iter()
            .map(|line| tokenize(line).map(str::to_owned).collect())
            .collect();
        let (features, labels) = extract_batch(&tokens).into_iter().unzip();

        Self {
            lines,
            tokens,
            features,
            labels,
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// A corpus turned into training data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedCorpus {
    pub splits: Splits<ProcessedSplit>,
    /// Mixed-case spellings seen in the train split.
    pub table: MixedCaseTable,
}

/// Split corpus lines and extract features and labels for every split.
///
/// Blank lines are skipped. The mixed-case table is built from the train split only,
/// so that the test and dev splits stay unseen.
pub fn process_lines(
    lines: Vec<String>,
    config: &PipelineConfig,
) -> Result<ProcessedCorpus, SplitError> {
    let total = lines.len();
    let lines: Vec<String> = lines
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .collect();
    if lines.len() < total {
        warn!("Skipped {} blank lines", total - lines.len());
    }

    let splits = split_lines(lines, config)?.map(ProcessedSplit::from_lines);
    let table = MixedCaseTable::build_parallel(&splits.train.tokens, TABLE_CHUNK_SIZE);

    info!(
        "Processed {} train, {} test, {} dev sentences",
        splits.train.len(),
        splits.test.len(),
        splits.dev.len()
    );

    Ok(ProcessedCorpus { splits, table })
}

/// Read a corpus file, one sentence per line, and process it.
pub fn process_file<P: AsRef<Path>>(
    path: P,
    config: &PipelineConfig,
) -> Result<ProcessedCorpus, DatasetError> {
    let path = path.as_ref();
    info!("Loading corpus from {}", path.display());

    let reader = BufReader::new(File::open(path)?);
    let lines = reader.lines().collect::<io::Result<Vec<_>>>()?;
    info!("Found {} lines", lines.len());

    Ok(process_lines(lines, config)?)
}

impl ProcessedCorpus {
    /// Write every split and the mixed-case table into a directory.
    ///
    /// For each split this writes `<split>.features` (labeled features), `<split>.labels`
    /// (gold labels), `<split>.txt` (the original sentences) and `<split>.tok` (the same
    /// sentences with tokens joined by single spaces), plus `mixed_tokens.json`.
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<(), DatasetError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        for &name in SplitName::ALL.iter() {
            let split = self.splits.get(name);

            let mut features = BufWriter::new(File::create(dir.join(format!("{}.features", name)))?);
            for (vectors, labels) in split.features.iter().zip(&split.labels) {
                write_sentence(&mut features, vectors, Some(labels.as_slice()))?;
            }
            features.flush()?;

            let mut labels = BufWriter::new(File::create(dir.join(format!("{}.labels", name)))?);
            write_predictions(&mut labels, &split.labels)?;
            labels.flush()?;

            let mut lines = BufWriter::new(File::create(dir.join(format!("{}.txt", name)))?);
            for line in &split.lines {
                writeln!(lines, "{}", line)?;
            }
            lines.flush()?;

            // gold for `evaluate`, which compares space-separated tokens
            let mut tokens = BufWriter::new(File::create(dir.join(format!("{}.tok", name)))?);
            for sentence in &split.tokens {
                writeln!(tokens, "{}", sentence.join(" "))?;
            }
            tokens.flush()?;

            debug!("Saved {} {} sentences to {}", split.len(), name, dir.display());
        }

        self.table.save_to_file(dir.join(TABLE_FILENAME))?;

        Ok(())
    }
}
