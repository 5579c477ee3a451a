use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::case::{classify, CaseCategory};
use crate::errors::{ModelLoadingError, ModelSavingError};
use crate::tokenizer::tokenize;

/// Most frequent spelling of every mixed-case word seen in a corpus.
///
/// Keys are lowercase words, values are the spelling to bring back, e.g. `"iphone"` →
/// `"iPhone"`. A table can't be changed once built; build a new one from the corpus instead.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(transparent)]
pub struct MixedCaseTable {
    entries: HashMap<String, String>,
}

impl MixedCaseTable {
    /// Build a table from a stream of tokens in corpus order.
    pub fn build<I>(tokens: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut builder = MixedCaseTableBuilder::new();
        builder.add_tokens(tokens);
        builder.into_table()
    }

    /// Build a table from tokenized sentences, counting chunks of them on the rayon pool.
    ///
    /// The result is the same as [`MixedCaseTable::build`] over the flattened sentences:
    /// partial counts are merged in chunk order, so ties still go to the spelling that
    /// appears first in the corpus.
    pub fn build_parallel<S>(sentences: &[Vec<S>], chunk_size: usize) -> Self
    where
        S: AsRef<str> + Sync,
    {
        let builder = sentences
            .par_chunks(chunk_size.max(1))
            .map(|chunk| {
                let mut builder = MixedCaseTableBuilder::new();
                for sentence in chunk {
                    builder.add_tokens(sentence);
                }
                builder
            })
            .reduce(MixedCaseTableBuilder::new, |mut left, right| {
                left.merge(right);
                left
            });

        builder.into_table()
    }

    /// Look up the preferred spelling of a lowercase word.
    pub fn lookup(&self, lowercase_word: &str) -> Option<&str> {
        self.entries.get(lowercase_word).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(lowercase, spelling)| (lowercase.as_str(), spelling.as_str()))
    }

    /// Save this table into a file as a flat JSON object.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelSavingError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, &self)?;
        writer.flush()?;

        Ok(())
    }

    /// Load a previously saved table from a file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ModelLoadingError> {
        let reader = BufReader::new(File::open(path)?);
        let table = serde_json::from_reader(reader)?;

        Ok(table)
    }
}

/// Gathers mixed-case spelling counts and turns them into a [`MixedCaseTable`].
///
/// Feed it tokens in corpus order; the order of insertion decides ties.
#[derive(Debug, Default)]
pub struct MixedCaseTableBuilder {
    stats: IndexMap<String, SpellingCounts>,
}

impl MixedCaseTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add sentences from a file, one sentence per line.
    pub fn add_sentences_from_file<P: AsRef<Path>>(&mut self, path: P) -> io::Result<&mut Self> {
        let path = path.as_ref();
        debug!("Counting mixed-case spellings in {}", path.display());

        let reader = BufReader::new(File::open(path)?);
        for line in reader.lines() {
            self.add_sentence(&line?);
        }

        Ok(self)
    }

    /// Add multiple sentences from an iterator.
    pub fn add_sentences_from_iter<I>(&mut self, iter: I) -> &mut Self
    where
        I: Iterator,
        I::Item: AsRef<str>,
    {
        for sentence in iter {
            self.add_sentence(sentence.as_ref());
        }

        self
    }

    /// Tokenize a raw sentence and add its tokens.
    pub fn add_sentence(&mut self, sentence: &str) -> &mut Self {
        self.add_tokens(tokenize(sentence))
    }

    /// Add already tokenized text.
    pub fn add_tokens<I>(&mut self, tokens: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for token in tokens {
            self.add_token(token.as_ref());
        }

        self
    }

    pub fn add_token(&mut self, token: &str) -> &mut Self {
        if let (CaseCategory::Mixed, Some(spelling)) = classify(token) {
            let lowercase = spelling.to_lowercase();
            if let Some(counts) = self.stats.get_mut(&lowercase) {
                counts.add(spelling, 1);
            } else {
                let mut counts = SpellingCounts::default();
                counts.add(spelling, 1);
                self.stats.insert(lowercase, counts);
            }
        }

        self
    }

    /// Fold the counts of another builder into this one.
    ///
    /// Spellings first seen by `other` rank after everything already in `self`.
    pub fn merge(&mut self, other: MixedCaseTableBuilder) -> &mut Self {
        for (lowercase, other_counts) in other.stats {
            let counts = self.stats.entry(lowercase).or_default();
            for (spelling, count) in other_counts.spellings {
                counts.add(&spelling, count);
            }
        }

        self
    }

    /// Build a table out of all gathered counts.
    pub fn into_table(self) -> MixedCaseTable {
        let entries: HashMap<_, _> = self
            .stats
            .into_iter()
            .filter_map(|(lowercase, counts)| {
                counts
                    .into_most_frequent()
                    .map(|spelling| (lowercase, spelling))
            })
            .collect();

        info!("Built mixed-case table with {} entries", entries.len());

        MixedCaseTable { entries }
    }
}

#[derive(Debug, Default)]
struct SpellingCounts {
    spellings: IndexMap<String, u32>,
}

impl SpellingCounts {
    fn add(&mut self, spelling: &str, count: u32) {
        if let Some(existing) = self.spellings.get_mut(spelling) {
            *existing += count;
            return;
        }

        self.spellings.insert(spelling.to_owned(), count);
    }

    // `max_by_key` keeps the last maximum, so ties have to be resolved by hand
    fn into_most_frequent(self) -> Option<String> {
        let mut best: Option<(String, u32)> = None;
        for (spelling, count) in self.spellings {
            match best {
                Some((_, best_count)) if best_count >= count => {}
                _ => best = Some((spelling, count)),
            }
        }

        best.map(|(spelling, _)| spelling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repeat(token: &str, times: usize) -> Vec<&str> {
        std::iter::repeat(token).take(times).collect()
    }

    #[test]
    fn test_majority_spelling_wins() {
        let mut tokens = repeat("IPhone", 2);
        tokens.extend(repeat("iPhone", 5));
        let table = MixedCaseTable::build(tokens);

        assert_eq!(Some("iPhone"), table.lookup("iphone"));
        assert_eq!(1, table.len());
    }

    #[test]
    fn test_ties_go_to_first_spelling() {
        let table = MixedCaseTable::build(vec!["IPhone", "iPhone", "iPhone", "IPhone"]);

        assert_eq!(Some("IPhone"), table.lookup("iphone"));
    }

    #[test]
    fn test_only_mixed_tokens_are_counted() {
        let table = MixedCaseTable::build(vec!["Apple", "APPLE", "apple", "McDonald", ","]);

        assert_eq!(None, table.lookup("apple"));
        assert_eq!(Some("McDonald"), table.lookup("mcdonald"));
        assert_eq!(1, table.len());
    }

    #[test]
    fn test_regular_spellings_do_not_outvote_mixed() {
        let mut tokens = repeat("mcdonald", 10);
        tokens.push("McDonald");
        let table = MixedCaseTable::build(tokens);

        assert_eq!(Some("McDonald"), table.lookup("mcdonald"));
    }

    #[test]
    fn test_every_key_is_lowercase_of_its_value() {
        let table = MixedCaseTable::build(vec!["eBay", "McDonald", "iPod", "YouTube"]);

        for (key, value) in table.iter() {
            assert_eq!(key, value.to_lowercase());
        }
    }

    #[test]
    fn test_lookup_miss() {
        let table = MixedCaseTable::build(Vec::<String>::new());

        assert!(table.is_empty());
        assert_eq!(None, table.lookup("iphone"));
    }

    #[test]
    fn test_add_sentence_tokenizes() {
        let mut builder = MixedCaseTableBuilder::new();
        builder.add_sentences_from_iter(
            ["I bought an iPhone.", "My iPhone, your IPhone."].iter(),
        );
        let table = builder.into_table();

        assert_eq!(Some("iPhone"), table.lookup("iphone"));
    }

    #[test]
    fn test_merge_sums_counts() {
        let mut left = MixedCaseTableBuilder::new();
        left.add_tokens(vec!["IPhone", "IPhone"]);
        let mut right = MixedCaseTableBuilder::new();
        right.add_tokens(vec!["iPhone", "iPhone", "iPhone"]);
        left.merge(right);

        assert_eq!(Some("iPhone"), left.into_table().lookup("iphone"));
    }

    #[test]
    fn test_build_parallel_matches_sequential() {
        let sentences: Vec<Vec<&str>> = vec![
            vec!["IPhone", "is", "not", "iPhone"],
            vec!["eBay", "EBay"],
            vec!["iPhone", "IPhone"],
            vec!["EBay", "eBay", "McDonald"],
        ];
        let sequential = MixedCaseTable::build(sentences.iter().flatten());

        for chunk_size in 1..=4 {
            assert_eq!(
                sequential,
                MixedCaseTable::build_parallel(&sentences, chunk_size)
            );
        }
        assert_eq!(Some("IPhone"), sequential.lookup("iphone"));
        assert_eq!(Some("eBay"), sequential.lookup("ebay"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mixed_tokens.json");
        let table = MixedCaseTable::build(vec!["McDonald", "iPhone"]);

        table.save_to_file(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let loaded = MixedCaseTable::load_from_file(&path).unwrap();

        assert!(contents.starts_with('{'));
        assert_eq!(table, loaded);
    }
}
