use std::fs::{self, File};
use std::io::BufReader;

use caseify::{
    classify, compare_files, compare_texts, evaluate_tagger, extract, extract_features,
    process_file, process_lines, read_predictions, reconstruct, restore, tokenize,
    write_predictions, Accuracy, CaseCategory, FeatureFileReader, LabelReport, MixedCaseTable,
    PipelineConfig, SequenceTagger, Truecaser, UnigramTagger,
};

const CORPUS: &str = "\
McDonald is OPEN on Sunday.
I bought an iPhone from Apple in London.
The iPhone is made by Apple.
NASA and the ESA work together.
My friend lives in Paris.
She said the iPhone was expensive.
We ate at McDonald near the station.
The NASA mission failed.
Paris is the capital of France.
Apple sells the iPhone in Paris.
";

fn config() -> PipelineConfig {
    PipelineConfig {
        train_ratio: 0.8,
        test_ratio: 0.2,
        dev_ratio: 0.0,
        seed: 3,
        max_sentences: None,
    }
}

#[test]
fn codec_round_trips_cased_tokens() {
    for sentence in CORPUS.lines() {
        for token in tokenize(sentence) {
            let (category, recovery) = classify(token);
            assert_eq!(
                token,
                restore(&token.to_lowercase(), category, recovery).unwrap()
            );
        }
    }
}

#[test]
fn extracted_labels_reconstruct_the_corpus() {
    let tokens: Vec<Vec<&str>> = CORPUS
        .lines()
        .map(|line| tokenize(line).collect())
        .collect();
    let table = MixedCaseTable::build(tokens.iter().flatten());

    for sentence in &tokens {
        let (features, labels) = extract(sentence);
        assert_eq!(sentence.len(), features.len());

        let lowercase: Vec<String> = sentence.iter().map(|t| t.to_lowercase()).collect();
        assert_eq!(
            sentence.join(" "),
            reconstruct(&lowercase, &labels, Some(&table)).unwrap()
        );
    }
}

#[test]
fn prepare_train_and_truecase() {
    let dir = tempfile::tempdir().unwrap();
    let corpus_path = dir.path().join("corpus.txt");
    let output_dir = dir.path().join("dataset");
    fs::write(&corpus_path, CORPUS).unwrap();

    let processed = process_file(&corpus_path, &config()).unwrap();
    processed.save(&output_dir).unwrap();

    assert_eq!(8, processed.splits.train.len());
    assert_eq!(2, processed.splits.test.len());
    assert!(processed.splits.dev.is_empty());

    let train_file = BufReader::new(File::open(output_dir.join("train.features")).unwrap());
    let (features, labels): (Vec<_>, Vec<_>) = FeatureFileReader::new(train_file, true)
        .map(|sentence| {
            let (features, labels) = sentence.unwrap();
            (features, labels.unwrap())
        })
        .unzip();
    assert_eq!(processed.splits.train.features, features);
    assert_eq!(processed.splits.train.labels, labels);

    let mut tagger = UnigramTagger::new();
    tagger.fit(&features, &labels).unwrap();

    let table = MixedCaseTable::load_from_file(output_dir.join("mixed_tokens.json")).unwrap();
    assert_eq!(processed.table, table);

    let test = &processed.splits.test;
    let predicted: Vec<Vec<CaseCategory>> = test
        .tokens
        .iter()
        .map(|tokens| tagger.predict(&extract_features(tokens)))
        .collect();
    let report = LabelReport::from_sequences(&test.labels, &predicted).unwrap();
    assert_eq!(
        test.tokens.iter().map(Vec::len).sum::<usize>(),
        report.accuracy.total
    );

    let test_file = BufReader::new(File::open(output_dir.join("test.features")).unwrap());
    let (file_predicted, file_report) = evaluate_tagger(&tagger, test_file).unwrap();
    assert_eq!(predicted, file_predicted);
    assert_eq!(report, file_report);

    let mut buffer: Vec<u8> = vec![];
    write_predictions(&mut buffer, &predicted).unwrap();
    assert_eq!(predicted, read_predictions(&buffer[..]).unwrap());

    let truecaser = Truecaser::new(tagger, table);
    let raw = fs::read_to_string(output_dir.join("test.txt")).unwrap();
    let truecased: Vec<String> = raw
        .lines()
        .map(|line| truecaser.truecase(&line.to_lowercase()).unwrap())
        .collect();
    let truecased_path = dir.path().join("test.truecased");
    fs::write(&truecased_path, truecased.join("\n") + "\n").unwrap();

    let accuracy = compare_files(output_dir.join("test.tok"), &truecased_path).unwrap();
    assert_eq!(report.accuracy.total, accuracy.total);
    assert!(accuracy.correct > 0);
}

#[test]
fn prepared_gold_matches_truecased_tokens() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = vec![
        "McDonald is OPEN today.".to_owned(),
        "I bought an iPhone, too.".to_owned(),
    ];
    let config = PipelineConfig {
        train_ratio: 1.0,
        test_ratio: 0.0,
        dev_ratio: 0.0,
        ..PipelineConfig::default()
    };
    let processed = process_lines(corpus, &config).unwrap();
    processed.save(dir.path()).unwrap();

    let train = &processed.splits.train;
    let mut tagger = UnigramTagger::new();
    tagger.fit(&train.features, &train.labels).unwrap();
    let truecaser = Truecaser::new(tagger, processed.table.clone());

    let truecased: Vec<String> = train
        .lines
        .iter()
        .map(|line| truecaser.truecase(line).unwrap())
        .collect();
    let gold = fs::read_to_string(dir.path().join("train.tok")).unwrap();

    let accuracy = compare_texts(gold.lines(), &truecased).unwrap();
    assert_eq!(Accuracy { correct: 12, total: 12 }, accuracy);
    assert!(compare_texts(&train.lines, &truecased).is_err());
}

#[test]
fn truecaser_restores_known_words() {
    let sentences: Vec<Vec<&str>> = CORPUS
        .lines()
        .map(|line| tokenize(line).collect())
        .collect();
    let (features, labels): (Vec<_>, Vec<_>) =
        sentences.iter().map(|sentence| extract(sentence)).unzip();

    let mut tagger = UnigramTagger::new();
    tagger.fit(&features, &labels).unwrap();
    let table = MixedCaseTable::build_parallel(&sentences, 3);
    let truecaser = Truecaser::new(tagger, table);

    assert_eq!(
        "NASA sells the iPhone in Paris .",
        truecaser.truecase("nasa sells the iphone in paris.").unwrap()
    );
}
