use std::fs::File;
use std::io::{stdin, stdout, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use tracing::{info, Level};

use caseify::{
    compare_files, evaluate_tagger, process_file, read_predictions, reconstruct, tokenize,
    write_predictions, FeatureFileReader, MixedCaseTable, MixedCaseTableBuilder, PipelineConfig,
    SequenceTagger, Truecaser, UnigramTagger,
};

fn main() -> Result<()> {
    let matches = App::new("caseify")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Prepare case restoration training data, train a baseline tagger, or truecase text.")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .multiple(true)
                .global(true)
                .help("Log more details to stderr, repeat for even more"),
        )
        .subcommand(
            SubCommand::with_name("prepare")
                .about("Split a corpus and write feature files and a mixed-case table")
                .arg(
                    Arg::with_name("input")
                        .short("i")
                        .long("input")
                        .value_name("FILE")
                        .help("File containing the corpus, one sentence per line.")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    Arg::with_name("directory")
                        .short("d")
                        .long("directory")
                        .value_name("DIR")
                        .help("Directory where the generated files will be written.")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    Arg::with_name("config")
                        .short("c")
                        .long("config")
                        .value_name("FILE")
                        .help("JSON file with split ratios, seed and sentence limit.")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("seed")
                        .long("seed")
                        .value_name("N")
                        .help("Seed for shuffling the corpus, overrides the config file.")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("max-sentences")
                        .long("max-sentences")
                        .value_name("N")
                        .help("Only use this many sentences, overrides the config file.")
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("table")
                .about("Build a mixed-case table from raw sentences")
                .arg(
                    Arg::with_name("input")
                        .short("i")
                        .long("input")
                        .value_name("FILE")
                        .help("File containing sentences, one sentence per line.")
                        .takes_value(true)
                        .required(true)
                        .multiple(true),
                )
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .value_name("FILE")
                        .help("File where the table will be written.")
                        .takes_value(true)
                        .required(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("train")
                .about("Train the baseline unigram tagger on a labeled feature file")
                .arg(
                    Arg::with_name("input")
                        .short("i")
                        .long("input")
                        .value_name("FILE")
                        .help("Labeled feature file produced by `prepare`.")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .value_name("FILE")
                        .help("File where the trained tagger will be written.")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    Arg::with_name("eval")
                        .short("e")
                        .long("eval")
                        .value_name("FILE")
                        .help("Labeled feature file to tag and score after training, e.g. test.features.")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("predictions")
                        .short("p")
                        .long("predictions")
                        .value_name("FILE")
                        .help("File where predicted labels for --eval will be written. Defaults to the --eval file with a .predictions extension.")
                        .takes_value(true)
                        .requires("eval"),
                ),
        )
        .subcommand(
            SubCommand::with_name("truecase")
                .about("Restore casing of sentences with a trained tagger")
                .arg(
                    Arg::with_name("model")
                        .short("m")
                        .long("model")
                        .value_name("FILE")
                        .help("File containing the tagger produced by `train`.")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    Arg::with_name("table")
                        .short("t")
                        .long("table")
                        .value_name("FILE")
                        .help("File containing the mixed-case table.")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    Arg::with_name("input")
                        .short("i")
                        .long("input")
                        .value_name("FILE")
                        .help("File containing sentences that need to be truecased, one sentence per line. stdin by default.")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .value_name("FILE")
                        .help("File into which truecased sentences will be written. stdout by default.")
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("reconstruct")
                .about("Rebuild cased sentences from tokens and predicted labels")
                .arg(
                    Arg::with_name("input")
                        .short("i")
                        .long("input")
                        .value_name("FILE")
                        .help("File containing sentences, one sentence per line.")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    Arg::with_name("predictions")
                        .short("p")
                        .long("predictions")
                        .value_name("FILE")
                        .help("File with one label per token and a blank line after every sentence.")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    Arg::with_name("table")
                        .short("t")
                        .long("table")
                        .value_name("FILE")
                        .help("File containing the mixed-case table.")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .value_name("FILE")
                        .help("File into which sentences will be written. stdout by default.")
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("evaluate")
                .about("Compute token accuracy of truecased sentences against gold sentences")
                .arg(
                    Arg::with_name("gold")
                        .short("g")
                        .long("gold")
                        .value_name("FILE")
                        .help("File containing gold sentences.")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    Arg::with_name("predictions")
                        .short("p")
                        .long("predictions")
                        .value_name("FILE")
                        .help("File containing truecased sentences.")
                        .takes_value(true)
                        .required(true),
                ),
        )
        .get_matches();

    init_logging(matches.occurrences_of("verbose"));

    // the .unwrap()s on required arguments are safe, clap has already checked them
    match matches.subcommand() {
        ("prepare", Some(matches)) => do_prepare(matches),
        ("table", Some(matches)) => {
            let input_filenames: Vec<_> = matches.values_of("input").unwrap().collect();
            do_table(input_filenames, matches.value_of("output").unwrap())
        }
        ("train", Some(matches)) => do_train(
            matches.value_of("input").unwrap(),
            matches.value_of("output").unwrap(),
            matches.value_of("eval"),
            matches.value_of("predictions"),
        ),
        ("truecase", Some(matches)) => do_truecase(
            matches.value_of("model").unwrap(),
            matches.value_of("table").unwrap(),
            matches.value_of("input"),
            matches.value_of("output"),
        ),
        ("reconstruct", Some(matches)) => do_reconstruct(
            matches.value_of("input").unwrap(),
            matches.value_of("predictions").unwrap(),
            matches.value_of("table"),
            matches.value_of("output"),
        ),
        ("evaluate", Some(matches)) => do_evaluate(
            matches.value_of("gold").unwrap(),
            matches.value_of("predictions").unwrap(),
        ),
        _ => unreachable!("a subcommand is required"),
    }
}

fn init_logging(verbosity: u64) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn do_prepare(matches: &ArgMatches) -> Result<()> {
    let mut config = match matches.value_of("config") {
        Some(filename) => PipelineConfig::load_from_file(filename)
            .with_context(|| format!("cannot load config from {}", filename))?,
        None => PipelineConfig::default(),
    };
    if let Some(seed) = matches.value_of("seed") {
        config.seed = seed.parse().context("--seed must be a number")?;
    }
    if let Some(max_sentences) = matches.value_of("max-sentences") {
        config.max_sentences = Some(
            max_sentences
                .parse()
                .context("--max-sentences must be a number")?,
        );
    }

    let input_filename = matches.value_of("input").unwrap();
    let directory = matches.value_of("directory").unwrap();

    let processed = process_file(input_filename, &config)?;
    processed.save(directory)?;
    info!("Wrote dataset to {}", directory);

    Ok(())
}

fn do_table(input_filenames: Vec<&str>, output_filename: &str) -> Result<()> {
    let mut builder = MixedCaseTableBuilder::new();
    for filename in input_filenames {
        builder
            .add_sentences_from_file(filename)
            .with_context(|| format!("cannot read {}", filename))?;
    }
    builder.into_table().save_to_file(output_filename)?;

    Ok(())
}

fn do_train(
    features_filename: &str,
    model_filename: &str,
    eval_filename: Option<&str>,
    predictions_filename: Option<&str>,
) -> Result<()> {
    let reader = BufReader::new(File::open(features_filename)?);

    let mut features = vec![];
    let mut labels = vec![];
    for sentence in FeatureFileReader::new(reader, true) {
        let (sentence_features, sentence_labels) = sentence?;
        features.push(sentence_features);
        labels.push(sentence_labels.unwrap_or_default());
    }

    let mut tagger = UnigramTagger::new();
    tagger.fit(&features, &labels)?;
    tagger.save_to_file(model_filename)?;

    if let Some(eval_filename) = eval_filename {
        let reader = BufReader::new(
            File::open(eval_filename).with_context(|| format!("cannot open {}", eval_filename))?,
        );
        let (predicted, report) = evaluate_tagger(&tagger, reader)?;

        let predictions_path = match predictions_filename {
            Some(filename) => PathBuf::from(filename),
            None => Path::new(eval_filename).with_extension("predictions"),
        };
        let mut output = BufWriter::new(
            File::create(&predictions_path)
                .with_context(|| format!("cannot create {}", predictions_path.display()))?,
        );
        write_predictions(&mut output, &predicted)?;
        output.flush()?;
        info!("Wrote predictions to {}", predictions_path.display());

        print!("{}", report);
    }

    Ok(())
}

fn do_truecase(
    model_filename: &str,
    table_filename: &str,
    input_filename: Option<&str>,
    output_filename: Option<&str>,
) -> Result<()> {
    let tagger = UnigramTagger::load_from_file(model_filename)?;
    let table = MixedCaseTable::load_from_file(table_filename)?;
    let truecaser = Truecaser::new(tagger, table);

    let input = open_input(input_filename)?;
    let mut output = open_output(output_filename)?;

    for sentence in input.lines() {
        let truecased = truecaser.truecase(&sentence?)?;
        output.write_all(truecased.as_bytes())?;
        output.write_all(b"\n")?;
    }
    output.flush()?;

    Ok(())
}

fn do_reconstruct(
    input_filename: &str,
    predictions_filename: &str,
    table_filename: Option<&str>,
    output_filename: Option<&str>,
) -> Result<()> {
    let table = match table_filename {
        Some(filename) => Some(MixedCaseTable::load_from_file(filename)?),
        None => None,
    };
    let predictions = read_predictions(BufReader::new(File::open(predictions_filename)?))?;

    let sentences: Vec<String> = open_input(Some(input_filename))?
        .lines()
        .collect::<std::io::Result<_>>()?;
    let sentences: Vec<&String> = sentences
        .iter()
        .filter(|sentence| tokenize(sentence).next().is_some())
        .collect();

    if sentences.len() != predictions.len() {
        bail!(
            "{} has {} sentences but {} has {}",
            input_filename,
            sentences.len(),
            predictions_filename,
            predictions.len()
        );
    }

    let mut output = open_output(output_filename)?;
    for (index, (sentence, labels)) in sentences.iter().zip(&predictions).enumerate() {
        let tokens: Vec<&str> = tokenize(sentence).collect();
        let text = reconstruct(&tokens, labels, table.as_ref())
            .with_context(|| format!("sentence {}", index + 1))?;
        output.write_all(text.as_bytes())?;
        output.write_all(b"\n")?;
    }
    output.flush()?;

    Ok(())
}

fn do_evaluate(gold_filename: &str, predictions_filename: &str) -> Result<()> {
    let accuracy = compare_files(gold_filename, predictions_filename)?;
    println!("{}", accuracy);

    Ok(())
}

fn open_input(filename: Option<&str>) -> Result<Box<dyn BufRead>> {
    let input: Box<dyn BufRead> = match filename {
        Some(filename) => Box::new(BufReader::new(
            File::open(filename).with_context(|| format!("cannot open {}", filename))?,
        )),
        None => Box::new(BufReader::new(stdin())),
    };

    Ok(input)
}

fn open_output(filename: Option<&str>) -> Result<Box<dyn Write>> {
    let output: Box<dyn Write> = match filename {
        Some(filename) => Box::new(BufWriter::new(
            File::create(filename).with_context(|| format!("cannot create {}", filename))?,
        )),
        None => Box::new(BufWriter::new(stdout())),
    };

    Ok(output)
}
