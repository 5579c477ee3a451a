use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CaseError {
    #[error("recovered spelling {recovery:?} does not lowercase to {token:?}")]
    CategoryMismatch { token: String, recovery: String },
    #[error("got {labels} labels for {tokens} tokens")]
    LengthMismatch { tokens: usize, labels: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown case category: {0:?}")]
pub struct UnknownCategory(pub String);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown feature: {0:?}")]
pub struct UnknownFeature(pub String);

#[derive(Error, Debug)]
pub enum ModelLoadingError {
    #[error("cannot read model from file: {0}")]
    ReadFile(#[from] std::io::Error),
    #[error("malformed model file: {0}")]
    Deserialize(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ModelSavingError {
    #[error("cannot write model into file: {0}")]
    WriteFile(#[from] std::io::Error),
    #[error("can't serialize model: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum FeatureFileError {
    #[error("cannot access feature file: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: unknown case label {label:?}")]
    UnknownLabel { line: usize, label: String },
    #[error("line {line}: unknown feature {key:?}")]
    UnknownFeature { line: usize, key: String },
    #[error("line {line}: malformed feature {field:?}")]
    MalformedFeature { line: usize, field: String },
    #[error("line {line}: missing case label")]
    MissingLabel { line: usize },
    #[error(transparent)]
    Case(#[from] CaseError),
}

#[derive(Error, Debug, PartialEq)]
pub enum SplitError {
    #[error("split ratio {name} must be between 0 and 1, got {value}")]
    RatioOutOfRange { name: &'static str, value: f64 },
    #[error("split ratios must sum to 1, got {0}")]
    RatiosDoNotSumToOne(f64),
}

#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error("cannot read evaluation input: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: gold has {gold} tokens but prediction has {predicted}")]
    LengthMismatch {
        line: usize,
        gold: usize,
        predicted: usize,
    },
    #[error("gold has {gold} lines but prediction has {predicted}")]
    LineCountMismatch { gold: usize, predicted: usize },
    #[error(transparent)]
    FeatureFile(#[from] FeatureFileError),
    #[error(transparent)]
    Case(#[from] CaseError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    ReadFile(#[from] std::io::Error),
    #[error("malformed config file: {0}")]
    Deserialize(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] SplitError),
}

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("cannot access dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    FeatureFile(#[from] FeatureFileError),
    #[error(transparent)]
    SaveModel(#[from] ModelSavingError),
    #[error(transparent)]
    Split(#[from] SplitError),
}
