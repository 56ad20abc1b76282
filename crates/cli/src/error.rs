use engine_config::SettingsError;
use expression_engine::FormulaError;
use model::ModelError;
use thiserror::Error;
use view_filters::FilterError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read the schema file: {0}")]
    SchemaRead(#[from] std::io::Error),

    #[error("Failed to deserialize the schema file: {0}")]
    SchemaDeserialize(#[from] serde_json::Error),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(serde_json::Error),

    #[error("Invalid settings: {0}")]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Failed to compile the filter: {0}")]
    Filter(#[from] FilterError),

    #[error("Failed to type the formula: {0}")]
    Formula(#[from] FormulaError),

    #[error("Invalid --timezone-now value '{0}'")]
    InvalidNow(String),

    #[error("--table and --field are required together with --schema")]
    MissingFieldSelector,
}
