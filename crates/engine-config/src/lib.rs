pub mod env;
pub mod error;
pub mod settings;

pub use env::EnvVars;
pub use error::SettingsError;
pub use settings::{EngineSettings, MAX_FORMULA_DEPTH};
