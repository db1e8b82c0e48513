//! Error types for the option catalog

/// Errors building a command line from the catalog
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// No schema for this stage name
    #[error("unknown stage: '{0}'")]
    UnknownStage(String),

    /// Required option has no value and no default
    #[error("{stage}: you must specify a value for option -{flag} ({description})")]
    MissingRequired {
        stage: String,
        flag: String,
        description: String,
    },

    /// Argument names an option the stage does not have
    #[error("{stage}: unknown option -{flag}")]
    UnknownOption { stage: String, flag: String },

    /// Argument value does not fit the option kind
    #[error("{stage}: invalid value for -{flag}: {message}")]
    InvalidValue {
        stage: String,
        flag: String,
        message: String,
    },
}
