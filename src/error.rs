//! Error taxonomy, named by condition rather than by underlying Rust type.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("configuration invalid: {0}")]
    ConfigurationInvalid(String),

    #[error("alphabet malformed: {0}")]
    AlphabetMalformed(String),

    #[error("layout malformed: {0}")]
    LayoutMalformed(String),

    #[error("weight file malformed: {0}")]
    WeightMalformed(String),

    #[error("meta stat references unknown statistic: {0}")]
    MetaDependencyUnresolved(String),

    #[error("optimizer invariant violated: {0}")]
    OptimizerInvariantViolated(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
