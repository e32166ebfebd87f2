use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TteError {
    #[error("missing required option: {0}")]
    MissingOption(&'static str),
    #[error("column '{column}' not found in the {table} table")]
    MissingColumn { table: &'static str, column: String },
    #[error("column '{column}' already exists in the interval table; pass replace to overwrite")]
    ColumnExists { column: String },
    #[error("retained column '{column}' collides with an existing interval column")]
    ColumnCollision { column: String },
    #[error("output column '{column}' is requested more than once")]
    DuplicateOutput { column: String },
    #[error("cannot read {}: {detail}", path.display())]
    Input { path: PathBuf, detail: String },
    #[error("subject {subject}: {detail}")]
    DataIntegrity { subject: String, detail: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, TteError>;
