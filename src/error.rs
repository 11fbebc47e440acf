use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaixaError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not decode file as UTF-8 or Latin-1: {0}")]
    Decode(String),

    #[error("Could not read CSV: {0}")]
    Parse(String),

    #[error("External service failed: {0}")]
    Collaborator(String),

    #[error("Pergunta não fornecida.")]
    EmptyQuestion,

    #[error("Unknown conversation: {0}")]
    ConversationNotFound(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CaixaError>;
