use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// Missing or blank query, rejected before any extraction work.
    #[error("invalid query: {0}")]
    Input(String),

    /// The named-entity recognizer could not be reached or failed to answer.
    #[error("entity recognizer unavailable: {0:#}")]
    CollaboratorUnavailable(#[source] anyhow::Error),

    #[error("gazetteer configuration error: {0}")]
    Gazetteer(String),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
