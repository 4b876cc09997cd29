#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid document id: {0}")]
    InvalidId(String),

    #[error("no document found")]
    NoDocumentFound,

    #[error("no document updated")]
    NoDocumentUpdated,

    #[error("mongo error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("watch error: {0}")]
    Watch(anyhow::Error),
}
