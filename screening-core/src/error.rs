use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScreeningError {
    #[error("Invalid screening input: {0}")]
    InvalidInput(String),

    #[error("Unknown entity type: {0}")]
    UnknownEntityType(String),

    #[error("Unknown listing status: {0}")]
    UnknownStatus(String),

    #[error("Duplicate catalog entity: {name} ({country}, {added_date})")]
    DuplicateEntity {
        name: String,
        country: String,
        added_date: String,
    },

    #[error("Row {row} out of range: {visible} rows visible")]
    RowOutOfRange { row: usize, visible: usize },

    #[error("Unknown entity id: {0}")]
    UnknownEntity(String),

    #[error("Malformed analysis response: {0}")]
    MalformedResponse(String),

    #[error("Analysis service reported an error: {0}")]
    ServiceReported(String),

    #[error("Catalog could not be read: {0}")]
    CatalogIo(#[from] std::io::Error),

    #[error("Catalog could not be parsed: {0}")]
    CatalogFormat(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScreeningError>;
