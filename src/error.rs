use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrganizerError {
    #[error("classification table invalid or unreadable: {0}")]
    InvalidTable(String),
    #[error("config file invalid or unreadable: {0}")]
    InvalidConfig(String),
    #[error("organize root not provided: {0}")]
    MissingRoot(String),
}
