/// Errors raised while resolving settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid table name {0:?}: use 3 to 255 ASCII letters, digits, '_', '.' or '-'")]
    InvalidTableName(String),

    #[error("unknown store backend {0:?}: expected \"sqlite\" or \"memory\"")]
    UnknownStoreBackend(String),
}

pub type Result<T> = std::result::Result<T, SettingsError>;
