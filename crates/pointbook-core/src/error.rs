use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PointbookError {
    #[error("Member not found: {id}")]
    MemberNotFound { id: String },

    #[error("Member already exists: {id}")]
    MemberAlreadyExists { id: String },

    #[error("Category not found: {name}")]
    CategoryNotFound { name: String },

    #[error("Invalid category name: '{name}' - must contain at least one non-space character")]
    InvalidCategoryName { name: String },

    #[error("Category '{name}' cannot be nested under '{parent}': categories are at most two levels deep")]
    CategoryDepthExceeded { name: String, parent: String },

    #[error("Category '{name}' is still referenced by events: {events:?}")]
    CategoryInUse { name: String, events: Vec<String> },

    #[error("Category '{name}' still has sub-categories: {children:?}")]
    CategoryHasChildren { name: String, children: Vec<String> },

    #[error("Event not found: {name}")]
    EventNotFound { name: String },

    #[error("Event already exists: {name}")]
    EventAlreadyExists { name: String },

    #[error("Point exception #{index} not found for member {member}")]
    ExceptionNotFound { member: String, index: usize },

    #[error("Invalid tier: '{value}' - expected 'standard' or 'reduced'")]
    InvalidTier { value: String },

    #[error("Invalid permission: '{value}' - expected 'user' or 'officer'")]
    InvalidPermission { value: String },

    #[error("Invalid member filter: '{value}' - expected 'active', 'inactive' or 'both'")]
    InvalidFilter { value: String },

    #[error("Invalid points: {value} - points must be a finite number")]
    InvalidPoints { value: f64 },

    #[error("Permission denied: {caller} may not view points of {target}")]
    PermissionDenied { caller: String, target: String },

    /// An event resolves but its category does not.
    #[error("Integrity error: event '{event}' references missing category {category_id}")]
    Integrity { event: String, category_id: String },

    #[error("Internal error: no requirement computed for category '{category}'")]
    MissingComputation { category: String },

    #[error("Config parse error in {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Config key not found: {key}")]
    ConfigKeyNotFound { key: String },

    #[error("Invalid config value for {key}: {message}")]
    ConfigValue { key: String, message: String },

    #[error("Datastore parse error in {path}: {message}")]
    StoreParse { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Home directory not found")]
    HomeNotFound,
}

pub type Result<T> = std::result::Result<T, PointbookError>;

impl PointbookError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MemberNotFound { .. }
            | Self::CategoryNotFound { .. }
            | Self::EventNotFound { .. }
            | Self::ExceptionNotFound { .. } => 2,
            Self::MemberAlreadyExists { .. } | Self::EventAlreadyExists { .. } => 3,
            Self::PermissionDenied { .. } => 4,
            Self::InvalidTier { .. }
            | Self::InvalidPermission { .. }
            | Self::InvalidFilter { .. }
            | Self::InvalidPoints { .. }
            | Self::InvalidCategoryName { .. }
            | Self::CategoryDepthExceeded { .. }
            | Self::CategoryInUse { .. }
            | Self::CategoryHasChildren { .. } => 5,
            Self::Integrity { .. } => 6,
            Self::MissingComputation { .. } => 7,
            _ => 1,
        }
    }

    /// True for data-integrity failures the caller should alert on
    pub fn is_integrity(&self) -> bool {
        matches!(self, Self::Integrity { .. })
    }
}
