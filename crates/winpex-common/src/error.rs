use thiserror::Error;

#[derive(Debug, Error)]
pub enum WinpexError {
    #[error("failed to create {object} query: {reason}")]
    QueryCreate { object: String, reason: String },
    #[error("instance {instance:?} not found in {object} query result")]
    InstanceNotFound { object: String, instance: String },
    #[error("no records found for performance object {object}")]
    NoRecords { object: String },
    #[error("performance object {0} not found in scrape context")]
    ObjectNotFound(String),
    #[error("counter {counter:?} not found in {object} query result")]
    CounterNotFound { object: String, counter: String },
    #[error("failed to decode performance object {object}: {reason}")]
    Decode { object: String, reason: String },
    #[error("field binding mismatch: {0}")]
    Binding(String),
    #[error("collector {0} has not been built")]
    NotBuilt(String),
    #[error("collector {0} is closed")]
    Closed(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("internal error: {0}")]
    InternalError(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl WinpexError {
    /// Errors raised while a collector is being built. These abort startup
    /// instead of failing a single scrape.
    pub fn is_init_failure(&self) -> bool {
        matches!(self, Self::QueryCreate { .. } | Self::Binding(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::QueryCreate { .. } => "query_create",
            Self::InstanceNotFound { .. } => "instance_not_found",
            Self::NoRecords { .. } => "no_records",
            Self::ObjectNotFound(_) => "object_not_found",
            Self::CounterNotFound { .. } => "counter_not_found",
            Self::Decode { .. } => "decode",
            Self::Binding(_) => "binding",
            Self::NotBuilt(_) => "not_built",
            Self::Closed(_) => "closed",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::InternalError(_) => "internal",
            Self::Io(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, WinpexError>;
