#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    InvalidCatalog(String),
    InvalidBedSetup(String),
    InvalidKey(String),
    VariantNotAllowed(String),
    InvalidPrice(f64),
    RuleNotFound(String),
    RoomTypeNotFound(String),
    MatrixNotFound(String),
    ContextNotFound(String),
    LimitExceeded(&'static str),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidCatalog(msg) => write!(f, "invalid catalog: {msg}"),
            EngineError::InvalidBedSetup(msg) => write!(f, "invalid bed setup: {msg}"),
            EngineError::InvalidKey(key) => write!(f, "invalid key: {key:?}"),
            EngineError::VariantNotAllowed(key) => {
                write!(f, "variant {key} is not allowed; enable it before child sharing")
            }
            EngineError::InvalidPrice(price) => {
                write!(f, "invalid price {price}: must be finite and non-negative")
            }
            EngineError::RuleNotFound(id) => write!(f, "pricing rule not found: {id}"),
            EngineError::RoomTypeNotFound(id) => write!(f, "room type not found: {id}"),
            EngineError::MatrixNotFound(id) => write!(f, "pricing matrix not found: {id}"),
            EngineError::ContextNotFound(id) => write!(f, "matrix context not found: {id}"),
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}
