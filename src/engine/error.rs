use chrono::NaiveDate;
use ulid::Ulid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Request rejected before touching storage: bad dates, zero quantity,
    /// empty guest fields.
    InvalidInput(&'static str),
    /// At least one requested night has no inventory record at all.
    NoInventory,
    /// A night's remaining stock was insufficient at read time. No mutation
    /// occurred.
    SoldOut {
        date: NaiveDate,
        remaining: u32,
        requested: u32,
    },
    /// Stock was sufficient at read time but consumed concurrently before
    /// this request's write. All partial decrements were rolled back.
    SoldOutRace { date: NaiveDate },
    UnknownRoomType(Ulid),
    AlreadyExists(Ulid),
    LimitExceeded(&'static str),
    /// Persistence failed; retryable. Inventory was rolled back first.
    Storage(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            EngineError::NoInventory => {
                write!(f, "no inventory for one or more requested nights")
            }
            EngineError::SoldOut { date, remaining, requested } => {
                write!(f, "sold out on {date}: {remaining} remaining, {requested} requested")
            }
            EngineError::SoldOutRace { date } => {
                write!(f, "sold out on {date}: capacity consumed concurrently")
            }
            EngineError::UnknownRoomType(id) => write!(f, "unknown room type: {id}"),
            EngineError::AlreadyExists(id) => write!(f, "already exists: {id}"),
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            EngineError::Storage(_) => write!(f, "storage temporarily unavailable"),
        }
    }
}

impl std::error::Error for EngineError {}
