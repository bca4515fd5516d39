use thiserror::Error;

/// Errors raised while downloading or filtering the FAVA catalog.
#[derive(Debug, Error)]
pub enum FavaError {
    /// Transport or payload parse failure.
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// A record carried a key outside the fixed schema.
    #[error("unknown catalog field '{field}'")]
    UnknownField { field: String },

    /// A record is missing one of the schema fields.
    #[error("record {record} is missing field '{field}'")]
    IncompleteRecord { record: usize, field: &'static str },

    /// Any of the above, attributed to the week being fetched.
    #[error("week {week}: {source}")]
    InWeek {
        week: u32,
        #[source]
        source: Box<FavaError>,
    },

    #[error("row {row}: cannot transform coordinates: {reason}")]
    CoordinateTransform { row: usize, reason: String },

    #[error("row mask covers {mask_rows} rows but the catalog has {catalog_rows}")]
    MaskLengthMismatch {
        mask_rows: usize,
        catalog_rows: usize,
    },

    #[error("invalid week range {start}..={end}")]
    InvalidWeekRange { start: u32, end: u32 },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl FavaError {
    /// Wrap this error with the week it happened in.
    pub fn in_week(self, week: u32) -> Self {
        match self {
            // already attributed
            e @ FavaError::InWeek { .. } => e,
            e => FavaError::InWeek {
                week,
                source: Box::new(e),
            },
        }
    }

    /// The underlying error with any week attribution stripped.
    pub fn root_cause(&self) -> &FavaError {
        match self {
            FavaError::InWeek { source, .. } => source.root_cause(),
            e => e,
        }
    }

    /// Week the error was attributed to, if any.
    pub fn week(&self) -> Option<u32> {
        match self {
            FavaError::InWeek { week, .. } => Some(*week),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FavaError>;
