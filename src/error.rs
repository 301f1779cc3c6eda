use snafu::Snafu;

#[derive(Snafu, Debug, Clone, PartialEq)]
pub enum SrsError {
    #[snafu(display("invalid input: {message}"))]
    InvalidInput { message: String },
    InvalidDeckSize,
    #[snafu(display(
        "review state for {key} changed concurrently (expected version {expected:?}, found {found:?})"
    ))]
    Conflict {
        key: String,
        expected: Option<u64>,
        found: Option<u64>,
    },
    #[snafu(display("review store failure: {message}"))]
    Store { message: String },
}

impl SrsError {
    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        SrsError::InvalidInput {
            message: message.into(),
        }
    }
}

pub type Result<T, E = SrsError> = std::result::Result<T, E>;

impl From<std::convert::Infallible> for SrsError {
    fn from(e: std::convert::Infallible) -> Self {
        match e {}
    }
}
