use warp::http::StatusCode;
use warp::reject::Reject;

pub type Result<T> = std::result::Result<T, Error>;
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid command")]
    InvalidCommand,
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("entryId must be a positive integer")]
    InvalidEntryId,
    #[error("title, notes, and photoUrl are required")]
    MissingFields,
    #[error("request body is too large")]
    BodyTooLarge,
    #[error("cannot find entry with entryId {0}")]
    EntryNotFound(i64),
    #[error("db error: {0}")]
    DbError(#[from] sqlx::Error),
    #[error("failed to run migrations: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
    #[error("failed to bind server: {0}")]
    BindError(#[from] warp::Error),
    #[error("http error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("api error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("{0}")]
    Form(String),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Reject for Error {}

impl Error {
    pub fn into_rejection(self) -> warp::Rejection {
        warp::reject::custom(self)
    }

    /// Status reported to HTTP callers. Anything that is not a client error is a 500.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::InvalidEntryId | Error::MissingFields => StatusCode::BAD_REQUEST,
            Error::EntryNotFound(_) => StatusCode::NOT_FOUND,
            Error::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
