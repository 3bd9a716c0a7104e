use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Time errors
    #[error("Invalid access time: {message}")]
    InvalidAccessTime { message: String },

    #[error("Access time overflow after adding {hours}h to {from}")]
    AccessTimeOverflow { from: String, hours: i64 },

    // Schedule errors
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),
}

pub type Result<T> = std::result::Result<T, Error>;
