use thiserror::Error;

/// Errors that can occur when running a container census.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The caller asked for more insertions per container than the census supports.
    #[error("please use an n <= {limit} (got {requested})")]
    TooManyInsertions {
        /// The number of insertions that was requested.
        requested: u64,

        /// The largest number of insertions the census accepts.
        limit: u64,
    },
}

/// A specialized `Result` type for census operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;
