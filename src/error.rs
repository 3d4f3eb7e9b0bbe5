//! Recoverable error types for this crate.

/// Errors that can occur while constructing or querying a [`crate::BiFmIndex`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no texts were provided to construct the index")]
    EmptyInput,

    #[error("byte {byte:#04x} at text {text_index}, position {position} is not part of the alphabet")]
    SymbolOutOfAlphabet {
        byte: u8,
        text_index: usize,
        position: usize,
    },

    #[error("search scheme pattern length {scheme_length} does not match query length {query_length}")]
    SchemePatternLengthMismatch {
        scheme_length: usize,
        query_length: usize,
    },

    #[error("search scheme {name} is not defined for pattern length {length} with {min_errors}..={max_errors} errors")]
    UnsupportedGeneratorDomain {
        name: &'static str,
        length: usize,
        min_errors: usize,
        max_errors: usize,
    },

    #[error("search scheme is not valid: {reason}")]
    InvalidScheme { reason: &'static str },

    #[cfg(feature = "savefile")]
    #[error("failed to (de)serialize index")]
    Corrupt(#[from] savefile::SavefileError),
}

pub type Result<T> = std::result::Result<T, Error>;
