use thiserror;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("buffer holds {actual} bytes, the declared width takes {expected}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("encoding is not a canonical representative")]
    NotCanonical,

    #[error("montgomery reduction needs an odd modulus")]
    EvenModulus,

    #[error("modulus does not fill the declared width or is degenerate")]
    UnsupportedModulus,
}

pub type Result<T> = core::result::Result<T, Error>;
