pub use crate::pkg::err::Error;

pub type Result<T> = core::result::Result<T, Error>;
