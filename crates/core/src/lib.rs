#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod summary;
pub mod time;

pub use error::ValidationError;
pub use time::Clock;
