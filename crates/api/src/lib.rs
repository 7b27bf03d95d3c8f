#![forbid(unsafe_code)]

pub mod contract;
pub mod http;
pub mod memory;

pub use contract::{ApiError, GenerateBankRequest, QuizApi, StartedSession};
pub use http::{HttpQuizApi, HttpQuizApiConfig};
pub use memory::InMemoryQuizApi;
