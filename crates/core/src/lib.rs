#![forbid(unsafe_code)]

//! Domain model for the QuitCode academy: programs, pages, assignments,
//! progress, and the pure page-ordering reducer. No I/O lives here.

pub mod error;
pub mod model;
pub mod ordering;
pub mod progress;
pub mod time;

pub use error::Error;
pub use time::Clock;
