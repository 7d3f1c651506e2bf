pub mod errors;

pub use errors::{HarnessError, Result};
