//! Submit a batch of records to an eventually consistent pipeline and find
//! out, within a deadline, whether every result came out the other end.

mod config;
mod errors;
mod pipeline;
mod processor;
mod producer;
mod report;
mod storage;
mod watch;
pub mod utils;

pub use config::*;
pub use errors::*;
pub use pipeline::*;
pub use processor::*;
pub use producer::*;
pub use report::*;
pub use storage::*;
pub use utils::*;
pub use watch::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
