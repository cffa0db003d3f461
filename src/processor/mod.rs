//! Local processing stage: drains the ingest queue, classifies every input and
//! writes one result per input. It plays the role of the managed
//! trigger + inference chain when running against a local store.

mod classifier;
mod local_processor;

pub use classifier::*;
pub use local_processor::*;
