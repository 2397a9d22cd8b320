pub mod ls8;

pub use ls8::{HaltReason, Machine, RunConfig, RunReport};
