pub mod app;
pub mod cli;
pub mod config;
pub mod differ;
pub mod locale;
pub mod model;
pub mod normalize;
pub mod output;
pub mod present;
pub mod review;
pub mod table;
pub mod utils;

pub use differ::{diff, DiffOptions, Differ};
pub use model::{ChangedField, DescriptorSet, FieldDescriptor, FieldType, ReasonMap, RecordSnapshot};
pub use review::{ReviewError, ReviewSession, ReviewState, Submission, ValidationError};

#[cfg(test)]
mod tests;
