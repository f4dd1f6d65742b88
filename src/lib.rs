pub mod ack;
pub mod annotate;
pub mod error;
pub mod qlog;

pub use annotate::{annotate, annotate_file, AnnotationSummary};
pub use error::AnnotateError;
pub use qlog::{QlogSchema, Trace};

#[cfg(test)]
mod test;
