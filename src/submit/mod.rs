pub mod form;
pub mod pipeline;

pub use form::{HttpFormSubmitter, PageSelection};
pub use pipeline::{Pipeline, PipelineOptions};
