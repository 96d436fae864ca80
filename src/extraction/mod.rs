pub mod buffer;
pub mod drafts;
pub mod parser;
pub mod pipeline;

pub use buffer::{CandidateField, ReviewBuffer};
pub use drafts::{CommitGuard, Draft, DraftStore, PendingScreenshot};
pub use parser::{parse_model_output, StructuredExtraction};
pub use pipeline::{ExtractionError, ExtractionPipeline};
