pub mod config;
pub mod error;
pub mod load;
pub mod pipeline;
pub mod process;
pub mod report;
pub mod write;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use process::{CleanStats, Cleaned, Cleaner};
pub use report::CleaningReport;
