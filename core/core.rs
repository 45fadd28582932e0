pub mod config;
pub mod error;
pub mod filter;
pub mod process;
pub mod processor;
pub mod render;
pub mod walk;

pub use config::{Config, FilterConfig, OutputConfig, OutputStyle, ProcessingConfig, ProcessingRule};
pub use error::{AppError, Result};
pub use filter::PatternSet;
pub use process::{FileKind, ProcessedFile};
pub use processor::RepoxProcessor;
pub use render::{OutputTarget, render, write_artifact};
pub use walk::{FileEntry, TreeNode, walk};
