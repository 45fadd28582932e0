use crate::config::{Config, OutputStyle, ProcessingRule};
use crate::error::Result;
use crate::filter::PatternSet;
use crate::process::{self, ProcessedFile};
use crate::render::{self, OutputTarget};
use crate::walk;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Drives one repository-to-text conversion: walk, process, render, write.
///
/// Owns the compiled pattern set and the rule/style selection for the
/// duration of a single invocation. There are two phases (collecting, then
/// rendering) with no retries; a collection failure such as a missing root
/// or nothing left after filtering is terminal and surfaced to the caller.
pub struct RepoxProcessor {
    repo_path: PathBuf,
    patterns: PatternSet,
    rule: ProcessingRule,
    style: OutputStyle,
}

impl RepoxProcessor {
    pub fn new(repo_path: &Path, config: &Config) -> Result<Self> {
        let patterns = PatternSet::build(
            repo_path,
            &config.filter.ignore_patterns,
            &config.filter.include_patterns,
            config.filter.path_pattern.as_deref(),
        )?;
        Ok(Self {
            repo_path: repo_path.to_path_buf(),
            patterns,
            rule: config.processing.rule,
            style: config.output.style,
        })
    }

    /// Produces the rendered artifact without writing it anywhere.
    pub fn run(&self) -> Result<String> {
        log::info!(
            "Converting repository {} (rule: {}, style: {})",
            self.repo_path.display(),
            self.rule,
            self.style
        );
        let (entries, tree) = walk::walk(&self.repo_path, &self.patterns)?;

        log::debug!("Processing {} files...", entries.len());
        // Parallel map keeps the input (traversal) order in the collected
        // output, whatever order the work actually finishes in.
        let files: Vec<ProcessedFile> = entries
            .par_iter()
            .map(|entry| process::process(entry, self.rule))
            .collect();

        Ok(render::render(&tree, &files, self.style))
    }

    /// Runs the conversion and writes the artifact to its sink.
    pub fn execute(&self, target: &OutputTarget) -> Result<()> {
        let artifact = self.run()?;
        render::write_artifact(&artifact, target)
    }
}
