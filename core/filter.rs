use crate::error::{AppError, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use regex::Regex;
use std::path::Path;

/// Compiled filtering policy for one run. Immutable once built.
///
/// Ignore rules carry gitignore semantics: declaration order matters, a later
/// match overrides an earlier one, `!` re-includes, and a trailing `/`
/// restricts the rule to directories. Include globs are matched against the
/// full repo-relative path with `*` allowed to cross `/`, so `*.md` matches
/// `docs/guide.md` at any depth while `src/**/*.rs` stays anchored.
#[derive(Debug)]
pub struct PatternSet {
    ignore: Gitignore,
    include: GlobSet,
    has_includes: bool,
    path_pattern: Option<Regex>,
}

impl PatternSet {
    pub fn build(
        repo_root: &Path,
        ignore_patterns: &[String],
        include_patterns: &[String],
        path_pattern: Option<&str>,
    ) -> Result<Self> {
        let mut ignore_builder = GitignoreBuilder::new(repo_root);
        for pattern in ignore_patterns {
            log::trace!("Adding ignore pattern: {}", pattern);
            ignore_builder.add_line(None, pattern)?;
        }
        let ignore = ignore_builder.build()?;

        let include = build_glob_set(include_patterns)?;
        let path_pattern = match path_pattern {
            Some(pattern) => {
                log::trace!("Compiling path pattern: {}", pattern);
                Some(Regex::new(pattern)?)
            }
            None => None,
        };

        Ok(Self {
            ignore,
            include,
            has_includes: !include_patterns.is_empty(),
            path_pattern,
        })
    }

    /// Gitignore-style decision for a repo-relative path. Directory matches
    /// are used by the walker to prune whole subtrees before descending.
    pub fn is_ignored(&self, rel_path: &Path, is_dir: bool) -> bool {
        self.ignore.matched(rel_path, is_dir).is_ignore()
    }

    /// Include-glob and path-regex gate for files that survived the ignore
    /// rules. An empty include set means no restriction.
    pub fn matches_file(&self, rel_path: &Path) -> bool {
        if self.has_includes && !self.include.is_match(rel_path) {
            return false;
        }
        match &self.path_pattern {
            Some(regex) => regex.is_match(&rel_path.to_string_lossy()),
            None => true,
        }
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern_str in patterns {
        let mut processed_pattern = pattern_str.trim().to_string();
        if processed_pattern.ends_with('/') && processed_pattern.len() > 1 {
            processed_pattern.push_str("**");
        }
        match Glob::new(&processed_pattern) {
            Ok(glob) => {
                log::trace!(
                    "Adding include glob: {} (processed as {})",
                    pattern_str,
                    processed_pattern
                );
                builder.add(glob);
            }
            Err(e) => {
                return Err(AppError::Glob(format!(
                    "Invalid glob pattern \"{}\": {}",
                    pattern_str, e
                )));
            }
        }
    }
    builder.build().map_err(|e| AppError::Glob(e.to_string()))
}
