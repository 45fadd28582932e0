pub mod python;

use crate::config::ProcessingRule;
use crate::walk::FileEntry;
use std::fs;
use std::path::Path;

/// Detected file kind. Only recognized kinds get rule-specific handling;
/// everything else is passed through as raw content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Python,
    Other,
}

impl FileKind {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("py") => FileKind::Python,
            _ => FileKind::Other,
        }
    }
}

/// A file's textual representation, ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedFile {
    pub rel_path: String,
    pub content: String,
}

/// Produces the text to embed for one file under the given rule.
///
/// Per-file failures never abort the batch: unreadable content becomes a
/// placeholder notice, and a Python parse failure falls back to the raw
/// content (or, for imports, an empty contribution) with a logged warning.
pub fn process(entry: &FileEntry, rule: ProcessingRule) -> ProcessedFile {
    let rel_path = entry.rel_path.to_string_lossy().replace('\\', "/");
    let content = match read_text(entry) {
        Some(content) => apply_rule(&rel_path, &content, entry.kind, rule),
        None => format!("[non-text content omitted: {}]", rel_path),
    };
    ProcessedFile { rel_path, content }
}

fn read_text(entry: &FileEntry) -> Option<String> {
    match fs::read(&entry.path) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(content) => Some(content),
            Err(e) => {
                log::warn!(
                    "Substituting placeholder for non-UTF-8 file: {} ({})",
                    entry.rel_path.display(),
                    e
                );
                None
            }
        },
        Err(e) => {
            log::warn!(
                "Substituting placeholder for unreadable file: {} ({})",
                entry.rel_path.display(),
                e
            );
            None
        }
    }
}

fn apply_rule(rel_path: &str, content: &str, kind: FileKind, rule: ProcessingRule) -> String {
    match kind {
        FileKind::Python => match rule {
            ProcessingRule::RawContent => content.to_string(),
            ProcessingRule::Integral => normalize(content),
            ProcessingRule::Interface => match python::extract_interface(content) {
                Ok(interface) => interface,
                Err(e) => {
                    log::warn!("Falling back to raw content for {}: {}", rel_path, e);
                    content.to_string()
                }
            },
            ProcessingRule::Imports => match python::extract_imports(content) {
                Ok(imports) => imports.join("\n"),
                Err(e) => {
                    log::warn!("Skipping imports for unparseable file {}: {}", rel_path, e);
                    String::new()
                }
            },
        },
        // Unrecognized kinds always behave as raw content.
        FileKind::Other => content.to_string(),
    }
}

/// Normalization applied by the `integral` rule: trailing whitespace stripped
/// from every line, exactly one trailing newline. Idempotent.
pub fn normalize(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for line in content.lines() {
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
