use crate::config::OutputStyle;
use crate::error::{AppError, Result};
use crate::process::ProcessedFile;
use crate::walk::TreeNode;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

/// Where the rendered artifact goes. Chosen by the caller, never here.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

/// Assembles the final artifact. Pure fold over the ordered file list and,
/// for the repo map, the tree; inputs are never mutated.
pub fn render(tree: &TreeNode, files: &[ProcessedFile], style: OutputStyle) -> String {
    match style {
        OutputStyle::RepoMap => {
            let mut out = String::new();
            render_tree(tree, &mut out);
            out.push('\n');
            render_file_sections(files, &mut out);
            out
        }
        OutputStyle::Flat => {
            let mut out = String::new();
            render_file_sections(files, &mut out);
            out
        }
        OutputStyle::ImportList => render_import_list(files),
    }
}

fn render_tree(root: &TreeNode, out: &mut String) {
    out.push_str(&root.name);
    out.push_str("/\n");
    render_children(&root.children, "", out);
}

fn render_children(children: &[TreeNode], prefix: &str, out: &mut String) {
    for (i, child) in children.iter().enumerate() {
        let is_last = i + 1 == children.len();
        out.push_str(prefix);
        out.push_str(if is_last { "└── " } else { "├── " });
        out.push_str(&child.name);
        if child.is_dir {
            out.push('/');
        }
        out.push('\n');
        if child.is_dir {
            let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
            render_children(&child.children, &child_prefix, out);
        }
    }
}

// Files whose processed content is empty (e.g. no imports under the imports
// rule) are omitted from the artifact.
fn render_file_sections(files: &[ProcessedFile], out: &mut String) {
    for file in files {
        if file.content.is_empty() {
            continue;
        }
        out.push_str("==== ");
        out.push_str(&file.rel_path);
        out.push_str(" ====\n");
        out.push_str(&file.content);
        if !file.content.ends_with('\n') {
            out.push('\n');
        }
        out.push('\n');
    }
}

// Flattened across files, deduplicated, ordered by file path then by the
// original declaration order within each file.
fn render_import_list(files: &[ProcessedFile]) -> String {
    let mut ordered: Vec<&ProcessedFile> = files.iter().filter(|f| !f.content.is_empty()).collect();
    ordered.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));

    let mut out = String::new();
    let mut seen: Vec<&str> = Vec::new();
    for file in ordered {
        for line in file.content.lines() {
            if !seen.contains(&line) {
                seen.push(line);
                out.push_str(line);
                out.push('\n');
            }
        }
    }
    out
}

/// Writes the artifact to its sink, creating missing parent directories for
/// file targets.
pub fn write_artifact(content: &str, target: &OutputTarget) -> Result<()> {
    match target {
        OutputTarget::Stdout => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(content.as_bytes())?;
            handle.flush()?;
            Ok(())
        }
        OutputTarget::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|source| AppError::DirCreation {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            log::info!("Writing artifact to: {}", path.display());
            fs::write(path, content).map_err(|source| AppError::FileWrite {
                path: path.clone(),
                source,
            })
        }
    }
}
