use crate::error::{AppError, Result};
use crate::filter::PatternSet;
use crate::process::FileKind;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// A file that survived filtering. Content is read later, on demand.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub rel_path: PathBuf,
    pub kind: FileKind,
}

/// One node of the repository tree. Directory children are kept sorted by
/// name; file nodes never have children.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub name: String,
    pub is_dir: bool,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn new_dir(name: String) -> Self {
        Self {
            name,
            is_dir: true,
            children: Vec::new(),
        }
    }

    fn new_file(name: String) -> Self {
        Self {
            name,
            is_dir: false,
            children: Vec::new(),
        }
    }
}

/// Walks `repo_root` depth-first, children in lexicographic name order,
/// returning the filtered file list and the matching tree in one pass.
///
/// Directories matching a directory-form ignore rule are pruned before
/// descending, so nothing beneath them is ever evaluated. Symbolic links are
/// not followed. `.git` is always skipped.
pub fn walk(repo_root: &Path, patterns: &PatternSet) -> Result<(Vec<FileEntry>, TreeNode)> {
    log::debug!("Walking repository: {}", repo_root.display());

    let root_name = repo_root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| ".".to_string());
    let mut root_node = TreeNode::new_dir(root_name);
    let mut files = Vec::new();

    let walker = WalkDir::new(repo_root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            let Some(rel_path) = pathdiff::diff_paths(entry.path(), repo_root) else {
                log::warn!("Could not get relative path for: {}", entry.path().display());
                return false;
            };
            if rel_path.components().next() == Some(Component::Normal(".git".as_ref())) {
                log::trace!("Skipping path within .git: {}", rel_path.display());
                return false;
            }
            let is_dir = entry.file_type().is_dir();
            if patterns.is_ignored(&rel_path, is_dir) {
                log::trace!("Pruned by ignore rules: {}", rel_path.display());
                return false;
            }
            true
        });

    for entry_result in walker {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Error walking directory: {}", e);
                continue;
            }
        };
        if entry.depth() == 0 || !entry.file_type().is_file() {
            continue;
        }
        let Some(rel_path) = pathdiff::diff_paths(entry.path(), repo_root) else {
            continue;
        };
        if !patterns.matches_file(&rel_path) {
            log::trace!("Excluded by include filters: {}", rel_path.display());
            continue;
        }

        let components: Vec<String> = rel_path
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        if components.is_empty() {
            continue;
        }
        insert_node(&mut root_node.children, &components);

        log::trace!("Including file: {}", rel_path.display());
        files.push(FileEntry {
            kind: FileKind::from_path(&rel_path),
            path: entry.into_path(),
            rel_path,
        });
    }

    if files.is_empty() {
        return Err(AppError::NoFilesFound {
            root: repo_root.to_path_buf(),
        });
    }
    log::debug!("Walk complete: {} files included.", files.len());
    Ok((files, root_node))
}

// Inserts one file path into the tree, creating intermediate directory nodes
// as needed. Children stay sorted by name via binary-search insertion.
fn insert_node(current_level: &mut Vec<TreeNode>, components: &[String]) {
    let component_name = &components[0];
    let remaining = &components[1..];
    let is_last = remaining.is_empty();

    match current_level.binary_search_by(|node| node.name.as_str().cmp(component_name)) {
        Ok(index) => {
            if !is_last {
                insert_node(&mut current_level[index].children, remaining);
            }
        }
        Err(insertion_point) => {
            let mut new_node = if is_last {
                TreeNode::new_file(component_name.clone())
            } else {
                TreeNode::new_dir(component_name.clone())
            };
            if !is_last {
                insert_node(&mut new_node.children, remaining);
            }
            current_level.insert(insertion_point, new_node);
        }
    }
}
