#![forbid(unsafe_code)]

//! Root-relative path handling for tracked files.
//!
//! Stored directories are either relative to the root (never starting with a
//! separator) or absolute (always starting with one). Empty directories are
//! kept as they are.

use std::path::{Component, Path};

const SEPARATOR: char = '/';

pub fn is_absolute(path: &str) -> bool {
    path.starts_with(SEPARATOR)
}

/// Lexically normalizes `path`: collapses separators, drops `.` and resolves `..`.
///
/// Returns `"."` for a path that cleans away to nothing.
pub fn clean(path: &str) -> String {
    let absolute = is_absolute(path);
    let mut parts: Vec<&str> = Vec::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str().unwrap_or_default()),
            Component::ParentDir => match parts.last() {
                Some(last) if *last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }

    let joined = parts.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Expresses `path` relative to `root` when it lies under it; any other path is only cleaned.
pub fn rel_to(path: &str, root: &str) -> String {
    if path.is_empty() {
        return String::new();
    }

    let path = clean(path);
    if !is_absolute(&path) || root.is_empty() {
        return path;
    }

    let root = clean(root);
    match Path::new(&path).strip_prefix(&root) {
        Ok(rest) if rest.as_os_str().is_empty() => ".".to_string(),
        Ok(rest) => rest.to_string_lossy().into_owned(),
        Err(_) => path,
    }
}

/// Splits a file path into its cleaned directory and final name.
pub fn split_dir_name(path: &str) -> (String, String) {
    match path.rfind(SEPARATOR) {
        Some(0) => ("/".to_string(), path[1..].to_string()),
        Some(index) => (clean(&path[..index]), path[index + 1..].to_string()),
        None => (".".to_string(), path.to_string()),
    }
}

/// Resolves a stored directory against `root`; empty and absolute directories pass through.
pub fn abs_directory(root: &str, directory: &str) -> String {
    if directory.is_empty() || is_absolute(directory) {
        return directory.to_string();
    }
    clean(&format!("{root}/{directory}"))
}
