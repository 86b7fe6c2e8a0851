use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::git::error::{GitError, Result};
use crate::git::repo::GitRepository;

/// Indirection bound for `ref: ` chains.
const MAX_REF_DEPTH: usize = 10;

/// A node of the `refs/` forest: a leaf ref or a nested directory.
#[derive(Debug, PartialEq, Eq)]
pub enum RefNode {
    /// `None` when the chain ends at a missing file (a fresh repository's
    /// HEAD points at a branch that has no commits yet).
    Ref(Option<String>),
    Dir(BTreeMap<String, RefNode>),
}

/// Resolve `name`, a ref path relative to the metadata directory.
/// A missing file is the unresolved value, not an error.
pub fn ref_resolve(repo: &GitRepository, name: &str) -> Result<Option<String>> {
    let mut name = name.to_string();

    for _ in 0..MAX_REF_DEPTH {
        let path = repo.repo_path(&name);
        if !path.is_file() {
            return Ok(None);
        }

        let mut data = fs::read_to_string(&path)?;
        if data.ends_with('\n') {
            data.pop();
        }

        match data.strip_prefix("ref: ") {
            Some(target) => name = target.to_string(),
            None => return Ok(Some(data)),
        }
    }

    Err(GitError::RefCycle(name))
}

/// The refs under `prefix` (default `refs`), keyed by directory-entry name
/// in lexicographic order, mirroring the on-disk layout.
pub fn ref_list(repo: &GitRepository, prefix: Option<&Path>) -> Result<BTreeMap<String, RefNode>> {
    let prefix = prefix.unwrap_or(Path::new("refs"));
    let dir = repo.repo_path(prefix);

    let mut refs = BTreeMap::new();
    if !dir.is_dir() {
        return Ok(refs);
    }

    for item in fs::read_dir(&dir)? {
        let item = item?;
        let name = item.file_name().to_string_lossy().into_owned();
        let sub = prefix.join(&name);

        let node = if item.path().is_dir() {
            RefNode::Dir(ref_list(repo, Some(&sub))?)
        } else {
            RefNode::Ref(ref_resolve(repo, &sub.to_string_lossy())?)
        };
        refs.insert(name, node);
    }

    Ok(refs)
}

/// Write `sha` to `gitdir/<name>`, creating parent directories.
pub fn ref_create(repo: &GitRepository, name: &str, sha: &str) -> Result<()> {
    let path = repo.repo_file(name, true)?;
    fs::write(&path, format!("{sha}\n"))?;
    Ok(())
}
