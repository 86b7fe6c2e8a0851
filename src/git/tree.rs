use std::fs;
use std::path::Path;

use crate::git::error::{GitError, Result};
use crate::git::objects::{GitObject, ObjectKind, object_read};
use crate::git::repo::GitRepository;

/// One `(mode, path, sha)` record of a tree object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Six ascii octal digits; five-wide wire modes are zero-left-padded.
    pub mode: String,
    /// A single path component.
    pub path: String,
    /// 40-hex object id.
    pub sha: String,
}

impl TreeEntry {
    /// Classify the entry by the two leading mode characters.
    pub fn kind(&self) -> Result<ObjectKind> {
        match self.mode.get(..2) {
            Some("04") => Ok(ObjectKind::Tree),
            Some("10") | Some("12") => Ok(ObjectKind::Blob),
            Some("16") => Ok(ObjectKind::Commit),
            _ => Err(GitError::MalformedObject(format!(
                "bad tree entry mode {}",
                self.mode
            ))),
        }
    }

    pub fn is_tree(&self) -> bool {
        self.mode.starts_with("04")
    }

    // Directories sort as if they carried a trailing slash.
    fn sort_key(&self) -> String {
        if self.is_tree() {
            format!("{}/", self.path)
        } else {
            self.path.clone()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitTree {
    pub entries: Vec<TreeEntry>,
}

pub fn tree_parse(raw: &[u8]) -> Result<GitTree> {
    let mut entries = Vec::new();
    let mut pos = 0usize;

    while pos < raw.len() {
        let space = raw[pos..]
            .iter()
            .position(|&b| b == b' ')
            .map(|off| pos + off)
            .ok_or_else(|| {
                GitError::MalformedObject("tree entry missing mode terminator".to_string())
            })?;

        let width = space - pos;
        if width != 5 && width != 6 {
            return Err(GitError::MalformedObject(format!(
                "tree entry mode is {width} bytes wide"
            )));
        }
        let mut mode = String::from_utf8(raw[pos..space].to_vec())
            .map_err(|_| GitError::MalformedObject("tree entry mode is not ascii".to_string()))?;
        if mode.len() == 5 {
            mode.insert(0, '0');
        }

        let nul = raw[space..]
            .iter()
            .position(|&b| b == 0)
            .map(|off| space + off)
            .ok_or_else(|| {
                GitError::MalformedObject("tree entry missing path terminator".to_string())
            })?;
        let path = String::from_utf8(raw[space + 1..nul].to_vec())
            .map_err(|_| GitError::MalformedObject("tree entry path is not utf-8".to_string()))?;

        let sha_end = nul + 21;
        if sha_end > raw.len() {
            return Err(GitError::MalformedObject(format!(
                "truncated object id for tree entry {path}"
            )));
        }
        let sha = hex::encode(&raw[nul + 1..sha_end]);

        entries.push(TreeEntry { mode, path, sha });
        pos = sha_end;
    }

    Ok(GitTree { entries })
}

pub fn tree_serialize(tree: &GitTree) -> Result<Vec<u8>> {
    let mut sorted: Vec<&TreeEntry> = tree.entries.iter().collect();
    sorted.sort_by_key(|entry| entry.sort_key());

    let mut out = Vec::new();
    for entry in sorted {
        out.extend_from_slice(entry.mode.as_bytes());
        out.push(b' ');
        out.extend_from_slice(entry.path.as_bytes());
        out.push(0);

        let sha = hex::decode(&entry.sha).map_err(|_| {
            GitError::MalformedObject(format!(
                "invalid object id {} for tree entry {}",
                entry.sha, entry.path
            ))
        })?;
        if sha.len() != 20 {
            return Err(GitError::MalformedObject(format!(
                "invalid object id {} for tree entry {}",
                entry.sha, entry.path
            )));
        }
        out.extend_from_slice(&sha);
    }

    Ok(out)
}

/// Materialize a commit or tree into `dest`, which must either not exist yet
/// or be an empty directory.
pub fn checkout(repo: &GitRepository, sha: &str, dest: &Path) -> Result<()> {
    let mut obj = object_read(repo, sha)?;

    // A commit checks out the tree its header points at.
    if let GitObject::Commit(kvlm) = &obj {
        let tree_sha = kvlm.get(b"tree").ok_or_else(|| {
            GitError::MalformedObject(format!("commit {sha} has no tree header"))
        })?;
        let tree_sha = std::str::from_utf8(tree_sha)
            .map_err(|_| {
                GitError::MalformedObject(format!("commit {sha} has a non-ascii tree header"))
            })?
            .to_string();
        obj = object_read(repo, &tree_sha)?;
    }

    let tree = match obj {
        GitObject::Tree(tree) => tree,
        other => {
            return Err(GitError::KindMismatch {
                sha: sha.to_string(),
                expected: ObjectKind::Tree,
                actual: other.kind(),
            });
        }
    };

    if dest.exists() {
        if !dest.is_dir() {
            return Err(GitError::NotADirectory(dest.to_path_buf()));
        }
        if dest.read_dir()?.next().is_some() {
            return Err(GitError::NotEmpty(dest.to_path_buf()));
        }
    } else {
        fs::create_dir_all(dest)?;
    }

    checkout_tree(repo, &tree, dest)
}

fn checkout_tree(repo: &GitRepository, tree: &GitTree, dest: &Path) -> Result<()> {
    for entry in &tree.entries {
        let target = dest.join(&entry.path);

        match entry.kind()? {
            ObjectKind::Tree => {
                let sub = match object_read(repo, &entry.sha)? {
                    GitObject::Tree(sub) => sub,
                    other => {
                        return Err(GitError::KindMismatch {
                            sha: entry.sha.clone(),
                            expected: ObjectKind::Tree,
                            actual: other.kind(),
                        });
                    }
                };
                fs::create_dir(&target)?;
                checkout_tree(repo, &sub, &target)?;
            }
            ObjectKind::Blob => {
                // Symlink-mode entries land as regular files holding the
                // link target; modes are not restored.
                let data = match object_read(repo, &entry.sha)? {
                    GitObject::Blob(data) => data,
                    other => {
                        return Err(GitError::KindMismatch {
                            sha: entry.sha.clone(),
                            expected: ObjectKind::Blob,
                            actual: other.kind(),
                        });
                    }
                };
                fs::write(&target, data)?;
            }
            ObjectKind::Commit | ObjectKind::Tag => {
                eprintln!("warning: skipping submodule entry {}", target.display());
            }
        }
    }

    Ok(())
}
