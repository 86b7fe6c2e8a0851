use std::path::Path;

use anyhow::{Result, bail};

use crate::git::objects::{GitObject, ObjectKind, object_find, object_read};
use crate::git::repo::{GitRepository, repo_find};

pub fn run(tree: &str, recursive: bool) -> Result<()> {
    let repo = repo_find(".")?;
    let sha = object_find(&repo, tree, Some(ObjectKind::Tree))?;

    ls_tree(&repo, &sha, recursive, Path::new(""))
}

fn ls_tree(repo: &GitRepository, sha: &str, recursive: bool, prefix: &Path) -> Result<()> {
    let tree = match object_read(repo, sha)? {
        GitObject::Tree(tree) => tree,
        other => bail!("object {sha} is a {}, not a tree", other.kind()),
    };

    for entry in &tree.entries {
        let kind = entry.kind()?;
        let path = prefix.join(&entry.path);

        if recursive && kind == ObjectKind::Tree {
            ls_tree(repo, &entry.sha, recursive, &path)?;
        } else {
            println!("{} {} {}\t{}", entry.mode, kind, entry.sha, path.display());
        }
    }

    Ok(())
}
