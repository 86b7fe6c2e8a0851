use std::path::Path;

use anyhow::Result;

use crate::git::objects::object_find;
use crate::git::repo::repo_find;
use crate::git::tree;

pub fn run(commit: &str, path: &Path) -> Result<()> {
    let repo = repo_find(".")?;

    let sha = object_find(&repo, commit, None)?;
    tree::checkout(&repo, &sha, path)?;

    Ok(())
}
