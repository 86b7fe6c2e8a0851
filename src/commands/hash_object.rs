use std::fs;
use std::path::Path;

use anyhow::Result;

use crate::git::objects::{ObjectKind, object_hash};
use crate::git::repo::repo_find;

pub fn run(write: bool, kind: ObjectKind, path: &Path) -> Result<()> {
    // Without -w no repository is needed at all.
    let repo = if write { Some(repo_find(".")?) } else { None };

    let data = fs::read(path)?;
    let sha = object_hash(repo.as_ref(), kind, &data)?;
    println!("{sha}");

    Ok(())
}
