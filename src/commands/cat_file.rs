use std::io::Write;

use anyhow::Result;

use crate::git::objects::{ObjectKind, object_find, object_read};
use crate::git::repo::repo_find;

pub fn run(kind: ObjectKind, object: &str) -> Result<()> {
    let repo = repo_find(".")?;

    let sha = object_find(&repo, object, Some(kind))?;
    let obj = object_read(&repo, &sha)?;

    std::io::stdout().write_all(&obj.serialize()?)?;

    Ok(())
}
