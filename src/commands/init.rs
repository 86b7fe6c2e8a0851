use anyhow::Result;

use crate::git::repo::GitRepository;

pub fn run(path: Option<&str>) -> Result<()> {
    let repo = GitRepository::create(path.unwrap_or("."))?;
    println!("Initialized empty repository in {}", repo.gitdir.display());

    Ok(())
}
