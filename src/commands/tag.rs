use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Utc;

use crate::git::kvlm::Kvlm;
use crate::git::objects::{GitObject, object_find, object_read, object_write};
use crate::git::refs::ref_create;
use crate::git::refs::ref_list;
use crate::git::repo::{GitRepository, gitconfig_read, gitconfig_user_get, repo_find};

pub fn run(annotate: bool, message: Option<&str>, name: Option<&str>, object: &str) -> Result<()> {
    let repo = repo_find(".")?;

    let Some(name) = name else {
        return list_tags(&repo);
    };

    if name.contains('/') {
        bail!("tag name cannot contain '/'");
    }
    let ref_name = format!("refs/tags/{name}");
    if repo.repo_path(&ref_name).exists() {
        bail!("tag '{name}' already exists");
    }

    let sha = object_find(&repo, object, None)?;
    let target = if annotate {
        create_tag_object(&repo, name, &sha, message)?
    } else {
        // A lightweight tag is only a ref.
        sha
    };

    ref_create(&repo, &ref_name, &target)?;

    Ok(())
}

fn list_tags(repo: &GitRepository) -> Result<()> {
    let tags = ref_list(repo, Some(Path::new("refs/tags")))?;
    for name in tags.keys() {
        println!("{name}");
    }

    Ok(())
}

/// Build and store an annotated tag object wrapping `sha`.
fn create_tag_object(
    repo: &GitRepository,
    name: &str,
    sha: &str,
    message: Option<&str>,
) -> Result<String> {
    let tagger = gitconfig_user_get(&gitconfig_read())
        .context("user name and email not set in git config")?;
    let target_kind = object_read(repo, sha)?.kind();

    let mut kvlm = Kvlm::new();
    kvlm.push(b"object", sha.as_bytes().to_vec());
    kvlm.push(b"type", target_kind.as_str().as_bytes().to_vec());
    kvlm.push(b"tag", name.as_bytes().to_vec());
    kvlm.push(
        b"tagger",
        format!("{tagger} {} +0000", Utc::now().timestamp()).into_bytes(),
    );
    kvlm.message = match message {
        Some(m) if m.ends_with('\n') => m.as_bytes().to_vec(),
        Some(m) => format!("{m}\n").into_bytes(),
        None => format!("{name}\n").into_bytes(),
    };

    Ok(object_write(Some(repo), &GitObject::Tag(kvlm))?)
}
