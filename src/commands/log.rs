use std::collections::HashSet;
use std::io::Write;

use anyhow::{Result, bail};

use crate::git::objects::{GitObject, object_read};
use crate::git::repo::{GitRepository, repo_find};

pub fn run(commit: &str) -> Result<()> {
    let repo = repo_find(".")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "digraph mingitlog{{")?;
    writeln!(out, "  node[shape=rect]")?;

    let mut seen = HashSet::new();
    log_graphviz(&repo, commit, &mut seen, &mut out)?;

    writeln!(out, "}}")?;

    Ok(())
}

/// One node per reachable commit, one edge per parent; each commit is
/// visited exactly once.
pub fn log_graphviz(
    repo: &GitRepository,
    sha: &str,
    seen: &mut HashSet<String>,
    out: &mut impl Write,
) -> Result<()> {
    if !seen.insert(sha.to_string()) {
        return Ok(());
    }

    let commit = match object_read(repo, sha)? {
        GitObject::Commit(kvlm) => kvlm,
        other => bail!("object {sha} is a {}, not a commit", other.kind()),
    };

    let message = String::from_utf8_lossy(&commit.message);
    let label = message
        .lines()
        .next()
        .unwrap_or("")
        .replace('\\', "\\\\")
        .replace('"', "\\\"");
    writeln!(out, "  c_{} [label=\"{}: {}\"]", sha, &sha[..7], label)?;

    for parent in commit.values(b"parent") {
        let parent = String::from_utf8_lossy(parent).into_owned();
        writeln!(out, "  c_{sha} -> c_{parent};")?;
        log_graphviz(repo, &parent, seen, out)?;
    }

    Ok(())
}
