use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use ini::Ini;

use crate::git::error::{GitError, Result};

/// A repository handle: the working tree and its `.git` metadata directory.
#[derive(Debug)]
pub struct GitRepository {
    pub worktree: PathBuf,
    pub gitdir: PathBuf,
    pub config: Option<RepositoryConfig>,
}

#[derive(Debug)]
pub struct RepositoryConfig {
    pub repository_format_version: u8,
}

impl GitRepository {
    /// Open a repository at `path`. With `force`, the metadata directory is
    /// created if missing and the configuration checks are skipped.
    pub fn new<P: AsRef<Path>>(path: P, force: bool) -> Result<Self> {
        let worktree = path.as_ref().to_path_buf();
        let gitdir = worktree.join(".git");

        if !(force || gitdir.is_dir()) {
            return Err(GitError::NotARepo(worktree));
        }

        if !gitdir.exists() {
            fs::create_dir(&gitdir)?;
        }

        let config_path = gitdir.join("config");
        let config = if config_path.is_file() {
            Some(read_config(&config_path)?)
        } else if !force {
            return Err(GitError::Config(format!(
                "configuration file missing: {}",
                config_path.display()
            )));
        } else {
            None
        };

        if !force {
            if let Some(cfg) = &config {
                if cfg.repository_format_version != 0 {
                    return Err(GitError::Config(format!(
                        "unsupported repositoryformatversion: {}",
                        cfg.repository_format_version
                    )));
                }
            }
        }

        Ok(GitRepository {
            worktree,
            gitdir,
            config,
        })
    }

    /// Create a new repository at `path`: the metadata directory skeleton,
    /// a description, HEAD and a default configuration.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let worktree = path.as_ref().to_path_buf();

        if worktree.exists() {
            if !worktree.is_dir() {
                return Err(GitError::NotADirectory(worktree));
            }
            let gitdir = worktree.join(".git");
            if gitdir.exists() && gitdir.read_dir()?.next().is_some() {
                return Err(GitError::NotEmpty(gitdir));
            }
        } else {
            fs::create_dir_all(&worktree)?;
        }

        let repo = GitRepository::new(&worktree, true)?;

        repo.repo_dir("branches", true)?;
        repo.repo_dir("objects", true)?;
        repo.repo_dir("refs/tags", true)?;
        repo.repo_dir("refs/heads", true)?;

        fs::write(
            repo.repo_file("description", false)?,
            "Unnamed repository; edit this file 'description' to name the repository.\n",
        )?;

        fs::write(repo.repo_file("HEAD", false)?, "ref: refs/heads/master\n")?;

        let mut config = Ini::new();
        config
            .with_section(Some("core"))
            .set("repositoryformatversion", "0")
            .set("filemode", "false")
            .set("bare", "false");
        config.write_to_file(repo.repo_file("config", false)?)?;

        Ok(repo)
    }

    /// Pure join under the metadata directory.
    pub fn repo_path<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.gitdir.join(path)
    }

    /// Like `repo_path`, but with `mkdir` the parent directory chain is
    /// created first.
    pub fn repo_file<P: AsRef<Path>>(&self, path: P, mkdir: bool) -> Result<PathBuf> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                self.repo_dir(parent, mkdir)?;
            }
        }
        Ok(self.repo_path(path))
    }

    /// Directory path under the metadata directory. Returns `Some` when the
    /// directory exists or was just created, `None` when absent without
    /// `mkdir`. An existing non-directory is an error.
    pub fn repo_dir<P: AsRef<Path>>(&self, path: P, mkdir: bool) -> Result<Option<PathBuf>> {
        let full = self.repo_path(path);

        if full.exists() {
            if full.is_dir() {
                return Ok(Some(full));
            }
            return Err(GitError::NotADirectory(full));
        }

        if mkdir {
            fs::create_dir_all(&full)?;
            return Ok(Some(full));
        }

        Ok(None)
    }
}

fn read_config(path: &Path) -> Result<RepositoryConfig> {
    let ini = Ini::load_from_file(path)
        .map_err(|e| GitError::Config(format!("{}: {}", path.display(), e)))?;

    let version = match ini
        .section(Some("core"))
        .and_then(|core| core.get("repositoryformatversion"))
    {
        Some(raw) => raw.parse().map_err(|_| {
            GitError::Config(format!("repositoryformatversion is not a number: {raw}"))
        })?,
        None => 0,
    };

    Ok(RepositoryConfig {
        repository_format_version: version,
    })
}

/// Walk upward from `start` until a directory containing `.git` is found.
pub fn repo_find<P: AsRef<Path>>(start: P) -> Result<GitRepository> {
    let start = fs::canonicalize(start.as_ref())?;

    let mut current = Some(start.as_path());
    while let Some(dir) = current {
        if dir.join(".git").is_dir() {
            return GitRepository::new(dir, false);
        }
        current = dir.parent();
    }

    Err(GitError::NotARepo(start))
}

/// Merge the user-level git configuration files, later files taking
/// precedence.
pub fn gitconfig_read() -> Ini {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let config_home = env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| home.join(".config"));

    let candidates = [config_home.join("git/config"), home.join(".gitconfig")];

    let mut merged = Ini::new();
    for path in candidates {
        if let Ok(cfg) = Ini::load_from_file(&path) {
            for (section, props) in &cfg {
                for (key, value) in props.iter() {
                    merged.with_section(section).set(key, value);
                }
            }
        }
    }

    merged
}

/// `Name <email>` from the merged user configuration, when both are set.
pub fn gitconfig_user_get(config: &Ini) -> Option<String> {
    let user = config.section(Some("user"))?;
    match (user.get("name"), user.get("email")) {
        (Some(name), Some(email)) => Some(format!("{name} <{email}>")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_lays_out_metadata_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = GitRepository::create(tmp.path()).unwrap();

        assert!(repo.gitdir.join("objects").is_dir());
        assert!(repo.gitdir.join("refs/heads").is_dir());
        assert!(repo.gitdir.join("refs/tags").is_dir());
        assert_eq!(
            fs::read_to_string(repo.gitdir.join("HEAD")).unwrap(),
            "ref: refs/heads/master\n"
        );

        let cfg = repo.config.unwrap();
        assert_eq!(cfg.repository_format_version, 0);
    }

    #[test]
    fn test_create_refuses_populated_gitdir() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join(".git/objects")).unwrap();

        let err = GitRepository::create(tmp.path()).unwrap_err();
        assert!(matches!(err, GitError::NotEmpty(_)));
    }

    #[test]
    fn test_repo_find_walks_upward() {
        let tmp = tempfile::tempdir().unwrap();
        GitRepository::create(tmp.path()).unwrap();

        let nested = tmp.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();

        let repo = repo_find(&nested).unwrap();
        assert_eq!(repo.worktree, fs::canonicalize(tmp.path()).unwrap());
    }

    #[test]
    fn test_repo_find_fails_outside_any_repo() {
        let tmp = tempfile::tempdir().unwrap();
        let err = repo_find(tmp.path()).unwrap_err();
        assert!(matches!(err, GitError::NotARepo(_)));
    }

    #[test]
    fn test_repo_dir_rejects_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = GitRepository::create(tmp.path()).unwrap();
        fs::write(repo.repo_path("not-a-dir"), "x").unwrap();

        let err = repo.repo_dir("not-a-dir", false).unwrap_err();
        assert!(matches!(err, GitError::NotADirectory(_)));
    }

    #[test]
    fn test_repo_file_creates_parent_chain_on_request() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = GitRepository::create(tmp.path()).unwrap();

        let path = repo.repo_file("objects/ab/cdef", true).unwrap();
        assert!(path.parent().unwrap().is_dir());
        assert!(!path.exists());

        assert!(repo.repo_dir("objects/zz", false).unwrap().is_none());
    }

    #[test]
    fn test_unsupported_format_version_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = GitRepository::create(tmp.path()).unwrap();
        fs::write(
            repo.gitdir.join("config"),
            "[core]\nrepositoryformatversion=1\n",
        )
        .unwrap();

        let err = GitRepository::new(tmp.path(), false).unwrap_err();
        assert!(matches!(err, GitError::Config(_)));
    }
}
