use crate::error::{AutotagError, Result};
use crate::hooks::{CommandExecutor, CommandOutput};
use git2::build::CheckoutBuilder;
use git2::{
    BranchType, Cred, CredentialType, ErrorCode, FetchOptions, Oid, PushOptions, RemoteCallbacks,
    Repository as Git2Repo,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open the repository at exactly `path` (work tree or `.git` directory).
    ///
    /// Parent directories are not searched: an explicit path that is not a
    /// repository is an error.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let repo = Git2Repo::open(path).map_err(|e| {
            AutotagError::repository(format!(
                "Path {} does not point to a git repository: {}",
                path.display(),
                e.message()
            ))
        })?;
        Ok(Git2Repository { repo })
    }

    /// Find the repository containing `path`, walking up through its parents.
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let repo = Git2Repo::discover(path).map_err(|e| {
            AutotagError::repository(format!(
                "Neither {} nor its parents are a git repository: {}",
                path.display(),
                e.message()
            ))
        })?;
        Ok(Git2Repository { repo })
    }

    pub fn git2(&self) -> &Git2Repo {
        &self.repo
    }

    /// Work tree root, `None` for bare repositories
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// Credential callbacks trying SSH keys from ~/.ssh, the SSH agent, then
    /// the configured git credential helper.
    fn remote_callbacks<'a>(&self) -> Result<RemoteCallbacks<'a>> {
        let config = self.repo.config()?;
        let mut callbacks = RemoteCallbacks::new();

        callbacks.credentials(move |url, username_from_url, allowed_types| {
            let username = username_from_url.unwrap_or("git");

            if allowed_types.contains(CredentialType::SSH_KEY) {
                if let Some(home) = dirs::home_dir() {
                    for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                        let path = home.join(".ssh").join(key);
                        if path.exists() {
                            if let Ok(cred) = Cred::ssh_key(username, None, &path, None) {
                                return Ok(cred);
                            }
                        }
                    }
                }
                if let Ok(cred) = Cred::ssh_key_from_agent(username) {
                    return Ok(cred);
                }
            }

            if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
                if let Ok(cred) = Cred::credential_helper(&config, url, username_from_url) {
                    return Ok(cred);
                }
            }

            Cred::default()
        });

        Ok(callbacks)
    }

    /// Fast-forward the checked out branch to `<remote>/<branch>`.
    ///
    /// Nothing happens on a detached or unborn HEAD, when the remote has no
    /// such branch, or when the local branch is already ahead.
    fn fast_forward_head(&self, remote_name: &str) -> Result<()> {
        let sync = |reason: String| AutotagError::sync(remote_name, reason);

        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == ErrorCode::UnbornBranch => return Ok(()),
            Err(e) => return Err(sync(format!("cannot resolve HEAD: {}", e.message()))),
        };
        if !head.is_branch() {
            debug!("HEAD is detached, skipping fast-forward");
            return Ok(());
        }

        let branch_name = head
            .shorthand()
            .ok_or_else(|| sync("HEAD branch name is not valid UTF-8".to_string()))?
            .to_string();
        let head_ref_name = head
            .name()
            .ok_or_else(|| sync("HEAD reference name is not valid UTF-8".to_string()))?
            .to_string();
        let local_oid = head
            .target()
            .ok_or_else(|| sync(format!("branch '{}' has no target", branch_name)))?;

        let (tracking, remote_oid) = match self.tracking_target(&branch_name, remote_name)? {
            Some(target) => target,
            None => return Ok(()),
        };

        if local_oid == remote_oid || self.is_descendant(local_oid, remote_oid, remote_name)? {
            return Ok(());
        }
        if !self.is_descendant(remote_oid, local_oid, remote_name)? {
            return Err(sync(format!(
                "branch '{}' has diverged from {}; merge or rebase first",
                branch_name, tracking
            )));
        }

        if !self.repo.is_bare() {
            let target = self
                .repo
                .find_object(remote_oid, None)
                .map_err(|e| sync(e.message().to_string()))?;
            self.repo
                .checkout_tree(&target, Some(CheckoutBuilder::new().safe()))
                .map_err(|e| sync(format!("cannot update work tree: {}", e.message())))?;
        }

        let mut reference = self
            .repo
            .find_reference(&head_ref_name)
            .map_err(|e| sync(e.message().to_string()))?;
        reference
            .set_target(
                remote_oid,
                &format!("autotag: fast-forward to {}", tracking),
            )
            .map_err(|e| sync(e.message().to_string()))?;

        info!(branch = %branch_name, from = %local_oid, to = %remote_oid, "fast-forwarded branch");
        Ok(())
    }

    /// Remote-tracking reference the branch follows and its target.
    ///
    /// The branch's configured upstream wins; without one, `<remote>/<branch>`
    /// is used. `None` when neither exists.
    fn tracking_target(
        &self,
        branch_name: &str,
        remote_name: &str,
    ) -> Result<Option<(String, Oid)>> {
        let sync = |message: String| AutotagError::sync(remote_name, message);

        let branch = self
            .repo
            .find_branch(branch_name, BranchType::Local)
            .map_err(|e| sync(e.message().to_string()))?;
        let reference = match branch.upstream() {
            Ok(upstream) => upstream.into_reference(),
            Err(e) if e.code() == ErrorCode::NotFound => {
                let fallback = format!("refs/remotes/{}/{}", remote_name, branch_name);
                match self.repo.find_reference(&fallback) {
                    Ok(reference) => reference,
                    Err(e) if e.code() == ErrorCode::NotFound => {
                        debug!(tracking = %fallback, "no remote-tracking branch, skipping");
                        return Ok(None);
                    }
                    Err(e) => return Err(sync(e.message().to_string())),
                }
            }
            Err(e) => return Err(sync(format!("cannot resolve upstream: {}", e.message()))),
        };

        let name = reference
            .shorthand()
            .ok_or_else(|| sync("upstream name is not valid UTF-8".to_string()))?
            .to_string();
        Ok(reference.target().map(|oid| (name, oid)))
    }

    fn is_descendant(&self, commit: Oid, ancestor: Oid, remote_name: &str) -> Result<bool> {
        self.repo
            .graph_descendant_of(commit, ancestor)
            .map_err(|e| AutotagError::sync(remote_name, e.message().to_string()))
    }
}

impl super::Repository for Git2Repository {
    #[instrument(skip(self))]
    fn list_tag_names(&self) -> Result<Vec<String>> {
        let tags = self.repo.tag_names(None)?;
        let names: Vec<String> = tags.iter().flatten().map(|s| s.to_string()).collect();
        debug!(count = names.len(), "listed tags");
        Ok(names)
    }

    #[instrument(skip(self))]
    fn pull(&self, remote_name: &str) -> Result<()> {
        let mut remote = self
            .repo
            .find_remote(remote_name)
            .map_err(|e| {
                AutotagError::sync(remote_name, format!("cannot find remote: {}", e.message()))
            })?;

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(self.remote_callbacks()?);

        let refspec_heads = format!("+refs/heads/*:refs/remotes/{}/*", remote_name);
        let refspecs = [refspec_heads.as_str(), "+refs/tags/*:refs/tags/*"];
        remote
            .fetch(&refspecs, Some(&mut fetch_options), None)
            .map_err(|e| {
                AutotagError::sync(remote_name, format!("fetch failed: {}", e.message()))
            })?;
        debug!("fetched branches and tags");

        self.fast_forward_head(remote_name)
    }

    #[instrument(skip(self, message))]
    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()> {
        let reference_name = format!("refs/tags/{}", name);
        match self.repo.find_reference(&reference_name) {
            Ok(_) => return Err(AutotagError::TagExists(name.to_string())),
            Err(e) if e.code() == ErrorCode::NotFound || e.code() == ErrorCode::InvalidSpec => {}
            Err(e) => return Err(AutotagError::tag_creation(name, e.message())),
        }

        let head = self
            .repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .map_err(|e| {
                AutotagError::tag_creation(name, format!("cannot resolve HEAD: {}", e.message()))
            })?;

        let tagger = self.repo.signature().map_err(|e| {
            AutotagError::tag_creation(
                name,
                format!("no tagger identity (set user.name and user.email): {}", e.message()),
            )
        })?;

        match self.repo.tag(name, head.as_object(), &tagger, message, false) {
            Ok(oid) => {
                info!(tag = name, object = %oid, commit = %head.id(), "created annotated tag");
                Ok(())
            }
            Err(e) if e.code() == ErrorCode::Exists => {
                Err(AutotagError::TagExists(name.to_string()))
            }
            Err(e) => Err(AutotagError::tag_creation(name, e.message())),
        }
    }

    #[instrument(skip(self))]
    fn push_tag(&self, name: &str, remote_name: &str) -> Result<()> {
        let mut remote = self
            .repo
            .find_remote(remote_name)
            .map_err(|e| {
                AutotagError::sync(remote_name, format!("cannot find remote: {}", e.message()))
            })?;

        let rejected: RefCell<Option<String>> = RefCell::new(None);
        let mut callbacks = self.remote_callbacks()?;
        callbacks.push_update_reference(|refname, status| {
            if let Some(status) = status {
                *rejected.borrow_mut() = Some(format!("{} rejected: {}", refname, status));
            }
            Ok(())
        });

        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(callbacks);

        let refspec = format!("refs/tags/{}:refs/tags/{}", name, name);
        remote
            .push(&[refspec.as_str()], Some(&mut push_options))
            .map_err(|e| AutotagError::sync(remote_name, format!("push failed: {}", e.message())))?;

        if let Some(reason) = rejected.borrow_mut().take() {
            return Err(AutotagError::sync(remote_name, reason));
        }

        info!(tag = name, remote = remote_name, "pushed tag");
        Ok(())
    }

    fn run_command(
        &self,
        command: &str,
        context: &HashMap<String, String>,
    ) -> Result<CommandOutput> {
        CommandExecutor::run(command, context, self.repo.workdir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::Repository;
    use tempfile::TempDir;

    #[test]
    fn test_open_rejects_plain_directory() {
        let dir = TempDir::new().unwrap();
        let err = Git2Repository::open(dir.path()).err().unwrap();
        assert!(err.to_string().contains("does not point to a git repository"));
    }

    #[test]
    fn test_discover_from_subdirectory() {
        let dir = TempDir::new().unwrap();
        Git2Repo::init(dir.path()).unwrap();
        let nested = dir.path().join("foo").join("bar").join("baz");
        std::fs::create_dir_all(&nested).unwrap();

        let repo = Git2Repository::discover(&nested).unwrap();
        assert_eq!(
            std::fs::canonicalize(repo.workdir().unwrap()).unwrap(),
            std::fs::canonicalize(dir.path()).unwrap()
        );
    }

    #[test]
    fn test_list_tags_empty_repository() {
        let dir = TempDir::new().unwrap();
        Git2Repo::init(dir.path()).unwrap();
        let repo = Git2Repository::open(dir.path()).unwrap();
        assert!(repo.list_tag_names().unwrap().is_empty());
    }
}
