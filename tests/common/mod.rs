// tests/common/mod.rs
#![allow(dead_code)]

use git2::{Oid, Repository, Signature};
use std::path::Path;
use tempfile::TempDir;

/// Fresh non-bare repository with a committer identity configured
pub fn init_repo() -> (TempDir, Repository) {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    configure_identity(&repo);
    (dir, repo)
}

pub fn configure_identity(repo: &Repository) {
    let mut config = repo.config().unwrap();
    config.set_str("user.name", "Autotag Test").unwrap();
    config.set_str("user.email", "autotag@example.com").unwrap();
}

/// Commit the current index on HEAD
pub fn commit(repo: &Repository, message: &str) -> Oid {
    let sig = Signature::now("Autotag Test", "autotag@example.com").unwrap();
    let tree_id = repo.index().unwrap().write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap()
}

/// Lightweight tag on HEAD
pub fn lightweight_tag(repo: &Repository, name: &str) {
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    repo.tag_lightweight(name, head.as_object(), false).unwrap();
}

pub fn tag_names(repo: &Repository) -> Vec<String> {
    let mut names: Vec<String> = repo
        .tag_names(None)
        .unwrap()
        .iter()
        .flatten()
        .map(|s| s.to_string())
        .collect();
    names.sort();
    names
}

pub fn path_url(path: &Path) -> String {
    path.to_str().unwrap().to_string()
}
