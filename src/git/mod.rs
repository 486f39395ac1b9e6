//! Git operations abstraction layer
//!
//! The tagging workflow only talks to the repository through the
//! [Repository] trait. Implementations:
//!
//! - [repository::Git2Repository]: a real repository backed by the `git2` crate
//! - [mock::MockRepository]: an in-memory repository for tests
//!
//! ```rust
//! # use git_autotag::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> git_autotag::Result<()> {
//! let tags = repo.list_tag_names()?;
//! println!("{} tags", tags.len());
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;
use crate::hooks::CommandOutput;
use std::collections::HashMap;

/// Repository operations the tagging workflow depends on
///
/// Every call is synchronous and treated as atomic by the caller; timeouts
/// and retries, if any, are the implementation's business.
pub trait Repository {
    /// All tag names in the repository, in no particular order.
    fn list_tag_names(&self) -> Result<Vec<String>>;

    /// Bring local state up to date with `remote`.
    ///
    /// # Returns
    /// * `Err(AutotagError::Sync)` on network, authentication or merge problems
    fn pull(&self, remote: &str) -> Result<()>;

    /// Create an annotated tag on the current HEAD commit.
    ///
    /// # Returns
    /// * `Err(AutotagError::TagExists)` if a tag with that name already exists;
    ///   an existing tag is never overwritten
    /// * `Err` for any other failure
    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()>;

    /// Push a single tag to `remote`.
    fn push_tag(&self, name: &str, remote: &str) -> Result<()>;

    /// Run a user configured command with `{key}` placeholders from `context`
    /// substituted into it.
    ///
    /// A non-zero exit is reported through [CommandOutput], not as `Err`.
    fn run_command(&self, command: &str, context: &HashMap<String, String>)
        -> Result<CommandOutput>;
}
