use thiserror::Error;

/// Unified error type for git-autotag operations
#[derive(Error, Debug)]
pub enum AutotagError {
    #[error("Cannot parse tag '{tag}': {reason}")]
    Parse { tag: String, reason: String },

    #[error("Template error: {0}")]
    Template(String),

    #[error("Sync with remote '{remote}' failed: {reason}")]
    Sync { remote: String, reason: String },

    #[error("Tag '{0}' already exists")]
    TagExists(String),

    #[error("Failed to create tag '{name}': {reason}")]
    TagCreation { name: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in git-autotag
pub type Result<T> = std::result::Result<T, AutotagError>;

/// Coarse failure classes reported to the operator and mapped to exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Parse,
    Template,
    Sync,
    TagCreation,
    PostAction,
    Config,
    Repository,
}

impl FailureKind {
    pub fn name(&self) -> &'static str {
        match self {
            FailureKind::Parse => "ParseFailure",
            FailureKind::Template => "TemplateFailure",
            FailureKind::Sync => "SyncFailure",
            FailureKind::TagCreation => "TagCreationFailure",
            FailureKind::PostAction => "PostActionFailure",
            FailureKind::Config => "ConfigFailure",
            FailureKind::Repository => "RepositoryFailure",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl AutotagError {
    pub fn parse(tag: impl Into<String>, reason: impl Into<String>) -> Self {
        AutotagError::Parse {
            tag: tag.into(),
            reason: reason.into(),
        }
    }

    pub fn template(msg: impl Into<String>) -> Self {
        AutotagError::Template(msg.into())
    }

    pub fn sync(remote: impl Into<String>, reason: impl Into<String>) -> Self {
        AutotagError::Sync {
            remote: remote.into(),
            reason: reason.into(),
        }
    }

    pub fn tag_creation(name: impl Into<String>, reason: impl Into<String>) -> Self {
        AutotagError::TagCreation {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        AutotagError::Config(msg.into())
    }

    pub fn repository(msg: impl Into<String>) -> Self {
        AutotagError::Repository(msg.into())
    }

    /// Classify the error by its own variant.
    ///
    /// The workflow refines this by stage (an I/O error while pushing is still
    /// a sync failure), see `WorkflowFailure::kind`.
    pub fn kind(&self) -> FailureKind {
        match self {
            AutotagError::Parse { .. } => FailureKind::Parse,
            AutotagError::Template(_) => FailureKind::Template,
            AutotagError::Sync { .. } => FailureKind::Sync,
            AutotagError::TagExists(_) | AutotagError::TagCreation { .. } => {
                FailureKind::TagCreation
            }
            AutotagError::Config(_) => FailureKind::Config,
            AutotagError::Repository(_) | AutotagError::Git(_) | AutotagError::Io(_) => {
                FailureKind::Repository
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AutotagError::config("bad step");
        assert_eq!(err.to_string(), "Configuration error: bad step");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "sh not found");
        let err: AutotagError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
        assert_eq!(err.kind(), FailureKind::Repository);
    }

    #[test]
    fn test_tag_exists_is_tag_creation_failure() {
        let err = AutotagError::TagExists("1.3.0".to_string());
        assert_eq!(err.to_string(), "Tag '1.3.0' already exists");
        assert_eq!(err.kind(), FailureKind::TagCreation);
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (AutotagError::parse("v1.x.0", "x"), "Cannot parse tag 'v1.x.0'"),
            (AutotagError::template("x"), "Template error"),
            (AutotagError::sync("origin", "x"), "Sync with remote 'origin'"),
            (AutotagError::tag_creation("1.0.0", "x"), "Failed to create tag"),
            (AutotagError::repository("x"), "Repository error"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(AutotagError::template("x").kind().name(), "TemplateFailure");
        assert_eq!(AutotagError::sync("o", "x").kind().to_string(), "SyncFailure");
        assert_eq!(FailureKind::PostAction.name(), "PostActionFailure");
    }
}
