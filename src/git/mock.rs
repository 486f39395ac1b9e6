use crate::domain::template::substitute;
use crate::error::{AutotagError, Result};
use crate::git::Repository;
use crate::hooks::CommandOutput;
use std::cell::RefCell;
use std::collections::HashMap;

/// A call observed by [MockRepository], in the order it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListTagNames,
    Pull { remote: String },
    CreateAnnotatedTag { name: String, message: String },
    PushTag { name: String, remote: String },
    /// `command` is recorded after placeholder substitution
    RunCommand { command: String },
}

/// Mock repository for testing without actual git operations
#[derive(Debug)]
pub struct MockRepository {
    tags: RefCell<Vec<String>>,
    unlisted: Vec<String>,
    messages: RefCell<HashMap<String, String>>,
    calls: RefCell<Vec<Call>>,
    pull_error: Option<String>,
    push_error: Option<String>,
    create_error: Option<String>,
    command_exit_code: Option<i32>,
    command_output: String,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        MockRepository {
            tags: RefCell::new(Vec::new()),
            unlisted: Vec::new(),
            messages: RefCell::new(HashMap::new()),
            calls: RefCell::new(Vec::new()),
            pull_error: None,
            push_error: None,
            create_error: None,
            command_exit_code: Some(0),
            command_output: String::new(),
        }
    }

    /// Create a mock repository that already holds `tags`
    pub fn with_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let repo = Self::new();
        repo.tags
            .borrow_mut()
            .extend(tags.into_iter().map(Into::into));
        repo
    }

    /// Tags that exist but are not listed, as if another process created
    /// them after the listing
    pub fn with_unlisted_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unlisted.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Make `pull` fail with a sync error
    pub fn fail_pull(mut self, reason: impl Into<String>) -> Self {
        self.pull_error = Some(reason.into());
        self
    }

    /// Make `push_tag` fail with a sync error
    pub fn fail_push(mut self, reason: impl Into<String>) -> Self {
        self.push_error = Some(reason.into());
        self
    }

    /// Make `create_annotated_tag` fail with a non-collision error
    pub fn fail_create(mut self, reason: impl Into<String>) -> Self {
        self.create_error = Some(reason.into());
        self
    }

    /// Exit code and output every `run_command` reports
    pub fn command_result(mut self, exit_code: Option<i32>, output: impl Into<String>) -> Self {
        self.command_exit_code = exit_code;
        self.command_output = output.into();
        self
    }

    pub fn tags(&self) -> Vec<String> {
        self.tags.borrow().clone()
    }

    /// Message of a tag created through this mock
    pub fn tag_message(&self, name: &str) -> Option<String> {
        self.messages.borrow().get(name).cloned()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn list_tag_names(&self) -> Result<Vec<String>> {
        self.record(Call::ListTagNames);
        Ok(self.tags())
    }

    fn pull(&self, remote: &str) -> Result<()> {
        self.record(Call::Pull {
            remote: remote.to_string(),
        });
        match &self.pull_error {
            Some(reason) => Err(AutotagError::sync(remote, reason.clone())),
            None => Ok(()),
        }
    }

    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()> {
        self.record(Call::CreateAnnotatedTag {
            name: name.to_string(),
            message: message.to_string(),
        });
        if self.tags.borrow().iter().chain(&self.unlisted).any(|t| t == name) {
            return Err(AutotagError::TagExists(name.to_string()));
        }
        if let Some(reason) = &self.create_error {
            return Err(AutotagError::tag_creation(name, reason.clone()));
        }
        self.tags.borrow_mut().push(name.to_string());
        self.messages
            .borrow_mut()
            .insert(name.to_string(), message.to_string());
        Ok(())
    }

    fn push_tag(&self, name: &str, remote: &str) -> Result<()> {
        self.record(Call::PushTag {
            name: name.to_string(),
            remote: remote.to_string(),
        });
        match &self.push_error {
            Some(reason) => Err(AutotagError::sync(remote, reason.clone())),
            None => Ok(()),
        }
    }

    fn run_command(
        &self,
        command: &str,
        context: &HashMap<String, String>,
    ) -> Result<CommandOutput> {
        self.record(Call::RunCommand {
            command: substitute(command, context),
        });
        Ok(CommandOutput {
            exit_code: self.command_exit_code,
            output: self.command_output.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_repository_default() {
        let repo = MockRepository::default();
        assert!(repo.list_tag_names().unwrap().is_empty());
    }

    #[test]
    fn test_mock_repository_list_tags() {
        let repo = MockRepository::with_tags(["v1.0.0", "v2.0.0"]);
        let tags = repo.list_tag_names().unwrap();
        assert_eq!(tags.len(), 2);
        assert!(tags.contains(&"v1.0.0".to_string()));
    }

    #[test]
    fn test_mock_repository_refuses_existing_tag() {
        let repo = MockRepository::with_tags(["1.0.0"]);
        let err = repo.create_annotated_tag("1.0.0", "again").unwrap_err();
        assert!(matches!(err, AutotagError::TagExists(_)));
        assert_eq!(repo.tags(), vec!["1.0.0".to_string()]);
    }

    #[test]
    fn test_mock_repository_records_calls() {
        let repo = MockRepository::new();
        repo.pull("origin").unwrap();
        repo.create_annotated_tag("0.1.0", "Release 0.1.0").unwrap();
        repo.push_tag("0.1.0", "origin").unwrap();

        assert_eq!(
            repo.calls(),
            vec![
                Call::Pull {
                    remote: "origin".to_string()
                },
                Call::CreateAnnotatedTag {
                    name: "0.1.0".to_string(),
                    message: "Release 0.1.0".to_string()
                },
                Call::PushTag {
                    name: "0.1.0".to_string(),
                    remote: "origin".to_string()
                },
            ]
        );
        assert_eq!(repo.tag_message("0.1.0").as_deref(), Some("Release 0.1.0"));
    }

    #[test]
    fn test_mock_repository_injected_failures() {
        let repo = MockRepository::new().fail_pull("offline").fail_push("rejected");
        assert!(matches!(repo.pull("origin"), Err(AutotagError::Sync { .. })));
        assert!(matches!(
            repo.push_tag("1.0.0", "origin"),
            Err(AutotagError::Sync { .. })
        ));
    }
}
