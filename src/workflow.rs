//! Tagging workflow orchestration
//!
//! One run is a linear pipeline:
//!
//! 1. validate templates (before any side effect)
//! 2. optional pull from the configured remote
//! 3. resolve the highest existing version and compute the next one
//! 4. render tag name and message
//! 5. create the annotated tag
//! 6. optional post-tag command
//! 7. optional push of the new tag
//!
//! Any failure stops the pipeline. Nothing already done is rolled back: a
//! pulled branch or a created tag stays as it is. A failing post-tag command
//! is the one non-fatal case, reported next to the created tag in
//! [`WorkflowReport`].

use crate::boundary::BoundaryWarning;
use crate::config::WorkflowConfig;
use crate::domain::{MessageTemplate, NameTemplate, SemanticVersion, Step, TagPattern, TagSpec};
use crate::error::{AutotagError, FailureKind};
use crate::git::Repository;
use crate::hooks::{CommandOutput, HookContext};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Pipeline stage, used to tell where a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Template,
    Pull,
    ListTags,
    CreateTag,
    Push,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Template => "template validation",
            Stage::Pull => "pull",
            Stage::ListTags => "listing tags",
            Stage::CreateTag => "tag creation",
            Stage::Push => "push",
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Stage::Template => FailureKind::Template,
            Stage::Pull | Stage::Push => FailureKind::Sync,
            Stage::ListTags => FailureKind::Repository,
            Stage::CreateTag => FailureKind::TagCreation,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fatal workflow failure with whatever had been computed when it happened
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct WorkflowFailure {
    pub stage: Stage,
    /// Highest version found before tagging, if resolution got that far
    pub previous: Option<SemanticVersion>,
    /// The tag the run tried to create, if it got that far
    pub attempted: Option<TagSpec>,
    #[source]
    pub source: AutotagError,
}

impl WorkflowFailure {
    fn new(stage: Stage, source: AutotagError) -> Self {
        WorkflowFailure {
            stage,
            previous: None,
            attempted: None,
            source,
        }
    }

    fn with_plan(stage: Stage, plan: &TagPlan, source: AutotagError) -> Self {
        WorkflowFailure {
            stage,
            previous: plan.previous,
            attempted: Some(plan.spec.clone()),
            source,
        }
    }

    pub fn kind(&self) -> FailureKind {
        self.stage.kind()
    }

    /// Whether the tag exists despite the failure (push after creation failed)
    pub fn tag_created(&self) -> bool {
        self.stage == Stage::Push
    }
}

/// The post-tag command failed after the tag was created
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("post-tag command `{command}` {reason} (tag '{tag}' was created)")]
pub struct PostActionFailure {
    pub tag: String,
    pub command: String,
    pub exit_code: Option<i32>,
    pub output: String,
    pub reason: String,
}

/// Everything needed to create the next tag, computed without side effects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPlan {
    pub spec: TagSpec,
    pub previous: Option<SemanticVersion>,
    pub step: Step,
    pub warnings: Vec<BoundaryWarning>,
}

/// Outcome of a run in which the tag was created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowReport {
    pub spec: TagSpec,
    pub previous: Option<SemanticVersion>,
    pub step: Step,
    pub warnings: Vec<BoundaryWarning>,
    /// Output of the post-tag command, if one ran
    pub post_action: Option<CommandOutput>,
    pub post_action_failure: Option<PostActionFailure>,
    pub pushed: bool,
}

impl WorkflowReport {
    /// True when every configured step succeeded
    pub fn is_complete(&self) -> bool {
        self.post_action_failure.is_none()
    }
}

struct CompiledTemplates {
    pattern: TagPattern,
    message: Option<MessageTemplate>,
}

/// Orchestrates one tagging run against a repository
pub struct TagWorkflow<'a, R: Repository> {
    config: &'a WorkflowConfig,
    repo: &'a R,
}

impl<'a, R: Repository> TagWorkflow<'a, R> {
    pub fn new(config: &'a WorkflowConfig, repo: &'a R) -> Self {
        TagWorkflow { config, repo }
    }

    /// Compute the next tag without touching the repository.
    ///
    /// No pull happens here, so the plan reflects local tags only.
    pub fn plan(&self, step: Step) -> Result<TagPlan, WorkflowFailure> {
        let templates = self.compile(step)?;
        self.resolve(&templates, step)
    }

    /// Run the full pipeline.
    #[instrument(skip(self), fields(remote = %self.config.remote_name))]
    pub fn run(&self, step: Step) -> Result<WorkflowReport, WorkflowFailure> {
        let config = self.config;
        let remote = config.remote_name.as_str();
        let templates = self.compile(step)?;

        if config.pull_before_tagging {
            info!("pulling before tagging");
            self.repo
                .pull(remote)
                .map_err(|e| WorkflowFailure::new(Stage::Pull, as_sync(remote, e)))?;
        }

        let plan = self.resolve(&templates, step)?;
        info!(
            previous = ?plan.previous.map(|v| v.to_string()),
            next = %plan.spec.version,
            tag = %plan.spec.name,
            "resolved next version"
        );

        self.repo
            .create_annotated_tag(&plan.spec.name, &plan.spec.message)
            .map_err(|e| {
                let source = as_tag_creation(&plan.spec.name, e);
                WorkflowFailure::with_plan(Stage::CreateTag, &plan, source)
            })?;

        let mut report = WorkflowReport {
            spec: plan.spec.clone(),
            previous: plan.previous,
            step,
            warnings: plan.warnings.clone(),
            post_action: None,
            post_action_failure: None,
            pushed: false,
        };

        if let Some(command) = &config.post_tag_action {
            let context = HookContext {
                tag: plan.spec.name.clone(),
                version: plan.spec.version,
                previous: plan.previous,
                step,
                remote: remote.to_string(),
            };

            let failure = match self.repo.run_command(command, &context.placeholders()) {
                Ok(output) if output.success() => {
                    debug!("post-tag command succeeded");
                    report.post_action = Some(output);
                    None
                }
                Ok(output) => {
                    let reason = match output.exit_code {
                        Some(code) => format!("exited with code {}", code),
                        None => "was terminated by a signal".to_string(),
                    };
                    let failure = PostActionFailure {
                        tag: plan.spec.name.clone(),
                        command: command.clone(),
                        exit_code: output.exit_code,
                        output: output.output.clone(),
                        reason,
                    };
                    report.post_action = Some(output);
                    Some(failure)
                }
                Err(e) => Some(PostActionFailure {
                    tag: plan.spec.name.clone(),
                    command: command.clone(),
                    exit_code: None,
                    output: String::new(),
                    reason: format!("could not be started: {}", e),
                }),
            };

            if let Some(failure) = failure {
                warn!(error = %failure, "post-tag command failed; skipping remaining steps");
                report.post_action_failure = Some(failure);
                return Ok(report);
            }
        }

        if config.push_after_tagging {
            self.repo
                .push_tag(&plan.spec.name, remote)
                .map_err(|e| WorkflowFailure::with_plan(Stage::Push, &plan, as_sync(remote, e)))?;
            report.pushed = true;
        }

        Ok(report)
    }

    fn compile(&self, step: Step) -> Result<CompiledTemplates, WorkflowFailure> {
        let template_failure = |e| WorkflowFailure::new(Stage::Template, e);

        let name = NameTemplate::parse(&self.config.tag_name_template).map_err(template_failure)?;
        if !name.supports(step) {
            return Err(template_failure(AutotagError::template(format!(
                "tag name template '{}' has no {{{}}} placeholder, \
                 a {} step would not change the tag name",
                name.source(),
                step,
                step
            ))));
        }
        let pattern = TagPattern::from_template(name).map_err(template_failure)?;

        // a literal --message replaces the template entirely
        let message = match self.config.message {
            Some(_) => None,
            None => Some(
                MessageTemplate::parse(&self.config.tag_message_template)
                    .map_err(template_failure)?,
            ),
        };

        Ok(CompiledTemplates { pattern, message })
    }

    fn resolve(
        &self,
        templates: &CompiledTemplates,
        step: Step,
    ) -> Result<TagPlan, WorkflowFailure> {
        let names = self
            .repo
            .list_tag_names()
            .map_err(|e| WorkflowFailure::new(Stage::ListTags, e))?;

        let scan = templates.pattern.scan(&names);
        let mut warnings: Vec<BoundaryWarning> = scan
            .malformed
            .iter()
            .map(|m| BoundaryWarning::MalformedTag {
                tag: m.tag.clone(),
                reason: m.reason.clone(),
            })
            .collect();
        if scan.highest.is_none() && !names.is_empty() {
            warnings.push(BoundaryWarning::NoMatchingTags {
                template: templates.pattern.template().source().to_string(),
                tag_count: names.len(),
            });
        }
        for warning in &warnings {
            warn!(%warning, "tag scan");
        }

        let version = SemanticVersion::next(scan.highest, step);
        let name = templates.pattern.template().render(version);
        let message = match (&self.config.message, &templates.message) {
            (Some(literal), _) => literal.clone(),
            (None, Some(template)) => template.render(version, &name),
            (None, None) => String::new(),
        };

        Ok(TagPlan {
            spec: TagSpec {
                name,
                message,
                version,
            },
            previous: scan.highest,
            step,
            warnings,
        })
    }
}

/// Run one tagging workflow; see [`TagWorkflow::run`].
pub fn run<R: Repository>(
    config: &WorkflowConfig,
    step: Step,
    repo: &R,
) -> Result<WorkflowReport, WorkflowFailure> {
    TagWorkflow::new(config, repo).run(step)
}

fn as_sync(remote: &str, e: AutotagError) -> AutotagError {
    match e {
        AutotagError::Sync { .. } => e,
        other => AutotagError::sync(remote, other.to_string()),
    }
}

fn as_tag_creation(name: &str, e: AutotagError) -> AutotagError {
    match e {
        AutotagError::TagExists(_) | AutotagError::TagCreation { .. } => e,
        other => AutotagError::tag_creation(name, other.to_string()),
    }
}
