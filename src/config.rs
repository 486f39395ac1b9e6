use crate::domain::Step;
use crate::error::{AutotagError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Section name in both the toml file and git config
pub const SECTION: &str = "autotag";

/// Repository-local configuration file name
pub const LOCAL_CONFIG_FILE: &str = ".autotag.toml";

pub const DEFAULT_TAG_NAME_TEMPLATE: &str = "{major}.{minor}.{patch}";
pub const DEFAULT_TAG_MESSAGE_TEMPLATE: &str = "Release {tagname}";
pub const DEFAULT_REMOTE_NAME: &str = "origin";

/// Fully resolved configuration for one tagging run.
///
/// Built once from defaults, the config file, git config and command line,
/// then handed read-only to the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowConfig {
    pub tag_name_template: String,
    pub tag_message_template: String,
    /// Shell command run after the tag was created
    pub post_tag_action: Option<String>,
    pub pull_before_tagging: bool,
    pub push_after_tagging: bool,
    pub remote_name: String,
    /// Step used when the invocation does not imply one
    pub step: Step,
    /// Literal tag message replacing the rendered template (`--message`)
    pub message: Option<String>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        WorkflowConfig {
            tag_name_template: DEFAULT_TAG_NAME_TEMPLATE.to_string(),
            tag_message_template: DEFAULT_TAG_MESSAGE_TEMPLATE.to_string(),
            post_tag_action: None,
            pull_before_tagging: false,
            push_after_tagging: false,
            remote_name: DEFAULT_REMOTE_NAME.to_string(),
            step: Step::default(),
            message: None,
        }
    }
}

/// One configuration source; unset keys fall through to lower layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    pub tagname_template: Option<String>,
    pub tagmessage_template: Option<String>,
    pub posttagaction: Option<String>,
    pub pull_before_tagging: Option<bool>,
    pub push_after_tagging: Option<bool>,
    pub remote_name: Option<String>,
    pub step: Option<Step>,
    #[serde(skip)]
    pub message: Option<String>,
}

/// Layout of the toml configuration file
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    autotag: ConfigLayer,
}

impl ConfigLayer {
    /// Parse the `[autotag]` table of a toml document
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)
            .map_err(|e| AutotagError::config(format!("invalid config file: {}", e)))?;
        Ok(file.autotag)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AutotagError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Read `autotag.*` keys from git config.
    ///
    /// git config variable names cannot contain `_`, so keys are spelled with
    /// hyphens there (`autotag.pull-before-tagging`).
    pub fn from_git_config(config: &git2::Config) -> Result<Self> {
        let get = |key: &str| -> Result<Option<String>> {
            match config.get_string(&format!("{}.{}", SECTION, key)) {
                Ok(value) => Ok(Some(value)),
                Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
                Err(e) => Err(AutotagError::config(format!(
                    "cannot read git config {}.{}: {}",
                    SECTION,
                    key,
                    e.message()
                ))),
            }
        };

        Ok(ConfigLayer {
            tagname_template: get("tagname-template")?,
            tagmessage_template: get("tagmessage-template")?,
            posttagaction: get("posttagaction")?,
            pull_before_tagging: get("pull-before-tagging")?.map(|v| to_bool(&v)),
            push_after_tagging: get("push-after-tagging")?.map(|v| to_bool(&v)),
            remote_name: get("remote-name")?,
            step: get("step")?.map(|v| v.parse()).transpose()?,
            message: None,
        })
    }

    /// Overlay `other` on top of `self`; set keys in `other` win.
    pub fn merge(self, other: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            tagname_template: other.tagname_template.or(self.tagname_template),
            tagmessage_template: other.tagmessage_template.or(self.tagmessage_template),
            posttagaction: other.posttagaction.or(self.posttagaction),
            pull_before_tagging: other.pull_before_tagging.or(self.pull_before_tagging),
            push_after_tagging: other.push_after_tagging.or(self.push_after_tagging),
            remote_name: other.remote_name.or(self.remote_name),
            step: other.step.or(self.step),
            message: other.message.or(self.message),
        }
    }

    /// Fill unset keys with the built-in defaults
    pub fn resolve(self) -> WorkflowConfig {
        let defaults = WorkflowConfig::default();
        WorkflowConfig {
            tag_name_template: self.tagname_template.unwrap_or(defaults.tag_name_template),
            tag_message_template: self
                .tagmessage_template
                .unwrap_or(defaults.tag_message_template),
            post_tag_action: self.posttagaction.filter(|cmd| !cmd.trim().is_empty()),
            pull_before_tagging: self.pull_before_tagging.unwrap_or(defaults.pull_before_tagging),
            push_after_tagging: self.push_after_tagging.unwrap_or(defaults.push_after_tagging),
            remote_name: self.remote_name.unwrap_or(defaults.remote_name),
            step: self.step.unwrap_or(defaults.step),
            message: self.message,
        }
    }
}

/// Interpret a git config style boolean; anything unrecognized is false.
pub fn to_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "y"
    )
}

/// Locate the toml configuration file.
///
/// Order:
/// 1. Explicit path (must exist)
/// 2. `.autotag.toml` in the repository work tree
/// 3. `git-autotag/config.toml` in the user config directory
pub fn find_config_file(
    explicit: Option<&Path>,
    workdir: Option<&Path>,
) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(AutotagError::config(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        return Ok(Some(path.to_path_buf()));
    }

    if let Some(dir) = workdir {
        let local = dir.join(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Ok(Some(local));
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let user = config_dir.join("git-autotag").join("config.toml");
        if user.is_file() {
            return Ok(Some(user));
        }
    }

    Ok(None)
}

/// Resolve the configuration for a repository.
///
/// Precedence, lowest to highest: defaults, toml file, git config, `overrides`.
pub fn load_config(
    repo: &git2::Repository,
    config_path: Option<&Path>,
    overrides: ConfigLayer,
) -> Result<WorkflowConfig> {
    let mut layer = ConfigLayer::default();

    if let Some(path) = find_config_file(config_path, repo.workdir())? {
        debug!(path = %path.display(), "reading config file");
        layer = layer.merge(ConfigLayer::from_file(&path)?);
    }

    let git_config = repo.config()?;
    layer = layer.merge(ConfigLayer::from_git_config(&git_config)?);

    let config = layer.merge(overrides).resolve();
    debug!(?config, "resolved configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorkflowConfig::default();
        assert_eq!(config.tag_name_template, "{major}.{minor}.{patch}");
        assert_eq!(config.tag_message_template, "Release {tagname}");
        assert_eq!(config.post_tag_action, None);
        assert!(!config.pull_before_tagging);
        assert!(!config.push_after_tagging);
        assert_eq!(config.remote_name, "origin");
        assert_eq!(config.step, Step::Minor);
    }

    #[test]
    fn test_to_bool() {
        for v in ["tRue", "True", "true", "1", "yes", "YeS", " y "] {
            assert!(to_bool(v), "{} should be true", v);
        }
        for v in ["", "foobar", "0", "false", "no", "yesandno"] {
            assert!(!to_bool(v), "{} should be false", v);
        }
    }

    #[test]
    fn test_merge_precedence() {
        let low = ConfigLayer {
            remote_name: Some("upstream".to_string()),
            step: Some(Step::Patch),
            ..Default::default()
        };
        let high = ConfigLayer {
            step: Some(Step::Major),
            ..Default::default()
        };
        let config = low.merge(high).resolve();
        assert_eq!(config.remote_name, "upstream");
        assert_eq!(config.step, Step::Major);
    }

    #[test]
    fn test_from_toml() {
        let layer = ConfigLayer::from_toml(
            r#"
[autotag]
tagname_template = "v{major}.{minor}.{patch}"
push_after_tagging = true
step = "patch"
"#,
        )
        .unwrap();
        assert_eq!(layer.tagname_template.as_deref(), Some("v{major}.{minor}.{patch}"));
        assert_eq!(layer.push_after_tagging, Some(true));
        assert_eq!(layer.step, Some(Step::Patch));
        assert_eq!(layer.remote_name, None);
    }

    #[test]
    fn test_from_toml_rejects_unknown_keys() {
        assert!(ConfigLayer::from_toml("[autotag]\ntag_template = \"x\"\n").is_err());
        assert!(ConfigLayer::from_toml("[autotag]\nstep = \"build\"\n").is_err());
    }

    #[test]
    fn test_empty_posttagaction_is_unset() {
        let layer = ConfigLayer {
            posttagaction: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(layer.resolve().post_tag_action, None);
    }
}
