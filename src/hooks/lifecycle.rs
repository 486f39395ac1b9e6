use crate::domain::{SemanticVersion, Step};
use std::collections::HashMap;

/// Values available to the post-tag command, both as `{placeholder}`
/// substitutions and as `AUTOTAG_*` environment variables
#[derive(Debug, Clone)]
pub struct HookContext {
    /// Tag that was just created
    pub tag: String,
    /// Version of the created tag
    pub version: SemanticVersion,
    /// Highest version found before tagging, if any
    pub previous: Option<SemanticVersion>,
    pub step: Step,
    /// Remote used for pull/push
    pub remote: String,
}

impl HookContext {
    /// Placeholder map handed to `Repository::run_command`
    pub fn placeholders(&self) -> HashMap<String, String> {
        let mut ctx = HashMap::new();

        ctx.insert("tagname".to_string(), self.tag.clone());
        ctx.insert("major".to_string(), self.version.major.to_string());
        ctx.insert("minor".to_string(), self.version.minor.to_string());
        ctx.insert("patch".to_string(), self.version.patch.to_string());
        ctx.insert("version".to_string(), self.version.to_string());
        ctx.insert("step".to_string(), self.step.to_string());
        ctx.insert("remote".to_string(), self.remote.clone());

        if let Some(previous) = self.previous {
            ctx.insert("previous".to_string(), previous.to_string());
        }

        ctx
    }
}

/// Map placeholder keys to environment variables (`tagname` -> `AUTOTAG_TAGNAME`)
pub fn to_env_vars(context: &HashMap<String, String>) -> HashMap<String, String> {
    context
        .iter()
        .map(|(key, value)| {
            (
                format!("AUTOTAG_{}", key.to_ascii_uppercase().replace('-', "_")),
                value.clone(),
            )
        })
        .collect()
}
