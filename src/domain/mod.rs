//! Domain logic - pure versioning and templating rules independent of git operations

pub mod tag;
pub mod template;
pub mod version;

pub use tag::{MalformedTag, TagPattern, TagScan, TagSpec};
pub use template::{render_message, render_name, MessageTemplate, NameTemplate, Placeholder};
pub use version::{SemanticVersion, Step};
