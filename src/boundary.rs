use std::fmt;

/// Non-fatal findings while resolving the current version.
/// These are reported to the user but never stop a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundaryWarning {
    /// Tag matches the name template but its version cannot be read
    MalformedTag { tag: String, reason: String },
    /// The repository has tags, but none of them match the name template
    NoMatchingTags { template: String, tag_count: usize },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::MalformedTag { tag, reason } => {
                write!(f, "Skipping tag '{}': {}", tag, reason)
            }
            BoundaryWarning::NoMatchingTags {
                template,
                tag_count,
            } => {
                let noun = if *tag_count == 1 { "tag" } else { "tags" };
                write!(
                    f,
                    "No existing tag matches template '{}' ({} {} ignored); starting from 0.0.0",
                    template, tag_count, noun
                )
            }
        }
    }
}
