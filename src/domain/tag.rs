use crate::domain::template::{NameTemplate, Placeholder, Segment};
use crate::domain::version::SemanticVersion;
use crate::error::{AutotagError, Result};
use regex::Regex;
use std::fmt;

/// The tag a workflow run creates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSpec {
    pub name: String,
    pub message: String,
    pub version: SemanticVersion,
}

impl fmt::Display for TagSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.version)
    }
}

/// A tag that matched the name template but could not be turned into a version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedTag {
    pub tag: String,
    pub reason: String,
}

/// Result of scanning a repository's tag names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagScan {
    pub highest: Option<SemanticVersion>,
    /// Number of tags that parsed cleanly
    pub matched: usize,
    pub malformed: Vec<MalformedTag>,
}

/// Matcher derived from a tag name template (e.g. "v{major}.{minor}.{patch}")
#[derive(Debug, Clone)]
pub struct TagPattern {
    template: NameTemplate,
    regex: Regex,
}

impl TagPattern {
    /// Compile a matcher for a name template.
    ///
    /// Literal segments are escaped, each placeholder becomes a named digit
    /// group, and the whole pattern is anchored at both ends.
    pub fn new(name_template: &str) -> Result<Self> {
        let template = NameTemplate::parse(name_template)?;
        Self::from_template(template)
    }

    pub fn from_template(template: NameTemplate) -> Result<Self> {
        let mut pattern = String::from("^");
        for segment in template.template().segments() {
            match segment {
                Segment::Literal(text) => pattern.push_str(&regex::escape(text)),
                Segment::Placeholder(p) => {
                    pattern.push_str(&format!("(?P<{}>[0-9]+)", p.name()));
                }
            }
        }
        pattern.push('$');

        let regex = Regex::new(&pattern).map_err(|e| {
            AutotagError::template(format!(
                "cannot build matcher for '{}': {}",
                template.source(),
                e
            ))
        })?;

        Ok(TagPattern { template, regex })
    }

    pub fn template(&self) -> &NameTemplate {
        &self.template
    }

    pub fn matches(&self, tag: &str) -> bool {
        self.regex.is_match(tag)
    }

    /// Extract the version from a tag name.
    ///
    /// Components missing from the template read as 0.
    pub fn parse(&self, tag: &str) -> Result<SemanticVersion> {
        let captures = self.regex.captures(tag).ok_or_else(|| {
            AutotagError::parse(
                tag,
                format!("does not match template '{}'", self.template.source()),
            )
        })?;

        let field = |p: Placeholder| -> Result<u64> {
            match captures.name(p.name()) {
                Some(m) => m.as_str().parse::<u64>().map_err(|e| {
                    let reason = format!("invalid {} '{}': {}", p.name(), m.as_str(), e);
                    AutotagError::parse(tag, reason)
                }),
                None => Ok(0),
            }
        };

        Ok(SemanticVersion::new(
            field(Placeholder::Major)?,
            field(Placeholder::Minor)?,
            field(Placeholder::Patch)?,
        ))
    }

    /// Parse every name, skipping the ones that do not match and recording
    /// the ones that match but are malformed.
    pub fn scan<I, S>(&self, tag_names: I) -> TagScan
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut scan = TagScan::default();
        for name in tag_names {
            let name = name.as_ref();
            if !self.matches(name) {
                continue;
            }
            match self.parse(name) {
                Ok(version) => {
                    scan.matched += 1;
                    scan.highest = scan.highest.max(Some(version));
                }
                Err(e) => scan.malformed.push(MalformedTag {
                    tag: name.to_string(),
                    reason: e.to_string(),
                }),
            }
        }
        scan
    }

    /// Highest version among the tag names, `None` if nothing matches.
    pub fn highest_version<I, S>(&self, tag_names: I) -> Option<SemanticVersion>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.scan(tag_names).highest
    }
}

/// Parse a single tag name against a name template.
pub fn parse(tag_name: &str, name_template: &str) -> Result<SemanticVersion> {
    TagPattern::new(name_template)?.parse(tag_name)
}

/// Highest version among `tag_names` for a name template.
pub fn highest_version<I, S>(tag_names: I, name_template: &str) -> Result<Option<SemanticVersion>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Ok(TagPattern::new(name_template)?.highest_version(tag_names))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::template::render_name;

    #[test]
    fn test_parse_plain() {
        assert_eq!(
            parse("0.0.1", "{major}.{minor}.{patch}").unwrap(),
            SemanticVersion::new(0, 0, 1)
        );
    }

    #[test]
    fn test_parse_with_literals() {
        for (template, tag, expected) in [
            ("V{major}.{minor}.{patch}", "V0.1.2", (0, 1, 2)),
            ("{major}_{minor}:{patch}", "0_1:2", (0, 1, 2)),
            ("release-{major}.{minor}", "release-3.14", (3, 14, 0)),
            ("{major}", "12", (12, 0, 0)),
        ] {
            let v = parse(tag, template).unwrap();
            assert_eq!((v.major, v.minor, v.patch), expected, "{} / {}", template, tag);
        }
    }

    #[test]
    fn test_parse_is_anchored() {
        let pattern = TagPattern::new("{major}.{minor}.{patch}").unwrap();
        assert!(pattern.parse("v1.2.3").is_err());
        assert!(pattern.parse("1.2.3-rc1").is_err());
        assert!(pattern.parse("1.2").is_err());
        assert!(pattern.parse("1.2.3.4").is_err());
    }

    #[test]
    fn test_dot_is_literal() {
        let pattern = TagPattern::new("{major}.{minor}.{patch}").unwrap();
        assert!(pattern.parse("1x2x3").is_err());
    }

    #[test]
    fn test_overflowing_component_is_parse_failure() {
        let err = parse("99999999999999999999999.0.0", "{major}.{minor}.{patch}").unwrap_err();
        assert!(matches!(err, AutotagError::Parse { .. }));
    }

    #[test]
    fn test_render_parse_round_trip() {
        for template in [
            "{major}.{minor}.{patch}",
            "v{major}.{minor}.{patch}",
            "r{major}-{minor}_{patch}x",
        ] {
            for v in [
                SemanticVersion::new(0, 0, 0),
                SemanticVersion::new(1, 2, 3),
                SemanticVersion::new(10, 0, 42),
            ] {
                let name = render_name(v, template).unwrap();
                assert_eq!(parse(&name, template).unwrap(), v);
            }
        }
    }

    #[test]
    fn test_highest_version_skips_noise() {
        let names = ["v1.0.0", "v1.1.0", "1.2.0", "random"];
        assert_eq!(
            highest_version(names, "{major}.{minor}.{patch}").unwrap(),
            Some(SemanticVersion::new(1, 2, 0))
        );
    }

    #[test]
    fn test_highest_version_orders_numerically() {
        let names = ["0.0.0", "0.0.1", "0.1.1", "0.0.2", "1.0.1", "1.0.0", "foobar", "0.10.0"];
        assert_eq!(
            highest_version(names, "{major}.{minor}.{patch}").unwrap(),
            Some(SemanticVersion::new(1, 0, 1))
        );
    }

    #[test]
    fn test_highest_version_none() {
        let empty: Vec<String> = Vec::new();
        assert_eq!(highest_version(empty, "{major}.{minor}.{patch}").unwrap(), None);
        assert_eq!(
            highest_version(["latest", "stable"], "{major}.{minor}.{patch}").unwrap(),
            None
        );
    }

    #[test]
    fn test_scan_reports_malformed() {
        let pattern = TagPattern::new("{major}.{minor}.{patch}").unwrap();
        let scan = pattern.scan(["1.0.0", "99999999999999999999999.0.0", "nope"]);
        assert_eq!(scan.highest, Some(SemanticVersion::new(1, 0, 0)));
        assert_eq!(scan.matched, 1);
        assert_eq!(scan.malformed.len(), 1);
        assert_eq!(scan.malformed[0].tag, "99999999999999999999999.0.0");
    }

    #[test]
    fn test_invalid_template_is_template_error() {
        assert!(matches!(
            TagPattern::new("{major}.{foo}"),
            Err(AutotagError::Template(_))
        ));
    }
}
