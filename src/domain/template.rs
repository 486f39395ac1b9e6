//! Tag name and tag message templates.
//!
//! Templates are tokenized once into literal and placeholder segments. The same
//! segment list drives rendering and, for tag names, the inverse direction
//! (see [`crate::domain::tag::TagPattern`]).

use crate::domain::version::{SemanticVersion, Step};
use crate::error::{AutotagError, Result};
use std::collections::HashMap;
use std::fmt;

/// A named placeholder recognized inside `{...}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    Major,
    Minor,
    Patch,
    TagName,
}

impl Placeholder {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "major" => Some(Placeholder::Major),
            "minor" => Some(Placeholder::Minor),
            "patch" => Some(Placeholder::Patch),
            "tagname" => Some(Placeholder::TagName),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Placeholder::Major => "major",
            Placeholder::Minor => "minor",
            Placeholder::Patch => "patch",
            Placeholder::TagName => "tagname",
        }
    }

    /// The version component this placeholder stands for, if any.
    pub fn step(&self) -> Option<Step> {
        match self {
            Placeholder::Major => Some(Step::Major),
            Placeholder::Minor => Some(Step::Minor),
            Placeholder::Patch => Some(Step::Patch),
            Placeholder::TagName => None,
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

/// A tokenized template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Tokenize a template string.
    ///
    /// `{{` and `}}` produce literal braces. Any other brace must be part of a
    /// `{name}` placeholder with a recognized name.
    pub fn parse(source: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for n in chars.by_ref() {
                        if n == '}' {
                            closed = true;
                            break;
                        }
                        name.push(n);
                    }
                    if !closed {
                        return Err(AutotagError::template(format!(
                            "unterminated placeholder '{{{}' in template '{}'",
                            name, source
                        )));
                    }
                    let placeholder = Placeholder::from_name(&name).ok_or_else(|| {
                        AutotagError::template(format!(
                            "unknown placeholder '{{{}}}' in template '{}'",
                            name, source
                        ))
                    })?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(placeholder));
                }
                '}' => {
                    return Err(AutotagError::template(format!(
                        "unmatched '}}' in template '{}'",
                        source
                    )));
                }
                other => literal.push(other),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Template {
            source: source.to_string(),
            segments,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn placeholders(&self) -> impl Iterator<Item = Placeholder> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(p) => Some(*p),
            Segment::Literal(_) => None,
        })
    }

    /// Render against a version. `{tagname}` expands to `tag_name`.
    fn render_with(&self, version: SemanticVersion, tag_name: &str) -> String {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            let text = match segment {
                Segment::Literal(text) => text.clone(),
                Segment::Placeholder(Placeholder::Major) => version.major.to_string(),
                Segment::Placeholder(Placeholder::Minor) => version.minor.to_string(),
                Segment::Placeholder(Placeholder::Patch) => version.patch.to_string(),
                Segment::Placeholder(Placeholder::TagName) => tag_name.to_string(),
            };
            out.push_str(&text);
        }
        out
    }
}

fn is_allowed_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | ':' | ',' | '_' | '-')
}

/// A validated tag name template.
///
/// Beyond tokenizing, a name template has to be invertible: the version is read
/// back out of existing tag names with the same template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTemplate {
    template: Template,
}

impl NameTemplate {
    pub fn parse(source: &str) -> Result<Self> {
        if source.is_empty() {
            return Err(AutotagError::template("empty tag name template"));
        }

        let template = Template::parse(source)?;
        let mut seen: Vec<Placeholder> = Vec::new();
        let mut previous_was_placeholder = false;

        for segment in template.segments() {
            match segment {
                Segment::Literal(text) => {
                    if let Some(c) = text.chars().find(|c| !is_allowed_name_char(*c)) {
                        return Err(AutotagError::template(format!(
                            "illegal character '{}' in tag name template '{}'",
                            c, source
                        )));
                    }
                    previous_was_placeholder = false;
                }
                Segment::Placeholder(Placeholder::TagName) => {
                    return Err(AutotagError::template(format!(
                        "{{tagname}} cannot be used in the tag name template '{}'",
                        source
                    )));
                }
                Segment::Placeholder(p) => {
                    if seen.contains(p) {
                        return Err(AutotagError::template(format!(
                            "placeholder {} appears more than once in '{}'",
                            p, source
                        )));
                    }
                    if previous_was_placeholder {
                        return Err(AutotagError::template(format!(
                            "placeholders in '{}' must be separated by literal text",
                            source
                        )));
                    }
                    seen.push(*p);
                    previous_was_placeholder = true;
                }
            }
        }

        // a digit next to a placeholder would be swallowed by its number
        for pair in template.segments().windows(2) {
            let touching_digit = match pair {
                [Segment::Placeholder(_), Segment::Literal(text)] => {
                    text.starts_with(|c: char| c.is_ascii_digit())
                }
                [Segment::Literal(text), Segment::Placeholder(_)] => {
                    text.ends_with(|c: char| c.is_ascii_digit())
                }
                _ => false,
            };
            if touching_digit {
                return Err(AutotagError::template(format!(
                    "a digit next to a placeholder in '{}' makes the version ambiguous",
                    source
                )));
            }
        }

        let has = |p: Placeholder| seen.contains(&p);
        if !has(Placeholder::Major) {
            return Err(AutotagError::template(format!(
                "tag name template '{}' must contain {{major}}",
                source
            )));
        }
        if has(Placeholder::Patch) && !has(Placeholder::Minor) {
            return Err(AutotagError::template(format!(
                "tag name template '{}' uses {{patch}} without {{minor}}",
                source
            )));
        }

        Ok(NameTemplate { template })
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn source(&self) -> &str {
        self.template.source()
    }

    /// Whether a bump of `step` shows up in the rendered name.
    pub fn supports(&self, step: Step) -> bool {
        self.template.placeholders().any(|p| p.step() == Some(step))
    }

    pub fn render(&self, version: SemanticVersion) -> String {
        // parse rejects {tagname}
        self.template.render_with(version, "")
    }
}

/// A tag message template; may reference `{tagname}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    template: Template,
}

impl MessageTemplate {
    pub fn parse(source: &str) -> Result<Self> {
        Ok(MessageTemplate {
            template: Template::parse(source)?,
        })
    }

    pub fn render(&self, version: SemanticVersion, tag_name: &str) -> String {
        self.template.render_with(version, tag_name)
    }
}

/// Render a tag name from its template.
pub fn render_name(version: SemanticVersion, name_template: &str) -> Result<String> {
    Ok(NameTemplate::parse(name_template)?.render(version))
}

/// Render a tag message; `{tagname}` expands to the already rendered name.
pub fn render_message(
    version: SemanticVersion,
    tag_name: &str,
    message_template: &str,
) -> Result<String> {
    Ok(MessageTemplate::parse(message_template)?.render(version, tag_name))
}

/// Replace `{key}` occurrences whose key is present in `context`.
///
/// Unlike template rendering this is lenient: unknown braces are kept verbatim,
/// since shell commands use braces for their own syntax.
pub fn substitute(text: &str, context: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => match context.get(&after[..end]) {
                Some(value) => {
                    out.push_str(value);
                    rest = &after[end + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            },
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_segments() {
        let t = Template::parse("v{major}.{minor}").unwrap();
        assert_eq!(
            t.segments(),
            &[
                Segment::Literal("v".to_string()),
                Segment::Placeholder(Placeholder::Major),
                Segment::Literal(".".to_string()),
                Segment::Placeholder(Placeholder::Minor),
            ]
        );
    }

    #[test]
    fn test_escaped_braces() {
        let t = Template::parse("{{{tagname}}}").unwrap();
        assert_eq!(
            t.segments(),
            &[
                Segment::Literal("{".to_string()),
                Segment::Placeholder(Placeholder::TagName),
                Segment::Literal("}".to_string()),
            ]
        );
    }

    #[test]
    fn test_unknown_placeholder_fails() {
        let err = render_name(SemanticVersion::new(1, 0, 0), "{major}.{foo}").unwrap_err();
        assert!(err.to_string().contains("unknown placeholder '{foo}'"));
        assert!(render_message(SemanticVersion::new(1, 0, 0), "1.0.0", "Release {name}").is_err());
    }

    #[test]
    fn test_unbalanced_braces_fail() {
        assert!(Template::parse("Release {tagname").is_err());
        assert!(Template::parse("Release }").is_err());
        assert!(Template::parse("{}").is_err());
    }

    #[test]
    fn test_render_name() {
        let v = SemanticVersion::new(1, 3, 0);
        assert_eq!(render_name(v, "{major}.{minor}.{patch}").unwrap(), "1.3.0");
        assert_eq!(render_name(v, "V{major}_{minor}:{patch}").unwrap(), "V1_3:0");
        assert_eq!(render_name(v, "{major}.{minor}").unwrap(), "1.3");
    }

    #[test]
    fn test_render_message() {
        let v = SemanticVersion::new(1, 2, 3);
        assert_eq!(
            render_message(v, "1.2.3", "Release {tagname}").unwrap(),
            "Release 1.2.3"
        );
        assert_eq!(
            render_message(v, "v1.2.3", "{major}.{minor} line, patch {patch} ({tagname})").unwrap(),
            "1.2 line, patch 3 (v1.2.3)"
        );
    }

    #[test]
    fn test_name_template_legal() {
        for s in ["{major}.{minor}", "V{major}.{minor}.{patch}:_,ab", "{major}"] {
            assert!(NameTemplate::parse(s).is_ok(), "expected '{}' to be legal", s);
        }
    }

    #[test]
    fn test_name_template_illegal() {
        for s in ["a   b", "", "a{something}", ",;", "{major} {minor}"] {
            assert!(NameTemplate::parse(s).is_err(), "expected '{}' to fail", s);
        }
    }

    #[test]
    fn test_name_template_required_fields() {
        for s in ["{patch}", "V{major}.{patch}", "{minor}.{patch}", "release"] {
            assert!(NameTemplate::parse(s).is_err(), "expected '{}' to fail", s);
        }
    }

    #[test]
    fn test_name_template_rejects_ambiguous_layouts() {
        assert!(NameTemplate::parse("{major}{minor}").is_err());
        assert!(NameTemplate::parse("{major}.{major}").is_err());
        assert!(NameTemplate::parse("{major}-{tagname}").is_err());
    }

    #[test]
    fn test_name_template_rejects_digits_next_to_placeholders() {
        for s in [
            "{major}0{minor}",
            "{major}.{minor}.1{patch}",
            "v2{major}",
            "{major}9",
            "{major}.{minor}5",
        ] {
            assert!(NameTemplate::parse(s).is_err(), "expected '{}' to fail", s);
        }
        for s in ["v2-{major}.{minor}", "{major}.{minor}-x86.64", "r1.{major}"] {
            assert!(NameTemplate::parse(s).is_ok(), "expected '{}' to be legal", s);
        }
    }

    #[test]
    fn test_name_template_supports_step() {
        let t = NameTemplate::parse("{major}.{minor}").unwrap();
        assert!(t.supports(Step::Major));
        assert!(t.supports(Step::Minor));
        assert!(!t.supports(Step::Patch));
    }

    #[test]
    fn test_substitute_keeps_unknown_braces() {
        let mut ctx = HashMap::new();
        ctx.insert("tagname".to_string(), "1.3.0".to_string());
        assert_eq!(
            substitute("echo {tagname} ${HOME} {other} {", &ctx),
            "echo 1.3.0 ${HOME} {other} {"
        );
    }

    #[test]
    fn test_substitute_does_not_expand_values() {
        let mut ctx = HashMap::new();
        ctx.insert("tagname".to_string(), "{patch}".to_string());
        ctx.insert("patch".to_string(), "7".to_string());
        assert_eq!(substitute("{tagname}/{patch}", &ctx), "{patch}/7");
    }
}
