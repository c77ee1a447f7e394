//! Path rewriting.
//!
//! # Responsibilities
//! - Compile per-route rewrite rules (regex + substitution template) at startup
//! - Substitute named capture groups into the template per request
//! - Preserve the query string unchanged across the rewrite
//!
//! # Design Decisions
//! - A malformed pattern or template is a fatal startup error, never a
//!   per-request failure
//! - A routed path that fails to match its own route's pattern is an
//!   internal invariant violation and is surfaced loudly as a 500

use regex::Regex;
use thiserror::Error;

/// Error compiling a rewrite rule. Fatal at startup.
#[derive(Debug, Error)]
pub enum RewriteCompileError {
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("template references unknown capture group `{0}`")]
    UnknownGroup(String),

    #[error("template has an unterminated `${{` placeholder")]
    UnterminatedPlaceholder,
}

/// A routed path did not match its own route's rewrite pattern.
///
/// The route predicate already accepted the path, so this indicates a
/// configuration/logic bug, not a client error.
#[derive(Debug, Error)]
#[error("path `{path}` does not match rewrite pattern `{pattern}`")]
pub struct RewriteMismatch {
    pub path: String,
    pub pattern: String,
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Group(String),
}

/// A compiled rewrite rule.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    pattern: Regex,
    segments: Vec<Segment>,
}

impl RewriteRule {
    /// Compile a pattern and template, validating both eagerly.
    pub fn compile(pattern: &str, template: &str) -> Result<Self, RewriteCompileError> {
        let pattern = Regex::new(pattern)?;
        let segments = parse_template(template)?;

        for segment in &segments {
            if let Segment::Group(name) = segment {
                let known = pattern
                    .capture_names()
                    .flatten()
                    .any(|candidate| candidate == name);
                if !known {
                    return Err(RewriteCompileError::UnknownGroup(name.clone()));
                }
            }
        }

        Ok(Self { pattern, segments })
    }

    /// Rewrite a path (with optional query string appended after `?`).
    ///
    /// The matched portion of the path is replaced by the expanded
    /// template; text before and after the match is preserved, as is the
    /// query string.
    pub fn apply(&self, path_and_query: &str) -> Result<String, RewriteMismatch> {
        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path_and_query, None),
        };

        let captures = self.pattern.captures(path).ok_or_else(|| RewriteMismatch {
            path: path.to_string(),
            pattern: self.pattern.as_str().to_string(),
        })?;
        let matched = captures
            .get(0)
            .expect("capture group 0 is the whole match");

        let mut rewritten = String::with_capacity(path_and_query.len());
        rewritten.push_str(&path[..matched.start()]);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => rewritten.push_str(text),
                Segment::Group(name) => {
                    if let Some(group) = captures.name(name) {
                        rewritten.push_str(group.as_str());
                    }
                }
            }
        }
        rewritten.push_str(&path[matched.end()..]);

        if let Some(query) = query {
            rewritten.push('?');
            rewritten.push_str(query);
        }
        Ok(rewritten)
    }
}

/// Split a template like `/${segment}` into literal and group segments.
fn parse_template(template: &str) -> Result<Vec<Segment>, RewriteCompileError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        literal.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .ok_or(RewriteCompileError::UnterminatedPlaceholder)?;
        if !literal.is_empty() {
            segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }
        segments.push(Segment::Group(after[..end].to_string()));
        rest = &after[end + 1..];
    }
    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_service_prefix_and_keeps_query() {
        let rule =
            RewriteRule::compile("/eazybank/account/(?<segment>.*)", "/${segment}").unwrap();
        assert_eq!(
            rule.apply("/eazybank/account/fetch?x=1").unwrap(),
            "/fetch?x=1"
        );
    }

    #[test]
    fn rewrites_nested_segments() {
        let rule = RewriteRule::compile("/eazybank/loan/(?<segment>.*)", "/${segment}").unwrap();
        assert_eq!(
            rule.apply("/eazybank/loan/api/fetch").unwrap(),
            "/api/fetch"
        );
    }

    #[test]
    fn empty_remainder_rewrites_to_root() {
        let rule =
            RewriteRule::compile("/eazybank/account/(?<segment>.*)", "/${segment}").unwrap();
        assert_eq!(rule.apply("/eazybank/account/").unwrap(), "/");
    }

    #[test]
    fn preserves_text_outside_the_match() {
        let rule = RewriteRule::compile("/account/(?<segment>[^/]*)", "/${segment}").unwrap();
        assert_eq!(
            rule.apply("/eazybank/account/fetch/details").unwrap(),
            "/eazybank/fetch/details"
        );
    }

    #[test]
    fn mixed_literal_and_group_template() {
        let rule =
            RewriteRule::compile("/eazybank/card/(?<segment>.*)", "/api/${segment}").unwrap();
        assert_eq!(rule.apply("/eazybank/card/fetch").unwrap(), "/api/fetch");
    }

    #[test]
    fn non_matching_path_is_an_invariant_violation() {
        let rule =
            RewriteRule::compile("/eazybank/account/(?<segment>.+)", "/${segment}").unwrap();
        let err = rule.apply("/eazybank/loan/fetch").unwrap_err();
        assert!(err.to_string().contains("/eazybank/loan/fetch"));
    }

    #[test]
    fn invalid_pattern_is_rejected_at_compile() {
        assert!(matches!(
            RewriteRule::compile("(", "/${segment}"),
            Err(RewriteCompileError::InvalidPattern(_))
        ));
    }

    #[test]
    fn unknown_group_is_rejected_at_compile() {
        assert!(matches!(
            RewriteRule::compile("/eazybank/account/(?<segment>.*)", "/${other}"),
            Err(RewriteCompileError::UnknownGroup(name)) if name == "other"
        ));
    }

    #[test]
    fn unterminated_placeholder_is_rejected_at_compile() {
        assert!(matches!(
            RewriteRule::compile("/eazybank/account/(?<segment>.*)", "/${segment"),
            Err(RewriteCompileError::UnterminatedPlaceholder)
        ));
    }
}
