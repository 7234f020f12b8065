//! Robots.txt parser implementation
//!
//! This module wraps the robotstxt crate's matcher and adds the status-code
//! rules and the fallback heuristics applied to soft-404 robots files.

use robotstxt::DefaultMatcher;

/// Markers that suggest a robots.txt response is really an HTML page
const HTML_HINTS: &[&str] = &["<!doctype html", "<html", "<head", "<body"];

/// What the fetch outcome alone says about permissions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Baseline {
    /// Evaluate the robots.txt body
    Rules,
    AllowAll,
    DisallowAll,
}

/// Parsed robots.txt data for one host
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    /// Raw robots.txt content
    content: String,

    /// HTTP status of the robots.txt response; `None` when unreachable
    status: Option<u16>,

    baseline: Baseline,
}

impl ParsedRobots {
    /// Builds rules from an HTTP response
    ///
    /// | Status | Meaning |
    /// |--------|---------|
    /// | 2xx | Parse the body |
    /// | 401, 403 | Disallow everything |
    /// | other 4xx | Allow everything |
    /// | 5xx and anything else | Disallow everything |
    pub fn from_response(status: u16, content: &str) -> Self {
        let baseline = match status {
            200..=299 => Baseline::Rules,
            401 | 403 => Baseline::DisallowAll,
            400..=499 => Baseline::AllowAll,
            _ => Baseline::DisallowAll,
        };

        Self {
            content: content.to_string(),
            status: Some(status),
            baseline,
        }
    }

    /// Parses a robots.txt body served with 200 OK
    pub fn from_content(content: &str) -> Self {
        Self::from_response(200, content)
    }

    /// Rules for a host whose robots.txt could not be fetched at all
    pub fn unreachable() -> Self {
        Self {
            content: String::new(),
            status: None,
            baseline: Baseline::DisallowAll,
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            status: None,
            baseline: Baseline::AllowAll,
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn is_unreachable(&self) -> bool {
        self.status.is_none() && self.baseline == Baseline::DisallowAll
    }

    /// True if the body declares at least one `User-agent` group
    pub fn has_rules(&self) -> bool {
        self.content.lines().any(|line| {
            line.split_once(':')
                .map(|(key, _)| key.trim().eq_ignore_ascii_case("user-agent"))
                .unwrap_or(false)
        })
    }

    /// True if the body looks like an HTML page rather than a robots file
    pub fn looks_like_html(&self) -> bool {
        let lowered = self.content.to_lowercase();
        HTML_HINTS.iter().any(|hint| lowered.contains(hint))
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - The absolute URL to check
    /// * `user_agent` - The full User-Agent string; only its product token is matched
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        match self.baseline {
            Baseline::AllowAll => true,
            Baseline::DisallowAll => false,
            Baseline::Rules => {
                if self.content.trim().is_empty() {
                    return true;
                }
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(&self.content, product_token(user_agent), url)
            }
        }
    }

    /// Whether the permissive fallback overrides normal matching
    ///
    /// Applies when the host was unreachable, or when no rules were parsed and
    /// the response was an error status or an HTML page without a
    /// `user-agent:` directive.
    pub fn fallback_applies(&self) -> bool {
        let Some(status) = self.status else {
            return self.is_unreachable();
        };
        if self.has_rules() {
            return false;
        }
        let ua_present = self.content.to_lowercase().contains("user-agent:");
        let malformed = self.looks_like_html() && !ua_present;
        status >= 400 || malformed
    }

    /// Full permission check including the optional fallback
    pub fn can_fetch(&self, url: &str, user_agent: &str, fallback_allow: bool) -> bool {
        if fallback_allow && self.fallback_applies() {
            return true;
        }
        self.is_allowed(url, user_agent)
    }
}

/// Extracts the product token robots.txt groups are matched against
///
/// `"ExampleBot/1.0 (+https://example.com)"` becomes `"ExampleBot"`.
pub fn product_token(user_agent: &str) -> &str {
    let trimmed = user_agent.trim();
    let end = trimmed
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(trimmed.len());
    if end == 0 {
        "*"
    } else {
        &trimmed[..end]
    }
}
