//! Robots.txt rule evaluation
//!
//! Rules are kept as raw text and evaluated with the Google-compatible
//! matcher from `robotstxt` on each query.

use robotstxt::DefaultMatcher;

/// Policy for one host
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    body: String,
    permissive: bool,
}

impl ParsedRobots {
    /// Wraps a fetched robots.txt body
    pub fn from_content(body: &str) -> Self {
        Self {
            body: body.to_string(),
            permissive: false,
        }
    }

    /// Policy cached for hosts whose robots.txt could not be retrieved
    pub fn allow_all() -> Self {
        Self {
            body: String::new(),
            permissive: true,
        }
    }

    pub fn is_allow_all(&self) -> bool {
        self.permissive
    }

    /// Evaluates `url` for the product token `agent`
    ///
    /// `url` may be absolute or a bare path. An empty body or a body with no
    /// recognizable rules allows everything.
    pub fn is_allowed(&self, url: &str, agent: &str) -> bool {
        if self.permissive || self.body.trim().is_empty() {
            return true;
        }

        DefaultMatcher::default().one_agent_allowed_by_robots(&self.body, agent, url)
    }
}

/// Derives the robots.txt product token from a full User-Agent string
///
/// "driftnet/0.1 (+https://example.com/bot)" becomes "driftnet".
pub fn robots_agent(user_agent: &str) -> String {
    user_agent
        .split(|c: char| c == '/' || c.is_whitespace())
        .find(|token| !token.is_empty())
        .unwrap_or(user_agent)
        .to_string()
}
