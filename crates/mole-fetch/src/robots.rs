//! robots.txt parsing and the exclusion policy built on it

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};
use url::Url;

use mole_core::{Error, ExclusionPolicy, Result};

#[derive(Debug, Clone, PartialEq)]
struct Rule {
    allow: bool,
    pattern: String,
}

#[derive(Debug, Clone, Default)]
struct Group {
    agents: Vec<String>,
    rules: Vec<Rule>,
}

/// Parsed robots.txt rules
#[derive(Debug, Clone, Default)]
pub struct RobotsTxt {
    groups: Vec<Group>,
}

impl RobotsTxt {
    /// Rules that allow every path
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Parse robots.txt content. Unknown directives are ignored.
    pub fn parse(content: &str) -> Self {
        let mut groups: Vec<Group> = Vec::new();
        let mut collecting_agents = false;

        for line in content.lines() {
            let line = line.split('#').next().unwrap_or_default().trim();
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    if !collecting_agents {
                        groups.push(Group::default());
                        collecting_agents = true;
                    }
                    if let Some(group) = groups.last_mut() {
                        group.agents.push(value.to_lowercase());
                    }
                }
                "allow" | "disallow" => {
                    collecting_agents = false;
                    let Some(group) = groups.last_mut() else {
                        continue;
                    };
                    // An empty Disallow allows everything; an empty Allow says nothing.
                    if value.is_empty() {
                        continue;
                    }
                    group.rules.push(Rule {
                        allow: key == "allow",
                        pattern: encode_pattern(value),
                    });
                }
                // Any other directive ends a run of User-agent lines
                "" => {}
                _ => collecting_agents = false,
            }
        }

        Self { groups }
    }

    /// Whether `agent` may fetch `path` (path plus optional query string)
    pub fn is_allowed(&self, agent: &str, path: &str) -> bool {
        let agent = agent.to_lowercase();

        let specific: Vec<&Group> = self
            .groups
            .iter()
            .filter(|group| {
                group
                    .agents
                    .iter()
                    .any(|name| name != "*" && !name.is_empty() && agent.contains(name.as_str()))
            })
            .collect();

        let groups = if specific.is_empty() {
            self.groups
                .iter()
                .filter(|group| group.agents.iter().any(|name| name == "*"))
                .collect()
        } else {
            specific
        };

        let mut best: Option<&Rule> = None;
        for rule in groups.iter().flat_map(|group| group.rules.iter()) {
            if !pattern_matches(&rule.pattern, path) {
                continue;
            }
            best = match best {
                Some(current)
                    if current.pattern.len() > rule.pattern.len()
                        || (current.pattern.len() == rule.pattern.len() && current.allow) =>
                {
                    Some(current)
                }
                _ => Some(rule),
            };
        }

        best.map_or(true, |rule| rule.allow)
    }
}

/// Prefix match with `*` wildcards and a trailing `$` end anchor
fn pattern_matches(pattern: &str, path: &str) -> bool {
    let (pattern, anchored) = match pattern.strip_suffix('$') {
        Some(stripped) => (stripped, true),
        None => (pattern, false),
    };

    let mut parts = pattern.split('*');
    let first = parts.next().unwrap_or_default();
    let Some(mut rest) = path.strip_prefix(first) else {
        return false;
    };

    let remaining: Vec<&str> = parts.collect();
    let Some((last, middle)) = remaining.split_last() else {
        return !anchored || rest.is_empty();
    };

    for part in middle {
        match rest.find(part) {
            Some(index) => rest = &rest[index + part.len()..],
            None => return false,
        }
    }

    if anchored {
        rest.ends_with(last)
    } else {
        rest.contains(last)
    }
}

/// Percent-encode a rule the way `Url` encodes request paths, so `/café`
/// matches `/caf%C3%A9`
fn encode_pattern(pattern: &str) -> String {
    let Ok(mut url) = Url::parse("http://robots.invalid/") else {
        return pattern.to_string();
    };
    let (path, query) = match pattern.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (pattern, None),
    };
    url.set_path(path);
    url.set_query(query);
    robots_path(&url)
}

/// The path robots.txt rules are matched against
pub fn robots_path(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

/// Exclusion policy that downloads and caches robots.txt per origin
pub struct RobotsPolicy {
    client: Client,
    agent: String,
    cache: Arc<RwLock<HashMap<String, Arc<RobotsTxt>>>>,
}

impl RobotsPolicy {
    /// Create a policy that identifies itself with `agent`
    pub fn new(client: Client, agent: impl Into<String>) -> Self {
        Self {
            client,
            agent: agent.into(),
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn rules_for(&self, url: &Url) -> Result<Arc<RobotsTxt>> {
        let origin = url.origin().ascii_serialization();

        {
            let cache = self
                .cache
                .read()
                .map_err(|e| Error::Fetch(format!("Lock error: {}", e)))?;
            if let Some(rules) = cache.get(&origin) {
                return Ok(rules.clone());
            }
        }

        let robots_url = url
            .join("/robots.txt")
            .map_err(|e| Error::InvalidInput(format!("Cannot build robots.txt URL: {}", e)))?;
        let rules = Arc::new(self.download(&robots_url).await?);

        let mut cache = self
            .cache
            .write()
            .map_err(|e| Error::Fetch(format!("Lock error: {}", e)))?;
        cache.insert(origin, rules.clone());
        Ok(rules)
    }

    async fn download(&self, robots_url: &Url) -> Result<RobotsTxt> {
        debug!("Fetching {}", robots_url);

        let response = self
            .client
            .get(robots_url.clone())
            .send()
            .await
            .map_err(|e| Error::Fetch(format!("Error fetching robots.txt from {}: {}", robots_url, e)))?;

        let status = response.status();
        let body = if status.is_success() {
            response
                .text()
                .await
                .map_err(|e| Error::Fetch(format!("Error reading robots.txt from {}: {}", robots_url, e)))?
        } else {
            String::new()
        };
        rules_for_status(robots_url, status, &body)
    }
}

/// Rules implied by a robots.txt response. Client errors mean the site has
/// no usable robots.txt and everything is allowed; server errors fail.
fn rules_for_status(robots_url: &Url, status: StatusCode, body: &str) -> Result<RobotsTxt> {
    if status.is_success() {
        info!("robots.txt fetched and parsed from {}", robots_url);
        return Ok(RobotsTxt::parse(body));
    }

    if status.is_client_error() {
        if status == StatusCode::NOT_FOUND {
            warn!("robots.txt not found at {}, proceeding without it", robots_url);
        } else {
            warn!("robots.txt at {} returned {}, proceeding without it", robots_url, status);
        }
        return Ok(RobotsTxt::allow_all());
    }

    Err(Error::Fetch(format!(
        "Error fetching robots.txt from {}: status {}",
        robots_url, status
    )))
}

#[async_trait]
impl ExclusionPolicy for RobotsPolicy {
    async fn is_allowed(&self, url: &Url) -> Result<bool> {
        let rules = self.rules_for(url).await?;
        let path = robots_path(url);
        let allowed = rules.is_allowed(&self.agent, &path);
        if !allowed {
            info!("Access to {} disallowed for {} by robots.txt", path, self.agent);
        }
        Ok(allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::serve;
    use std::sync::atomic::Ordering;
    use tokio::net::TcpListener;

    const ROBOTS: &str = "\
# example robots.txt
User-agent: *
Disallow: /private/
Disallow: /tmp
Allow: /private/press/

User-agent: mole
User-agent: otherbot
Disallow: /no-mole
Disallow: /*.pdf$

Sitemap: https://example.com/sitemap.xml
";

    #[test]
    fn test_wildcard_group_applies_to_unknown_agents() {
        let robots = RobotsTxt::parse(ROBOTS);
        assert!(robots.is_allowed("somebot", "/"));
        assert!(!robots.is_allowed("somebot", "/private/report.html"));
        assert!(!robots.is_allowed("somebot", "/tmp"));
        assert!(!robots.is_allowed("somebot", "/tmp/file"));
        assert!(robots.is_allowed("somebot", "/no-mole"));
    }

    #[test]
    fn test_longest_match_wins() {
        let robots = RobotsTxt::parse(ROBOTS);
        assert!(robots.is_allowed("somebot", "/private/press/release"));
        assert!(!robots.is_allowed("somebot", "/private/pressure"));
    }

    #[test]
    fn test_specific_group_replaces_wildcard_group() {
        let robots = RobotsTxt::parse(ROBOTS);
        assert!(!robots.is_allowed("mole", "/no-mole/page"));
        // The * group does not apply once a named group matches
        assert!(robots.is_allowed("mole", "/private/report.html"));
        assert!(!robots.is_allowed("otherbot", "/no-mole"));
    }

    #[test]
    fn test_end_anchor_and_wildcard() {
        let robots = RobotsTxt::parse(ROBOTS);
        assert!(!robots.is_allowed("mole", "/docs/guide.pdf"));
        assert!(robots.is_allowed("mole", "/docs/guide.pdf?download=1"));
        assert!(robots.is_allowed("mole", "/docs/guide.pdfx"));
    }

    #[test]
    fn test_agent_matching_is_case_insensitive() {
        let robots = RobotsTxt::parse("User-Agent: MOLE\nDisallow: /\n");
        assert!(!robots.is_allowed("mole", "/anything"));
        assert!(!robots.is_allowed("Mole", "/"));
    }

    #[test]
    fn test_empty_disallow_allows_everything() {
        let robots = RobotsTxt::parse("User-agent: *\nDisallow:\n");
        assert!(robots.is_allowed("mole", "/"));
        assert!(robots.is_allowed("mole", "/private"));
    }

    #[test]
    fn test_allow_wins_ties() {
        let robots = RobotsTxt::parse("User-agent: *\nDisallow: /page\nAllow: /page\n");
        assert!(robots.is_allowed("mole", "/page"));
    }

    #[test]
    fn test_rules_before_any_user_agent_are_ignored() {
        let robots = RobotsTxt::parse("Disallow: /\nUser-agent: *\nDisallow: /admin\n");
        assert!(robots.is_allowed("mole", "/"));
        assert!(!robots.is_allowed("mole", "/admin"));
    }

    #[test]
    fn test_allow_all_and_empty_file() {
        assert!(RobotsTxt::allow_all().is_allowed("mole", "/private"));
        assert!(RobotsTxt::parse("").is_allowed("mole", "/private"));
    }

    #[test]
    fn test_pattern_matching() {
        assert!(pattern_matches("/", "/index.html"));
        assert!(pattern_matches("/a*c", "/abc"));
        assert!(pattern_matches("/a*c", "/a/b/c/d"));
        assert!(!pattern_matches("/a*c", "/ab"));
        assert!(pattern_matches("/*.php$", "/index.php"));
        assert!(!pattern_matches("/*.php$", "/index.php5"));
        assert!(pattern_matches("/exact$", "/exact"));
        assert!(!pattern_matches("/exact$", "/exact/more"));
        assert!(pattern_matches("/a*", "/a"));
    }

    #[test]
    fn test_other_directives_end_an_agent_run() {
        let robots = RobotsTxt::parse(
            "User-agent: *\nCrawl-delay: 1\n\nUser-agent: badbot\nDisallow: /\n\n\
             User-agent: mole\nSitemap: https://example.com/sitemap.xml\nUser-agent: otherbot\nDisallow: /drafts\n",
        );
        assert!(robots.is_allowed("mole", "/"));
        assert!(robots.is_allowed("somebot", "/"));
        assert!(!robots.is_allowed("badbot", "/"));
        assert!(!robots.is_allowed("otherbot", "/drafts"));
        assert!(robots.is_allowed("otherbot", "/"));
    }

    #[test]
    fn test_non_ascii_rules_match_encoded_paths() {
        let robots = RobotsTxt::parse("User-agent: *\nDisallow: /café\nDisallow: /search?q=çay\n");
        let menu = Url::parse("https://example.com/café/menu").unwrap();
        let search = Url::parse("https://example.com/search?q=çay&page=2").unwrap();

        assert_eq!(robots_path(&menu), "/caf%C3%A9/menu");
        assert!(!robots.is_allowed("mole", &robots_path(&menu)));
        assert!(!robots.is_allowed("mole", &robots_path(&search)));
        assert!(robots.is_allowed("mole", "/cafe"));
    }

    #[test]
    fn test_encode_pattern() {
        assert_eq!(encode_pattern("/café"), "/caf%C3%A9");
        assert_eq!(encode_pattern("/caf%C3%A9"), "/caf%C3%A9");
        assert_eq!(encode_pattern("/*.pdf$"), "/*.pdf$");
        assert_eq!(encode_pattern("/a b"), "/a%20b");
    }

    #[test]
    fn test_rules_for_status() {
        let robots_url = Url::parse("https://example.com/robots.txt").unwrap();
        let body = "User-agent: *\nDisallow: /private\n";

        let ok = rules_for_status(&robots_url, StatusCode::OK, body).unwrap();
        assert!(!ok.is_allowed("mole", "/private"));

        for status in [StatusCode::NOT_FOUND, StatusCode::GONE, StatusCode::FORBIDDEN] {
            let rules = rules_for_status(&robots_url, status, body).unwrap();
            assert!(rules.is_allowed("mole", "/private"), "{status} should allow everything");
        }

        for status in [StatusCode::INTERNAL_SERVER_ERROR, StatusCode::SERVICE_UNAVAILABLE] {
            assert!(matches!(
                rules_for_status(&robots_url, status, body),
                Err(Error::Fetch(_))
            ));
        }
    }

    fn policy() -> RobotsPolicy {
        let client = Client::builder().no_proxy().build().unwrap();
        RobotsPolicy::new(client, "mole")
    }

    #[tokio::test]
    async fn test_robots_txt_is_downloaded_once_per_origin() {
        let (base, hits) = serve("200 OK", "User-agent: *\nDisallow: /private\n").await;
        let policy = policy();

        let private = Url::parse(&format!("{}/private/page", base)).unwrap();
        let public = Url::parse(&format!("{}/public", base)).unwrap();
        assert!(!policy.is_allowed(&private).await.unwrap());
        assert!(policy.is_allowed(&public).await.unwrap());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_robots_txt_allows_everything() {
        let (base, _) = serve("404 Not Found", "").await;
        let url = Url::parse(&format!("{}/private", base)).unwrap();
        assert!(policy().is_allowed(&url).await.unwrap());
    }

    #[tokio::test]
    async fn test_server_error_is_a_fetch_error() {
        let (base, _) = serve("503 Service Unavailable", "").await;
        let url = Url::parse(&format!("{}/", base)).unwrap();
        assert!(matches!(policy().is_allowed(&url).await, Err(Error::Fetch(_))));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_fetch_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);

        let url = Url::parse(&format!("http://{}/", address)).unwrap();
        assert!(matches!(policy().is_allowed(&url).await, Err(Error::Fetch(_))));
    }

    #[test]
    fn test_robots_path_includes_query() {
        let url = Url::parse("https://example.com/search?q=rust").unwrap();
        assert_eq!(robots_path(&url), "/search?q=rust");
        let url = Url::parse("https://example.com").unwrap();
        assert_eq!(robots_path(&url), "/");
    }
}
