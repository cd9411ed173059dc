//! Browser origin allow-list

/// Which `Origin` header values may open a tunnel
#[derive(Debug, Clone, Default)]
pub struct OriginPolicy {
    allowed: Vec<String>,
}

impl OriginPolicy {
    /// Build from configured origins; an empty list allows everything
    pub fn new(allowed: Vec<String>) -> Self {
        let allowed = allowed
            .into_iter()
            .map(|origin| normalize(&origin))
            .filter(|origin| !origin.is_empty())
            .collect();
        Self { allowed }
    }

    /// Whether any origin is accepted
    pub fn allows_any(&self) -> bool {
        self.allowed.is_empty()
    }

    /// Decide on a request's `Origin` header
    ///
    /// Requests without the header come from non-browser clients and are
    /// not subject to the browser same-origin model.
    pub fn allows(&self, origin: Option<&str>) -> bool {
        if self.allows_any() {
            return true;
        }
        match origin {
            None => true,
            Some(origin) => {
                let origin = normalize(origin);
                self.allowed.iter().any(|allowed| *allowed == origin)
            }
        }
    }
}

fn normalize(origin: &str) -> String {
    origin.trim().trim_end_matches('/').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_policy_allows_everything() {
        let policy = OriginPolicy::new(vec![]);
        assert!(policy.allows_any());
        assert!(policy.allows(Some("https://evil.example")));
        assert!(policy.allows(None));
    }

    #[test]
    fn test_allow_list_matches_exactly() {
        let policy = OriginPolicy::new(vec!["https://console.example.com/".to_string()]);
        assert!(policy.allows(Some("https://console.example.com")));
        assert!(policy.allows(Some("HTTPS://Console.Example.com")));
        assert!(!policy.allows(Some("https://console.example.com.evil")));
        assert!(!policy.allows(Some("http://console.example.com")));
    }

    #[test]
    fn test_missing_origin_allowed() {
        let policy = OriginPolicy::new(vec!["https://a.example".to_string()]);
        assert!(policy.allows(None));
    }
}
