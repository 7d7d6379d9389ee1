//! Content identity of a tab and group naming.

use tabtree_core::Tab;
use url::Url;

/// Maps a tab to the key used for identity grouping. Tabs with equal keys
/// belong together. Implementations may refine the host with other
/// signals (a favicon fingerprint, for instance).
pub trait SiteIdentity: Send + Sync {
    fn key(&self, tab: &Tab) -> String;
}

/// Identity by URL host. URLs that do not parse fall back to the raw
/// string, tabs without a URL share the empty key.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostIdentity;

impl SiteIdentity for HostIdentity {
    fn key(&self, tab: &Tab) -> String {
        match tab.effective_url() {
            Some(raw) => host_of(raw).unwrap_or_else(|| raw.to_string()),
            None => String::new(),
        }
    }
}

pub fn host_of(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw).ok()?;
    parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_ascii_lowercase())
}

/// Title for a group holding `hosts`: the longest run of dot-separated
/// segments they all end with, read right to left. Identical hosts keep
/// their full name. A shared suffix of a single segment (a bare TLD) does
/// not count.
pub fn group_title(hosts: &[String], default_title: &str) -> String {
    let Some(first) = hosts.first() else {
        return default_title.to_string();
    };
    if first.is_empty() {
        return default_title.to_string();
    }
    if hosts.iter().all(|h| h == first) {
        return first.clone();
    }

    let mut common: Vec<&str> = first.rsplit('.').collect();
    for host in &hosts[1..] {
        let shared = common
            .iter()
            .zip(host.rsplit('.'))
            .take_while(|(a, b)| **a == *b)
            .count();
        common.truncate(shared);
    }

    if common.len() < 2 {
        return default_title.to_string();
    }
    common.reverse();
    common.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts(list: &[&str]) -> Vec<String> {
        list.iter().map(|h| h.to_string()).collect()
    }

    #[test]
    fn test_common_suffix() {
        assert_eq!(
            group_title(&hosts(&["www.github.com", "docs.github.com"]), "Tabs"),
            "github.com"
        );
        assert_eq!(
            group_title(&hosts(&["a.b.example.org", "c.b.example.org", "b.example.org"]), "Tabs"),
            "b.example.org"
        );
    }

    #[test]
    fn test_no_common_suffix_uses_default() {
        assert_eq!(group_title(&hosts(&["a.com", "b.com"]), "Tabs"), "Tabs");
        assert_eq!(group_title(&hosts(&["a.com", "b.org"]), "Tabs"), "Tabs");
        assert_eq!(group_title(&[], "Tabs"), "Tabs");
    }

    #[test]
    fn test_identical_hosts_unchanged() {
        assert_eq!(group_title(&hosts(&["x.io", "x.io"]), "Tabs"), "x.io");
        assert_eq!(group_title(&hosts(&["localhost"]), "Tabs"), "localhost");
    }

    #[test]
    fn test_host_identity() {
        let identity = HostIdentity;
        let tab = Tab::new(1, 0).with_url("https://Docs.GitHub.com/en/actions");
        assert_eq!(identity.key(&tab), "docs.github.com");

        let tab = Tab::new(2, 0).with_url("not a url");
        assert_eq!(identity.key(&tab), "not a url");

        assert_eq!(identity.key(&Tab::new(3, 0)), "");
        assert_eq!(host_of("chrome://newtab/").as_deref(), Some("newtab"));
    }
}
