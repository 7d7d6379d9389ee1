//! Grouping by tree and by site identity.
//!
//! Tree grouping is a toggle over the whole window. Identity grouping runs
//! for a single tab once it finishes navigating and moves it next to the
//! other tabs of the same site.

use std::collections::BTreeSet;
use tabtree_core::types::position_of;
use tabtree_core::{Result, Tab, TabId};
use tabtree_tree::Forest;
use tracing::{debug, info};

use crate::identity::{group_title, host_of, SiteIdentity};
use crate::manager::{ids_of, tolerate_stale, TabManager};

/// Where identity grouping puts the updated tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityTarget {
    /// Move into an existing single-identity group.
    Join(i32),
    /// The tab's current group already fits.
    Keep(i32),
    /// Start a group holding only this tab.
    Fresh,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityPlan {
    pub target: IdentityTarget,
    /// Hosts of every tab sharing the updated tab's identity, used for the
    /// group title.
    pub hosts: Vec<String>,
}

fn host_or_empty(tab: &Tab) -> String {
    tab.effective_url().and_then(host_of).unwrap_or_default()
}

/// Decides the group for the tab at `pos`. `None` when the tab has no
/// identity to group by.
pub fn plan_identity_group(tabs: &[Tab], pos: usize, identity: &dyn SiteIdentity) -> Option<IdentityPlan> {
    let keys: Vec<String> = tabs.iter().map(|t| identity.key(t)).collect();
    let key = keys.get(pos)?;
    if key.is_empty() {
        return None;
    }

    let same: Vec<usize> = (0..tabs.len()).filter(|&i| keys[i] == *key).collect();
    let groups_of_same: BTreeSet<i32> = same.iter().filter_map(|&i| tabs[i].group_id.group()).collect();
    let members = |group: i32| (0..tabs.len()).filter(move |&i| tabs[i].group_id.group() == Some(group));
    let single_identity = |group: i32| members(group).all(|i| keys[i] == *key);
    let recency = |group: i32| {
        members(group)
            .filter_map(|i| tabs[i].last_accessed)
            .fold(f64::NEG_INFINITY, f64::max)
    };

    let current = tabs[pos].group_id.group();
    let current_qualifies = current.is_some_and(|g| single_identity(g) && groups_of_same.len() <= 1);

    let best = groups_of_same
        .iter()
        .copied()
        .filter(|&g| Some(g) != current && single_identity(g))
        .max_by(|&a, &b| recency(a).total_cmp(&recency(b)));

    let target = match (best, current) {
        (Some(g), _) => IdentityTarget::Join(g),
        (None, Some(g)) if current_qualifies => IdentityTarget::Keep(g),
        (None, Some(g)) if members(g).count() == 1 => IdentityTarget::Keep(g),
        _ => IdentityTarget::Fresh,
    };

    Some(IdentityPlan {
        target,
        hosts: same.iter().map(|&i| host_or_empty(&tabs[i])).collect(),
    })
}

impl TabManager {
    /// Ungroups everything when any tab is grouped, otherwise groups each
    /// tree of the forest.
    pub async fn toggle_grouping(&self) -> Result<()> {
        let tabs = self.snapshot().await?;
        let grouped = ids_of(&tabs, (0..tabs.len()).filter(|&i| tabs[i].group_id.is_grouped()));

        if !grouped.is_empty() {
            for id in &grouped {
                tolerate_stale(self.host.ungroup_tabs(&[*id]).await, "ungroup tab")?;
            }
            info!(count = grouped.len(), "Ungrouped tabs");
            return Ok(());
        }

        let trees = Forest::new(&tabs).partition();
        for tree in &trees {
            let ids = ids_of(&tabs, tree.iter().copied());
            if ids.is_empty() {
                continue;
            }
            let Some(group) = tolerate_stale(self.host.group_tabs(&ids, None).await, "group tree")? else {
                continue;
            };
            let hosts: Vec<String> = tree.iter().map(|&i| host_or_empty(&tabs[i])).collect();
            let title = group_title(&hosts, &self.config.grouping.default_title);
            debug!(group, ?ids, title = %title, "Grouped tree");
            tolerate_stale(
                self.host
                    .update_group(group, Some(&title), Some(self.config.grouping.collapse_new_groups))
                    .await,
                "title group",
            )?;
        }
        info!(trees = trees.len(), "Grouped window by tree");
        Ok(())
    }

    pub async fn group_by_identity(&self, tab_id: TabId) -> Result<()> {
        let tabs = self.snapshot().await?;
        let Some(pos) = position_of(&tabs, tab_id) else {
            debug!(tab_id, "Navigated tab is gone, skipping identity grouping");
            return Ok(());
        };
        let Some(plan) = plan_identity_group(&tabs, pos, self.identity.as_ref()) else {
            debug!(tab_id, "Tab has no identity, skipping grouping");
            return Ok(());
        };

        let (group, collapsed) = match plan.target {
            IdentityTarget::Keep(group) => (group, None),
            IdentityTarget::Join(group) => {
                let joined = tolerate_stale(self.host.group_tabs(&[tab_id], Some(group)).await, "join group")?;
                match joined {
                    Some(group) => (group, None),
                    None => return Ok(()),
                }
            }
            IdentityTarget::Fresh => {
                match tolerate_stale(self.host.group_tabs(&[tab_id], None).await, "create group")? {
                    Some(group) => (group, Some(self.config.grouping.collapse_new_groups)),
                    None => return Ok(()),
                }
            }
        };

        let title = group_title(&plan.hosts, &self.config.grouping.default_title);
        debug!(tab_id, group, target = ?plan.target, title = %title, "Grouped by identity");
        tolerate_stale(self.host.update_group(group, Some(&title), collapsed).await, "title group")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::HostIdentity;
    use crate::sim::Mutation;
    use crate::testing::{manager_for, window};
    use std::sync::Arc;
    use tabtree_core::{BrowserHost, GroupId};

    fn site(id: TabId, url: &str) -> Tab {
        Tab::new(id, 0).with_url(url)
    }

    #[test]
    fn test_plan_joins_most_recent_group() {
        let mut tabs = vec![
            site(1, "https://a.example.com/"),
            site(2, "https://a.example.com/x"),
            site(3, "https://a.example.com/y"),
            site(4, "https://a.example.com/z"),
        ];
        tabs[1].group_id = GroupId::Group(10);
        tabs[1].last_accessed = Some(5.0);
        tabs[2].group_id = GroupId::Group(11);
        tabs[2].last_accessed = Some(9.0);

        let plan = plan_identity_group(&tabs, 0, &HostIdentity).unwrap();
        assert_eq!(plan.target, IdentityTarget::Join(11));
        assert_eq!(plan.hosts.len(), 4);
    }

    #[test]
    fn test_plan_mixed_current_group_is_left() {
        let mut tabs = vec![site(1, "https://a.com/"), site(2, "https://b.com/")];
        tabs[0].group_id = GroupId::Group(3);
        tabs[1].group_id = GroupId::Group(3);

        let plan = plan_identity_group(&tabs, 0, &HostIdentity).unwrap();
        assert_eq!(plan.target, IdentityTarget::Fresh);
    }

    #[test]
    fn test_plan_keeps_fitting_group() {
        let mut tabs = vec![site(1, "https://a.com/"), site(2, "https://a.com/2"), site(3, "https://b.com/")];
        tabs[0].group_id = GroupId::Group(3);
        tabs[1].group_id = GroupId::Group(3);
        assert_eq!(
            plan_identity_group(&tabs, 0, &HostIdentity).unwrap().target,
            IdentityTarget::Keep(3)
        );

        // a lone tab keeps its own group even after navigating elsewhere
        let mut lone = vec![site(1, "https://c.com/"), site(2, "https://a.com/")];
        lone[0].group_id = GroupId::Group(4);
        lone[1].group_id = GroupId::Group(5);
        assert_eq!(
            plan_identity_group(&lone, 0, &HostIdentity).unwrap().target,
            IdentityTarget::Keep(4)
        );
    }

    #[test]
    fn test_plan_site_split_across_groups() {
        let mut tabs = vec![site(1, "https://a.com/"), site(2, "https://a.com/2")];
        tabs[0].group_id = GroupId::Group(10);
        tabs[1].group_id = GroupId::Group(11);
        // current group fits alone, but the site also lives in group 11
        assert_eq!(
            plan_identity_group(&tabs, 0, &HostIdentity).unwrap().target,
            IdentityTarget::Join(11)
        );

        // group 11 mixes sites, so the lone tab stays put
        tabs.push(site(3, "https://b.com/"));
        tabs[2].group_id = GroupId::Group(11);
        assert_eq!(
            plan_identity_group(&tabs, 0, &HostIdentity).unwrap().target,
            IdentityTarget::Keep(10)
        );

        // with a second member in group 10 the tab leaves for a fresh group
        tabs.push(site(4, "https://a.com/4"));
        tabs[3].group_id = GroupId::Group(10);
        assert_eq!(
            plan_identity_group(&tabs, 0, &HostIdentity).unwrap().target,
            IdentityTarget::Fresh
        );
    }

    #[test]
    fn test_plan_skips_tabs_without_url() {
        let tabs = vec![Tab::new(1, 0)];
        assert!(plan_identity_group(&tabs, 0, &HostIdentity).is_none());
    }

    #[tokio::test]
    async fn test_toggle_grouping_groups_each_tree_then_ungroups() {
        let mut tabs = window(&[None, None, Some(1), Some(2)]);
        tabs[0].url = Some("https://www.github.com/".to_string());
        tabs[2].url = Some("https://docs.github.com/".to_string());
        let (browser, manager) = manager_for(tabs).await;

        manager.toggle_grouping().await.unwrap();
        let mutations = browser.mutations().await;
        let groups: Vec<&Vec<TabId>> = mutations
            .iter()
            .filter_map(|m| match m {
                Mutation::Group { ids, .. } => Some(ids),
                _ => None,
            })
            .collect();
        assert_eq!(groups, vec![&vec![1, 3], &vec![2, 4]]);

        let state = browser.state().await;
        assert_eq!(state.groups.len(), 2);
        assert!(state.groups.iter().any(|g| g.title == "github.com"));
        assert!(state.groups.iter().any(|g| g.title == "Tabs"));

        manager.toggle_grouping().await.unwrap();
        let state = browser.state().await;
        assert!(state.groups.is_empty());
        assert!(state.tabs.iter().all(|t| !t.group_id.is_grouped()));
    }

    #[tokio::test]
    async fn test_identity_grouping_joins_same_site() {
        let tabs = vec![site(1, "https://news.example.org/"), site(2, "https://other.net/")];
        let (browser, manager) = manager_for(tabs).await;
        let group = browser.group_tabs(&[1], None).await.unwrap();

        browser
            .create_tab(Some(2), Some("https://news.example.org/world"), false)
            .await
            .unwrap();
        manager.group_by_identity(3).await.unwrap();

        let state = browser.state().await;
        let tab = state.tabs.iter().find(|t| t.id == Some(3)).unwrap();
        assert_eq!(tab.group_id, GroupId::Group(group));
        let entry = state.groups.iter().find(|g| g.id == group).unwrap();
        assert_eq!(entry.title, "news.example.org");
    }

    /// Groups by page title, ignoring the host.
    struct TitleIdentity;

    impl SiteIdentity for TitleIdentity {
        fn key(&self, tab: &Tab) -> String {
            tab.title.clone().unwrap_or_default()
        }
    }

    #[tokio::test]
    async fn test_identity_grouping_uses_custom_identity() {
        let mut tabs = vec![site(1, "https://a.com/"), site(2, "https://b.org/"), site(3, "https://c.net/")];
        tabs[0].title = Some("Inbox".to_string());
        tabs[2].title = Some("Inbox".to_string());
        let (browser, manager) = manager_for(tabs).await;
        let manager = manager.with_identity(Arc::new(TitleIdentity));
        let group = browser.group_tabs(&[1], None).await.unwrap();

        manager.group_by_identity(3).await.unwrap();

        let state = browser.state().await;
        let tab = state.tabs.iter().find(|t| t.id == Some(3)).unwrap();
        assert_eq!(tab.group_id, GroupId::Group(group));
        let other = state.tabs.iter().find(|t| t.id == Some(2)).unwrap();
        assert!(!other.group_id.is_grouped());
    }

    #[tokio::test]
    async fn test_identity_grouping_for_closed_tab_is_noop() {
        let (browser, manager) = manager_for(window(&[None])).await;
        manager.group_by_identity(42).await.unwrap();
        assert!(browser.mutations().await.is_empty());
    }
}
