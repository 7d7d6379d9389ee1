//! Host capabilities the engine consumes.
//!
//! The browser owns every tab, group and the session storage area; the
//! engine only reads snapshots and issues mutation intents through these
//! traits. Implementations must be cheap to call repeatedly: callers never
//! cache a snapshot across operations.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::types::{Tab, TabGroup, TabId};

/// Tab, window and group operations of the host browser, scoped to one
/// window.
#[async_trait]
pub trait BrowserHost: Send + Sync {
    /// Ordered left-to-right tab list of the window.
    async fn query_tabs(&self) -> Result<Vec<Tab>>;

    async fn get_tab(&self, id: TabId) -> Result<Tab>;

    async fn close_tabs(&self, ids: &[TabId]) -> Result<()>;

    /// Moves a tab so that it ends up at `index` in the resulting order.
    async fn move_tab(&self, id: TabId, index: usize) -> Result<()>;

    /// Replaces the highlight with `indices`. The first index becomes the
    /// active tab.
    async fn highlight(&self, indices: &[usize]) -> Result<()>;

    /// Groups the tabs into `group`, or into a fresh group when `None`.
    /// Returns the id of the group the tabs ended up in.
    async fn group_tabs(&self, ids: &[TabId], group: Option<i32>) -> Result<i32>;

    async fn ungroup_tabs(&self, ids: &[TabId]) -> Result<()>;

    async fn update_group(&self, group: i32, title: Option<&str>, collapsed: Option<bool>) -> Result<()>;

    async fn get_group(&self, group: i32) -> Result<TabGroup>;

    /// Opens a new tab, optionally recording `opener` as its creator.
    async fn create_tab(&self, opener: Option<TabId>, url: Option<&str>, active: bool) -> Result<Tab>;
}

/// Session-scoped keyed storage. Values are cleared when the browser
/// restarts. There is no compare-and-swap: concurrent writers may clobber
/// each other.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    async fn set(&self, key: &str, value: Value) -> Result<()>;
}
