pub mod block;
pub mod bus;
pub mod close;
pub mod debug;
pub mod grouping;
pub mod identity;
pub mod manager;
pub mod navigate;
pub mod selection;
pub mod sim;

#[cfg(test)]
mod testing;

pub use bus::{run_event_loop, EventBus};
pub use debug::render_forest;
pub use identity::{group_title, host_of, HostIdentity, SiteIdentity};
pub use manager::TabManager;
pub use sim::{Mutation, SimulatedBrowser, WindowState, NEW_TAB_URL};
