pub mod capability;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod paths;
pub mod types;

pub use capability::{BrowserHost, SessionStorage};
pub use command::Command;
pub use config::{Config, CycleScope};
pub use error::{Error, Result};
pub use event::{TabChange, TabEvent};
pub use paths::Paths;
pub use types::{GroupId, Tab, TabGroup, TabId};
