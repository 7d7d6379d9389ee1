pub mod cycle;
pub mod forest;

pub use cycle::cycle_index;
pub use forest::{find_root, partition, reachable, Forest};
