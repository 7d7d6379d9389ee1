pub mod marks;
pub mod memory;
pub mod opener_graph;
pub mod session;

pub use marks::SelectionStore;
pub use memory::MemoryStorage;
pub use opener_graph::OpenerGraphStore;
pub use session::FileStorage;
