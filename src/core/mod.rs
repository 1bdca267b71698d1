pub mod depends;
pub mod port;
pub mod tree;

pub use depends::{DependencyKind, MaxDepth};
pub use port::{canonical_name, FlavoredName, PortId, PortParseError};
pub use tree::{PortListing, PortsTree, DEFAULT_EXCLUDED_DIRS};
