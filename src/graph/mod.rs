/*!
 * Resource Allocation Graph
 * Process and resource nodes joined by assignment and request edges
 */

mod store;
mod types;

pub use store::{Adjacency, GraphStore};
pub use types::{Edge, EdgeKind, EdgeOutcome, GraphSnapshot};
