//! Memory estimation.
//!
//! A run can be sized before anything is allocated. An estimation is a tree of
//! named components; each component turns graph dimensions and a concurrency
//! into a byte range:
//!
//! | Component | Cost |
//! |---|---|
//! | `fixed` | constant |
//! | `per_node` / `range_per_node` | function of node count |
//! | `per_thread` / `range_per_thread` | function of dimensions, times concurrency |
//! | `add` | nested estimation |
//!
//! ```rust
//! use halo_kcore::memory::{GraphDimensions, MemoryEstimation};
//!
//! let estimation = MemoryEstimation::builder("example")
//!     .fixed("header", 64)
//!     .per_node("values", |n| n * 4)
//!     .per_thread("buffer", |_| 1024)
//!     .build();
//!
//! let tree = estimation.estimate(GraphDimensions::new(100, 0), 2);
//! assert_eq!(tree.range().min(), 64 + 400 + 2048);
//! ```

mod range;
mod tree;

pub use range::MemoryRange;
pub use tree::MemoryTree;

use serde::{Deserialize, Serialize};

/// The graph size an estimation is evaluated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDimensions {
    /// Number of nodes.
    pub node_count: u64,
    /// Number of adjacency entries.
    pub relationship_count: u64,
}

impl GraphDimensions {
    /// Creates dimensions for `node_count` nodes and `relationship_count` entries.
    pub const fn new(node_count: u64, relationship_count: u64) -> Self {
        Self {
            node_count,
            relationship_count,
        }
    }
}

type NodeFn = Box<dyn Fn(u64) -> MemoryRange + Send + Sync>;
type ThreadFn = Box<dyn Fn(&GraphDimensions) -> MemoryRange + Send + Sync>;

enum Component {
    Fixed(String, MemoryRange),
    PerNode(String, NodeFn),
    PerThread(String, ThreadFn),
    Nested(MemoryEstimation),
}

/// A named, composable memory estimation.
pub struct MemoryEstimation {
    description: String,
    components: Vec<Component>,
}

impl MemoryEstimation {
    /// Starts a builder for an estimation named `description`.
    pub fn builder(description: impl Into<String>) -> MemoryEstimationBuilder {
        MemoryEstimationBuilder {
            description: description.into(),
            components: Vec::new(),
        }
    }

    /// Name of this estimation.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Evaluates the estimation.
    pub fn estimate(&self, dimensions: GraphDimensions, concurrency: usize) -> MemoryTree {
        let threads = concurrency as u64;
        let components: Vec<MemoryTree> = self
            .components
            .iter()
            .map(|component| match component {
                Component::Fixed(name, range) => MemoryTree::leaf(name.clone(), *range),
                Component::PerNode(name, f) => {
                    MemoryTree::leaf(name.clone(), f(dimensions.node_count))
                }
                Component::PerThread(name, f) => {
                    MemoryTree::leaf(name.clone(), f(&dimensions).times(threads))
                }
                Component::Nested(inner) => inner.estimate(dimensions, concurrency),
            })
            .collect();
        MemoryTree::node(self.description.clone(), components)
    }
}

impl core::fmt::Debug for MemoryEstimation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MemoryEstimation")
            .field("description", &self.description)
            .field("components", &self.components.len())
            .finish()
    }
}

/// Builder for [`MemoryEstimation`].
pub struct MemoryEstimationBuilder {
    description: String,
    components: Vec<Component>,
}

impl MemoryEstimationBuilder {
    /// Adds a constant cost.
    pub fn fixed(mut self, description: impl Into<String>, bytes: u64) -> Self {
        self.components
            .push(Component::Fixed(description.into(), MemoryRange::of(bytes)));
        self
    }

    /// Adds a cost that depends on the node count.
    pub fn per_node(
        self,
        description: impl Into<String>,
        f: impl Fn(u64) -> u64 + Send + Sync + 'static,
    ) -> Self {
        self.range_per_node(description, move |n| MemoryRange::of(f(n)))
    }

    /// Adds a cost range that depends on the node count.
    pub fn range_per_node(
        mut self,
        description: impl Into<String>,
        f: impl Fn(u64) -> MemoryRange + Send + Sync + 'static,
    ) -> Self {
        self.components
            .push(Component::PerNode(description.into(), Box::new(f)));
        self
    }

    /// Adds a cost paid once per worker thread.
    pub fn per_thread(
        self,
        description: impl Into<String>,
        f: impl Fn(&GraphDimensions) -> u64 + Send + Sync + 'static,
    ) -> Self {
        self.range_per_thread(description, move |d| MemoryRange::of(f(d)))
    }

    /// Adds a cost range paid once per worker thread.
    pub fn range_per_thread(
        mut self,
        description: impl Into<String>,
        f: impl Fn(&GraphDimensions) -> MemoryRange + Send + Sync + 'static,
    ) -> Self {
        self.components
            .push(Component::PerThread(description.into(), Box::new(f)));
        self
    }

    /// Nests another estimation.
    pub fn add(mut self, estimation: MemoryEstimation) -> Self {
        self.components.push(Component::Nested(estimation));
        self
    }

    /// Finishes the estimation.
    pub fn build(self) -> MemoryEstimation {
        MemoryEstimation {
            description: self.description,
            components: self.components,
        }
    }
}
