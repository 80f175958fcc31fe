//! Error type shared by the paged store, the graph builders and the decomposition.

use core::fmt;

/// Failures reported by this crate.
///
/// Configuration and capacity problems are reported before anything is
/// allocated. Allocation failures and cancellation abort the run; no partial
/// output is ever returned alongside an error.
#[derive(Debug, Clone, PartialEq)]
pub enum KCoreError {
    /// Concurrency must be at least one worker.
    InvalidConcurrency,
    /// Batch size must be at least one node.
    InvalidBatchSize,
    /// The rebuild constant must lie in `(0, 1]`.
    InvalidRebuildConstant(f64),
    /// The requested capacity is beyond what a paged array can address.
    CapacityExceeded {
        /// Requested element count.
        requested: u64,
        /// Largest supported element count.
        max: u64,
    },
    /// A page could not be reserved.
    OutOfMemory {
        /// Size of the failed reservation.
        bytes: u64,
    },
    /// The pre-flight estimate exceeds the configured memory guard.
    InsufficientMemory {
        /// Upper bound of the estimate.
        required: u64,
        /// Configured guard.
        available: u64,
    },
    /// The worker pool could not be started.
    ThreadPool(String),
    /// A configuration document could not be parsed.
    InvalidConfig(String),
    /// The run was cancelled through its termination flag.
    Aborted,
}

impl fmt::Display for KCoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConcurrency => f.write_str("concurrency must be greater than zero"),
            Self::InvalidBatchSize => f.write_str("batch size must be greater than zero"),
            Self::InvalidRebuildConstant(c) => {
                write!(f, "rebuild constant must be in (0, 1], got {c}")
            }
            Self::CapacityExceeded { requested, max } => {
                write!(f, "capacity {requested} exceeds the maximum of {max} elements")
            }
            Self::OutOfMemory { bytes } => write!(f, "failed to reserve {bytes} bytes"),
            Self::InsufficientMemory {
                required,
                available,
            } => write!(
                f,
                "estimated memory {required} bytes exceeds the configured limit of {available} bytes"
            ),
            Self::ThreadPool(reason) => write!(f, "failed to start worker pool: {reason}"),
            Self::InvalidConfig(reason) => write!(f, "invalid configuration: {reason}"),
            Self::Aborted => f.write_str("k-core decomposition was aborted"),
        }
    }
}

impl std::error::Error for KCoreError {}
