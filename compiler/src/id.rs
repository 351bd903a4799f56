// id.rs — Stable tensor identifiers
//
// Indices are allocated in tensor observation order while the registry is
// built. They are the numeric values baked into generated headers, so the
// allocation order must be reproducible for a given input graph.

use std::fmt;

/// Stable index of a tensor within one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TensorIndex(pub usize);

impl fmt::Display for TensorIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Allocator for tensor indices. Produces monotonically increasing indices
/// in allocation order, starting from zero.
#[derive(Debug, Default)]
pub struct IndexAllocator {
    next: usize,
}

impl IndexAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self) -> TensorIndex {
        let id = TensorIndex(self.next);
        self.next += 1;
        id
    }

    /// Number of indices handed out so far.
    pub fn allocated(&self) -> usize {
        self.next
    }
}
