// registry.rs — Tensor registry
//
// Collects every tensor of a frozen graph and assigns each one a dense,
// stable index in observation order. Built once per compilation run and
// never mutated afterwards, so it can be shared read-only across renders.
//
// Preconditions: tensor names arrive in the order the upstream freezing step
//                emitted them.
// Postconditions: index is a bijection onto 0..len(), matching input order.
// Failure modes: duplicate or empty tensor names (input contract violations).
// Side effects: none.

use std::collections::HashMap;
use std::fmt;

use crate::diag::{codes, Diagnostic};
use crate::graph::FrozenGraph;
use crate::id::{IndexAllocator, TensorIndex};

// ── Errors ──────────────────────────────────────────────────────────────────

/// Input-contract violations detected while building the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    DuplicateTensor {
        name: String,
        first: TensorIndex,
        position: usize,
    },
    EmptyName {
        position: usize,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::DuplicateTensor {
                name,
                first,
                position,
            } => write!(
                f,
                "duplicate tensor '{}': first seen at index {}, repeated at position {}",
                name, first, position
            ),
            RegistryError::EmptyName { position } => {
                write!(f, "tensor at position {} has an empty name", position)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

impl RegistryError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            RegistryError::DuplicateTensor { .. } => Diagnostic::error(self.to_string())
                .with_code(codes::E0001)
                .with_hint("a frozen graph must name every tensor uniquely; re-export the graph"),
            RegistryError::EmptyName { .. } => {
                Diagnostic::error(self.to_string()).with_code(codes::E0002)
            }
        }
    }
}

// ── Registry ────────────────────────────────────────────────────────────────

/// Ordered mapping from symbolic tensor name to index.
#[derive(Debug, Clone)]
pub struct TensorRegistry {
    names: Vec<String>,
    lookup: HashMap<String, TensorIndex>,
}

impl TensorRegistry {
    /// Build a registry from an ordered list of tensor names.
    ///
    /// Walks the list exactly once; the `i`-th name receives index `i`.
    pub fn build<I, S>(names: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut alloc = IndexAllocator::new();
        let mut registry = TensorRegistry {
            names: Vec::new(),
            lookup: HashMap::new(),
        };

        for name in names {
            let name = name.into();
            let position = alloc.allocated();
            if name.is_empty() {
                return Err(RegistryError::EmptyName { position });
            }
            if let Some(&first) = registry.lookup.get(&name) {
                return Err(RegistryError::DuplicateTensor {
                    name,
                    first,
                    position,
                });
            }
            let index = alloc.alloc();
            registry.lookup.insert(name.clone(), index);
            registry.names.push(name);
        }

        Ok(registry)
    }

    /// Build a registry from every output tensor of `graph`, in graph order.
    pub fn from_graph(graph: &FrozenGraph) -> Result<Self, RegistryError> {
        Self::build(graph.tensors().map(|t| t.name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<TensorIndex> {
        self.lookup.get(name).copied()
    }

    pub fn name_of(&self, index: TensorIndex) -> Option<&str> {
        self.names.get(index.0).map(String::as_str)
    }

    /// Iterate `(index, name)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (TensorIndex, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| (TensorIndex(i), name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_assigns_indices_in_order() {
        let reg = TensorRegistry::build(["conv1/weight", "conv1/bias", "fc/logits"]).unwrap();
        assert_eq!(reg.len(), 3);
        assert_eq!(reg.index_of("conv1/weight"), Some(TensorIndex(0)));
        assert_eq!(reg.index_of("conv1/bias"), Some(TensorIndex(1)));
        assert_eq!(reg.index_of("fc/logits"), Some(TensorIndex(2)));
        assert_eq!(reg.index_of("missing"), None);
    }

    #[test]
    fn iteration_preserves_insertion_order() {
        let names = ["z:0", "a:0", "m:0"];
        let reg = TensorRegistry::build(names).unwrap();
        let seen: Vec<_> = reg.iter().collect();
        assert_eq!(
            seen,
            vec![
                (TensorIndex(0), "z:0"),
                (TensorIndex(1), "a:0"),
                (TensorIndex(2), "m:0"),
            ]
        );
    }

    #[test]
    fn name_of_inverts_index_of() {
        let reg = TensorRegistry::build(["x", "y"]).unwrap();
        for (idx, name) in reg.iter() {
            assert_eq!(reg.name_of(idx), Some(name));
            assert_eq!(reg.index_of(name), Some(idx));
        }
        assert_eq!(reg.name_of(TensorIndex(2)), None);
    }

    #[test]
    fn empty_input_builds_empty_registry() {
        let reg = TensorRegistry::build(Vec::<String>::new()).unwrap();
        assert!(reg.is_empty());
        assert_eq!(reg.iter().count(), 0);
    }

    #[test]
    fn duplicate_name_is_rejected_with_positions() {
        let err = TensorRegistry::build(["a", "b", "a"]).unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateTensor {
                name: "a".to_string(),
                first: TensorIndex(0),
                position: 2,
            }
        );
        assert_eq!(err.to_diagnostic().code, Some(codes::E0001));
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = TensorRegistry::build(["a", ""]).unwrap_err();
        assert_eq!(err, RegistryError::EmptyName { position: 1 });
        assert!(err.to_string().contains("position 1"));
    }

    #[test]
    fn registry_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TensorRegistry>();
    }
}
