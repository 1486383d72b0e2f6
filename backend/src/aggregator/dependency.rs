//! Dependency Graph
//!
//! Maps a fired jump to the jumps whose rates may now be stale. Built once,
//! before initialization, from an optional user adjacency list.
//!
//! # Normalization
//!
//! Every dependency set is sorted, de-duplicated and made to contain its own
//! jump (a fired jump must always be resampled). The step is idempotent.
//!
//! # Determinism
//!
//! Resampling walks each set in ascending index order, so the random stream
//! does not depend on how the user happened to order the adjacency list.

use super::error::ConfigError;

/// Normalized dependency graph over jump indices `0..N`
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyGraph {
    dependents: Vec<Vec<usize>>,
}

impl DependencyGraph {
    /// Validate and normalize a user adjacency list
    ///
    /// # Example
    /// ```
    /// use jump_simulator_core_rs::aggregator::DependencyGraph;
    ///
    /// let graph = DependencyGraph::new(vec![vec![1], vec![], vec![0, 0]]).unwrap();
    /// assert_eq!(graph.dependents(0), &[0, 1]);
    /// assert_eq!(graph.dependents(1), &[1]);
    /// assert_eq!(graph.dependents(2), &[0, 2]);
    /// ```
    pub fn new(adjacency: Vec<Vec<usize>>) -> Result<Self, ConfigError> {
        let num_jumps = adjacency.len();
        let mut dependents = adjacency;

        for (jump, deps) in dependents.iter_mut().enumerate() {
            if let Some(&dependency) = deps.iter().find(|&&d| d >= num_jumps) {
                return Err(ConfigError::UnknownDependency {
                    jump,
                    dependency,
                    num_jumps,
                });
            }
            deps.push(jump);
            deps.sort_unstable();
            deps.dedup();
        }

        Ok(Self { dependents })
    }

    /// Pre-flight check used by the queue method
    ///
    /// - adjacency present → validated, normalized graph
    /// - adjacency absent, no conditional jumps → `None` (never consulted)
    /// - adjacency absent, conditional jumps present → configuration error
    pub fn build(
        adjacency: Option<Vec<Vec<usize>>>,
        num_jumps: usize,
        has_conditional: bool,
    ) -> Result<Option<Self>, ConfigError> {
        match adjacency {
            Some(adjacency) => {
                if adjacency.len() != num_jumps {
                    return Err(ConfigError::DependencyGraphSize {
                        expected: num_jumps,
                        actual: adjacency.len(),
                    });
                }
                Self::new(adjacency).map(Some)
            }
            None if has_conditional => Err(ConfigError::MissingDependencyGraph),
            None => Ok(None),
        }
    }

    /// Jumps to resample after `jump` fires (always includes `jump`)
    pub fn dependents(&self, jump: usize) -> &[usize] {
        self.dependents
            .get(jump)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, jump: usize, dependent: usize) -> bool {
        self.dependents(jump).binary_search(&dependent).is_ok()
    }

    pub fn num_jumps(&self) -> usize {
        self.dependents.len()
    }

    /// The normalized adjacency list
    pub fn as_adjacency(&self) -> &[Vec<usize>] {
        &self.dependents
    }
}
