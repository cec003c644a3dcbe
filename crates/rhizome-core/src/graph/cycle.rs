// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Cycle detection by reverse topological reduction (Kahn's algorithm run from the roots
//! that nothing depends on).

use crate::error::ResourceError;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// An error indicating that the reduction could not consume every dependency edge.
///
/// This is a detection, not a diagnosis: the members of the cycle are not reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError {
    /// Number of dependency edges left unconsumed.
    pub unresolved_edges: usize,
}

impl From<CycleError> for ResourceError {
    fn from(err: CycleError) -> Self {
        ResourceError::CyclicDependency {
            unresolved_edges: err.unresolved_edges,
        }
    }
}

/// One node of the graph handed to [`reduce_dependencies`].
#[derive(Debug, Clone, Copy)]
pub struct DependencyEntry<'a, K> {
    /// The node identifier.
    pub id: &'a K,
    /// How many edges of the graph name this node as a dependency.
    pub dependent_count: usize,
    /// The identifiers this node depends on, one per edge.
    pub dependencies: &'a [K],
}

/// Reduces a dependency graph from its roots down to its leaves.
///
/// The worklist is seeded with every node whose `dependent_count` is zero. Each
/// popped node consumes its outgoing edges, decrementing the working counter of
/// each dependency; a dependency whose counter reaches zero is enqueued.
///
/// # Returns
///
/// * `Ok(Vec<&K>)`: the nodes in reduction order (dependents before their dependencies).
/// * `Err(CycleError)`: if fewer edges were consumed than the graph holds.
pub fn reduce_dependencies<'a, K>(
    entries: impl IntoIterator<Item = DependencyEntry<'a, K>>,
) -> Result<Vec<&'a K>, CycleError>
where
    K: Eq + Hash,
{
    let entry_list: Vec<DependencyEntry<'a, K>> = entries.into_iter().collect();
    let total_edges: usize = entry_list.iter().map(|e| e.dependencies.len()).sum();

    let mut remaining: HashMap<&'a K, usize> = entry_list
        .iter()
        .map(|e| (e.id, e.dependent_count))
        .collect();
    let dependencies: HashMap<&'a K, &'a [K]> =
        entry_list.iter().map(|e| (e.id, e.dependencies)).collect();

    let mut queue: VecDeque<&'a K> = entry_list
        .iter()
        .filter(|e| e.dependent_count == 0)
        .map(|e| e.id)
        .collect();

    let mut order = Vec::with_capacity(entry_list.len());
    let mut consumed_edges = 0usize;
    while let Some(node) = queue.pop_front() {
        order.push(node);
        let Some(&deps) = dependencies.get(node) else {
            continue;
        };
        for dep in deps {
            consumed_edges += 1;
            if let Some(counter) = remaining.get_mut(dep) {
                if *counter > 0 {
                    *counter -= 1;
                    if *counter == 0 {
                        queue.push_back(dep);
                    }
                }
            }
        }
    }

    if consumed_edges < total_edges {
        Err(CycleError {
            unresolved_edges: total_edges - consumed_edges,
        })
    } else {
        Ok(order)
    }
}
