//! Static dependency graph over registered bindings.
//!
//! Built on demand by [`Container::validate`](crate::Container::validate)
//! from the declared dependency lists captured at registration. A linear
//! scan plus depth-first search is plenty here: registries hold tens of
//! types and validation runs once at wiring time.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};

use crate::identity::{Dependency, TypeKey};

#[derive(Debug, Default)]
pub(crate) struct DependencyGraph {
    nodes: HashMap<TypeId, Node>,
}

#[derive(Debug)]
struct Node {
    key: TypeKey,
    dependencies: Vec<Dependency>,
}

#[derive(Clone, Copy, PartialEq)]
enum Visit {
    InProgress,
    Done,
}

impl DependencyGraph {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, key: TypeKey, dependencies: Vec<Dependency>) {
        self.nodes.insert(key.id(), Node { key, dependencies });
    }

    /// First required dependency not covered by `satisfied`, reported as
    /// (dependent, missing).
    pub(crate) fn missing_dependency(
        &self,
        satisfied: &HashSet<TypeId>,
    ) -> Option<(TypeKey, TypeKey)> {
        for node in self.nodes.values() {
            for dep in &node.dependencies {
                if dep.required && !satisfied.contains(&dep.key.id()) {
                    return Some((node.key, dep.key));
                }
            }
        }
        None
    }

    /// Searches for a dependency cycle and returns the closed chain when
    /// one exists. Edges into types with no node of their own cannot close
    /// a cycle and are skipped.
    pub(crate) fn find_cycle(&self) -> Option<Vec<TypeKey>> {
        let mut state: HashMap<TypeId, Visit> = HashMap::new();
        let mut path: Vec<TypeKey> = Vec::new();
        for id in self.nodes.keys() {
            if let Some(cycle) = self.visit(*id, &mut state, &mut path) {
                return Some(cycle);
            }
        }
        None
    }

    fn visit(
        &self,
        id: TypeId,
        state: &mut HashMap<TypeId, Visit>,
        path: &mut Vec<TypeKey>,
    ) -> Option<Vec<TypeKey>> {
        match state.get(&id) {
            Some(Visit::Done) => return None,
            Some(Visit::InProgress) => {
                // In-progress nodes are always on the current path.
                let start = path
                    .iter()
                    .position(|entry| entry.id() == id)
                    .unwrap_or(0);
                let mut cycle: Vec<TypeKey> = path[start..].to_vec();
                cycle.push(self.nodes[&id].key);
                return Some(cycle);
            }
            None => {}
        }

        let node = self.nodes.get(&id)?;
        state.insert(id, Visit::InProgress);
        path.push(node.key);
        for dep in &node.dependencies {
            if let Some(cycle) = self.visit(dep.key.id(), state, path) {
                return Some(cycle);
            }
        }
        path.pop();
        state.insert(id, Visit::Done);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Dependency;

    struct A;
    struct B;
    struct C;

    fn key<T: 'static>() -> TypeKey {
        TypeKey::of::<T>()
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        let mut graph = DependencyGraph::new();
        graph.insert(key::<A>(), vec![Dependency::required(key::<B>()), Dependency::required(key::<C>())]);
        graph.insert(key::<B>(), vec![Dependency::required(key::<C>())]);
        graph.insert(key::<C>(), vec![]);
        assert!(graph.find_cycle().is_none());
    }

    #[test]
    fn two_party_cycle_is_found() {
        let mut graph = DependencyGraph::new();
        graph.insert(key::<A>(), vec![Dependency::required(key::<B>())]);
        graph.insert(key::<B>(), vec![Dependency::required(key::<A>())]);
        let cycle = graph.find_cycle().expect("cycle should be reported");
        assert_eq!(cycle.first(), cycle.last());
        assert!(cycle.len() >= 3);
    }

    #[test]
    fn missing_skips_optional_dependencies() {
        let mut graph = DependencyGraph::new();
        graph.insert(
            key::<A>(),
            vec![Dependency::optional(key::<B>()), Dependency::required(key::<C>())],
        );
        let satisfied: HashSet<_> = [key::<A>().id(), key::<C>().id()].into_iter().collect();
        assert!(graph.missing_dependency(&satisfied).is_none());

        let satisfied: HashSet<_> = [key::<A>().id()].into_iter().collect();
        let (dependent, missing) = graph.missing_dependency(&satisfied).expect("C is missing");
        assert_eq!(dependent, key::<A>());
        assert_eq!(missing, key::<C>());
    }
}
