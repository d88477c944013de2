use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::descriptor::{EntityDescriptor, RelationshipKind};

/// Directed "depends on" graph built from many-to-one relationships.
///
/// Nodes keep descriptor order and out-edges keep relationship declaration
/// order, so every traversal over the graph is deterministic.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<String>,
    edges: BTreeMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn from_descriptors(entities: &[EntityDescriptor]) -> Self {
        let known: BTreeSet<&str> = entities.iter().map(|entity| entity.name.as_str()).collect();
        let mut graph = DependencyGraph::default();

        for entity in entities {
            graph.nodes.push(entity.name.clone());
            let targets = graph.edges.entry(entity.name.clone()).or_default();
            for target in entity.many_to_one_targets() {
                if known.contains(target) && !targets.iter().any(|existing| existing == target) {
                    targets.push(target.to_string());
                }
            }
        }

        graph
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn targets(&self, node: &str) -> &[String] {
        self.edges.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    pub fn remove_edge(&mut self, from: &str, to: &str) {
        if let Some(targets) = self.edges.get_mut(from) {
            targets.retain(|target| target != to);
        }
    }

    /// First cycle reachable in declaration order, as the path that closes it.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let mut visited: BTreeSet<&str> = BTreeSet::new();

        for start in &self.nodes {
            if visited.contains(start.as_str()) {
                continue;
            }
            visited.insert(start.as_str());
            let mut path: Vec<(&str, usize)> = vec![(start.as_str(), 0)];

            while let Some(&(node, cursor)) = path.last() {
                let Some(target) = self.targets(node).get(cursor) else {
                    path.pop();
                    continue;
                };
                if let Some(position) = path.iter().position(|(on_path, _)| *on_path == target) {
                    let mut cycle: Vec<String> = path[position..]
                        .iter()
                        .map(|(name, _)| name.to_string())
                        .collect();
                    cycle.push(target.clone());
                    return Some(cycle);
                }
                if let Some(frame) = path.last_mut() {
                    frame.1 += 1;
                }
                if visited.insert(target.as_str()) {
                    path.push((target.as_str(), 0));
                }
            }
        }

        None
    }

    /// Depth-first search that removes the closing edge of every cycle it meets.
    ///
    /// When node `n` on top of the path reaches a node `t` that is already on
    /// the path, the edge `n -> t` is dropped and the scan of `n` resumes at
    /// the same cursor position.
    fn break_cycles(&mut self) -> Vec<(String, String)> {
        let mut visited: BTreeSet<String> = BTreeSet::new();
        let mut broken = Vec::new();
        let nodes = self.nodes.clone();

        for start in nodes {
            if !visited.insert(start.clone()) {
                continue;
            }
            let mut path: Vec<(String, usize)> = vec![(start, 0)];

            while let Some((node, cursor)) = path.last().cloned() {
                let Some(target) = self.targets(&node).get(cursor).cloned() else {
                    path.pop();
                    continue;
                };
                if path.iter().any(|(on_path, _)| *on_path == target) {
                    self.remove_edge(&node, &target);
                    broken.push((node, target));
                    continue;
                }
                if let Some(frame) = path.last_mut() {
                    frame.1 += 1;
                }
                if visited.insert(target.clone()) {
                    path.push((target, 0));
                }
            }
        }

        broken
    }

    /// Dependencies-first ordering; `Err` carries the nodes left on a cycle.
    pub fn generation_order(&self) -> Result<Vec<String>, Vec<String>> {
        let position: BTreeMap<&str, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.as_str(), index))
            .collect();
        let mut pending: BTreeMap<&str, usize> = BTreeMap::new();
        let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

        for node in &self.nodes {
            pending.insert(node.as_str(), self.targets(node).len());
            for target in self.targets(node) {
                dependents.entry(target.as_str()).or_default().push(node.as_str());
            }
        }

        let mut ready: BTreeSet<(usize, &str)> = pending
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(node, _)| (position[node], *node))
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(entry) = ready.iter().next().copied() {
            ready.remove(&entry);
            let (_, node) = entry;
            order.push(node.to_string());

            for dependent in dependents.get(node).into_iter().flatten() {
                if let Some(count) = pending.get_mut(dependent) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        ready.insert((position[dependent], *dependent));
                    }
                }
            }
        }

        if order.len() == self.nodes.len() {
            Ok(order)
        } else {
            let emitted: BTreeSet<&str> = order.iter().map(String::as_str).collect();
            Err(self
                .nodes
                .iter()
                .filter(|node| !emitted.contains(node.as_str()))
                .cloned()
                .collect())
        }
    }
}

/// Edge removed while breaking a dependency cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokenEdge {
    pub source: String,
    pub target: String,
    /// Foreign-key properties of the relationships that were dropped.
    pub foreign_keys: Vec<String>,
}

/// Parent assignment and audit trail produced by cycle resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependencyResolution {
    pub parents: BTreeMap<String, Option<String>>,
    pub broken_edges: Vec<BrokenEdge>,
    /// Dependencies-first order over the acyclic graph.
    pub order: Vec<String>,
}

impl DependencyResolution {
    pub fn parent_of(&self, entity: &str) -> Option<&str> {
        self.parents.get(entity).and_then(|parent| parent.as_deref())
    }

    pub fn roots(&self) -> impl Iterator<Item = &str> {
        self.parents
            .iter()
            .filter(|(_, parent)| parent.is_none())
            .map(|(entity, _)| entity.as_str())
    }
}

/// Break relationship cycles and assign a parent to every entity.
///
/// Removed edges are also removed from the originating descriptor's
/// relationship list. The parent of an entity is the remaining many-to-one
/// target referenced by the most distinct entities, ties going to the
/// earliest declared relationship.
pub fn resolve_dependency_order(entities: &mut [EntityDescriptor]) -> DependencyResolution {
    let mut graph = DependencyGraph::from_descriptors(entities);
    let broken = graph.break_cycles();

    let mut broken_edges = Vec::with_capacity(broken.len());
    for (source, target) in broken {
        let mut foreign_keys = Vec::new();
        if let Some(entity) = entities.iter_mut().find(|entity| entity.name == source) {
            entity.relationships.retain(|relationship| {
                let drop = relationship.kind == RelationshipKind::ManyToOne
                    && relationship.target_entity == target;
                if drop {
                    if let Some(fk) = &relationship.foreign_key_property_name {
                        foreign_keys.push(fk.clone());
                    }
                }
                !drop
            });
        }
        warn!(
            source = %source,
            target = %target,
            foreign_keys = ?foreign_keys,
            "dependency cycle broken"
        );
        broken_edges.push(BrokenEdge {
            source,
            target,
            foreign_keys,
        });
    }

    let mut referenced_by: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for node in graph.nodes() {
        for target in graph.targets(node) {
            if target != node {
                referenced_by
                    .entry(target.as_str())
                    .or_default()
                    .insert(node.as_str());
            }
        }
    }

    let mut parents = BTreeMap::new();
    for node in graph.nodes() {
        let mut best: Option<(&str, usize)> = None;
        for target in graph.targets(node) {
            if target == node {
                continue;
            }
            let score = referenced_by.get(target.as_str()).map_or(0, BTreeSet::len);
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((target.as_str(), score));
            }
        }
        let parent = best.map(|(target, _)| target.to_string());
        debug!(entity = %node, parent = ?parent, "parent assigned");
        parents.insert(node.clone(), parent);
    }

    let order = match graph.generation_order() {
        Ok(order) => order,
        Err(remaining) => {
            // Unreachable once cycles are broken; keep declaration order for the rest.
            let mut order: Vec<String> = graph
                .nodes()
                .iter()
                .filter(|node| !remaining.contains(node))
                .cloned()
                .collect();
            order.extend(remaining);
            order
        }
    };

    info!(
        entities = graph.nodes().len(),
        edges = graph.edge_count(),
        broken = broken_edges.len(),
        "dependency order resolved"
    );

    DependencyResolution {
        parents,
        broken_edges,
        order,
    }
}
