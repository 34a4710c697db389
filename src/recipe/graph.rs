// src/recipe/graph.rs

//! Option setting dependency graph
//!
//! Option settings may declare `DependsOn` conditions on other settings of
//! the same recipe. This module records those conditions as a directed
//! graph keyed by fully qualified setting id, so the resolver can answer
//! "which settings must be re-validated when X changes" without scanning
//! the whole recipe tree.
//!
//! # Example
//!
//! ```ignore
//! use recipe_resolver::recipe::graph::DependencyGraph;
//!
//! let mut graph = DependencyGraph::new();
//! graph.add_setting("Subnets", &["UseVPC"]);
//! graph.add_setting("SecurityGroups", &["UseVPC"]);
//!
//! let dependents = graph.transitive_dependents("UseVPC");
//! // dependents: {"Subnets", "SecurityGroups"}
//! ```
//!
//! The graph is built once when a recipe is loaded and is never mutated
//! afterwards.

use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet, VecDeque};

/// A directed graph of `DependsOn` relationships between option settings
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Key: setting id, Value: settings whose values it depends on
    edges: HashMap<String, HashSet<String>>,
    /// Key: setting id, Value: settings that depend on it
    reverse_edges: HashMap<String, HashSet<String>>,
}

impl DependencyGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a setting with the settings it depends on
    ///
    /// Adding the same setting twice merges its dependencies.
    pub fn add_setting(&mut self, id: &str, dependencies: &[&str]) {
        let id = id.to_string();

        self.edges.entry(id.clone()).or_default();
        self.reverse_edges.entry(id.clone()).or_default();

        for dep in dependencies {
            let dep = dep.to_string();

            self.edges.entry(dep.clone()).or_default();
            self.edges.entry(id.clone()).or_default().insert(dep.clone());
            self.reverse_edges
                .entry(dep)
                .or_default()
                .insert(id.clone());
        }
    }

    /// Number of settings known to the graph
    pub fn setting_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether a setting is part of the graph
    pub fn contains(&self, id: &str) -> bool {
        self.edges.contains_key(id)
    }

    /// Settings that `id` directly depends on
    pub fn dependencies(&self, id: &str) -> Option<&HashSet<String>> {
        self.edges.get(id)
    }

    /// Settings that directly depend on `id`
    pub fn dependents(&self, id: &str) -> Option<&HashSet<String>> {
        self.reverse_edges.get(id)
    }

    /// Every setting whose displayability can change when `id` changes,
    /// sorted for stable iteration
    pub fn transitive_dependents(&self, id: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();

        if let Some(direct) = self.reverse_edges.get(id) {
            queue.extend(direct.iter().map(String::as_str));
        }

        while let Some(dependent) = queue.pop_front() {
            if dependent == id || !seen.insert(dependent.to_string()) {
                continue;
            }
            if let Some(indirect) = self.reverse_edges.get(dependent) {
                queue.extend(
                    indirect
                        .iter()
                        .map(String::as_str)
                        .filter(|s| !seen.contains(*s)),
                );
            }
        }

        let mut dependents: Vec<String> = seen.into_iter().collect();
        dependents.sort();
        dependents
    }

    /// Order settings so every dependency precedes its dependents (Kahn's algorithm)
    ///
    /// Fails when the `DependsOn` relationships form a cycle, since such a
    /// recipe could never decide whether the settings involved are shown.
    pub fn topological_sort(&self) -> Result<Vec<String>> {
        let mut in_degrees: HashMap<&str, usize> = self
            .edges
            .iter()
            .map(|(id, deps)| (id.as_str(), deps.len()))
            .collect();

        let mut ready: Vec<&str> = in_degrees
            .iter()
            .filter(|&(_, deg)| *deg == 0)
            .map(|(id, _)| *id)
            .collect();
        ready.sort_unstable();
        let mut queue: VecDeque<&str> = ready.into();
        let mut result = Vec::with_capacity(self.edges.len());

        while let Some(node) = queue.pop_front() {
            result.push(node.to_string());

            if let Some(dependents) = self.reverse_edges.get(node) {
                let mut unlocked = Vec::new();
                for dependent in dependents {
                    if let Some(deg) = in_degrees.get_mut(dependent.as_str()) {
                        *deg = deg.saturating_sub(1);
                        if *deg == 0 {
                            unlocked.push(dependent.as_str());
                        }
                    }
                }
                unlocked.sort_unstable();
                queue.extend(unlocked);
            }
        }

        if result.len() != self.edges.len() {
            let mut remaining: Vec<&str> = self
                .edges
                .keys()
                .map(String::as_str)
                .filter(|k| !result.iter().any(|r| r == k))
                .collect();
            remaining.sort_unstable();

            return Err(Error::InvalidRecipe(format!(
                "Circular DependsOn relationship between option settings: {}",
                remaining.join(", ")
            )));
        }

        Ok(result)
    }
}
