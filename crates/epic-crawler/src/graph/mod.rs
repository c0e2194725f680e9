//! Assembled dependency graph and the rules that build it.
//!
//! An [`EpicGraph`] is the complete instruction set handed to a renderer:
//! a title, styled issue nodes, "is blocked by" edges, and one cluster per
//! foreign epic.
//!
//! ## Edge Direction Convention
//!
//! Edges point from the blocked issue to its blocker (dependent -> dependency):
//! if `ISS-1` is blocked by `ISS-9` the edge is `ISS-1 -> ISS-9`.
//!
//! ## Node Identity
//!
//! Nodes are keyed by issue key. Declaring a node that already exists is an
//! idempotent upsert: the first declaration wins and no duplicate is added.
//! Edges are not deduplicated; every (source, blocker) occurrence yields one.

pub mod color;
pub mod dot;

use crate::crawl::registry::EpicRegistry;
use crate::domain::{DependencyMap, EpicKey, Issue, IssueKey};
use crate::error::{Error, Result};
use color::{status_color, StatusColor};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

/// A styled issue node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    /// Issue key, also the node identifier
    pub key: IssueKey,
    /// Fill color derived from the issue status
    pub fill_color: StatusColor,
}

/// Nodes grouped under a foreign epic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    /// Epic the members belong to
    pub epic: EpicKey,
    /// Display label (the epic title)
    pub label: String,
    /// Member node keys, each at most once, in first-seen order
    pub members: Vec<IssueKey>,
}

/// Renderer-agnostic dependency graph
#[derive(Debug, Clone, Default)]
pub struct EpicGraph {
    title: String,
    graph: DiGraph<GraphNode, ()>,
    node_map: HashMap<IssueKey, NodeIndex>,
    clusters: Vec<Cluster>,
    cluster_index: HashMap<EpicKey, usize>,
}

impl EpicGraph {
    /// Create an empty graph with the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Declare a node for `issue`, or return the existing one
    pub fn upsert_node(&mut self, issue: &Issue) -> NodeIndex {
        if let Some(&index) = self.node_map.get(&issue.key) {
            return index;
        }
        let index = self.graph.add_node(GraphNode {
            key: issue.key.clone(),
            fill_color: status_color(&issue.status),
        });
        self.node_map.insert(issue.key.clone(), index);
        index
    }

    /// Add a "blocked by" edge between two declared nodes
    pub fn add_edge(&mut self, blocked: NodeIndex, blocker: NodeIndex) {
        self.graph.add_edge(blocked, blocker, ());
    }

    /// Place `member` in the cluster for `epic`, creating it on first use
    pub fn add_to_cluster(&mut self, epic: &EpicKey, label: &str, member: &IssueKey) {
        let position = match self.cluster_index.get(epic) {
            Some(&position) => position,
            None => {
                self.clusters.push(Cluster {
                    epic: epic.clone(),
                    label: label.to_string(),
                    members: Vec::new(),
                });
                self.cluster_index.insert(epic.clone(), self.clusters.len() - 1);
                self.clusters.len() - 1
            }
        };

        let cluster = &mut self.clusters[position];
        if !cluster.members.contains(member) {
            cluster.members.push(member.clone());
        }
    }

    /// Graph title, shown as the top label
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Nodes in declaration order
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.node_indices().map(|index| &self.graph[index])
    }

    /// Look up a node by key
    pub fn node(&self, key: &IssueKey) -> Option<&GraphNode> {
        self.node_map.get(key).map(|&index| &self.graph[index])
    }

    /// Edges as `(blocked, blocker)` key pairs, in insertion order
    pub fn edges(&self) -> impl Iterator<Item = (&IssueKey, &IssueKey)> {
        self.graph.edge_references().map(|edge| {
            (
                &self.graph[edge.source()].key,
                &self.graph[edge.target()].key,
            )
        })
    }

    /// Number of edges ending at `key` (how many times it blocks something)
    pub fn incoming_edge_count(&self, key: &IssueKey) -> usize {
        self.node_map.get(key).map_or(0, |&index| {
            self.graph
                .edges_directed(index, Direction::Incoming)
                .count()
        })
    }

    /// Clusters in creation order
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// The cluster containing `key`, if any
    pub fn cluster_of(&self, key: &IssueKey) -> Option<&Cluster> {
        self.clusters
            .iter()
            .find(|cluster| cluster.members.contains(key))
    }

    /// Number of distinct nodes
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges, duplicates included
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

/// Turn a dependency map and epic registry into an [`EpicGraph`].
///
/// - every source issue becomes a node filled by status color
/// - every (source, blocker) pair becomes an edge `source -> blocker`
/// - every blocker owned by a foreign epic joins that epic's cluster
///
/// The root epic's title becomes the graph title.
///
/// # Errors
///
/// Returns `Error::EpicNotFound` if a blocker's foreign epic is missing
/// from `registry`.
pub fn assemble(
    dependencies: &DependencyMap,
    registry: &EpicRegistry,
    root: &EpicKey,
) -> Result<EpicGraph> {
    let mut graph = EpicGraph::new(registry.root().title.clone());

    for entry in dependencies {
        let source = graph.upsert_node(&entry.source);

        for blocker in &entry.blockers {
            let target = graph.upsert_node(blocker);
            graph.add_edge(source, target);

            if let Some(epic) = blocker.foreign_epic(root) {
                let label = registry
                    .get(epic)
                    .map(|epic| epic.title.as_str())
                    .ok_or_else(|| Error::EpicNotFound(epic.clone()))?;
                graph.add_to_cluster(epic, label, &blocker.key);
            }
        }
    }

    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        clusters = graph.clusters().len(),
        "Assembled dependency graph"
    );
    Ok(graph)
}
