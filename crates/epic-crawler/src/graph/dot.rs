//! Graphviz DOT serialization of an [`EpicGraph`].
//!
//! Layout of the generated source:
//! 1. graph label (the root epic title), pinned to the top
//! 2. every node with its fill color
//! 3. one `cluster_<epic>` subgraph per foreign epic listing its members
//! 4. every edge, in insertion order

use super::EpicGraph;

/// Quote and escape a string as a DOT identifier
fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Serialize `graph` as a DOT digraph.
///
/// # Example
/// ```
/// use epic_crawler::domain::Issue;
/// use epic_crawler::graph::{dot, EpicGraph};
///
/// let mut graph = EpicGraph::new("Launch");
/// graph.upsert_node(&Issue::new("ISS-1", "In Progress", None));
///
/// let source = dot::to_dot(&graph);
/// assert!(source.contains("label=\"Launch\""));
/// assert!(source.contains("\"ISS-1\" [style=filled, fillcolor=yellow]"));
/// ```
pub fn to_dot(graph: &EpicGraph) -> String {
    let mut output = String::from("digraph epic_dependencies {\n");
    output.push_str(&format!("  label={};\n", quote(graph.title())));
    output.push_str("  labelloc=t;\n\n");

    for node in graph.nodes() {
        output.push_str(&format!(
            "  {} [style=filled, fillcolor={}];\n",
            quote(node.key.as_str()),
            node.fill_color
        ));
    }

    for cluster in graph.clusters() {
        output.push('\n');
        output.push_str(&format!(
            "  subgraph {} {{\n",
            quote(&format!("cluster_{}", cluster.epic))
        ));
        output.push_str(&format!("    label={};\n", quote(&cluster.label)));
        for member in &cluster.members {
            output.push_str(&format!("    {};\n", quote(member.as_str())));
        }
        output.push_str("  }\n");
    }

    if graph.edge_count() > 0 {
        output.push('\n');
    }
    for (blocked, blocker) in graph.edges() {
        output.push_str(&format!(
            "  {} -> {};\n",
            quote(blocked.as_str()),
            quote(blocker.as_str())
        ));
    }

    output.push_str("}\n");
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EpicKey, Issue, IssueKey};

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("plain"), "\"plain\"");
        assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(quote("a\\b"), "\"a\\\\b\"");
        assert_eq!(quote("two\nlines"), "\"two\\nlines\"");
    }

    #[test]
    fn test_empty_graph() {
        let dot = to_dot(&EpicGraph::new("Nothing yet"));
        assert_eq!(
            dot,
            "digraph epic_dependencies {\n  label=\"Nothing yet\";\n  labelloc=t;\n\n}\n"
        );
    }

    #[test]
    fn test_full_graph_layout() {
        let mut graph = EpicGraph::new("Launch");
        let source = graph.upsert_node(&Issue::new("ISS-1", "Finished", None));
        let blocker = graph.upsert_node(&Issue::new("ISS-9", "Testing", None));
        graph.add_edge(source, blocker);
        graph.add_to_cluster(&EpicKey::from("EPIC-2"), "Infra \"core\"", &IssueKey::from("ISS-9"));

        let dot = to_dot(&graph);
        let expected = "\
digraph epic_dependencies {
  label=\"Launch\";
  labelloc=t;

  \"ISS-1\" [style=filled, fillcolor=green];
  \"ISS-9\" [style=filled, fillcolor=green];

  subgraph \"cluster_EPIC-2\" {
    label=\"Infra \\\"core\\\"\";
    \"ISS-9\";
  }

  \"ISS-1\" -> \"ISS-9\";
}
";
        assert_eq!(dot, expected);
    }

    #[test]
    fn test_duplicate_edges_are_kept() {
        let mut graph = EpicGraph::new("t");
        let a = graph.upsert_node(&Issue::new("A-1", "Open", None));
        let b = graph.upsert_node(&Issue::new("B-1", "Open", None));
        graph.add_edge(a, b);
        graph.add_edge(a, b);

        assert_eq!(to_dot(&graph).matches("\"A-1\" -> \"B-1\";").count(), 2);
    }
}
