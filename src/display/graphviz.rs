use crate::store::CurveGraph;
use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Renders the curve graph as Graphviz DOT.
///
/// Nodes are labelled `name (parameters)`. Each edge points from a curve to one of
/// its underlyings and is labelled with the block that the underlying occupies in
/// the curve's parameter vector. Exogenous underlyings appear as separate nodes
/// with `exogenous` edges.
pub fn to_dot(graph: &CurveGraph) -> String {
    let mut dag: DiGraph<String, String> = DiGraph::with_capacity(graph.count(), graph.count());
    let nodes: Vec<NodeIndex> = graph
        .ids()
        .map(|id| dag.add_node(format!("{} ({})", graph.name(id), graph.parameter_count(id))))
        .collect();
    let mut exogenous: HashMap<&str, NodeIndex> = HashMap::new();

    for id in graph.ids() {
        let mut offset = 0;
        for &underlying in graph.underlyings(id) {
            let len = graph.parameter_count(underlying);
            dag.add_edge(nodes[id.index()], nodes[underlying.index()], format!("{}..{}", offset, offset + len));
            offset += len;
        }
        for name in graph.exogenous_underlyings(id) {
            let node = *exogenous
                .entry(name)
                .or_insert_with(|| dag.add_node(format!("{} (exogenous)", name)));
            dag.add_edge(nodes[id.index()], node, "exogenous".to_string());
        }
    }

    format!("{}", Dot::new(&dag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_labels_nodes_and_blocks() {
        let graph = CurveGraph::builder()
            .add_curve("OIS", 2, &[])
            .add_curve("L3M", 5, &["OIS", "FX"])
            .add_curve("L6M", 4, &["FX"])
            .build()
            .unwrap();
        let dot = to_dot(&graph);

        assert!(dot.starts_with("digraph {"));
        assert!(dot.contains("label = \"OIS (2)\""));
        assert!(dot.contains("label = \"L3M (5)\""));
        assert!(dot.contains("label = \"0..2\""));
        // One shared node for the exogenous name.
        assert_eq!(dot.matches("FX (exogenous)").count(), 1);
        assert_eq!(dot.matches("label = \"exogenous\"").count(), 2);
        assert_eq!(dot.matches(" -> ").count(), 3);
    }

    #[test]
    fn test_empty_graph() {
        let dot = to_dot(&CurveGraph::default());
        assert!(!dot.contains("->"));
    }
}
