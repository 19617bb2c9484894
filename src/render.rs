use std::fmt::Write;

use crate::network::LayerNetwork;
use crate::util::Float;

/// One neuron as a visualization collaborator sees it: display caption
/// with the value rounded to 2 decimals, plus a grayscale fill.
pub struct NodeSpec {
    pub caption: String,
    pub value: Float,
    pub fill_color: String,
}

/// One connection between consecutive layers, weight exposed as the
/// edge label.
pub struct EdgeSpec {
    pub from: String,
    pub to: String,
    pub weight: Float,
}

pub struct GraphSpec {
    pub nodes: Vec<NodeSpec>,
    pub edges: Vec<EdgeSpec>,
}

/// Grayscale hex color proportional to an activation in [0, 1].
pub fn fill_color(value: Float) -> String {
    let level = ((value * 255.0).round() as i64).clamp(0, 255) as u8;
    format!("#{:0>2x}{:0>2x}{:0>2x}", level, level, level)
}

fn caption(label: &str, value: Float) -> String {
    format!("{} = {:.2}", label, value)
}

impl GraphSpec {
    /// Captures the network's current values, labels and weights.
    pub fn snapshot(net: &LayerNetwork) -> Self {
        let mut nodes = Vec::new();
        let mut edges = Vec::new();

        for layer in &net.layers {
            for neuron in &layer.neurons {
                nodes.push(NodeSpec {
                    caption: caption(&neuron.label(), neuron.value),
                    value: neuron.value,
                    fill_color: fill_color(neuron.value),
                });
            }
        }

        for (old, new) in net.layers.iter().zip(net.layers.iter().skip(1)) {
            for old_n in &old.neurons {
                for new_n in &new.neurons {
                    edges.push(EdgeSpec {
                        from: caption(&old_n.label(), old_n.value),
                        to: caption(&new_n.label(), new_n.value),
                        weight: new_n.weights[old_n.index],
                    });
                }
            }
        }

        GraphSpec { nodes, edges }
    }

    /// Left-to-right DOT digraph, renderable with any graphviz tool.
    pub fn to_dot(&self, graph_label: Option<&str>) -> String {
        let mut out = String::new();

        out += "digraph network {\n";
        out += "    rankdir=LR;\n";
        out += "    ranksep=4;\n";

        if let Some(label) = graph_label {
            let _ = writeln!(out, "    label=\"{}\";", label);
        }

        for node in &self.nodes {
            let _ = writeln!(
                out,
                "    \"{}\" [shape=circle, style=filled, fillcolor=\"{}\"];",
                node.caption, node.fill_color
            );
        }

        for edge in &self.edges {
            let _ = writeln!(
                out,
                "    \"{}\" -> \"{}\" [label=\"{}\"];",
                edge.from, edge.to, edge.weight
            );
        }

        out += "}\n";
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::Cost;
    use ndarray::array;

    #[test]
    fn fill_color_is_grayscale_hex() {
        assert_eq!(fill_color(0.0), "#000000");
        assert_eq!(fill_color(1.0), "#ffffff");
        assert_eq!(fill_color(0.5), "#808080");
    }

    #[test]
    fn snapshot_covers_all_neurons_and_connections() {
        let mut net = LayerNetwork::new_seeded(vec![2, 3, 1], Cost::Quadratic, 4).unwrap();
        net.feed_input(&array![1.0, 0.0]).unwrap();

        let graph = GraphSpec::snapshot(&net);

        assert_eq!(graph.nodes.len(), 6);
        assert_eq!(graph.edges.len(), 2 * 3 + 3 * 1);
        assert!(graph.nodes[0].caption.starts_with("A0 = "));
    }

    #[test]
    fn dot_output_names_nodes_and_edges() {
        let mut net = LayerNetwork::new_seeded(vec![1, 1], Cost::Quadratic, 4).unwrap();
        net.feed_input(&array![1.0]).unwrap();

        let dot = GraphSpec::snapshot(&net).to_dot(Some("net"));

        assert!(dot.starts_with("digraph network {"));
        assert!(dot.contains("rankdir=LR"));
        assert!(dot.contains("A0 = 1.00"));
        assert!(dot.contains("->"));
    }
}
