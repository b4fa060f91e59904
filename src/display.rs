use std::fmt::Write;

use crate::domain::{Circuit, ComponentId};

/// Render every power source tree, one `+ <summary>` line per component,
/// indented one tab per level
pub fn render_circuit(circuit: &Circuit) -> String {
    circuit
        .roots()
        .map(|root| render_tree(circuit, root.id()))
        .collect()
}

/// Render the tree below `id`
pub fn render_tree(circuit: &Circuit, id: ComponentId) -> String {
    let mut out = String::new();
    render_subtree(circuit, id, 0, &mut out);
    out
}

fn render_subtree(circuit: &Circuit, id: ComponentId, depth: usize, out: &mut String) {
    let Some(component) = circuit.get(id) else {
        return;
    };
    // Writing into a String cannot fail
    let _ = writeln!(out, "{}+ {}", "\t".repeat(depth), component);
    for &load in component.loads() {
        render_subtree(circuit, load, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_circuit;

    #[test]
    fn test_render_indents_by_depth() {
        let mut circuit = parse_circuit(
            "PowerSource S\nCircuitBreaker B S 10\nAppliance A B 4\nOutlet O S\n",
        )
        .unwrap();
        circuit.power_up();
        circuit.toggle_by_name("B").unwrap();
        circuit.toggle_by_name("A").unwrap();

        let rendered = render_circuit(&circuit);
        let expected = "\
+ PowerSource S (draw 4)
\t+ CircuitBreaker B (on; draw 4; limit 10)
\t\t+ Appliance A (on; draw 4)
\t+ Outlet O (on; draw 0)
";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_render_all_roots_in_order() {
        let circuit = parse_circuit("PowerSource S1\nPowerSource S2\n").unwrap();
        assert_eq!(
            render_circuit(&circuit),
            "+ PowerSource S1 (draw 0)\n+ PowerSource S2 (draw 0)\n"
        );
    }

    #[test]
    fn test_render_subtree() {
        let circuit = parse_circuit("PowerSource S\nOutlet O S\nAppliance A O 2\n").unwrap();
        let outlet = circuit.find("O").unwrap();
        assert_eq!(
            render_tree(&circuit, outlet),
            "+ Outlet O (off; draw 0)\n\t+ Appliance A (off; rating 2)\n"
        );
    }
}
