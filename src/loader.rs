//! # Circuit File Loader
//!
//! One component per line, whitespace separated:
//!
//! ```text
//! PowerSource    <name>
//! CircuitBreaker <name> <source> <limit>
//! Outlet         <name> <source>
//! Appliance      <name> <source> <rating>
//! ```
//!
//! Sources must be defined on an earlier line. Blank lines and lines
//! starting with `#` are skipped.

use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::domain::{Circuit, ComponentType};
use crate::error::{CircuitError, Result};

/// Read and build a circuit from a file
pub fn load_circuit(path: impl AsRef<Path>) -> Result<Circuit> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => CircuitError::FileNotFound(path.to_path_buf()),
        _ => CircuitError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let circuit = parse_circuit(&text)?;
    info!(
        path = %path.display(),
        components = circuit.len(),
        "circuit loaded"
    );
    Ok(circuit)
}

/// Build a circuit from circuit file text
pub fn parse_circuit(text: &str) -> Result<Circuit> {
    let mut circuit = Circuit::new();
    parse_into(&mut circuit, text)?;
    Ok(circuit)
}

/// Add the components described by `text` to an existing circuit
pub fn parse_into(circuit: &mut Circuit, text: &str) -> Result<()> {
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let tokens: Vec<&str> = raw.split_whitespace().collect();
        let Some((&type_token, args)) = tokens.split_first() else {
            continue;
        };
        if type_token.starts_with('#') {
            continue;
        }

        let name = *args
            .first()
            .ok_or_else(|| CircuitError::bad_format(line, "missing component name"))?;
        // Repeated names are reported before the type is looked at
        if circuit.find(name).is_some() {
            return Err(CircuitError::RepeatName(name.to_string()));
        }

        let component_type = ComponentType::from_str(type_token)
            .map_err(|_| CircuitError::UnknownComponentType(type_token.to_string()))?;

        match component_type {
            ComponentType::PowerSource => {
                expect_arity(component_type, args, 1, line)?;
                circuit.add_power_source(name)?;
            }
            ComponentType::CircuitBreaker => {
                expect_arity(component_type, args, 3, line)?;
                let source = circuit.lookup(args[1])?;
                let limit = parse_amount(args[2], "limit", line)?;
                if limit == 0 {
                    return Err(CircuitError::bad_format(line, "limit must be positive"));
                }
                circuit.add_circuit_breaker(name, source, limit)?;
            }
            ComponentType::Outlet => {
                expect_arity(component_type, args, 2, line)?;
                let source = circuit.lookup(args[1])?;
                circuit.add_outlet(name, source)?;
            }
            ComponentType::Appliance => {
                expect_arity(component_type, args, 3, line)?;
                let source = circuit.lookup(args[1])?;
                let rating = parse_amount(args[2], "rating", line)?;
                circuit.add_appliance(name, source, rating)?;
            }
        }
        debug!(line, name, kind = %component_type, "component defined");
    }
    Ok(())
}

fn expect_arity(
    component_type: ComponentType,
    args: &[&str],
    expected: usize,
    line: usize,
) -> Result<()> {
    if args.len() != expected {
        return Err(CircuitError::bad_format(
            line,
            format!(
                "{component_type} takes {expected} argument(s), got {}",
                args.len()
            ),
        ));
    }
    Ok(())
}

/// Ratings and limits are whole numbers in `0..=u32::MAX`
fn parse_amount(token: &str, what: &str, line: usize) -> Result<u32> {
    token.parse::<u32>().map_err(|_| {
        CircuitError::bad_format(
            line,
            format!("{what} must be a whole number up to {}, got '{token}'", u32::MAX),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HOUSE: &str = "\
# main panel
PowerSource Grid
CircuitBreaker Kitchen Grid 20
Outlet Counter Kitchen

Appliance Kettle Counter 12
Appliance Toaster Counter 9
";

    #[test]
    fn test_parse_builds_tree() {
        let circuit = parse_circuit(HOUSE).unwrap();
        assert_eq!(circuit.len(), 5);

        let counter = circuit.by_name("Counter").unwrap();
        let loads: Vec<&str> = counter
            .loads()
            .iter()
            .map(|id| circuit.get(*id).unwrap().name())
            .collect();
        assert_eq!(loads, vec!["Kettle", "Toaster"]);
        assert_eq!(circuit.by_name("Kitchen").unwrap().limit(), Some(20));
        assert_eq!(circuit.by_name("Kettle").unwrap().rating(), Some(12));
    }

    #[test]
    fn test_nothing_is_engaged_after_loading() {
        let circuit = parse_circuit(HOUSE).unwrap();
        assert!(circuit.components().all(|c| !c.is_engaged()));
    }

    #[test]
    fn test_repeat_name_checked_before_type() {
        let err = parse_circuit("PowerSource S\nBogus S x\n").unwrap_err();
        assert!(matches!(err, CircuitError::RepeatName(name) if name == "S"));
    }

    #[test]
    fn test_unknown_type() {
        let err = parse_circuit("PowerSource S\nFuse F S 3\n").unwrap_err();
        assert!(matches!(err, CircuitError::UnknownComponentType(t) if t == "Fuse"));
    }

    #[test]
    fn test_forward_reference_is_unknown_component() {
        let err = parse_circuit("Outlet O S\nPowerSource S\n").unwrap_err();
        assert!(matches!(err, CircuitError::UnknownComponent(name) if name == "S"));
    }

    #[test]
    fn test_bad_parameters() {
        let err = parse_circuit("PowerSource S\nCircuitBreaker B S ten\n").unwrap_err();
        assert!(matches!(err, CircuitError::BadFileFormat { line: 2, .. }));

        let err = parse_circuit("PowerSource S\nCircuitBreaker B S 0\n").unwrap_err();
        assert!(matches!(err, CircuitError::BadFileFormat { line: 2, .. }));

        let err = parse_circuit("PowerSource S\nAppliance A S -1\n").unwrap_err();
        assert!(matches!(err, CircuitError::BadFileFormat { line: 2, .. }));

        let err = parse_circuit("PowerSource S\nOutlet O\n").unwrap_err();
        assert!(matches!(err, CircuitError::BadFileFormat { line: 2, .. }));

        let err = parse_circuit("PowerSource S extra\n").unwrap_err();
        assert!(matches!(err, CircuitError::BadFileFormat { line: 1, .. }));
    }

    #[test]
    fn test_amounts_are_bounded() {
        let err = parse_circuit("PowerSource S\nAppliance A S 9223372036854775807\n").unwrap_err();
        assert!(matches!(err, CircuitError::BadFileFormat { line: 2, .. }));

        let err = parse_circuit("PowerSource S\nCircuitBreaker B S 4294967296\n").unwrap_err();
        assert!(matches!(err, CircuitError::BadFileFormat { line: 2, .. }));

        let circuit = parse_circuit(
            "PowerSource S\nOutlet O S\nAppliance A1 O 4294967295\nAppliance A2 O 4294967295\n",
        )
        .unwrap();
        assert_eq!(circuit.by_name("A1").unwrap().rating(), Some(i64::from(u32::MAX)));
    }

    #[test]
    fn test_largest_ratings_add_up_without_overflow() {
        let mut circuit = parse_circuit(
            "PowerSource S\nOutlet O S\nAppliance A1 O 4294967295\nAppliance A2 O 4294967295\n",
        )
        .unwrap();
        circuit.power_up();
        circuit.toggle_by_name("A1").unwrap();
        circuit.toggle_by_name("A2").unwrap();
        assert_eq!(circuit.by_name("S").unwrap().draw(), 2 * i64::from(u32::MAX));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(HOUSE.as_bytes()).unwrap();

        let circuit = load_circuit(file.path()).unwrap();
        assert_eq!(circuit.roots().count(), 1);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_circuit(dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, CircuitError::FileNotFound(_)));
        assert_eq!(err.code(), crate::error::FILE_NOT_FOUND);
    }
}
