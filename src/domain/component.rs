use serde::Serialize;
use std::fmt;
use strum::{Display, EnumString};

/// Handle into the circuit arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ComponentId(pub(crate) usize);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Component type as written in circuit files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
pub enum ComponentType {
    PowerSource,
    CircuitBreaker,
    Outlet,
    Appliance,
}

impl ComponentType {
    /// Whether a user may toggle this kind of component
    pub fn is_switchable(self) -> bool {
        matches!(self, ComponentType::CircuitBreaker | ComponentType::Appliance)
    }
}

/// Variant-specific state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComponentKind {
    /// Tree root
    PowerSource,
    /// Pass-through junction
    Outlet,
    /// Switchable leaf with a fixed rating; `switched_on` is the user's intent
    Appliance { rating: i64, switched_on: bool },
    /// Switchable interior node; trips when its draw exceeds `limit`
    CircuitBreaker { limit: i64, closed: bool },
}

impl ComponentKind {
    pub fn component_type(&self) -> ComponentType {
        match self {
            ComponentKind::PowerSource => ComponentType::PowerSource,
            ComponentKind::Outlet => ComponentType::Outlet,
            ComponentKind::Appliance { .. } => ComponentType::Appliance,
            ComponentKind::CircuitBreaker { .. } => ComponentType::CircuitBreaker,
        }
    }
}

/// One node of the distribution tree.
///
/// `source` and `loads` are arena handles; the [`Circuit`](super::Circuit)
/// owns every component.
#[derive(Debug, Clone, Serialize)]
pub struct Component {
    pub(crate) id: ComponentId,
    pub(crate) name: String,
    pub(crate) engaged: bool,
    pub(crate) draw: i64,
    pub(crate) source: Option<ComponentId>,
    pub(crate) loads: Vec<ComponentId>,
    pub(crate) kind: ComponentKind,
}

impl Component {
    pub(crate) fn new(
        id: ComponentId,
        name: String,
        source: Option<ComponentId>,
        kind: ComponentKind,
    ) -> Self {
        Self {
            id,
            name,
            engaged: false,
            draw: 0,
            source,
            loads: Vec::new(),
            kind,
        }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    pub fn draw(&self) -> i64 {
        self.draw
    }

    pub fn source(&self) -> Option<ComponentId> {
        self.source
    }

    /// Downstream components in attachment order
    pub fn loads(&self) -> &[ComponentId] {
        &self.loads
    }

    pub fn kind(&self) -> &ComponentKind {
        &self.kind
    }

    pub fn component_type(&self) -> ComponentType {
        self.kind.component_type()
    }

    pub fn is_root(&self) -> bool {
        matches!(self.kind, ComponentKind::PowerSource)
    }

    /// User switch state: the on-flag of an appliance, the closed flag of a
    /// breaker, always false for sources and outlets
    pub fn is_switch_on(&self) -> bool {
        match self.kind {
            ComponentKind::Appliance { switched_on, .. } => switched_on,
            ComponentKind::CircuitBreaker { closed, .. } => closed,
            ComponentKind::PowerSource | ComponentKind::Outlet => false,
        }
    }

    /// Whether current can flow from this node to its loads
    pub fn feeds_loads(&self) -> bool {
        match self.kind {
            ComponentKind::CircuitBreaker { closed, .. } => self.engaged && closed,
            _ => self.engaged,
        }
    }

    pub fn rating(&self) -> Option<i64> {
        match self.kind {
            ComponentKind::Appliance { rating, .. } => Some(rating),
            _ => None,
        }
    }

    pub fn limit(&self) -> Option<i64> {
        match self.kind {
            ComponentKind::CircuitBreaker { limit, .. } => Some(limit),
            _ => None,
        }
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ComponentKind::PowerSource => {
                write!(f, "PowerSource {} (draw {})", self.name, self.draw)
            }
            ComponentKind::Outlet => write!(
                f,
                "Outlet {} ({}; draw {})",
                self.name,
                on_off(self.engaged),
                self.draw
            ),
            ComponentKind::CircuitBreaker { limit, closed } => write!(
                f,
                "CircuitBreaker {} ({}; draw {}; limit {})",
                self.name,
                on_off(closed),
                self.draw,
                limit
            ),
            ComponentKind::Appliance {
                rating,
                switched_on,
            } => {
                if self.engaged && switched_on {
                    write!(f, "Appliance {} (on; draw {})", self.name, rating)
                } else {
                    write!(f, "Appliance {} (off; rating {})", self.name, rating)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn breaker(closed: bool, engaged: bool) -> Component {
        let mut c = Component::new(
            ComponentId(1),
            "B".to_string(),
            Some(ComponentId(0)),
            ComponentKind::CircuitBreaker { limit: 10, closed },
        );
        c.engaged = engaged;
        c
    }

    #[test]
    fn test_component_type_parsing() {
        assert_eq!(
            ComponentType::from_str("CircuitBreaker").unwrap(),
            ComponentType::CircuitBreaker
        );
        assert!(ComponentType::from_str("Fuse").is_err());
        assert!(ComponentType::from_str("appliance").is_err());
        assert_eq!(ComponentType::Outlet.to_string(), "Outlet");
    }

    #[test]
    fn test_switchable_types() {
        assert!(ComponentType::Appliance.is_switchable());
        assert!(ComponentType::CircuitBreaker.is_switchable());
        assert!(!ComponentType::PowerSource.is_switchable());
        assert!(!ComponentType::Outlet.is_switchable());
    }

    #[test]
    fn test_open_breaker_does_not_feed_loads() {
        assert!(breaker(true, true).feeds_loads());
        assert!(!breaker(false, true).feeds_loads());
        assert!(!breaker(true, false).feeds_loads());
    }

    #[test]
    fn test_switch_state_is_not_engagement() {
        let b = breaker(true, false);
        assert!(b.is_switch_on());
        assert!(!b.is_engaged());
    }

    #[test]
    fn test_summaries() {
        let mut b = breaker(true, true);
        b.draw = 6;
        assert_eq!(b.to_string(), "CircuitBreaker B (on; draw 6; limit 10)");

        let mut a = Component::new(
            ComponentId(2),
            "A".to_string(),
            Some(ComponentId(1)),
            ComponentKind::Appliance {
                rating: 5,
                switched_on: true,
            },
        );
        // Switched on but not powered
        assert_eq!(a.to_string(), "Appliance A (off; rating 5)");
        a.engaged = true;
        assert_eq!(a.to_string(), "Appliance A (on; draw 5)");

        let s = Component::new(
            ComponentId(0),
            "S".to_string(),
            None,
            ComponentKind::PowerSource,
        );
        assert_eq!(s.to_string(), "PowerSource S (draw 0)");
        assert!(s.is_root());
        assert!(!s.is_switch_on());
    }
}
