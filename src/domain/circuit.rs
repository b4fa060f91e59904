//! # Circuit Arena and Propagation
//!
//! Every component lives in one `Circuit`; sources and loads refer to each
//! other through [`ComponentId`] handles. Switching and engagement cascade
//! downward from any node, draw changes ripple upward to the roots.
//!
//! Propagation is plain recursion, depth-first in attachment order. Trees
//! built from circuit files are shallow and acyclic (each component may only
//! name an earlier one as its source), so recursion depth is bounded by the
//! tree height. Every call settles the whole tree before it returns.

use std::collections::HashMap;
use tracing::trace;

use super::{CircuitEvent, Component, ComponentId, ComponentKind, EventLog};
use crate::error::{CircuitError, Result};

/// Arena owning a forest of components.
///
/// Ids handed out by one circuit must not be used with another: the
/// propagation methods index the arena directly and panic on a foreign id.
#[derive(Debug, Clone, Default)]
pub struct Circuit {
    components: Vec<Component>,
    by_name: HashMap<String, ComponentId>,
    events: EventLog,
}

impl Circuit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a circuit keeping at most `max_history` timestamped events
    pub fn with_event_history(max_history: usize) -> Self {
        Self {
            events: EventLog::with_history(max_history),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn get(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id.0)
    }

    pub fn find(&self, name: &str) -> Option<ComponentId> {
        self.by_name.get(name).copied()
    }

    /// Resolve a name, failing with `UnknownComponent`
    pub fn lookup(&self, name: &str) -> Result<ComponentId> {
        self.find(name)
            .ok_or_else(|| CircuitError::UnknownComponent(name.to_string()))
    }

    pub fn by_name(&self, name: &str) -> Option<&Component> {
        self.find(name).map(|id| self.node(id))
    }

    /// All components in creation order
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.iter()
    }

    /// Power sources in creation order
    pub fn roots(&self) -> impl Iterator<Item = &Component> {
        self.components.iter().filter(|c| c.is_root())
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventLog {
        &mut self.events
    }

    /// Drain notifications recorded since the last call
    pub fn take_events(&mut self) -> Vec<CircuitEvent> {
        self.events.take()
    }

    /// Components that are engaged without being a root or having an engaged source
    pub fn engagement_violations(&self) -> Vec<ComponentId> {
        self.components
            .iter()
            .filter(|c| c.engaged && !c.is_root())
            .filter(|c| c.source.map_or(true, |s| !self.node(s).engaged))
            .map(|c| c.id)
            .collect()
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    pub fn add_power_source(&mut self, name: impl Into<String>) -> Result<ComponentId> {
        self.insert(name.into(), None, ComponentKind::PowerSource)
    }

    pub fn add_circuit_breaker(
        &mut self,
        name: impl Into<String>,
        source: ComponentId,
        limit: u32,
    ) -> Result<ComponentId> {
        self.insert(
            name.into(),
            Some(source),
            ComponentKind::CircuitBreaker {
                limit: i64::from(limit),
                closed: false,
            },
        )
    }

    pub fn add_outlet(&mut self, name: impl Into<String>, source: ComponentId) -> Result<ComponentId> {
        self.insert(name.into(), Some(source), ComponentKind::Outlet)
    }

    pub fn add_appliance(
        &mut self,
        name: impl Into<String>,
        source: ComponentId,
        rating: u32,
    ) -> Result<ComponentId> {
        self.insert(
            name.into(),
            Some(source),
            ComponentKind::Appliance {
                rating: i64::from(rating),
                switched_on: false,
            },
        )
    }

    /// Add an appliance at runtime, resolving its source by name
    pub fn connect(&mut self, name: &str, source_name: &str, rating: u32) -> Result<ComponentId> {
        if self.by_name.contains_key(name) {
            return Err(CircuitError::RepeatName(name.to_string()));
        }
        let source = self.lookup(source_name)?;
        self.add_appliance(name, source, rating)
    }

    fn insert(
        &mut self,
        name: String,
        source: Option<ComponentId>,
        kind: ComponentKind,
    ) -> Result<ComponentId> {
        if self.by_name.contains_key(&name) {
            return Err(CircuitError::RepeatName(name));
        }
        if let Some(source) = source {
            if self.get(source).is_none() {
                return Err(CircuitError::UnknownComponent(source.to_string()));
            }
        }

        let id = ComponentId(self.components.len());
        self.components
            .push(Component::new(id, name.clone(), source, kind));
        self.by_name.insert(name.clone(), id);
        self.record(CircuitEvent::Created { component: name });

        if let Some(source) = source {
            self.attach(source, id);
        }
        Ok(id)
    }

    /// Register `load` with `source`, powering it at once if the source is live
    fn attach(&mut self, source: ComponentId, load: ComponentId) {
        if self.node(source).feeds_loads() {
            self.engage(load);
        }
        self.node_mut(source).loads.push(load);
        self.record(CircuitEvent::Attached {
            source: self.name_of(source),
            load: self.name_of(load),
        });
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Engage every power source once, in creation order
    pub fn power_up(&mut self) {
        let roots: Vec<ComponentId> = self.roots().map(|c| c.id).collect();
        for root in roots {
            self.record(CircuitEvent::PoweringUp {
                component: self.name_of(root),
            });
            self.engage(root);
        }
    }

    /// Flip a breaker or appliance; returns the resulting switch state
    pub fn toggle(&mut self, id: ComponentId) -> Result<bool> {
        let component = self.node(id);
        if !component.component_type().is_switchable() {
            return Err(CircuitError::UnswitchableComponent(component.name.clone()));
        }

        if component.is_switch_on() {
            self.turn_off(id)?;
        } else {
            self.turn_on(id)?;
        }
        Ok(self.node(id).is_switch_on())
    }

    pub fn toggle_by_name(&mut self, name: &str) -> Result<bool> {
        let id = self.lookup(name)?;
        self.toggle(id)
    }

    pub fn turn_on(&mut self, id: ComponentId) -> Result<()> {
        let kind = self.node(id).kind;
        match kind {
            ComponentKind::Appliance {
                rating,
                switched_on,
            } => self.switch_on_appliance(id, rating, switched_on),
            ComponentKind::CircuitBreaker { .. } => self.close_breaker(id),
            ComponentKind::PowerSource | ComponentKind::Outlet => {
                return Err(CircuitError::UnswitchableComponent(self.name_of(id)));
            }
        }
        Ok(())
    }

    pub fn turn_off(&mut self, id: ComponentId) -> Result<()> {
        let kind = self.node(id).kind;
        match kind {
            ComponentKind::Appliance { rating, .. } => self.switch_off_appliance(id, rating),
            ComponentKind::CircuitBreaker { .. } => {
                let reported = self.node(id).draw;
                self.open_breaker(id, reported);
            }
            ComponentKind::PowerSource | ComponentKind::Outlet => {
                return Err(CircuitError::UnswitchableComponent(self.name_of(id)));
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Propagation
    // ------------------------------------------------------------------

    /// Mark `id` engaged and cascade according to its kind.
    ///
    /// A breaker only marks itself: its loads are engaged when it is
    /// switched on, never by an engagement arriving from above.
    pub fn engage(&mut self, id: ComponentId) {
        self.record(CircuitEvent::Engaging {
            component: self.name_of(id),
        });
        self.node_mut(id).engaged = true;

        let kind = self.node(id).kind;
        match kind {
            ComponentKind::Appliance {
                rating,
                switched_on: true,
            } => self.switch_on_appliance(id, rating, true),
            ComponentKind::Appliance { .. } | ComponentKind::CircuitBreaker { .. } => {}
            ComponentKind::PowerSource | ComponentKind::Outlet => self.engage_loads(id),
        }
    }

    /// Mark `id` disengaged and cascade to everything below it.
    ///
    /// Already disengaged components are left alone. Interior nodes end with
    /// zero draw once their loads are down.
    pub fn disengage(&mut self, id: ComponentId) {
        if !self.node(id).engaged {
            return;
        }
        self.record(CircuitEvent::Disengaging {
            component: self.name_of(id),
        });
        self.node_mut(id).engaged = false;

        let kind = self.node(id).kind;
        match kind {
            // The rating is removed whether or not the appliance is switched on.
            // An appliance that was off therefore ends at -rating.
            ComponentKind::Appliance { rating, .. } => self.change_draw(id, -rating),
            _ => {
                self.disengage_loads(id);
                self.clear_draw(id);
            }
        }
    }

    /// Apply `delta` locally and push it toward the root.
    ///
    /// Positive deltas always travel upward. Non-positive deltas only travel
    /// while the source still has positive draw. A closed breaker forwards
    /// any delta that keeps it within its limit and trips on one that does
    /// not; an open breaker ignores the delta.
    pub fn change_draw(&mut self, id: ComponentId, delta: i64) {
        let Component { source, kind, .. } = *self.node(id);

        if let ComponentKind::CircuitBreaker { limit, closed } = kind {
            if !closed {
                trace!(component = %self.node(id).name, delta, "open breaker ignores draw change");
                return;
            }

            let draw = self.apply_draw(id, delta);
            if draw > limit {
                self.record(CircuitEvent::Blown {
                    component: self.name_of(id),
                    draw,
                    limit,
                });
                // The tripping delta never reached the source.
                self.open_breaker(id, draw - delta);
                return;
            }
            if let Some(source) = source {
                self.change_draw(source, delta);
            }
            return;
        }

        self.apply_draw(id, delta);
        if let Some(source) = source {
            if delta > 0 || self.node(source).draw > 0 {
                self.change_draw(source, delta);
            }
        }
    }

    fn engage_loads(&mut self, id: ComponentId) {
        let loads = self.node(id).loads.clone();
        for load in loads {
            // A breaker can trip part-way through its own cascade
            if !self.node(id).feeds_loads() {
                break;
            }
            self.engage(load);
        }
    }

    fn disengage_loads(&mut self, id: ComponentId) {
        let loads = self.node(id).loads.clone();
        for load in loads {
            self.disengage(load);
        }
    }

    fn switch_on_appliance(&mut self, id: ComponentId, rating: i64, switched_on: bool) {
        let powered = self.is_powered(id);
        if powered && switched_on {
            self.change_draw(id, rating);
        } else if powered {
            self.set_switch(id, true);
            self.record(CircuitEvent::SwitchingOn {
                component: self.name_of(id),
            });
            self.change_draw(id, rating);
        } else {
            // Draw applies once the path goes live and engages this appliance
            self.set_switch(id, true);
        }
    }

    fn switch_off_appliance(&mut self, id: ComponentId, rating: i64) {
        self.record(CircuitEvent::SwitchingOff {
            component: self.name_of(id),
        });
        self.set_switch(id, false);
        if self.is_powered(id) {
            self.change_draw(id, -rating);
        }
    }

    fn close_breaker(&mut self, id: ComponentId) {
        self.record(CircuitEvent::SwitchingOn {
            component: self.name_of(id),
        });
        self.set_switch(id, true);
        if self.node(id).engaged {
            self.engage_loads(id);
        }
    }

    /// Open a breaker: withdraw what it reported upstream, zero it, and
    /// disengage its whole subtree
    fn open_breaker(&mut self, id: ComponentId, reported: i64) {
        self.record(CircuitEvent::SwitchingOff {
            component: self.name_of(id),
        });
        self.set_switch(id, false);

        if reported != 0 {
            if let Some(source) = self.node(id).source {
                self.change_draw(source, -reported);
            }
        }

        self.clear_draw(id);
        self.disengage_loads(id);
    }

    /// Zero the local draw without propagating
    fn clear_draw(&mut self, id: ComponentId) {
        let draw = self.node(id).draw;
        if draw != 0 {
            self.node_mut(id).draw = 0;
            self.record(CircuitEvent::DrawChanged {
                component: self.name_of(id),
                delta: -draw,
                draw: 0,
            });
        }
    }

    fn apply_draw(&mut self, id: ComponentId, delta: i64) -> i64 {
        let node = self.node_mut(id);
        node.draw += delta;
        let draw = node.draw;
        self.record(CircuitEvent::DrawChanged {
            component: self.name_of(id),
            delta,
            draw,
        });
        draw
    }

    fn set_switch(&mut self, id: ComponentId, on: bool) {
        match &mut self.node_mut(id).kind {
            ComponentKind::Appliance { switched_on, .. } => *switched_on = on,
            ComponentKind::CircuitBreaker { closed, .. } => *closed = on,
            ComponentKind::PowerSource | ComponentKind::Outlet => {}
        }
    }

    /// An appliance draws only while it is engaged under a source that feeds it
    fn is_powered(&self, id: ComponentId) -> bool {
        let node = self.node(id);
        node.engaged
            && node
                .source
                .map_or(false, |source| self.node(source).feeds_loads())
    }

    fn record(&mut self, event: CircuitEvent) {
        self.events.record(event);
    }

    fn name_of(&self, id: ComponentId) -> String {
        self.node(id).name.clone()
    }

    fn node(&self, id: ComponentId) -> &Component {
        &self.components[id.0]
    }

    fn node_mut(&mut self, id: ComponentId) -> &mut Component {
        &mut self.components[id.0]
    }
}
