use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, info, warn};

/// Notification emitted by the circuit while it settles a command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CircuitEvent {
    /// Component added to the arena
    Created { component: String },
    /// Load registered with its source
    Attached { source: String, load: String },
    /// Power source brought up at start-up
    PoweringUp { component: String },
    Engaging { component: String },
    Disengaging { component: String },
    SwitchingOn { component: String },
    SwitchingOff { component: String },
    /// Local draw changed by `delta`, settling at `draw`
    DrawChanged {
        component: String,
        delta: i64,
        draw: i64,
    },
    /// Breaker draw exceeded its limit; the breaker is about to open
    Blown {
        component: String,
        draw: i64,
        limit: i64,
    },
}

impl CircuitEvent {
    /// Name of the component the event is about
    pub fn component(&self) -> &str {
        match self {
            CircuitEvent::Attached { load, .. } => load,
            CircuitEvent::Created { component }
            | CircuitEvent::PoweringUp { component }
            | CircuitEvent::Engaging { component }
            | CircuitEvent::Disengaging { component }
            | CircuitEvent::SwitchingOn { component }
            | CircuitEvent::SwitchingOff { component }
            | CircuitEvent::DrawChanged { component, .. }
            | CircuitEvent::Blown { component, .. } => component,
        }
    }

    fn trace(&self) {
        match self {
            CircuitEvent::Created { component } => debug!(component, "component created"),
            CircuitEvent::Attached { source, load } => debug!(source, load, "load attached"),
            CircuitEvent::PoweringUp { component } => info!(component, "powering up"),
            CircuitEvent::Engaging { component } => debug!(component, "engaging"),
            CircuitEvent::Disengaging { component } => debug!(component, "disengaging"),
            CircuitEvent::SwitchingOn { component } => info!(component, "switching on"),
            CircuitEvent::SwitchingOff { component } => info!(component, "switching off"),
            CircuitEvent::DrawChanged {
                component,
                delta,
                draw,
            } => debug!(component, delta, draw, "draw changed"),
            CircuitEvent::Blown {
                component,
                draw,
                limit,
            } => warn!(component, draw, limit, "circuit breaker blown"),
        }
    }
}

impl fmt::Display for CircuitEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitEvent::Created { component } => write!(f, "{component}: creating"),
            CircuitEvent::Attached { source, load } => write!(f, "{source}: attaching {load}"),
            CircuitEvent::PoweringUp { component } => write!(f, "{component}: powering up"),
            CircuitEvent::Engaging { component } => write!(f, "{component}: engaging"),
            CircuitEvent::Disengaging { component } => write!(f, "{component}: disengaging"),
            CircuitEvent::SwitchingOn { component } => write!(f, "{component}: switching on"),
            CircuitEvent::SwitchingOff { component } => write!(f, "{component}: switching off"),
            CircuitEvent::DrawChanged {
                component,
                delta,
                draw,
            } => write!(f, "{component}: changing draw by {delta} (now {draw})"),
            CircuitEvent::Blown {
                component,
                draw,
                limit,
            } => write!(f, "{component}: blown! draw {draw} exceeds limit {limit}"),
        }
    }
}

/// Journal of circuit notifications.
///
/// Events wait in `pending` until the driver takes them after a command;
/// a bounded, timestamped copy is kept in `history`.
#[derive(Debug, Clone)]
pub struct EventLog {
    pending: Vec<CircuitEvent>,
    history: VecDeque<(DateTime<Utc>, CircuitEvent)>,
    max_history: usize,
}

impl EventLog {
    pub const DEFAULT_HISTORY: usize = 256;

    pub fn new() -> Self {
        Self::with_history(Self::DEFAULT_HISTORY)
    }

    pub fn with_history(max_history: usize) -> Self {
        Self {
            pending: Vec::new(),
            history: VecDeque::new(),
            max_history,
        }
    }

    /// Record an event, tracing it and keeping it for the driver
    pub fn record(&mut self, event: CircuitEvent) {
        event.trace();

        if self.max_history > 0 {
            while self.history.len() >= self.max_history {
                self.history.pop_front();
            }
            self.history.push_back((Utc::now(), event.clone()));
        }
        self.pending.push(event);
    }

    /// Drain the events recorded since the previous call
    pub fn take(&mut self) -> Vec<CircuitEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> &[CircuitEvent] {
        &self.pending
    }

    /// Most recent events, oldest first
    pub fn history(&self) -> impl Iterator<Item = &(DateTime<Utc>, CircuitEvent)> {
        self.history.iter()
    }

    pub fn set_max_history(&mut self, max_history: usize) {
        self.max_history = max_history;
        while self.history.len() > max_history {
            self.history.pop_front();
        }
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}
