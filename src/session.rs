//! # Interactive Session
//!
//! Reads one command per line and applies it to the circuit:
//!
//! - `toggle <name>`: flip a breaker or appliance
//! - `display`: print every tree
//! - `connect Appliance <name> <source> <rating>`: add an appliance
//! - `quit`
//!
//! Rejected commands are printed as `error[<code>]: <message>` and the loop
//! carries on.

use std::io::{self, BufRead, Write};
use std::str::FromStr;
use tracing::{info, warn};

use crate::config::SessionConfig;
use crate::display::render_circuit;
use crate::domain::{Circuit, ComponentType};
use crate::error::{CircuitError, Result};

const CONNECT_USAGE: &str = "usage: connect Appliance <name> <source> <rating>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Toggle(String),
    Display,
    Connect {
        name: String,
        source: String,
        rating: u32,
    },
    Quit,
}

impl FromStr for Command {
    type Err = CircuitError;

    fn from_str(line: &str) -> Result<Self> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            ["quit"] => Ok(Command::Quit),
            ["display"] => Ok(Command::Display),
            [command @ ("quit" | "display"), ..] => Err(CircuitError::BadCommand(format!(
                "{command} takes no arguments"
            ))),
            ["toggle", name] => Ok(Command::Toggle(name.to_string())),
            ["toggle", ..] => Err(CircuitError::BadCommand("usage: toggle <name>".to_string())),
            ["connect", type_token, name, source, rating] => {
                let component_type = ComponentType::from_str(type_token)
                    .map_err(|_| CircuitError::UnknownComponentType(type_token.to_string()))?;
                if component_type != ComponentType::Appliance {
                    return Err(CircuitError::BadCommand(format!(
                        "only appliances can be connected, not {component_type}"
                    )));
                }
                let rating = rating.parse::<u32>().map_err(|_| {
                    CircuitError::BadCommand(format!("invalid rating '{rating}'"))
                })?;
                Ok(Command::Connect {
                    name: name.to_string(),
                    source: source.to_string(),
                    rating,
                })
            }
            ["connect", ..] => Err(CircuitError::BadCommand(CONNECT_USAGE.to_string())),
            [other, ..] => Err(CircuitError::UnknownUserCommand(other.to_string())),
            [] => Err(CircuitError::UnknownUserCommand(String::new())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session {
    circuit: Circuit,
    config: SessionConfig,
}

impl Session {
    pub fn new(circuit: Circuit, config: SessionConfig) -> Self {
        Self { circuit, config }
    }

    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Report what was loaded and bring every power source up
    pub fn start<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Overload circuit simulator")?;
        self.flush_events(out)?;
        writeln!(out, "{} components created.", self.circuit.len())?;
        writeln!(out, "Starting up the main circuit(s).")?;
        self.circuit.power_up();
        info!(components = self.circuit.len(), "circuit powered up");
        self.flush_events(out)
    }

    /// Prompt-read-execute until `quit` or end of input
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> io::Result<()> {
        let mut lines = input.lines();
        loop {
            write!(out, "{}", self.config.prompt)?;
            out.flush()?;

            let Some(line) = lines.next() else {
                writeln!(out)?;
                break;
            };
            if self.handle_line(&line?, out)? == Flow::Quit {
                break;
            }
        }
        Ok(())
    }

    pub fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<Flow> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Flow::Continue);
        }

        let result = line
            .parse::<Command>()
            .and_then(|command| self.execute(command));
        let flow = match result {
            Ok(None) => Flow::Continue,
            Ok(Some(Output::Text(text))) => {
                write!(out, "{text}")?;
                Flow::Continue
            }
            Ok(Some(Output::Quit)) => Flow::Quit,
            Err(err) => {
                warn!(
                    code = err.code(),
                    topology = err.is_topology_error(),
                    error = %err,
                    command = line,
                    "command rejected"
                );
                writeln!(out, "error[{}]: {}", err.code(), err)?;
                Flow::Continue
            }
        };

        self.flush_events(out)?;
        Ok(flow)
    }

    pub fn execute(&mut self, command: Command) -> Result<Option<Output>> {
        match command {
            Command::Toggle(name) => {
                self.circuit.toggle_by_name(&name)?;
                Ok(None)
            }
            Command::Display => Ok(Some(Output::Text(render_circuit(&self.circuit)))),
            Command::Connect {
                name,
                source,
                rating,
            } => {
                self.circuit.connect(&name, &source, rating)?;
                Ok(None)
            }
            Command::Quit => Ok(Some(Output::Quit)),
        }
    }

    fn flush_events<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let events = self.circuit.take_events();
        if self.config.echo_events {
            for event in events {
                writeln!(out, "{event}")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Text(String),
    Quit,
}
