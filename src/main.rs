use anyhow::Result;
use circuit_overload::{config, loader, session, telemetry};
use clap::Parser;
use config::{Cli, Settings};
use session::Session;
use std::io;
use telemetry::init_tracing;
use tracing::{error, info};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(&cli.settings)?;
    init_tracing(&settings.logging);

    let mut circuit = match loader::load_circuit(&cli.circuit) {
        Ok(circuit) => circuit,
        Err(err) => {
            error!(
                code = err.code(),
                topology = err.is_topology_error(),
                error = %err,
                "failed to load circuit"
            );
            eprintln!("{err}");
            std::process::exit(err.code());
        }
    };
    circuit
        .events_mut()
        .set_max_history(settings.session.event_history);

    let mut session = Session::new(circuit, settings.session);
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    session.start(&mut stdout)?;
    session.run(stdin.lock(), &mut stdout)?;

    info!("session closed");
    Ok(())
}
