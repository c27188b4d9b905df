use anyhow::{bail, Context, Result};
use bevy::prelude::AppExit;
use clap::Parser;
use tracing::info;

use wanderer::cli::Args;
use wanderer::terminal::{CrosstermTerminal, TerminalSession, TerminationFlag};
use wanderer::{build_app, logging, render, run_session};

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose, args.log_file.as_deref())?;
    let config = args.to_config().context("invalid configuration")?;

    if args.snapshot {
        let frame = render::snapshot(&config);
        for row in &frame.rows {
            println!("{row}");
        }
        println!("{}", frame.status);
        return Ok(());
    }

    let termination = TerminationFlag::install()?;
    let session = TerminalSession::acquire(CrosstermTerminal::new())
        .context("cannot run without a controllable terminal")?;
    info!(
        seed = config.seed,
        frequency = config.frequency,
        bounds = ?config.bounds,
        hold_policy = ?config.hold_policy,
        "starting simulation"
    );

    let mut app = build_app(config, session);
    app.insert_resource(termination);
    match run_session(app)? {
        AppExit::Success => {
            info!("clean quit");
            Ok(())
        }
        AppExit::Error(code) => bail!("simulation stopped with exit code {code}"),
    }
}
