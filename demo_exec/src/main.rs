//! # Demo Executable
//!
//! Motor controller demos for a small two wheeled robot driven by a RoboClaw:
//! - `roboclaw` runs through every compatibility command in turn
//! - `braitenberg` steers from three light sensors read through an MCP3008 ADC

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Light following vehicle.
mod braitenberg;

/// Status display abstraction.
mod display;

/// Raspberry Pi peripherals.
mod hw;

/// MCP3008 ADC driver.
mod mcp3008;

/// Parameters for the demo executable.
mod params;

/// RoboClaw packet serial driver.
mod roboclaw;

/// Scripted drive sequence.
mod script;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Result};
use log::info;
use structopt::StructOpt;

// Internal
use params::DemoExecParams;
use roboclaw::{LogSerial, RoboClaw};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Robot demos.
#[derive(Debug, StructOpt)]
#[structopt(name = "demo_exec")]
enum Demo {
    /// Drive through the RoboClaw's compatibility commands.
    #[structopt(name = "roboclaw")]
    RoboClaw {
        /// Log the packets and pauses instead of driving the motors
        #[structopt(long)]
        dry_run: bool,
    },

    /// Steer towards the light.
    #[structopt(name = "braitenberg")]
    Braitenberg {
        /// Log the motor packets instead of driving the motors
        #[structopt(long)]
        dry_run: bool,
    },
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    let demo = Demo::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("demo_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Demo Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);
    info!("Demo: {:?}", demo);

    // ---- LOAD PARAMETERS ----

    let params: DemoExecParams =
        util::params::load("demo_exec.toml").wrap_err("Failed to load parameters")?;

    info!("Parameters loaded");

    // ---- RUN ----

    match demo {
        Demo::RoboClaw { dry_run: true } => {
            let mut claw = RoboClaw::new(LogSerial::new(), params.roboclaw_address);

            script::run(&mut claw, &script::demo_sequence(), |d| {
                info!("[dry run] pause {:?}", d)
            })
            .wrap_err("Scripted demo failed")?;

            info!("{} packets sent", claw.free().packets());
        }
        Demo::RoboClaw { dry_run: false } => hw::run_roboclaw(&params)?,
        Demo::Braitenberg { dry_run } => hw::run_braitenberg(&params, dry_run)?,
    }

    Ok(())
}
