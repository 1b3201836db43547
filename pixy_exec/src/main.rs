//! # Pixy Executable
//!
//! This executable polls a Pixy camera for detected objects and logs them. The camera is either a
//! real one on the Raspberry Pi's SPI bus or the built in simulated camera.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Hardware SPI bus setup.
mod bus;

/// Parameters for the pixy executable.
mod params;

/// Camera polling thread.
mod worker;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use std::{fmt::Debug, thread, time::Duration};

use color_eyre::{
    eyre::{eyre, WrapErr},
    Result,
};
use embedded_hal::blocking::spi::Transfer;
use log::info;
use pixy::{PixyCam, PixyConfig, SimPixy};

// Internal
use params::{Device, PixyExecParams};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    session::Session,
};
use worker::{PollSettings, PollStats};

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("pixy_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Pixy Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    info!("Initialising...");

    // ---- LOAD PARAMETERS ----

    let params: PixyExecParams =
        util::params::load("pixy_exec.toml").wrap_err("Failed to load parameters")?;

    info!("Parameters loaded");

    let config = PixyConfig {
        idle_backoff: Duration::from_millis(params.idle_backoff_ms),
        trace: params.trace_bytes,
    };

    // ---- RUN ----

    let stats = match params.device {
        Device::Sim => {
            info!("Using the simulated camera");
            run(PixyCam::new(SimPixy::demo_scene(), config), &params)?
        }
        Device::Spi => bus::run_on_spi(&params, config)?,
    };

    info!(
        "Finished after {} polls: {} frames, {} blocks, {} bus errors",
        stats.polls, stats.frames, stats.blocks, stats.bus_errors
    );

    Ok(())
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Start polling `cam` on its own thread, send the startup commands, then wait for the poll thread
/// to finish.
pub(crate) fn run<SPI, E>(cam: PixyCam<SPI>, params: &PixyExecParams) -> Result<PollStats>
where
    SPI: Transfer<u8, Error = E> + Send + 'static,
    E: Debug,
{
    let sender = cam.command_sender();
    let settings = PollSettings::from(params);

    let handle = thread::Builder::new()
        .name("pixy_poll".into())
        .spawn(move || worker::poll_loop(cam, settings))
        .wrap_err("Failed to start the poll thread")?;

    info!("Initialisation complete, polling camera");

    if let Some(brightness) = params.brightness {
        sender
            .set_brightness(brightness)
            .wrap_err("Failed to queue the brightness command")?;
        info!("Brightness set to {}", brightness);
    }

    if let Some([red, green, blue]) = params.led {
        sender
            .set_led(red, green, blue)
            .wrap_err("Failed to queue the LED command")?;
        info!("LED set to (r: {}, g: {}, b: {})", red, green, blue);
    }

    handle
        .join()
        .map_err(|_| eyre!("The poll thread panicked"))
}
