//! # SPI Bus Setup
//!
//! Opens the hardware SPI bus the camera is attached to. Only available on the Raspberry Pi, other
//! hosts must use the simulated camera.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use color_eyre::{eyre::bail, Result};
use pixy::PixyConfig;

use crate::{params::PixyExecParams, worker::PollStats};

#[cfg(all(target_arch = "arm", target_os = "linux"))]
use crate::params::SpiParams;

#[cfg(all(target_arch = "arm", target_os = "linux"))]
use color_eyre::eyre::WrapErr;

#[cfg(all(target_arch = "arm", target_os = "linux"))]
use log::info;

#[cfg(all(target_arch = "arm", target_os = "linux"))]
use pixy::PixyCam;

#[cfg(all(target_arch = "arm", target_os = "linux"))]
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Open the SPI bus described by `params`.
#[cfg(all(target_arch = "arm", target_os = "linux"))]
pub fn open(params: &SpiParams) -> Result<Spi> {
    let bus = match params.bus {
        0 => Bus::Spi0,
        1 => Bus::Spi1,
        2 => Bus::Spi2,
        b => bail!("Unsupported SPI bus {}", b),
    };

    let slave_select = match params.slave_select {
        0 => SlaveSelect::Ss0,
        1 => SlaveSelect::Ss1,
        2 => SlaveSelect::Ss2,
        s => bail!("Unsupported SPI slave select {}", s),
    };

    let mode = match params.mode {
        0 => Mode::Mode0,
        1 => Mode::Mode1,
        2 => Mode::Mode2,
        3 => Mode::Mode3,
        m => bail!("Invalid SPI mode {}, expected 0 to 3", m),
    };

    Spi::new(bus, slave_select, params.clock_hz, mode).wrap_err_with(|| {
        format!(
            "Failed to open /dev/spidev{}.{}",
            params.bus, params.slave_select
        )
    })
}

/// Run the camera on the hardware SPI bus.
#[cfg(all(target_arch = "arm", target_os = "linux"))]
pub fn run_on_spi(params: &PixyExecParams, config: PixyConfig) -> Result<PollStats> {
    let spi = open(&params.spi)?;

    info!(
        "Opened /dev/spidev{}.{} at {} Hz",
        params.spi.bus, params.spi.slave_select, params.spi.clock_hz
    );

    crate::run(PixyCam::new(spi, config), params)
}

/// Run the camera on the hardware SPI bus.
///
/// Always fails on this host, there is no hardware SPI support.
#[cfg(not(all(target_arch = "arm", target_os = "linux")))]
pub fn run_on_spi(params: &PixyExecParams, _config: PixyConfig) -> Result<PollStats> {
    bail!(
        "Hardware SPI (bus {}, slave select {}) is only supported on the Raspberry Pi, \
         set device = \"sim\" in pixy_exec.toml to use the simulated camera",
        params.spi.bus,
        params.spi.slave_select
    )
}
