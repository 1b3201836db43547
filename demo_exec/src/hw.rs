//! # Hardware Setup
//!
//! Opens the Raspberry Pi UART and SPI bus used by the demos. On other hosts only the dry run of
//! the scripted demo is available.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use color_eyre::{eyre::bail, Result};

use crate::params::DemoExecParams;

#[cfg(all(target_arch = "arm", target_os = "linux"))]
use std::{fmt::Debug, thread};

#[cfg(all(target_arch = "arm", target_os = "linux"))]
use color_eyre::eyre::WrapErr;

#[cfg(all(target_arch = "arm", target_os = "linux"))]
use embedded_hal::blocking::serial::Write;

#[cfg(all(target_arch = "arm", target_os = "linux"))]
use log::info;

#[cfg(all(target_arch = "arm", target_os = "linux"))]
use rppal::{
    spi::{Bus, Mode, SlaveSelect, Spi},
    uart::{Parity, Uart},
};

#[cfg(all(target_arch = "arm", target_os = "linux"))]
use crate::{
    braitenberg::Vehicle,
    display::LogDisplay,
    mcp3008::Mcp3008,
    params::{AdcParams, SerialParams},
    roboclaw::{LogSerial, RoboClaw},
    script,
};

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Run the scripted demo on the RoboClaw attached to the Pi's UART.
#[cfg(all(target_arch = "arm", target_os = "linux"))]
pub fn run_roboclaw(params: &DemoExecParams) -> Result<()> {
    let mut claw = RoboClaw::new(open_uart(&params.serial)?, params.roboclaw_address);

    info!("RoboClaw at address {:#04x} on {}", claw.address(), params.serial.path);

    script::run(&mut claw, &script::demo_sequence(), thread::sleep)
        .wrap_err("Scripted demo failed")
}

/// Run the scripted demo on the RoboClaw attached to the Pi's UART.
///
/// Always fails on this host.
#[cfg(not(all(target_arch = "arm", target_os = "linux")))]
pub fn run_roboclaw(params: &DemoExecParams) -> Result<()> {
    bail!(
        "Serial port {} is only supported on the Raspberry Pi, use --dry-run",
        params.serial.path
    )
}

/// Run the Braitenberg vehicle, with the motors on the Pi's UART or logged if `dry_run` is set.
#[cfg(all(target_arch = "arm", target_os = "linux"))]
pub fn run_braitenberg(params: &DemoExecParams, dry_run: bool) -> Result<()> {
    if dry_run {
        run_vehicle(params, LogSerial::new())
    } else {
        run_vehicle(params, open_uart(&params.serial)?)
    }
}

/// Run the Braitenberg vehicle.
///
/// Always fails on this host, the sensors are read through the Pi's SPI bus.
#[cfg(not(all(target_arch = "arm", target_os = "linux")))]
pub fn run_braitenberg(params: &DemoExecParams, _dry_run: bool) -> Result<()> {
    bail!(
        "The sensor ADC (SPI bus {}, slave select {}) is only supported on the Raspberry Pi",
        params.adc.bus,
        params.adc.slave_select
    )
}

#[cfg(all(target_arch = "arm", target_os = "linux"))]
fn run_vehicle<S, M>(params: &DemoExecParams, serial: S) -> Result<()>
where
    S: Write<u8, Error = M>,
    M: Debug + Send + Sync + 'static,
{
    let adc = Mcp3008::new(open_adc(&params.adc)?);
    let claw = RoboClaw::new(serial, params.roboclaw_address);

    info!("RoboClaw at address {:#04x}", claw.address());

    let mut vehicle = Vehicle::new(adc, claw, LogDisplay::new(), params.braitenberg.clone());

    vehicle
        .run(thread::sleep)
        .wrap_err("Braitenberg vehicle failed")?;

    Ok(())
}

#[cfg(all(target_arch = "arm", target_os = "linux"))]
fn open_uart(params: &SerialParams) -> Result<Uart> {
    let mut uart = Uart::with_path(&params.path, params.baud, Parity::None, 8, 1)
        .wrap_err_with(|| format!("Failed to open serial port {}", params.path))?;

    uart.set_write_mode(true)
        .wrap_err("Failed to set blocking writes")?;

    Ok(uart)
}

#[cfg(all(target_arch = "arm", target_os = "linux"))]
fn open_adc(params: &AdcParams) -> Result<Spi> {
    let bus = match params.bus {
        0 => Bus::Spi0,
        1 => Bus::Spi1,
        b => bail!("Unsupported SPI bus {}", b),
    };

    let slave_select = match params.slave_select {
        0 => SlaveSelect::Ss0,
        1 => SlaveSelect::Ss1,
        2 => SlaveSelect::Ss2,
        s => bail!("Unsupported SPI slave select {}", s),
    };

    Spi::new(bus, slave_select, params.clock_hz, Mode::Mode0)
        .wrap_err("Failed to open the ADC SPI bus")
}
