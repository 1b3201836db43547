//! # Pixy Executable Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Deserialize, Debug, Clone)]
pub struct PixyExecParams {

    /// Where the camera is attached
    pub device: Device,

    /// SPI bus settings, only used when `device` is `spi`
    pub spi: SpiParams,

    /// Maximum number of blocks to decode per frame
    pub max_blocks: usize,

    /// Wait between polls in milliseconds, 0 to poll as fast as possible
    pub poll_period_ms: u64,

    /// Wait after finding the camera idle in milliseconds
    pub idle_backoff_ms: u64,

    /// Log every byte received from the camera at trace level
    pub trace_bytes: bool,

    /// Brightness to set on startup
    pub brightness: Option<u8>,

    /// LED colour to set on startup, as [red, green, blue]
    pub led: Option<[bool; 3]>,

    /// Stop after this many polls. Polls forever if not set.
    pub poll_limit: Option<u64>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SpiParams {

    /// SPI bus number, e.g. 0 for /dev/spidev0.x
    pub bus: u8,

    /// Slave select line, e.g. 0 for /dev/spidevx.0
    pub slave_select: u8,

    /// Clock frequency in Hz
    pub clock_hz: u32,

    /// SPI mode, 0 to 3. The Pixy expects an idle high clock sampled on the rising edge (mode 3).
    pub mode: u8,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    /// A real camera on the SPI bus
    Spi,

    /// The built in simulated camera
    Sim,
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
