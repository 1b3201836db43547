//! # Camera Commands
//!
//! Framing for the commands the camera accepts over SPI. There is no acknowledgement, a command
//! is considered sent once its bytes have been clocked out.

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// First byte of every command.
pub const CMD_MARKER: u8 = 0x00;

/// Sync byte identifying a brightness (exposure) command.
pub const BRIGHTNESS_SYNC: u8 = 0xfe;

/// Sync byte identifying an RGB LED command.
pub const LED_SYNC: u8 = 0xfd;

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build the set brightness command.
pub fn brightness(value: u8) -> [u8; 3] {
    [CMD_MARKER, BRIGHTNESS_SYNC, value]
}

/// Build the set LED command. Each channel is either fully on or off.
pub fn led(red: bool, green: bool, blue: bool) -> [u8; 5] {
    [
        CMD_MARKER,
        LED_SYNC,
        channel(red),
        channel(green),
        channel(blue),
    ]
}

#[inline]
fn channel(on: bool) -> u8 {
    if on {
        255
    } else {
        0
    }
}
