//! # RoboClaw Motor Controller
//!
//! Driver for the RoboClaw dual channel motor controller in packet serial mode. Every packet is
//! the controller address, a command code, the command's data and a 7 bit checksum.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{convert::Infallible, fmt::Debug};

use embedded_hal::blocking::serial::Write;
use log::{debug, info};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Address the controller ships with.
pub const DEFAULT_ADDRESS: u8 = 0x80;

/// Largest value accepted by the compatibility commands.
pub const MAX_COMPAT_VALUE: u8 = 127;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// RoboClaw controller on a serial port.
pub struct RoboClaw<S> {
    serial: S,
    address: u8,
}

/// Serial sink which logs packets instead of sending them, for running without a controller.
#[derive(Debug, Default)]
pub struct LogSerial {
    packets: usize,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A command to the controller.
///
/// Compatibility commands take a value from 0 to 127. For the forward/backward commands 0 is
/// stopped and 127 is full speed, for the drive and turn commands 64 is stopped.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command {
    M1Forward(u8),
    M1Backward(u8),
    M2Forward(u8),
    M2Backward(u8),
    M1Drive(u8),
    M2Drive(u8),
    MixedForward(u8),
    MixedBackward(u8),
    MixedRight(u8),
    MixedLeft(u8),
    MixedDrive(u8),
    MixedTurn(u8),

    /// Signed speed in encoder counts per second
    M1Speed(i32),
    M2Speed(i32),

    /// M1 and M2 speeds in encoder counts per second
    MixedSpeed(i32, i32),
}

#[derive(thiserror::Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum PacketError {
    #[error("Command value {0} out of range, expected 0 to 127")]
    ValueOutOfRange(u8),
}

#[derive(thiserror::Error, Debug)]
pub enum RoboClawError<E: Debug> {
    #[error(transparent)]
    Packet(#[from] PacketError),

    #[error("Serial write failed: {0:?}")]
    Serial(E),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Command {
    /// The command code sent after the address.
    pub fn code(&self) -> u8 {
        match self {
            Command::M1Forward(_) => 0,
            Command::M1Backward(_) => 1,
            Command::M2Forward(_) => 4,
            Command::M2Backward(_) => 5,
            Command::M1Drive(_) => 6,
            Command::M2Drive(_) => 7,
            Command::MixedForward(_) => 8,
            Command::MixedBackward(_) => 9,
            Command::MixedRight(_) => 10,
            Command::MixedLeft(_) => 11,
            Command::MixedDrive(_) => 12,
            Command::MixedTurn(_) => 13,
            Command::M1Speed(_) => 35,
            Command::M2Speed(_) => 36,
            Command::MixedSpeed(_, _) => 37,
        }
    }

    /// Build the packet for this command sent to `address`, including the checksum.
    pub fn packet(&self, address: u8) -> Result<Vec<u8>, PacketError> {
        let mut packet = vec![address, self.code()];

        match *self {
            Command::M1Speed(speed) | Command::M2Speed(speed) => {
                packet.extend_from_slice(&speed.to_be_bytes())
            }
            Command::MixedSpeed(m1, m2) => {
                packet.extend_from_slice(&m1.to_be_bytes());
                packet.extend_from_slice(&m2.to_be_bytes());
            }
            Command::M1Forward(v)
            | Command::M1Backward(v)
            | Command::M2Forward(v)
            | Command::M2Backward(v)
            | Command::M1Drive(v)
            | Command::M2Drive(v)
            | Command::MixedForward(v)
            | Command::MixedBackward(v)
            | Command::MixedRight(v)
            | Command::MixedLeft(v)
            | Command::MixedDrive(v)
            | Command::MixedTurn(v) => {
                if v > MAX_COMPAT_VALUE {
                    return Err(PacketError::ValueOutOfRange(v));
                }
                packet.push(v);
            }
        }

        packet.push(checksum(&packet));

        Ok(packet)
    }
}

impl<S, E> RoboClaw<S>
where
    S: Write<u8, Error = E>,
    E: Debug,
{
    pub fn new(serial: S, address: u8) -> Self {
        Self { serial, address }
    }

    /// Send a single command.
    pub fn send(&mut self, cmd: Command) -> Result<(), RoboClawError<E>> {
        let packet = cmd.packet(self.address)?;

        debug!("RoboClaw {:?}: {:02x?}", cmd, packet);

        self.serial
            .bwrite_all(&packet)
            .map_err(RoboClawError::Serial)?;
        self.serial.bflush().map_err(RoboClawError::Serial)
    }

    /// Stop both motors.
    pub fn stop(&mut self) -> Result<(), RoboClawError<E>> {
        self.send(Command::M1Forward(0))?;
        self.send(Command::M2Forward(0))
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Release the serial port.
    pub fn free(self) -> S {
        self.serial
    }
}

impl LogSerial {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of packets logged.
    pub fn packets(&self) -> usize {
        self.packets
    }
}

impl Write<u8> for LogSerial {
    type Error = Infallible;

    fn bwrite_all(&mut self, buffer: &[u8]) -> Result<(), Infallible> {
        self.packets += 1;
        info!("[dry run] serial <- {:02x?}", buffer);
        Ok(())
    }

    fn bflush(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// 7 bit checksum over all bytes of a packet.
fn checksum(bytes: &[u8]) -> u8 {
    (bytes.iter().map(|&b| b as u32).sum::<u32>() & 0x7f) as u8
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
