//! # Pixy (CMUcam5) SPI Driver
//!
//! Driver for the Pixy object tracking camera over its ICSP SPI port. The camera streams frames
//! of detected objects ("blocks") continuously, and the only way to receive them is to clock
//! bytes out to it. Commands to the camera are therefore piggy-backed onto the bytes written while
//! polling.
//!
//! The driver is split into three layers:
//!
//! | Module | Purpose |
//! | ------ | ------- |
//! | [`transport`] | One duplex byte exchange per call, assembled into 16-bit words |
//! | [`out_queue`] | Bounded circular queue of command bytes drained by the transport |
//! | [`decoder`] | Resynchronising frame/block state machine |
//!
//! [`PixyCam`] ties them together. [`encode`] and [`sim`] build synthetic camera streams for
//! tests, benches and running without hardware.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod block;
pub mod cam;
pub mod cmd;
pub mod decoder;
pub mod encode;
pub mod out_queue;
pub mod sim;
pub mod trace;
pub mod transport;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use block::Block;
pub use cam::{PixyCam, PixyConfig, PixyError};
pub use out_queue::{CommandSender, OutQueue, QueueError};
pub use sim::SimPixy;
pub use trace::ByteTrace;
