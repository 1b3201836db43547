//! # Pixy Camera
//!
//! [`PixyCam`] is the caller-facing driver: poll for blocks, read them, and send commands.
//!
//! Polling takes `&mut self` and is expected to run on a single worker thread. Commands can be
//! sent from other threads through a [`CommandSender`] obtained from [`PixyCam::command_sender`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{fmt::Debug, sync::Arc, thread, time::Duration};

use embedded_hal::blocking::spi::Transfer;
use log::trace;

use crate::{
    block::Block,
    decoder::{DecoderState, FrameDecoder, FrameStatus},
    out_queue::{CommandSender, OutQueue, QueueError},
    trace::ByteTrace,
    transport::Transport,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Default time to wait after finding the camera idle.
pub const DEFAULT_IDLE_BACKOFF: Duration = Duration::from_millis(10);

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Driver configuration.
#[derive(Debug, Clone)]
pub struct PixyConfig {
    /// How long [`PixyCam::poll`] waits when the camera is idle, so an empty scene isn't polled
    /// flat out.
    pub idle_backoff: Duration,

    /// Record every received byte in the [`ByteTrace`].
    pub trace: bool,
}

/// Pixy camera on an SPI bus.
pub struct PixyCam<SPI> {
    transport: Transport<SPI>,
    decoder: FrameDecoder,
    queue: Arc<OutQueue>,
    config: PixyConfig,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur while polling the camera.
#[derive(thiserror::Error, Debug)]
pub enum PixyError<E: Debug> {
    #[error("SPI transfer failed: {0:?}")]
    Bus(E),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for PixyConfig {
    fn default() -> Self {
        Self {
            idle_backoff: DEFAULT_IDLE_BACKOFF,
            trace: false,
        }
    }
}

impl<SPI, E> PixyCam<SPI>
where
    SPI: Transfer<u8, Error = E>,
    E: Debug,
{
    /// Create a new camera driver on an already configured SPI bus.
    pub fn new(spi: SPI, config: PixyConfig) -> Self {
        let queue = Arc::new(OutQueue::new());
        let mut transport = Transport::new(spi, queue.clone());
        transport.trace_mut().set_enabled(config.trace);

        Self {
            transport,
            decoder: FrameDecoder::new(),
            queue,
            config,
        }
    }

    /// Poll the camera for the next frame, decoding at most `max_blocks` blocks.
    ///
    /// Returns the number of blocks decoded, which are then available from [`Self::blocks`]. If
    /// the camera is idle this returns `Ok(0)` after waiting for the configured backoff.
    pub fn poll(&mut self, max_blocks: usize) -> Result<usize, PixyError<E>> {
        self.transport.trace_mut().clear();

        let status = self
            .decoder
            .poll(&mut self.transport, max_blocks)
            .map_err(PixyError::Bus)?;

        if self.transport.trace().is_enabled() {
            trace!("Bytes received over SPI: {}", self.transport.trace());
        }

        match status {
            FrameStatus::Decoded(n) => Ok(n),
            FrameStatus::Idle => {
                if !self.config.idle_backoff.is_zero() {
                    thread::sleep(self.config.idle_backoff);
                }
                Ok(0)
            }
        }
    }

    /// Blocks decoded by the last poll.
    pub fn blocks(&self) -> &[Block] {
        self.decoder.blocks()
    }

    /// Set the camera brightness (exposure), 0 to 255.
    ///
    /// The command is sent during subsequent polls.
    pub fn set_brightness(&self, brightness: u8) -> Result<(), QueueError> {
        self.command_sender().set_brightness(brightness)
    }

    /// Set the RGB LED. The command is sent during subsequent polls.
    pub fn set_led(&self, red: bool, green: bool, blue: bool) -> Result<(), QueueError> {
        self.command_sender().set_led(red, green, blue)
    }

    /// Handle for sending commands from another thread.
    pub fn command_sender(&self) -> CommandSender {
        CommandSender::new(self.queue.clone())
    }

    /// Bytes received during the last poll, if tracing is enabled.
    pub fn trace(&self) -> &ByteTrace {
        self.transport.trace()
    }

    pub fn decoder_state(&self) -> DecoderState {
        self.decoder.state()
    }

    pub fn spi(&self) -> &SPI {
        self.transport.spi()
    }

    /// Release the SPI bus.
    pub fn free(self) -> SPI {
        self.transport.free()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::{encode::FrameBuilder, sim::SimPixy};

    fn no_wait() -> PixyConfig {
        PixyConfig {
            idle_backoff: Duration::ZERO,
            trace: true,
        }
    }

    #[test]
    fn test_poll_over_sim() {
        let frame = [
            Block::new(0o12, 100, 100, 10, 20).with_angle(90),
            Block::new(0o12, 50, 60, 30, 30).with_angle(270),
        ];
        let stream = FrameBuilder::new().idle(2).frame(&frame).into_bytes();
        let mut cam = PixyCam::new(SimPixy::once(stream), no_wait());

        assert_eq!(cam.poll(10).unwrap(), 0);
        assert_eq!(cam.trace().bytes(), &[0, 0, 0, 0]);

        assert_eq!(cam.poll(10).unwrap(), 2);
        assert_eq!(cam.blocks(), &frame);
        assert!(!cam.decoder_state().skip_start);
    }

    #[test]
    fn test_commands_reach_camera() {
        let mut cam = PixyCam::new(SimPixy::demo_scene(), no_wait());

        cam.set_brightness(120).unwrap();
        let sender = cam.command_sender();
        std::thread::spawn(move || sender.set_led(false, true, false).unwrap())
            .join()
            .unwrap();

        // 8 command bytes go out one per word, a frame is far longer than that
        cam.poll(10).unwrap();
        cam.poll(10).unwrap();

        assert_eq!(cam.spi().brightness(), Some(120));
        assert_eq!(cam.spi().led(), Some((0, 255, 0)));
        assert_eq!(cam.command_sender().pending(), 0);
    }

    #[test]
    fn test_demo_scene_decodes() {
        let mut cam = PixyCam::new(SimPixy::demo_scene(), no_wait());

        let mut frames = 0;
        let mut normal = 0;
        let mut colour_code = 0;
        for _ in 0..40 {
            if cam.poll(10).unwrap() > 0 {
                let blocks = cam.blocks();
                assert_eq!(blocks.len(), 2);

                // Every block in a frame is of the frame's type
                assert_eq!(blocks[0].extended, blocks[1].extended);
                assert_eq!(blocks[0].extended, cam.decoder_state().extended);

                if blocks[0].extended {
                    colour_code += 1;
                } else {
                    normal += 1;
                }
                frames += 1;
            }
        }
        assert!(frames >= 10);
        assert!(normal > 0);
        assert!(colour_code > 0);
    }
}
