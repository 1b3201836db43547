//! # Poll Worker
//!
//! The loop run on the dedicated camera thread. The camera is owned by this thread for its whole
//! life, everything else talks to it through a `CommandSender`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    fmt::Debug,
    thread,
    time::{Duration, Instant},
};

use embedded_hal::blocking::spi::Transfer;
use log::{debug, info, warn};
use pixy::PixyCam;

use crate::params::PixyExecParams;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of frames between summary log lines.
const SUMMARY_INTERVAL_FRAMES: u64 = 50;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PollSettings {
    pub max_blocks: usize,
    pub poll_period: Duration,
    pub poll_limit: Option<u64>,
}

/// Totals accumulated by the poll loop.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct PollStats {
    pub polls: u64,

    /// Polls which returned at least one block
    pub frames: u64,

    pub blocks: u64,

    pub bus_errors: u64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl From<&PixyExecParams> for PollSettings {
    fn from(params: &PixyExecParams) -> Self {
        Self {
            max_blocks: params.max_blocks,
            poll_period: Duration::from_millis(params.poll_period_ms),
            poll_limit: params.poll_limit,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Poll the camera until the poll limit is reached, or forever if there isn't one.
///
/// Bus errors are logged and polling carries on.
pub fn poll_loop<SPI, E>(mut cam: PixyCam<SPI>, settings: PollSettings) -> PollStats
where
    SPI: Transfer<u8, Error = E>,
    E: Debug,
{
    let mut stats = PollStats::default();

    info!("Poll thread started");

    while settings.poll_limit.map_or(true, |limit| stats.polls < limit) {
        let start = Instant::now();
        stats.polls += 1;

        match cam.poll(settings.max_blocks) {
            Ok(0) => (),
            Ok(num_blocks) => {
                stats.frames += 1;
                stats.blocks += num_blocks as u64;

                debug!(
                    "Getting {} blocks took {} ms",
                    num_blocks,
                    start.elapsed().as_millis()
                );
                for block in cam.blocks() {
                    debug!("    {}", block);
                }

                if stats.frames % SUMMARY_INTERVAL_FRAMES == 0 {
                    info!(
                        "{} frames, {} blocks, {} bus errors",
                        stats.frames, stats.blocks, stats.bus_errors
                    );
                }
            }
            Err(e) => {
                stats.bus_errors += 1;
                warn!("Could not poll the camera: {}", e);
            }
        }

        if !settings.poll_period.is_zero() {
            thread::sleep(settings.poll_period);
        }
    }

    stats
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use embedded_hal::blocking::spi::Transfer;
    use pixy::{PixyConfig, SimPixy};

    /// Bus which fails every transfer.
    struct BrokenBus;

    impl Transfer<u8> for BrokenBus {
        type Error = &'static str;

        fn transfer<'w>(&mut self, _words: &'w mut [u8]) -> Result<&'w [u8], &'static str> {
            Err("disconnected")
        }
    }

    fn settings(limit: u64) -> PollSettings {
        PollSettings {
            max_blocks: 10,
            poll_period: Duration::ZERO,
            poll_limit: Some(limit),
        }
    }

    fn config() -> PixyConfig {
        PixyConfig {
            idle_backoff: Duration::ZERO,
            trace: false,
        }
    }

    #[test]
    fn test_poll_loop_counts_frames() {
        let cam = PixyCam::new(SimPixy::demo_scene(), config());
        let stats = poll_loop(cam, settings(20));

        // The demo scene alternates a frame of two blocks with an idle gap
        assert_eq!(stats.polls, 20);
        assert_eq!(stats.frames, 10);
        assert_eq!(stats.blocks, 20);
        assert_eq!(stats.bus_errors, 0);
    }

    #[test]
    fn test_bus_errors_do_not_stop_polling() {
        let cam = PixyCam::new(BrokenBus, config());
        let stats = poll_loop(cam, settings(3));

        assert_eq!(stats.polls, 3);
        assert_eq!(stats.bus_errors, 3);
    }
}
