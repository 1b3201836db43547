//! # Simulated Camera
//!
//! [`SimPixy`] stands in for the SPI bus with a camera attached. It plays back a synthetic byte
//! stream and decodes the commands piggy-backed onto the bytes written to it, so the whole driver
//! can be exercised without hardware.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::convert::Infallible;

use embedded_hal::blocking::spi::Transfer;
use log::info;

use crate::{
    block::Block,
    cmd::{BRIGHTNESS_SYNC, CMD_MARKER, LED_SYNC},
    encode::FrameBuilder,
    transport::SYNC_BYTE_DATA,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of frames in the demo scene.
const DEMO_NUM_FRAMES: u16 = 60;

/// Idle words sent between demo frames.
const DEMO_IDLE_WORDS: usize = 4;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Simulated camera on an SPI bus.
pub struct SimPixy {
    stream: Vec<u8>,
    pos: usize,
    looping: bool,

    /// The last byte written was the data-follows sync byte.
    data_follows: bool,

    /// Data bytes received but not yet forming a complete command.
    pending: Vec<u8>,

    brightness: Option<u8>,
    led: Option<(u8, u8, u8)>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimPixy {
    /// Play back `stream` forever.
    pub fn new(stream: Vec<u8>) -> Self {
        Self {
            stream,
            pos: 0,
            looping: true,
            data_follows: false,
            pending: Vec::new(),
            brightness: None,
            led: None,
        }
    }

    /// Play back `stream` once, then send zeros (an idle camera).
    pub fn once(stream: Vec<u8>) -> Self {
        Self {
            looping: false,
            ..Self::new(stream)
        }
    }

    /// A looping scene. Even frames hold two normal blocks sweeping across the view in opposite
    /// directions, odd frames two colour code blocks rotating in place.
    pub fn demo_scene() -> Self {
        let mut builder = FrameBuilder::new();

        for i in 0..DEMO_NUM_FRAMES {
            let blocks = if i % 2 == 0 {
                [
                    Block::new(1, 20 + i * 4, 60, 24, 18),
                    Block::new(2, 300 - i * 4, 140, 16, 16),
                ]
            } else {
                [
                    Block::new(0o12, 160, 120, 40, 40).with_angle((i * 6) % 360),
                    Block::new(0o23, 100, 100, 20, 30).with_angle((i * 9) % 360),
                ]
            };

            builder = builder.frame(&blocks).idle(DEMO_IDLE_WORDS);
        }

        Self::new(builder.into_bytes())
    }

    /// Last brightness commanded, if any.
    pub fn brightness(&self) -> Option<u8> {
        self.brightness
    }

    /// Last LED colour commanded, if any.
    pub fn led(&self) -> Option<(u8, u8, u8)> {
        self.led
    }

    fn next_byte(&mut self) -> u8 {
        if self.pos >= self.stream.len() {
            if !self.looping || self.stream.is_empty() {
                return 0;
            }
            self.pos = 0;
        }

        let b = self.stream[self.pos];
        self.pos += 1;
        b
    }

    fn receive(&mut self, byte: u8) {
        if self.data_follows {
            self.data_follows = false;
            self.pending.push(byte);
            self.parse_command();
        } else if byte == SYNC_BYTE_DATA {
            self.data_follows = true;
        }
    }

    fn parse_command(&mut self) {
        match self.pending.as_slice() {
            [CMD_MARKER, BRIGHTNESS_SYNC, value] => {
                info!("Simulated Pixy brightness set to {}", value);
                self.brightness = Some(*value);
                self.pending.clear();
            }
            [CMD_MARKER, LED_SYNC, r, g, b] => {
                info!("Simulated Pixy LED set to ({}, {}, {})", r, g, b);
                self.led = Some((*r, *g, *b));
                self.pending.clear();
            }
            // Incomplete command
            [CMD_MARKER] | [CMD_MARKER, BRIGHTNESS_SYNC] | [CMD_MARKER, LED_SYNC, ..] => (),
            // Anything else is junk, drop it
            _ => self.pending.clear(),
        }
    }
}

impl Transfer<u8> for SimPixy {
    type Error = Infallible;

    fn transfer<'w>(&mut self, words: &'w mut [u8]) -> Result<&'w [u8], Infallible> {
        for w in words.iter_mut() {
            self.receive(*w);
            *w = self.next_byte();
        }
        Ok(words)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
