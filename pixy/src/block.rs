//! # Object Blocks
//!
//! A block is the record the camera sends for one detected object. On the wire a block is a
//! sequence of 16-bit words:
//!
//! ```text
//! word   description
//! ----------------------------------------------------------------
//! 0      sync (0xaa55, or 0xaa56 for a colour code block)
//! 1      checksum (wrapping sum of words 2..)
//! 2      signature number
//! 3      x center of object
//! 4      y center of object
//! 5      width of object
//! 6      height of object
//! 7      angle of object (colour code blocks only)
//! ```

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// One detected object.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq)]
pub struct Block {
    /// Signature number (colour signature, or octal colour code for extended blocks)
    pub signature: u16,

    /// X center of the object, 0 to 319
    pub x: u16,

    /// Y center of the object, 0 to 199
    pub y: u16,

    pub width: u16,

    pub height: u16,

    /// Colour code angle in degrees. Always 0 for normal blocks.
    pub angle: u16,

    /// Width times height. Not sent by the camera.
    pub area: u32,

    /// True if this block was decoded as a colour code block.
    pub extended: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Block {
    /// Create a normal (non colour code) block.
    pub fn new(signature: u16, x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            signature,
            x,
            y,
            width,
            height,
            angle: 0,
            area: width as u32 * height as u32,
            extended: false,
        }
    }

    /// Turn this block into a colour code block with the given angle.
    pub fn with_angle(mut self, angle: u16) -> Self {
        self.angle = angle;
        self.extended = true;
        self
    }

    /// Build a block from its payload words, in wire order.
    ///
    /// `words` must hold 5 words for a normal block or 6 for an extended one.
    pub(crate) fn from_words(words: &[u16], extended: bool) -> Self {
        let block = Self::new(words[0], words[1], words[2], words[3], words[4]);

        if extended {
            block.with_angle(words[5])
        } else {
            block
        }
    }

    /// Payload words of this block as they appear on the wire, excluding sync and checksum.
    pub fn payload(&self) -> Vec<u16> {
        let mut words = vec![self.signature, self.x, self.y, self.width, self.height];
        if self.extended {
            words.push(self.angle);
        }
        words
    }

    /// The checksum the camera would send for this block.
    pub fn checksum(&self) -> u16 {
        self.payload()
            .iter()
            .fold(0u16, |sum, w| sum.wrapping_add(*w))
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "S: {} X: {} Y: {} W: {} H: {} Color: {}",
            self.signature, self.x, self.y, self.width, self.height, self.extended
        )?;

        if self.extended {
            write!(f, " A: {}", self.angle)?;
        }

        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
