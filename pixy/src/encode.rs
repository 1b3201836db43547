//! # Synthetic Frame Encoder
//!
//! Builds the word stream the camera would send for a given set of blocks. Used by the simulated
//! camera, tests and benches.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use crate::{
    block::Block,
    decoder::{FRAME_START, FRAME_START_EXT},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Builder for a camera word stream.
#[derive(Debug, Default, Clone)]
pub struct FrameBuilder {
    words: Vec<u16>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl FrameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame containing `blocks`.
    ///
    /// An empty frame is sent as a bare pair of start words.
    pub fn frame(mut self, blocks: &[Block]) -> Self {
        self.words.push(FRAME_START);

        if blocks.is_empty() {
            self.words.push(FRAME_START);
        }

        for block in blocks {
            self.words.extend(block_words(block));
        }

        self
    }

    /// Append `num_words` idle (zero) words.
    pub fn idle(mut self, num_words: usize) -> Self {
        self.words.extend(std::iter::repeat(0).take(num_words));
        self
    }

    /// Append a single raw word.
    pub fn word(mut self, word: u16) -> Self {
        self.words.push(word);
        self
    }

    pub fn words(&self) -> &[u16] {
        &self.words
    }

    pub fn into_words(self) -> Vec<u16> {
        self.words
    }

    /// The stream as it appears on the bus.
    pub fn into_bytes(self) -> Vec<u8> {
        words_to_bytes(&self.words)
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Wire words of a single block: sync, checksum, then payload.
pub fn block_words(block: &Block) -> Vec<u16> {
    let sync = if block.extended {
        FRAME_START_EXT
    } else {
        FRAME_START
    };

    let mut words = vec![sync, block.checksum()];
    words.extend(block.payload());
    words
}

/// Split words into bytes, high byte first.
pub fn words_to_bytes(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_block_layout() {
        let block = Block::new(7, 100, 50, 20, 10);
        assert_eq!(
            block_words(&block),
            vec![0xaa55, 187, 7, 100, 50, 20, 10]
        );

        let block = block.with_angle(90);
        assert_eq!(
            block_words(&block),
            vec![0xaa56, 277, 7, 100, 50, 20, 10, 90]
        );
    }

    #[test]
    fn test_bytes_are_high_first() {
        let bytes = FrameBuilder::new().word(0xaa55).idle(1).into_bytes();
        assert_eq!(bytes, vec![0xaa, 0x55, 0x00, 0x00]);
    }
}
