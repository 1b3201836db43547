//! # Frame/Block Decoder
//!
//! Finds frames in the continuous word stream from the camera and decodes the blocks inside them.
//!
//! A frame starts with two sync words. The first is always [`FRAME_START`], the second is the
//! sync of the first block: [`FRAME_START`] again for a frame of normal blocks or
//! [`FRAME_START_EXT`] for a frame of colour code blocks. That choice holds for the whole frame.
//! Every following block is introduced by its own sync word, and the frame ends when a second sync
//! word appears where a checksum is expected (the start of the next frame) or when the camera goes
//! quiet.
//!
//! The decoder is stateful across polls. If a poll stops on the start of the next frame it has
//! already consumed that frame's sync words, so the next poll must not search for them again.
//! That state is held in [`DecoderState`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, warn};

use crate::block::Block;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Start of a frame, and sync word of a normal block.
pub const FRAME_START: u16 = 0xaa55;

/// Sync word of a colour code (extended) block.
pub const FRAME_START_EXT: u16 = 0xaa56;

/// [`FRAME_START`] read one byte out of step.
pub const START_WRONG_ORDER: u16 = 0x55aa;

/// Hard limit on the number of blocks decoded in one poll.
pub const MAX_BLOCKS: usize = 135;

/// Initial capacity of the block storage, and the amount it grows by when full.
pub const BLOCK_CAPACITY_STEP: usize = 10;

/// Number of payload words in a normal block.
const NUM_WORDS: usize = 5;

/// Number of payload words in a colour code block.
const NUM_WORDS_EXT: usize = 6;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A source of words from the camera.
pub trait WordSource {
    type Error;

    /// Read the next 16-bit word.
    fn read_word(&mut self) -> Result<u16, Self::Error>;

    /// Consume a single byte, used to get back into step after a misaligned read.
    fn skip_byte(&mut self) -> Result<(), Self::Error>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// State carried from one poll to the next.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct DecoderState {
    /// The sync words of the next frame were consumed by the previous poll.
    pub skip_start: bool,

    /// The current frame is made of colour code blocks, each with an extra angle word.
    pub extended: bool,
}

/// Decodes frames of blocks from a [`WordSource`].
pub struct FrameDecoder {
    state: DecoderState,
    blocks: Vec<Block>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Result of a single poll.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrameStatus {
    /// The camera is sending nothing. The caller should wait before polling again.
    Idle,

    /// A frame was found and this many valid blocks were decoded from it.
    Decoded(usize),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            state: DecoderState::default(),
            blocks: Vec::with_capacity(BLOCK_CAPACITY_STEP),
        }
    }

    /// Decode up to `max_blocks` blocks from the next frame.
    ///
    /// The blocks from the previous poll are discarded. Malformed data never produces an error:
    /// blocks with a bad checksum are dropped and misaligned reads are repaired. The only errors
    /// returned are those of the underlying source.
    pub fn poll<S>(&mut self, src: &mut S, max_blocks: usize) -> Result<FrameStatus, S::Error>
    where
        S: WordSource,
    {
        self.blocks.clear();

        if self.state.skip_start {
            self.state.skip_start = false;
        } else if !self.seek_frame(src)? {
            return Ok(FrameStatus::Idle);
        }

        let limit = max_blocks.min(MAX_BLOCKS);

        while self.blocks.len() < limit {
            let checksum = src.read_word()?;

            match checksum {
                // The previous word was the sync of a block, so a second sync word here is the
                // start of the next frame.
                FRAME_START => {
                    self.state.skip_start = true;
                    self.state.extended = false;
                    break;
                }
                FRAME_START_EXT => {
                    self.state.skip_start = true;
                    self.state.extended = true;
                    break;
                }
                0 => break,
                _ => (),
            }

            match self.read_block(src, checksum)? {
                Some(block) => self.push(block),
                None => warn!("Pixy block checksum error (expected {:#06x})", checksum),
            }

            // Sync word of the next block, or the end of the frame. Whether the block is a colour
            // code block is fixed by the frame start, not by this word.
            match src.read_word()? {
                FRAME_START | FRAME_START_EXT => (),
                _ => break,
            }
        }

        Ok(FrameStatus::Decoded(self.blocks.len()))
    }

    /// Blocks decoded by the last poll, in stream order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Current capacity of the block storage.
    pub fn capacity(&self) -> usize {
        self.blocks.capacity()
    }

    /// Search for the start of a frame.
    ///
    /// Returns `false` if the camera is idle.
    fn seek_frame<S>(&mut self, src: &mut S) -> Result<bool, S::Error>
    where
        S: WordSource,
    {
        let mut last = 0xffff;

        loop {
            let word = src.read_word()?;

            match (last, word) {
                (0, 0) => return Ok(false),
                (FRAME_START, FRAME_START) => {
                    self.state.extended = false;
                    return Ok(true);
                }
                (FRAME_START, FRAME_START_EXT) => {
                    self.state.extended = true;
                    return Ok(true);
                }
                (_, START_WRONG_ORDER) => {
                    debug!("Pixy stream out of step, resyncing");
                    src.skip_byte()?;
                }
                _ => (),
            }

            last = word;
        }
    }

    /// Read the payload of one block and check it against `checksum`.
    fn read_block<S>(&self, src: &mut S, checksum: u16) -> Result<Option<Block>, S::Error>
    where
        S: WordSource,
    {
        let num_words = if self.state.extended {
            NUM_WORDS_EXT
        } else {
            NUM_WORDS
        };

        let mut words = [0u16; NUM_WORDS_EXT];
        let mut sum = 0u16;

        for w in words[..num_words].iter_mut() {
            *w = src.read_word()?;
            sum = sum.wrapping_add(*w);
        }

        if sum == checksum {
            Ok(Some(Block::from_words(&words, self.state.extended)))
        } else {
            Ok(None)
        }
    }

    fn push(&mut self, block: Block) {
        if self.blocks.len() == self.blocks.capacity() {
            self.blocks.reserve_exact(BLOCK_CAPACITY_STEP);
        }
        self.blocks.push(block);
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::encode::FrameBuilder;
    use std::convert::Infallible;

    /// Word source over a fixed byte stream. Reads past the end return zeros, which the decoder
    /// sees as an idle camera.
    struct Bytes {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Bytes {
        fn new(bytes: Vec<u8>) -> Self {
            Self { bytes, pos: 0 }
        }

        fn words(words: &[u16]) -> Self {
            Self::new(crate::encode::words_to_bytes(words))
        }

        fn next(&mut self) -> u8 {
            let b = self.bytes.get(self.pos).copied().unwrap_or(0);
            self.pos += 1;
            b
        }

        /// Index of the next word to be read, assuming word alignment.
        fn word_pos(&self) -> usize {
            self.pos / 2
        }
    }

    impl WordSource for Bytes {
        type Error = Infallible;

        fn read_word(&mut self) -> Result<u16, Infallible> {
            let hi = self.next();
            let lo = self.next();
            Ok(((hi as u16) << 8) | lo as u16)
        }

        fn skip_byte(&mut self) -> Result<(), Infallible> {
            self.next();
            Ok(())
        }
    }

    #[test]
    fn test_single_block_example() {
        let s = 7u16 + 100 + 50 + 20 + 10;
        let mut src = Bytes::words(&[
            0xaa55, 0xaa55, s, 7, 100, 50, 20, 10, 0xaa55, 0xaa55,
        ]);
        let mut dec = FrameDecoder::new();

        assert_eq!(dec.poll(&mut src, 10).unwrap(), FrameStatus::Decoded(1));
        assert_eq!(
            dec.blocks(),
            &[Block {
                signature: 7,
                x: 100,
                y: 50,
                width: 20,
                height: 10,
                angle: 0,
                area: 200,
                extended: false,
            }]
        );
        assert_eq!(
            dec.state(),
            DecoderState {
                skip_start: true,
                extended: false
            }
        );
    }

    #[test]
    fn test_frames_decode_in_order() {
        let frame_a = [
            Block::new(1, 10, 20, 30, 40),
            Block::new(2, 50, 60, 70, 80),
            Block::new(3, 319, 199, 1, 1),
        ];
        let frame_b = [Block::new(4, 1, 2, 3, 4)];

        let mut src = Bytes::new(
            FrameBuilder::new()
                .frame(&frame_a)
                .frame(&frame_b)
                .idle(2)
                .into_bytes(),
        );
        let mut dec = FrameDecoder::new();

        assert_eq!(dec.poll(&mut src, 10).unwrap(), FrameStatus::Decoded(3));
        assert_eq!(dec.blocks(), &frame_a);
        assert!(dec.state().skip_start);

        // The second frame's start was consumed by the first poll
        assert_eq!(dec.poll(&mut src, 10).unwrap(), FrameStatus::Decoded(1));
        assert_eq!(dec.blocks(), &frame_b);
        assert!(!dec.state().skip_start);

        assert_eq!(dec.poll(&mut src, 10).unwrap(), FrameStatus::Idle);
        assert!(dec.blocks().is_empty());
    }

    #[test]
    fn test_extended_blocks_round_trip() {
        let frame = [
            Block::new(0o12, 100, 80, 40, 30).with_angle(45),
            Block::new(0o23, 200, 150, 60, 20).with_angle(315),
        ];
        let normal = [Block::new(1, 10, 10, 5, 5), Block::new(2, 20, 20, 5, 5)];
        let last = [Block::new(0o12, 1, 1, 1, 1).with_angle(180)];

        let mut src = Bytes::new(
            FrameBuilder::new()
                .frame(&frame)
                .frame(&normal)
                .frame(&last)
                .into_bytes(),
        );
        let mut dec = FrameDecoder::new();

        assert_eq!(dec.poll(&mut src, 10).unwrap(), FrameStatus::Decoded(2));
        assert_eq!(dec.blocks(), &frame);

        // The start of the next frame sets its type
        assert_eq!(
            dec.state(),
            DecoderState {
                skip_start: true,
                extended: false
            }
        );
        assert_eq!(dec.poll(&mut src, 10).unwrap(), FrameStatus::Decoded(2));
        assert_eq!(dec.blocks(), &normal);
        assert!(dec.state().extended);

        assert_eq!(dec.poll(&mut src, 10).unwrap(), FrameStatus::Decoded(1));
        assert_eq!(dec.blocks(), &last);
    }

    #[test]
    fn test_block_type_is_set_per_frame() {
        let normal = Block::new(1, 10, 20, 30, 40);
        let code = Block::new(2, 50, 60, 70, 80).with_angle(90);

        // A colour code sync word inside a normal frame does not change how the block is read:
        // it is read as a normal block, fails its checksum, and the angle word ends the frame.
        let mut src = Bytes::new(FrameBuilder::new().frame(&[normal, code]).into_bytes());
        let mut dec = FrameDecoder::new();

        assert_eq!(dec.poll(&mut src, 10).unwrap(), FrameStatus::Decoded(1));
        assert_eq!(dec.blocks(), &[normal]);
        assert!(!dec.blocks()[0].extended);
        assert!(!dec.state().extended);

        // And the other way round, a normal sync word inside a colour code frame. The trailing
        // word is read as the angle of the normal block, so its checksum fails.
        let mut src = Bytes::new(
            FrameBuilder::new()
                .frame(&[code, normal])
                .word(7)
                .into_bytes(),
        );
        let mut dec = FrameDecoder::new();

        assert_eq!(dec.poll(&mut src, 10).unwrap(), FrameStatus::Decoded(1));
        assert_eq!(dec.blocks(), &[code]);
        assert!(dec.state().extended);
    }

    #[test]
    fn test_bad_checksum_drops_one_block() {
        let frame = [
            Block::new(1, 10, 10, 10, 10),
            Block::new(2, 20, 20, 20, 20),
            Block::new(3, 30, 30, 30, 30),
        ];
        let mut words = FrameBuilder::new().frame(&frame).into_words();

        // Words: start, [sync, checksum, 5 payload] x 3. Corrupt the second block's checksum.
        words[1 + 7 + 1] ^= 0x0100;

        let mut src = Bytes::words(&words);
        let mut dec = FrameDecoder::new();

        assert_eq!(dec.poll(&mut src, 10).unwrap(), FrameStatus::Decoded(2));
        assert_eq!(dec.blocks(), &[frame[0], frame[2]]);
    }

    #[test]
    fn test_wrong_order_start_resyncs() {
        let frame = [Block::new(5, 60, 70, 8, 9)];
        let words = FrameBuilder::new()
            .word(FRAME_START)
            .frame(&frame)
            .into_words();

        // One stray byte shifts the whole stream, so the first word read is 0x55aa
        let mut bytes = vec![0x55];
        bytes.extend(crate::encode::words_to_bytes(&words));

        let mut src = Bytes::new(bytes);
        let mut dec = FrameDecoder::new();

        assert_eq!(dec.poll(&mut src, 10).unwrap(), FrameStatus::Decoded(1));
        assert_eq!(dec.blocks(), &frame);
    }

    #[test]
    fn test_idle_does_not_consume_frame_start() {
        let frame = [Block::new(1, 2, 3, 4, 5)];
        let mut src = Bytes::new(FrameBuilder::new().idle(2).frame(&frame).into_bytes());
        let mut dec = FrameDecoder::new();

        assert_eq!(dec.poll(&mut src, 10).unwrap(), FrameStatus::Idle);
        assert_eq!(src.word_pos(), 2);

        assert_eq!(dec.poll(&mut src, 10).unwrap(), FrameStatus::Decoded(1));
        assert_eq!(dec.blocks(), &frame);
    }

    #[test]
    fn test_empty_frame() {
        let mut src = Bytes::new(FrameBuilder::new().frame(&[]).into_bytes());
        let mut dec = FrameDecoder::new();

        assert_eq!(dec.poll(&mut src, 10).unwrap(), FrameStatus::Decoded(0));
        assert!(!dec.state().skip_start);
    }

    #[test]
    fn test_max_blocks_limits_decode() {
        let frame: Vec<Block> = (1..6).map(|i| Block::new(i, i, i, i, i)).collect();
        let mut src = Bytes::new(FrameBuilder::new().frame(&frame).into_bytes());
        let mut dec = FrameDecoder::new();

        assert_eq!(dec.poll(&mut src, 2).unwrap(), FrameStatus::Decoded(2));
        assert_eq!(dec.blocks(), &frame[..2]);
    }

    #[test]
    fn test_storage_grows_and_hard_cap() {
        let frame: Vec<Block> = (0..200).map(|i| Block::new(1, i, i, 2, 2)).collect();
        let mut src = Bytes::new(FrameBuilder::new().frame(&frame).into_bytes());
        let mut dec = FrameDecoder::new();
        assert_eq!(dec.capacity(), BLOCK_CAPACITY_STEP);

        assert_eq!(
            dec.poll(&mut src, usize::MAX).unwrap(),
            FrameStatus::Decoded(MAX_BLOCKS)
        );
        assert!(dec.capacity() >= MAX_BLOCKS);
        assert_eq!(dec.blocks(), &frame[..MAX_BLOCKS]);
    }

    #[test]
    fn test_short_frame_truncates_silently() {
        // A block whose following word is not a sync word ends the frame. Whatever comes after it
        // is not decoded even if it is a complete block with a valid checksum.
        let first = Block::new(1, 10, 10, 10, 10);
        let second = Block::new(2, 20, 20, 20, 20);

        let mut words = FrameBuilder::new().frame(&[first]).into_words();
        words.push(0x1234);
        words.push(second.checksum());
        words.extend(second.payload());

        let mut src = Bytes::words(&words);
        let mut dec = FrameDecoder::new();

        assert_eq!(dec.poll(&mut src, 10).unwrap(), FrameStatus::Decoded(1));
        assert_eq!(dec.blocks(), &[first]);
        assert!(!dec.state().skip_start);
    }
}
