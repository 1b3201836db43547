//! # Byte/Word Transport
//!
//! The lowest layer of the driver, performing duplex exchanges with the camera over SPI.
//!
//! Every 16-bit value is sent high byte first. To receive anything at all a byte must be written
//! at the same time, so each word read writes a pair of bytes:
//!
//! - `0x5a, 0x00` when nothing is queued, or
//! - `0x5b, <next queued byte>` when the outbound queue holds data.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::Arc;

use embedded_hal::blocking::spi::Transfer;

use crate::{decoder::WordSource, out_queue::OutQueue, trace::ByteTrace};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Filler written with the first byte of a word when there is nothing to send.
pub const SYNC_BYTE: u8 = 0x5a;

/// Written with the first byte of a word when the second byte carries queued data.
pub const SYNC_BYTE_DATA: u8 = 0x5b;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Duplex byte/word transport over an SPI bus.
pub struct Transport<SPI> {
    spi: SPI,
    queue: Arc<OutQueue>,
    trace: ByteTrace,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<SPI, E> Transport<SPI>
where
    SPI: Transfer<u8, Error = E>,
{
    /// Create a new transport draining the given outbound queue.
    ///
    /// The bus must already be configured (clock rate, mode). No configuration happens here.
    pub fn new(spi: SPI, queue: Arc<OutQueue>) -> Self {
        Self {
            spi,
            queue,
            trace: ByteTrace::default(),
        }
    }

    /// Perform one blocking duplex transfer, writing `out` and returning the byte read back.
    pub fn exchange_byte(&mut self, out: u8) -> Result<u8, E> {
        let mut buf = [out];
        self.spi.transfer(&mut buf)?;

        self.trace.record(buf[0]);
        Ok(buf[0])
    }

    /// Read one word, sending the next queued byte (if any) along the way.
    ///
    /// The queued byte is only removed from the queue once both exchanges succeed, so a bus error
    /// leaves it to be sent with the next word.
    pub fn read_word(&mut self) -> Result<u16, E> {
        let queued = self.queue.peek_outbound_byte();
        let (sync, out) = match queued {
            Some(b) => (SYNC_BYTE_DATA, b),
            None => (SYNC_BYTE, 0x00),
        };

        let hi = self.exchange_byte(sync)?;
        let lo = self.exchange_byte(out)?;

        // This transport is the only consumer, so the head of the queue is still the byte sent
        if queued.is_some() {
            self.queue.next_outbound_byte();
        }

        Ok(((hi as u16) << 8) | lo as u16)
    }

    pub fn trace(&self) -> &ByteTrace {
        &self.trace
    }

    pub fn trace_mut(&mut self) -> &mut ByteTrace {
        &mut self.trace
    }

    pub fn spi(&self) -> &SPI {
        &self.spi
    }

    /// Release the SPI bus.
    pub fn free(self) -> SPI {
        self.spi
    }
}

impl<SPI, E> WordSource for Transport<SPI>
where
    SPI: Transfer<u8, Error = E>,
{
    type Error = E;

    fn read_word(&mut self) -> Result<u16, E> {
        Transport::read_word(self)
    }

    fn skip_byte(&mut self) -> Result<(), E> {
        self.exchange_byte(0x00).map(|_| ())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
