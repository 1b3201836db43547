//! # MCP3008 ADC
//!
//! 8 channel, 10 bit analog to digital converter on the SPI bus.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fmt::Debug;

use embedded_hal::blocking::spi::Transfer;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

pub const NUM_CHANNELS: u8 = 8;

/// Largest raw reading.
pub const MAX_VALUE: u16 = 1023;

const START_BIT: u8 = 0x01;

const SINGLE_ENDED: u8 = 0x80;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct Mcp3008<SPI> {
    spi: SPI,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum Mcp3008Error<E: Debug> {
    #[error("Invalid ADC channel {0}, expected 0 to 7")]
    InvalidChannel(u8),

    #[error("SPI transfer failed: {0:?}")]
    Bus(E),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<SPI, E> Mcp3008<SPI>
where
    SPI: Transfer<u8, Error = E>,
    E: Debug,
{
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Read the raw single ended value of `channel`, 0 to 1023.
    pub fn read_raw(&mut self, channel: u8) -> Result<u16, Mcp3008Error<E>> {
        if channel >= NUM_CHANNELS {
            return Err(Mcp3008Error::InvalidChannel(channel));
        }

        let mut buf = [START_BIT, SINGLE_ENDED | (channel << 4), 0x00];
        let rx = self.spi.transfer(&mut buf).map_err(Mcp3008Error::Bus)?;

        Ok((((rx[1] & 0x03) as u16) << 8) | rx[2] as u16)
    }

    /// Read `channel` as a proportion of full scale, 0.0 to 1.0.
    pub fn read_proportion(&mut self, channel: u8) -> Result<f64, Mcp3008Error<E>> {
        Ok(self.read_raw(channel)? as f64 / MAX_VALUE as f64)
    }

    pub fn free(self) -> SPI {
        self.spi
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use std::convert::Infallible;

    /// ADC which returns a fixed reading per channel and records the requests it was sent.
    pub(crate) struct FakeAdc {
        pub readings: [u16; 8],
        pub requests: Vec<[u8; 3]>,
    }

    impl FakeAdc {
        pub fn new(readings: [u16; 8]) -> Self {
            Self {
                readings,
                requests: Vec::new(),
            }
        }
    }

    impl Transfer<u8> for FakeAdc {
        type Error = Infallible;

        fn transfer<'w>(&mut self, words: &'w mut [u8]) -> Result<&'w [u8], Infallible> {
            self.requests.push([words[0], words[1], words[2]]);

            let channel = ((words[1] >> 4) & 0x07) as usize;
            let value = self.readings[channel];

            // Junk in the bits the device leaves undefined
            words[0] = 0xff;
            words[1] = 0xf8 | (value >> 8) as u8;
            words[2] = value as u8;

            Ok(words)
        }
    }

    #[test]
    fn test_read_raw() {
        let mut adc = Mcp3008::new(FakeAdc::new([0, 1023, 512, 3, 0, 0, 0, 700]));

        assert_eq!(adc.read_raw(1).unwrap(), 1023);
        assert_eq!(adc.read_raw(2).unwrap(), 512);
        assert_eq!(adc.read_raw(7).unwrap(), 700);

        let fake = adc.free();
        assert_eq!(fake.requests[0], [0x01, 0x90, 0x00]);
        assert_eq!(fake.requests[2], [0x01, 0xf0, 0x00]);
    }

    #[test]
    fn test_read_proportion() {
        let mut adc = Mcp3008::new(FakeAdc::new([0, 1023, 0, 0, 0, 0, 0, 0]));

        assert_eq!(adc.read_proportion(0).unwrap(), 0.0);
        assert_eq!(adc.read_proportion(1).unwrap(), 1.0);
    }

    #[test]
    fn test_invalid_channel() {
        let mut adc = Mcp3008::new(FakeAdc::new([0; 8]));

        assert!(matches!(
            adc.read_raw(8),
            Err(Mcp3008Error::InvalidChannel(8))
        ));
        assert!(adc.free().requests.is_empty());
    }
}
