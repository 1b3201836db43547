//! # Raw Byte Trace
//!
//! Optional record of every byte received from the camera, used for debugging the link. It has no
//! effect on decoding.

use std::fmt;

/// Append-only record of received bytes.
#[derive(Debug, Clone, Default)]
pub struct ByteTrace {
    enabled: bool,
    bytes: Vec<u8>,
}

impl ByteTrace {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            bytes: Vec::new(),
        }
    }

    #[inline]
    pub fn record(&mut self, byte: u8) {
        if self.enabled {
            self.bytes.push(byte);
        }
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

/// Formats as comma separated decimal bytes.
impl fmt::Display for ByteTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.bytes.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", b)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_disabled_records_nothing() {
        let mut trace = ByteTrace::new(false);
        trace.record(1);
        assert!(trace.bytes().is_empty());

        trace.set_enabled(true);
        trace.record(170);
        trace.record(85);
        assert_eq!(trace.to_string(), "170,85");

        trace.clear();
        assert_eq!(trace.to_string(), "");
    }
}
