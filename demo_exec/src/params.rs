//! # Demo Executable Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Deserialize, Debug, Clone)]
pub struct DemoExecParams {
    pub serial: SerialParams,

    /// Packet serial address of the RoboClaw, 0x80 to 0x87
    pub roboclaw_address: u8,

    pub adc: AdcParams,

    pub braitenberg: BraitenbergParams,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SerialParams {
    /// Serial device the RoboClaw is connected to
    pub path: String,

    pub baud: u32,
}

/// SPI settings for the MCP3008.
#[derive(Deserialize, Debug, Clone)]
pub struct AdcParams {
    pub bus: u8,

    pub slave_select: u8,

    pub clock_hz: u32,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BraitenbergParams {
    pub right_channel: u8,
    pub centre_channel: u8,
    pub left_channel: u8,

    /// Motor speed at full sensor reading
    pub max_speed: i32,

    pub period_ms: u64,

    /// Stop after this many steps. Runs forever if not set.
    pub step_limit: Option<u64>,
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_shipped_params_parse() {
        let params: DemoExecParams =
            util::params::from_str(include_str!("../../params/demo_exec.toml")).unwrap();

        assert_eq!(params.roboclaw_address, 0x80);
        assert_eq!(params.serial.baud, 38400);
        assert_eq!(params.braitenberg.max_speed, 64);
        assert_eq!(params.braitenberg.period_ms, 100);
        assert!(params.braitenberg.step_limit.is_none());
    }
}
