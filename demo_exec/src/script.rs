//! # Scripted Drive Demo
//!
//! Runs the RoboClaw through each of its compatibility commands in turn.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{fmt::Debug, time::Duration};

use embedded_hal::blocking::serial::Write;
use log::info;

use crate::roboclaw::{Command, RoboClaw, RoboClawError};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Wait before the first and after the last step.
pub const SETTLE: Duration = Duration::from_secs(5);

/// Wait after a normal step.
const STEP_PAUSE: Duration = Duration::from_secs(2);

/// Wait after stopping the motors.
const STOP_PAUSE: Duration = Duration::from_secs(10);

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Commands sent together, followed by a pause.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub commands: Vec<Command>,
    pub pause: Duration,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// The demo sequence: independent motor commands, a stop, the mixed mode commands, then a final
/// stop.
pub fn demo_sequence() -> Vec<Step> {
    use Command::*;

    let step = |commands: Vec<Command>| Step {
        commands,
        pause: STEP_PAUSE,
    };
    let stop = |commands: Vec<Command>| Step {
        commands,
        pause: STOP_PAUSE,
    };

    vec![
        step(vec![M1Forward(64), M2Backward(64)]),
        step(vec![M1Backward(64), M2Forward(64)]),
        step(vec![M1Drive(96), M2Drive(32)]),
        step(vec![M1Drive(32), M2Drive(96)]),
        stop(vec![M1Drive(0), M2Drive(0)]),
        step(vec![MixedForward(64)]),
        step(vec![MixedBackward(64)]),
        step(vec![MixedRight(64)]),
        step(vec![MixedLeft(64)]),
        step(vec![MixedDrive(32)]),
        step(vec![MixedDrive(96)]),
        step(vec![MixedTurn(32)]),
        step(vec![MixedTurn(96)]),
        stop(vec![MixedForward(0)]),
    ]
}

/// Run `steps` on the controller, calling `sleep` for every pause.
///
/// Stops at the first command that fails to send.
pub fn run<S, E, F>(
    claw: &mut RoboClaw<S>,
    steps: &[Step],
    mut sleep: F,
) -> Result<(), RoboClawError<E>>
where
    S: Write<u8, Error = E>,
    E: Debug,
    F: FnMut(Duration),
{
    sleep(SETTLE);

    for (i, step) in steps.iter().enumerate() {
        info!("Step {}/{}: {:?}", i + 1, steps.len(), step.commands);

        for &cmd in step.commands.iter() {
            claw.send(cmd)?;
        }

        sleep(step.pause);
    }

    sleep(SETTLE);

    info!("Script complete");

    Ok(())
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::roboclaw::{test::RecordSerial, DEFAULT_ADDRESS};

    #[test]
    fn test_demo_sequence_packets() {
        let mut claw = RoboClaw::new(RecordSerial::default(), DEFAULT_ADDRESS);
        let mut pauses = Vec::new();

        run(&mut claw, &demo_sequence(), |d| pauses.push(d)).unwrap();

        let serial = claw.free();
        let codes: Vec<u8> = serial.packets.iter().map(|p| p[1]).collect();
        assert_eq!(
            codes,
            vec![0, 5, 1, 4, 6, 7, 6, 7, 6, 7, 8, 9, 10, 11, 12, 12, 13, 13, 8]
        );

        // Settle, 14 steps, settle
        assert_eq!(pauses.len(), 16);
        assert_eq!(pauses[0], SETTLE);
        assert_eq!(pauses[5], STOP_PAUSE);
        assert_eq!(pauses[14], STOP_PAUSE);
        assert_eq!(pauses[15], SETTLE);

        let total: Duration = pauses.iter().sum();
        assert_eq!(total, Duration::from_secs(5 + 12 * 2 + 2 * 10 + 5));
    }

    #[test]
    fn test_bad_step_stops_script() {
        let mut claw = RoboClaw::new(RecordSerial::default(), DEFAULT_ADDRESS);
        let steps = vec![
            Step {
                commands: vec![Command::MixedDrive(200), Command::MixedDrive(64)],
                pause: STEP_PAUSE,
            },
            Step {
                commands: vec![Command::MixedDrive(64)],
                pause: STEP_PAUSE,
            },
        ];

        assert!(run(&mut claw, &steps, |_| ()).is_err());
        assert!(claw.free().packets.is_empty());
    }
}
