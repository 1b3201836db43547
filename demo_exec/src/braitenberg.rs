//! # Braitenberg Vehicle
//!
//! Steers a two motor robot from three light sensors. Each side's sensor drives the motor on that
//! side, so the robot turns away from the brighter side, and a bright centre reading slows both
//! motors down.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    fmt::Debug,
    time::{Duration, Instant},
};

use embedded_hal::blocking::{serial::Write, spi::Transfer};
use log::{debug, info};
use util::maths::{clamp, lin_map};

use crate::{
    display::CharDisplay,
    mcp3008::{Mcp3008, Mcp3008Error},
    params::BraitenbergParams,
    roboclaw::{Command, RoboClaw, RoboClawError},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Sensor readings as proportions of full scale.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Proportions {
    pub right: f64,
    pub centre: f64,
    pub left: f64,
}

pub struct Vehicle<SPI, S, D> {
    adc: Mcp3008<SPI>,
    claw: RoboClaw<S>,
    display: D,
    params: BraitenbergParams,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum VehicleError<A: Debug, M: Debug, D: Debug> {
    #[error("Could not read the sensors: {0}")]
    Sensor(Mcp3008Error<A>),

    #[error("Could not drive the motors: {0}")]
    Motor(RoboClawError<M>),

    #[error("Could not update the display: {0:?}")]
    Display(D),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<SPI, S, D, A, M> Vehicle<SPI, S, D>
where
    SPI: Transfer<u8, Error = A>,
    S: Write<u8, Error = M>,
    D: CharDisplay,
    A: Debug,
    M: Debug,
    D::Error: Debug,
{
    pub fn new(
        adc: Mcp3008<SPI>,
        claw: RoboClaw<S>,
        display: D,
        params: BraitenbergParams,
    ) -> Self {
        Self {
            adc,
            claw,
            display,
            params,
        }
    }

    /// Read the sensors.
    pub fn read(&mut self) -> Result<Proportions, VehicleError<A, M, D::Error>> {
        let params = &self.params;
        let adc = &mut self.adc;
        let mut read = |channel| -> Result<f64, VehicleError<A, M, D::Error>> {
            adc.read_proportion(channel).map_err(VehicleError::Sensor)
        };

        Ok(Proportions {
            right: read(params.right_channel)?,
            centre: read(params.centre_channel)?,
            left: read(params.left_channel)?,
        })
    }

    /// Read the sensors once and update the motors and display.
    ///
    /// Returns the (M1, M2) speeds sent.
    pub fn step(&mut self) -> Result<(i32, i32), VehicleError<A, M, D::Error>> {
        let prop = self.read()?;
        let (left, right) = motor_speeds(&prop, self.params.max_speed);

        debug!("{:?} -> M1 {}, M2 {}", prop, left, right);

        self.claw
            .send(Command::M1Speed(left))
            .map_err(VehicleError::Motor)?;
        self.claw
            .send(Command::M2Speed(right))
            .map_err(VehicleError::Motor)?;

        self.display.clear().map_err(VehicleError::Display)?;
        self.display
            .show_line(
                1,
                &format!(
                    "L{:3.0} C{:3.0} R{:3.0}",
                    prop.left * 100.0,
                    prop.centre * 100.0,
                    prop.right * 100.0
                ),
            )
            .map_err(VehicleError::Display)?;
        self.display
            .show_line(2, &format!("M1 {} M2 {}", left, right))
            .map_err(VehicleError::Display)?;

        Ok((left, right))
    }

    /// Step every `period_ms` until `step_limit` is reached, or forever if there isn't one, then
    /// stop the motors.
    ///
    /// `sleep` is called with the time left in each period once the step is done, which is zero if
    /// the step overran.
    pub fn run<F>(&mut self, mut sleep: F) -> Result<u64, VehicleError<A, M, D::Error>>
    where
        F: FnMut(Duration),
    {
        let period = Duration::from_millis(self.params.period_ms);
        let mut steps = 0;

        info!("Braitenberg vehicle running, period {} ms", self.params.period_ms);

        while self.params.step_limit.map_or(true, |limit| steps < limit) {
            let start = Instant::now();
            self.step()?;
            steps += 1;
            sleep(period.saturating_sub(start.elapsed()));
        }

        self.claw.stop().map_err(VehicleError::Motor)?;

        info!("Stopped after {} steps", steps);

        Ok(steps)
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Release the hardware.
    pub fn free(self) -> (Mcp3008<SPI>, RoboClaw<S>, D) {
        (self.adc, self.claw, self.display)
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Compute the (left, right) motor speeds for a set of readings.
///
/// Each motor runs at `max_speed` times its own side's reading, and both are scaled down
/// linearly as the centre reading approaches full scale.
pub fn motor_speeds(prop: &Proportions, max_speed: i32) -> (i32, i32) {
    let slow = lin_map((0.0, 1.0), (1.0, 0.0), clamp(prop.centre, 0.0, 1.0));
    let max = max_speed as f64 * slow;

    (
        (max * clamp(prop.left, 0.0, 1.0)).round() as i32,
        (max * clamp(prop.right, 0.0, 1.0)).round() as i32,
    )
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
