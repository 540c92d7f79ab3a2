use tracing::{debug, info};

use crate::axis::{Axis, AxisConfig, AxisDriver, MoveAck};
use crate::error::DriverFault;

/// Axis driver without hardware.
///
/// Converts every move to steps exactly as a stepper driver would, keeps the
/// running step position and logs each command. Used for dry runs and on
/// hosts without actuator pins.
#[derive(Debug)]
pub struct SimulatedAxis {
    axis: Axis,
    config: Option<AxisConfig>,
    position_steps: i64,
    moves: u64,
}

impl SimulatedAxis {
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            config: None,
            position_steps: 0,
            moves: 0,
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Accumulated step position since startup.
    pub fn position_steps(&self) -> i64 {
        self.position_steps
    }

    /// Accumulated position converted back to degrees.
    pub fn position_degrees(&self) -> Option<f64> {
        self.config
            .as_ref()
            .map(|config| self.position_steps as f64 / config.steps_per_degree())
    }

    /// Number of accepted moves.
    pub fn moves(&self) -> u64 {
        self.moves
    }
}

impl AxisDriver for SimulatedAxis {
    fn configure(&mut self, config: &AxisConfig) -> Result<(), DriverFault> {
        config.validate()?;
        debug!(
            axis = %self.axis,
            steps_per_revolution = config.steps_per_revolution,
            rpm = config.rpm,
            step_mode = config.step_mode.index(),
            pins = ?config.pins,
            "configured simulated axis"
        );
        self.config = Some(config.clone());
        Ok(())
    }

    fn move_by_degrees(&mut self, delta_degrees: f64) -> Result<MoveAck, DriverFault> {
        let config = self.config.as_ref().ok_or(DriverFault::NotConfigured)?;
        if !delta_degrees.is_finite() {
            return Err(DriverFault::Rejected {
                delta_degrees,
                reason: "non-finite rotation".to_string(),
            });
        }

        let steps = config.steps_for(delta_degrees);
        let ack = MoveAck::for_steps(config, steps);
        self.position_steps += steps;
        self.moves += 1;

        info!(
            axis = %self.axis,
            delta_degrees,
            steps,
            position_steps = self.position_steps,
            estimated_ms = ack.estimated.as_millis() as u64,
            "simulated move"
        );
        Ok(ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_before_configure_faults() {
        let mut axis = SimulatedAxis::new(Axis::Azimuth);
        assert_eq!(axis.move_by_degrees(1.0), Err(DriverFault::NotConfigured));
        assert_eq!(axis.position_degrees(), None);
    }

    #[test]
    fn accumulates_steps() {
        let mut axis = SimulatedAxis::new(Axis::Altitude);
        axis.configure(&AxisConfig::altitude()).unwrap();

        let ack = axis.move_by_degrees(45.0).unwrap();
        assert_eq!(ack.steps, 512);
        axis.move_by_degrees(-90.0).unwrap();

        assert_eq!(axis.position_steps(), -512);
        assert_eq!(axis.position_degrees(), Some(-45.0));
        assert_eq!(axis.moves(), 2);
    }

    #[test]
    fn rejects_invalid_config() {
        let mut axis = SimulatedAxis::new(Axis::Azimuth);
        let mut config = AxisConfig::azimuth();
        config.rpm = -1.0;
        assert!(axis.configure(&config).is_err());
        assert!(axis.move_by_degrees(1.0).is_err());
    }

    #[test]
    fn rejects_non_finite_delta() {
        let mut axis = SimulatedAxis::new(Axis::Azimuth);
        axis.configure(&AxisConfig::azimuth()).unwrap();
        assert!(matches!(
            axis.move_by_degrees(f64::NAN),
            Err(DriverFault::Rejected { .. })
        ));
        assert_eq!(axis.moves(), 0);
    }
}
