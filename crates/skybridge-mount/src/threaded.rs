use std::thread::JoinHandle;

use crossbeam_channel::{bounded, Sender};
use tracing::{debug, error, warn};

use crate::axis::{Axis, AxisConfig, AxisDriver, MoveAck};
use crate::error::DriverFault;

enum Command {
    Configure(AxisConfig, Sender<Result<(), DriverFault>>),
    Move(f64),
}

/// Runs an inner driver on its own actuation thread.
///
/// `move_by_degrees` returns as soon as the actuation thread has taken the
/// command (rendezvous channel), so a slow stepper does not hold up the
/// session while it turns. Faults raised by the inner driver after hand-off
/// can only be logged.
pub struct ThreadedAxis {
    axis: Axis,
    commands: Option<Sender<Command>>,
    worker: Option<JoinHandle<()>>,
    config: Option<AxisConfig>,
}

impl ThreadedAxis {
    /// Move `driver` onto a new actuation thread.
    pub fn spawn<D>(axis: Axis, driver: D) -> Result<Self, DriverFault>
    where
        D: AxisDriver + Send + 'static,
    {
        let (tx, rx) = bounded::<Command>(0);

        let worker = std::thread::Builder::new()
            .name(format!("{axis}-actuator"))
            .spawn(move || {
                let mut driver = driver;
                for command in rx {
                    match command {
                        Command::Configure(config, reply) => {
                            let _ = reply.send(driver.configure(&config));
                        }
                        Command::Move(delta_degrees) => {
                            if let Err(fault) = driver.move_by_degrees(delta_degrees) {
                                error!(
                                    %axis,
                                    delta_degrees,
                                    %fault,
                                    "actuator fault after hand-off"
                                );
                            }
                        }
                    }
                }
                debug!(%axis, "actuation thread stopped");
            })
            .map_err(|err| DriverFault::Unavailable(format!("cannot start {axis} thread: {err}")))?;

        Ok(Self {
            axis,
            commands: Some(tx),
            worker: Some(worker),
            config: None,
        })
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    fn sender(&self) -> Result<&Sender<Command>, DriverFault> {
        self.commands
            .as_ref()
            .ok_or_else(|| DriverFault::Unavailable(format!("{} thread stopped", self.axis)))
    }

    fn gone(&self) -> DriverFault {
        DriverFault::Unavailable(format!("{} actuation thread exited", self.axis))
    }
}

impl AxisDriver for ThreadedAxis {
    fn configure(&mut self, config: &AxisConfig) -> Result<(), DriverFault> {
        let (reply_tx, reply_rx) = bounded(1);
        self.sender()?
            .send(Command::Configure(config.clone(), reply_tx))
            .map_err(|_| self.gone())?;
        reply_rx.recv().map_err(|_| self.gone())??;
        self.config = Some(config.clone());
        Ok(())
    }

    fn move_by_degrees(&mut self, delta_degrees: f64) -> Result<MoveAck, DriverFault> {
        let config = self.config.as_ref().ok_or(DriverFault::NotConfigured)?;
        let ack = MoveAck::for_steps(config, config.steps_for(delta_degrees));
        self.sender()?
            .send(Command::Move(delta_degrees))
            .map_err(|_| self.gone())?;
        Ok(ack)
    }
}

impl Drop for ThreadedAxis {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop once queued work is done.
        self.commands.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!(axis = %self.axis, "actuation thread panicked");
            }
        }
    }
}

impl std::fmt::Debug for ThreadedAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadedAxis")
            .field("axis", &self.axis)
            .field("configured", &self.config.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct Recorder {
        moves: Arc<Mutex<Vec<f64>>>,
        configured: Arc<Mutex<bool>>,
    }

    impl AxisDriver for Recorder {
        fn configure(&mut self, config: &AxisConfig) -> Result<(), DriverFault> {
            config.validate()?;
            *self.configured.lock().unwrap() = true;
            Ok(())
        }

        fn move_by_degrees(&mut self, delta_degrees: f64) -> Result<MoveAck, DriverFault> {
            self.moves.lock().unwrap().push(delta_degrees);
            Ok(MoveAck {
                steps: 0,
                estimated: std::time::Duration::ZERO,
            })
        }
    }

    #[test]
    fn forwards_configure_and_moves() {
        let recorder = Recorder::default();
        let mut axis = ThreadedAxis::spawn(Axis::Azimuth, recorder.clone()).unwrap();

        axis.configure(&AxisConfig::azimuth()).unwrap();
        assert!(*recorder.configured.lock().unwrap());

        let ack = axis.move_by_degrees(90.0).unwrap();
        assert_eq!(ack.steps, 512);
        axis.move_by_degrees(-1.5).unwrap();

        drop(axis);
        assert_eq!(*recorder.moves.lock().unwrap(), vec![90.0, -1.5]);
    }

    #[test]
    fn configure_fault_is_returned() {
        let mut axis = ThreadedAxis::spawn(Axis::Altitude, Recorder::default()).unwrap();
        let mut config = AxisConfig::altitude();
        config.steps_per_revolution = 0;

        assert!(matches!(
            axis.configure(&config),
            Err(DriverFault::InvalidConfig(_))
        ));
        assert_eq!(axis.move_by_degrees(1.0), Err(DriverFault::NotConfigured));
    }
}
