use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use skybridge_frame::{FrameReader, FrameWriter};
use skybridge_mount::{
    Axis, AxisDriver, DriverFault, Mount, SessionSummary, SimulatedAxis, ThreadedAxis,
};
use skybridge_transport::{MountStream, TcpTransport};
use tracing::{debug, error, info, warn};

use crate::cmd::ServeArgs;
use crate::config::{BridgeConfig, ConfigError};
use crate::exit::{
    config_error, driver_fault, frame_error, session_error, transport_error, CliError, CliResult,
    INTERNAL, SUCCESS,
};
use crate::output::{print_report, OutputFormat, Report};

type BoxedAxis = Box<dyn AxisDriver + Send>;

/// Pause after a failed accept, so a persistent error (descriptor exhaustion,
/// for one) does not spin the loop and flood the log.
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Serialize)]
struct SessionRecord {
    peer: String,
    #[serde(flatten)]
    summary: SessionSummary,
}

impl Report for SessionRecord {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("peer", self.peer.clone()),
            ("frames_processed", self.summary.frames_processed.to_string()),
            ("frames_rejected", self.summary.frames_rejected.to_string()),
            ("driver_faults", self.summary.driver_faults.to_string()),
            ("singularities", self.summary.singularities.to_string()),
        ]
    }
}

pub fn run(args: ServeArgs, format: OutputFormat) -> CliResult<i32> {
    let config = resolve_config(&args).map_err(config_error)?;
    let mount_config = config.mount_config().map_err(config_error)?;

    let (azimuth, altitude) = build_drivers(args.threaded)
        .map_err(|fault| driver_fault("actuator startup failed", fault))?;
    let mut mount = Mount::new(azimuth, altitude, &mount_config)
        .map_err(|fault| driver_fault("axis configuration failed", fault))?;

    let listener = TcpTransport::bind(config.listen_addr())
        .map_err(|err| transport_error("bind failed", err))?;
    info!(
        addr = %listener.local_addr(),
        transport = listener.transport_name(),
        threaded = args.threaded,
        "waiting for planetarium clients"
    );

    let running = Arc::new(AtomicBool::new(true));
    let in_session = Arc::new(AtomicBool::new(false));
    install_ctrlc_handler(running.clone(), in_session.clone())?;

    let mut served = 0usize;
    while let Some(stream) = accept_next(|| listener.accept(), &running, ACCEPT_RETRY_DELAY) {
        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        info!(%peer, "client connected");

        in_session.store(true, Ordering::SeqCst);
        let outcome = serve_connection(&mut mount, stream);
        in_session.store(false, Ordering::SeqCst);

        match outcome {
            Ok(summary) => {
                info!(
                    %peer,
                    frames_processed = summary.frames_processed,
                    frames_rejected = summary.frames_rejected,
                    driver_faults = summary.driver_faults,
                    "client disconnected"
                );
                print_report(&SessionRecord { peer, summary }, format);
            }
            Err(err) => error!(%peer, error = %err, "session aborted"),
        }

        served = served.saturating_add(1);
        if args.sessions.is_some_and(|limit| served >= limit) {
            break;
        }
    }

    info!(served, "bridge stopped");
    Ok(SUCCESS)
}

/// Accept the next client, retrying failures after `retry_delay` until one
/// succeeds or `running` is cleared.
fn accept_next<T, E: Display>(
    mut accept: impl FnMut() -> Result<T, E>,
    running: &AtomicBool,
    retry_delay: Duration,
) -> Option<T> {
    while running.load(Ordering::SeqCst) {
        match accept() {
            Ok(stream) => return Some(stream),
            Err(err) => {
                warn!(error = %err, retry_in = ?retry_delay, "accept failed");
                std::thread::sleep(retry_delay);
            }
        }
    }
    None
}

fn serve_connection<D: AxisDriver>(
    mount: &mut Mount<D>,
    stream: MountStream,
) -> CliResult<SessionSummary> {
    if let Err(err) = stream.set_nodelay(true) {
        debug!(error = %err, "cannot disable Nagle on client stream");
    }
    let write_half = stream
        .try_clone()
        .map_err(|err| transport_error("stream setup failed", err))?;

    let mut reader = FrameReader::for_stream(stream, None)
        .map_err(|err| frame_error("stream setup failed", err))?;
    let mut writer = FrameWriter::for_stream(write_half, None)
        .map_err(|err| frame_error("stream setup failed", err))?;

    mount
        .session()
        .run(&mut reader, &mut writer)
        .map_err(|err| session_error("session failed", err))
}

fn resolve_config(args: &ServeArgs) -> Result<BridgeConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => BridgeConfig::load(path)?,
        None => BridgeConfig::default(),
    };

    if let Some(bind) = &args.bind {
        config.server.bind = bind.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ack_repeats) = args.ack_repeats {
        config.server.ack_repeats = ack_repeats;
    }
    if let Some(time_source) = args.time_source {
        config.server.time_source = time_source;
    }
    if args.latitude.is_some() {
        config.site.latitude_degrees = args.latitude;
    }
    if args.longitude.is_some() {
        config.site.longitude_degrees = args.longitude;
    }

    Ok(config)
}

fn build_drivers(threaded: bool) -> Result<(BoxedAxis, BoxedAxis), DriverFault> {
    if threaded {
        Ok((
            Box::new(ThreadedAxis::spawn(
                Axis::Azimuth,
                SimulatedAxis::new(Axis::Azimuth),
            )?),
            Box::new(ThreadedAxis::spawn(
                Axis::Altitude,
                SimulatedAxis::new(Axis::Altitude),
            )?),
        ))
    } else {
        Ok((
            Box::new(SimulatedAxis::new(Axis::Azimuth)),
            Box::new(SimulatedAxis::new(Axis::Altitude)),
        ))
    }
}

/// First Ctrl-C while idle exits at once; during a session the loop stops
/// once the client disconnects.
fn install_ctrlc_handler(running: Arc<AtomicBool>, in_session: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
        if !in_session.load(Ordering::SeqCst) {
            std::process::exit(SUCCESS);
        }
        info!("stopping after the current client disconnects");
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Instant;

    use skybridge_mount::TimeSource;

    use super::*;

    fn args() -> ServeArgs {
        ServeArgs {
            config: None,
            bind: None,
            port: None,
            latitude: None,
            longitude: None,
            ack_repeats: None,
            time_source: None,
            threaded: false,
            sessions: None,
        }
    }

    #[test]
    fn flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 12000\nack_repeats = 10").unwrap();
        writeln!(file, "[site]\nlatitude_degrees = 10.0\nlongitude_degrees = 20.0").unwrap();

        let config = resolve_config(&ServeArgs {
            config: Some(file.path().to_path_buf()),
            port: Some(12001),
            longitude: Some(-30.0),
            time_source: Some(TimeSource::System),
            ..args()
        })
        .unwrap();

        assert_eq!(config.server.port, 12001);
        assert_eq!(config.server.ack_repeats, 10);
        assert_eq!(config.server.time_source, TimeSource::System);
        assert_eq!(config.site.latitude_degrees, Some(10.0));
        assert_eq!(config.site.longitude_degrees, Some(-30.0));
    }

    #[test]
    fn defaults_without_file() {
        let config = resolve_config(&args()).unwrap();
        assert_eq!(config, BridgeConfig::default());
    }

    #[test]
    fn drivers_configure_in_both_modes() {
        for threaded in [false, true] {
            let (azimuth, altitude) = build_drivers(threaded).unwrap();
            let mount = Mount::new(
                azimuth,
                altitude,
                &BridgeConfig::default().mount_config().unwrap(),
            );
            assert!(mount.is_ok());
        }
    }

    #[test]
    fn failed_accepts_back_off_before_retrying() {
        let running = AtomicBool::new(true);
        let mut attempts = 0;
        let delay = Duration::from_millis(20);

        let started = Instant::now();
        let accepted = accept_next(
            || {
                attempts += 1;
                if attempts < 4 {
                    Err("too many open files")
                } else {
                    Ok(attempts)
                }
            },
            &running,
            delay,
        );

        assert_eq!(accepted, Some(4));
        assert!(started.elapsed() >= delay * 3);
    }

    #[test]
    fn accept_gives_up_once_stopped() {
        let running = AtomicBool::new(true);
        let mut attempts = 0;
        let accepted: Option<()> = accept_next(
            || {
                attempts += 1;
                running.store(false, Ordering::SeqCst);
                Err("interrupted")
            },
            &running,
            Duration::from_millis(1),
        );

        assert_eq!(accepted, None);
        assert_eq!(attempts, 1);

        assert_eq!(accept_next(|| Ok::<_, &str>(1), &running, Duration::ZERO), None);
    }

    #[test]
    fn session_record_flattens_summary() {
        let record = SessionRecord {
            peer: "127.0.0.1:5000".to_string(),
            summary: SessionSummary {
                frames_processed: 3,
                ..SessionSummary::default()
            },
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"frames_processed\":3"));
        assert!(json.contains("\"peer\""));
    }
}
