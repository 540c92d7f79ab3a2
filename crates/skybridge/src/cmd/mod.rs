use std::path::PathBuf;

use clap::{Args, Subcommand};
use skybridge_mount::TimeSource;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod convert;
pub mod goto;
pub mod serve;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Accept planetarium clients and drive the mount.
    Serve(ServeArgs),
    /// Send one position command to a running bridge.
    Goto(GotoArgs),
    /// Convert equatorial coordinates to horizontal ones offline.
    Convert(ConvertArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Serve(args) => serve::run(args, format),
        Command::Goto(args) => goto::run(args, format),
        Command::Convert(args) => convert::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// TOML configuration file.
    #[arg(long, value_name = "FILE", env = "SKYBRIDGE_CONFIG")]
    pub config: Option<PathBuf>,
    /// Address to listen on (default 0.0.0.0).
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,
    /// TCP port (default 10001).
    #[arg(long)]
    pub port: Option<u16>,
    /// Observer latitude in degrees, north positive.
    #[arg(long, value_name = "DEG", allow_negative_numbers = true)]
    pub latitude: Option<f64>,
    /// Observer longitude in degrees, east positive.
    #[arg(long, value_name = "DEG", allow_negative_numbers = true)]
    pub longitude: Option<f64>,
    /// Copies of each acknowledgement frame (10 for older clients).
    #[arg(long, value_name = "N")]
    pub ack_repeats: Option<usize>,
    /// Clock used for sidereal time: frame or system.
    #[arg(long, value_name = "SOURCE")]
    pub time_source: Option<TimeSource>,
    /// Run each axis on its own actuation thread.
    #[arg(long)]
    pub threaded: bool,
    /// Exit after serving N connections.
    #[arg(long, value_name = "N")]
    pub sessions: Option<usize>,
}

#[derive(Args, Debug)]
pub struct GotoArgs {
    /// Bridge address, e.g. 127.0.0.1:10001.
    pub addr: String,
    /// Right ascension: decimal hours or 6h30m0s.
    #[arg(long, allow_hyphen_values = true)]
    pub ra: String,
    /// Declination: decimal degrees or -45d30m0s.
    #[arg(long, allow_hyphen_values = true)]
    pub dec: String,
    /// Wait for the acknowledgement and print it.
    #[arg(long)]
    pub wait: bool,
    /// I/O timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Right ascension: decimal hours or 6h30m0s.
    #[arg(long, allow_hyphen_values = true)]
    pub ra: String,
    /// Declination: decimal degrees or -45d30m0s.
    #[arg(long, allow_hyphen_values = true)]
    pub dec: String,
    /// Observation instant, RFC 3339 (default: now).
    #[arg(long, value_name = "RFC3339")]
    pub time: Option<String>,
    /// Observer latitude in degrees, north positive.
    #[arg(long, value_name = "DEG", allow_negative_numbers = true)]
    pub latitude: Option<f64>,
    /// Observer longitude in degrees, east positive.
    #[arg(long, value_name = "DEG", allow_negative_numbers = true)]
    pub longitude: Option<f64>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
