use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use skybridge_frame::{FrameReader, FrameWriter, TelescopeFrame};
use skybridge_transport::TcpTransport;
use tracing::debug;

use crate::cmd::convert::parse_target;
use crate::cmd::GotoArgs;
use crate::exit::{frame_error, transport_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_report, FrameView, OutputFormat, Report};

#[derive(Debug, Serialize)]
struct GotoReport {
    addr: String,
    sent: FrameView,
    #[serde(skip_serializing_if = "Option::is_none")]
    ack: Option<FrameView>,
}

impl Report for GotoReport {
    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("addr", self.addr.clone())];
        fields.extend(self.sent.fields(["time", "ra", "dec", "raw"]));
        if let Some(ack) = &self.ack {
            fields.extend(ack.fields(["ack_time", "ack_ra", "ack_dec", "ack_raw"]));
        }
        fields
    }
}

pub fn run(args: GotoArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let target = parse_target(&args.ra, &args.dec)?;
    let (ra, dec) = target.to_wire();
    let frame = TelescopeFrame::position(Utc::now().timestamp_micros(), ra, dec);

    let stream = TcpTransport::connect(args.addr.as_str())
        .map_err(|err| transport_error("connect failed", err))?;
    let read_half = stream
        .try_clone()
        .map_err(|err| transport_error("connect failed", err))?;

    let mut writer = FrameWriter::for_stream(stream, Some(timeout))
        .map_err(|err| frame_error("send failed", err))?;
    writer
        .write_frame(&frame)
        .map_err(|err| frame_error("send failed", err))?;
    debug!(addr = %args.addr, ra, dec, "sent position command");

    let ack = if args.wait {
        let mut reader = FrameReader::for_stream(read_half, Some(timeout))
            .map_err(|err| frame_error("receive failed", err))?;
        let ack = reader
            .read_frame()
            .map_err(|err| frame_error("no acknowledgement", err))?;
        Some(FrameView::new(&ack))
    } else {
        None
    };

    let report = GotoReport {
        addr: args.addr,
        sent: FrameView::new(&frame),
        ack,
    };
    print_report(&report, format);

    Ok(SUCCESS)
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    let (number, millis) = match input.strip_suffix("ms") {
        Some(number) => (number, true),
        None => (input.strip_suffix('s').unwrap_or(input), false),
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration: {input:?}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
