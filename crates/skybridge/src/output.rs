use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use skybridge_astro::{degrees_to_sexagesimal, hours_to_sexagesimal, EquatorialCoordinate};
use skybridge_frame::{message_kind_name, TelescopeFrame};

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// A command result that can be rendered in every output format.
pub trait Report: Serialize {
    /// Ordered `(field, value)` pairs for the table and pretty renderings.
    fn fields(&self) -> Vec<(&'static str, String)>;
}

pub fn print_report<R: Report>(report: &R, format: OutputFormat) {
    println!("{}", render(report, format));
}

pub fn render<R: Report>(report: &R, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string())
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (field, value) in report.fields() {
                table.add_row(vec![field.to_string(), value]);
            }
            table.to_string()
        }
        OutputFormat::Pretty => report
            .fields()
            .into_iter()
            .map(|(field, value)| format!("{field}={value}"))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// One telescope frame as seen on the wire, with decoded angles.
#[derive(Debug, Serialize)]
pub struct FrameView {
    pub size: u16,
    pub kind: &'static str,
    pub time: i64,
    pub ra: u32,
    pub dec: i32,
    pub ra_hours: f64,
    pub dec_degrees: f64,
    pub ra_hms: String,
    pub dec_dms: String,
    pub raw: String,
}

impl FrameView {
    pub fn new(frame: &TelescopeFrame) -> Self {
        let coordinate = EquatorialCoordinate::from_wire(frame.ra, frame.dec);
        Self {
            size: frame.size,
            kind: message_kind_name(frame.kind),
            time: frame.time,
            ra: frame.ra,
            dec: frame.dec,
            ra_hours: coordinate.right_ascension_hours,
            dec_degrees: coordinate.declination_degrees,
            ra_hms: hours_to_sexagesimal(coordinate.right_ascension_hours),
            dec_dms: degrees_to_sexagesimal(coordinate.declination_degrees),
            raw: hex::encode(frame.to_bytes()),
        }
    }

    /// Field rows labelled with `names` (time, ra, dec, raw).
    pub fn fields(&self, names: [&'static str; 4]) -> Vec<(&'static str, String)> {
        let [time, ra, dec, raw] = names;
        vec![
            (time, self.time.to_string()),
            (ra, format!("{} ({})", self.ra_hms, self.ra)),
            (dec, format!("{} ({})", self.dec_dms, self.dec)),
            (raw, self.raw.clone()),
        ]
    }
}
