//! Tabular export of events and records
//!
//! Events are flattened into ordered rows ([`flatten`]) and the rows are
//! rendered as CSV ([`to_csv`]). Cruise and lowering records have their own
//! simpler CSV shape in [`entities`].

pub mod csv;
pub mod entities;
pub mod flatten;

pub use self::csv::to_csv;
pub use entities::records_to_csv;
pub use flatten::{flatten, Flattened, FlattenedRow};

/// Which of the two redundant navigation sources is authoritative.
///
/// Both sources carry latitude, longitude, heading, depth and altitude for
/// the same sample; an export shows exactly one of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NavPreference {
    #[default]
    Realtime,
    Reprocessed,
}

pub const REALTIME_NAV_SOURCE: &str = "vehicleRealtimeNavData";
pub const RENAV_NAV_SOURCE: &str = "vehicleReNavData";

const REALTIME_PREFIX_ORDER: &[&str] = &[
    "ts",
    "vehicleRealtimeNavData.latitude (ddeg)",
    "vehicleRealtimeNavData.longitude (ddeg)",
    "event",
    "vehicleRealtime",
    "vehicleReNav",
    "id",
];

const RENAV_PREFIX_ORDER: &[&str] = &[
    "ts",
    "vehicleReNavData.latitude (ddeg)",
    "vehicleReNavData.longitude (ddeg)",
    "event",
    "vehicleReNav",
    "vehicleRealtime",
    "id",
];

const NAV_FIELDS: &[&str] = &["latitude", "longitude", "heading", "depth", "altitude"];

impl NavPreference {
    pub fn from_use_renav(use_renav: bool) -> Self {
        if use_renav {
            NavPreference::Reprocessed
        } else {
            NavPreference::Realtime
        }
    }

    /// Column prefixes in output priority order.
    pub fn prefix_order(self) -> &'static [&'static str] {
        match self {
            NavPreference::Realtime => REALTIME_PREFIX_ORDER,
            NavPreference::Reprocessed => RENAV_PREFIX_ORDER,
        }
    }

    fn excluded_source(self) -> &'static str {
        match self {
            NavPreference::Realtime => RENAV_NAV_SOURCE,
            NavPreference::Reprocessed => REALTIME_NAV_SOURCE,
        }
    }

    /// True for the non-preferred source's positional columns.
    pub fn excludes(self, column: &str) -> bool {
        let Some(field) = column
            .strip_prefix(self.excluded_source())
            .and_then(|rest| rest.strip_prefix('.'))
        else {
            return false;
        };
        NAV_FIELDS.iter().any(|nav| field.starts_with(nav))
    }
}
