//! Dust devil event catalog.
//!
//! The catalog is parsed once into an [`EventCatalog`] and passed by
//! reference to every lookup. It supplies the reference instant of each
//! event and the scalar attributes (pressure drop, wind, temperature,
//! season) used to pick populations for case averaging.
//!
//! ## Catalog columns (by position)
//!
//! | Index | Field |
//! |-------|-------|
//! | 0 | ID |
//! | 2 | sol |
//! | 3 | LTST hour (decimal) |
//! | 4 | UTC (`YYYY-DDDTHH:MM:SS.fffZ`) |
//! | 5 | dP, peak pressure drop (Pa, negative) |
//! | 153 / 154 | wind speed mean / std (m/s) |
//! | 155 / 156 | wind direction mean / std (deg) |
//! | 157 / 158 | air temperature mean / std |

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDateTime;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::clock;

/// Errors that can occur while reading or querying the catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// I/O error reading the catalog file
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// A row could not be interpreted
    #[error("catalog line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: u64,
        /// What went wrong
        message: String,
    },

    /// The requested event ID is not in the catalog
    #[error("unknown event ID {0}")]
    UnknownId(u32),
}

/// Column positions in the catalog export.
pub mod columns {
    /// Event ID
    pub const ID: usize = 0;
    /// Sol of the event
    pub const SOL: usize = 2;
    /// Decimal LTST hour
    pub const LTST_HOURS: usize = 3;
    /// UTC stamp
    pub const UTC: usize = 4;
    /// Pressure drop (Pa)
    pub const PRESSURE_DROP: usize = 5;
    /// Mean wind speed
    pub const WIND_SPEED_AVG: usize = 153;
    /// Wind speed standard deviation
    pub const WIND_SPEED_STD: usize = 154;
    /// Mean wind direction
    pub const WIND_DIR_AVG: usize = 155;
    /// Wind direction standard deviation
    pub const WIND_DIR_STD: usize = 156;
    /// Mean air temperature
    pub const TEMPERATURE_AVG: usize = 157;
    /// Air temperature standard deviation
    pub const TEMPERATURE_STD: usize = 158;
}

/// Eventless sols for which pressure files exist.
pub const QUIET_SOLS_WITH_DATA: &[u32] = &[
    5, 10, 30, 120, 189, 232, 260, 266, 284, 370, 384, 422, 473, 477, 482, 488, 502, 503, 510, 550,
    551, 552, 553, 554, 555, 556, 557, 567, 612, 637, 650, 666, 678, 680, 683, 702, 720, 721, 722,
    723, 724, 725, 726, 727, 728, 729, 730, 735, 749, 754, 774, 780, 793, 794, 802, 807, 816, 822,
    823, 825, 826, 831, 837, 839, 843, 845, 847, 853, 859, 860, 861, 862, 863, 864, 865, 866, 867,
    868, 869, 870, 871, 875, 876, 877, 878, 880, 882, 884, 885, 886, 887, 888, 889,
];

/// Last sol covered by the pressure archive.
pub const LAST_MISSION_SOL: u32 = 1219;

/// One cataloged event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Event ID
    pub id: u32,
    /// Sol on which the event occurred
    pub sol: u32,
    /// Decimal LTST hour of the event
    pub ltst_hours: f64,
    /// Earth UTC stamp of the event
    pub utc: NaiveDateTime,
    /// Peak pressure drop (Pa, negative)
    pub pressure_drop: f64,
    /// Mean wind speed (m/s)
    pub wind_speed_avg: f64,
    /// Wind speed standard deviation
    pub wind_speed_std: f64,
    /// Mean wind direction (deg)
    pub wind_dir_avg: f64,
    /// Wind direction standard deviation
    pub wind_dir_std: f64,
    /// Mean air temperature
    pub temperature_avg: f64,
    /// Air temperature standard deviation
    pub temperature_std: f64,
    /// Event instant on the local civil clock
    pub local_time: NaiveDateTime,
    /// Season bin, when the UTC date is covered by the season table
    pub ls: Option<u16>,
}

/// Threshold predicates that select event populations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventFilter {
    /// Explicit list of IDs (order preserved, unknown IDs kept for reporting).
    Ids(Vec<u32>),
    /// Events whose pressure drop is strictly below the limit (both negative).
    PressureDropBelow(f64),
    /// Warm, calm events: temperature above and wind speed below the limits.
    TemperatureAndWind {
        /// Exclusive lower bound on mean air temperature
        min_temperature: f64,
        /// Exclusive upper bound on mean wind speed
        max_wind_speed: f64,
    },
    /// Events in the season bin containing this solar longitude.
    Season(u16),
}

impl EventFilter {
    /// Whether an entry satisfies the predicate.
    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        match self {
            EventFilter::Ids(ids) => ids.contains(&entry.id),
            EventFilter::PressureDropBelow(limit) => entry.pressure_drop < *limit,
            EventFilter::TemperatureAndWind {
                min_temperature,
                max_wind_speed,
            } => entry.temperature_avg > *min_temperature && entry.wind_speed_avg < *max_wind_speed,
            EventFilter::Season(ls) => entry.ls == Some(clock::pseudo_ls(*ls)),
        }
    }

    /// Short label for directory and report names.
    pub fn label(&self) -> String {
        match self {
            EventFilter::Ids(ids) => format!("ids_{}", ids.len()),
            EventFilter::PressureDropBelow(limit) => format!("dP_~{}", limit),
            EventFilter::TemperatureAndWind {
                min_temperature,
                max_wind_speed,
            } => format!("T_{}~,Ws_~{}", min_temperature, max_wind_speed),
            EventFilter::Season(ls) => {
                let ls = clock::pseudo_ls(*ls);
                format!("ls_{:03}~{:03}", ls, ls + clock::SEASON_BIN_DEGREES)
            }
        }
    }
}

/// Parsed event catalog, constructed once and shared by reference.
#[derive(Debug, Clone, Default)]
pub struct EventCatalog {
    entries: Vec<CatalogEntry>,
    by_id: HashMap<u32, usize>,
}

impl EventCatalog {
    /// Read the catalog from a CSV file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let catalog = Self::from_reader(File::open(path)?)?;
        info!("Loaded {} catalog events from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Read the catalog from any reader. The first line is a header.
    ///
    /// Non-numeric columns may be in a legacy encoding; only the columns
    /// listed in [`columns`] are decoded.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut entries = Vec::new();
        for record in csv_reader.byte_records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            if record.iter().all(|field| field.iter().all(u8::is_ascii_whitespace)) {
                continue;
            }
            entries.push(parse_entry(&record, line)?);
        }

        Ok(Self::from_entries(entries))
    }

    /// Build a catalog from already parsed entries.
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        let by_id = entries.iter().enumerate().map(|(i, e)| (e.id, i)).collect();
        Self { entries, by_id }
    }

    /// All entries in file order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for an ID.
    pub fn get(&self, id: u32) -> Option<&CatalogEntry> {
        self.by_id.get(&id).map(|&i| &self.entries[i])
    }

    /// Sol and local event instant for an ID.
    pub fn lookup(&self, id: u32) -> Result<(u32, NaiveDateTime), CatalogError> {
        self.get(id)
            .map(|e| (e.sol, e.local_time))
            .ok_or(CatalogError::UnknownId(id))
    }

    /// IDs matching a filter, in catalog order.
    ///
    /// For [`EventFilter::Ids`] the requested order is kept, including IDs
    /// that are not in the catalog so that callers can report them.
    pub fn select(&self, filter: &EventFilter) -> Vec<u32> {
        let ids: Vec<u32> = match filter {
            EventFilter::Ids(ids) => ids.clone(),
            _ => self
                .entries
                .iter()
                .filter(|e| filter.matches(e))
                .map(|e| e.id)
                .collect(),
        };
        debug!("Filter {:?} selected {} events", filter, ids.len());
        ids
    }

    /// Sorted unique sols with at least one event.
    pub fn event_sols(&self) -> Vec<u32> {
        self.entries
            .iter()
            .map(|e| e.sol)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sols in `0..=last_sol` without any cataloged event.
    pub fn quiet_sols(&self, last_sol: u32) -> Vec<u32> {
        let busy: BTreeSet<u32> = self.entries.iter().map(|e| e.sol).collect();
        (0..=last_sol).filter(|s| !busy.contains(s)).collect()
    }

    /// Event counts per season bin (`None` = outside the season table).
    pub fn season_histogram(&self) -> BTreeMap<Option<u16>, usize> {
        let mut histogram = BTreeMap::new();
        for entry in &self.entries {
            *histogram.entry(entry.ls).or_insert(0) += 1;
        }
        histogram
    }
}

fn field_text<'a>(record: &'a csv::ByteRecord, index: usize, name: &str, line: u64) -> Result<&'a str, CatalogError> {
    let raw = record.get(index).ok_or_else(|| CatalogError::Parse {
        line,
        message: format!("missing column {} ({})", index, name),
    })?;
    std::str::from_utf8(raw)
        .map(str::trim)
        .map_err(|_| CatalogError::Parse {
            line,
            message: format!("column {} ({}) is not valid text", index, name),
        })
}

fn field_f64(record: &csv::ByteRecord, index: usize, name: &str, line: u64) -> Result<f64, CatalogError> {
    let value = field_text(record, index, name, line)?;
    crate::loader::parse_optional_f64(value).map_err(|e| CatalogError::Parse {
        line,
        message: format!("column {} ({}) '{}': {}", index, name, value, e),
    })
}

fn field_u32(record: &csv::ByteRecord, index: usize, name: &str, line: u64) -> Result<u32, CatalogError> {
    let value = field_text(record, index, name, line)?;
    if let Ok(v) = value.parse::<u32>() {
        return Ok(v);
    }
    // Some exports write integral columns as floats ("12.0").
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.fract() == 0.0 && *v >= 0.0 && *v <= f64::from(u32::MAX))
        .map(|v| v as u32)
        .ok_or_else(|| CatalogError::Parse {
            line,
            message: format!("column {} ({}) '{}' is not a non-negative integer", index, name, value),
        })
}

fn parse_entry(record: &csv::ByteRecord, line: u64) -> Result<CatalogEntry, CatalogError> {
    let text = |index: usize, name: &str| field_text(record, index, name, line);
    let number = |index: usize, name: &str| field_f64(record, index, name, line);
    let integer = |index: usize, name: &str| field_u32(record, index, name, line);

    let id = integer(columns::ID, "ID")?;
    let sol = integer(columns::SOL, "sol")?;
    if sol > clock::MAX_SOL {
        return Err(CatalogError::Parse {
            line,
            message: format!("sol {} is out of range", sol),
        });
    }
    let ltst_hours = number(columns::LTST_HOURS, "LTST_h")?;
    let utc_text = text(columns::UTC, "UTC")?;
    let utc = clock::parse_utc(utc_text).map_err(|e| CatalogError::Parse {
        line,
        message: format!("UTC '{}': {}", utc_text, e),
    })?;
    let local_time = clock::local_time_from_ltst_hours(sol, ltst_hours, clock::subsec_nanos(utc))
        .ok_or_else(|| CatalogError::Parse {
            line,
            message: format!("LTST hour {} out of range", ltst_hours),
        })?;

    Ok(CatalogEntry {
        id,
        sol,
        ltst_hours,
        utc,
        pressure_drop: number(columns::PRESSURE_DROP, "dP")?,
        wind_speed_avg: number(columns::WIND_SPEED_AVG, "Ws-ave")?,
        wind_speed_std: number(columns::WIND_SPEED_STD, "Ws-std")?,
        wind_dir_avg: number(columns::WIND_DIR_AVG, "Wd-ave")?,
        wind_dir_std: number(columns::WIND_DIR_STD, "Wd-std")?,
        temperature_avg: number(columns::TEMPERATURE_AVG, "AT-ave")?,
        temperature_std: number(columns::TEMPERATURE_STD, "AT-std")?,
        local_time,
        ls: clock::solar_longitude_bin(utc),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    /// Build a catalog row with 159 columns.
    fn catalog_row(id: u32, sol: u32, ltst_h: f64, utc: &str, dp: f64, ws: f64, at: f64) -> String {
        let mut fields = vec![String::new(); 159];
        fields[columns::ID] = id.to_string();
        fields[1] = "x".to_string();
        fields[columns::SOL] = sol.to_string();
        fields[columns::LTST_HOURS] = ltst_h.to_string();
        fields[columns::UTC] = utc.to_string();
        fields[columns::PRESSURE_DROP] = dp.to_string();
        fields[columns::WIND_SPEED_AVG] = ws.to_string();
        fields[columns::WIND_SPEED_STD] = "0.5".to_string();
        fields[columns::WIND_DIR_AVG] = "180".to_string();
        fields[columns::WIND_DIR_STD] = "10".to_string();
        fields[columns::TEMPERATURE_AVG] = at.to_string();
        fields[columns::TEMPERATURE_STD] = "1.0".to_string();
        fields.join(",")
    }

    fn sample_catalog() -> EventCatalog {
        let header = (0..159).map(|i| format!("c{}", i)).collect::<Vec<_>>().join(",");
        let rows = [
            catalog_row(0, 10, 12.5, "2019-100T01:00:00.250Z", -1.2, 3.0, 230.0),
            catalog_row(1, 10, 13.0, "2019-100T02:00:00.000Z", -3.5, 8.0, 240.0),
            catalog_row(2, 12, 14.25, "2019-200T02:00:00.000Z", -0.4, 2.0, 250.0),
        ];
        let csv = format!("{}\n{}\n", header, rows.join("\n"));
        EventCatalog::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_and_lookup() {
        let catalog = sample_catalog();
        assert_eq!(catalog.len(), 3);

        let (sol, t) = catalog.lookup(0).unwrap();
        assert_eq!(sol, 10);
        assert_eq!(t.date(), clock::sol_date(10));
        assert_eq!((t.hour(), t.minute(), t.second()), (12, 30, 0));
        assert_eq!(t.nanosecond(), 250_000_000);

        assert!(matches!(catalog.lookup(99), Err(CatalogError::UnknownId(99))));
    }

    #[test]
    fn test_filters() {
        let catalog = sample_catalog();
        assert_eq!(catalog.select(&EventFilter::PressureDropBelow(-1.0)), vec![0, 1]);
        assert_eq!(
            catalog.select(&EventFilter::TemperatureAndWind {
                min_temperature: 235.0,
                max_wind_speed: 5.0
            }),
            vec![2]
        );
        // 2019-04-10 -> ls 0; 2019-07-19 -> ls 30
        assert_eq!(catalog.select(&EventFilter::Season(10)), vec![0, 1]);
        assert_eq!(catalog.select(&EventFilter::Season(45)), vec![2]);
        assert_eq!(catalog.select(&EventFilter::Ids(vec![2, 7])), vec![2, 7]);
    }

    #[test]
    fn test_sol_lists() {
        let catalog = sample_catalog();
        assert_eq!(catalog.event_sols(), vec![10, 12]);
        let quiet = catalog.quiet_sols(13);
        assert_eq!(quiet.len(), 12);
        assert!(!quiet.contains(&10));
        assert!(quiet.contains(&11));
        assert_eq!(catalog.season_histogram().get(&Some(0)), Some(&2));
    }

    #[test]
    fn test_parse_error_reports_line() {
        let header = (0..159).map(|i| format!("c{}", i)).collect::<Vec<_>>().join(",");
        let bad = catalog_row(0, 10, 12.5, "yesterday", -1.0, 1.0, 1.0);
        let csv = format!("{}\n{}\n", header, bad);
        let err = EventCatalog::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, CatalogError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_filter_labels() {
        assert_eq!(EventFilter::Season(47).label(), "ls_030~060");
        assert_eq!(EventFilter::PressureDropBelow(-2.0).label(), "dP_~-2");
    }
}
