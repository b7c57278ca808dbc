//! Placement status engine.
//!
//! Status is derived, never stored: it is a pure function of a placement and the date treated
//! as today. Placements arrive in one of two JSON shapes:
//!
//! - the full placement record, which carries `cancellation` and `nonArrival` objects and is
//!   recognised by its `applicationId`,
//! - the lightweight summary used in listings, which carries `isCancelled` and `isNonArrival`
//!   flags instead.
//!
//! Both shapes are parsed into [`Placement`] once, at the edge. Everything after that works on
//! the same normalised facts, so both shapes classify identically.

use crate::constants::{STATUS_WINDOW_2_WEEKS_DAYS, STATUS_WINDOW_6_WEEKS_DAYS};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Errors raised while reading a placement.
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("placement does not match the expected shape at {path}: {message}")]
    Schema { path: String, message: String },

    #[error("invalid date in {field}: '{value}'")]
    InvalidDate { field: &'static str, value: String },
}

pub type StatusResult<T> = std::result::Result<T, StatusError>;

// ============================================================================
// Status values
// ============================================================================

/// Coarse lifecycle stage of a placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OverallStatus {
    Upcoming,
    Arrived,
    NotArrived,
    Departed,
    Cancelled,
}

/// Lifecycle stage refined by how close the next expected event is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DetailedStatus {
    Upcoming,
    ArrivingWithin6Weeks,
    ArrivingWithin2Weeks,
    ArrivingToday,
    OverdueArrival,
    Arrived,
    DepartingWithin2Weeks,
    DepartingToday,
    OverdueDeparture,
    NotArrived,
    Departed,
    Cancelled,
}

/// Display text for every overall status.
pub const OVERALL_STATUS_LABELS: [(OverallStatus, &str); 5] = [
    (OverallStatus::Upcoming, "Upcoming"),
    (OverallStatus::Arrived, "Arrived"),
    (OverallStatus::NotArrived, "Not arrived"),
    (OverallStatus::Departed, "Departed"),
    (OverallStatus::Cancelled, "Cancelled"),
];

/// Display text for every detailed status.
pub const DETAILED_STATUS_LABELS: [(DetailedStatus, &str); 12] = [
    (DetailedStatus::Upcoming, "Upcoming"),
    (DetailedStatus::ArrivingWithin6Weeks, "Arriving within 6 weeks"),
    (DetailedStatus::ArrivingWithin2Weeks, "Arriving within 2 weeks"),
    (DetailedStatus::ArrivingToday, "Arriving today"),
    (DetailedStatus::OverdueArrival, "Overdue arrival"),
    (DetailedStatus::Arrived, "Arrived"),
    (DetailedStatus::DepartingWithin2Weeks, "Departing within 2 weeks"),
    (DetailedStatus::DepartingToday, "Departing today"),
    (DetailedStatus::OverdueDeparture, "Overdue departure"),
    (DetailedStatus::NotArrived, "Not arrived"),
    (DetailedStatus::Departed, "Departed"),
    (DetailedStatus::Cancelled, "Cancelled"),
];

impl OverallStatus {
    pub fn label(self) -> &'static str {
        OVERALL_STATUS_LABELS
            .iter()
            .find(|(status, _)| *status == self)
            .map_or("", |(_, label)| *label)
    }
}

impl DetailedStatus {
    pub fn label(self) -> &'static str {
        DETAILED_STATUS_LABELS
            .iter()
            .find(|(status, _)| *status == self)
            .map_or("", |(_, label)| *label)
    }
}

// ============================================================================
// Public domain-level types
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cancellation {
    pub date: NaiveDate,
    pub reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NonArrival {
    pub date: NaiveDate,
    pub reason: Option<String>,
}

/// Full placement record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacementRecord {
    pub application_id: String,
    pub expected_arrival_date: NaiveDate,
    pub expected_departure_date: NaiveDate,
    pub actual_arrival_date: Option<NaiveDate>,
    pub actual_departure_date: Option<NaiveDate>,
    pub cancellation: Option<Cancellation>,
    pub non_arrival: Option<NonArrival>,
}

/// Lightweight placement summary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacementSummary {
    pub expected_arrival_date: NaiveDate,
    pub expected_departure_date: NaiveDate,
    pub actual_arrival_date: Option<NaiveDate>,
    pub actual_departure_date: Option<NaiveDate>,
    pub is_cancelled: bool,
    pub is_non_arrival: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Placement {
    Record(PlacementRecord),
    Summary(PlacementSummary),
}

/// The facts status derivation depends on, independent of input shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacementFacts {
    pub expected_arrival: NaiveDate,
    pub expected_departure: NaiveDate,
    pub arrived: bool,
    pub departed: bool,
    pub cancelled: bool,
    pub non_arrival: bool,
}

impl Placement {
    /// Reads a placement in either shape.
    ///
    /// The shape is decided once: an object with an `applicationId` key is a full record,
    /// anything else is read as a summary. Errors carry the path of the failing field
    /// (e.g. `cancellation.date`).
    pub fn from_json(value: &Value) -> StatusResult<Self> {
        let is_record = value
            .as_object()
            .is_some_and(|map| map.contains_key("applicationId"));

        if is_record {
            let wire: PlacementRecordWire = deserialize_wire(value)?;
            Ok(Placement::Record(record_wire_to_domain(wire)?))
        } else {
            let wire: PlacementSummaryWire = deserialize_wire(value)?;
            Ok(Placement::Summary(summary_wire_to_domain(wire)?))
        }
    }

    /// Parses placement JSON text in either shape.
    pub fn parse(json_text: &str) -> StatusResult<Self> {
        let value: Value = serde_json::from_str(json_text).map_err(|e| StatusError::Schema {
            path: "<root>".to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&value)
    }

    pub fn facts(&self) -> PlacementFacts {
        match self {
            Placement::Record(record) => PlacementFacts {
                expected_arrival: record.expected_arrival_date,
                expected_departure: record.expected_departure_date,
                arrived: record.actual_arrival_date.is_some(),
                departed: record.actual_departure_date.is_some(),
                cancelled: record.cancellation.is_some(),
                non_arrival: record.non_arrival.is_some(),
            },
            Placement::Summary(summary) => PlacementFacts {
                expected_arrival: summary.expected_arrival_date,
                expected_departure: summary.expected_departure_date,
                arrived: summary.actual_arrival_date.is_some(),
                departed: summary.actual_departure_date.is_some(),
                cancelled: summary.is_cancelled,
                non_arrival: summary.is_non_arrival,
            },
        }
    }
}

// ============================================================================
// Derivation
// ============================================================================

pub fn overall_status(placement: &Placement) -> OverallStatus {
    overall_from_facts(&placement.facts())
}

pub fn detailed_status(placement: &Placement, today: NaiveDate) -> DetailedStatus {
    detailed_from_facts(&placement.facts(), today)
}

fn overall_from_facts(facts: &PlacementFacts) -> OverallStatus {
    if facts.cancelled {
        OverallStatus::Cancelled
    } else if facts.non_arrival {
        OverallStatus::NotArrived
    } else if facts.departed {
        OverallStatus::Departed
    } else if facts.arrived {
        OverallStatus::Arrived
    } else {
        OverallStatus::Upcoming
    }
}

fn detailed_from_facts(facts: &PlacementFacts, today: NaiveDate) -> DetailedStatus {
    match overall_from_facts(facts) {
        OverallStatus::Cancelled => DetailedStatus::Cancelled,
        OverallStatus::NotArrived => DetailedStatus::NotArrived,
        OverallStatus::Departed => DetailedStatus::Departed,
        OverallStatus::Arrived => {
            let days = (facts.expected_departure - today).num_days();
            match days {
                d if d < 0 => DetailedStatus::OverdueDeparture,
                0 => DetailedStatus::DepartingToday,
                d if d <= STATUS_WINDOW_2_WEEKS_DAYS => DetailedStatus::DepartingWithin2Weeks,
                _ => DetailedStatus::Arrived,
            }
        }
        OverallStatus::Upcoming => {
            let days = (facts.expected_arrival - today).num_days();
            match days {
                d if d < 0 => DetailedStatus::OverdueArrival,
                0 => DetailedStatus::ArrivingToday,
                d if d <= STATUS_WINDOW_2_WEEKS_DAYS => DetailedStatus::ArrivingWithin2Weeks,
                d if d <= STATUS_WINDOW_6_WEEKS_DAYS => DetailedStatus::ArrivingWithin6Weeks,
                _ => DetailedStatus::Upcoming,
            }
        }
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlacementRecordWire {
    application_id: String,
    expected_arrival_date: String,
    expected_departure_date: String,
    #[serde(default)]
    actual_arrival_date: Option<String>,
    #[serde(default)]
    actual_departure_date: Option<String>,
    #[serde(default)]
    cancellation: Option<EventWire>,
    #[serde(default)]
    non_arrival: Option<EventWire>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventWire {
    date: String,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlacementSummaryWire {
    expected_arrival_date: String,
    expected_departure_date: String,
    #[serde(default)]
    actual_arrival_date: Option<String>,
    #[serde(default)]
    actual_departure_date: Option<String>,
    #[serde(default)]
    is_cancelled: Option<bool>,
    #[serde(default)]
    is_non_arrival: Option<bool>,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn deserialize_wire<W: for<'de> Deserialize<'de>>(value: &Value) -> StatusResult<W> {
    serde_path_to_error::deserialize::<_, W>(value).map_err(|err| {
        let path = err.path().to_string();
        let path = if path.is_empty() || path == "." {
            "<root>".to_string()
        } else {
            path
        };
        StatusError::Schema {
            path,
            message: err.into_inner().to_string(),
        }
    })
}

/// Accepts a plain date or an RFC 3339 timestamp, keeping only the calendar date.
fn parse_date(field: &'static str, value: &str) -> StatusResult<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.date_naive()))
        .map_err(|_| StatusError::InvalidDate {
            field,
            value: value.to_string(),
        })
}

fn parse_optional_date(field: &'static str, value: Option<&str>) -> StatusResult<Option<NaiveDate>> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| parse_date(field, v))
        .transpose()
}

fn record_wire_to_domain(wire: PlacementRecordWire) -> StatusResult<PlacementRecord> {
    let cancellation = wire
        .cancellation
        .map(|c| {
            Ok::<_, StatusError>(Cancellation {
                date: parse_date("cancellation.date", &c.date)?,
                reason: c.reason,
            })
        })
        .transpose()?;

    let non_arrival = wire
        .non_arrival
        .map(|n| {
            Ok::<_, StatusError>(NonArrival {
                date: parse_date("nonArrival.date", &n.date)?,
                reason: n.reason,
            })
        })
        .transpose()?;

    Ok(PlacementRecord {
        application_id: wire.application_id,
        expected_arrival_date: parse_date("expectedArrivalDate", &wire.expected_arrival_date)?,
        expected_departure_date: parse_date(
            "expectedDepartureDate",
            &wire.expected_departure_date,
        )?,
        actual_arrival_date: parse_optional_date(
            "actualArrivalDate",
            wire.actual_arrival_date.as_deref(),
        )?,
        actual_departure_date: parse_optional_date(
            "actualDepartureDate",
            wire.actual_departure_date.as_deref(),
        )?,
        cancellation,
        non_arrival,
    })
}

fn summary_wire_to_domain(wire: PlacementSummaryWire) -> StatusResult<PlacementSummary> {
    Ok(PlacementSummary {
        expected_arrival_date: parse_date("expectedArrivalDate", &wire.expected_arrival_date)?,
        expected_departure_date: parse_date(
            "expectedDepartureDate",
            &wire.expected_departure_date,
        )?,
        actual_arrival_date: parse_optional_date(
            "actualArrivalDate",
            wire.actual_arrival_date.as_deref(),
        )?,
        actual_departure_date: parse_optional_date(
            "actualDepartureDate",
            wire.actual_departure_date.as_deref(),
        )?,
        is_cancelled: wire.is_cancelled.unwrap_or(false),
        is_non_arrival: wire.is_non_arrival.unwrap_or(false),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
    }

    fn today() -> NaiveDate {
        date("2025-03-01")
    }

    fn summary(arrival: &str, departure: &str) -> Value {
        json!({
            "expectedArrivalDate": arrival,
            "expectedDepartureDate": departure,
        })
    }

    fn classify(value: Value) -> (OverallStatus, DetailedStatus) {
        let placement = Placement::from_json(&value).expect("placement parses");
        (overall_status(&placement), detailed_status(&placement, today()))
    }

    #[test]
    fn arriving_on_the_reference_date() {
        assert_eq!(
            classify(summary("2025-03-01", "2025-05-01")),
            (OverallStatus::Upcoming, DetailedStatus::ArrivingToday)
        );
    }

    #[test]
    fn expected_arrival_in_the_past_is_overdue() {
        assert_eq!(
            classify(summary("2025-02-28", "2025-05-01")),
            (OverallStatus::Upcoming, DetailedStatus::OverdueArrival)
        );
    }

    #[test]
    fn departure_within_two_weeks() {
        let mut value = summary("2025-02-01", "2025-03-14");
        value["actualArrivalDate"] = json!("2025-02-01");
        assert_eq!(
            classify(value),
            (OverallStatus::Arrived, DetailedStatus::DepartingWithin2Weeks)
        );
    }

    #[test]
    fn cancelled_regardless_of_dates() {
        let record = json!({
            "applicationId": "app-1",
            "expectedArrivalDate": "2025-03-01",
            "expectedDepartureDate": "2025-03-02",
            "actualArrivalDate": "2025-03-01",
            "actualDepartureDate": "2025-03-02",
            "cancellation": {"date": "2025-02-20", "reason": "Withdrawn"},
            "nonArrival": {"date": "2025-03-01"}
        });
        assert_eq!(
            classify(record),
            (OverallStatus::Cancelled, DetailedStatus::Cancelled)
        );
    }

    #[test]
    fn non_arrival_and_departure_are_returned_verbatim() {
        let mut value = summary("2025-01-01", "2025-02-01");
        value["isNonArrival"] = json!(true);
        assert_eq!(
            classify(value),
            (OverallStatus::NotArrived, DetailedStatus::NotArrived)
        );

        let mut value = summary("2025-01-01", "2025-01-20");
        value["actualArrivalDate"] = json!("2025-01-01");
        value["actualDepartureDate"] = json!("2025-01-20T10:15:00Z");
        assert_eq!(classify(value), (OverallStatus::Departed, DetailedStatus::Departed));
    }

    #[test]
    fn record_shape_is_detected_by_application_id() {
        let record = json!({
            "applicationId": "app-1",
            "expectedArrivalDate": "2025-03-10",
            "expectedDepartureDate": "2025-06-10"
        });
        assert!(matches!(
            Placement::from_json(&record).expect("record"),
            Placement::Record(r) if r.application_id == "app-1"
        ));
        assert!(matches!(
            Placement::from_json(&summary("2025-03-10", "2025-06-10")).expect("summary"),
            Placement::Summary(_)
        ));
    }

    #[test]
    fn malformed_dates_are_errors() {
        let err = Placement::from_json(&summary("01/03/2025", "2025-05-01")).expect_err("bad");
        assert!(matches!(
            err,
            StatusError::InvalidDate { field: "expectedArrivalDate", .. }
        ));

        let record = json!({
            "applicationId": "app-1",
            "expectedArrivalDate": "2025-03-10",
            "expectedDepartureDate": "2025-06-10",
            "cancellation": {"reason": "no date"}
        });
        let err = Placement::from_json(&record).expect_err("missing cancellation date");
        assert!(matches!(err, StatusError::Schema { path, .. } if path.starts_with("cancellation")));
    }

    #[test]
    fn every_status_has_a_label() {
        assert!(OVERALL_STATUS_LABELS.iter().all(|(s, l)| s.label() == *l && !l.is_empty()));
        assert!(DETAILED_STATUS_LABELS.iter().all(|(s, l)| s.label() == *l && !l.is_empty()));
        assert_eq!(DetailedStatus::ArrivingWithin6Weeks.label(), "Arriving within 6 weeks");
    }

    fn shapes(
        arrival: NaiveDate,
        departure: NaiveDate,
        arrived: bool,
        departed: bool,
        cancelled: bool,
        non_arrival: bool,
    ) -> (Placement, Placement) {
        let record = Placement::Record(PlacementRecord {
            application_id: "app".to_string(),
            expected_arrival_date: arrival,
            expected_departure_date: departure,
            actual_arrival_date: arrived.then_some(arrival),
            actual_departure_date: departed.then_some(departure),
            cancellation: cancelled.then(|| Cancellation {
                date: arrival,
                reason: None,
            }),
            non_arrival: non_arrival.then(|| NonArrival {
                date: arrival,
                reason: None,
            }),
        });
        let summary = Placement::Summary(PlacementSummary {
            expected_arrival_date: arrival,
            expected_departure_date: departure,
            actual_arrival_date: arrived.then_some(arrival),
            actual_departure_date: departed.then_some(departure),
            is_cancelled: cancelled,
            is_non_arrival: non_arrival,
        });
        (record, summary)
    }

    proptest! {
        #[test]
        fn both_shapes_classify_identically(
            arrival_offset in -100i64..100,
            stay in 0i64..200,
            arrived: bool,
            departed: bool,
            cancelled: bool,
            non_arrival: bool,
        ) {
            let arrival = today() + Duration::days(arrival_offset);
            let departure = arrival + Duration::days(stay);
            let (record, summary) =
                shapes(arrival, departure, arrived, departed, cancelled, non_arrival);

            prop_assert_eq!(overall_status(&record), overall_status(&summary));
            prop_assert_eq!(
                detailed_status(&record, today()),
                detailed_status(&summary, today())
            );
        }

        #[test]
        fn status_is_pure(offset in -100i64..100, arrived: bool) {
            let arrival = today() + Duration::days(offset);
            let (placement, _) =
                shapes(arrival, arrival + Duration::days(30), arrived, false, false, false);

            prop_assert_eq!(
                detailed_status(&placement, today()),
                detailed_status(&placement.clone(), today())
            );
        }

        #[test]
        fn upcoming_windows_partition_days(days in -400i64..400) {
            let arrival = today() + Duration::days(days);
            let (placement, _) =
                shapes(arrival, arrival + Duration::days(7), false, false, false, false);

            let expected = if days < 0 {
                DetailedStatus::OverdueArrival
            } else if days == 0 {
                DetailedStatus::ArrivingToday
            } else if days <= 14 {
                DetailedStatus::ArrivingWithin2Weeks
            } else if days <= 42 {
                DetailedStatus::ArrivingWithin6Weeks
            } else {
                DetailedStatus::Upcoming
            };
            prop_assert_eq!(overall_status(&placement), OverallStatus::Upcoming);
            prop_assert_eq!(detailed_status(&placement, today()), expected);
        }

        #[test]
        fn arrived_windows_partition_days(days in -400i64..400) {
            let departure = today() + Duration::days(days);
            let arrival = departure - Duration::days(500);
            let (placement, _) = shapes(arrival, departure, true, false, false, false);

            let expected = if days < 0 {
                DetailedStatus::OverdueDeparture
            } else if days == 0 {
                DetailedStatus::DepartingToday
            } else if days <= 14 {
                DetailedStatus::DepartingWithin2Weeks
            } else {
                DetailedStatus::Arrived
            };
            prop_assert_eq!(detailed_status(&placement, today()), expected);
        }
    }
}
