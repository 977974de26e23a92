//! Mowing schedules
//!
//! A mower carries two weekly schedules. The vendor expects the complete
//! pair on every write, so a partial user update is merged with the
//! schedules the device currently reports before encoding:
//!
//! ```text
//! {"sc": {"d": [["10:00", 60, 1], ...7 days], "dd": [...]}}
//! ```
//!
//! Days are always encoded Sunday first.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{InputError, InputResult};

/// Day of the week, in vendor order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Weekday::Sunday => "sunday",
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
        }
    }

    fn start_key(self) -> String {
        format!("{}_start", self.name())
    }

    fn end_key(self) -> String {
        format!("{}_end", self.name())
    }

    fn boundary_key(self) -> String {
        format!("{}_boundary", self.name())
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which of the two weekly schedules an update targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleKind {
    Primary,
    Secondary,
}

impl ScheduleKind {
    /// Key used in the vendor payload
    pub const fn wire_key(self) -> &'static str {
        match self {
            ScheduleKind::Primary => "d",
            ScheduleKind::Secondary => "dd",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ScheduleKind::Primary => "primary",
            ScheduleKind::Secondary => "secondary",
        }
    }
}

impl FromStr for ScheduleKind {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primary" => Ok(ScheduleKind::Primary),
            "secondary" => Ok(ScheduleKind::Secondary),
            other => Err(InputError::UnknownScheduleKind(other.to_string())),
        }
    }
}

impl fmt::Display for ScheduleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One encoded day: start time, duration in minutes, boundary cut flag
pub type EncodedDay = (String, u32, u8);

/// A single day in a device schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDay {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    /// Minutes of mowing; zero disables the day
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub boundary: bool,
}

impl ScheduleDay {
    pub fn encode(&self) -> EncodedDay {
        (
            format_time(self.start),
            self.duration,
            u8::from(self.boundary),
        )
    }
}

impl Default for ScheduleDay {
    fn default() -> Self {
        Self {
            start: NaiveTime::default(),
            duration: 0,
            boundary: false,
        }
    }
}

/// A full week of schedule days
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklySchedule(BTreeMap<Weekday, ScheduleDay>);

impl WeeklySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_day(mut self, day: Weekday, entry: ScheduleDay) -> Self {
        self.0.insert(day, entry);
        self
    }

    /// The entry for a day; days the device did not report are disabled
    pub fn day(&self, day: Weekday) -> ScheduleDay {
        self.0.get(&day).copied().unwrap_or_default()
    }

    pub fn encode(&self) -> Vec<EncodedDay> {
        Weekday::ALL.iter().map(|d| self.day(*d).encode()).collect()
    }
}

/// Both schedules as reported by the device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSchedules {
    #[serde(default)]
    pub primary: WeeklySchedule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<WeeklySchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_extension: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl DeviceSchedules {
    pub fn get(&self, kind: ScheduleKind) -> Option<&WeeklySchedule> {
        match kind {
            ScheduleKind::Primary => Some(&self.primary),
            ScheduleKind::Secondary => self.secondary.as_ref(),
        }
    }
}

/// New values for one day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayUpdate {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub boundary: bool,
}

impl DayUpdate {
    pub fn duration_minutes(&self) -> u32 {
        let minutes = (self.end - self.start).num_minutes();
        u32::try_from(minutes).unwrap_or(0)
    }

    fn encode(&self) -> EncodedDay {
        (
            format_time(self.start),
            self.duration_minutes(),
            u8::from(self.boundary),
        )
    }
}

/// A partial schedule change requested by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleUpdate {
    pub kind: ScheduleKind,
    pub days: BTreeMap<Weekday, DayUpdate>,
}

impl ScheduleUpdate {
    pub fn new(kind: ScheduleKind) -> Self {
        Self {
            kind,
            days: BTreeMap::new(),
        }
    }

    pub fn with_day(mut self, day: Weekday, update: DayUpdate) -> Self {
        self.days.insert(day, update);
        self
    }

    /// Parse service call data.
    ///
    /// Expects `type` plus any of `<day>_start`, `<day>_end` and
    /// `<day>_boundary`. A day with a start must also carry an end.
    pub fn from_service_data(data: &Value) -> InputResult<Self> {
        let kind = data
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| InputError::MissingField("type".to_string()))?
            .parse::<ScheduleKind>()?;

        let mut update = Self::new(kind);
        for day in Weekday::ALL {
            let start_key = day.start_key();
            let Some(start) = data.get(&start_key) else {
                continue;
            };
            let end_key = day.end_key();
            let end = data
                .get(&end_key)
                .ok_or_else(|| InputError::MissingEndTime {
                    day: day.name().to_string(),
                })?;

            let start = parse_time_value(&start_key, start)?;
            let end = parse_time_value(&end_key, end)?;
            if end < start {
                return Err(InputError::EndBeforeStart {
                    day: day.name().to_string(),
                    start: format_time(start),
                    end: format_time(end),
                });
            }

            let boundary = match data.get(day.boundary_key()) {
                Some(Value::Bool(b)) => *b,
                Some(Value::Number(n)) => n.as_i64().unwrap_or(0) != 0,
                _ => false,
            };

            update.days.insert(
                day,
                DayUpdate {
                    start,
                    end,
                    boundary,
                },
            );
        }

        Ok(update)
    }
}

/// A complete schedule payload ready for transmission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSchedule {
    pub primary: Vec<EncodedDay>,
    pub secondary: Option<Vec<EncodedDay>>,
}

impl EncodedSchedule {
    /// Encode the device's current schedules without changes
    pub fn passthrough(existing: &DeviceSchedules) -> Self {
        Self {
            primary: existing.primary.encode(),
            secondary: existing.secondary.as_ref().map(WeeklySchedule::encode),
        }
    }

    pub fn to_payload(&self) -> Value {
        let mut sc = serde_json::Map::new();
        sc.insert(ScheduleKind::Primary.wire_key().to_string(), json!(self.primary));
        if let Some(secondary) = &self.secondary {
            sc.insert(ScheduleKind::Secondary.wire_key().to_string(), json!(secondary));
        }
        json!({ "sc": sc })
    }
}

/// Merge a partial update into the device's schedules.
///
/// Updated days overwrite, all other days are carried over, and the
/// schedule kind not targeted by the update passes through untouched.
pub fn merge(update: &ScheduleUpdate, existing: &DeviceSchedules) -> EncodedSchedule {
    let current = existing.get(update.kind).cloned().unwrap_or_default();
    let merged: Vec<EncodedDay> = Weekday::ALL
        .iter()
        .map(|day| match update.days.get(day) {
            Some(new) => new.encode(),
            None => current.day(*day).encode(),
        })
        .collect();

    let mut encoded = EncodedSchedule::passthrough(existing);
    match update.kind {
        ScheduleKind::Primary => encoded.primary = merged,
        ScheduleKind::Secondary => encoded.secondary = Some(merged),
    }
    encoded
}

fn format_time(time: NaiveTime) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

fn parse_time(field: &str, value: &str) -> InputResult<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| InputError::InvalidTime {
            field: field.to_string(),
            value: value.to_string(),
        })
}

fn parse_time_value(field: &str, value: &Value) -> InputResult<NaiveTime> {
    match value.as_str() {
        Some(s) => parse_time(field, s),
        None => Err(InputError::InvalidTime {
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}

/// `HH:MM` on the way out, `HH:MM` or `HH:MM:SS` on the way in
mod hhmm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_time(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time("start", &raw).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> NaiveTime {
        parse_time("test", s).unwrap()
    }

    fn day(start: &str, duration: u32, boundary: bool) -> ScheduleDay {
        ScheduleDay {
            start: t(start),
            duration,
            boundary,
        }
    }

    fn existing() -> DeviceSchedules {
        let mut primary = WeeklySchedule::new();
        let mut secondary = WeeklySchedule::new();
        for (i, d) in Weekday::ALL.iter().enumerate() {
            primary = primary.with_day(*d, day("10:00", 60 + i as u32, i % 2 == 0));
            secondary = secondary.with_day(*d, day("18:30", 30, false));
        }
        DeviceSchedules {
            primary,
            secondary: Some(secondary),
            time_extension: Some(0),
            active: Some(true),
        }
    }

    #[test]
    fn test_parse_update_from_service_data() {
        let data = json!({
            "type": "primary",
            "monday_start": "09:00:00",
            "monday_end": "11:30:00",
            "monday_boundary": true,
        });
        let update = ScheduleUpdate::from_service_data(&data).unwrap();

        assert_eq!(update.kind, ScheduleKind::Primary);
        assert_eq!(update.days.len(), 1);
        let monday = update.days[&Weekday::Monday];
        assert_eq!(monday.duration_minutes(), 150);
        assert!(monday.boundary);
    }

    #[test]
    fn test_missing_end_time_is_rejected() {
        let data = json!({"type": "primary", "friday_start": "09:00"});
        let err = ScheduleUpdate::from_service_data(&data).unwrap_err();
        assert_eq!(
            err,
            InputError::MissingEndTime {
                day: "friday".to_string()
            }
        );
        assert_eq!(err.to_string(), "No end time specified for friday");
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let data = json!({"type": "secondary", "sunday_start": "12:00", "sunday_end": "11:00"});
        let err = ScheduleUpdate::from_service_data(&data).unwrap_err();
        assert!(matches!(err, InputError::EndBeforeStart { .. }));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let data = json!({"type": "tertiary"});
        assert!(matches!(
            ScheduleUpdate::from_service_data(&data),
            Err(InputError::UnknownScheduleKind(_))
        ));
    }

    #[test]
    fn test_bad_time_is_rejected() {
        let data = json!({"type": "primary", "monday_start": "25:99", "monday_end": "26:00"});
        assert!(matches!(
            ScheduleUpdate::from_service_data(&data),
            Err(InputError::InvalidTime { .. })
        ));
    }

    #[test]
    fn test_partial_primary_update_carries_other_days() {
        let existing = existing();
        let update = ScheduleUpdate::new(ScheduleKind::Primary).with_day(
            Weekday::Wednesday,
            DayUpdate {
                start: t("07:15"),
                end: t("08:00"),
                boundary: false,
            },
        );

        let encoded = merge(&update, &existing);
        let before = EncodedSchedule::passthrough(&existing);

        for (i, d) in Weekday::ALL.iter().enumerate() {
            if *d == Weekday::Wednesday {
                assert_eq!(encoded.primary[i], ("07:15".to_string(), 45, 0));
            } else {
                assert_eq!(encoded.primary[i], before.primary[i]);
            }
        }
        assert_eq!(encoded.secondary, before.secondary);
    }

    #[test]
    fn test_secondary_update_keeps_primary() {
        let existing = existing();
        let update = ScheduleUpdate::new(ScheduleKind::Secondary).with_day(
            Weekday::Sunday,
            DayUpdate {
                start: t("20:00"),
                end: t("21:00"),
                boundary: true,
            },
        );

        let encoded = merge(&update, &existing);
        assert_eq!(encoded.primary, existing.primary.encode());
        let secondary = encoded.secondary.unwrap();
        assert_eq!(secondary[0], ("20:00".to_string(), 60, 1));
        assert_eq!(secondary[1], ("18:30".to_string(), 30, 0));
    }

    #[test]
    fn test_merge_with_current_values_is_idempotent() {
        let existing = existing();
        let mut update = ScheduleUpdate::new(ScheduleKind::Primary);
        for d in Weekday::ALL {
            let current = existing.primary.day(d);
            update = update.with_day(
                d,
                DayUpdate {
                    start: current.start,
                    end: current.start + chrono::Duration::minutes(current.duration as i64),
                    boundary: current.boundary,
                },
            );
        }

        assert_eq!(merge(&update, &existing), EncodedSchedule::passthrough(&existing));
    }

    #[test]
    fn test_secondary_update_without_existing_secondary() {
        let mut existing = existing();
        existing.secondary = None;
        let update = ScheduleUpdate::new(ScheduleKind::Secondary);

        let encoded = merge(&update, &existing);
        assert_eq!(encoded.secondary.unwrap()[3], ("00:00".to_string(), 0, 0));
    }

    #[test]
    fn test_payload_shape() {
        let existing = existing();
        let payload = EncodedSchedule::passthrough(&existing).to_payload();

        let d = payload["sc"]["d"].as_array().unwrap();
        assert_eq!(d.len(), 7);
        assert_eq!(d[0], json!(["10:00", 60, 1]));
        assert_eq!(payload["sc"]["dd"][6], json!(["18:30", 30, 0]));
    }

    #[test]
    fn test_device_schedules_deserialize() {
        let raw = json!({
            "primary": {
                "sunday": {"start": "10:00", "duration": 90, "boundary": true},
                "monday": {"start": "11:00:00", "duration": 0, "boundary": false}
            },
            "time_extension": 10
        });
        let schedules: DeviceSchedules = serde_json::from_value(raw).unwrap();

        assert_eq!(schedules.primary.day(Weekday::Sunday), day("10:00", 90, true));
        assert_eq!(schedules.primary.day(Weekday::Monday).start, t("11:00"));
        assert_eq!(schedules.primary.day(Weekday::Saturday), ScheduleDay::default());
        assert!(schedules.secondary.is_none());
        assert_eq!(schedules.time_extension, Some(10));
    }
}
