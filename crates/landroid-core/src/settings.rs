//! Device configuration payloads
//!
//! Encodes rain delay, time extension and multi-zone settings into the
//! vendor's JSON envelope (`rd`, `sc.p`, `mz`, `mzv`).

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::{InputError, InputResult};

/// Number of zones a mower supports
pub const ZONE_COUNT: usize = 4;

/// Slots in the zone probability allocation
pub const ZONE_SLOTS: usize = 10;

/// A requested configuration change; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigUpdate {
    /// Minutes to wait after rain
    pub rain_delay: Option<i64>,
    /// Schedule variation in percent
    pub time_extension: Option<i64>,
    /// Starting distance for each zone
    pub zone_distances: Option<[i64; ZONE_COUNT]>,
    /// Probability weight for each zone, in percent
    pub zone_probabilities: Option<[i64; ZONE_COUNT]>,
}

impl ConfigUpdate {
    /// Parse service call data.
    ///
    /// Zone arrays are accepted as JSON arrays or as the `"[a,b,c,d]"`
    /// string form.
    pub fn from_service_data(data: &Value) -> InputResult<Self> {
        let mut update = ConfigUpdate::default();

        if let Some(value) = data.get("raindelay") {
            update.rain_delay = Some(parse_int("raindelay", value)?);
        }
        if let Some(value) = data.get("timeextension") {
            update.time_extension = Some(parse_int("timeextension", value)?);
        }
        if let Some(value) = data.get("multizone_distances") {
            let sections = parse_int_list("multizone_distances", value)?;
            let sections: [i64; ZONE_COUNT] = sections
                .try_into()
                .map_err(|_| InputError::ZoneDistancesFormat)?;
            update.zone_distances = Some(sections);
        }
        if let Some(value) = data.get("multizone_probabilities") {
            let sections = parse_int_list("multizone_probabilities", value)?;
            let sections: [i64; ZONE_COUNT] = sections
                .try_into()
                .map_err(|_| InputError::ZoneProbabilitiesFormat)?;
            update.zone_probabilities = Some(sections);
        }

        Ok(update)
    }

    pub fn is_empty(&self) -> bool {
        *self == ConfigUpdate::default()
    }

    /// Build the vendor payload, `None` when there is nothing to send
    pub fn encode(&self) -> InputResult<Option<Value>> {
        let mut payload = Map::new();

        if let Some(minutes) = self.rain_delay {
            debug!(minutes, "Setting rain delay");
            payload.insert("rd".to_string(), json!(minutes));
        }
        if let Some(percent) = self.time_extension {
            debug!(percent, "Setting time extension");
            payload.insert("sc".to_string(), json!({ "p": percent }));
        }
        if let Some(distances) = self.zone_distances {
            debug!(?distances, "Setting multizone distances");
            payload.insert("mz".to_string(), json!(distances));
        }
        if let Some(probabilities) = self.zone_probabilities {
            debug!(?probabilities, "Setting multizone probabilities");
            payload.insert("mzv".to_string(), json!(zone_allocation(&probabilities)?));
        }

        if payload.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Value::Object(payload)))
        }
    }
}

/// Expand zone percentages into the fixed ten-slot allocation.
///
/// All zeros disables zone randomisation (ten zero entries). Otherwise each
/// zone gets `percent / 10` slots and any slots left over go to the zones
/// with the largest remainder, the later zone winning a tie.
pub fn zone_allocation(probabilities: &[i64; ZONE_COUNT]) -> InputResult<Vec<usize>> {
    if probabilities.iter().any(|p| !(0..=100).contains(p)) {
        return Err(InputError::invalid(
            "multizone_probabilities",
            "each zone must be between 0 and 100",
        ));
    }
    let sum: i64 = probabilities.iter().sum();
    if sum == 0 {
        return Ok(vec![0; ZONE_SLOTS]);
    }
    if sum != 100 {
        return Err(InputError::ZoneProbabilitiesSum { sum });
    }

    let mut shares: Vec<usize> = probabilities.iter().map(|p| (p / 10) as usize).collect();
    let assigned: usize = shares.iter().sum();

    let mut by_remainder: Vec<usize> = (0..ZONE_COUNT).collect();
    by_remainder.sort_by(|a, b| {
        (probabilities[*b] % 10)
            .cmp(&(probabilities[*a] % 10))
            .then(b.cmp(a))
    });
    for idx in by_remainder.into_iter().take(ZONE_SLOTS - assigned) {
        shares[idx] += 1;
    }

    Ok(shares
        .iter()
        .enumerate()
        .flat_map(|(idx, count)| std::iter::repeat(idx).take(*count))
        .collect())
}

fn parse_int(field: &str, value: &Value) -> InputResult<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(whole_number))
            .ok_or_else(|| InputError::invalid(field, format!("{} is not an integer", n))),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| InputError::invalid(field, format!("'{}' is not an integer", s))),
        _ => Err(InputError::invalid(field, "expected a number")),
    }
}

/// `30.0` is accepted as 30; fractions and values outside `i64` are not
fn whole_number(f: f64) -> Option<i64> {
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.fract() == 0.0 && in_range).then_some(f as i64)
}

fn parse_int_list(field: &str, value: &Value) -> InputResult<Vec<i64>> {
    match value {
        Value::Array(items) => items.iter().map(|v| parse_int(field, v)).collect(),
        Value::String(s) => s
            .replace(&['[', ']'][..], "")
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<i64>()
                    .map_err(|_| InputError::invalid(field, format!("'{}' is not an integer", part)))
            })
            .collect(),
        _ => Err(InputError::invalid(field, "expected a list of integers")),
    }
}
