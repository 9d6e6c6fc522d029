use serde::{Deserialize, Serialize};

/// One reported energy sample from a device.
///
/// The timestamp is carried as an opaque ISO-8601 string: records are echoed
/// back exactly as submitted and never interpreted, so it is not parsed at
/// the boundary. `energy_kwh` is likewise accepted as-is, sign unchecked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub timestamp: String,
    pub energy_kwh: f64,
    pub device_id: String,
}
