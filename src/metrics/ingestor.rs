use crate::error::CycleError;
use crate::metrics::sample::{Family, Sample};
use crate::status::types::{bytes_to_gb, StatusReport};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Everything one successful cycle contributes: exactly one sample per
/// family, plus the decoded presentation fields when they parse.
#[derive(Debug, Clone)]
pub struct IngestedCycle {
    pub timestamp: DateTime<Local>,
    pub cpu: Sample,
    pub memory: Sample,
    pub network: Sample,
    pub disk: Sample,
    pub report: Option<StatusReport>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricIngestor;

impl MetricIngestor {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, payload: &Value) -> Result<IngestedCycle, CycleError> {
        let root = payload.as_object().ok_or_else(|| {
            CycleError::MalformedPayload("status payload is not a JSON object".to_string())
        })?;

        let cpu = family_object(root, Family::Cpu)?;
        let memory = family_object(root, Family::Memory)?;
        let network = family_object(root, Family::Network)?;
        let disk = family_object(root, Family::Disk)?;

        let cpu_fields = BTreeMap::from([(
            "usage".to_string(),
            number(cpu, Family::Cpu, "usage_percent")?,
        )]);

        let used_bytes = number(memory, Family::Memory, "used")?;
        let memory_fields = BTreeMap::from([
            (
                "usage".to_string(),
                number(memory, Family::Memory, "usage_percent")?,
            ),
            (
                "used_gb".to_string(),
                bytes_to_gb(used_bytes.max(0.0) as u64),
            ),
        ]);

        let network_fields = BTreeMap::from([
            (
                "upload".to_string(),
                number(network, Family::Network, "upload_speed_mb")?,
            ),
            (
                "download".to_string(),
                number(network, Family::Network, "download_speed_mb")?,
            ),
        ]);

        let disk_fields = BTreeMap::from([
            (
                "read".to_string(),
                number(disk, Family::Disk, "read_speed_mb")?,
            ),
            (
                "write".to_string(),
                number(disk, Family::Disk, "write_speed_mb")?,
            ),
        ]);

        let timestamp = root
            .get("timestamp")
            .and_then(Value::as_str)
            .and_then(parse_timestamp)
            .unwrap_or_else(|| {
                tracing::debug!("status payload has no usable timestamp, using receive time");
                Local::now()
            });

        let report = match serde_json::from_value::<StatusReport>(payload.clone()) {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::debug!(error = %e, "presentation fields did not decode");
                None
            }
        };

        Ok(IngestedCycle {
            timestamp,
            cpu: Sample::new(timestamp, cpu_fields),
            memory: Sample::new(timestamp, memory_fields),
            network: Sample::new(timestamp, network_fields),
            disk: Sample::new(timestamp, disk_fields),
            report,
        })
    }
}

fn family_object(root: &Map<String, Value>, family: Family) -> Result<&Map<String, Value>, CycleError> {
    let key = family.payload_key();
    match root.get(key) {
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(CycleError::MalformedPayload(format!(
            "'{}' is not an object",
            key
        ))),
        None => Err(CycleError::MalformedPayload(format!(
            "missing required family '{}'",
            key
        ))),
    }
}

fn number(map: &Map<String, Value>, family: Family, field: &str) -> Result<f64, CycleError> {
    map.get(field).and_then(Value::as_f64).ok_or_else(|| {
        CycleError::MalformedPayload(format!(
            "'{}.{}' is missing or not a number",
            family.payload_key(),
            field
        ))
    })
}

/// Accepts RFC 3339 as well as the naive ISO-8601 local time that
/// `datetime.now().isoformat()` produces.
fn parse_timestamp(raw: &str) -> Option<DateTime<Local>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Local));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
}
