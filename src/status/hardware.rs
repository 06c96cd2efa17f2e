use crate::error::CycleError;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

const HARDWARE_PATH: &str = "/api/system/hardware";

/// Static description of the monitored machine. Every field is optional on
/// the wire; whatever the backend could not detect decodes to its default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HardwareInfo {
    pub os_info: OsInfo,
    pub cpu_info: CpuInfo,
    pub memory_info: MemoryInfo,
    pub disk_info: Vec<DiskPartition>,
    pub gpu_info: Vec<GpuDevice>,
    pub bios_info: BiosInfo,
    pub system_uptime: SystemUptime,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OsInfo {
    pub system: String,
    pub release: String,
    pub version: String,
    pub architecture: String,
    pub machine: String,
    pub platform: String,
    pub os_name: Option<String>,
}

impl OsInfo {
    /// Distribution name when the backend found one, else `system release`.
    pub fn display_name(&self) -> String {
        match &self.os_name {
            Some(name) if !name.is_empty() => name.clone(),
            _ if !self.system.is_empty() => format!("{} {}", self.system, self.release)
                .trim_end()
                .to_string(),
            _ if !self.platform.is_empty() => self.platform.clone(),
            _ => "Unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CpuInfo {
    pub model: String,
    pub vendor: String,
    pub physical_cores: Option<u32>,
    pub total_cores: Option<u32>,
    /// MHz.
    pub current_frequency: f64,
    /// MHz.
    pub max_frequency: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MemoryInfo {
    pub total: u64,
    pub available: u64,
    pub swap_total: u64,
    pub swap_used: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DiskPartition {
    pub device: String,
    pub mountpoint: String,
    pub fstype: String,
    pub total: u64,
    pub used: u64,
    pub usage_percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GpuDevice {
    pub vendor: String,
    pub name: String,
    /// MiB.
    pub memory_total: f64,
    /// MiB.
    pub memory_used: f64,
    pub usage_percent: f64,
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BiosInfo {
    pub bios_version: String,
    pub bios_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SystemUptime {
    pub seconds: u64,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl HardwareInfo {
    /// Unwraps the `{ success, data, error }` envelope the hardware route
    /// answers with.
    pub fn from_envelope(payload: &Value) -> Result<Self, CycleError> {
        let envelope: Envelope = serde_json::from_value(payload.clone())
            .map_err(|e| CycleError::MalformedPayload(format!("hardware envelope: {}", e)))?;

        if !envelope.success {
            return Err(CycleError::Network(format!(
                "hardware query failed on the server: {}",
                envelope.error.as_deref().unwrap_or("no reason given")
            )));
        }

        let data = envelope
            .data
            .filter(Value::is_object)
            .ok_or_else(|| CycleError::MalformedPayload("hardware data is not an object".to_string()))?;

        serde_json::from_value(data)
            .map_err(|e| CycleError::MalformedPayload(format!("hardware data: {}", e)))
    }
}

/// The hardware route lives next to the status route on the same backend.
pub fn hardware_endpoint(status_endpoint: &str) -> Result<String, CycleError> {
    let base = Url::parse(status_endpoint)
        .map_err(|e| CycleError::Network(format!("invalid endpoint {}: {}", status_endpoint, e)))?;
    base.join(HARDWARE_PATH)
        .map(|url| url.to_string())
        .map_err(|e| CycleError::Network(format!("invalid endpoint {}: {}", status_endpoint, e)))
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.2} {}", value, UNITS[unit])
    }
}

pub fn format_frequency(mhz: f64) -> String {
    if mhz <= 0.0 {
        "Unknown".to_string()
    } else if mhz >= 1000.0 {
        format!("{:.1} GHz", mhz / 1000.0)
    } else {
        format!("{:.0} MHz", mhz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fixture() -> Value {
        serde_json::from_str(include_str!("../../assets/sample_payloads/hardware.json")).unwrap()
    }

    #[test]
    fn test_decode_fixture() {
        let info = HardwareInfo::from_envelope(&fixture()).unwrap();

        assert_eq!(info.os_info.display_name(), "Ubuntu 22.04.4 LTS");
        assert_eq!(info.cpu_info.model, "AMD Ryzen 7 5800X 8-Core Processor");
        assert_eq!(info.cpu_info.total_cores, Some(16));
        assert_eq!(info.disk_info.len(), 2);
        assert_eq!(info.disk_info[1].mountpoint, "/data");
        assert_eq!(info.gpu_info[0].temperature, Some(54.0));
        assert_eq!(info.bios_info.bios_version, "F36d");
        assert_eq!(info.system_uptime.seconds, 93784);
    }

    #[test]
    fn test_missing_sections_default() {
        let info = HardwareInfo::from_envelope(&json!({
            "success": true,
            "data": { "os_info": { "system": "Linux", "release": "6.8.0" } }
        }))
        .unwrap();

        assert_eq!(info.os_info.display_name(), "Linux 6.8.0");
        assert!(info.disk_info.is_empty());
        assert_eq!(info.cpu_info.total_cores, None);
    }

    #[test]
    fn test_server_side_failure() {
        let err = HardwareInfo::from_envelope(&json!({
            "success": false,
            "error": "psutil missing",
            "data": null
        }))
        .unwrap_err();

        assert!(matches!(err, CycleError::Network(msg) if msg.contains("psutil missing")));
    }

    #[test]
    fn test_non_object_data_is_malformed() {
        let err = HardwareInfo::from_envelope(&json!({ "success": true, "data": [1, 2] })).unwrap_err();
        assert!(matches!(err, CycleError::MalformedPayload(_)));
    }

    #[test]
    fn test_hardware_endpoint_replaces_status_path() {
        assert_eq!(
            hardware_endpoint("http://10.0.0.5:48877/api/status").unwrap(),
            "http://10.0.0.5:48877/api/system/hardware"
        );
        assert!(hardware_endpoint("not a url").is_err());
    }

    #[test]
    fn test_formatting() {
        insta::assert_snapshot!(format_bytes(512), @"512 B");
        insta::assert_snapshot!(format_bytes(8_589_934_592), @"8.00 GB");
        insta::assert_snapshot!(format_bytes(1_610_612_736), @"1.50 GB");
        insta::assert_snapshot!(format_frequency(3800.0), @"3.8 GHz");
        insta::assert_snapshot!(format_frequency(800.0), @"800 MHz");
        insta::assert_snapshot!(format_frequency(0.0), @"Unknown");
    }
}
