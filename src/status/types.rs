use serde::Deserialize;

/// Presentation-only view of a status payload. Every field defaults so that
/// partial payloads still decode.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StatusReport {
    pub timestamp: Option<String>,
    pub cpu: CpuStatus,
    pub memory: MemoryStatus,
    pub disk_io: DiskIoStatus,
    pub network: NetworkStatus,
    pub system_load: Option<SystemLoad>,
    pub uptime: Option<u64>,
    pub gpu: Option<GpuStatus>,
    pub network_connections: Option<u64>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CpuStatus {
    pub usage_percent: f64,
    pub core_count: u32,
    /// MHz
    pub current_freq: f64,
    pub max_freq: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MemoryStatus {
    pub total: u64,
    pub available: u64,
    pub used: u64,
    pub usage_percent: f64,
    pub free: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DiskIoStatus {
    pub read_bytes: u64,
    pub write_bytes: u64,
    pub read_speed_mb: f64,
    pub write_speed_mb: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NetworkStatus {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub upload_speed_mb: f64,
    pub download_speed_mb: f64,
    pub today_upload_gb: f64,
    pub today_download_gb: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SystemLoad {
    pub load_1min: f64,
    pub load_5min: f64,
    pub load_15min: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GpuStatus {
    pub has_gpu: bool,
    pub gpu_name: String,
    pub gpu_usage: f64,
    /// MB
    pub gpu_memory_used: f64,
    pub gpu_memory_total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionLoad {
    Normal,
    Medium,
    High,
}

impl ConnectionLoad {
    pub fn from_count(connections: u64) -> Self {
        if connections > 1000 {
            ConnectionLoad::High
        } else if connections > 500 {
            ConnectionLoad::Medium
        } else {
            ConnectionLoad::Normal
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConnectionLoad::Normal => "Normal",
            ConnectionLoad::Medium => "Medium",
            ConnectionLoad::High => "High load",
        }
    }
}

impl StatusReport {
    pub fn today_traffic_gb(&self) -> f64 {
        self.network.today_upload_gb + self.network.today_download_gb
    }
}

pub fn bytes_to_gb(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0 / 1024.0
}

pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3600;
    let minutes = (seconds % 3600) / 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}
