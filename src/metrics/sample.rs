use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use strum::{Display, EnumIter, IntoEnumIterator};

/// A named metric group with its own history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
pub enum Family {
    #[strum(to_string = "CPU")]
    Cpu,
    #[strum(to_string = "Memory")]
    Memory,
    #[strum(to_string = "Network")]
    Network,
    #[strum(to_string = "Disk")]
    Disk,
}

impl Family {
    pub fn all() -> impl Iterator<Item = Family> {
        Family::iter()
    }

    /// Top-level key of this family in the status payload.
    pub fn payload_key(&self) -> &'static str {
        match self {
            Family::Cpu => "cpu",
            Family::Memory => "memory",
            Family::Network => "network",
            Family::Disk => "disk_io",
        }
    }
}

/// One labeled point in a family's history. Fields are fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    timestamp: DateTime<Local>,
    fields: BTreeMap<String, f64>,
}

impl Sample {
    pub fn new(timestamp: DateTime<Local>, fields: BTreeMap<String, f64>) -> Self {
        Self { timestamp, fields }
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn get(&self, field: &str) -> Option<f64> {
        self.fields.get(field).copied()
    }

    /// `HH:MM:SS` label used on chart x axes.
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }
}
