use crate::metrics::ingestor::IngestedCycle;
use crate::metrics::ring_buffer::RingBuffer;
use crate::metrics::sample::{Family, Sample};
use std::collections::BTreeMap;

/// Point-in-time copy of every family's history, oldest sample first.
pub type HistorySnapshot = BTreeMap<Family, Vec<Sample>>;

/// Rolling history for all metric families. Every family advances by exactly
/// one sample per recorded cycle, so all buffers always hold the same count.
#[derive(Debug, Clone)]
pub struct MetricsStore {
    cpu_history: RingBuffer<Sample>,
    memory_history: RingBuffer<Sample>,
    network_history: RingBuffer<Sample>,
    disk_history: RingBuffer<Sample>,
}

impl MetricsStore {
    pub fn new(history_size: usize) -> Self {
        Self {
            cpu_history: RingBuffer::new(history_size),
            memory_history: RingBuffer::new(history_size),
            network_history: RingBuffer::new(history_size),
            disk_history: RingBuffer::new(history_size),
        }
    }

    pub fn record_cycle(&mut self, cycle: IngestedCycle) {
        self.cpu_history.push(cycle.cpu);
        self.memory_history.push(cycle.memory);
        self.network_history.push(cycle.network);
        self.disk_history.push(cycle.disk);
    }

    pub fn history(&self, family: Family) -> &RingBuffer<Sample> {
        match family {
            Family::Cpu => &self.cpu_history,
            Family::Memory => &self.memory_history,
            Family::Network => &self.network_history,
            Family::Disk => &self.disk_history,
        }
    }

    pub fn snapshot_all(&self) -> HistorySnapshot {
        Family::all()
            .map(|family| (family, self.history(family).snapshot()))
            .collect()
    }

    pub fn clear(&mut self) {
        self.cpu_history.clear();
        self.memory_history.clear();
        self.network_history.clear();
        self.disk_history.clear();
    }

    pub fn capacity(&self) -> usize {
        self.cpu_history.capacity()
    }

    pub fn len(&self) -> usize {
        self.cpu_history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cpu_history.is_empty()
    }
}
