use std::collections::VecDeque;

/// Fixed-capacity FIFO history. Oldest entries are evicted first once the
/// buffer is full; the capacity never changes after construction.
#[derive(Debug, Clone)]
pub struct RingBuffer<T: Clone> {
    buffer: VecDeque<T>,
    capacity: usize,
}

impl<T: Clone> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, item: T) {
        self.buffer.push_back(item);
        while self.buffer.len() > self.capacity {
            self.buffer.pop_front();
        }
    }

    /// Owned copy of the current contents, oldest first.
    pub fn snapshot(&self) -> Vec<T> {
        self.buffer.iter().cloned().collect()
    }

    /// Empties the buffer but keeps its allocation.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ring_buffer_basic() {
        let mut buffer = RingBuffer::new(3);
        assert!(buffer.is_empty());
        assert_eq!(buffer.len(), 0);

        buffer.push(1);
        buffer.push(2);
        buffer.push(3);

        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.snapshot(), vec![1, 2, 3]);
    }

    #[test]
    fn test_ring_buffer_overflow() {
        let mut buffer = RingBuffer::new(3);

        buffer.push(1);
        buffer.push(2);
        buffer.push(3);
        buffer.push(4);

        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.snapshot(), vec![2, 3, 4]);

        buffer.push(5);
        buffer.push(6);

        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.snapshot(), vec![4, 5, 6]);
    }

    #[test]
    fn test_long_run_keeps_most_recent_window() {
        let mut buffer = RingBuffer::new(60);
        for i in 0..1000 {
            buffer.push(i);
            assert!(buffer.len() <= buffer.capacity());
        }

        let expected: Vec<i32> = (940..1000).collect();
        assert_eq!(buffer.snapshot(), expected);
    }

    #[test]
    fn test_clear_empties_until_next_push() {
        let mut buffer = RingBuffer::new(2);
        buffer.push("first".to_string());
        buffer.push("second".to_string());
        buffer.push("third".to_string());

        buffer.clear();
        assert!(buffer.snapshot().is_empty());
        assert!(buffer.snapshot().is_empty());
        assert_eq!(buffer.capacity(), 2);

        buffer.push("fourth".to_string());
        assert_eq!(buffer.snapshot(), vec!["fourth".to_string()]);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut buffer = RingBuffer::new(2);
        buffer.push(1);

        let before = buffer.snapshot();
        buffer.push(2);
        buffer.push(3);

        assert_eq!(before, vec![1]);
        assert_eq!(buffer.snapshot(), vec![2, 3]);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut buffer = RingBuffer::new(0);
        buffer.push(7);
        buffer.push(8);
        assert_eq!(buffer.capacity(), 1);
        assert_eq!(buffer.snapshot(), vec![8]);
    }
}
