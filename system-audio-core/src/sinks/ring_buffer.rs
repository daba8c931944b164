/// Fixed-capacity circular buffer of samples.
///
/// Overflow drops the oldest samples. Not synchronized; wrap in
/// `parking_lot::Mutex` for cross-thread access.
#[derive(Debug)]
pub struct RingBuffer {
    buffer: Vec<f32>,
    head: usize,
    len: usize,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity],
            head: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append samples, evicting the oldest on overflow. Only the last
    /// `capacity` samples of an oversized write are kept.
    pub fn push_slice(&mut self, samples: &[f32]) {
        let capacity = self.capacity();
        if capacity == 0 || samples.is_empty() {
            return;
        }
        let samples = &samples[samples.len().saturating_sub(capacity)..];

        let evicted = (self.len + samples.len()).saturating_sub(capacity);
        self.head = (self.head + evicted) % capacity;
        self.len -= evicted;

        let tail = (self.head + self.len) % capacity;
        let first = samples.len().min(capacity - tail);
        self.buffer[tail..tail + first].copy_from_slice(&samples[..first]);
        self.buffer[..samples.len() - first].copy_from_slice(&samples[first..]);
        self.len += samples.len();
    }

    /// The buffered samples, oldest first, as two contiguous runs.
    fn runs(&self) -> (&[f32], &[f32]) {
        let capacity = self.capacity();
        if self.len == 0 {
            return (&[], &[]);
        }
        let end = self.head + self.len;
        if end <= capacity {
            (&self.buffer[self.head..end], &[])
        } else {
            (&self.buffer[self.head..], &self.buffer[..end - capacity])
        }
    }

    /// Copy of everything buffered, oldest first. Leaves the buffer intact.
    pub fn snapshot(&self) -> Vec<f32> {
        let (a, b) = self.runs();
        let mut out = Vec::with_capacity(a.len() + b.len());
        out.extend_from_slice(a);
        out.extend_from_slice(b);
        out
    }

    /// Remove and return up to `count` of the oldest samples.
    pub fn pop(&mut self, count: usize) -> Vec<f32> {
        let take = count.min(self.len);
        let (a, b) = self.runs();
        let mut out = Vec::with_capacity(take);
        out.extend_from_slice(&a[..take.min(a.len())]);
        out.extend_from_slice(&b[..take - take.min(a.len())]);

        if take > 0 {
            self.head = (self.head + take) % self.capacity();
            self.len -= take;
        }
        out
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_then_snapshot() {
        let mut buf = RingBuffer::new(8);
        buf.push_slice(&[1.0, 2.0, 3.0]);

        assert_eq!(buf.len(), 3);
        assert_eq!(buf.snapshot(), vec![1.0, 2.0, 3.0]);
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn pop_partial_then_rest() {
        let mut buf = RingBuffer::new(10);
        buf.push_slice(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        assert_eq!(buf.pop(3), vec![1.0, 2.0, 3.0]);
        assert_eq!(buf.pop(10), vec![4.0, 5.0]);
        assert!(buf.is_empty());
    }

    #[test]
    fn overflow_evicts_oldest() {
        let mut buf = RingBuffer::new(4);
        buf.push_slice(&[1.0, 2.0, 3.0, 4.0]);
        buf.push_slice(&[5.0, 6.0]);

        assert_eq!(buf.snapshot(), vec![3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn oversized_write_keeps_tail() {
        let mut buf = RingBuffer::new(3);
        buf.push_slice(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        assert_eq!(buf.snapshot(), vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn wraps_across_the_end() {
        let mut buf = RingBuffer::new(4);
        buf.push_slice(&[1.0, 2.0, 3.0]);
        buf.pop(2);
        buf.push_slice(&[4.0, 5.0, 6.0]);

        assert_eq!(buf.len(), 4);
        assert_eq!(buf.pop(4), vec![3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn zero_capacity_ignores_writes() {
        let mut buf = RingBuffer::new(0);
        buf.push_slice(&[1.0]);
        assert!(buf.is_empty());
        assert!(buf.snapshot().is_empty());
        assert!(buf.pop(1).is_empty());
    }

    #[test]
    fn clear_empties() {
        let mut buf = RingBuffer::new(4);
        buf.push_slice(&[1.0, 2.0]);
        buf.clear();
        assert!(buf.is_empty());
        assert!(buf.pop(4).is_empty());
    }
}
