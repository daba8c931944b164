use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::error::SinkError;
use crate::models::frame::{AudioFrame, FrameFormat};
use crate::sinks::ring_buffer::RingBuffer;
use crate::traits::delivery_target::DeliveryTarget;

struct Rolling {
    ring: RingBuffer,
    last_format: Option<FrameFormat>,
}

/// Keeps the most recent samples delivered, dropping the oldest.
///
/// Clones share the same buffer: hand one clone to the session and read
/// from another.
#[derive(Clone)]
pub struct RollingBufferSink {
    inner: Arc<Mutex<Rolling>>,
}

impl RollingBufferSink {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Rolling {
                ring: RingBuffer::new(capacity),
                last_format: None,
            })),
        }
    }

    /// Capacity for `seconds` of interleaved audio at the given format.
    pub fn with_seconds(seconds: f64, sample_rate: f64, channels: u32) -> Self {
        let capacity = (seconds * sample_rate).max(0.0) as usize * channels as usize;
        Self::new(capacity)
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().ring.capacity()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().ring.is_empty()
    }

    /// Copy of the buffered samples, oldest first.
    pub fn snapshot(&self) -> Vec<f32> {
        self.inner.lock().ring.snapshot()
    }

    /// Remove and return everything buffered.
    pub fn drain(&self) -> Vec<f32> {
        let mut inner = self.inner.lock();
        let len = inner.ring.len();
        inner.ring.pop(len)
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.ring.clear();
        inner.last_format = None;
    }

    /// Format of the most recently delivered frame.
    pub fn last_format(&self) -> Option<FrameFormat> {
        self.inner.lock().last_format
    }
}

impl DeliveryTarget for RollingBufferSink {
    fn deliver(&self, frame: &AudioFrame<'_>) -> Result<(), SinkError> {
        let mut inner = self.inner.lock();
        let format = FrameFormat::from(frame);
        if let Some(previous) = inner.last_format {
            if previous != format {
                log::debug!(
                    "rolling buffer format changed: {} Hz x{} -> {} Hz x{}",
                    previous.sample_rate,
                    previous.channels,
                    format.sample_rate,
                    format.channels
                );
            }
        }
        inner.last_format = Some(format);
        inner.ring.push_slice(frame.samples());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_latest_samples() {
        let sink = RollingBufferSink::new(4);
        sink.deliver(&AudioFrame::new(&[1.0, 2.0, 3.0], 48000.0, 1)).unwrap();
        sink.deliver(&AudioFrame::new(&[4.0, 5.0], 48000.0, 1)).unwrap();

        assert_eq!(sink.snapshot(), vec![2.0, 3.0, 4.0, 5.0]);
        assert_eq!(sink.len(), 4);
    }

    #[test]
    fn clones_share_buffer() {
        let sink = RollingBufferSink::new(8);
        let reader = sink.clone();
        sink.deliver(&AudioFrame::new(&[0.5, -0.5], 44100.0, 2)).unwrap();

        assert_eq!(reader.drain(), vec![0.5, -0.5]);
        assert!(sink.is_empty());
        let format = reader.last_format().unwrap();
        assert_eq!(format.channels, 2);
    }

    #[test]
    fn empty_frame_updates_format_only() {
        let sink = RollingBufferSink::new(8);
        sink.deliver(&AudioFrame::empty(44100.0, 2)).unwrap();
        assert!(sink.is_empty());
        assert!(sink.last_format().is_some());

        sink.clear();
        assert!(sink.last_format().is_none());
    }

    #[test]
    fn capacity_from_seconds() {
        let sink = RollingBufferSink::with_seconds(5.0, 44100.0, 2);
        assert_eq!(sink.capacity(), 441_000);
    }
}
