use serde::{Deserialize, Serialize};

/// One delivery event: a borrowed view of interleaved f32 samples.
///
/// The provider owns the sample storage. The view is only valid for the
/// duration of the relay call that hands it out, which the lifetime `'a`
/// enforces. Sinks that need the samples longer must call
/// [`AudioFrame::to_owned_frame`].
///
/// A frame with zero samples is a valid heartbeat and is always delivered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioFrame<'a> {
    samples: &'a [f32],
    sample_rate: f64,
    channels: u32,
}

impl<'a> AudioFrame<'a> {
    pub fn new(samples: &'a [f32], sample_rate: f64, channels: u32) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    /// A zero-length frame carrying only format information.
    pub fn empty(sample_rate: f64, channels: u32) -> Self {
        Self::new(&[], sample_rate, channels)
    }

    /// Interleaved samples `[c0, c1, .., c0, c1, ..]`.
    pub fn samples(&self) -> &'a [f32] {
        self.samples
    }

    pub fn count(&self) -> usize {
        self.samples.len()
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn channels(&self) -> u32 {
        self.channels
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of frames per channel. Zero when `channels` is zero.
    pub fn frames_per_channel(&self) -> usize {
        match self.channels {
            0 => 0,
            c => self.samples.len() / c as usize,
        }
    }

    /// Whether the sample count is a whole number of channel blocks.
    pub fn is_aligned(&self) -> bool {
        self.channels != 0 && self.samples.len() % self.channels as usize == 0
    }

    /// Copy the samples out of the provider's storage.
    pub fn to_owned_frame(&self) -> OwnedAudioFrame {
        OwnedAudioFrame {
            samples: self.samples.to_vec(),
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }
}

/// A frame whose samples were copied out of a delivery call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnedAudioFrame {
    pub samples: Vec<f32>,
    pub sample_rate: f64,
    pub channels: u32,
}

impl OwnedAudioFrame {
    /// Borrow this frame as a view, e.g. to hand it to a provider relay.
    pub fn as_frame(&self) -> AudioFrame<'_> {
        AudioFrame::new(&self.samples, self.sample_rate, self.channels)
    }

    pub fn count(&self) -> usize {
        self.samples.len()
    }
}

/// Sample rate and channel count of a stream, without samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameFormat {
    pub sample_rate: f64,
    pub channels: u32,
}

impl From<&AudioFrame<'_>> for FrameFormat {
    fn from(frame: &AudioFrame<'_>) -> Self {
        Self {
            sample_rate: frame.sample_rate,
            channels: frame.channels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stereo_block_accessors() {
        let samples = vec![0.25f32; 960];
        let frame = AudioFrame::new(&samples, 48000.0, 2);

        assert_eq!(frame.count(), 960);
        assert_eq!(frame.frames_per_channel(), 480);
        assert!(frame.is_aligned());
        assert!(!frame.is_empty());
    }

    #[test]
    fn empty_frame_is_aligned_heartbeat() {
        let frame = AudioFrame::empty(44100.0, 2);
        assert!(frame.is_empty());
        assert_eq!(frame.count(), 0);
        assert!(frame.is_aligned());
        assert_eq!(frame.frames_per_channel(), 0);
    }

    #[test]
    fn zero_channels_never_aligned() {
        let frame = AudioFrame::new(&[0.0, 0.0], 48000.0, 0);
        assert!(!frame.is_aligned());
        assert_eq!(frame.frames_per_channel(), 0);
    }

    #[test]
    fn odd_count_is_misaligned() {
        let samples = [0.1, 0.2, 0.3];
        let frame = AudioFrame::new(&samples, 48000.0, 2);
        assert!(!frame.is_aligned());
        assert_eq!(frame.frames_per_channel(), 1);
    }

    #[test]
    fn owned_copy_outlives_storage() {
        let owned = {
            let storage = vec![0.5f32, -0.5];
            AudioFrame::new(&storage, 48000.0, 1).to_owned_frame()
        };
        assert_eq!(owned.samples, vec![0.5, -0.5]);
        assert_eq!(owned.as_frame().channels(), 1);
        assert_eq!(owned.count(), 2);
    }
}
