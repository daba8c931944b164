//! `#[repr(C)]` layout of a frame as it crosses the C boundary.
//!
//! Must match `include/system_audio.h` field for field:
//!
//! ```c
//! typedef struct {
//!     const float* samples;
//!     uint32_t count;
//!     double sampleRate;
//!     uint32_t channels;
//! } AudioData;
//! ```

use std::ptr;
use std::slice;

use thiserror::Error;

use system_audio_core::AudioFrame;

/// C-compatible frame. Valid only for the duration of the call it is passed to.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct AudioData {
    pub samples: *const f32,
    pub count: u32,
    pub sample_rate: f64,
    pub channels: u32,
}

/// Host delivery callback. Receives each frame by value; the sample
/// pointer must not be kept after it returns.
pub type AudioCallback = extern "C" fn(AudioData);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("null sample pointer with {0} samples")]
    NullSamples(u32),

    #[error("{0} samples do not fit in a u32 count")]
    TooManySamples(usize),
}

impl AudioData {
    /// Describe `frame` without copying. An empty frame is sent with a null
    /// pointer.
    pub fn from_frame(frame: &AudioFrame<'_>) -> Result<Self, WireError> {
        let count = u32::try_from(frame.count())
            .map_err(|_| WireError::TooManySamples(frame.count()))?;
        let samples = if count == 0 {
            ptr::null()
        } else {
            frame.samples().as_ptr()
        };
        Ok(Self {
            samples,
            count,
            sample_rate: frame.sample_rate(),
            channels: frame.channels(),
        })
    }

    /// Borrow the samples as a frame.
    ///
    /// # Safety
    /// When `count > 0`, `samples` must point to `count` initialized `f32`
    /// values that stay valid and unmodified for `'a`.
    pub unsafe fn as_frame<'a>(&self) -> Result<AudioFrame<'a>, WireError> {
        let samples: &'a [f32] = match (self.samples.is_null(), self.count) {
            (_, 0) => &[],
            (true, n) => return Err(WireError::NullSamples(n)),
            (false, n) => slice::from_raw_parts(self.samples, n as usize),
        };
        Ok(AudioFrame::new(samples, self.sample_rate, self.channels))
    }
}
