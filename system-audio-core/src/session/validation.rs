use thiserror::Error;

use crate::models::config::FrameValidation;
use crate::models::frame::AudioFrame;

/// Why a frame was dropped before reaching the sink.
#[derive(Debug, Error, Clone, PartialEq)]
pub(crate) enum InvalidFrame {
    #[error("frame has zero channels")]
    NoChannels,

    #[error("frame has invalid sample rate {0}")]
    BadSampleRate(f64),

    #[error("{count} samples is not a multiple of {channels} channels")]
    Misaligned { count: usize, channels: u32 },
}

/// Outcome of a frame that may be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Framing {
    Aligned,
    Misaligned,
}

pub(crate) fn check_frame(
    frame: &AudioFrame<'_>,
    mode: FrameValidation,
) -> Result<Framing, InvalidFrame> {
    // Heartbeats carry no samples to misread, whatever their format says.
    if frame.is_empty() {
        return Ok(Framing::Aligned);
    }
    if frame.channels() == 0 {
        return Err(InvalidFrame::NoChannels);
    }
    let rate = frame.sample_rate();
    if !rate.is_finite() || rate <= 0.0 {
        return Err(InvalidFrame::BadSampleRate(rate));
    }
    if frame.is_aligned() {
        return Ok(Framing::Aligned);
    }
    match mode {
        FrameValidation::Lenient => Ok(Framing::Misaligned),
        FrameValidation::Strict => Err(InvalidFrame::Misaligned {
            count: frame.count(),
            channels: frame.channels(),
        }),
    }
}
