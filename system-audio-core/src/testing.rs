//! In-memory provider and sink used by the unit tests.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::error::{CaptureError, SinkError};
use crate::models::frame::{AudioFrame, OwnedAudioFrame};
use crate::traits::capture_provider::{CaptureProvider, FrameRelay, ProviderInfo};
use crate::traits::delivery_target::DeliveryTarget;

#[derive(Default)]
struct Script {
    relay: Option<FrameRelay>,
    fail_start: bool,
    fail_stop: bool,
    starts: u32,
    stops: u32,
}

/// Provider whose frames are pushed by the test via `emit`.
///
/// Clones share one script, so a test can keep a handle after moving the
/// provider into a session. The last relay is kept after `stop` so tests can
/// simulate a backend that emits late.
#[derive(Clone, Default)]
pub(crate) struct ScriptedProvider {
    script: Arc<Mutex<Script>>,
}

impl ScriptedProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn emit(&self, frame: &AudioFrame<'_>) {
        let relay = self.script.lock().relay.clone();
        if let Some(relay) = relay {
            relay.deliver(frame);
        }
    }

    pub(crate) fn fail_next_start(&self) {
        self.script.lock().fail_start = true;
    }

    pub(crate) fn fail_next_stop(&self) {
        self.script.lock().fail_stop = true;
    }

    pub(crate) fn starts(&self) -> u32 {
        self.script.lock().starts
    }

    pub(crate) fn stops(&self) -> u32 {
        self.script.lock().stops
    }
}

impl CaptureProvider for ScriptedProvider {
    fn is_available(&self) -> bool {
        true
    }

    fn start(&mut self, relay: FrameRelay) -> Result<(), CaptureError> {
        let mut script = self.script.lock();
        script.relay = Some(relay);
        if std::mem::take(&mut script.fail_start) {
            return Err(CaptureError::DeviceNotAvailable);
        }
        script.starts += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        let mut script = self.script.lock();
        script.stops += 1;
        if std::mem::take(&mut script.fail_stop) {
            return Err(CaptureError::Unknown("stream refused to stop".into()));
        }
        Ok(())
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            id: "scripted".into(),
            name: "Scripted Test Provider".into(),
        }
    }
}

/// Sink that copies every frame it receives.
#[derive(Clone, Default)]
pub(crate) struct RecordingSink {
    frames: Arc<Mutex<Vec<OwnedAudioFrame>>>,
}

impl RecordingSink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn frames(&self) -> Vec<OwnedAudioFrame> {
        self.frames.lock().clone()
    }
}

impl DeliveryTarget for RecordingSink {
    fn deliver(&self, frame: &AudioFrame<'_>) -> Result<(), SinkError> {
        self.frames.lock().push(frame.to_owned_frame());
        Ok(())
    }
}
