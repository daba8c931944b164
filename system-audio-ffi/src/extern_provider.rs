//! `CaptureProvider` backed by a C function table.
//!
//! The backend receives a relay function and an opaque relay context when
//! armed, and calls `relay(relay_context, data)` for every frame until it
//! acknowledges disarm.
//!
//! Backend contract:
//! - `arm` returning false keeps no reference to the relay context.
//! - `disarm` returns true only after every relay call it has started has
//!   returned. The relay context is freed as soon as it does.
//! - After a failed `disarm` the context stays valid until `release`.

use std::ffi::c_void;
use std::panic::{self, AssertUnwindSafe};

use system_audio_core::{CaptureError, CaptureProvider, FrameRelay, ProviderInfo};

use crate::wire::AudioData;

/// Frame entry point handed to the backend. Valid with its context from a
/// successful `arm` until `disarm` succeeds.
pub type RelayFn = extern "C" fn(relay_context: *const c_void, data: AudioData);

/// Backend operations, supplied by the host. `arm` and `disarm` are required.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ProviderVTable {
    /// Passed back to every backend call.
    pub context: *mut c_void,
    /// Start producing frames into `relay`. Returns true once running; on
    /// false the backend must not keep `relay_context`.
    pub arm: Option<ArmFn>,
    /// Stop producing frames. Must not return true while any relay call is
    /// still in progress, nor make relay calls afterwards.
    pub disarm: Option<extern "C" fn(context: *mut c_void) -> bool>,
    pub is_available: Option<extern "C" fn(context: *mut c_void) -> bool>,
    /// Called once when the provider is dropped. After it returns the
    /// backend must never call a relay again.
    pub release: Option<extern "C" fn(context: *mut c_void)>,
}

/// Backend `arm` entry point.
pub type ArmFn =
    extern "C" fn(context: *mut c_void, relay: RelayFn, relay_context: *const c_void) -> bool;
type DisarmFn = extern "C" fn(*mut c_void) -> bool;

pub struct ExternCaptureProvider {
    context: *mut c_void,
    arm: ArmFn,
    disarm: DisarmFn,
    is_available: Option<extern "C" fn(*mut c_void) -> bool>,
    release: Option<extern "C" fn(*mut c_void)>,
    name: String,
    armed: Option<Box<FrameRelay>>,
    // Relays of a backend that failed to disarm and may still call them.
    orphaned: Vec<Box<FrameRelay>>,
}

// SAFETY: the backend context is only touched through the vtable, which the
// host guarantees may be called from any thread.
unsafe impl Send for ExternCaptureProvider {}

impl ExternCaptureProvider {
    /// Returns `None` when `arm` or `disarm` is missing.
    pub fn new(vtable: ProviderVTable, name: impl Into<String>) -> Option<Self> {
        Some(Self {
            context: vtable.context,
            arm: vtable.arm?,
            disarm: vtable.disarm?,
            is_available: vtable.is_available,
            release: vtable.release,
            name: name.into(),
            armed: None,
            orphaned: Vec::new(),
        })
    }
}

impl CaptureProvider for ExternCaptureProvider {
    fn is_available(&self) -> bool {
        self.is_available.map_or(true, |f| f(self.context))
    }

    fn start(&mut self, relay: FrameRelay) -> Result<(), CaptureError> {
        if self.armed.is_some() {
            return Err(CaptureError::ConfigurationFailed("backend already armed".into()));
        }

        let relay = Box::new(relay);
        let relay_context = &*relay as *const FrameRelay as *const c_void;

        if (self.arm)(self.context, relay_trampoline, relay_context) {
            self.armed = Some(relay);
            Ok(())
        } else {
            drop(relay);
            Err(CaptureError::DeviceNotAvailable)
        }
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        let Some(relay) = self.armed.take() else {
            return Ok(());
        };

        // The backend has drained its relay calls when this returns true.
        if (self.disarm)(self.context) {
            drop(relay);
            Ok(())
        } else {
            self.orphaned.push(relay);
            Err(CaptureError::Unknown("backend refused to disarm".into()))
        }
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            id: "extern".into(),
            name: self.name.clone(),
        }
    }
}

impl Drop for ExternCaptureProvider {
    fn drop(&mut self) {
        if let Some(relay) = self.armed.take() {
            if !(self.disarm)(self.context) {
                self.orphaned.push(relay);
            }
        }

        match self.release {
            Some(release) => release(self.context),
            None if !self.orphaned.is_empty() => {
                // Without a release hook the backend may still call these.
                log::warn!(
                    "leaking {} relay contexts of a backend that did not disarm",
                    self.orphaned.len()
                );
                for relay in self.orphaned.drain(..) {
                    std::mem::forget(relay);
                }
            }
            None => {}
        }
    }
}

extern "C" fn relay_trampoline(relay_context: *const c_void, data: AudioData) {
    if relay_context.is_null() {
        return;
    }
    // SAFETY: relay_context came from `start` and its box outlives every
    // call the backend is allowed to make.
    let relay = unsafe { &*(relay_context as *const FrameRelay) };

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        // SAFETY: the backend guarantees `data` is valid for this call.
        match unsafe { data.as_frame() } {
            Ok(frame) => relay.deliver(&frame),
            Err(e) => log::warn!("dropping frame from backend: {}", e),
        }
    }));
    if outcome.is_err() {
        log::error!("panic while relaying backend frame");
    }
}

#[cfg(test)]
mod tests {
    use std::ptr;

    use super::*;

    extern "C" fn refuse_arm(_: *mut c_void, _: RelayFn, _: *const c_void) -> bool {
        false
    }

    extern "C" fn accept_arm(_: *mut c_void, _: RelayFn, _: *const c_void) -> bool {
        true
    }

    extern "C" fn accept_disarm(_: *mut c_void) -> bool {
        true
    }

    extern "C" fn refuse_disarm(_: *mut c_void) -> bool {
        false
    }

    fn provider(arm: ArmFn, disarm: DisarmFn) -> ExternCaptureProvider {
        let vtable = ProviderVTable {
            context: ptr::null_mut(),
            arm: Some(arm),
            disarm: Some(disarm),
            is_available: None,
            release: None,
        };
        ExternCaptureProvider::new(vtable, "test").unwrap()
    }

    #[test]
    fn repeated_failed_arms_keep_nothing() {
        let mut provider = provider(refuse_arm, accept_disarm);
        for _ in 0..100 {
            let result = provider.start(FrameRelay::detached());
            assert!(matches!(result, Err(CaptureError::DeviceNotAvailable)));
        }
        assert!(provider.armed.is_none());
        assert!(provider.orphaned.is_empty());
    }

    #[test]
    fn successful_disarm_frees_the_relay() {
        let mut provider = provider(accept_arm, accept_disarm);
        provider.start(FrameRelay::detached()).unwrap();
        assert!(provider.armed.is_some());

        provider.stop().unwrap();
        assert!(provider.armed.is_none());
        assert!(provider.orphaned.is_empty());
    }

    #[test]
    fn failed_disarm_keeps_the_relay_alive() {
        let mut provider = provider(accept_arm, refuse_disarm);
        provider.start(FrameRelay::detached()).unwrap();

        assert!(provider.stop().is_err());
        assert_eq!(provider.orphaned.len(), 1);
        // Drop without a release hook leaks the relay instead of freeing it.
    }

    #[test]
    fn missing_disarm_is_rejected() {
        let vtable = ProviderVTable {
            context: ptr::null_mut(),
            arm: Some(accept_arm),
            disarm: None,
            is_available: None,
            release: None,
        };
        assert!(ExternCaptureProvider::new(vtable, "test").is_none());
    }
}
