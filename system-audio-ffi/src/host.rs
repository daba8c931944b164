//! Control surface exported to the host.
//!
//! ```c
//! SessionHandle* session = sac_session_create(vtable);
//! sac_start_capture(session, on_audio);
//! sac_stop_capture(session);
//! sac_session_destroy(session);
//! ```
//!
//! Every function returns `false` (or null) instead of unwinding.

use std::panic::{self, AssertUnwindSafe};

use system_audio_core::{CaptureError, CaptureSession};

use crate::callback_target::CallbackTarget;
use crate::extern_provider::{ExternCaptureProvider, ProviderVTable};
use crate::wire::AudioCallback;

/// One capture session over one backend. Create once, share the pointer.
pub struct SessionHandle {
    session: CaptureSession<ExternCaptureProvider>,
}

impl SessionHandle {
    pub fn new(vtable: ProviderVTable) -> Option<Self> {
        let provider = ExternCaptureProvider::new(vtable, "System Audio")?;
        Some(Self {
            session: CaptureSession::new(provider),
        })
    }

    pub fn session(&self) -> &CaptureSession<ExternCaptureProvider> {
        &self.session
    }

    /// True when the backend armed.
    pub fn start_capture(&self, callback: AudioCallback) -> bool {
        match self.session.start(CallbackTarget::new(callback)) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("start_capture failed: {}", e);
                false
            }
        }
    }

    /// True when the backend disarmed or capture was already stopped.
    /// Capture is stopped on return either way, except when called from
    /// inside the callback.
    pub fn stop_capture(&self) -> bool {
        match self.session.stop() {
            Ok(()) => true,
            Err(CaptureError::StopFromDelivery) => false,
            Err(e) => {
                log::warn!("stop_capture: {}", e);
                false
            }
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.session.is_capturing()
    }
}

fn guard<F: FnOnce() -> bool>(name: &str, f: F) -> bool {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|_| {
        log::error!("panic in {}", name);
        false
    })
}

/// Create a session over `vtable`. Returns null if `arm` or `disarm` is
/// missing.
#[no_mangle]
pub extern "C" fn sac_session_create(vtable: ProviderVTable) -> *mut SessionHandle {
    panic::catch_unwind(AssertUnwindSafe(|| SessionHandle::new(vtable)))
        .ok()
        .flatten()
        .map_or(std::ptr::null_mut(), |handle| Box::into_raw(Box::new(handle)))
}

/// Stop capture if running, release the backend and free the handle.
///
/// # Safety
/// `handle` must come from `sac_session_create` and not be used afterwards.
#[no_mangle]
pub unsafe extern "C" fn sac_session_destroy(handle: *mut SessionHandle) {
    if handle.is_null() {
        return;
    }
    let handle = Box::from_raw(handle);
    guard("sac_session_destroy", move || {
        if let Err(e) = handle.session.stop() {
            log::warn!("session destroyed with a failed stop: {}", e);
        }
        drop(handle);
        true
    });
}

/// # Safety
/// `handle` must be null or a live pointer from `sac_session_create`.
#[no_mangle]
pub unsafe extern "C" fn sac_start_capture(
    handle: *const SessionHandle,
    callback: Option<AudioCallback>,
) -> bool {
    let (Some(handle), Some(callback)) = (handle.as_ref(), callback) else {
        return false;
    };
    guard("sac_start_capture", || handle.start_capture(callback))
}

/// # Safety
/// `handle` must be null or a live pointer from `sac_session_create`.
#[no_mangle]
pub unsafe extern "C" fn sac_stop_capture(handle: *const SessionHandle) -> bool {
    let Some(handle) = handle.as_ref() else {
        return false;
    };
    guard("sac_stop_capture", || handle.stop_capture())
}

/// # Safety
/// `handle` must be null or a live pointer from `sac_session_create`.
#[no_mangle]
pub unsafe extern "C" fn sac_is_capturing(handle: *const SessionHandle) -> bool {
    let Some(handle) = handle.as_ref() else {
        return false;
    };
    guard("sac_is_capturing", || handle.is_capturing())
}
