//! # system-audio-ffi
//!
//! C boundary for `system-audio-core`.
//!
//! Provides:
//! - `AudioData`: `#[repr(C)]` frame layout shared with native code
//! - `ExternCaptureProvider`: drives a native capture backend through a `ProviderVTable`
//! - `CallbackTarget`: delivers frames to a host `extern "C"` callback
//! - `sac_*` exports: host control surface (`startCapture`, `stopCapture`, `isCapturing`)
//!
//! The matching declarations live in `include/system_audio.h`.
//!
//! ## Usage
//! ```ignore
//! use system_audio_ffi::{ProviderVTable, SessionHandle};
//!
//! let handle = SessionHandle::new(vtable).unwrap();
//! handle.start_capture(on_audio);
//! handle.stop_capture();
//! ```

pub mod callback_target;
pub mod extern_provider;
pub mod host;
pub mod wire;

pub use callback_target::CallbackTarget;
pub use extern_provider::{ExternCaptureProvider, ProviderVTable, RelayFn};
pub use host::SessionHandle;
pub use wire::{AudioCallback, AudioData, WireError};
