use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::config::SessionConfig;
use crate::models::diagnostics::SessionDiagnostics;
use crate::models::error::CaptureError;
use crate::models::state::SessionState;
use crate::session::relay::{DeliveryPath, FrameRelay};
use crate::traits::capture_provider::{CaptureProvider, ProviderInfo};
use crate::traits::delivery_target::DeliveryTarget;
use crate::traits::session_observer::SessionObserver;

/// Owns one capture resource and its lifecycle.
///
/// Construct once at startup and share by reference (or `Arc`) with every
/// caller. Control operations are serialized by the lock around the
/// provider; `is_capturing`, `state` and `diagnostics` never take it.
/// A delivery target may call those three, but not `start`, `provider_info`
/// or `is_provider_available`, which wait on a `stop` that is draining it.
/// `stop` from a target is refused with `StopFromDelivery`.
///
/// ```text
/// host ── start(target) ──▶ CaptureSession ── start(relay) ──▶ provider
///                                 ▲                               │
///  target ◀── deliver(&frame) ── relay ◀──── deliver(&frame) ─────┘
/// ```
pub struct CaptureSession<P: CaptureProvider> {
    provider: Mutex<P>,
    path: Arc<DeliveryPath>,
}

impl<P: CaptureProvider> CaptureSession<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider: Mutex::new(provider),
            path: Arc::new(DeliveryPath::new(SessionConfig::default())),
        }
    }

    pub fn with_config(provider: P, config: SessionConfig) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::ConfigurationFailed)?;
        Ok(Self {
            provider: Mutex::new(provider),
            path: Arc::new(DeliveryPath::new(config)),
        })
    }

    pub fn set_observer(&self, observer: Arc<dyn SessionObserver>) {
        *self.path.observer.write() = Some(observer);
    }

    pub fn config(&self) -> &SessionConfig {
        self.path.config()
    }

    pub fn state(&self) -> SessionState {
        self.path.state()
    }

    /// Point-in-time snapshot; may be stale as soon as it returns.
    pub fn is_capturing(&self) -> bool {
        self.path.state().is_capturing()
    }

    pub fn diagnostics(&self) -> SessionDiagnostics {
        self.path.diagnostics()
    }

    pub fn is_provider_available(&self) -> bool {
        self.provider.lock().is_available()
    }

    pub fn provider_info(&self) -> ProviderInfo {
        self.provider.lock().info()
    }

    /// Register `target` and arm the provider. Transitions: idle → starting → capturing.
    pub fn start<T: DeliveryTarget + 'static>(&self, target: T) -> Result<(), CaptureError> {
        self.start_shared(Arc::new(target))
    }

    /// Like [`start`](Self::start) for a target the caller keeps a handle to.
    pub fn start_shared(&self, target: Arc<dyn DeliveryTarget>) -> Result<(), CaptureError> {
        if !self.path.state().is_idle() {
            log::debug!("start rejected: session is {}", self.path.state());
            return Err(CaptureError::AlreadyCapturing);
        }

        let mut provider = self.provider.lock();
        if !self.path.transition(SessionState::Idle, SessionState::Starting) {
            log::debug!("start rejected: session is {}", self.path.state());
            return Err(CaptureError::AlreadyCapturing);
        }

        *self.path.target.write() = Some(target);

        if let Err(e) = provider.start(FrameRelay::new(Arc::clone(&self.path))) {
            // Leave starting before draining so late frames are suppressed.
            self.path.set_state(SessionState::Idle);
            let stale = self.path.target.write().take();
            drop(stale);

            log::warn!("provider {} failed to arm: {}", provider.info().id, e);
            self.path.span.lock().last_error = Some(e.to_string());
            if let Some(observer) = self.path.observer.read().as_ref() {
                observer.on_provider_error(&e);
            }
            return Err(CaptureError::ProviderStartFailed(e.to_string()));
        }

        let capture_id = uuid::Uuid::new_v4().to_string();
        {
            let mut span = self.path.span.lock();
            span.capture_id = Some(capture_id.clone());
            span.started_at = Some(chrono::Utc::now().to_rfc3339());
            span.sessions_started += 1;
        }
        self.path.set_state(SessionState::Capturing);
        log::info!("capture {} started on {}", capture_id, provider.info().id);
        Ok(())
    }

    /// Disarm the provider, drain in-flight deliveries and drop the target.
    /// Transitions: capturing → stopping → idle.
    ///
    /// A no-op returning `Ok` when not capturing. The session always ends
    /// idle, even when the provider fails to disarm.
    pub fn stop(&self) -> Result<(), CaptureError> {
        if self.path.is_delivering_on_current_thread() {
            log::warn!("stop called from inside a delivery call; ignoring");
            return Err(CaptureError::StopFromDelivery);
        }

        let mut provider = self.provider.lock();
        if !self.path.transition(SessionState::Capturing, SessionState::Stopping) {
            log::debug!("stop ignored: session is {}", self.path.state());
            return Ok(());
        }

        let disarmed = provider.stop();

        // Waits for every relay currently inside the target.
        let target = self.path.target.write().take();
        drop(target);

        self.path.set_state(SessionState::Idle);

        let capture_id = self.path.span.lock().capture_id.clone().unwrap_or_default();
        match disarmed {
            Ok(()) => {
                log::info!("capture {} stopped", capture_id);
                Ok(())
            }
            Err(e) => {
                log::warn!("capture {} stopped, but provider failed to disarm: {}", capture_id, e);
                self.path.span.lock().last_error = Some(e.to_string());
                if let Some(observer) = self.path.observer.read().as_ref() {
                    observer.on_provider_error(&e);
                }
                Err(CaptureError::ProviderStopFailed(e.to_string()))
            }
        }
    }

    /// Explicit teardown: stop if capturing and release the provider.
    pub fn shutdown(self) -> Result<(), CaptureError> {
        self.stop()
    }
}

impl<P: CaptureProvider> Drop for CaptureSession<P> {
    fn drop(&mut self) {
        if self.path.state().is_idle() {
            return;
        }
        if let Err(e) = self.stop() {
            log::warn!("capture session dropped while capturing: {}", e);
        }
    }
}
