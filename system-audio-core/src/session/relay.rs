use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};

use crate::models::config::SessionConfig;
use crate::models::diagnostics::SessionDiagnostics;
use crate::models::error::SinkError;
use crate::models::frame::AudioFrame;
use crate::models::state::SessionState;
use crate::session::validation::{check_frame, Framing};
use crate::traits::delivery_target::DeliveryTarget;
use crate::traits::session_observer::SessionObserver;

thread_local! {
    /// Address of the delivery path this thread is currently relaying for.
    static DELIVERING: Cell<usize> = const { Cell::new(0) };
}

/// Marks the current thread as inside a delivery call until dropped.
struct DeliveryMarker {
    previous: usize,
}

impl DeliveryMarker {
    fn enter(path: &DeliveryPath) -> Self {
        let previous = DELIVERING.with(|d| d.replace(path.id()));
        Self { previous }
    }
}

impl Drop for DeliveryMarker {
    fn drop(&mut self) {
        DELIVERING.with(|d| d.set(self.previous));
    }
}

#[derive(Default)]
struct DeliveryCounters {
    frames_delivered: AtomicU64,
    samples_delivered: AtomicU64,
    empty_frames: AtomicU64,
    frames_rejected_by_sink: AtomicU64,
    frames_invalid: AtomicU64,
    frames_misaligned: AtomicU64,
    frames_suppressed: AtomicU64,
    slow_deliveries: AtomicU64,
}

fn bump(counter: &AtomicU64) -> u64 {
    counter.fetch_add(1, Ordering::Relaxed) + 1
}

/// Span bookkeeping written only by control operations.
#[derive(Default)]
pub(crate) struct SpanRecord {
    pub capture_id: Option<String>,
    pub started_at: Option<String>,
    pub sessions_started: u64,
    pub last_error: Option<String>,
}

/// State shared between the control side of a session and its relays.
///
/// `state` is written only while the session's control lock is held.
/// `target` is replaced only under its write lock, which is what drains
/// in-flight deliveries.
pub(crate) struct DeliveryPath {
    state: AtomicU8,
    pub(crate) target: RwLock<Option<Arc<dyn DeliveryTarget>>>,
    pub(crate) observer: RwLock<Option<Arc<dyn SessionObserver>>>,
    pub(crate) span: Mutex<SpanRecord>,
    config: SessionConfig,
    counters: DeliveryCounters,
}

impl DeliveryPath {
    pub(crate) fn new(config: SessionConfig) -> Self {
        Self {
            state: AtomicU8::new(SessionState::Idle as u8),
            target: RwLock::new(None),
            observer: RwLock::new(None),
            span: Mutex::new(SpanRecord::default()),
            config,
            counters: DeliveryCounters::default(),
        }
    }

    fn id(&self) -> usize {
        self as *const Self as usize
    }

    pub(crate) fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Caller must hold the session's control lock.
    pub(crate) fn set_state(&self, new_state: SessionState) {
        self.state.store(new_state as u8, Ordering::SeqCst);
        if let Some(observer) = self.observer.read().as_ref() {
            observer.on_state_changed(new_state);
        }
    }

    /// Atomically move `from → to`. Returns false and changes nothing if the
    /// current state is not `from`.
    pub(crate) fn transition(&self, from: SessionState, to: SessionState) -> bool {
        let moved = self
            .state
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if moved {
            if let Some(observer) = self.observer.read().as_ref() {
                observer.on_state_changed(to);
            }
        }
        moved
    }

    pub(crate) fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub(crate) fn is_delivering_on_current_thread(&self) -> bool {
        DELIVERING.with(|d| d.get() == self.id())
    }

    pub(crate) fn diagnostics(&self) -> SessionDiagnostics {
        let c = &self.counters;
        let span = self.span.lock();
        SessionDiagnostics {
            capture_id: span.capture_id.clone(),
            started_at: span.started_at.clone(),
            sessions_started: span.sessions_started,
            frames_delivered: c.frames_delivered.load(Ordering::Relaxed),
            samples_delivered: c.samples_delivered.load(Ordering::Relaxed),
            empty_frames: c.empty_frames.load(Ordering::Relaxed),
            frames_rejected_by_sink: c.frames_rejected_by_sink.load(Ordering::Relaxed),
            frames_invalid: c.frames_invalid.load(Ordering::Relaxed),
            frames_misaligned: c.frames_misaligned.load(Ordering::Relaxed),
            frames_suppressed: c.frames_suppressed.load(Ordering::Relaxed),
            slow_deliveries: c.slow_deliveries.load(Ordering::Relaxed),
            last_error: span.last_error.clone(),
        }
    }

    fn relay(&self, frame: &AudioFrame<'_>) {
        if !self.state().is_capturing() {
            let n = bump(&self.counters.frames_suppressed);
            log::trace!("frame suppressed outside capture ({} total)", n);
            return;
        }

        let framing = match check_frame(frame, self.config.frame_validation) {
            Ok(framing) => framing,
            Err(reason) => {
                let n = bump(&self.counters.frames_invalid);
                if n.is_power_of_two() {
                    log::warn!("dropping malformed frame: {} ({} so far)", reason, n);
                }
                return;
            }
        };

        let guard = self.target.read();
        // Re-check under the lock: stop() flips the state before draining.
        let target = match guard.as_ref() {
            Some(target) if self.state().is_capturing() => target,
            _ => {
                bump(&self.counters.frames_suppressed);
                return;
            }
        };

        if framing == Framing::Misaligned {
            let n = bump(&self.counters.frames_misaligned);
            if n.is_power_of_two() {
                log::warn!(
                    "delivering misaligned frame: {} samples, {} channels ({} so far)",
                    frame.count(),
                    frame.channels(),
                    n
                );
            }
        }

        let _marker = DeliveryMarker::enter(self);
        let started = Instant::now();
        let result = panic::catch_unwind(AssertUnwindSafe(|| target.deliver(frame)))
            .unwrap_or_else(|_| {
                log::error!("delivery target panicked; frame dropped");
                Err(SinkError::Rejected("delivery target panicked".into()))
            });
        let elapsed = started.elapsed();

        if let Some(threshold) = self.config.slow_delivery_threshold() {
            if elapsed > threshold {
                let n = bump(&self.counters.slow_deliveries);
                log::warn!(
                    "delivery target took {:?} (threshold {:?}, {} slow so far)",
                    elapsed,
                    threshold,
                    n
                );
            }
        }

        match result {
            Ok(()) => {
                bump(&self.counters.frames_delivered);
                self.counters
                    .samples_delivered
                    .fetch_add(frame.count() as u64, Ordering::Relaxed);
                if frame.is_empty() {
                    bump(&self.counters.empty_frames);
                }
            }
            Err(e) => {
                let n = bump(&self.counters.frames_rejected_by_sink);
                if n.is_power_of_two() {
                    log::warn!("delivery target rejected frame: {} ({} so far)", e, n);
                }
                if let Some(observer) = self.observer.read().as_ref() {
                    observer.on_sink_error(&e);
                }
            }
        }
    }
}

/// Handle a provider uses to push frames into its session.
///
/// Cheap to clone and safe to call from any thread. Frames are forwarded
/// synchronously to the registered target only while the session is
/// capturing; calls at any other time, including after the session is
/// dropped, are counted and ignored.
#[derive(Clone)]
pub struct FrameRelay {
    path: Arc<DeliveryPath>,
}

impl FrameRelay {
    pub(crate) fn new(path: Arc<DeliveryPath>) -> Self {
        Self { path }
    }

    /// A relay attached to no session. Every frame it is given is dropped.
    pub fn detached() -> Self {
        Self::new(Arc::new(DeliveryPath::new(SessionConfig::default())))
    }

    /// Forward one frame. Returns once the target has handled it.
    pub fn deliver(&self, frame: &AudioFrame<'_>) {
        self.path.relay(frame);
    }

    /// Shorthand for `deliver(&AudioFrame::new(..))`.
    pub fn deliver_samples(&self, samples: &[f32], sample_rate: f64, channels: u32) {
        self.path.relay(&AudioFrame::new(samples, sample_rate, channels));
    }

    /// Whether frames delivered now would reach the target.
    pub fn is_active(&self) -> bool {
        self.path.state().is_capturing()
    }
}

impl std::fmt::Debug for FrameRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameRelay")
            .field("state", &self.path.state())
            .finish()
    }
}
