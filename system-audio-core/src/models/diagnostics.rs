use serde::Serialize;

/// Counters for debugging a capture session.
///
/// Counters accumulate across capture spans; `capture_id` and `started_at`
/// describe the most recent span.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionDiagnostics {
    pub capture_id: Option<String>,
    pub started_at: Option<String>,
    pub sessions_started: u64,
    pub frames_delivered: u64,
    pub samples_delivered: u64,
    pub empty_frames: u64,
    pub frames_rejected_by_sink: u64,
    pub frames_invalid: u64,
    pub frames_misaligned: u64,
    pub frames_suppressed: u64,
    pub slow_deliveries: u64,
    pub last_error: Option<String>,
}
