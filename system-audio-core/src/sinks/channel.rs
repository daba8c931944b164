use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};

use crate::models::error::SinkError;
use crate::models::frame::{AudioFrame, OwnedAudioFrame};
use crate::traits::delivery_target::DeliveryTarget;

/// Forwards owned copies of each frame over a bounded channel.
///
/// Never blocks the delivery thread: when the consumer falls `bound`
/// frames behind, frames are rejected with [`SinkError::Full`].
#[derive(Clone)]
pub struct ChannelSink {
    tx: SyncSender<OwnedAudioFrame>,
}

impl ChannelSink {
    pub fn bounded(bound: usize) -> (Self, Receiver<OwnedAudioFrame>) {
        let (tx, rx) = mpsc::sync_channel(bound);
        (Self { tx }, rx)
    }
}

impl DeliveryTarget for ChannelSink {
    fn deliver(&self, frame: &AudioFrame<'_>) -> Result<(), SinkError> {
        self.tx.try_send(frame.to_owned_frame()).map_err(|e| match e {
            TrySendError::Full(_) => SinkError::Full,
            TrySendError::Disconnected(_) => SinkError::Disconnected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwards_copies() {
        let (sink, rx) = ChannelSink::bounded(4);
        let storage = vec![0.25f32, 0.75];
        sink.deliver(&AudioFrame::new(&storage, 48000.0, 2)).unwrap();
        drop(storage);

        let frame = rx.recv().unwrap();
        assert_eq!(frame.samples, vec![0.25, 0.75]);
        assert_eq!(frame.channels, 2);
    }

    #[test]
    fn full_channel_rejects_without_blocking() {
        let (sink, _rx) = ChannelSink::bounded(1);
        sink.deliver(&AudioFrame::empty(48000.0, 2)).unwrap();
        assert_eq!(sink.deliver(&AudioFrame::empty(48000.0, 2)), Err(SinkError::Full));
    }

    #[test]
    fn dropped_receiver_reports_disconnect() {
        let (sink, rx) = ChannelSink::bounded(1);
        drop(rx);
        assert_eq!(
            sink.deliver(&AudioFrame::empty(48000.0, 2)),
            Err(SinkError::Disconnected)
        );
    }

    #[test]
    fn slow_consumer_drops_frames_but_capture_continues() {
        use crate::session::controller::CaptureSession;
        use crate::testing::ScriptedProvider;

        let provider = ScriptedProvider::new();
        let session = CaptureSession::new(provider.clone());
        let (sink, rx) = ChannelSink::bounded(2);
        session.start(sink).unwrap();

        for _ in 0..5 {
            provider.emit(&AudioFrame::new(&[0.0; 4], 48000.0, 2));
        }

        assert!(session.is_capturing());
        assert_eq!(session.diagnostics().frames_rejected_by_sink, 3);
        assert_eq!(rx.try_iter().count(), 2);
        session.stop().unwrap();
    }
}
