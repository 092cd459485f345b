//! TUI Progress Bridge: GenerationProgress → GenerationEvent channel
//!
//! The generation task cannot touch the terminal; everything goes through
//! the channel and the select! loop applies it to the state.

use super::event::GenerationEvent;
use quiz_application::GenerationProgress;
use quiz_domain::{GenerationState, SkippedBlock};
use tokio::sync::mpsc;

/// Bridge from GenerationProgress callbacks to the generation channel
pub struct TuiProgressBridge {
    tx: mpsc::UnboundedSender<GenerationEvent>,
}

impl TuiProgressBridge {
    pub fn new(tx: mpsc::UnboundedSender<GenerationEvent>) -> Self {
        Self { tx }
    }

    fn emit(&self, event: GenerationEvent) {
        let _ = self.tx.send(event);
    }
}

impl GenerationProgress for TuiProgressBridge {
    fn on_state(&self, state: GenerationState) {
        self.emit(GenerationEvent::State(state));
    }

    fn on_skipped(&self, block: &SkippedBlock) {
        self.emit(GenerationEvent::Skipped(block.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_domain::SkipReason;

    #[test]
    fn test_bridge_forwards_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let bridge = TuiProgressBridge::new(tx);

        bridge.on_state(GenerationState::Requesting);
        bridge.on_skipped(&SkippedBlock {
            block: 3,
            reason: SkipReason::MissingAnswer,
        });

        assert!(matches!(
            rx.try_recv().unwrap(),
            GenerationEvent::State(GenerationState::Requesting)
        ));
        assert!(matches!(
            rx.try_recv().unwrap(),
            GenerationEvent::Skipped(SkippedBlock { block: 3, .. })
        ));
    }

    #[test]
    fn test_closed_channel_is_ignored() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        TuiProgressBridge::new(tx).on_state(GenerationState::Failed);
    }
}
