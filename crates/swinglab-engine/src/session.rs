//! Swing recording sessions.
//!
//! A [`SwingSession`] is the aggregate root for one recording: it
//! validates and buffers incoming frames, then finalizes into one
//! immutable [`SwingAnalysis`](crate::SwingAnalysis). The buffer is a
//! bounded ring: when capacity is exceeded the oldest frames are
//! evicted, a documented degradation path for recordings that out-run
//! finalization, not an error.

use crate::analysis::{SwingAnalysis, SwingAnalyzer};
use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};
use swinglab_core::PoseFrame;
use uuid::Uuid;

/// Configuration for session buffering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Frame buffer capacity; one full swing at 30-60 fps fits the
    /// default
    pub buffer_capacity: usize,
    /// Streaming queue capacity between producer and consumer
    pub queue_capacity: usize,
    /// Trailing-window length for incremental reclassification
    pub reclassify_window: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 300,
            queue_capacity: 64,
            reclassify_window: 120,
        }
    }
}

/// Unique identifier for a recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a new unique session ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a session ID from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Accepting frames
    Recording,
    /// Finalized into an analysis; no further frames accepted
    Finalized,
}

/// One swing recording: a validated, bounded frame buffer.
///
/// Ownership is exclusive to the caller that opened the session;
/// independent sessions share no state.
#[derive(Debug)]
pub struct SwingSession {
    id: SessionId,
    config: SessionConfig,
    frames: Vec<PoseFrame>,
    last_index: Option<u64>,
    evicted: u64,
    state: SessionState,
}

impl SwingSession {
    /// Opens a new session.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        let capacity = config.buffer_capacity.max(1);
        Self {
            id: SessionId::new(),
            config,
            frames: Vec::with_capacity(capacity.min(4096)),
            last_index: None,
            evicted: 0,
            state: SessionState::Recording,
        }
    }

    /// Opens a session with default configuration.
    #[must_use]
    pub fn with_default_config() -> Self {
        Self::new(SessionConfig::default())
    }

    /// Session identifier.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Pushes one frame into the session buffer.
    ///
    /// Frame indices must be strictly increasing. When the buffer is
    /// full the oldest frame is evicted.
    ///
    /// # Errors
    ///
    /// - [`EngineError::SessionFinalized`] after finalization.
    /// - [`EngineError::OutOfOrderFrame`] for a non-increasing index;
    ///   the session remains usable and the frame is discarded.
    pub fn push(&mut self, frame: PoseFrame) -> Result<()> {
        if self.state == SessionState::Finalized {
            return Err(EngineError::SessionFinalized);
        }

        if let Some(last) = self.last_index {
            if frame.index <= last {
                return Err(EngineError::OutOfOrderFrame {
                    last,
                    received: frame.index,
                });
            }
        }

        if self.frames.len() >= self.config.buffer_capacity.max(1) {
            self.frames.remove(0);
            self.evicted += 1;
            tracing::warn!(
                session = %self.id,
                evicted_total = self.evicted,
                "frame buffer full, evicting oldest frame"
            );
        }

        self.last_index = Some(frame.index);
        self.frames.push(frame);
        Ok(())
    }

    /// Number of buffered frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Buffer capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.config.buffer_capacity
    }

    /// Number of frames evicted since the session opened.
    #[must_use]
    pub fn evicted_count(&self) -> u64 {
        self.evicted
    }

    /// The most recently buffered frame, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&PoseFrame> {
        self.frames.last()
    }

    /// The buffered frames, oldest first.
    #[must_use]
    pub fn frames(&self) -> &[PoseFrame] {
        &self.frames
    }

    /// Finalizes the session into one immutable analysis.
    ///
    /// The session stops accepting frames; the buffer is retained for
    /// inspection until the session is dropped.
    ///
    /// # Errors
    ///
    /// - [`EngineError::SessionFinalized`] when already finalized.
    /// - [`EngineError::EmptySession`] when no frames were pushed.
    pub fn finalize(&mut self, analyzer: &SwingAnalyzer) -> Result<SwingAnalysis> {
        if self.state == SessionState::Finalized {
            return Err(EngineError::SessionFinalized);
        }
        if self.frames.is_empty() {
            return Err(EngineError::EmptySession);
        }

        self.state = SessionState::Finalized;
        let analysis = analyzer.analyze(&self.frames);
        tracing::debug!(
            session = %self.id,
            analysis = %analysis.id,
            frames = self.frames.len(),
            evicted = self.evicted,
            "session finalized"
        );
        Ok(analysis)
    }

    /// Aborts the session, discarding the buffer and any partial state.
    ///
    /// No partially finalized analysis is ever observable; cancellation
    /// consumes the session.
    pub fn cancel(self) {
        tracing::debug!(session = %self.id, frames = self.frames.len(), "session cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerConfig;

    fn frame(index: u64) -> PoseFrame {
        PoseFrame::new(index, index as f64 * 33.3)
    }

    #[test]
    fn accepts_increasing_indices() {
        let mut session = SwingSession::with_default_config();
        assert!(session.push(frame(0)).is_ok());
        assert!(session.push(frame(1)).is_ok());
        assert!(session.push(frame(5)).is_ok());
        assert_eq!(session.len(), 3);
        assert_eq!(session.latest().unwrap().index, 5);
    }

    #[test]
    fn rejects_out_of_order_frame() {
        let mut session = SwingSession::with_default_config();
        session.push(frame(10)).unwrap();

        let err = session.push(frame(10)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::OutOfOrderFrame { last: 10, received: 10 }
        ));

        // The session stays usable after the rejected push.
        assert!(session.push(frame(11)).is_ok());
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn ring_buffer_evicts_oldest() {
        let mut session = SwingSession::new(SessionConfig {
            buffer_capacity: 3,
            ..SessionConfig::default()
        });
        for i in 0..5 {
            session.push(frame(i)).unwrap();
        }
        assert_eq!(session.len(), 3);
        assert_eq!(session.evicted_count(), 2);
        assert_eq!(session.frames()[0].index, 2);
    }

    #[test]
    fn finalize_empty_session_errors() {
        let analyzer = SwingAnalyzer::new(AnalyzerConfig::default());
        let mut session = SwingSession::with_default_config();
        assert!(matches!(
            session.finalize(&analyzer),
            Err(EngineError::EmptySession)
        ));
    }

    #[test]
    fn finalize_is_terminal() {
        let analyzer = SwingAnalyzer::new(AnalyzerConfig::default());
        let mut session = SwingSession::with_default_config();
        session.push(frame(0)).unwrap();
        session.push(frame(1)).unwrap();

        let analysis = session.finalize(&analyzer).unwrap();
        assert_eq!(analysis.frame_count, 2);
        assert_eq!(session.state(), SessionState::Finalized);

        assert!(matches!(
            session.push(frame(2)),
            Err(EngineError::SessionFinalized)
        ));
        assert!(matches!(
            session.finalize(&analyzer),
            Err(EngineError::SessionFinalized)
        ));
    }

    #[test]
    fn cancel_consumes_session() {
        let mut session = SwingSession::with_default_config();
        session.push(frame(0)).unwrap();
        session.cancel();
        // Session is gone; nothing to observe afterwards.
    }

    #[test]
    fn sessions_are_independent() {
        let mut a = SwingSession::with_default_config();
        let mut b = SwingSession::with_default_config();
        a.push(frame(0)).unwrap();
        b.push(frame(100)).unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
        assert_eq!(b.latest().unwrap().index, 100);
    }
}
