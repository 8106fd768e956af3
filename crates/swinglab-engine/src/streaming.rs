//! Streaming ingestion: capture-side producer, analysis-side consumer.
//!
//! The producer calls [`StreamingSession::offer`] from the capture
//! context and is never blocked by analysis: when the bounded queue is
//! full the frame is dropped and counted, which is the documented
//! frame-drop policy. The consumer drains the queue into the session
//! buffer and re-runs classification over a trailing window to watch for
//! the terminal phase.

use crate::analysis::{SwingAnalysis, SwingAnalyzer};
use crate::phases::{PhaseClassifier, PhaseSet};
use crate::session::{SessionId, SwingSession};
use crate::Result;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use swinglab_core::PoseFrame;

/// A swing session fed by a producer/consumer pair.
///
/// Intended for one producer (capture) and one consumer (analysis
/// worker); both sides take short lock holds only, and no computation
/// happens under either lock on the producer path.
pub struct StreamingSession {
    session: Mutex<SwingSession>,
    queue: Mutex<VecDeque<PoseFrame>>,
    queue_capacity: usize,
    reclassify_window: usize,
    dropped: AtomicU64,
    classifier: PhaseClassifier,
}

impl StreamingSession {
    /// Opens a streaming session around a fresh [`SwingSession`].
    #[must_use]
    pub fn new(config: &crate::AnalyzerConfig) -> Self {
        let session = SwingSession::new(config.session.clone());
        Self {
            queue: Mutex::new(VecDeque::with_capacity(config.session.queue_capacity.max(1))),
            queue_capacity: config.session.queue_capacity.max(1),
            reclassify_window: config.session.reclassify_window.max(2),
            dropped: AtomicU64::new(0),
            classifier: PhaseClassifier::new(config.classifier.clone()),
            session: Mutex::new(session),
        }
    }

    /// Session identifier.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.session.lock().id()
    }

    /// Offers one frame from the capture side.
    ///
    /// Returns `false` when the queue was full and the frame was
    /// dropped; the producer is never blocked.
    pub fn offer(&self, frame: PoseFrame) -> bool {
        let mut queue = self.queue.lock();
        if queue.len() >= self.queue_capacity {
            drop(queue);
            let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::warn!(dropped_total = dropped, "streaming queue full, frame dropped");
            return false;
        }
        queue.push_back(frame);
        true
    }

    /// Total frames dropped at the queue.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Frames currently waiting in the queue.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.lock().len()
    }

    /// Drains queued frames into the session buffer.
    ///
    /// Out-of-order frames are discarded with a log entry; the stream
    /// keeps flowing. Returns the number of frames accepted.
    pub fn drain(&self) -> usize {
        let mut pending: Vec<PoseFrame> = {
            let mut queue = self.queue.lock();
            queue.drain(..).collect()
        };

        let mut session = self.session.lock();
        let mut accepted = 0;
        for frame in pending.drain(..) {
            match session.push(frame) {
                Ok(()) => accepted += 1,
                Err(err) => {
                    tracing::warn!(error = %err, "discarding frame from stream");
                }
            }
        }
        accepted
    }

    /// Re-runs phase classification over the trailing window of buffered
    /// frames.
    ///
    /// Returns `None` while the buffer is empty or the window's
    /// landmarks are too sparse to classify.
    #[must_use]
    pub fn reclassify_tail(&self) -> Option<PhaseSet> {
        let session = self.session.lock();
        let frames = session.frames();
        if frames.is_empty() {
            return None;
        }
        let start = frames.len().saturating_sub(self.reclassify_window);
        self.classifier.classify(&frames[start..]).ok()
    }

    /// Whether the trailing window currently classifies through the
    /// terminal phase, signalling the recording can stop.
    #[must_use]
    pub fn finish_detected(&self) -> bool {
        self.reclassify_tail()
            .is_some_and(|set| set.finish_detected())
    }

    /// Drains any remaining frames and finalizes the session.
    ///
    /// # Errors
    ///
    /// Propagates [`SwingSession::finalize`] errors (empty or already
    /// finalized session).
    pub fn finalize(self, analyzer: &SwingAnalyzer) -> Result<SwingAnalysis> {
        self.drain();
        self.session.into_inner().finalize(analyzer)
    }

    /// Aborts the session, discarding queued frames, the buffer, and any
    /// partial results.
    pub fn cancel(self) {
        let queued = self.queue.lock().len();
        tracing::debug!(queued, "streaming session cancelled");
        self.session.into_inner().cancel();
    }
}
