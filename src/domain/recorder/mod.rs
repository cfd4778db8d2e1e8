// Segment recorder - The label state machine

use crate::domain::errors::DomainError;
use crate::domain::model::*;

/// Result of a successful toggle
#[derive(Debug, Clone, PartialEq)]
pub enum ToggleOutcome {
    /// A new segment was opened at the current frame
    Opened(OpenSegment),
    /// The open segment was closed into an immutable record
    Closed(Segment),
}

/// Result of an undo
#[derive(Debug, Clone, PartialEq)]
pub enum UndoOutcome {
    /// The open segment was discarded without creating a record
    DiscardedOpen(OpenSegment),
    /// The last appended segment was removed
    RemovedSegment(Segment),
    /// Nothing to undo
    Nothing,
}

impl UndoOutcome {
    /// Whether the closed-segment list changed
    pub fn changed_segments(&self) -> bool {
        matches!(self, UndoOutcome::RemovedSegment(_))
    }
}

/// Tracks at most one open segment and the ordered list of closed ones.
///
/// Segments are kept in creation order, which is not necessarily time order.
#[derive(Debug, Clone)]
pub struct SegmentRecorder {
    frame_rate: f64,
    open: Option<OpenSegment>,
    segments: Vec<Segment>,
}

impl SegmentRecorder {
    /// Create an empty recorder for a stream with the given frame rate
    pub fn new(frame_rate: f64) -> Result<Self, DomainError> {
        Self::with_segments(frame_rate, Vec::new())
    }

    /// Create a recorder pre-populated with previously saved segments
    pub fn with_segments(frame_rate: f64, segments: Vec<Segment>) -> Result<Self, DomainError> {
        if !frame_rate.is_finite() || frame_rate <= 0.0 {
            return Err(DomainError::BadArgs(
                "Frame rate must be positive".to_string(),
            ));
        }
        Ok(Self {
            frame_rate,
            open: None,
            segments,
        })
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// The in-progress segment, if any
    pub fn open_segment(&self) -> Option<&OpenSegment> {
        self.open.as_ref()
    }

    /// Closed segments in creation order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Open a segment, or close the open one of the same category.
    ///
    /// A toggle for the other category while one is open is rejected and
    /// leaves the state unchanged, as is a close at or before the start frame.
    pub fn toggle(
        &mut self,
        category: Category,
        current_frame: u64,
    ) -> Result<ToggleOutcome, DomainError> {
        let Some(open) = self.open else {
            let open = OpenSegment {
                category,
                start_frame: current_frame,
            };
            self.open = Some(open);
            return Ok(ToggleOutcome::Opened(open));
        };

        if open.category != category {
            return Err(DomainError::SegmentAlreadyOpen {
                open: open.category,
                requested: category,
            });
        }

        let segment = Segment::new(open.start_frame, current_frame, category, self.frame_rate)?;
        self.segments.push(segment.clone());
        self.open = None;
        Ok(ToggleOutcome::Closed(segment))
    }

    /// Discard the open segment, else remove the last appended segment
    pub fn undo(&mut self) -> UndoOutcome {
        if let Some(open) = self.open.take() {
            return UndoOutcome::DiscardedOpen(open);
        }
        match self.segments.pop() {
            Some(segment) => UndoOutcome::RemovedSegment(segment),
            None => UndoOutcome::Nothing,
        }
    }
}
