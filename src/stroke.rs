//! Stroke recording
//!
//! A stroke is the ordered list of pointer samples captured while a button
//! is held. The recorder buffers samples; `finish` hands out an immutable
//! `Stroke`.

use glam::Vec2;

/// A finalized, immutable stroke
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stroke {
    points: Vec<Vec2>,
}

impl Stroke {
    pub fn new(points: Vec<Vec2>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Euclidean length of the sampled polyline
    pub fn polyline_length(&self) -> f32 {
        polyline_length(&self.points)
    }
}

/// Sum of segment lengths
pub fn polyline_length(points: &[Vec2]) -> f32 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Buffers samples for one drag gesture
#[derive(Debug, Clone, Default)]
pub struct StrokeRecorder {
    points: Vec<Vec2>,
    recording: bool,
}

impl StrokeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new gesture, dropping anything buffered
    pub fn begin(&mut self) {
        self.points.clear();
        self.recording = true;
    }

    /// Start a new gesture seeded with its first sample
    pub fn begin_at(&mut self, pos: Vec2) {
        self.begin();
        self.points.push(pos);
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Append a sample. Returns `true` if it was recorded.
    pub fn push(&mut self, pos: Vec2) -> bool {
        if !self.recording {
            return false;
        }
        if self.points.last() == Some(&pos) {
            return false;
        }
        self.points.push(pos);
        true
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn last(&self) -> Option<Vec2> {
        self.points.last().copied()
    }

    /// Stop recording and take the stroke
    pub fn finish(&mut self) -> Stroke {
        self.recording = false;
        Stroke::new(std::mem::take(&mut self.points))
    }

    /// Discard the gesture
    pub fn clear(&mut self) {
        self.recording = false;
        self.points.clear();
    }
}
