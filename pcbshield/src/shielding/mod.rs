//! Hash Pattern Engine
//!
//! Fills a rectangle on one layer with a frame and two mirrored families of
//! angled lines. The source rectangle is normally the board outline; it is
//! moved inwards by the per-side offsets and by half the line width, so that
//! the drawn strokes stay inside the offset frame.
//!
//! Family `a` rises to the right (slope `-tan(angle)` in board coordinates,
//! where y grows downwards) and starts on the left edge at
//! `top + n * pitch / cos(angle)`. Family `b` mirrors it from the bottom
//! edge. Every candidate is clipped to the working rectangle; candidates
//! that miss it are dropped.

pub mod stamp;

use serde::{Deserialize, Serialize};

use crate::board::{Board, DrawingId, LayerId, Segment};
use crate::config::ShieldConfig;
use crate::core::ShieldError;
use crate::geometry::{clip_segment_to_rect, within, Offsets, Point, Rectangle};

/// Upper bound on hatch steps per family; a finer pitch is rejected.
pub const MAX_HASH_STEPS: usize = 100_000;

/// Everything needed to draw one hash pattern. Lengths are in board units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashPatternRequest {
    pub source_rect: Rectangle,
    pub offsets: Offsets,
    pub line_width: f64,
    pub pitch: f64,
    /// Degrees, strictly between 0 and 90
    pub angle_deg: f64,
    pub target_layer: LayerId,
    /// Remove the straight segments already on the target layer first
    pub replace_existing: bool,
    /// Prefix for the debug labels of emitted segments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl HashPatternRequest {
    pub fn new(source_rect: Rectangle, line_width: f64, pitch: f64, angle_deg: f64, target_layer: LayerId) -> Self {
        Self {
            source_rect,
            offsets: Offsets::default(),
            line_width,
            pitch,
            angle_deg,
            target_layer,
            replace_existing: true,
            label: None,
        }
    }

    pub fn with_offsets(mut self, offsets: Offsets) -> Self {
        self.offsets = offsets;
        self
    }

    /// Check the scalar parameters. Does not look at the resulting rectangle.
    pub fn validate(&self) -> Result<(), ShieldError> {
        if !self.line_width.is_finite() || self.line_width <= 0.0 {
            return Err(ShieldError::InvalidParameter(format!(
                "line width must be positive, got {}",
                self.line_width
            )));
        }
        if !self.pitch.is_finite() || self.pitch <= 0.0 {
            return Err(ShieldError::InvalidParameter(format!(
                "pitch must be positive, got {}",
                self.pitch
            )));
        }
        if !self.angle_deg.is_finite() || self.angle_deg <= 0.0 || self.angle_deg >= 90.0 {
            return Err(ShieldError::InvalidParameter(format!(
                "angle must be between 0 and 90 degrees (exclusive), got {}",
                self.angle_deg
            )));
        }
        for (side, value) in self.offsets.sides() {
            if !value.is_finite() || value < 0.0 {
                return Err(ShieldError::InvalidParameter(format!(
                    "{} offset must not be negative, got {}",
                    side, value
                )));
            }
        }
        let r = &self.source_rect;
        if [r.left, r.top, r.right, r.bottom].iter().any(|v| !v.is_finite()) {
            return Err(ShieldError::InvalidGeometry(
                "source rectangle has non-finite coordinates".to_string(),
            ));
        }
        Ok(())
    }

    /// Source rectangle minus offsets minus half the line width.
    pub fn working_rect(&self) -> Result<Rectangle, ShieldError> {
        self.validate()?;
        let rect = self
            .source_rect
            .inset(&self.offsets)
            .shrink(self.line_width / 2.0);
        if !rect.is_valid() {
            return Err(ShieldError::InvalidGeometry(format!(
                "offsets leave no area to shield: left {} right {} top {} bottom {}",
                rect.left, rect.right, rect.top, rect.bottom
            )));
        }
        Ok(rect)
    }

    pub fn coverage(&self) -> f64 {
        coverage(self.line_width, self.pitch)
    }

    fn tag(&self, name: &str) -> String {
        match &self.label {
            Some(prefix) => format!("{}-{}", prefix, name),
            None => name.to_string(),
        }
    }
}

/// Fraction of the area covered by two crossing line families of the given
/// width and pitch, clamped to `0..=1`.
pub fn coverage(width: f64, pitch: f64) -> f64 {
    if pitch <= 0.0 {
        return 1.0;
    }
    let open = (1.0 - width / pitch).clamp(0.0, 1.0);
    (1.0 - open * open).clamp(0.0, 1.0)
}

/// Pitch at which lines of `width` cover `target` of the area.
pub fn pitch_for_coverage(width: f64, target: f64) -> Result<f64, ShieldError> {
    if !width.is_finite() || width <= 0.0 {
        return Err(ShieldError::InvalidParameter(format!(
            "line width must be positive, got {}",
            width
        )));
    }
    if !target.is_finite() || target <= 0.0 || target > 1.0 {
        return Err(ShieldError::InvalidParameter(format!(
            "coverage must be in (0, 1], got {}",
            target
        )));
    }
    Ok(width / (1.0 - (1.0 - target).sqrt()))
}

/// Draw the frame and hatch described by `request` on `board`.
///
/// Returns the emitted segments in emission order: four border segments
/// (top, right, bottom, left) followed by one `a`/`b` pair per step, minus
/// the candidates that fall outside the working rectangle. The board is not
/// touched when validation fails.
pub fn generate_hash_pattern<B: Board + ?Sized>(
    board: &mut B,
    request: &HashPatternRequest,
) -> Result<Vec<Segment>, ShieldError> {
    let rect = request.working_rect()?;

    let steps = rect.diagonal() / request.pitch;
    if steps > MAX_HASH_STEPS as f64 {
        return Err(ShieldError::InvalidParameter(format!(
            "pitch {} is too fine for a {:.0} unit diagonal ({:.0} steps, at most {})",
            request.pitch,
            rect.diagonal(),
            steps,
            MAX_HASH_STEPS
        )));
    }

    if request.line_width >= request.pitch {
        tracing::warn!(
            "Line width {} is not smaller than pitch {}; the pattern is a solid fill",
            request.line_width,
            request.pitch
        );
    }

    if request.replace_existing {
        let removed = clear_segments(board, request.target_layer);
        tracing::debug!("Removed {} segments from layer {}", removed, request.target_layer);
    }

    let mut segments = border_segments(request, &rect);

    let angle = request.angle_deg.to_radians();
    let dy_step = request.pitch / angle.cos();
    let tan = angle.tan();
    let n_max = steps.floor() as i64 - 1;

    let mut discarded = 0usize;
    for n in 1..=n_max.max(0) {
        let offset = n as f64 * dy_step;
        let run = offset / tan;

        let a = (
            Point::new(rect.left, rect.top + offset),
            Point::new(rect.left + run, rect.top),
        );
        let b = (
            Point::new(rect.left, rect.bottom - offset),
            Point::new(rect.left + run, rect.bottom),
        );

        for (family, (p1, p2)) in [("a", a), ("b", b)] {
            match clip_hash_line(p1, p2, &rect) {
                Some((start, end)) => segments.push(
                    Segment::new(start, end, request.line_width, request.target_layer)
                        .with_label(request.tag(&format!("hash-{}-{}", family, n))),
                ),
                None => discarded += 1,
            }
        }
    }

    for segment in &segments {
        tracing::debug!(
            "{}: ({:.0}, {:.0}) -> ({:.0}, {:.0})",
            segment.label.as_deref().unwrap_or("segment"),
            segment.start.x,
            segment.start.y,
            segment.end.x,
            segment.end.y
        );
        board.add_segment(segment.clone());
    }

    tracing::info!(
        "Hash pattern on layer {}: {} segments ({} discarded), coverage {:.1}%",
        request.target_layer,
        segments.len(),
        discarded,
        request.coverage() * 100.0
    );

    Ok(segments)
}

fn border_segments(request: &HashPatternRequest, rect: &Rectangle) -> Vec<Segment> {
    let [tl, tr, br, bl] = rect.corners();
    [("top", tl, tr), ("right", tr, br), ("bottom", br, bl), ("left", bl, tl)]
        .into_iter()
        .map(|(side, start, end)| {
            Segment::new(start, end, request.line_width, request.target_layer)
                .with_label(request.tag(&format!("border-{}", side)))
        })
        .collect()
}

fn clip_hash_line(p1: Point, p2: Point, rect: &Rectangle) -> Option<(Point, Point)> {
    let (start, end) = clip_segment_to_rect(p1, p2, rect)?;
    let inside = |p: Point| within(p.x, rect.left, rect.right) && within(p.y, rect.top, rect.bottom);
    if inside(start) && inside(end) {
        Some((start, end))
    } else {
        None
    }
}

/// Remove every straight segment on `layer`, returning how many went.
fn clear_segments<B: Board + ?Sized>(board: &mut B, layer: LayerId) -> usize {
    board
        .drawings()
        .into_iter()
        .filter(|d| d.layer == layer && d.is_segment())
        .filter(|d| board.remove(d.id))
        .count()
}

/// Number of straight segments on `layer`.
pub fn segments_on_layer<B: Board + ?Sized>(board: &B, layer: LayerId) -> usize {
    board
        .drawings()
        .iter()
        .filter(|d| d.layer == layer && d.is_segment())
        .count()
}

/// Union of the extents of everything drawn on `layer`, or the board's
/// bounding box when the layer is empty.
pub fn source_rectangle<B: Board + ?Sized>(board: &B, layer: LayerId) -> Option<Rectangle> {
    board
        .drawings()
        .iter()
        .filter(|d| d.layer == layer)
        .filter_map(|d| d.bounds())
        .reduce(|acc, r| acc.union(&r))
        .or_else(|| board.bounding_box())
}

/// Turn millimetre settings into a request against `board`.
pub fn request_from_config<B: Board + ?Sized>(
    board: &B,
    config: &ShieldConfig,
) -> Result<HashPatternRequest, ShieldError> {
    let source_layer = resolve_layer(board, &config.source_layer)?;
    let target_layer = resolve_layer(board, &config.target_layer)?;
    let source_rect = source_rectangle(board, source_layer).ok_or_else(|| {
        ShieldError::InvalidGeometry(format!(
            "nothing on layer {} or elsewhere on the board to take the area from",
            config.source_layer
        ))
    })?;

    let offsets = config.offsets_mm();
    Ok(HashPatternRequest {
        source_rect,
        offsets: Offsets::new(
            board.from_mm(offsets.left),
            board.from_mm(offsets.right),
            board.from_mm(offsets.top),
            board.from_mm(offsets.bottom),
        ),
        line_width: board.from_mm(config.line_width_mm),
        pitch: board.from_mm(config.effective_pitch_mm()),
        angle_deg: config.angle_deg,
        target_layer,
        replace_existing: config.replace_existing,
        label: config.label.clone(),
    })
}

fn resolve_layer<B: Board + ?Sized>(board: &B, name: &str) -> Result<LayerId, ShieldError> {
    board
        .layer_by_name(name)
        .ok_or_else(|| ShieldError::InvalidParameter(format!("unknown layer: {}", name)))
}

/// Write one `"<id> <name>"` text per board layer on `layer`, stacked
/// downwards from `origin`. Texts from an earlier legend are replaced.
pub fn draw_layer_legend<B: Board + ?Sized>(
    board: &mut B,
    origin: Point,
    spacing: f64,
    layer: LayerId,
) -> Vec<DrawingId> {
    let entries: Vec<String> = board
        .layers()
        .iter()
        .map(|l| format!("{} {}", l.id, l.name))
        .collect();

    let stale: Vec<DrawingId> = board
        .drawings()
        .iter()
        .filter(|d| d.layer == layer)
        .filter(|d| d.text().map_or(false, |t| entries.iter().any(|e| e == t)))
        .map(|d| d.id)
        .collect();
    for id in stale {
        board.remove(id);
    }

    entries
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let position = Point::new(origin.x, origin.y + i as f64 * spacing);
            board.add_text(position, text, layer)
        })
        .collect()
}
