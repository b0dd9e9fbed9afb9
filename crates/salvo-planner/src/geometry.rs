//! 2D path construction helpers.

use salvo_core::enums::ManeuverKind;
use salvo_core::types::Vec2;

/// Rotate `v` counter-clockwise by `angle` radians.
pub fn rotate(v: Vec2, angle: f64) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

/// Unit vector from `from` toward `to`, or `fallback` when they coincide.
pub fn direction(from: Vec2, to: Vec2, fallback: Vec2) -> Vec2 {
    let d = to - from;
    if d.length_squared() > 1e-12 {
        d.normalize()
    } else {
        fallback
    }
}

/// Number of equal segments for a straight leg of `length`.
pub fn segment_count(length: f64, segment_length: f64, max_segments: usize) -> usize {
    if !(length.is_finite() && segment_length > 0.0) {
        return 1;
    }
    ((length / segment_length).ceil() as usize).clamp(1, max_segments.max(1))
}

/// Polyline of (position, kind) grown from an origin point.
///
/// A point closer than `min_spacing` to the previous one replaces it, so
/// legs can end exactly on tangent points without producing slivers.
#[derive(Debug, Clone)]
pub struct PathBuilder {
    origin: Vec2,
    min_spacing: f64,
    points: Vec<(Vec2, ManeuverKind)>,
}

impl PathBuilder {
    pub fn new(origin: Vec2, min_spacing: f64) -> Self {
        Self {
            origin,
            min_spacing,
            points: Vec::new(),
        }
    }

    /// The last point on the path, or the origin.
    pub fn last(&self) -> Vec2 {
        self.points.last().map_or(self.origin, |(p, _)| *p)
    }

    pub fn push(&mut self, position: Vec2, kind: ManeuverKind) {
        if let Some(last) = self.points.last_mut() {
            if last.0.distance(position) < self.min_spacing {
                *last = (position, kind);
                return;
            }
        }
        self.points.push((position, kind));
    }

    /// Straight leg to `to` in equal segments.
    pub fn line_to(&mut self, to: Vec2, segment_length: f64, max_segments: usize, kind: ManeuverKind) {
        let from = self.last();
        let n = segment_count(from.distance(to), segment_length, max_segments);
        for i in 1..=n {
            self.push(from.lerp(to, i as f64 / n as f64), kind);
        }
    }

    /// Circular arc around `center`, starting at the current last point and
    /// sweeping `sweep` radians (positive = counter-clockwise), with no step
    /// larger than `max_step`.
    pub fn arc(&mut self, center: Vec2, sweep: f64, max_step: f64, kind: ManeuverKind) {
        if sweep.abs() < 1e-9 {
            return;
        }
        let start = self.last() - center;
        let n = ((sweep.abs() / max_step).ceil() as usize).max(1);
        for i in 1..=n {
            let p = center + rotate(start, sweep * i as f64 / n as f64);
            self.push(p, kind);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Path length from the origin through every point.
    pub fn length(&self) -> f64 {
        let mut prev = self.origin;
        let mut total = 0.0;
        for (p, _) in &self.points {
            total += prev.distance(*p);
            prev = *p;
        }
        total
    }

    /// Points paired with their cumulative distance from the origin.
    pub fn with_distances(&self) -> Vec<(Vec2, ManeuverKind, f64)> {
        let mut prev = self.origin;
        let mut total = 0.0;
        self.points
            .iter()
            .map(|&(p, kind)| {
                total += prev.distance(p);
                prev = p;
                (p, kind, total)
            })
            .collect()
    }
}

/// Tangent point on a circle for a path leaving `from` and joining the circle
/// travelling counter-clockwise (`side` = 1) or clockwise (`side` = -1).
///
/// A point within 5% of the radius counts as on the circle and joins at its
/// nearest point. `None` if `from` is further inside.
pub fn tangent_point(from: Vec2, center: Vec2, radius: f64, side: f64) -> Option<Vec2> {
    let w = from - center;
    let d = w.length();
    if d < radius * 0.95 || d < 1e-9 {
        return None;
    }
    let alpha = (radius / d).min(1.0).acos();
    Some(center + rotate(w / d, side * alpha) * radius)
}

/// Signed sweep from `start` to `end` around `center`, travelling in the
/// direction given by `side`. Always in `[0, 2π)` times `side`.
pub fn arc_sweep(center: Vec2, start: Vec2, end: Vec2, side: f64) -> f64 {
    let s = start - center;
    let e = end - center;
    let a0 = s.y.atan2(s.x);
    let a1 = e.y.atan2(e.x);
    side * (side * (a1 - a0)).rem_euclid(std::f64::consts::TAU)
}
