//! Ephemeral laser pointer trails.
//!
//! A trail is a list of pointer samples with capture times. Rendering walks
//! the (optionally interpolated) samples and fades each segment by age, so
//! the tail disappears first and the whole trail vanishes `duration` after
//! the pointer stopped.

use crate::draw::model::{Color, Point, Rect};
use std::time::{Duration, Instant};

pub const GLOW_PASSES: [u32; 3] = [3, 2, 1];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaserStyle {
    pub color: Color,
    pub thickness: f32,
    pub duration: Duration,
    pub smoothness: u32,
    pub glow: bool,
}

impl Default for LaserStyle {
    fn default() -> Self {
        Self {
            color: Color::rgb(255, 30, 30),
            thickness: 14.0,
            duration: Duration::from_millis(1500),
            smoothness: 5,
            glow: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaserSegment {
    pub start: Point,
    pub end: Point,
    pub alpha: u8,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaserTrail {
    points: Vec<Point>,
    timestamps: Vec<Instant>,
}

impl LaserTrail {
    pub fn new(start: Point, now: Instant) -> Self {
        Self {
            points: vec![start],
            timestamps: vec![now],
        }
    }

    pub fn add_point(&mut self, point: Point, now: Instant) {
        let now = match self.timestamps.last() {
            Some(last) if *last > now => *last,
            _ => now,
        };
        self.points.push(point);
        self.timestamps.push(now);
    }

    /// Drops leading samples older than `duration`.
    pub fn cleanup(&mut self, now: Instant, duration: Duration) {
        let expired = self
            .timestamps
            .iter()
            .take_while(|ts| now.saturating_duration_since(**ts) > duration)
            .count();
        if expired > 0 {
            self.points.drain(..expired);
            self.timestamps.drain(..expired);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn timestamps(&self) -> &[Instant] {
        &self.timestamps
    }

    pub fn last_point(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Inserts `smoothness - 1` evenly spaced samples between neighbours.
    /// Inserted samples take the timestamp of the sample they start from.
    pub fn interpolated(&self, smoothness: u32) -> Vec<(Point, Instant)> {
        let steps = smoothness.max(1);
        let mut out = Vec::with_capacity(self.points.len() * steps as usize);
        for (idx, window) in self.points.windows(2).enumerate() {
            let ts = self.timestamps[idx];
            out.push((window[0], ts));
            for step in 1..steps {
                let t = step as f32 / steps as f32;
                out.push((window[0].lerp(window[1], t), ts));
            }
        }
        if let (Some(point), Some(ts)) = (self.points.last(), self.timestamps.last()) {
            out.push((*point, *ts));
        }
        out
    }

    pub fn segments(&self, now: Instant, style: &LaserStyle) -> Vec<LaserSegment> {
        let samples = self.interpolated(style.smoothness);
        samples
            .windows(2)
            .filter_map(|pair| {
                let (start, ts) = pair[0];
                let (end, _) = pair[1];
                faded_segment(start, end, ts, now, style)
            })
            .collect()
    }

    /// A trail cleaned down to one sample still fades like the segment it
    /// ended. Returned as a zero-length segment.
    pub fn lone_sample(&self, now: Instant, style: &LaserStyle) -> Option<LaserSegment> {
        match (self.points.as_slice(), self.timestamps.as_slice()) {
            ([point], [ts]) => faded_segment(*point, *point, *ts, now, style),
            _ => None,
        }
    }

    pub fn bounds(&self, style: &LaserStyle) -> Option<Rect> {
        let pad = style.thickness + if style.glow { 6.0 } else { 0.0 };
        Rect::bounding(&self.points).map(|rect| rect.inflate(pad))
    }
}

/// Halo passes drawn under a segment when glow is on. Invisible passes are skipped.
/// Alpha falls linearly with age; width shrinks to 35% at the end of life.
fn faded_segment(
    start: Point,
    end: Point,
    stamped: Instant,
    now: Instant,
    style: &LaserStyle,
) -> Option<LaserSegment> {
    let duration = style.duration.as_secs_f32().max(f32::EPSILON);
    let age = now.saturating_duration_since(stamped).as_secs_f32();
    let life = (1.0 - age / duration).clamp(0.0, 1.0);
    let alpha = (255.0 * life).round() as u8;
    if alpha == 0 {
        return None;
    }
    Some(LaserSegment {
        start,
        end,
        alpha,
        width: style.thickness * (0.35 + 0.65 * life),
    })
}

pub fn glow_passes(segment: &LaserSegment) -> Vec<LaserSegment> {
    GLOW_PASSES
        .iter()
        .filter_map(|g| {
            let factor = 0.3 - 0.1 * *g as f32;
            let alpha = (segment.alpha as f32 * factor).round();
            (alpha >= 1.0).then(|| LaserSegment {
                width: segment.width + 2.0 * *g as f32,
                alpha: alpha as u8,
                ..*segment
            })
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct LaserLayer {
    finished: Vec<LaserTrail>,
    current: Option<LaserTrail>,
}

impl LaserLayer {
    pub fn begin(&mut self, point: Point, now: Instant) {
        self.end();
        self.current = Some(LaserTrail::new(point, now));
    }

    pub fn extend(&mut self, point: Point, now: Instant) {
        match self.current.as_mut() {
            Some(trail) => trail.add_point(point, now),
            None => self.current = Some(LaserTrail::new(point, now)),
        }
    }

    pub fn end(&mut self) {
        if let Some(trail) = self.current.take() {
            if !trail.is_empty() {
                self.finished.push(trail);
            }
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.current.is_some()
    }

    pub fn tick(&mut self, now: Instant, duration: Duration) {
        for trail in &mut self.finished {
            trail.cleanup(now, duration);
        }
        self.finished.retain(|trail| !trail.is_empty());
        if let Some(trail) = self.current.as_mut() {
            // Keep the newest sample under the pointer so a held button still shows a dot.
            let last = trail.last_point();
            trail.cleanup(now, duration);
            if let (true, Some(point)) = (trail.is_empty(), last) {
                *trail = LaserTrail::new(point, now);
            }
        }
    }

    pub fn clear(&mut self) {
        self.finished.clear();
        self.current = None;
    }

    pub fn is_animating(&self) -> bool {
        !self.finished.is_empty() || self.current.is_some()
    }

    pub fn trails(&self) -> impl Iterator<Item = &LaserTrail> {
        self.finished.iter().chain(self.current.iter())
    }

    pub fn bounds(&self, style: &LaserStyle) -> Option<Rect> {
        self.trails()
            .filter_map(|trail| trail.bounds(style))
            .reduce(|acc, rect| acc.union(&rect))
    }
}
