//! Screen/world coordinate mapping with pan and zoom.
//!
//! The transform is `screen = world * scale + translate`. Every zoom operation
//! re-anchors on a focal point so the world point under it stays put; discrete
//! zoom steps use the center of the screen.

use eframe::egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::model::finite_or;

/// Allowed range for [`Viewport::scale`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ZoomRange {
    pub min: f32,
    pub max: f32,
}

impl ZoomRange {
    pub const CANVAS: ZoomRange = ZoomRange {
        min: 0.1,
        max: 10.0,
    };
    pub const GRAPH: ZoomRange = ZoomRange { min: 0.1, max: 5.0 };

    pub fn clamp(self, scale: f32) -> f32 {
        let (lo, hi) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        if scale.is_nan() {
            return 1.0_f32.clamp(lo, hi);
        }
        scale.max(lo).min(hi)
    }
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self::CANVAS
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub scale: f32,
    pub translate: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate: Vec2::ZERO,
        }
    }
}

impl Transform {
    pub fn to_screen(&self, world: Pos2) -> Pos2 {
        (world.to_vec2() * self.scale + self.translate).to_pos2()
    }

    pub fn to_world(&self, screen: Pos2) -> Pos2 {
        ((screen.to_vec2() - self.translate) / self.scale).to_pos2()
    }

    /// Same transform at `new_scale`, with `focal` (screen space) fixed.
    fn rescaled_about(&self, focal: Pos2, new_scale: f32) -> Transform {
        let world = self.to_world(focal);
        Transform {
            scale: new_scale,
            translate: focal.to_vec2() - world.to_vec2() * new_scale,
        }
    }
}

/// Persisted form of the viewport (`zoom`, `pan_x`, `pan_y` on the wire).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewportState {
    pub zoom: f32,
    pub pan_x: f32,
    pub pan_y: f32,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Viewport {
    transform: Transform,
    gesture_start: Transform,
    range: ZoomRange,
    zoom_step: f32,
    screen_size: Vec2,
}

impl Viewport {
    pub const DEFAULT_SCREEN: Vec2 = Vec2::new(800.0, 600.0);

    pub fn new(range: ZoomRange) -> Self {
        Self {
            transform: Transform::default(),
            gesture_start: Transform::default(),
            range,
            zoom_step: 1.2,
            screen_size: Self::DEFAULT_SCREEN,
        }
    }

    pub fn with_zoom_step(mut self, step: f32) -> Self {
        if step.is_finite() && step > 1.0 {
            self.zoom_step = step;
        }
        self
    }

    pub fn scale(&self) -> f32 {
        self.transform.scale
    }

    pub fn translation(&self) -> Vec2 {
        self.transform.translate
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn range(&self) -> ZoomRange {
        self.range
    }

    pub fn screen_size(&self) -> Vec2 {
        self.screen_size
    }

    pub fn set_screen_size(&mut self, size: Vec2) {
        if size.x.is_finite() && size.y.is_finite() && size.x > 0.0 && size.y > 0.0 {
            self.screen_size = size;
        }
    }

    /// Area used by discrete layouts and the simulator's position clamp.
    pub fn layout_area(&self) -> Rect {
        Rect::from_min_size(Pos2::ZERO, self.screen_size)
    }

    pub fn to_world(&self, screen: Pos2) -> Pos2 {
        self.transform.to_world(screen)
    }

    pub fn to_screen(&self, world: Pos2) -> Pos2 {
        self.transform.to_screen(world)
    }

    fn screen_center(&self) -> Pos2 {
        (self.screen_size * 0.5).to_pos2()
    }

    pub fn zoom_in(&mut self) {
        self.zoom_in_at(self.screen_center());
    }

    pub fn zoom_out(&mut self) {
        self.zoom_out_at(self.screen_center());
    }

    pub fn zoom_in_at(&mut self, focal: Pos2) {
        self.pinch_zoom(focal, self.zoom_step);
    }

    pub fn zoom_out_at(&mut self, focal: Pos2) {
        self.pinch_zoom(focal, 1.0 / self.zoom_step);
    }

    /// Multiplies the scale by `scale_delta` (clamped), keeping `focal` fixed on screen.
    pub fn pinch_zoom(&mut self, focal: Pos2, scale_delta: f32) {
        let focal_ok = focal.x.is_finite() && focal.y.is_finite();
        if !scale_delta.is_finite() || scale_delta <= 0.0 || !focal_ok {
            return;
        }
        let scale = self.range.clamp(self.transform.scale * scale_delta);
        self.transform = self.transform.rescaled_about(focal, scale);
    }

    /// Remembers the current transform as the base for [`Viewport::pan`] and pinch updates.
    pub fn save_gesture_start(&mut self) {
        self.gesture_start = self.transform;
    }

    pub fn gesture_start(&self) -> Transform {
        self.gesture_start
    }

    /// Sets the transform to the gesture-start snapshot translated by `(dx, dy)` screen pixels.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        if !dx.is_finite() || !dy.is_finite() {
            return;
        }
        self.transform = Transform {
            scale: self.gesture_start.scale,
            translate: self.gesture_start.translate + Vec2::new(dx, dy),
        };
    }

    /// Immediate translation of the live transform (scroll wheel, keyboard).
    pub fn pan_by(&mut self, delta: Vec2) {
        if delta.x.is_finite() && delta.y.is_finite() {
            self.transform.translate += delta;
        }
    }

    /// Two-finger update relative to the gesture-start snapshot: rescale by `ratio`
    /// anchored at `start_focal`, then follow the focal point to `live_focal`.
    pub fn pinch_from_gesture_start(&mut self, start_focal: Pos2, live_focal: Pos2, ratio: f32) {
        if !ratio.is_finite() || ratio <= 0.0 {
            return;
        }
        let scale = self.range.clamp(self.gesture_start.scale * ratio);
        let mut next = self.gesture_start.rescaled_about(start_focal, scale);
        let drift = live_focal - start_focal;
        if drift.x.is_finite() && drift.y.is_finite() {
            next.translate += drift;
        }
        self.transform = next;
    }

    /// Scale back to 1.0 with no translation.
    pub fn fit_to_screen(&mut self) {
        self.transform = Transform {
            scale: self.range.clamp(1.0),
            translate: Vec2::ZERO,
        };
    }

    pub fn center(&mut self) {
        self.fit_to_screen();
    }

    pub fn state(&self) -> ViewportState {
        ViewportState {
            zoom: self.transform.scale,
            pan_x: self.transform.translate.x,
            pan_y: self.transform.translate.y,
        }
    }

    pub fn restore(&mut self, state: ViewportState) {
        let zoom = if state.zoom.is_finite() && state.zoom > 0.0 {
            state.zoom
        } else {
            1.0
        };
        self.transform = Transform {
            scale: self.range.clamp(zoom),
            translate: Vec2::new(finite_or(state.pan_x, 0.0), finite_or(state.pan_y, 0.0)),
        };
        self.gesture_start = self.transform;
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(ZoomRange::CANVAS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{pos2, vec2};

    fn close(a: Pos2, b: Pos2) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn world_and_screen_are_inverse() {
        let mut vp = Viewport::new(ZoomRange::CANVAS);
        vp.restore(ViewportState {
            zoom: 2.0,
            pan_x: 30.0,
            pan_y: -10.0,
        });
        let w = pos2(12.5, 40.0);
        assert_eq!(vp.to_screen(w), pos2(55.0, 70.0));
        assert!(close(vp.to_world(vp.to_screen(w)), w));
    }

    #[test]
    fn zoom_steps_clamp_to_range() {
        let mut vp = Viewport::new(ZoomRange::GRAPH);
        for _ in 0..40 {
            vp.zoom_in();
        }
        assert_eq!(vp.scale(), 5.0);
        for _ in 0..80 {
            vp.zoom_out();
        }
        assert!((vp.scale() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn zoom_keeps_focal_point_and_pan() {
        let mut vp = Viewport::new(ZoomRange::CANVAS);
        vp.pan_by(vec2(40.0, 25.0));
        let focal = pos2(300.0, 200.0);
        let before = vp.to_world(focal);
        vp.zoom_in_at(focal);
        assert!((vp.scale() - 1.2).abs() < 1e-6);
        assert!(close(vp.to_world(focal), before));
    }

    #[test]
    fn pan_is_relative_to_gesture_start() {
        let mut vp = Viewport::new(ZoomRange::CANVAS);
        vp.pan_by(vec2(5.0, 5.0));
        vp.save_gesture_start();
        vp.pan(10.0, 0.0);
        vp.pan(20.0, 3.0);
        assert_eq!(vp.translation(), vec2(25.0, 8.0));
    }

    #[test]
    fn pinch_from_start_anchors_and_follows_focal() {
        let mut vp = Viewport::new(ZoomRange::CANVAS);
        vp.save_gesture_start();
        let start = pos2(100.0, 100.0);
        let anchored = vp.to_world(start);
        vp.pinch_from_gesture_start(start, pos2(110.0, 100.0), 2.0);
        assert_eq!(vp.scale(), 2.0);
        assert!(close(vp.to_world(pos2(110.0, 100.0)), anchored));
    }

    #[test]
    fn fit_resets_transform() {
        let mut vp = Viewport::new(ZoomRange::CANVAS);
        vp.zoom_in();
        vp.pan_by(vec2(3.0, 4.0));
        vp.fit_to_screen();
        assert_eq!(vp.transform(), Transform::default());
    }

    #[test]
    fn restore_sanitizes_state() {
        let mut vp = Viewport::new(ZoomRange::GRAPH);
        vp.restore(ViewportState {
            zoom: 50.0,
            pan_x: f32::NAN,
            pan_y: 7.0,
        });
        assert_eq!(vp.scale(), 5.0);
        assert_eq!(vp.translation(), vec2(0.0, 7.0));
        vp.restore(ViewportState {
            zoom: -1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        });
        assert_eq!(vp.scale(), 1.0);
    }
}
