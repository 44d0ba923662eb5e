//! Pointer/touch state machine shared by the board and the graph.
//!
//! The controller owns no model data. It hit-tests and moves entities through
//! the [`Scene`] trait and changes the view only through [`Viewport`]. Time is
//! passed in by the caller (milliseconds on any monotonic clock), so the long
//! press is a deadline checked by [`GestureController::poll`] rather than a
//! timer callback.

use eframe::egui::{Pos2, Vec2};
use serde::{Deserialize, Serialize};

use crate::viewport::Viewport;

pub type PointerId = u64;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GestureConfig {
    /// Hold duration after which a press on an entity opens its edit affordance.
    pub long_press_ms: u64,
    /// Minimum distance between two pointers (screen px) to start a pinch.
    pub pinch_min_distance: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            long_press_ms: 500,
            pinch_min_distance: 10.0,
        }
    }
}

/// Something the controller can hit-test and drag.
pub trait Scene {
    type Id: Clone + PartialEq + std::fmt::Debug;

    /// Topmost entity at `world`, if any.
    fn hit_test(&self, world: Pos2) -> Option<Self::Id>;
    fn begin_drag(&mut self, id: &Self::Id);
    /// Translate by a world-space delta.
    fn drag_by(&mut self, id: &Self::Id, delta: Vec2);
    fn end_drag(&mut self, id: &Self::Id);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureMode {
    Idle,
    Panning,
    DraggingItem,
    Pinching,
}

#[derive(Clone, Debug, PartialEq)]
enum Phase<I> {
    Idle,
    Panning {
        start_screen: Pos2,
        moved: bool,
    },
    DraggingItem {
        target: I,
        last_world: Pos2,
        long_press_at: Option<u64>,
        long_pressed: bool,
        moved: bool,
    },
    Pinching {
        start_distance: f32,
        start_mid: Pos2,
    },
}

/// What a pointer event or poll produced for the UI layer.
#[derive(Clone, Debug, PartialEq)]
pub enum GestureOutcome<I> {
    None,
    /// Press and release without movement; `None` when it landed on empty space.
    Tap(Option<I>),
    LongPress(I),
}

#[derive(Debug)]
pub struct GestureController<I> {
    phase: Phase<I>,
    /// Pointers currently down, in press order.
    pointers: Vec<(PointerId, Pos2)>,
    config: GestureConfig,
}

impl<I: Clone + PartialEq + std::fmt::Debug> GestureController<I> {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            phase: Phase::Idle,
            pointers: Vec::new(),
            config,
        }
    }

    pub fn mode(&self) -> GestureMode {
        match self.phase {
            Phase::Idle => GestureMode::Idle,
            Phase::Panning { .. } => GestureMode::Panning,
            Phase::DraggingItem { .. } => GestureMode::DraggingItem,
            Phase::Pinching { .. } => GestureMode::Pinching,
        }
    }

    /// The entity held by the current gesture.
    pub fn dragged(&self) -> Option<&I> {
        match &self.phase {
            Phase::DraggingItem { target, .. } => Some(target),
            _ => None,
        }
    }

    pub fn long_press_pending(&self) -> bool {
        matches!(
            self.phase,
            Phase::DraggingItem {
                long_press_at: Some(_),
                ..
            }
        )
    }

    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    pub fn pointer_down<S: Scene<Id = I>>(
        &mut self,
        id: PointerId,
        screen: Pos2,
        now_ms: u64,
        scene: &mut S,
        viewport: &mut Viewport,
    ) -> GestureOutcome<I> {
        if let Some(p) = self.pointers.iter_mut().find(|(pid, _)| *pid == id) {
            p.1 = screen;
        } else {
            self.pointers.push((id, screen));
        }

        match self.pointers.len() {
            1 => {
                self.release_drag(scene);
                viewport.save_gesture_start();
                let world = viewport.to_world(screen);
                self.phase = match scene.hit_test(world) {
                    Some(target) => {
                        scene.begin_drag(&target);
                        log::debug!("gesture: press on {target:?}");
                        Phase::DraggingItem {
                            target,
                            last_world: world,
                            long_press_at: Some(now_ms.saturating_add(self.config.long_press_ms)),
                            long_pressed: false,
                            moved: false,
                        }
                    }
                    None => Phase::Panning {
                        start_screen: screen,
                        moved: false,
                    },
                };
            }
            2 => {
                let (a, b) = (self.pointers[0].1, self.pointers[1].1);
                let distance = a.distance(b);
                if distance > self.config.pinch_min_distance {
                    self.release_drag(scene);
                    viewport.save_gesture_start();
                    self.phase = Phase::Pinching {
                        start_distance: distance,
                        start_mid: midpoint(a, b),
                    };
                }
            }
            _ => {}
        }
        GestureOutcome::None
    }

    pub fn pointer_move<S: Scene<Id = I>>(
        &mut self,
        id: PointerId,
        screen: Pos2,
        scene: &mut S,
        viewport: &mut Viewport,
    ) {
        let Some(slot) = self.pointers.iter().position(|(pid, _)| *pid == id) else {
            return;
        };
        self.pointers[slot].1 = screen;
        let primary = slot == 0;

        match &mut self.phase {
            Phase::Idle => {}
            Phase::DraggingItem {
                target,
                last_world,
                long_press_at,
                long_pressed,
                moved,
            } => {
                *long_press_at = None;
                if *long_pressed || !primary {
                    return;
                }
                let world = viewport.to_world(screen);
                let delta = world - *last_world;
                if delta != Vec2::ZERO && delta.x.is_finite() && delta.y.is_finite() {
                    scene.drag_by(target, delta);
                    *moved = true;
                }
                *last_world = world;
            }
            Phase::Panning {
                start_screen,
                moved,
            } => {
                if !primary {
                    return;
                }
                let delta = screen - *start_screen;
                viewport.pan(delta.x, delta.y);
                if delta != Vec2::ZERO {
                    *moved = true;
                }
            }
            Phase::Pinching {
                start_distance,
                start_mid,
            } => {
                if self.pointers.len() < 2 || *start_distance <= 0.0 {
                    return;
                }
                let (a, b) = (self.pointers[0].1, self.pointers[1].1);
                let ratio = a.distance(b) / *start_distance;
                viewport.pinch_from_gesture_start(*start_mid, midpoint(a, b), ratio);
            }
        }
    }

    /// Fires the long press once its deadline has passed, if no move cancelled it.
    pub fn poll(&mut self, now_ms: u64) -> GestureOutcome<I> {
        if let Phase::DraggingItem {
            target,
            long_press_at,
            long_pressed,
            ..
        } = &mut self.phase
        {
            if let Some(deadline) = *long_press_at {
                if now_ms >= deadline {
                    *long_press_at = None;
                    *long_pressed = true;
                    log::debug!("gesture: long press on {target:?}");
                    return GestureOutcome::LongPress(target.clone());
                }
            }
        }
        GestureOutcome::None
    }

    /// Any pointer going up ends the whole gesture.
    pub fn pointer_up<S: Scene<Id = I>>(
        &mut self,
        id: PointerId,
        scene: &mut S,
    ) -> GestureOutcome<I> {
        self.pointers.retain(|(pid, _)| *pid != id);
        let outcome = match &self.phase {
            Phase::DraggingItem {
                target,
                long_pressed: false,
                moved: false,
                ..
            } => GestureOutcome::Tap(Some(target.clone())),
            Phase::Panning { moved: false, .. } => GestureOutcome::Tap(None),
            _ => GestureOutcome::None,
        };
        self.release_drag(scene);
        self.phase = Phase::Idle;
        outcome
    }

    pub fn pointer_cancel<S: Scene<Id = I>>(&mut self, scene: &mut S) {
        self.pointers.clear();
        self.release_drag(scene);
        self.phase = Phase::Idle;
    }

    fn release_drag<S: Scene<Id = I>>(&mut self, scene: &mut S) {
        if let Phase::DraggingItem { target, .. } = &self.phase {
            scene.end_drag(target);
            self.phase = Phase::Idle;
        }
    }
}

impl<I: Clone + PartialEq + std::fmt::Debug> Default for GestureController<I> {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

fn midpoint(a: Pos2, b: Pos2) -> Pos2 {
    Pos2::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::ZoomRange;
    use eframe::egui::{Rect, pos2, vec2};

    #[derive(Default)]
    struct Boxes {
        rects: Vec<Rect>,
        held: Option<usize>,
        released: usize,
    }

    impl Scene for Boxes {
        type Id = usize;

        fn hit_test(&self, world: Pos2) -> Option<usize> {
            self.rects.iter().rposition(|r| r.contains(world))
        }

        fn begin_drag(&mut self, id: &usize) {
            self.held = Some(*id);
        }

        fn drag_by(&mut self, id: &usize, delta: Vec2) {
            self.rects[*id] = self.rects[*id].translate(delta);
        }

        fn end_drag(&mut self, _id: &usize) {
            self.held = None;
            self.released += 1;
        }
    }

    fn scene() -> Boxes {
        Boxes {
            rects: vec![Rect::from_min_size(pos2(0.0, 0.0), vec2(100.0, 100.0))],
            ..Default::default()
        }
    }

    #[test]
    fn press_on_item_drags_by_incremental_world_delta() {
        let mut boxes = scene();
        let mut vp = Viewport::new(ZoomRange::CANVAS);
        vp.pinch_zoom(Pos2::ZERO, 2.0);
        let mut gc = GestureController::default();

        gc.pointer_down(0, pos2(20.0, 20.0), 0, &mut boxes, &mut vp);
        assert_eq!(gc.mode(), GestureMode::DraggingItem);
        assert_eq!(boxes.held, Some(0));

        gc.pointer_move(0, pos2(40.0, 20.0), &mut boxes, &mut vp);
        gc.pointer_move(0, pos2(60.0, 30.0), &mut boxes, &mut vp);
        // 40px right and 10px down on screen at scale 2.
        assert_eq!(boxes.rects[0].min, pos2(20.0, 5.0));
        assert_eq!(vp.translation(), Vec2::ZERO);

        assert_eq!(gc.pointer_up(0, &mut boxes), GestureOutcome::None);
        assert_eq!(gc.mode(), GestureMode::Idle);
        assert_eq!(boxes.held, None);
    }

    #[test]
    fn pan_never_touches_the_scene() {
        let mut boxes = scene();
        let mut vp = Viewport::new(ZoomRange::CANVAS);
        let mut gc = GestureController::default();

        gc.pointer_down(0, pos2(300.0, 300.0), 0, &mut boxes, &mut vp);
        assert_eq!(gc.mode(), GestureMode::Panning);
        gc.pointer_move(0, pos2(310.0, 305.0), &mut boxes, &mut vp);
        gc.pointer_move(0, pos2(350.0, 320.0), &mut boxes, &mut vp);
        assert_eq!(vp.translation(), vec2(50.0, 20.0));
        assert_eq!(boxes.rects[0].min, pos2(0.0, 0.0));
        gc.pointer_up(0, &mut boxes);
        assert_eq!(boxes.released, 0);
    }

    #[test]
    fn long_press_fires_once_and_suppresses_moves() {
        let mut boxes = scene();
        let mut vp = Viewport::new(ZoomRange::CANVAS);
        let mut gc = GestureController::default();

        gc.pointer_down(0, pos2(10.0, 10.0), 1_000, &mut boxes, &mut vp);
        assert_eq!(gc.poll(1_499), GestureOutcome::None);
        assert_eq!(gc.poll(1_500), GestureOutcome::LongPress(0));
        assert_eq!(gc.poll(2_000), GestureOutcome::None);

        gc.pointer_move(0, pos2(50.0, 50.0), &mut boxes, &mut vp);
        assert_eq!(boxes.rects[0].min, pos2(0.0, 0.0));
        assert_eq!(gc.pointer_up(0, &mut boxes), GestureOutcome::None);
    }

    #[test]
    fn move_cancels_long_press() {
        let mut boxes = scene();
        let mut vp = Viewport::new(ZoomRange::CANVAS);
        let mut gc = GestureController::default();

        gc.pointer_down(0, pos2(10.0, 10.0), 0, &mut boxes, &mut vp);
        assert!(gc.long_press_pending());
        gc.pointer_move(0, pos2(11.0, 10.0), &mut boxes, &mut vp);
        assert!(!gc.long_press_pending());
        assert_eq!(gc.poll(10_000), GestureOutcome::None);
    }

    #[test]
    fn release_without_movement_is_a_tap() {
        let mut boxes = scene();
        let mut vp = Viewport::new(ZoomRange::CANVAS);
        let mut gc = GestureController::default();

        gc.pointer_down(0, pos2(10.0, 10.0), 0, &mut boxes, &mut vp);
        assert_eq!(gc.pointer_up(0, &mut boxes), GestureOutcome::Tap(Some(0)));
        gc.pointer_down(0, pos2(500.0, 10.0), 0, &mut boxes, &mut vp);
        assert_eq!(gc.pointer_up(0, &mut boxes), GestureOutcome::Tap(None));
    }

    #[test]
    fn second_pointer_starts_pinch_and_ends_drag() {
        let mut boxes = scene();
        let mut vp = Viewport::new(ZoomRange::CANVAS);
        let mut gc = GestureController::default();

        gc.pointer_down(0, pos2(50.0, 50.0), 0, &mut boxes, &mut vp);
        gc.pointer_down(1, pos2(150.0, 50.0), 10, &mut boxes, &mut vp);
        assert_eq!(gc.mode(), GestureMode::Pinching);
        assert_eq!(boxes.held, None);
        assert_eq!(gc.dragged(), None);

        gc.pointer_move(1, pos2(250.0, 50.0), &mut boxes, &mut vp);
        // Distance went from 100 to 200.
        assert!((vp.scale() - 2.0).abs() < 1e-5);
        assert_eq!(boxes.rects[0].min, pos2(0.0, 0.0));

        gc.pointer_up(1, &mut boxes);
        assert_eq!(gc.mode(), GestureMode::Idle);
        // The remaining finger no longer does anything.
        let before = vp.transform();
        gc.pointer_move(0, pos2(0.0, 0.0), &mut boxes, &mut vp);
        assert_eq!(vp.transform(), before);
    }

    #[test]
    fn close_second_pointer_does_not_pinch() {
        let mut boxes = scene();
        let mut vp = Viewport::new(ZoomRange::CANVAS);
        let mut gc = GestureController::default();

        gc.pointer_down(0, pos2(300.0, 300.0), 0, &mut boxes, &mut vp);
        gc.pointer_down(1, pos2(305.0, 300.0), 0, &mut boxes, &mut vp);
        assert_eq!(gc.mode(), GestureMode::Panning);
    }

    #[test]
    fn pinch_scale_is_clamped() {
        let mut boxes = scene();
        let mut vp = Viewport::new(ZoomRange::GRAPH);
        let mut gc = GestureController::default();

        gc.pointer_down(0, pos2(300.0, 300.0), 0, &mut boxes, &mut vp);
        gc.pointer_down(1, pos2(320.0, 300.0), 0, &mut boxes, &mut vp);
        gc.pointer_move(1, pos2(2_000.0, 300.0), &mut boxes, &mut vp);
        assert_eq!(vp.scale(), 5.0);
    }

    #[test]
    fn cancel_releases_drag() {
        let mut boxes = scene();
        let mut vp = Viewport::new(ZoomRange::CANVAS);
        let mut gc = GestureController::default();

        gc.pointer_down(0, pos2(10.0, 10.0), 0, &mut boxes, &mut vp);
        gc.pointer_cancel(&mut boxes);
        assert_eq!(gc.mode(), GestureMode::Idle);
        assert_eq!(gc.pointer_count(), 0);
        assert_eq!(boxes.released, 1);
        assert_eq!(gc.poll(u64::MAX), GestureOutcome::None);
    }

    #[test]
    fn repeated_press_releases_the_held_item() {
        let mut boxes = scene();
        let mut vp = Viewport::new(ZoomRange::CANVAS);
        let mut gc = GestureController::default();

        gc.pointer_down(0, pos2(10.0, 10.0), 0, &mut boxes, &mut vp);
        // No up event arrived for the first press.
        gc.pointer_down(0, pos2(500.0, 10.0), 50, &mut boxes, &mut vp);
        assert_eq!(boxes.released, 1);
        assert_eq!(boxes.held, None);
        assert_eq!(gc.mode(), GestureMode::Panning);
        assert_eq!(gc.dragged(), None);
    }
}
