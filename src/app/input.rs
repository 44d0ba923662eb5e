use eframe::egui;
use noteboard::PointerId;

/// Pointer 0 is the mouse or first finger, pointer 1 a second finger.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) enum PointerEvent {
    Down(PointerId, egui::Pos2),
    Move(PointerId, egui::Pos2),
    Up(PointerId),
    Cancel,
}

/// egui reports the first touch as ordinary pointer events as well, so only
/// the second touch is taken from the raw touch stream.
#[derive(Default)]
pub(super) struct TouchMap {
    primary: Option<egui::TouchId>,
    secondary: Option<egui::TouchId>,
}

impl TouchMap {
    /// Converts this frame's events to pointer events in canvas-local
    /// coordinates. Presses only start when `accept_down` is set and the press
    /// lies inside `rect`.
    pub(super) fn collect(
        &mut self,
        events: &[egui::Event],
        rect: egui::Rect,
        accept_down: bool,
    ) -> Vec<PointerEvent> {
        let local = |p: egui::Pos2| (p - rect.min).to_pos2();
        let mut out = Vec::new();
        for event in events {
            match event {
                egui::Event::PointerButton {
                    pos,
                    button: egui::PointerButton::Primary,
                    pressed,
                    ..
                } => {
                    if !*pressed {
                        out.push(PointerEvent::Up(0));
                    } else if accept_down && rect.contains(*pos) {
                        out.push(PointerEvent::Down(0, local(*pos)));
                    }
                }
                egui::Event::PointerMoved(pos) => out.push(PointerEvent::Move(0, local(*pos))),
                egui::Event::PointerGone => out.push(PointerEvent::Cancel),
                egui::Event::Touch { id, phase, pos, .. } => match phase {
                    egui::TouchPhase::Start => {
                        if self.primary.is_none() {
                            self.primary = Some(*id);
                        } else if self.secondary.is_none() && rect.contains(*pos) {
                            self.secondary = Some(*id);
                            out.push(PointerEvent::Down(1, local(*pos)));
                        }
                    }
                    egui::TouchPhase::Move => {
                        if self.secondary == Some(*id) {
                            out.push(PointerEvent::Move(1, local(*pos)));
                        }
                    }
                    egui::TouchPhase::End | egui::TouchPhase::Cancel => {
                        if self.secondary == Some(*id) {
                            self.secondary = None;
                            out.push(PointerEvent::Up(1));
                        } else if self.primary == Some(*id) {
                            self.primary = None;
                        }
                    }
                },
                _ => {}
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(id: u64, phase: egui::TouchPhase, x: f32, y: f32) -> egui::Event {
        egui::Event::Touch {
            device_id: egui::TouchDeviceId(0),
            id: egui::TouchId(id),
            phase,
            pos: egui::pos2(x, y),
            force: None,
        }
    }

    #[test]
    fn second_touch_becomes_pointer_one() {
        let rect = egui::Rect::from_min_size(egui::pos2(10.0, 20.0), egui::vec2(400.0, 300.0));
        let mut map = TouchMap::default();
        let events = [
            touch(7, egui::TouchPhase::Start, 50.0, 50.0),
            touch(8, egui::TouchPhase::Start, 150.0, 60.0),
            touch(8, egui::TouchPhase::Move, 170.0, 60.0),
            touch(7, egui::TouchPhase::Move, 40.0, 50.0),
            touch(8, egui::TouchPhase::End, 170.0, 60.0),
        ];
        assert_eq!(
            map.collect(&events, rect, true),
            vec![
                PointerEvent::Down(1, egui::pos2(140.0, 40.0)),
                PointerEvent::Move(1, egui::pos2(160.0, 40.0)),
                PointerEvent::Up(1),
            ]
        );
    }

    #[test]
    fn presses_outside_or_blocked_are_dropped() {
        let rect = egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(100.0, 100.0));
        let press = |x: f32| egui::Event::PointerButton {
            pos: egui::pos2(x, 10.0),
            button: egui::PointerButton::Primary,
            pressed: true,
            modifiers: egui::Modifiers::NONE,
        };
        let mut map = TouchMap::default();
        assert!(map.collect(&[press(500.0)], rect, true).is_empty());
        assert!(map.collect(&[press(50.0)], rect, false).is_empty());
        assert_eq!(
            map.collect(&[press(50.0)], rect, true),
            vec![PointerEvent::Down(0, egui::pos2(50.0, 10.0))]
        );
    }
}
