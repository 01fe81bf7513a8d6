use std::collections::HashSet;

use crate::coords::Vec2;
use crate::render::Renderer;

use super::frame::InputFrame;
use super::types::{
    InputEvent,
    Key,
    KeyState,
    Modifiers,
    MouseButton,
    MouseButtonState,
    PointerButtonEvent,
    PointerMoveEvent,
};

/// Input state of the window: what is held and where the cursor is.
///
/// Transitions are written into an `InputFrame` as events are applied.
#[derive(Debug, Default)]
pub struct InputState {
    pub modifiers: Modifiers,

    pub focused: bool,

    /// Cursor position in physical pixels, `None` while outside the window.
    pub pointer_pos: Option<Vec2>,

    pub keys_down: HashSet<Key>,

    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Folds `ev` into the held state and records its transitions in `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match &ev {
            InputEvent::ModifiersChanged(m) => {
                self.modifiers = *m;
            }

            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Releases are not delivered after focus is lost.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                }
            }

            InputEvent::PointerMoved(PointerMoveEvent { x, y }) => {
                let pos = Vec2::new(*x, *y);
                // Re-entering the window is a jump, not motion.
                if let Some(prev) = self.pointer_pos {
                    frame.pointer_delta += pos - prev;
                }
                self.pointer_pos = Some(pos);
            }

            InputEvent::PointerLeft => {
                self.pointer_pos = None;
            }

            InputEvent::Key {
                key,
                state,
                modifiers,
                ..
            } => {
                self.modifiers = *modifiers;

                match state {
                    KeyState::Pressed => {
                        if self.keys_down.insert(*key) {
                            frame.keys_pressed.insert(*key);
                        }
                    }
                    KeyState::Released => {
                        if self.keys_down.remove(key) {
                            frame.keys_released.insert(*key);
                        }
                    }
                }
            }

            InputEvent::PointerButton(PointerButtonEvent {
                button,
                state,
                modifiers,
                ..
            }) => {
                self.modifiers = *modifiers;

                match state {
                    MouseButtonState::Pressed => {
                        if self.buttons_down.insert(*button) {
                            frame.buttons_pressed.insert(*button);
                        }
                    }
                    MouseButtonState::Released => {
                        if self.buttons_down.remove(button) {
                            frame.buttons_released.insert(*button);
                        }
                    }
                }
            }

            InputEvent::MouseWheel { delta, modifiers } => {
                self.modifiers = *modifiers;
                frame.wheel_delta += delta.lines();
            }

            InputEvent::Text(t) => frame.text.push(t.clone()),
        }

        frame.push_event(ev);
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn button_down(&self, btn: MouseButton) -> bool {
        self.buttons_down.contains(&btn)
    }

    /// The cursor in sprite world coordinates, under the renderer's camera.
    pub fn pointer_world(&self, renderer: &Renderer<'_>) -> Option<Vec2> {
        self.pointer_pos
            .map(|p| renderer.screen_to_world(p.x, p.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{MouseWheelDelta, TextEvent};

    fn key(key: Key, state: KeyState) -> InputEvent {
        InputEvent::Key {
            key,
            state,
            modifiers: Modifiers::default(),
            code: 0,
            repeat: false,
        }
    }

    fn moved(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerMoved(PointerMoveEvent { x, y })
    }

    #[test]
    fn key_repeat_is_not_a_new_press() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, key(Key::A, KeyState::Pressed));
        assert!(frame.key_pressed(Key::A));
        frame.clear();

        state.apply_event(&mut frame, key(Key::A, KeyState::Pressed));
        assert!(!frame.key_pressed(Key::A));
        assert!(state.key_down(Key::A));

        state.apply_event(&mut frame, key(Key::A, KeyState::Released));
        assert!(frame.key_released(Key::A));
        assert!(!state.key_down(Key::A));
    }

    #[test]
    fn focus_loss_releases_everything() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, key(Key::W, KeyState::Pressed));
        state.apply_event(
            &mut frame,
            InputEvent::PointerButton(PointerButtonEvent {
                button: MouseButton::Left,
                state: MouseButtonState::Pressed,
                x: 0.0,
                y: 0.0,
                modifiers: Modifiers::default(),
            }),
        );
        assert!(frame.button_pressed(MouseButton::Left));

        state.apply_event(&mut frame, InputEvent::Focused(false));
        assert!(!state.key_down(Key::W));
        assert!(!state.button_down(MouseButton::Left));
    }

    #[test]
    fn pointer_delta_accumulates_within_a_frame() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, moved(10.0, 10.0));
        assert_eq!(frame.pointer_delta, Vec2::default());

        state.apply_event(&mut frame, moved(13.0, 8.0));
        state.apply_event(&mut frame, moved(15.0, 9.0));
        assert_eq!(frame.pointer_delta, Vec2::new(5.0, -1.0));

        frame.clear();
        state.apply_event(&mut frame, InputEvent::PointerLeft);
        state.apply_event(&mut frame, moved(100.0, 100.0));
        assert_eq!(frame.pointer_delta, Vec2::default());
        assert_eq!(state.pointer_pos, Some(Vec2::new(100.0, 100.0)));
    }

    #[test]
    fn wheel_delta_is_in_lines() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        let m = Modifiers::default();

        state.apply_event(
            &mut frame,
            InputEvent::MouseWheel {
                delta: MouseWheelDelta::Line { x: 0.0, y: 1.0 },
                modifiers: m,
            },
        );
        state.apply_event(
            &mut frame,
            InputEvent::MouseWheel {
                delta: MouseWheelDelta::Pixel { x: 0.0, y: 40.0 },
                modifiers: m,
            },
        );
        assert_eq!(frame.wheel_delta, Vec2::new(0.0, 3.0));

        frame.clear();
        assert_eq!(frame.wheel_delta, Vec2::default());
    }

    #[test]
    fn text_and_raw_events_are_kept_in_order() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        let text = InputEvent::Text(TextEvent { text: "hi".into() });
        state.apply_event(&mut frame, moved(1.0, 1.0));
        state.apply_event(&mut frame, text.clone());

        assert_eq!(frame.text.len(), 1);
        assert_eq!(frame.events, vec![moved(1.0, 1.0), text]);
    }

    #[test]
    fn pointer_world_follows_the_camera() {
        let (mut renderer, _log) = Renderer::headless(200, 100);
        let mut state = InputState::default();
        assert_eq!(state.pointer_world(&renderer), None);

        state.pointer_pos = Some(Vec2::new(100.0, 50.0));
        assert_eq!(state.pointer_world(&renderer), Some(Vec2::new(0.0, 0.0)));

        renderer.camera.x = 3.0;
        let p = state.pointer_world(&renderer).unwrap();
        assert!((p.x - 3.0).abs() < 1e-6);
    }
}
