use std::sync::Arc;

use super::{PixelSelectionTool, BRUSH_RADIUS_DELTA};
use crate::{
    raster, InputEvent, Key, KeyModifiers, PixelPos, PointerButton, PointerButtons, SelectionMasks,
    SelectionNotification, SelectionType, ViewportSize,
};

impl PixelSelectionTool {
    /// Feeds one host event into the tool.
    ///
    /// Returns true if the host should not handle the event itself. This is only the case for
    /// the context menu following a right click which closed a polygon.
    pub fn handle_event(&mut self, event: InputEvent) -> bool {
        log::trace!("Handle {event:?}");
        let should_paint = match event {
            // Our own masks end up in the viewport's paint, so this must never feed back
            InputEvent::Paint => return false,
            InputEvent::ContextMenu => return std::mem::take(&mut self.prevent_context_menu),
            InputEvent::Resize(size) => {
                self.resize(size);
                return false;
            }
            _ if !self.enabled => return false,
            InputEvent::PointerPressed {
                pos,
                button,
                buttons,
            } => self.pointer_pressed(pos, button, buttons),
            InputEvent::PointerMoved { pos, buttons } => self.pointer_moved(pos, buttons),
            InputEvent::PointerReleased {
                pos,
                button,
                buttons,
            } => self.pointer_released(pos, button, buttons),
            InputEvent::PointerDoubleClicked { pos, button } => {
                self.pointer_double_clicked(pos, button)
            }
            InputEvent::Wheel { delta, modifiers } => self.wheel(delta, modifiers),
            InputEvent::KeyPressed { key, repeat } => !repeat && self.key_pressed(key),
            InputEvent::KeyReleased { .. } => false,
        };

        if should_paint {
            self.paint();
        }
        false
    }

    pub fn on_pointer_down(&mut self, pos: PixelPos, button: PointerButton) -> bool {
        let buttons = self.mouse_buttons.with(button);
        self.handle_event(InputEvent::PointerPressed {
            pos,
            button,
            buttons,
        })
    }

    pub fn on_pointer_move(&mut self, pos: PixelPos, buttons: PointerButtons) -> bool {
        self.handle_event(InputEvent::PointerMoved { pos, buttons })
    }

    pub fn on_pointer_up(&mut self, pos: PixelPos, button: PointerButton) -> bool {
        let buttons = self.mouse_buttons.without(button);
        self.handle_event(InputEvent::PointerReleased {
            pos,
            button,
            buttons,
        })
    }

    pub fn on_double_click(&mut self, pos: PixelPos, button: PointerButton) -> bool {
        self.handle_event(InputEvent::PointerDoubleClicked { pos, button })
    }

    pub fn on_wheel(&mut self, delta: f32, modifiers: KeyModifiers) -> bool {
        self.handle_event(InputEvent::Wheel { delta, modifiers })
    }

    pub fn on_key_down(&mut self, key: Key, repeat: bool) -> bool {
        self.handle_event(InputEvent::KeyPressed { key, repeat })
    }

    pub fn on_resize(&mut self, size: ViewportSize) -> bool {
        self.handle_event(InputEvent::Resize(size))
    }

    /// New empty masks at the new size. A running gesture survives.
    fn resize(&mut self, size: ViewportSize) {
        log::debug!("Resize to {}x{}", size.width(), size.height());
        self.size = size;
        self.masks = Arc::new(SelectionMasks::transparent(size));
        self.notifier.emit(SelectionNotification::Changed {
            gesture_active: self.active,
        });
    }

    fn pointer_pressed(
        &mut self,
        pos: PixelPos,
        button: PointerButton,
        buttons: PointerButtons,
    ) -> bool {
        self.mouse_buttons = buttons;
        self.mouse_position = Some(pos);

        match self.selection_type {
            SelectionType::Rectangle
            | SelectionType::Brush
            | SelectionType::Lasso
            | SelectionType::Sample => {
                if button == PointerButton::Primary {
                    self.start_selection();
                    self.mouse_positions.clear();
                    self.mouse_positions.push(pos);
                    return true;
                }
                // the live outline follows the pointer buttons
                matches!(self.selection_type, SelectionType::Brush | SelectionType::Sample)
            }
            SelectionType::Polygon => {
                match button {
                    PointerButton::Primary if self.mouse_positions.is_empty() => {
                        self.start_selection();
                        // anchor plus the live point following the pointer
                        self.mouse_positions.extend([pos, pos]);
                    }
                    PointerButton::Primary => {
                        if let Some(live) = self.mouse_positions.last_mut() {
                            *live = pos;
                        }
                        self.mouse_positions.push(pos);
                    }
                    PointerButton::Secondary if self.active => self.mouse_positions.push(pos),
                    _ => return false,
                }
                if raster::polygon_closes(&self.mouse_positions) {
                    log::debug!("Close polygon at first vertex");
                    self.finish_gesture();
                    return false;
                }
                true
            }
            SelectionType::Roi => false,
        }
    }

    fn pointer_moved(&mut self, pos: PixelPos, buttons: PointerButtons) -> bool {
        self.mouse_buttons = buttons;
        self.mouse_position = Some(pos);
        let recording = self.active && buttons.is_primary_held();

        match self.selection_type {
            SelectionType::Rectangle => {
                if recording {
                    self.set_rectangle_corner(pos);
                }
                self.active
            }
            SelectionType::Brush => {
                if recording {
                    self.mouse_positions.push(pos);
                }
                true
            }
            SelectionType::Lasso => {
                if recording && !self.mouse_positions.is_empty() {
                    self.mouse_positions.push(pos);
                }
                self.active
            }
            SelectionType::Polygon => {
                if let Some(live) = self.mouse_positions.last_mut() {
                    *live = pos;
                }
                self.active
            }
            SelectionType::Sample => {
                if recording {
                    self.mouse_positions = vec![pos];
                }
                true
            }
            SelectionType::Roi => false,
        }
    }

    fn pointer_released(
        &mut self,
        pos: PixelPos,
        button: PointerButton,
        buttons: PointerButtons,
    ) -> bool {
        self.mouse_buttons = buttons;
        self.mouse_position = Some(pos);

        let ends_gesture = match (self.selection_type, button) {
            (SelectionType::Rectangle, PointerButton::Primary) => {
                if self.active {
                    self.set_rectangle_corner(pos);
                }
                true
            }
            (SelectionType::Brush | SelectionType::Lasso, PointerButton::Primary) => {
                if self.active && self.mouse_positions.last() != Some(&pos) {
                    self.mouse_positions.push(pos);
                }
                true
            }
            (SelectionType::Sample, PointerButton::Primary) => {
                if self.active {
                    self.mouse_positions = vec![pos];
                }
                true
            }
            (SelectionType::Polygon, PointerButton::Secondary) => {
                if self.active {
                    self.prevent_context_menu = true;
                }
                true
            }
            _ => false,
        };

        if ends_gesture && self.active {
            self.finish_gesture();
            return false;
        }
        matches!(self.selection_type, SelectionType::Brush | SelectionType::Sample)
    }

    fn pointer_double_clicked(&mut self, pos: PixelPos, button: PointerButton) -> bool {
        self.mouse_position = Some(pos);
        if self.selection_type == SelectionType::Polygon
            && button == PointerButton::Primary
            && self.active
        {
            self.finish_gesture();
        }
        false
    }

    /// The final geometry stays in the masks the host reads when the gesture ends
    fn finish_gesture(&mut self) {
        self.paint();
        self.end_selection();
    }

    fn wheel(&mut self, delta: f32, modifiers: KeyModifiers) -> bool {
        if self.selection_type != SelectionType::Brush {
            return false;
        }
        if let Some(fixed) = self.fixed_brush_radius_modifier {
            if modifiers.is_exactly(fixed) {
                return false;
            }
        }
        if delta < 0.0 {
            self.apply_brush_radius(self.brush_radius - BRUSH_RADIUS_DELTA)
        } else if delta > 0.0 {
            self.apply_brush_radius(self.brush_radius + BRUSH_RADIUS_DELTA)
        } else {
            false
        }
    }

    fn key_pressed(&mut self, key: Key) -> bool {
        match (key, self.selection_type) {
            (Key::Escape, SelectionType::Polygon | SelectionType::Lasso) => {
                self.abort_selection()
            }
            _ => false,
        }
    }

    /// The second rectangle corner is appended once and overwritten afterwards
    fn set_rectangle_corner(&mut self, pos: PixelPos) {
        if self.mouse_positions.len() < 2 {
            self.mouse_positions.push(pos);
        } else if let Some(corner) = self.mouse_positions.last_mut() {
            *corner = pos;
        }
    }
}
