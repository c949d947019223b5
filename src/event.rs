use std::num::NonZeroU32;

/// Integer pixel position relative to the top-left corner of the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelPos {
    pub x: i32,
    pub y: i32,
}

impl PixelPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn to_pos2(self) -> emath::Pos2 {
        emath::pos2(self.x as f32, self.y as f32)
    }
}

impl From<emath::Pos2> for PixelPos {
    fn from(value: emath::Pos2) -> Self {
        Self {
            x: value.x.floor() as i32,
            y: value.y.floor() as i32,
        }
    }
}

impl From<(i32, i32)> for PixelPos {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Bitmask of the pointer buttons held while an event was generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PointerButtons(u8);

impl PointerButtons {
    pub const NONE: Self = Self(0);
    pub const PRIMARY: Self = Self(1);
    pub const SECONDARY: Self = Self(1 << 1);
    pub const MIDDLE: Self = Self(1 << 2);

    pub fn contains(self, button: PointerButton) -> bool {
        self.0 & Self::from(button).0 != 0
    }

    pub fn with(self, button: PointerButton) -> Self {
        Self(self.0 | Self::from(button).0)
    }

    pub fn without(self, button: PointerButton) -> Self {
        Self(self.0 & !Self::from(button).0)
    }

    pub fn is_primary_held(self) -> bool {
        self.contains(PointerButton::Primary)
    }
}

impl From<PointerButton> for PointerButtons {
    fn from(value: PointerButton) -> Self {
        match value {
            PointerButton::Primary => Self::PRIMARY,
            PointerButton::Secondary => Self::SECONDARY,
            PointerButton::Middle => Self::MIDDLE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Other(u32),
}

/// Keyboard modifier which can pin the brush radius while the wheel is used for navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum KeyModifier {
    Shift,
    Ctrl,
    Alt,
    Command,
}

/// Keyboard modifiers held while an event was generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub command: bool,
}

impl KeyModifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        command: false,
    };

    /// True if exactly `modifier` is held and nothing else
    pub fn is_exactly(&self, modifier: KeyModifier) -> bool {
        let only = match modifier {
            KeyModifier::Shift => Self {
                shift: true,
                ..Self::NONE
            },
            KeyModifier::Ctrl => Self {
                ctrl: true,
                ..Self::NONE
            },
            KeyModifier::Alt => Self {
                alt: true,
                ..Self::NONE
            },
            KeyModifier::Command => Self {
                command: true,
                ..Self::NONE
            },
        };
        *self == only
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewportSize {
    pub width: NonZeroU32,
    pub height: NonZeroU32,
}

impl ViewportSize {
    pub const fn new(width: NonZeroU32, height: NonZeroU32) -> Self {
        Self { width, height }
    }

    /// `None` for degenerate sizes, which hosts have to filter before resizing the tool
    pub fn try_from_dimensions(width: u32, height: u32) -> Option<Self> {
        Some(Self {
            width: NonZeroU32::new(width)?,
            height: NonZeroU32::new(height)?,
        })
    }

    pub fn width(&self) -> u32 {
        self.width.get()
    }

    pub fn height(&self) -> u32 {
        self.height.get()
    }
}

/// Raw input forwarded by the host viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerPressed {
        pos: PixelPos,
        button: PointerButton,
        /// Buttons held after the press
        buttons: PointerButtons,
    },
    PointerMoved {
        pos: PixelPos,
        buttons: PointerButtons,
    },
    PointerReleased {
        pos: PixelPos,
        button: PointerButton,
        /// Buttons still held after the release
        buttons: PointerButtons,
    },
    /// Sent in addition to the press and release events of the second click
    PointerDoubleClicked {
        pos: PixelPos,
        button: PointerButton,
    },
    Wheel {
        delta: f32,
        modifiers: KeyModifiers,
    },
    KeyPressed {
        key: Key,
        repeat: bool,
    },
    KeyReleased {
        key: Key,
        repeat: bool,
    },
    Resize(ViewportSize),
    ContextMenu,
    /// Redraw of the viewport, possibly triggered by the tool's own masks
    Paint,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buttons_bitmask() {
        let buttons = PointerButtons::NONE
            .with(PointerButton::Primary)
            .with(PointerButton::Secondary);
        assert!(buttons.is_primary_held());
        assert!(buttons.contains(PointerButton::Secondary));
        assert!(!buttons.contains(PointerButton::Middle));
        assert_eq!(
            PointerButtons::SECONDARY,
            buttons.without(PointerButton::Primary)
        );
    }

    #[test]
    fn exact_modifier_match() {
        let shift_ctrl = KeyModifiers {
            shift: true,
            ctrl: true,
            ..KeyModifiers::NONE
        };
        assert!(!shift_ctrl.is_exactly(KeyModifier::Shift));
        let shift = KeyModifiers {
            shift: true,
            ..KeyModifiers::NONE
        };
        assert!(shift.is_exactly(KeyModifier::Shift));
    }

    #[test]
    fn pixel_pos_floors_host_positions() {
        assert_eq!(PixelPos::new(3, -1), emath::pos2(3.7, -0.2).into());
    }

    #[test]
    fn zero_sized_viewport_is_rejected() {
        assert_eq!(None, ViewportSize::try_from_dimensions(0, 10));
        assert!(ViewportSize::try_from_dimensions(1, 1).is_some());
    }
}
