use std::{fmt, str::FromStr};

/// Gesture grammar the selection tool applies to incoming pointer events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum SelectionType {
    #[default]
    Rectangle,
    Brush,
    Lasso,
    Polygon,
    Sample,
    Roi,
}

/// How the host combines the gesture's area with a previous selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum SelectionModifier {
    #[default]
    Replace,
    Add,
    Subtract,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind} name: '{name}'")]
pub struct ParseNameError {
    kind: &'static str,
    name: String,
}

/// Bidirectional name table
pub trait NamedVariant: Sized + Copy + 'static {
    const KIND: &'static str;
    const ALL: &'static [Self];

    fn name(self) -> &'static str;

    fn from_name(name: &str) -> Result<Self, ParseNameError> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.name() == name)
            .ok_or_else(|| ParseNameError {
                kind: Self::KIND,
                name: name.to_string(),
            })
    }
}

/// Generates `ALL` and `name` from one list, so neither can miss a variant
macro_rules! impl_named_variant {
    ($ty:ty, $kind:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl NamedVariant for $ty {
            const KIND: &'static str = $kind;
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name),+
                }
            }
        }
    };
}

impl_named_variant!(SelectionType, "selection type", {
    Rectangle => "Rectangle",
    Brush => "Brush",
    Lasso => "Lasso",
    Polygon => "Polygon",
    Sample => "Sample",
    Roi => "ROI",
});

impl_named_variant!(SelectionModifier, "selection modifier", {
    Replace => "Replace",
    Add => "Add",
    Subtract => "Subtract",
});

macro_rules! impl_name_conversions {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $ty {
            type Err = ParseNameError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_name(s)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = ParseNameError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::from_name(&value)
            }
        }

        impl From<$ty> for &'static str {
            fn from(value: $ty) -> Self {
                value.name()
            }
        }
    };
}

impl_name_conversions!(SelectionType);
impl_name_conversions!(SelectionModifier);

impl SelectionType {
    /// Whether the shape mask carries the modifier glyph for this type
    pub fn shows_modifier_glyph(self) -> bool {
        !matches!(self, Self::Sample | Self::Roi)
    }
}
