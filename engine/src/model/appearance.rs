//! Enumerated appearance kinds carried by `Value`.
//!
//! Each enum lists its variants in `ALL`, which is also the order used when a
//! number is coerced into the enum (index, wrapped into range).

use serde::{Deserialize, Serialize};

macro_rules! appearance_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? } default $default:ident) => {
        $(#[$meta])*
        #[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
        #[serde(rename_all = "camelCase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Case-insensitive lookup by display label.
            pub fn from_label(label: &str) -> Option<Self> {
                let label = label.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.label().eq_ignore_ascii_case(label))
            }

            /// Wraps `index` into the variant list.
            pub fn from_index(index: i64) -> Self {
                let len = Self::ALL.len() as i64;
                Self::ALL[index.rem_euclid(len) as usize]
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.label())
            }
        }
    };
}

appearance_enum! {
    /// Where a layer is pinned inside its parent.
    Anchoring {
        TopLeft => "Top Left",
        TopCenter => "Top Center",
        TopRight => "Top Right",
        CenterLeft => "Center Left",
        Center => "Center",
        CenterRight => "Center Right",
        BottomLeft => "Bottom Left",
        BottomCenter => "Bottom Center",
        BottomRight => "Bottom Right",
    } default TopLeft
}

appearance_enum! {
    BlendMode {
        Normal => "Normal",
        Multiply => "Multiply",
        Screen => "Screen",
        Overlay => "Overlay",
        Darken => "Darken",
        Lighten => "Lighten",
        ColorDodge => "Color Dodge",
        ColorBurn => "Color Burn",
        SoftLight => "Soft Light",
        HardLight => "Hard Light",
        Difference => "Difference",
        Exclusion => "Exclusion",
        Hue => "Hue",
        Saturation => "Saturation",
        Color => "Color",
        Luminosity => "Luminosity",
    } default Normal
}

appearance_enum! {
    TextAlignment {
        Left => "Left",
        Center => "Center",
        Right => "Right",
        Justify => "Justify",
    } default Left
}

appearance_enum! {
    /// Child arrangement inside a group layer.
    LayerDirection {
        None => "None",
        Horizontal => "Horizontal",
        Vertical => "Vertical",
        Grid => "Grid",
    } default None
}

appearance_enum! {
    /// How media content is scaled into its layer.
    FitStyle {
        Fit => "Fit",
        Fill => "Fill",
        Stretch => "Stretch",
    } default Fit
}
