use serde::{Deserialize, Serialize};

/// Shaping function applied to the normalized time between two keyframes.
///
/// The easing stored on a keyframe governs the segment *leaving* that
/// keyframe, up to the next one in the same track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Easing {
    #[default]
    Linear,
    EaseInQuadratic,
    EaseOutQuadratic,
    EaseInOutQuadratic,
    /// Holds the start value until the next keyframe's frame, then snaps.
    Instant,
}

impl Easing {
    pub const ALL: [Easing; 5] = [
        Easing::Linear,
        Easing::EaseInQuadratic,
        Easing::EaseOutQuadratic,
        Easing::EaseInOutQuadratic,
        Easing::Instant,
    ];

    /// Maps `t` (clamped to `[0, 1]`) to the eased parameter.
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseInQuadratic => t * t,
            Easing::EaseOutQuadratic => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOutQuadratic => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    let f = 1.0 - t;
                    1.0 - 2.0 * f * f
                }
            }
            Easing::Instant => {
                if t < 1.0 {
                    0.0
                } else {
                    1.0
                }
            }
        }
    }

    /// Human readable label for menus.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Easing::Linear => "Linear",
            Easing::EaseInQuadratic => "Ease In (Quadratic)",
            Easing::EaseOutQuadratic => "Ease Out (Quadratic)",
            Easing::EaseInOutQuadratic => "Ease In And Out (Quadratic)",
            Easing::Instant => "Instant",
        }
    }
}

/// `a + (b - a) * t`
#[inline]
#[must_use]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
