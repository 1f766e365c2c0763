use palette::{Hsv, IntoColor, Srgb};

use super::{ClassificationResult, Label};
use crate::color::ColorSample;
use crate::config::HueRule;

/// Hue of an averaged colour in degrees, always in `[0, 360)`.
///
/// Channels are scaled to `[0, 1]` and taken through the standard RGB → HSV
/// transform; saturation and value are discarded. Greys have hue 0.
pub fn hue_degrees(color: &ColorSample) -> f64 {
    let rgb = Srgb::new(color.red / 255.0, color.green / 255.0, color.blue / 255.0);
    let hsv: Hsv<palette::encoding::Srgb, f64> = rgb.into_color();
    // into_positive_degrees can land on exactly 360.0 for tiny negative angles.
    hsv.hue.into_positive_degrees() % 360.0
}

/// Hue against `cutoff_deg`, in the direction given by `rule`. Comparisons are
/// strict: a hue equal to the cutoff is NEGATIVE under either rule.
pub fn classify_hue(color: &ColorSample, cutoff_deg: f64, rule: HueRule) -> ClassificationResult {
    let hue = hue_degrees(color);
    let positive = match rule {
        HueRule::BelowCutoff => hue < cutoff_deg,
        HueRule::AboveCutoff => hue > cutoff_deg,
    };
    ClassificationResult {
        metric: hue,
        label: if positive { Label::Positive } else { Label::Negative },
        threshold_used: cutoff_deg,
    }
}
