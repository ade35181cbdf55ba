//! Shared figure styling: colors, fonts and canvas sizes.

use plotters::style::RGBColor;

use crate::screening::TrafficLight;

/// Default canvas size for single-panel figures.
pub const CANVAS: (u32, u32) = (1000, 700);

/// Wide canvas for side-by-side panels.
pub const WIDE_CANVAS: (u32, u32) = (1500, 560);

/// Series palette, one color per line in drawing order.
pub const PALETTE: [RGBColor; 8] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
];

pub const TRAFFIC_GREEN: RGBColor = RGBColor(0x2e, 0xcc, 0x71);
pub const TRAFFIC_YELLOW: RGBColor = RGBColor(0xf1, 0xc4, 0x0f);
pub const TRAFFIC_RED: RGBColor = RGBColor(0xe7, 0x4c, 0x3c);
pub const TRAFFIC_UNKNOWN: RGBColor = RGBColor(0x95, 0xa5, 0xa6);

pub fn traffic_color(light: TrafficLight) -> RGBColor {
    match light {
        TrafficLight::Green => TRAFFIC_GREEN,
        TrafficLight::Yellow => TRAFFIC_YELLOW,
        TrafficLight::Red => TRAFFIC_RED,
        TrafficLight::Unknown => TRAFFIC_UNKNOWN,
    }
}

/// Verdict strings as written by the screening tables.
pub fn traffic_from_str(s: &str) -> TrafficLight {
    match s {
        "green" => TrafficLight::Green,
        "yellow" => TrafficLight::Yellow,
        "red" => TrafficLight::Red,
        _ => TrafficLight::Unknown,
    }
}

pub fn series_color(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_wraps_around() {
        assert_eq!(series_color(0), series_color(PALETTE.len()));
    }

    #[test]
    fn verdict_strings_map_to_colors() {
        assert_eq!(traffic_color(traffic_from_str("green")), TRAFFIC_GREEN);
        assert_eq!(traffic_color(traffic_from_str("whatever")), TRAFFIC_UNKNOWN);
    }
}
