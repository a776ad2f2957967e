use plotters::style::{RGBAColor, RGBColor};

/// Default trace colour cycle, in plotly's order.
pub const COLORWAY: [RGBColor; 10] = [
    RGBColor(0x63, 0x6e, 0xfa),
    RGBColor(0xef, 0x55, 0x3b),
    RGBColor(0x00, 0xcc, 0x96),
    RGBColor(0xab, 0x63, 0xfa),
    RGBColor(0xff, 0xa1, 0x5a),
    RGBColor(0x19, 0xd3, 0xf3),
    RGBColor(0xff, 0x66, 0x92),
    RGBColor(0xb6, 0xe8, 0x80),
    RGBColor(0xff, 0x97, 0xff),
    RGBColor(0xfe, 0xcb, 0x52),
];

pub const INCREASING: RGBColor = RGBColor(0x3d, 0x99, 0x70);
pub const DECREASING: RGBColor = RGBColor(0xff, 0x41, 0x36);

pub fn trace_color(idx: usize) -> RGBColor {
    COLORWAY[idx % COLORWAY.len()]
}

/// Parse a CSS-style colour: a handful of names, `#rrggbb`, `rgb(..)` or `rgba(..)`.
pub fn parse_color(spec: &str) -> Option<RGBAColor> {
    let spec = spec.trim().to_ascii_lowercase();
    let named = match spec.as_str() {
        "black" => Some(RGBColor(0, 0, 0)),
        "white" => Some(RGBColor(255, 255, 255)),
        "red" => Some(RGBColor(255, 0, 0)),
        "green" => Some(RGBColor(0, 128, 0)),
        "blue" => Some(RGBColor(0, 0, 255)),
        "orange" => Some(RGBColor(255, 165, 0)),
        "gray" | "grey" => Some(RGBColor(128, 128, 128)),
        _ => None,
    };
    if let Some(RGBColor(r, g, b)) = named {
        return Some(RGBAColor(r, g, b, 1.0));
    }

    if let Some(hex) = spec.strip_prefix('#') {
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        return Some(RGBAColor(channel(0)?, channel(2)?, channel(4)?, 1.0));
    }

    let (body, has_alpha) = if let Some(rest) = spec.strip_prefix("rgba(") {
        (rest.strip_suffix(')')?, true)
    } else if let Some(rest) = spec.strip_prefix("rgb(") {
        (rest.strip_suffix(')')?, false)
    } else {
        return None;
    };

    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    if parts.len() != if has_alpha { 4 } else { 3 } {
        return None;
    }
    let r = parts[0].parse::<u8>().ok()?;
    let g = parts[1].parse::<u8>().ok()?;
    let b = parts[2].parse::<u8>().ok()?;
    let a = if has_alpha {
        parts[3].parse::<f64>().ok()?.clamp(0.0, 1.0)
    } else {
        1.0
    };
    Some(RGBAColor(r, g, b, a))
}

/// Named continuous colour scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colorscale {
    Viridis,
    Blues,
    RdBu,
}

const VIRIDIS: &[(u8, u8, u8)] = &[
    (0x44, 0x01, 0x54),
    (0x48, 0x28, 0x78),
    (0x3e, 0x49, 0x89),
    (0x31, 0x68, 0x8e),
    (0x26, 0x82, 0x8e),
    (0x1f, 0x9e, 0x89),
    (0x35, 0xb7, 0x79),
    (0x6e, 0xce, 0x58),
    (0xb5, 0xde, 0x2b),
    (0xfd, 0xe7, 0x25),
];

const BLUES: &[(u8, u8, u8)] = &[
    (247, 251, 255),
    (222, 235, 247),
    (198, 219, 239),
    (158, 202, 225),
    (107, 174, 214),
    (66, 146, 198),
    (33, 113, 181),
    (8, 81, 156),
    (8, 48, 107),
];

const RDBU: &[(u8, u8, u8)] = &[
    (103, 0, 31),
    (178, 24, 43),
    (214, 96, 77),
    (244, 165, 130),
    (253, 219, 199),
    (247, 247, 247),
    (209, 229, 240),
    (146, 197, 222),
    (67, 147, 195),
    (33, 102, 172),
    (5, 48, 97),
];

impl Colorscale {
    /// Unknown names fall back to Viridis.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "blues" => Colorscale::Blues,
            "rdbu" => Colorscale::RdBu,
            _ => Colorscale::Viridis,
        }
    }

    fn stops(self) -> &'static [(u8, u8, u8)] {
        match self {
            Colorscale::Viridis => VIRIDIS,
            Colorscale::Blues => BLUES,
            Colorscale::RdBu => RDBU,
        }
    }

    /// Colour at `t` in `[0, 1]`, linearly interpolated between stops.
    pub fn sample(self, t: f64) -> RGBColor {
        let stops = self.stops();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let pos = t * (stops.len() - 1) as f64;
        let lo = pos.floor() as usize;
        let hi = (lo + 1).min(stops.len() - 1);
        let frac = pos - lo as f64;

        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
        let (a, b) = (stops[lo], stops[hi]);
        RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
    }
}

/// Finite `(min, max)` of a set of values; `None` when nothing is finite.
pub fn value_range<'a, I: IntoIterator<Item = &'a f64>>(values: I) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Position of `v` within `(lo, hi)`, 0.5 for a degenerate range.
pub fn normalize(v: f64, (lo, hi): (f64, f64)) -> f64 {
    if hi > lo { (v - lo) / (hi - lo) } else { 0.5 }
}
