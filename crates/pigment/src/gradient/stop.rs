// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{mix_colors, AbstractGradient, EPSILON};
use crate::color::Color;
use crate::color_space::ColorSpace;
use crate::error::GradientError;
use peniko::color::{parse_color, Srgb};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, warn};

const KRITA_NS: &str = "http://krita.org/namespaces/svg/krita";

/// Where the color of a stop comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StopType {
    #[default]
    Color,
    Foreground,
    Background,
}

impl StopType {
    fn svg_name(self) -> &'static str {
        match self {
            StopType::Color => "color-stop",
            StopType::Foreground => "foreground-stop",
            StopType::Background => "background-stop",
        }
    }

    fn from_svg_name(name: &str) -> Self {
        match name {
            "foreground-stop" => StopType::Foreground,
            "background-stop" => StopType::Background,
            _ => StopType::Color,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradientStop {
    pub position: f64,
    pub color: Color,
    pub kind: StopType,
}

impl GradientStop {
    pub fn new(position: f64, color: Color, kind: StopType) -> Self {
        Self {
            position,
            color,
            kind,
        }
    }
}

/// A gradient defined by color stops, mixed in RGB between neighbours.
#[derive(Debug, Clone)]
pub struct StopGradient {
    name: String,
    space: Arc<dyn ColorSpace>,
    stops: Vec<GradientStop>,
}

impl StopGradient {
    pub fn new(name: impl Into<String>, space: Arc<dyn ColorSpace>) -> Self {
        Self {
            name: name.into(),
            space,
            stops: Vec::new(),
        }
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    /// Replace all stops. They are sorted by position and converted into the gradient's
    /// space.
    pub fn set_stops(&mut self, stops: Vec<GradientStop>) {
        self.stops = stops;
        for stop in &mut self.stops {
            stop.color.convert_to(self.space.clone());
        }
        self.stops.sort_by(|a, b| a.position.total_cmp(&b.position));
    }

    /// Load the first `<linearGradient>` or `<radialGradient>` of an SVG document.
    pub fn load_svg(text: &str, space: Arc<dyn ColorSpace>) -> Result<Self, GradientError> {
        let doc = roxmltree::Document::parse(text)?;
        let element = doc
            .descendants()
            .find(|n| matches!(n.tag_name().name(), "linearGradient" | "radialGradient"))
            .ok_or(GradientError::NoGradientElement)?;

        let mut gradient = StopGradient::new(element.attribute("id").unwrap_or_default(), space);

        let mut stops = Vec::new();
        for node in element.children().filter(|n| n.has_tag_name("stop")) {
            let style = node.attribute("style").unwrap_or_default();
            let property = |key: &str| node.attribute(key).or_else(|| style_value(style, key));

            let position = node.attribute("offset").map_or(0.0, parse_offset);
            let color_text = property("stop-color").unwrap_or("black");
            let color = parse_color(color_text)
                .map_err(|_| GradientError::InvalidColor(color_text.to_string()))?;
            let mut color = color.to_alpha_color::<Srgb>();

            if let Some(opacity) = property("stop-opacity") {
                match opacity.trim().parse::<f32>() {
                    Ok(opacity) => color = color.multiply_alpha(opacity.clamp(0.0, 1.0)),
                    Err(_) => warn!(opacity, "ignoring unparsable stop opacity"),
                }
            }

            let kind = node
                .attribute((KRITA_NS, "stop-type"))
                .map_or(StopType::Color, StopType::from_svg_name);

            stops.push(GradientStop::new(
                position,
                Color::from_rgba(color, gradient.space.clone()),
                kind,
            ));
        }

        if stops.is_empty() {
            return Err(GradientError::NoStops);
        }

        gradient.set_stops(stops);
        debug!(
            name = gradient.name.as_str(),
            stops = gradient.stops.len(),
            "loaded stop gradient"
        );
        Ok(gradient)
    }

    /// Serialize as a standalone SVG document holding one `<linearGradient>`.
    pub fn save_svg(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:krita="{KRITA_NS}">"#
        );
        let _ = writeln!(
            out,
            r#"  <linearGradient id="{}" gradientUnits="objectBoundingBox" spreadMethod="pad">"#,
            escape(&self.name)
        );

        for stop in &self.stops {
            let [r, g, b, a] = stop.color.to_rgba().components;
            let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
            let _ = writeln!(
                out,
                r##"    <stop offset="{}" stop-color="#{:02x}{:02x}{:02x}" stop-opacity="{}" krita:stop-type="{}"/>"##,
                stop.position,
                byte(r),
                byte(g),
                byte(b),
                a,
                stop.kind.svg_name()
            );
        }

        out.push_str("  </linearGradient>\n</svg>\n");
        out
    }
}

fn parse_offset(text: &str) -> f64 {
    let text = text.trim();
    let value = match text.strip_suffix('%') {
        Some(percent) => percent.trim().parse::<f64>().map(|v| v / 100.0),
        None => text.parse::<f64>(),
    };
    value.unwrap_or(0.0).clamp(0.0, 1.0)
}

fn style_value<'a>(style: &'a str, key: &str) -> Option<&'a str> {
    style.split(';').find_map(|decl| {
        let (k, v) = decl.split_once(':')?;
        (k.trim() == key).then(|| v.trim())
    })
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

impl AbstractGradient for StopGradient {
    fn name(&self) -> &str {
        &self.name
    }

    fn color_space(&self) -> &Arc<dyn ColorSpace> {
        &self.space
    }

    fn color_at(&self, dst: &mut Color, t: f64) {
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return;
        };

        let color = if t <= first.position || self.stops.len() == 1 {
            first.color.clone()
        } else if t >= last.position {
            last.color.clone()
        } else {
            let right = self
                .stops
                .iter()
                .position(|s| s.position >= t)
                .unwrap_or(self.stops.len() - 1);
            let (left, right) = (&self.stops[right - 1], &self.stops[right]);

            let distance = right.position - left.position;
            let local = if distance < EPSILON {
                0.5
            } else {
                (t - left.position) / distance
            };
            mix_colors(&left.color, &right.color, local, i16::MAX, dst.color_space())
        };

        *dst = color.converted_to(dst.color_space().clone());
    }

    fn has_variable_colors(&self) -> bool {
        self.stops.iter().any(|s| s.kind != StopType::Color)
    }

    fn set_variable_colors(&mut self, foreground: &Color, background: &Color) {
        for stop in &mut self.stops {
            let source = match stop.kind {
                StopType::Color => continue,
                StopType::Foreground => foreground,
                StopType::Background => background,
            };
            stop.color = source.converted_to(self.space.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_accept_percentages() {
        assert_eq!(parse_offset("50%"), 0.5);
        assert_eq!(parse_offset("0.25"), 0.25);
        assert_eq!(parse_offset("150%"), 1.0);
        assert_eq!(parse_offset("junk"), 0.0);
    }

    #[test]
    fn style_lookup() {
        let style = "stop-color: #ff0000; stop-opacity:0.5";
        assert_eq!(style_value(style, "stop-color"), Some("#ff0000"));
        assert_eq!(style_value(style, "stop-opacity"), Some("0.5"));
        assert_eq!(style_value(style, "fill"), None);
    }
}
