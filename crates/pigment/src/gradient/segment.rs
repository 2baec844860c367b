// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{AbstractGradient, ColorInterpolation, SpatialInterpolation, EPSILON};
use crate::color::Color;
use crate::color_space::ColorSpace;
use crate::error::GradientError;
use peniko::color::{AlphaColor, Srgb};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, warn};

/// Where the color of a segment endpoint comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EndpointType {
    #[default]
    Color,
    Foreground,
    ForegroundTransparent,
    Background,
    BackgroundTransparent,
}

impl EndpointType {
    pub fn ggr_index(self) -> u8 {
        match self {
            EndpointType::Color => 0,
            EndpointType::Foreground => 1,
            EndpointType::ForegroundTransparent => 2,
            EndpointType::Background => 3,
            EndpointType::BackgroundTransparent => 4,
        }
    }

    pub fn from_ggr_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(EndpointType::Color),
            1 => Some(EndpointType::Foreground),
            2 => Some(EndpointType::ForegroundTransparent),
            3 => Some(EndpointType::Background),
            4 => Some(EndpointType::BackgroundTransparent),
            _ => None,
        }
    }

    fn is_variable(self) -> bool {
        self != EndpointType::Color
    }

    /// The color this endpoint takes for the given foreground and background.
    fn resolve(self, own: &Color, foreground: &Color, background: &Color) -> Color {
        let space = own.color_space().clone();
        match self {
            EndpointType::Color => own.clone(),
            EndpointType::Foreground => foreground.converted_to(space),
            EndpointType::Background => background.converted_to(space),
            EndpointType::ForegroundTransparent => {
                let mut color = foreground.converted_to(space);
                color.set_opacity_u8(0);
                color
            }
            EndpointType::BackgroundTransparent => {
                let mut color = background.converted_to(space);
                color.set_opacity_u8(0);
                color
            }
        }
    }
}

/// One segment of a [`SegmentGradient`]. All offsets are absolute positions in the
/// gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientSegment {
    pub start_offset: f64,
    pub middle_offset: f64,
    pub end_offset: f64,
    pub start_color: Color,
    pub end_color: Color,
    pub start_type: EndpointType,
    pub end_type: EndpointType,
    pub interpolation: SpatialInterpolation,
    pub color_interpolation: ColorInterpolation,
}

impl GradientSegment {
    pub fn new(
        start_offset: f64,
        middle_offset: f64,
        end_offset: f64,
        start_color: Color,
        end_color: Color,
    ) -> Self {
        Self {
            start_offset,
            middle_offset,
            end_offset,
            start_color,
            end_color,
            start_type: EndpointType::Color,
            end_type: EndpointType::Color,
            interpolation: SpatialInterpolation::Linear,
            color_interpolation: ColorInterpolation::Rgb,
        }
    }

    pub fn length(&self) -> f64 {
        self.end_offset - self.start_offset
    }

    /// Middle point relative to the segment.
    fn middle_t(&self) -> f64 {
        if self.length() < EPSILON {
            0.5
        } else {
            (self.middle_offset - self.start_offset) / self.length()
        }
    }

    /// The color at the absolute position `t`, in `space`.
    pub fn color_at(&self, t: f64, space: &Arc<dyn ColorSpace>) -> Color {
        let local = if self.length() < EPSILON {
            0.5
        } else {
            ((t - self.start_offset) / self.length()).clamp(0.0, 1.0)
        };

        let value = self.interpolation.value_at(local, self.middle_t());
        self.color_interpolation
            .color_at(value, &self.start_color, &self.end_color, space)
    }

    pub fn has_variable_colors(&self) -> bool {
        self.start_type.is_variable() || self.end_type.is_variable()
    }

    fn set_variable_colors(&mut self, foreground: &Color, background: &Color) {
        self.start_color = self
            .start_type
            .resolve(&self.start_color, foreground, background);
        self.end_color = self.end_type.resolve(&self.end_color, foreground, background);
    }
}

/// Offsets are written with six decimals, so boundaries closer than this are the same.
const BOUNDARY_TOLERANCE: f64 = 1e-5;

/// A gradient made of contiguous segments covering `0.0..=1.0`.
#[derive(Debug, Clone)]
pub struct SegmentGradient {
    name: String,
    space: Arc<dyn ColorSpace>,
    segments: Vec<GradientSegment>,
}

impl SegmentGradient {
    /// An empty gradient. Colors are produced in `space`.
    pub fn new(name: impl Into<String>, space: Arc<dyn ColorSpace>) -> Self {
        Self {
            name: name.into(),
            space,
            segments: Vec::new(),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn segments(&self) -> &[GradientSegment] {
        &self.segments
    }

    pub fn segment_mut(&mut self, index: usize) -> Option<&mut GradientSegment> {
        self.segments.get_mut(index)
    }

    /// Append a segment starting where the last one ends, or at `0.0` for the first.
    /// Its colors are converted into the gradient's space.
    pub fn push_segment(&mut self, mut segment: GradientSegment) -> Result<(), GradientError> {
        let expected = self.segments.last().map_or(0.0, |s| s.end_offset);
        if (segment.start_offset - expected).abs() > BOUNDARY_TOLERANCE {
            return Err(GradientError::Discontinuous {
                index: self.segments.len(),
                expected,
                found: segment.start_offset,
            });
        }
        segment.start_offset = expected;
        segment.middle_offset = segment.middle_offset.max(expected);

        segment.start_color.convert_to(self.space.clone());
        segment.end_color.convert_to(self.space.clone());
        self.segments.push(segment);
        Ok(())
    }

    /// Whether the segments cover `0.0..=1.0`.
    pub fn is_complete(&self) -> bool {
        self.segments
            .last()
            .is_some_and(|s| (s.end_offset - 1.0).abs() <= BOUNDARY_TOLERANCE)
    }

    /// Check that the segments partition `0.0..=1.0` and close rounding gaps.
    fn close_boundaries(&mut self) -> Result<(), GradientError> {
        let mut expected = 0.0;
        for (index, segment) in self.segments.iter_mut().enumerate() {
            if (segment.start_offset - expected).abs() > BOUNDARY_TOLERANCE {
                return Err(GradientError::Discontinuous {
                    index,
                    expected,
                    found: segment.start_offset,
                });
            }
            segment.start_offset = expected;
            segment.middle_offset = segment.middle_offset.max(expected);
            expected = segment.end_offset;
        }

        let index = self.segments.len();
        if let Some(last) = self.segments.last_mut() {
            if (last.end_offset - 1.0).abs() > BOUNDARY_TOLERANCE {
                return Err(GradientError::Discontinuous {
                    index,
                    expected: 1.0,
                    found: last.end_offset,
                });
            }
            last.end_offset = 1.0;
        }
        Ok(())
    }

    /// Index of the segment containing `t`.
    pub fn segment_at(&self, t: f64) -> Option<usize> {
        let t = t.clamp(0.0, 1.0);
        self.segments
            .iter()
            .position(|s| t > s.start_offset - EPSILON && t < s.end_offset + EPSILON)
    }

    fn check(&self, index: usize) -> Result<(), GradientError> {
        if index < self.segments.len() {
            Ok(())
        } else {
            Err(GradientError::SegmentOutOfRange(index))
        }
    }

    /// Move the boundary between segment `index` and its predecessor. The boundary
    /// cannot pass the middle point of either segment. The first segment always starts
    /// at `0.0`.
    pub fn move_segment_start_offset(&mut self, index: usize, t: f64) -> Result<(), GradientError> {
        self.check(index)?;

        if index == 0 {
            self.segments[0].start_offset = 0.0;
            return Ok(());
        }

        let current = &self.segments[index];
        let t = if t > current.start_offset {
            t.min(current.middle_offset)
        } else {
            t.max(self.segments[index - 1].middle_offset)
        };

        self.segments[index - 1].end_offset = t;
        self.segments[index].start_offset = t;
        Ok(())
    }

    /// Move the boundary between segment `index` and its successor. The last segment
    /// always ends at `1.0`.
    pub fn move_segment_end_offset(&mut self, index: usize, t: f64) -> Result<(), GradientError> {
        self.check(index)?;

        if index + 1 == self.segments.len() {
            self.segments[index].end_offset = 1.0;
            return Ok(());
        }

        let current = &self.segments[index];
        let t = if t < current.end_offset {
            t.max(current.middle_offset)
        } else {
            t.min(self.segments[index + 1].middle_offset)
        };

        self.segments[index + 1].start_offset = t;
        self.segments[index].end_offset = t;
        Ok(())
    }

    /// Move the middle point, clamped into the segment.
    pub fn move_segment_middle_offset(&mut self, index: usize, t: f64) -> Result<(), GradientError> {
        self.check(index)?;
        let segment = &mut self.segments[index];
        segment.middle_offset = t.clamp(segment.start_offset, segment.end_offset);
        Ok(())
    }

    /// Split segment `index` at its middle point. The new segment is inserted after it.
    pub fn split_segment(&mut self, index: usize) -> Result<(), GradientError> {
        self.check(index)?;

        let segment = &mut self.segments[index];
        let middle_color = segment.color_at(segment.middle_offset, &self.space);

        let mut new_segment = GradientSegment {
            start_offset: segment.middle_offset,
            middle_offset: (segment.middle_offset + segment.end_offset) / 2.0,
            end_offset: segment.end_offset,
            start_color: middle_color.clone(),
            end_color: segment.end_color.clone(),
            start_type: EndpointType::Color,
            end_type: segment.end_type,
            interpolation: segment.interpolation,
            color_interpolation: segment.color_interpolation,
        };
        new_segment.start_color.convert_to(self.space.clone());

        segment.end_color = middle_color;
        segment.end_type = EndpointType::Color;
        segment.end_offset = segment.middle_offset;
        segment.middle_offset = (segment.start_offset + segment.end_offset) / 2.0;

        self.segments.insert(index + 1, new_segment);
        Ok(())
    }

    /// Split segment `index` in half, both halves getting the full color range.
    pub fn duplicate_segment(&mut self, index: usize) -> Result<(), GradientError> {
        self.check(index)?;

        let segment = &mut self.segments[index];
        let middle_share = segment.middle_t();
        let half = segment.length() / 2.0;
        let center = segment.start_offset + half;

        let new_segment = GradientSegment {
            start_offset: center,
            middle_offset: center + middle_share * half,
            ..segment.clone()
        };

        segment.end_offset = center;
        segment.middle_offset = segment.start_offset + middle_share * half;

        self.segments.insert(index + 1, new_segment);
        Ok(())
    }

    /// Reverse segment `index` in place.
    pub fn mirror_segment(&mut self, index: usize) -> Result<(), GradientError> {
        self.check(index)?;

        let segment = &mut self.segments[index];
        std::mem::swap(&mut segment.start_color, &mut segment.end_color);
        std::mem::swap(&mut segment.start_type, &mut segment.end_type);
        segment.middle_offset =
            segment.end_offset - (segment.middle_offset - segment.start_offset);

        segment.interpolation = match segment.interpolation {
            SpatialInterpolation::SphereIncreasing => SpatialInterpolation::SphereDecreasing,
            SpatialInterpolation::SphereDecreasing => SpatialInterpolation::SphereIncreasing,
            other => other,
        };
        segment.color_interpolation = match segment.color_interpolation {
            ColorInterpolation::HsvCw => ColorInterpolation::HsvCcw,
            ColorInterpolation::HsvCcw => ColorInterpolation::HsvCw,
            other => other,
        };
        Ok(())
    }

    /// Remove segment `index`, growing a neighbour over its range. Returns the index of
    /// that neighbour afterwards. The last remaining segment cannot be removed.
    pub fn remove_segment(&mut self, index: usize) -> Result<usize, GradientError> {
        self.check(index)?;
        if self.segments.len() < 2 {
            return Err(GradientError::LastSegment);
        }

        let removed = self.segments.remove(index);
        let neighbour = if index == 0 { 0 } else { index - 1 };
        let segment = &mut self.segments[neighbour];
        let middle_share = segment.middle_t();

        if index == 0 {
            segment.start_offset = removed.start_offset;
        } else {
            segment.end_offset = removed.end_offset;
        }
        segment.middle_offset = segment.start_offset + middle_share * segment.length();

        Ok(neighbour)
    }

    /// Segment boundaries, including `0.0` and `1.0`.
    pub fn handle_positions(&self) -> Vec<f64> {
        let mut positions: Vec<f64> = self.segments.iter().map(|s| s.start_offset).collect();
        if let Some(last) = self.segments.last() {
            positions.push(last.end_offset);
        }
        positions
    }

    pub fn middle_handle_positions(&self) -> Vec<f64> {
        self.segments.iter().map(|s| s.middle_offset).collect()
    }

    /// Replace every variable endpoint by its resolved color, making it fixed.
    pub fn bake_variable_colors(&mut self, foreground: &Color, background: &Color) {
        self.set_variable_colors(foreground, background);
        for segment in &mut self.segments {
            segment.start_type = EndpointType::Color;
            segment.end_type = EndpointType::Color;
        }
    }

    /// Parse a GIMP `.ggr` gradient. Colors are stored in `space`.
    pub fn load_ggr(text: &str, space: Arc<dyn ColorSpace>) -> Result<Self, GradientError> {
        let mut lines = text.lines().enumerate().peekable();

        match lines.next() {
            Some((_, header)) if header.trim() == "GIMP Gradient" => {}
            _ => return Err(GradientError::MissingHeader),
        }

        let mut name = String::new();
        if let Some((_, line)) = lines.peek() {
            if let Some(rest) = line.strip_prefix("Name:") {
                name = rest.trim().to_string();
                lines.next();
            }
        }

        let count = match lines.next() {
            Some((_, line)) => line
                .trim()
                .parse::<usize>()
                .map_err(|_| GradientError::InvalidSegmentCount(line.to_string()))?,
            None => return Err(GradientError::InvalidSegmentCount(String::new())),
        };
        if count == 0 {
            return Err(GradientError::InvalidSegmentCount("0".to_string()));
        }

        let mut gradient = SegmentGradient::new(name, space);
        for (number, line) in lines.filter(|(_, l)| !l.trim().is_empty()).take(count) {
            match gradient.parse_segment(line) {
                Ok(segment) => gradient.segments.push(segment),
                Err(reason) => {
                    warn!(line = number + 1, reason = reason.as_str(), "rejected gradient segment");
                    return Err(GradientError::InvalidSegment {
                        line: number + 1,
                        reason,
                    });
                }
            }
        }

        if gradient.segments.len() < count {
            return Err(GradientError::TruncatedSegments {
                expected: count,
                actual: gradient.segments.len(),
            });
        }
        gradient.close_boundaries()?;

        debug!(
            name = gradient.name.as_str(),
            segments = count,
            "loaded segment gradient"
        );
        Ok(gradient)
    }

    fn parse_segment(&self, line: &str) -> Result<GradientSegment, String> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 13 && fields.len() != 15 {
            return Err(format!("expected 13 or 15 fields, found {}", fields.len()));
        }

        let number = |i: usize| -> Result<f64, String> {
            fields[i]
                .parse::<f64>()
                .map_err(|_| format!("invalid number `{}`", fields[i]))
        };
        let index = |i: usize| -> Result<u8, String> {
            fields[i]
                .parse::<u8>()
                .map_err(|_| format!("invalid type `{}`", fields[i]))
        };
        let color = |i: usize| -> Result<Color, String> {
            let c = [number(i)?, number(i + 1)?, number(i + 2)?, number(i + 3)?];
            Ok(Color::from_rgba(
                AlphaColor::<Srgb>::new(c.map(|v| v as f32)),
                self.space.clone(),
            ))
        };

        let (start_offset, middle_offset, end_offset) = (number(0)?, number(1)?, number(2)?);
        if !(0.0..=1.0).contains(&start_offset)
            || !(start_offset..=end_offset).contains(&middle_offset)
            || end_offset > 1.0
        {
            return Err(format!(
                "offsets {start_offset} {middle_offset} {end_offset} out of order"
            ));
        }

        let interpolation = SpatialInterpolation::from_ggr_index(index(11)?)
            .ok_or_else(|| format!("unknown interpolation `{}`", fields[11]))?;
        let color_interpolation = ColorInterpolation::from_ggr_index(index(12)?)
            .ok_or_else(|| format!("unknown color interpolation `{}`", fields[12]))?;

        let (start_type, end_type) = if fields.len() == 15 {
            let endpoint = |i: usize| {
                index(i).and_then(|v| {
                    EndpointType::from_ggr_index(v)
                        .ok_or_else(|| format!("unknown endpoint type `{}`", fields[i]))
                })
            };
            (endpoint(13)?, endpoint(14)?)
        } else {
            (EndpointType::Color, EndpointType::Color)
        };

        Ok(GradientSegment {
            start_offset,
            middle_offset,
            end_offset,
            start_color: color(3)?,
            end_color: color(7)?,
            start_type,
            end_type,
            interpolation,
            color_interpolation,
        })
    }

    /// Serialize into the GIMP `.ggr` format.
    pub fn save_ggr(&self) -> String {
        let mut out = String::from("GIMP Gradient\n");
        let _ = writeln!(out, "Name: {}", self.name);
        let _ = writeln!(out, "{}", self.segments.len());

        for s in &self.segments {
            let start = s.start_color.to_rgba().components;
            let end = s.end_color.to_rgba().components;
            let _ = write!(
                out,
                "{:.6} {:.6} {:.6} ",
                s.start_offset, s.middle_offset, s.end_offset
            );
            for c in start.iter().chain(end.iter()) {
                let _ = write!(out, "{c:.6} ");
            }
            let _ = writeln!(
                out,
                "{} {} {} {}",
                s.interpolation.ggr_index(),
                s.color_interpolation.ggr_index(),
                s.start_type.ggr_index(),
                s.end_type.ggr_index()
            );
        }

        out
    }
}

impl AbstractGradient for SegmentGradient {
    fn name(&self) -> &str {
        &self.name
    }

    fn color_space(&self) -> &Arc<dyn ColorSpace> {
        &self.space
    }

    fn color_at(&self, dst: &mut Color, t: f64) {
        let t = t.clamp(0.0, 1.0);
        if let Some(index) = self.segment_at(t) {
            *dst = self.segments[index].color_at(t, dst.color_space());
        }
    }

    fn has_variable_colors(&self) -> bool {
        self.segments.iter().any(GradientSegment::has_variable_colors)
    }

    fn set_variable_colors(&mut self, foreground: &Color, background: &Color) {
        for segment in &mut self.segments {
            segment.set_variable_colors(foreground, background);
        }
    }
}
