// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{ColorModel, ColorSpace, RenderingIntent};
use crate::error::ConversionError;
use tracing::trace;

/// Converts pixels from one color space to another.
///
/// A converter owns scratch memory and needs `&mut self` to run, so each worker thread
/// creates its own.
#[derive(Debug)]
pub struct ColorConverter<'a> {
    src: &'a dyn ColorSpace,
    dst: &'a dyn ColorSpace,
    intent: RenderingIntent,
    scratch: Vec<u16>,
}

impl<'a> ColorConverter<'a> {
    pub fn new(src: &'a dyn ColorSpace, dst: &'a dyn ColorSpace, intent: RenderingIntent) -> Self {
        Self {
            src,
            dst,
            intent,
            scratch: Vec::new(),
        }
    }

    pub fn src_space(&self) -> &'a dyn ColorSpace {
        self.src
    }

    pub fn dst_space(&self) -> &'a dyn ColorSpace {
        self.dst
    }

    pub fn intent(&self) -> RenderingIntent {
        self.intent
    }

    /// Convert `n` pixels from `src` into `dst`.
    pub fn transform(&mut self, src: &[u8], dst: &mut [u8], n: usize) -> Result<(), ConversionError> {
        let src_len = n * self.src.pixel_size();
        if src.len() < src_len {
            return Err(ConversionError::SourceTooSmall {
                expected: src_len,
                actual: src.len(),
            });
        }

        let dst_len = n * self.dst.pixel_size();
        if dst.len() < dst_len {
            return Err(ConversionError::DestinationTooSmall {
                expected: dst_len,
                actual: dst.len(),
            });
        }

        convert_canonical(self.src, self.dst, src, dst, n, &mut self.scratch);

        Ok(())
    }
}

/// Per-worker scratch memory for compositing across color spaces.
///
/// The buffers only ever grow.
#[derive(Debug, Default)]
pub struct ConversionCache {
    pixels: Vec<u8>,
    canonical: Vec<u16>,
}

impl ConversionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes currently reserved for converted pixels.
    pub fn capacity(&self) -> usize {
        self.pixels.len()
    }

    pub(crate) fn buffers(&mut self, len: usize) -> (&mut [u8], &mut Vec<u16>) {
        if self.pixels.len() < len {
            self.pixels.resize(len, 0);
        }

        (&mut self.pixels[..len], &mut self.canonical)
    }
}

/// Convert through the canonical 16-bit formats. Lab is used whenever either end is a Lab
/// space, RGBA otherwise.
pub(crate) fn convert_canonical(
    from: &dyn ColorSpace,
    to: &dyn ColorSpace,
    src: &[u8],
    dst: &mut [u8],
    n: usize,
    scratch: &mut Vec<u16>,
) {
    if from.is_same(to) {
        let len = n * from.pixel_size();
        dst[..len].copy_from_slice(&src[..len]);
        return;
    }

    if scratch.len() < n * 4 {
        scratch.resize(n * 4, 0);
    }
    let canonical = &mut scratch[..n * 4];

    if from.model() == ColorModel::LabA || to.model() == ColorModel::LabA {
        trace!(from = from.id(), to = to.id(), "converting through Lab16");
        from.to_lab_a16(src, canonical, n);
        to.from_lab_a16(canonical, dst, n);
    } else {
        trace!(from = from.id(), to = to.id(), "converting through RGBA16");
        from.to_rgb_a16(src, canonical, n);
        to.from_rgb_a16(canonical, dst, n);
    }
}
