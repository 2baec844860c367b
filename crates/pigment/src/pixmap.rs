// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Owned pixel buffers.

use crate::color::Color;
use crate::color_space::{ColorSpace, ColorSpaceRegistry};
use crate::error::PixmapError;
use crate::rect::PixelRect;
use std::io::{Read, Write};
use std::sync::Arc;

const MAGIC: &[u8; 8] = b"PIGMENT1";
/// Longest color space id accepted in a stream.
const MAX_ID_LEN: usize = 64;

/// A `width` × `height` image in one color space, rows stored without padding.
#[derive(Debug, Clone)]
pub struct Pixmap {
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) color_space: Arc<dyn ColorSpace>,
    pub(crate) buf: Vec<u8>,
}

impl Pixmap {
    /// A fully transparent pixmap.
    pub fn new(width: usize, height: usize, color_space: Arc<dyn ColorSpace>) -> Self {
        let buf = vec![0; width * height * color_space.pixel_size()];
        Self {
            width,
            height,
            color_space,
            buf,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn color_space(&self) -> &Arc<dyn ColorSpace> {
        &self.color_space
    }

    pub fn bounds(&self) -> PixelRect {
        PixelRect::new(0, 0, self.width as i32, self.height as i32)
    }

    pub fn row_stride(&self) -> usize {
        self.width * self.color_space.pixel_size()
    }

    pub fn data(&self) -> &[u8] {
        &self.buf
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    fn offset(&self, x: usize, y: usize) -> usize {
        y * self.row_stride() + x * self.color_space.pixel_size()
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = self.offset(x, y);
        Some(&self.buf[offset..][..self.color_space.pixel_size()])
    }

    pub fn pixel_mut(&mut self, x: usize, y: usize) -> Option<&mut [u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = self.offset(x, y);
        let pixel_size = self.color_space.pixel_size();
        Some(&mut self.buf[offset..][..pixel_size])
    }

    /// The pixel at `(x, y)` as a [`Color`].
    pub fn color(&self, x: usize, y: usize) -> Option<Color> {
        self.pixel(x, y)
            .map(|data| Color::from_data(self.color_space.clone(), data))
    }

    /// Set every pixel to `pixel`.
    pub fn fill(&mut self, pixel: &[u8]) {
        let n = self.width * self.height;
        self.color_space.clone().fill_pixels(pixel, &mut self.buf, n);
    }

    /// Make the pixels inside `rect` transparent.
    pub fn clear_rect(&mut self, rect: PixelRect) {
        let transparent = self.color_space.transparent_pixel();
        self.fill_rect(rect, &transparent);
    }

    /// Set the pixels inside `rect` to `pixel`, without compositing.
    pub fn fill_rect(&mut self, rect: PixelRect, pixel: &[u8]) {
        let rect = rect.intersect(&self.bounds());
        if rect.is_empty() {
            return;
        }

        let space = self.color_space.clone();
        let row_stride = self.row_stride();
        let row_bytes = rect.width as usize * space.pixel_size();
        let start = self.offset(rect.x as usize, rect.y as usize);

        for row in self.buf[start..]
            .chunks_mut(row_stride)
            .take(rect.height as usize)
        {
            space.fill_pixels(pixel, &mut row[..row_bytes], rect.width as usize);
        }
    }

    /// The bytes from the top left pixel of `rect` to the end of the buffer, to be read
    /// with [`row_stride`](Self::row_stride). `None` if `rect` is not inside the pixmap.
    pub fn rect_slice(&self, rect: PixelRect) -> Option<&[u8]> {
        self.rect_start(rect).map(|start| &self.buf[start..])
    }

    pub fn rect_slice_mut(&mut self, rect: PixelRect) -> Option<&mut [u8]> {
        self.rect_start(rect).map(|start| &mut self.buf[start..])
    }

    fn rect_start(&self, rect: PixelRect) -> Option<usize> {
        (rect.intersect(&self.bounds()) == rect && !rect.is_empty())
            .then(|| self.offset(rect.x as usize, rect.y as usize))
    }

    /// The smallest rectangle holding every non-transparent pixel.
    pub fn exact_bounds(&self) -> PixelRect {
        let mut bounds = PixelRect::default();
        let pixel_size = self.color_space.pixel_size();
        if pixel_size == 0 || self.width == 0 {
            return bounds;
        }

        for (y, row) in self.buf.chunks_exact(self.row_stride()).enumerate() {
            let mut columns = row
                .chunks_exact(pixel_size)
                .enumerate()
                .filter(|(_, pixel)| self.color_space.opacity_u8(pixel) != 0)
                .map(|(x, _)| x);

            if let Some(first) = columns.next() {
                let last = columns.last().unwrap_or(first);
                let row_rect =
                    PixelRect::new(first as i32, y as i32, (last - first + 1) as i32, 1);
                bounds = bounds.union(&row_rect);
            }
        }

        bounds
    }

    /// Write the pixmap as a raw stream: magic, space id, size and pixel bytes.
    pub fn write_to(&self, mut writer: impl Write) -> Result<(), PixmapError> {
        let id = self.color_space.id().as_bytes();
        writer.write_all(MAGIC)?;
        writer.write_all(&(id.len() as u32).to_le_bytes())?;
        writer.write_all(id)?;
        writer.write_all(&(self.width as u32).to_le_bytes())?;
        writer.write_all(&(self.height as u32).to_le_bytes())?;
        writer.write_all(&self.buf)?;
        Ok(())
    }

    /// Read a pixmap written by [`write_to`](Self::write_to).
    pub fn read_from(
        mut reader: impl Read,
        registry: &ColorSpaceRegistry,
    ) -> Result<Self, PixmapError> {
        let mut magic = [0_u8; 8];
        read_exact(&mut reader, &mut magic)?;
        if &magic != MAGIC {
            return Err(PixmapError::BadMagic);
        }

        let id_len = read_u32(&mut reader)? as usize;
        if id_len > MAX_ID_LEN {
            return Err(PixmapError::InvalidId);
        }
        let mut id = vec![0; id_len];
        read_exact(&mut reader, &mut id)?;
        let id = String::from_utf8(id).map_err(|_| PixmapError::InvalidId)?;
        let color_space = registry.by_id(&id)?;

        let (width, height) = (read_u32(&mut reader)?, read_u32(&mut reader)?);
        let too_large = || PixmapError::TooLarge { width, height };
        // Pixel coordinates are `i32`.
        if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
            return Err(too_large());
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(color_space.pixel_size()))
            .filter(|len| *len <= isize::MAX as usize)
            .ok_or_else(too_large)?;

        // Grow with the data actually present instead of trusting the header.
        let mut buf = Vec::new();
        reader.by_ref().take(len as u64).read_to_end(&mut buf)?;
        if buf.len() < len {
            return Err(PixmapError::Truncated);
        }

        Ok(Self {
            width: width as usize,
            height: height as usize,
            color_space,
            buf,
        })
    }
}

fn read_exact(reader: &mut impl Read, buf: &mut [u8]) -> Result<(), PixmapError> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => PixmapError::Truncated,
        _ => PixmapError::Io(e),
    })
}

fn read_u32(reader: &mut impl Read) -> Result<u32, PixmapError> {
    let mut bytes = [0_u8; 4];
    read_exact(reader, &mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

/// An 8-bit coverage mask, one byte per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Mask {
    /// A mask covering nothing.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn bounds(&self) -> PixelRect {
        PixelRect::new(0, 0, self.width as i32, self.height as i32)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Set the coverage inside `rect`.
    pub fn fill_rect(&mut self, rect: PixelRect, value: u8) {
        let rect = rect.intersect(&self.bounds());
        if rect.is_empty() {
            return;
        }

        for y in rect.y as usize..rect.bottom() as usize {
            let start = y * self.width + rect.x as usize;
            self.data[start..][..rect.width as usize].fill(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba8() -> Arc<dyn ColorSpace> {
        ColorSpaceRegistry::new().rgb8()
    }

    #[test]
    fn fill_rect_clips() {
        let mut pixmap = Pixmap::new(4, 4, rgba8());
        pixmap.fill_rect(PixelRect::new(2, 2, 10, 10), &[1, 2, 3, 255]);

        assert_eq!(pixmap.pixel(1, 1), Some(&[0, 0, 0, 0][..]));
        assert_eq!(pixmap.pixel(3, 3), Some(&[1, 2, 3, 255][..]));
        assert_eq!(pixmap.pixel(4, 3), None);
    }

    #[test]
    fn exact_bounds_tracks_opaque_pixels() {
        let mut pixmap = Pixmap::new(8, 8, rgba8());
        assert!(pixmap.exact_bounds().is_empty());

        pixmap.fill_rect(PixelRect::new(1, 2, 3, 1), &[9, 9, 9, 10]);
        pixmap.fill_rect(PixelRect::new(5, 6, 1, 1), &[9, 9, 9, 10]);
        assert_eq!(pixmap.exact_bounds(), PixelRect::new(1, 2, 5, 5));
    }

    #[test]
    fn rect_slice_rejects_outside() {
        let pixmap = Pixmap::new(4, 4, rgba8());
        assert!(pixmap.rect_slice(PixelRect::new(1, 1, 2, 2)).is_some());
        assert!(pixmap.rect_slice(PixelRect::new(3, 3, 2, 2)).is_none());
    }

    #[test]
    fn bad_magic() {
        let registry = ColorSpaceRegistry::new();
        let result = Pixmap::read_from(&b"NOTAPIXMAP"[..], &registry);
        assert!(matches!(result, Err(PixmapError::BadMagic)));
    }

    #[test]
    fn mask_fill() {
        let mut mask = Mask::new(3, 2);
        mask.fill_rect(PixelRect::new(1, 0, 5, 1), 200);
        assert_eq!(mask.data(), &[0, 200, 200, 0, 0, 0]);
    }
}
