//! The generated field: coordinate fill, shaped views and serpentine reordering.
//!
//! Pixels are evaluated in serpentine (boustrophedon) order: even rows run left
//! to right, odd rows right to left, so consecutive batch rows are always
//! spatially adjacent. That keeps the resynthesised audio continuous across
//! row boundaries. The renderer needs raster order back, which is what
//! [`unsnake_into`] provides.

use crate::error::{Result, SynthError};
use crate::matrix::{Matrix, MatrixError};
use crate::params::{FieldConfig, INPUT_FEATURES};

/// `[height][width][channels]` layout of a flat buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    pub height: usize,
    pub width: usize,
    pub channels: usize,
}

impl GridShape {
    pub fn new(height: usize, width: usize, channels: usize) -> Self {
        Self {
            height,
            width,
            channels,
        }
    }

    pub fn len(&self) -> usize {
        self.height * self.width * self.channels
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn row_len(&self) -> usize {
        self.width * self.channels
    }

    fn check(&self, actual: usize) -> Result<()> {
        if actual != self.len() {
            return Err(SynthError::FieldLength {
                expected: self.len(),
                actual,
            });
        }
        Ok(())
    }
}

impl From<&FieldConfig> for GridShape {
    fn from(config: &FieldConfig) -> Self {
        Self::new(config.height, config.width, config.channels)
    }
}

/// Borrowed flat buffer viewed as `[height][width][channels]`.
///
/// Construction checks the length matches the shape exactly; element access
/// is bounds-checked in debug builds.
#[derive(Debug, Clone, Copy)]
pub struct GridView<'a> {
    data: &'a [f32],
    shape: GridShape,
}

impl<'a> GridView<'a> {
    pub fn new(data: &'a [f32], shape: GridShape) -> Result<Self> {
        shape.check(data.len())?;
        Ok(Self { data, shape })
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn as_slice(&self) -> &'a [f32] {
        self.data
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize, channel: usize) -> f32 {
        debug_assert!(row < self.shape.height, "row {} out of {}", row, self.shape.height);
        debug_assert!(col < self.shape.width, "col {} out of {}", col, self.shape.width);
        debug_assert!(channel < self.shape.channels);
        self.data[(row * self.shape.width + col) * self.shape.channels + channel]
    }

    /// All channels of one pixel
    pub fn pixel(&self, row: usize, col: usize) -> &'a [f32] {
        debug_assert!(row < self.shape.height && col < self.shape.width);
        let start = (row * self.shape.width + col) * self.shape.channels;
        &self.data[start..start + self.shape.channels]
    }
}

/// Write the `(x, y, t)` coordinate batch in serpentine order.
///
/// Row `r = i·width + jj` holds pixel `(i, j)` where `j = jj` on even rows and
/// `j = width - 1 - jj` on odd rows. Coordinates are `x = j / width`,
/// `y = i / height`.
pub fn fill_serpentine_coordinates(input: &mut Matrix, shape: GridShape, t: f32) -> Result<()> {
    let rows = shape.height * shape.width;
    if input.rows() != rows || input.cols() != INPUT_FEATURES {
        return Err(MatrixError::OutputShape {
            op: "fill_serpentine_coordinates",
            rows,
            cols: INPUT_FEATURES,
            actual_rows: input.rows(),
            actual_cols: input.cols(),
        }
        .into());
    }

    let inv_w = 1.0 / shape.width as f32;
    let inv_h = 1.0 / shape.height as f32;
    for (i, row_block) in input
        .as_mut_slice()
        .chunks_exact_mut(shape.width * INPUT_FEATURES)
        .enumerate()
    {
        let y = i as f32 * inv_h;
        let reversed = i % 2 == 1;
        for (jj, coords) in row_block.chunks_exact_mut(INPUT_FEATURES).enumerate() {
            let j = if reversed { shape.width - 1 - jj } else { jj };
            coords[0] = j as f32 * inv_w;
            coords[1] = y;
            coords[2] = t;
        }
    }
    Ok(())
}

/// Copy `src` into `dst`, reversing the pixel order of every odd row.
///
/// Channel order inside a pixel is preserved. Applying it twice is the identity.
pub fn unsnake_into(src: &[f32], dst: &mut [f32], shape: GridShape) -> Result<()> {
    shape.check(src.len())?;
    shape.check(dst.len())?;
    let row_len = shape.row_len();
    if row_len == 0 {
        return Ok(());
    }
    let c = shape.channels;

    for (i, (src_row, dst_row)) in src
        .chunks_exact(row_len)
        .zip(dst.chunks_exact_mut(row_len))
        .enumerate()
    {
        if i % 2 == 0 {
            dst_row.copy_from_slice(src_row);
        } else {
            for (dst_px, src_px) in dst_row.chunks_exact_mut(c).zip(src_row.chunks_exact(c).rev()) {
                dst_px.copy_from_slice(src_px);
            }
        }
    }
    Ok(())
}
