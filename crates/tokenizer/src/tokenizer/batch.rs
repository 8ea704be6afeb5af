//! Batch padding and output buffers.
//!
//! All outputs are flat, row-major `i64` buffers so they can be copied straight into
//! tensor storage owned by the caller.

use super::TokenizeResult;
use bbpe_core::{Result, TokenizerError};
use serde::Serialize;

/// Optional outputs to produce alongside the token ids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputOptions {
    pub attention_mask: bool,
    pub offsets: bool,
}

impl OutputOptions {
    /// Request every optional output.
    pub fn all() -> Self {
        Self {
            attention_mask: true,
            offsets: true,
        }
    }
}

/// Padded token ids for a batch of inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchEncoding {
    batch_size: usize,
    width: usize,
    /// `batch_size * width` ids
    input_ids: Vec<i64>,
    /// `batch_size * width` entries, 1 for real tokens and 0 for padding
    #[serde(skip_serializing_if = "Option::is_none")]
    attention_mask: Option<Vec<i64>>,
    /// `batch_size * width * 2` entries of `(start, end)`
    #[serde(skip_serializing_if = "Option::is_none")]
    offset_mapping: Option<Vec<i64>>,
}

impl BatchEncoding {
    /// Pad (or truncate) results into a rectangular batch.
    ///
    /// With `fixed_width` unset the width is the longest result.
    ///
    /// # Errors
    /// Returns [`TokenizerError::InvalidConfig`] when the buffer sizes overflow `usize`.
    pub fn from_results(
        results: &[TokenizeResult],
        fixed_width: Option<usize>,
        pad_id: u32,
        options: OutputOptions,
    ) -> Result<Self> {
        let batch_size = results.len();
        let width = fixed_width
            .unwrap_or_else(|| results.iter().map(|r| r.len()).max().unwrap_or(0));

        let cells = batch_size
            .checked_mul(width)
            .and_then(|cells| cells.checked_mul(2).map(|pairs| (cells, pairs)));
        let Some((cells, pairs)) = cells else {
            return Err(TokenizerError::InvalidConfig(format!(
                "batch of {} rows with width {} is too large",
                batch_size, width
            )));
        };

        let mut input_ids = vec![pad_id as i64; cells];
        let mut attention_mask = options.attention_mask.then(|| vec![0i64; cells]);
        let mut offset_mapping = options.offsets.then(|| vec![0i64; pairs]);

        for (row, result) in results.iter().enumerate() {
            let base = row * width;
            let len = result.len().min(width);

            for (dst, &id) in input_ids[base..base + len].iter_mut().zip(&result.ids) {
                *dst = id as i64;
            }
            if let Some(mask) = attention_mask.as_mut() {
                mask[base..base + len].fill(1);
            }
            if let (Some(mapping), Some(offsets)) = (offset_mapping.as_mut(), &result.offsets) {
                for (i, &(start, end)) in offsets.iter().take(len).enumerate() {
                    mapping[(base + i) * 2] = start as i64;
                    mapping[(base + i) * 2 + 1] = end as i64;
                }
            }
        }

        Ok(Self {
            batch_size,
            width,
            input_ids,
            attention_mask,
            offset_mapping,
        })
    }

    /// Number of rows.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Padded row width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// `(batch_size, width)`
    pub fn shape(&self) -> (usize, usize) {
        (self.batch_size, self.width)
    }

    /// Padded ids, row-major.
    pub fn input_ids(&self) -> &[i64] {
        &self.input_ids
    }

    /// Attention mask, row-major, when requested.
    pub fn attention_mask(&self) -> Option<&[i64]> {
        self.attention_mask.as_deref()
    }

    /// Flattened `(start, end)` pairs, when requested.
    pub fn offset_mapping(&self) -> Option<&[i64]> {
        self.offset_mapping.as_deref()
    }

    /// Ids of one row, padding included.
    pub fn ids_row(&self, row: usize) -> &[i64] {
        &self.input_ids[row * self.width..(row + 1) * self.width]
    }

    /// Mask of one row.
    pub fn mask_row(&self, row: usize) -> Option<&[i64]> {
        self.attention_mask
            .as_deref()
            .map(|mask| &mask[row * self.width..(row + 1) * self.width])
    }

    /// Offsets of one row as `(start, end)` pairs.
    pub fn offsets_row(&self, row: usize) -> Option<Vec<(i64, i64)>> {
        self.offset_mapping.as_deref().map(|mapping| {
            mapping[row * self.width * 2..(row + 1) * self.width * 2]
                .chunks_exact(2)
                .map(|pair| (pair[0], pair[1]))
                .collect()
        })
    }

    /// Copy outputs into caller-owned buffers.
    ///
    /// Each buffer must have exactly the length of the matching output. Requesting an
    /// output that was not computed is an error.
    pub fn copy_into(
        &self,
        input_ids: &mut [i64],
        attention_mask: Option<&mut [i64]>,
        offset_mapping: Option<&mut [i64]>,
    ) -> Result<()> {
        copy_checked(&self.input_ids, input_ids)?;

        if let Some(dst) = attention_mask {
            let src = self.attention_mask.as_deref().ok_or_else(|| {
                TokenizerError::InvalidConfig("attention mask was not computed".to_string())
            })?;
            copy_checked(src, dst)?;
        }

        if let Some(dst) = offset_mapping {
            let src = self.offset_mapping.as_deref().ok_or_else(|| {
                TokenizerError::InvalidConfig("offset mapping was not computed".to_string())
            })?;
            copy_checked(src, dst)?;
        }

        Ok(())
    }
}

fn copy_checked(src: &[i64], dst: &mut [i64]) -> Result<()> {
    if src.len() != dst.len() {
        return Err(TokenizerError::BufferSize {
            expected: src.len(),
            actual: dst.len(),
        });
    }
    dst.copy_from_slice(src);
    Ok(())
}
