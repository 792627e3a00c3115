use std::fmt;

use ndarray::{Array1, Array4};
use serde::{Deserialize, Serialize};

use super::DatasetError;
use crate::Dataset;

/// Dimensions of a single image stored in a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageShape {
    /// Image height in pixels.
    pub height: usize,
    /// Image width in pixels.
    pub width: usize,
    /// Number of color channels.
    pub channels: usize,
}

impl ImageShape {
    /// Creates a new shape.
    pub const fn new(height: usize, width: usize, channels: usize) -> Self {
        Self {
            height,
            width,
            channels,
        }
    }

    /// Number of bytes in one image of this shape.
    pub const fn len(&self) -> usize {
        self.height * self.width * self.channels
    }

    /// Whether the shape holds no pixels at all.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for ImageShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.height, self.width, self.channels)
    }
}

/// A single labeled image row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageItem {
    /// Pixel bytes in height-width-channel order.
    pub image: Vec<u8>,
    /// Class label.
    pub label: usize,
}

/// An in-memory labeled image dataset.
///
/// Images are stored as one byte row per sample, in height-width-channel
/// order, all matching the declared [`ImageShape`]; labels are index-aligned
/// with the rows. Construction enforces both invariants, so every dataset
/// handed out by this crate has as many labels as images.
///
/// The whole struct serializes with `serde`, which is how loaders snapshot
/// an assembled corpus to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDataset {
    shape: ImageShape,
    images: Vec<Vec<u8>>,
    labels: Vec<usize>,
}

impl ImageDataset {
    /// Creates a dataset from index-aligned image rows and labels.
    ///
    /// Fails with [`DatasetError::CountMismatch`] when the two sequences
    /// differ in length, or [`DatasetError::InvalidImageSize`] when a row
    /// does not hold exactly `shape.len()` bytes.
    pub fn new(
        shape: ImageShape,
        images: Vec<Vec<u8>>,
        labels: Vec<usize>,
    ) -> Result<Self, DatasetError> {
        if images.len() != labels.len() {
            return Err(DatasetError::CountMismatch {
                images: images.len(),
                labels: labels.len(),
            });
        }

        if let Some(row) = images.iter().find(|row| row.len() != shape.len()) {
            return Err(DatasetError::InvalidImageSize {
                expected: shape.len(),
                got: row.len(),
            });
        }

        Ok(Self {
            shape,
            images,
            labels,
        })
    }

    /// The shape shared by every image in the dataset.
    pub fn shape(&self) -> ImageShape {
        self.shape
    }

    /// Pixel bytes of the image at `index`.
    pub fn image(&self, index: usize) -> Option<&[u8]> {
        self.images.get(index).map(Vec::as_slice)
    }

    /// Label of the image at `index`.
    pub fn label(&self, index: usize) -> Option<usize> {
        self.labels.get(index).copied()
    }

    /// Materializes the dataset as tensors.
    ///
    /// Images become an `(N, C, H, W)` float array ("channel-first" layout)
    /// rescaled from `[0, 255]` to `[0.0, 1.0]`; labels become an `i64`
    /// vector usable directly as classification targets.
    pub fn to_tensors(&self) -> (Array4<f32>, Array1<i64>) {
        let ImageShape {
            height,
            width,
            channels,
        } = self.shape;

        let mut flat = Vec::with_capacity(self.images.len() * self.shape.len());
        for row in &self.images {
            flat.extend_from_slice(row);
        }

        let images = Array4::from_shape_vec((self.images.len(), height, width, channels), flat)
            .expect("constructor enforces that rows match the declared shape")
            .mapv(|value| f32::from(value) / 255.0)
            .permuted_axes([0, 3, 1, 2]);
        let labels = self.labels.iter().map(|&label| label as i64).collect();

        (images.as_standard_layout().to_owned(), labels)
    }
}

impl Dataset<ImageItem> for ImageDataset {
    fn get(&self, index: usize) -> Option<ImageItem> {
        let image = self.images.get(index)?.clone();
        let label = *self.labels.get(index)?;

        Some(ImageItem { image, label })
    }

    fn len(&self) -> usize {
        self.images.len()
    }
}
