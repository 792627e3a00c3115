//! Vision datasets: in-memory labeled images and their loaders.

use std::path::Path;

use thiserror::Error;

use crate::network::downloader::DownloadError;

pub mod cifar;

mod image_data;

pub use image_data::*;

/// Error type for vision dataset loading and slicing.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// Requested dataset name has no loader.
    #[error("unsupported dataset: `{0}`")]
    UnsupportedDataset(String),

    /// Images and labels differ in length.
    #[error("count mismatch: {images} images vs {labels} labels")]
    CountMismatch {
        /// Number of image rows.
        images: usize,
        /// Number of labels.
        labels: usize,
    },

    /// An image row does not match the declared shape.
    #[error("invalid image size: expected {expected} bytes, got {got}")]
    InvalidImageSize {
        /// Bytes per image implied by the declared shape.
        expected: usize,
        /// Bytes in the offending row.
        got: usize,
    },

    /// The dataset does not have the image shape the operation expects.
    #[error("image shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch {
        /// Shape the operation expects.
        expected: ImageShape,
        /// Shape of the dataset that was passed in.
        got: ImageShape,
    },

    /// A requested index falls outside the dataset.
    #[error("index {index} out of range for dataset of size {size}")]
    IndexOutOfRange {
        /// First offending index.
        index: usize,
        /// Size of the dataset being indexed.
        size: usize,
    },

    /// The on-disk snapshot could not be encoded or decoded.
    #[error("cache serialization: {0}")]
    Cache(String),

    /// A raw dataset file is not in the expected format.
    #[error("decode error: {0}")]
    Decode(String),

    /// Downloading the raw dataset failed.
    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    /// I/O operation error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Loads the named dataset, fetching and assembling it on first use.
///
/// `data_dir` holds both the serialized snapshot (`{data_dir}/{name}.bin`)
/// and the transient raw download directory (`{data_dir}/{name}/`). Only
/// `"cifar10"` is currently supported; any other name fails with
/// [`DatasetError::UnsupportedDataset`].
pub fn load(name: &str, data_dir: impl AsRef<Path>) -> Result<ImageDataset, DatasetError> {
    match name {
        cifar::NAME => cifar::load(data_dir),
        _ => Err(DatasetError::UnsupportedDataset(name.to_string())),
    }
}
