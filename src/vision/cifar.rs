//! CIFAR-10 Dataset Module
//!
//! This module loads the CIFAR-10 image classification corpus from its
//! binary distribution, assembles the train and test splits into a single
//! dataset and snapshots the result to disk so later loads skip both the
//! network and the batch-file parsing.
//!
//! ## Dataset Details
//! - **Classes**: 10 (see [`CifarClass`])
//! - **Samples**: 50,000 train + 10,000 test, assembled as one
//!   60,000-sample corpus, train first
//! - **Images**: 32×32 RGB, stored in height-width-channel order
//! - **Source**: <https://www.cs.toronto.edu/~kriz/cifar.html>
//!   (binary version)
//!
//! Each record of a batch file is 3,073 bytes: one label byte followed by
//! 3,072 pixel bytes in channel-major order (1,024 red, 1,024 green,
//! 1,024 blue).
//!
//! ## Usage Example
//! ```rust,no_run
//! use cifar_dataset::Dataset;
//! use cifar_dataset::vision::cifar;
//!
//! let dataset = cifar::load("./data").unwrap();
//! let first_thousand: Vec<usize> = (0..1_000).collect();
//! let subset = cifar::subset(&dataset, &first_thousand).unwrap();
//! assert_eq!(subset.len(), 1_000);
//! ```

use std::fs::{self, create_dir_all};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use ndarray::{Array1, Array4};
use strum::{Display, EnumCount, FromRepr};
use tar::Archive;

use super::{DatasetError, ImageDataset, ImageShape};
use crate::Dataset;
use crate::network::downloader;
use crate::transform::SelectionDataset;

/// Dataset identifier understood by [`load`](super::load).
pub const NAME: &str = "cifar10";

/// Image shape of every CIFAR-10 sample.
pub const SHAPE: ImageShape = ImageShape::new(32, 32, 3);

/// Train and test splits combined.
pub const TOTAL_SAMPLES: usize = 60_000;

const URL: &str = "https://www.cs.toronto.edu/~kriz/cifar-10-binary.tar.gz";
const ARCHIVE_NAME: &str = "cifar-10-binary.tar.gz";
const ARCHIVE_DIR: &str = "cifar-10-batches-bin";
const TRAIN_FILES: [&str; 5] = [
    "data_batch_1.bin",
    "data_batch_2.bin",
    "data_batch_3.bin",
    "data_batch_4.bin",
    "data_batch_5.bin",
];
const TEST_FILE: &str = "test_batch.bin";

const PIXELS_PER_CHANNEL: usize = SHAPE.height * SHAPE.width;
const BYTES_PER_RECORD: usize = SHAPE.len() + 1;

/// The ten CIFAR-10 classes, in label order.
#[allow(missing_docs)]
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, FromRepr, EnumCount)]
#[strum(serialize_all = "lowercase")]
pub enum CifarClass {
    Airplane = 0,
    Automobile = 1,
    Bird = 2,
    Cat = 3,
    Deer = 4,
    Dog = 5,
    Frog = 6,
    Horse = 7,
    Ship = 8,
    Truck = 9,
}

/// Loads CIFAR-10 from `data_dir`, fetching the corpus on first use.
///
/// When the snapshot `{data_dir}/cifar10.bin` exists it is decoded and
/// returned directly, with no content validation — a stale snapshot is
/// indistinguishable from a valid one. Otherwise the binary archive is
/// downloaded (unless already extracted under `{data_dir}/cifar10/`), the
/// five train batches and the test batch are parsed and concatenated in
/// that order, and the assembled dataset is snapshotted before being
/// returned.
///
/// Concurrent first-time loads pointing at the same `data_dir` race on the
/// snapshot write with last-writer-wins semantics; nothing locks the file.
pub fn load(data_dir: impl AsRef<Path>) -> Result<ImageDataset, DatasetError> {
    let data_dir = data_dir.as_ref();
    let snapshot = data_dir.join(format!("{NAME}.bin"));

    if snapshot.exists() {
        let dataset = read_snapshot(&snapshot)?;
        log::info!("loaded {NAME} from {}", snapshot.display());
        log::info!("{NAME} corpus size: {}", dataset.len());
        return Ok(dataset);
    }

    let batches_dir = download_and_extract(data_dir)?;

    let mut images = Vec::with_capacity(TOTAL_SAMPLES);
    let mut labels = Vec::with_capacity(TOTAL_SAMPLES);
    for file in TRAIN_FILES {
        read_batch(&batches_dir.join(file), &mut images, &mut labels)?;
    }
    read_batch(&batches_dir.join(TEST_FILE), &mut images, &mut labels)?;

    let dataset = ImageDataset::new(SHAPE, images, labels)?;
    write_snapshot(&snapshot, &dataset)?;
    log::info!("saved {NAME} to {}", snapshot.display());
    log::info!("{NAME} corpus size: {}", dataset.len());

    Ok(dataset)
}

/// Loads CIFAR-10 from a per-user cache directory.
///
/// Convenience over [`load`] for callers with no opinion about where the
/// data lives.
pub fn load_default() -> Result<ImageDataset, DatasetError> {
    let data_dir = dirs::cache_dir()
        .expect("could not resolve the user cache directory")
        .join("cifar-dataset");
    create_dir_all(&data_dir)?;

    load(data_dir)
}

/// Gathers a new dataset from `dataset` at the given indices.
///
/// The result is a fully independent copy whose rows appear in the given
/// order; indices may repeat. The input must have the CIFAR-10 image shape
/// and every index must fall inside the dataset — validation happens before
/// any row is copied, so a single offending index means no subset at all.
pub fn subset(dataset: &ImageDataset, indices: &[usize]) -> Result<ImageDataset, DatasetError> {
    if dataset.shape() != SHAPE {
        return Err(DatasetError::ShapeMismatch {
            expected: SHAPE,
            got: dataset.shape(),
        });
    }

    let size = dataset.len();
    if let Some(&index) = indices.iter().find(|&&index| index >= size) {
        return Err(DatasetError::IndexOutOfRange { index, size });
    }

    let selection = SelectionDataset::new(dataset, indices.to_vec());
    let mut images = Vec::with_capacity(indices.len());
    let mut labels = Vec::with_capacity(indices.len());
    for item in selection.iter() {
        images.push(item.image);
        labels.push(item.label);
    }

    ImageDataset::new(SHAPE, images, labels)
}

/// Gathers a subset and materializes it as tensors.
///
/// Images come back as `(N, 3, 32, 32)` floats rescaled to `[0.0, 1.0]`,
/// labels as `i64` values. See [`subset`] for the validation rules.
pub fn subset_tensors(
    dataset: &ImageDataset,
    indices: &[usize],
) -> Result<(Array4<f32>, Array1<i64>), DatasetError> {
    Ok(subset(dataset, indices)?.to_tensors())
}

/// Downloads and unpacks the binary archive, unless its batch files are
/// already on disk.
fn download_and_extract(data_dir: &Path) -> Result<PathBuf, DatasetError> {
    let raw_dir = data_dir.join(NAME);
    let batches_dir = raw_dir.join(ARCHIVE_DIR);

    if !batches_dir.join(TEST_FILE).exists() {
        create_dir_all(&raw_dir)?;

        let bytes = downloader::download_file_as_bytes(URL, ARCHIVE_NAME)?;

        let gz_buffer = GzDecoder::new(&bytes[..]);
        let mut archive = Archive::new(gz_buffer);
        archive.unpack(&raw_dir)?;
    }

    Ok(batches_dir)
}

/// Parses one batch file, appending its records to `images` and `labels`.
///
/// The record count is derived from the file size; 10,000 for the
/// distributed batches.
fn read_batch(
    path: &Path,
    images: &mut Vec<Vec<u8>>,
    labels: &mut Vec<usize>,
) -> Result<(), DatasetError> {
    let data = fs::read(path)?;
    if data.is_empty() || data.len() % BYTES_PER_RECORD != 0 {
        return Err(DatasetError::Decode(format!(
            "batch file {} holds {} bytes, expected a non-zero multiple of {BYTES_PER_RECORD}",
            path.display(),
            data.len()
        )));
    }

    for record in data.chunks_exact(BYTES_PER_RECORD) {
        labels.push(record[0] as usize);
        images.push(to_height_width_channel(&record[1..]));
    }

    Ok(())
}

/// Reorders one record's pixels from the archive's channel-major layout to
/// the height-width-channel layout the dataset stores.
fn to_height_width_channel(pixels: &[u8]) -> Vec<u8> {
    let mut row = vec![0u8; pixels.len()];
    for (i, &value) in pixels.iter().enumerate() {
        let channel = i / PIXELS_PER_CHANNEL;
        let offset = i % PIXELS_PER_CHANNEL;
        row[offset * SHAPE.channels + channel] = value;
    }

    row
}

fn read_snapshot(path: &Path) -> Result<ImageDataset, DatasetError> {
    let mut reader = BufReader::new(fs::File::open(path)?);

    bincode::serde::decode_from_std_read(&mut reader, bin_config())
        .map_err(|err| DatasetError::Cache(err.to_string()))
}

fn write_snapshot(path: &Path, dataset: &ImageDataset) -> Result<(), DatasetError> {
    let mut writer = BufWriter::new(fs::File::create(path)?);

    bincode::serde::encode_into_std_write(dataset, &mut writer, bin_config())
        .map_err(|err| DatasetError::Cache(err.to_string()))?;

    Ok(())
}

fn bin_config() -> bincode::config::Configuration {
    bincode::config::standard()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use rstest::rstest;

    /// A CIFAR-shaped dataset with random pixels and valid labels.
    fn synthetic_dataset(samples: usize) -> ImageDataset {
        let mut rng = rand::rng();
        let images = (0..samples)
            .map(|_| (0..SHAPE.len()).map(|_| rng.random::<u8>()).collect())
            .collect();
        let labels = (0..samples)
            .map(|_| rng.random_range(0..CifarClass::COUNT))
            .collect();

        ImageDataset::new(SHAPE, images, labels).unwrap()
    }

    /// One record in the archive's on-disk layout: a label byte followed by
    /// channel-major pixels derived from `seed`.
    fn record_bytes(label: u8, seed: u8) -> Vec<u8> {
        let mut record = Vec::with_capacity(BYTES_PER_RECORD);
        record.push(label);
        record.extend((0..SHAPE.len()).map(|i| (i + seed as usize) as u8));
        record
    }

    fn write_batch_file(path: &Path, records: &[Vec<u8>]) {
        fs::write(path, records.concat()).unwrap();
    }

    #[test]
    fn read_batch_converts_records_to_height_width_channel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data_batch_1.bin");
        write_batch_file(&path, &[record_bytes(3, 0), record_bytes(9, 100)]);

        let mut images = Vec::new();
        let mut labels = Vec::new();
        read_batch(&path, &mut images, &mut labels).unwrap();

        assert_eq!(labels, vec![3, 9]);
        assert_eq!(images.len(), 2);
        let chw: Vec<u8> = record_bytes(3, 0)[1..].to_vec();
        for &(h, w, c) in &[(0, 0, 0), (0, 1, 2), (31, 31, 1), (17, 5, 0)] {
            let offset = h * SHAPE.width + w;
            assert_eq!(
                images[0][offset * SHAPE.channels + c],
                chw[c * PIXELS_PER_CHANNEL + offset],
            );
        }
    }

    #[test]
    fn read_batch_rejects_truncated_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data_batch_1.bin");
        fs::write(&path, vec![0u8; BYTES_PER_RECORD - 1]).unwrap();

        let err = read_batch(&path, &mut Vec::new(), &mut Vec::new()).unwrap_err();

        assert!(matches!(err, DatasetError::Decode(_)));
    }

    #[test]
    fn snapshot_roundtrip_preserves_the_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.bin");
        let dataset = synthetic_dataset(4);

        write_snapshot(&path, &dataset).unwrap();
        let restored = read_snapshot(&path).unwrap();

        assert_eq!(restored, dataset);
    }

    #[test]
    fn load_assembles_batches_then_reads_back_the_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let batches_dir = dir.path().join(NAME).join(ARCHIVE_DIR);
        create_dir_all(&batches_dir).unwrap();
        for (i, file) in TRAIN_FILES.iter().enumerate() {
            write_batch_file(
                &batches_dir.join(file),
                &[record_bytes(i as u8, 0), record_bytes(i as u8, 1)],
            );
        }
        write_batch_file(&batches_dir.join(TEST_FILE), &[record_bytes(7, 2)]);

        let dataset = load(dir.path()).unwrap();

        // Train batches in order, then the test batch.
        assert_eq!(dataset.len(), 11);
        assert_eq!(dataset.label(0), Some(0));
        assert_eq!(dataset.label(9), Some(4));
        assert_eq!(dataset.label(10), Some(7));
        assert!(dir.path().join(format!("{NAME}.bin")).exists());

        // Later loads come from the snapshot alone.
        fs::remove_dir_all(dir.path().join(NAME)).unwrap();
        let reloaded = load(dir.path()).unwrap();
        assert_eq!(reloaded, dataset);
    }

    #[test]
    fn load_reads_a_seeded_snapshot_without_raw_files() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = synthetic_dataset(6);
        write_snapshot(&dir.path().join(format!("{NAME}.bin")), &dataset).unwrap();

        let first = load(dir.path()).unwrap();
        let second = load(dir.path()).unwrap();

        assert_eq!(first, dataset);
        assert_eq!(second, dataset);
    }

    #[rstest]
    #[case::in_order(vec![0, 1, 2])]
    #[case::reversed(vec![4, 3, 0])]
    #[case::duplicates(vec![2, 2, 2])]
    fn subset_gathers_rows_in_given_order(#[case] indices: Vec<usize>) {
        let dataset = synthetic_dataset(5);

        let picked = subset(&dataset, &indices).unwrap();

        assert_eq!(picked.len(), indices.len());
        for (i, &index) in indices.iter().enumerate() {
            assert_eq!(picked.image(i), dataset.image(index));
            assert_eq!(picked.label(i), dataset.label(index));
        }
    }

    #[test]
    fn subset_is_an_independent_copy() {
        let dataset = synthetic_dataset(3);

        let picked = subset(&dataset, &[1]).unwrap();
        drop(dataset);

        assert_eq!(picked.len(), 1);
    }

    #[test]
    fn subset_rejects_out_of_range_indices_without_gathering() {
        let dataset = synthetic_dataset(5);

        let err = subset(&dataset, &[0, 1, 70_000]).unwrap_err();

        assert!(matches!(
            err,
            DatasetError::IndexOutOfRange {
                index: 70_000,
                size: 5
            }
        ));
    }

    #[test]
    fn subset_rejects_datasets_of_another_shape() {
        let other = ImageShape::new(28, 28, 1);
        let dataset =
            ImageDataset::new(other, vec![vec![0u8; other.len()]], vec![0]).unwrap();

        let err = subset(&dataset, &[0]).unwrap_err();

        assert!(matches!(err, DatasetError::ShapeMismatch { got, .. } if got == other));
    }

    #[test]
    fn subset_tensors_are_channel_first_and_normalized() {
        let dataset = synthetic_dataset(5);

        let (images, labels) = subset_tensors(&dataset, &[0, 2, 2]).unwrap();

        assert_eq!(images.shape(), &[3, 3, 32, 32]);
        assert!(images.iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert_eq!(labels.len(), 3);
        assert_eq!(labels[1], labels[2]);
        assert_eq!(labels[0], dataset.label(0).unwrap() as i64);
    }

    #[test]
    fn class_labels_map_to_names() {
        assert_eq!(CifarClass::COUNT, 10);
        assert_eq!(CifarClass::from_repr(0), Some(CifarClass::Airplane));
        assert_eq!(CifarClass::from_repr(9), Some(CifarClass::Truck));
        assert_eq!(CifarClass::from_repr(10), None);
        assert_eq!(CifarClass::Automobile.to_string(), "automobile");
    }
}
