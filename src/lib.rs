#![warn(missing_docs)]

//! Loading, disk caching and index-based slicing for the CIFAR-10 image
//! corpus.
//!
//! The crate is organized around a small [`Dataset`] abstraction:
//!
//! - [`vision::load`] resolves a dataset name to its loader, downloads and
//!   assembles the corpus on first use and snapshots it to disk so later
//!   loads skip the network entirely.
//! - [`vision::cifar::subset`] gathers rows of a loaded dataset at
//!   caller-given indices; [`vision::cifar::subset_tensors`] materializes
//!   the gather as normalized channel-first tensors.
//! - [`transform::SelectionDataset`] is the lazy index-view the gather is
//!   built on, usable on its own when no copy is wanted.
//!
//! ```no_run
//! use cifar_dataset::Dataset;
//! use cifar_dataset::vision::{self, cifar};
//!
//! # fn main() -> Result<(), vision::DatasetError> {
//! let dataset = vision::load("cifar10", "./data")?;
//! let picked = cifar::subset(&dataset, &[0, 7, 7, 42])?;
//! assert_eq!(picked.len(), 4);
//! # Ok(())
//! # }
//! ```

pub mod network;
pub mod transform;
pub mod vision;

mod dataset;

pub use dataset::*;

#[cfg(test)]
mod test_data;
