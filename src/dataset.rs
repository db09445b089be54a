//! Loader for the corrupted-MNIST exercise archives.
//!
//! Each archive is an `.npz` file holding an `images` entry of shape
//! [n, 28, 28] and, in the labelled splits, a `labels` entry of shape [n].

use crate::error::DataError;
use burn::prelude::*;
use ndarray::{Array1, Array3, ArrayD, ArrayView2, Axis, Ix3};
use ndarray_npy::{NpzReader, ReadNpzError};
use num_traits::AsPrimitive;
use std::fs::File;
use std::path::Path;

pub const WIDTH: usize = 28;
pub const HEIGHT: usize = 28;

const IMAGES: &str = "images";
const LABELS: &str = "labels";

/// An in-memory corrupted-MNIST split.
///
/// The splits are tiny (5,000 images, ~15MB as f32), so the whole archive
/// is loaded up front.
#[derive(Debug, Clone)]
pub struct CorruptMnist {
    /// Pixel intensities, as stored in the archive.
    ///
    /// # Shape
    /// [n, HEIGHT, WIDTH]
    pub images: Array3<f32>,

    /// Digit labels in 0..=9, when the archive carries them.
    ///
    /// # Shape
    /// [n]
    pub labels: Option<Array1<i64>>,
}

impl CorruptMnist {
    /// Reads one `.npz` archive from disk.
    ///
    /// Image entries stored as `f64` are accepted and narrowed to `f32`.
    /// Label entries stored as `u8` are accepted and widened to `i64`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DataError::FileNotFound(path.to_path_buf()));
        }

        let mut npz = NpzReader::new(File::open(path)?)?;
        let names = npz.names()?;

        let entry = find_entry(&names, IMAGES)
            .ok_or_else(|| DataError::MissingArray(IMAGES.to_string()))?;
        let images = read_images(&mut npz, entry)?;

        let got = images.shape().to_vec();
        let images = images
            .into_dimensionality::<Ix3>()
            .map_err(|_| DataError::BadImageShape { got: got.clone() })?;
        let (n, height, width) = images.dim();
        if height != HEIGHT || width != WIDTH {
            return Err(DataError::BadImageShape { got });
        }

        let labels = match find_entry(&names, LABELS) {
            Some(entry) => Some(read_labels(&mut npz, entry)?),
            None => None,
        };

        log::debug!("loaded {} images from {}", n, path.display());

        Ok(Self { images, labels })
    }

    /// Number of images in the split.
    pub fn len(&self) -> usize {
        self.images.dim().0
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One image as a [HEIGHT, WIDTH] view.
    pub fn image(&self, index: usize) -> Option<ArrayView2<'_, f32>> {
        if index < self.len() {
            Some(self.images.index_axis(Axis(0), index))
        } else {
            None
        }
    }

    /// The whole split as a batch tensor.
    ///
    /// # Shapes
    ///   - Output [n, HEIGHT, WIDTH]
    pub fn to_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 3> {
        let (n, height, width) = self.images.dim();
        let data = TensorData::new(
            self.images.iter().copied().collect::<Vec<f32>>(),
            [n, height, width],
        );
        Tensor::from_data(data.convert::<B::FloatElem>(), device)
    }
}

/// Zip entries are stored with a `.npy` suffix; accept the bare name too.
fn find_entry<'a>(names: &'a [String], name: &str) -> Option<&'a str> {
    names
        .iter()
        .map(String::as_str)
        .find(|n| *n == name || n.strip_suffix(".npy") == Some(name))
}

fn read_images(npz: &mut NpzReader<File>, entry: &str) -> Result<ArrayD<f32>, DataError> {
    let as_f32: Result<ArrayD<f32>, ReadNpzError> = npz.by_name(entry);
    match as_f32 {
        Ok(images) => Ok(images),
        Err(narrow_err) => {
            let as_f64: Result<ArrayD<f64>, ReadNpzError> = npz.by_name(entry);
            match as_f64 {
                Ok(images) => Ok(images.mapv(|v: f64| -> f32 { v.as_() })),
                Err(_) => Err(narrow_err.into()),
            }
        }
    }
}

fn read_labels(npz: &mut NpzReader<File>, entry: &str) -> Result<Array1<i64>, DataError> {
    let as_i64: Result<Array1<i64>, ReadNpzError> = npz.by_name(entry);
    match as_i64 {
        Ok(labels) => Ok(labels),
        Err(wide_err) => {
            let as_u8: Result<Array1<u8>, ReadNpzError> = npz.by_name(entry);
            match as_u8 {
                Ok(labels) => Ok(labels.mapv(|v: u8| -> i64 { v.as_() })),
                Err(_) => Err(wide_err.into()),
            }
        }
    }
}
