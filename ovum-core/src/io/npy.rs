// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::path::Path;

use npyz::{self, NpyFile, WriterBuilder};

use crate::error::OvumError;

/// Write a numpy file from a vector of specified shape
///
/// # Arguments
///
/// * `path` - Path to output numpy file
/// * `data` - Vector of numeric type
/// * `shape` - Shape of the vector (shape product must equal length of data)
///
/// # Examples
///
/// ```no_run
/// use ovum_core::io::write_numpy;
///
/// write_numpy("crop.npy", vec![0u8; 12], vec![2, 2, 3]).unwrap();
/// ```
pub fn write_numpy<T, P: AsRef<Path>>(
    path: P,
    data: Vec<T>,
    shape: Vec<u64>,
) -> Result<(), OvumError>
where
    T: npyz::Serialize + npyz::AutoSerialize,
{
    if shape.iter().product::<u64>() != data.len() as u64 {
        return Err(OvumError::BufferSizeError);
    }

    let mut buffer = vec![];
    let mut writer = npyz::WriteOptions::<T>::new()
        .default_dtype()
        .shape(&shape)
        .writer(&mut buffer)
        .begin_nd()
        .map_err(|_| OvumError::ImageWriteError)?;

    writer
        .extend(data)
        .map_err(|_| OvumError::ImageWriteError)?;

    writer.finish().map_err(|_| OvumError::ImageWriteError)?;
    std::fs::write(path, buffer).map_err(|_| OvumError::ImageWriteError)?;
    Ok(())
}

/// Read the raw bytes of a numpy file
///
/// The returned bytes should be wrapped in `NpyFile::new` by the caller so the
/// header can be inspected before the data is decoded.
pub fn read_numpy_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, OvumError> {
    std::fs::read(path).map_err(|_| OvumError::ImageReadError)
}

/// Interpret a numpy header shape as (height, width, channels)
///
/// # Arguments
///
/// * `npy` - A numpy array with an (H, W) or (H, W, C) shape
pub fn numpy_extent(npy: &NpyFile<&[u8]>) -> Result<(u32, u32, u32), OvumError> {
    let shape = npy.shape();

    match shape.len() {
        2 => Ok((shape[0] as u32, shape[1] as u32, 1u32)),
        3 => Ok((shape[0] as u32, shape[1] as u32, shape[2] as u32)),
        _ => Err(OvumError::ImageError(
            "Numpy array inputs must have an (H, W) or (H, W, C) shape.",
        )),
    }
}
