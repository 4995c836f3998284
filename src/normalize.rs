use std::ffi::{OsStr, OsString};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::ImageReader;

use crate::errors::{BgRemoveError, Result};
use crate::imageops::flatten_onto_white;

/// Decodes input images and re-encodes them as plain RGB JPEGs for upload.
pub struct Normalizer {
    temp_dir: PathBuf,
    quality: u8,
}

impl Normalizer {
    pub fn new(temp_dir: impl Into<PathBuf>, quality: u8) -> Self {
        Self {
            temp_dir: temp_dir.into(),
            quality,
        }
    }

    pub fn jpeg_path(&self, base_name: impl AsRef<OsStr>) -> PathBuf {
        self.temp_dir.join(file_name_for(base_name.as_ref(), "jpg"))
    }

    /// Writes `<temp_dir>/<base_name>.jpg` and returns its path.
    pub fn normalize(&self, input: &Path, base_name: impl AsRef<OsStr>) -> Result<PathBuf> {
        let img = ImageReader::open(input)
            .map_err(|e| BgRemoveError::file_system(input, "image open", e))?
            .with_guessed_format()
            .map_err(|e| BgRemoveError::file_system(input, "format detection", e))?
            .decode()
            .map_err(|e| BgRemoveError::image_processing(input, "image decode", e))?;

        let rgb = flatten_onto_white(img);

        let output = self.jpeg_path(base_name);
        let file =
            File::create(&output).map_err(|e| BgRemoveError::file_system(&output, "jpeg create", e))?;
        let mut writer = BufWriter::new(file);

        JpegEncoder::new_with_quality(&mut writer, self.quality)
            .encode_image(&rgb)
            .map_err(|e| BgRemoveError::image_processing(&output, "jpeg encode", e))?;
        writer
            .flush()
            .map_err(|e| BgRemoveError::file_system(&output, "jpeg flush", e))?;

        Ok(output)
    }
}

/// `<base_name>.<extension>` without re-encoding the base name.
///
/// The extension is appended, never substituted, so `a.tar` stays `a.tar.png`.
pub fn file_name_for(base_name: &OsStr, extension: &str) -> OsString {
    let mut file_name = base_name.to_os_string();
    file_name.push(".");
    file_name.push(extension);
    file_name
}
