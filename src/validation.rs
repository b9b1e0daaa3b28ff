//! Validasi input create siswa.
//!
//! Semua aturan dievaluasi, hasilnya dikumpulkan per field dengan format yang
//! sama seperti respons 422: `{"nisn": ["..."], "foto": ["...", "..."]}`.

use image::ImageFormat;
use serde::Serialize;
use std::collections::BTreeMap;
use validator::{Validate, ValidationErrors};

/// Batas ukuran foto, 2048 KB.
pub const MAX_FOTO_BYTES: u64 = 2048 * 1024;

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationMessages(BTreeMap<String, Vec<String>>);

impl ValidationMessages {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    #[cfg(test)]
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl From<ValidationErrors> for ValidationMessages {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages = ValidationMessages::default();
        for (field, errs) in errors.field_errors() {
            for err in errs.iter() {
                let msg = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("The {} field is invalid.", field));
                messages.add(&field, msg);
            }
        }
        messages
    }
}

/// Field teks create. String kosong sudah diubah jadi `None` oleh parser form.
#[derive(Debug, Default, Clone, Validate)]
pub struct SiswaInput {
    #[validate(required(message = "The nama field is required."))]
    pub nama: Option<String>,

    #[validate(required(message = "The alamat field is required."))]
    pub alamat: Option<String>,

    #[validate(
        required(message = "The nisn field is required."),
        length(min = 8, message = "The nisn must be at least 8 characters.")
    )]
    pub nisn: Option<String>,
}

/// File hasil upload multipart, disimpan di memori sampai lolos validasi.
#[derive(Debug, Default, Clone)]
pub struct UploadedFile {
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
    /// Ukuran sebenarnya; `bytes` berhenti diisi setelah melewati batas.
    pub size: u64,
}

impl UploadedFile {
    #[cfg(test)]
    pub fn new(filename: Option<String>, bytes: Vec<u8>) -> Self {
        let size = bytes.len() as u64;
        Self {
            filename,
            bytes,
            size,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

/// Format foto yang diterima beserta ekstensi simpannya.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FotoFormat {
    Jpeg,
    Png,
}

impl FotoFormat {
    pub fn extension(self) -> &'static str {
        match self {
            FotoFormat::Jpeg => "jpg",
            FotoFormat::Png => "png",
        }
    }
}

fn is_image(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Jpeg
            | ImageFormat::Png
            | ImageFormat::Gif
            | ImageFormat::Bmp
            | ImageFormat::WebP
    )
}

/// Validasi foto dari isi file, bukan dari header content-type.
pub fn validate_foto(
    foto: Option<&UploadedFile>,
    messages: &mut ValidationMessages,
) -> Option<FotoFormat> {
    let Some(foto) = foto.filter(|f| !f.is_empty()) else {
        messages.add("foto", "The foto field is required.");
        return None;
    };

    let guessed = image::guess_format(&foto.bytes).ok();
    if !guessed.is_some_and(is_image) {
        messages.add("foto", "The foto must be an image.");
    }

    let format = match guessed {
        Some(ImageFormat::Jpeg) => Some(FotoFormat::Jpeg),
        Some(ImageFormat::Png) => Some(FotoFormat::Png),
        _ => {
            messages.add("foto", "The foto must be a file of type: jpg, png, jpeg.");
            None
        }
    };

    if foto.size > MAX_FOTO_BYTES {
        messages.add("foto", "The foto must not be greater than 2048 kilobytes.");
        return None;
    }

    format
}

/// Data create yang sudah lolos validasi.
#[derive(Debug, Clone)]
pub struct ValidSiswa {
    pub nama: String,
    pub alamat: String,
    pub nisn: String,
    pub foto: Vec<u8>,
    pub foto_format: FotoFormat,
}

pub fn validate_create(
    input: SiswaInput,
    foto: Option<UploadedFile>,
) -> Result<ValidSiswa, ValidationMessages> {
    let mut messages = match input.validate() {
        Ok(()) => ValidationMessages::default(),
        Err(e) => ValidationMessages::from(e),
    };
    let format = validate_foto(foto.as_ref(), &mut messages);

    match (input, foto, format) {
        (
            SiswaInput {
                nama: Some(nama),
                alamat: Some(alamat),
                nisn: Some(nisn),
            },
            Some(foto),
            Some(foto_format),
        ) if messages.is_empty() => Ok(ValidSiswa {
            nama,
            alamat,
            nisn,
            foto: foto.bytes,
            foto_format,
        }),
        _ => Err(messages),
    }
}
