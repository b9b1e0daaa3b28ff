use crate::{repository::SiswaRepository, storage::BlobStore};
use std::sync::Arc;

/// Dependensi handler, didaftarkan sekali lewat `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub siswa: Arc<dyn SiswaRepository>,
    pub blobs: Arc<dyn BlobStore>,
}

impl AppState {
    pub fn new(siswa: Arc<dyn SiswaRepository>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { siswa, blobs }
    }
}
