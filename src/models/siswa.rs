// src/models/siswa.rs
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Siswa {
    pub id: i64,
    pub nama: String,
    pub alamat: String,
    pub nisn: String,
    pub foto: String,
    pub created_at: DateTime<chrono::Local>,
    pub updated_at: DateTime<chrono::Local>,
}

/// Data siswa yang sudah lolos validasi, foto sudah tersimpan di blob store.
#[derive(Debug, Clone)]
pub struct NewSiswa {
    pub nama: String,
    pub alamat: String,
    pub nisn: String,
    pub foto: String,
}

/// Field yang boleh diubah lewat update. Key lain di body diabaikan.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SiswaPatch {
    pub nama: Option<String>,
    pub alamat: Option<String>,
    pub nisn: Option<String>,
    pub foto: Option<String>,
}

impl SiswaPatch {
    pub fn is_empty(&self) -> bool {
        self.nama.is_none() && self.alamat.is_none() && self.nisn.is_none() && self.foto.is_none()
    }

    #[cfg(test)]
    pub fn apply(&self, siswa: &mut Siswa) {
        if let Some(v) = &self.nama {
            siswa.nama = v.clone();
        }
        if let Some(v) = &self.alamat {
            siswa.alamat = v.clone();
        }
        if let Some(v) = &self.nisn {
            siswa.nisn = v.clone();
        }
        if let Some(v) = &self.foto {
            siswa.foto = v.clone();
        }
    }
}
