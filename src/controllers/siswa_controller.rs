// src/controllers/siswa_controller.rs
use crate::{
    error::AppError,
    models::siswa::{NewSiswa, Siswa, SiswaPatch},
    state::AppState,
    validation::{self, MAX_FOTO_BYTES, SiswaInput, UploadedFile},
};
use actix_multipart::{Field, Multipart};
use actix_web::{HttpMessage, HttpRequest, HttpResponse, delete, get, post, route, web};
use futures_util::TryStreamExt as _;
use serde::Serialize;

/// Folder blob untuk foto siswa.
pub const FOTO_FOLDER: &str = "folder-gambar";

/// Batas satu field teks multipart. Kolomnya cuma VARCHAR(255).
const MAX_TEXT_BYTES: usize = 64 * 1024;
/// Batas body JSON/form untuk update.
const MAX_UPDATE_BYTES: usize = 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn with_data(message: &'static str, data: T) -> Self {
        Self {
            message,
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: &'static str) -> Self {
        Self {
            message,
            data: None,
        }
    }
}

async fn find_or_404(state: &AppState, id: i64) -> Result<Siswa, AppError> {
    state.siswa.find(id).await?.ok_or(AppError::NotFound)
}

#[get("/siswa")]
pub async fn index(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let siswas = state.siswa.all().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_data("Data Semua Siswa", siswas)))
}

#[post("/siswa")]
pub async fn store(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let (input, foto) = read_siswa_form(payload).await?;
    if let Some(f) = &foto {
        log::debug!("foto diterima: {:?} ({} bytes)", f.filename, f.size);
    }

    // Validasi dulu, belum ada file atau baris yang ditulis
    let valid = validation::validate_create(input, foto).map_err(AppError::Validation)?;

    let foto_path = state
        .blobs
        .put(FOTO_FOLDER, &valid.foto, valid.foto_format.extension())
        .await?;

    let new_siswa = NewSiswa {
        nama: valid.nama,
        alamat: valid.alamat,
        nisn: valid.nisn,
        foto: foto_path,
    };

    let created = match state.siswa.create(&new_siswa).await {
        Ok(siswa) => siswa,
        Err(e) => {
            // Insert gagal, jangan tinggalkan foto yatim
            if let Err(del) = state.blobs.delete(&new_siswa.foto).await {
                log::warn!("Gagal menghapus foto {}: {}", new_siswa.foto, del);
            }
            return Err(e.into());
        }
    };

    log::info!("Siswa {} disimpan, foto {}", created.id, created.foto);
    Ok(HttpResponse::Ok().json(ApiResponse::with_data(
        "Data Siswa Berhasil disimpan",
        created,
    )))
}

#[get("/siswa/{id}")]
pub async fn show(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let siswa = find_or_404(&state, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_data("Data Siswa", siswa)))
}

#[route("/siswa/{id}", method = "PUT", method = "PATCH")]
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    req: HttpRequest,
    payload: web::Payload,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    // Cek id dulu, body baru dibaca setelah record pasti ada
    find_or_404(&state, id).await?;
    let patch = read_patch(&req, payload).await?;

    let updated = state
        .siswa
        .update(id, &patch)
        .await?
        .ok_or(AppError::NotFound)?;

    log::info!("Siswa {} diperbarui", id);
    Ok(HttpResponse::Ok().json(ApiResponse::with_data(
        "Data Siswa Berhasil Di Update",
        updated,
    )))
}

#[delete("/siswa/{id}")]
pub async fn destroy(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let siswa = find_or_404(&state, id).await?;

    // Hapus file fisik dulu; kalau gagal, baris tetap dihapus
    if let Err(e) = state.blobs.delete(&siswa.foto).await {
        log::warn!("Gagal menghapus foto {}: {}", siswa.foto, e);
    }

    if !state.siswa.delete(id).await? {
        return Err(AppError::NotFound);
    }

    log::info!("Siswa {} dihapus", id);
    Ok(HttpResponse::Ok().json(ApiResponse::<()>::message("Data Siswa Berhasil dihapus")))
}

pub fn scope() -> actix_web::Scope {
    web::scope("/api")
        .service(index)
        .service(store)
        .service(show)
        .service(update)
        .service(destroy)
}

async fn read_siswa_form(
    mut payload: Multipart,
) -> Result<(SiswaInput, Option<UploadedFile>), AppError> {
    let mut input = SiswaInput::default();
    let mut foto: Option<UploadedFile> = None;

    while let Some(field) = payload
        .try_next()
        .await
        .map_err(|e| AppError::BadRequest(format!("Multipart tidak valid: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "nama" => input.nama = read_text_field(field).await?,
            "alamat" => input.alamat = read_text_field(field).await?,
            "nisn" => input.nisn = read_text_field(field).await?,
            "foto" => foto = Some(read_file_field(field, MAX_FOTO_BYTES).await?),
            _ => {}
        }
    }

    Ok((input, foto))
}

/// Teks field di-trim; string kosong dianggap tidak diisi.
async fn read_text_field(mut field: Field) -> Result<Option<String>, AppError> {
    let name = field.name().unwrap_or("").to_string();
    let mut bytes = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| AppError::BadRequest(format!("Gagal membaca field: {}", e)))?
    {
        if bytes.len() + chunk.len() > MAX_TEXT_BYTES {
            return Err(AppError::BadRequest(format!(
                "Field {} melebihi {} bytes",
                name, MAX_TEXT_BYTES
            )));
        }
        bytes.extend_from_slice(&chunk);
    }
    let text = String::from_utf8_lossy(&bytes).trim().to_string();
    Ok((!text.is_empty()).then_some(text))
}

/// Baca file sampai habis, tapi yang disimpan di memori paling banyak `limit` byte.
async fn read_file_field(mut field: Field, limit: u64) -> Result<UploadedFile, AppError> {
    let filename = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .map(|s| s.to_string());

    let mut bytes = Vec::new();
    let mut size: u64 = 0;
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| AppError::BadRequest(format!("Gagal membaca file: {}", e)))?
    {
        size += chunk.len() as u64;
        let room = limit.saturating_sub(bytes.len() as u64) as usize;
        bytes.extend_from_slice(&chunk[..chunk.len().min(room)]);
    }

    Ok(UploadedFile {
        filename,
        bytes,
        size,
    })
}

/// Body update boleh multipart, urlencoded, atau JSON. Body kosong berarti
/// tidak ada field yang diubah.
async fn read_patch(
    req: &HttpRequest,
    mut payload: web::Payload,
) -> Result<SiswaPatch, AppError> {
    if req.content_type() == "multipart/form-data" {
        return read_patch_form(Multipart::new(req.headers(), payload)).await;
    }

    let mut body = Vec::new();
    while let Some(chunk) = payload
        .try_next()
        .await
        .map_err(|e| AppError::BadRequest(format!("Gagal membaca body: {}", e)))?
    {
        if body.len() + chunk.len() > MAX_UPDATE_BYTES {
            return Err(AppError::BadRequest(format!(
                "Body melebihi {} bytes",
                MAX_UPDATE_BYTES
            )));
        }
        body.extend_from_slice(&chunk);
    }

    parse_patch(req.content_type(), &body)
}

fn parse_patch(content_type: &str, body: &[u8]) -> Result<SiswaPatch, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SiswaPatch::default());
    }

    if content_type == "application/x-www-form-urlencoded" {
        let text = std::str::from_utf8(body)
            .map_err(|e| AppError::BadRequest(format!("Form error: {}", e)))?;
        return web::Query::<SiswaPatch>::from_query(text)
            .map(web::Query::into_inner)
            .map_err(|e| AppError::BadRequest(format!("Form error: {}", e)));
    }

    serde_json::from_slice(body).map_err(|e| {
        log::debug!("JSON payload error: {}", e);
        AppError::BadRequest(format!("Payload error: {}", e))
    })
}

/// File di body update diabaikan; foto hanya bisa diganti lewat path.
async fn read_patch_form(mut payload: Multipart) -> Result<SiswaPatch, AppError> {
    let mut patch = SiswaPatch::default();

    while let Some(field) = payload
        .try_next()
        .await
        .map_err(|e| AppError::BadRequest(format!("Multipart tidak valid: {}", e)))?
    {
        let is_file = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .is_some();
        if is_file {
            continue;
        }

        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "nama" => patch.nama = read_text_field(field).await?,
            "alamat" => patch.alamat = read_text_field(field).await?,
            "nisn" => patch.nisn = read_text_field(field).await?,
            "foto" => patch.foto = read_text_field(field).await?,
            _ => {}
        }
    }

    Ok(patch)
}
