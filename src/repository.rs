// src/repository.rs
use crate::models::siswa::{NewSiswa, Siswa, SiswaPatch};
use async_trait::async_trait;
use sqlx::{MySql, MySqlPool, QueryBuilder};

#[async_trait]
pub trait SiswaRepository: Send + Sync {
    async fn all(&self) -> Result<Vec<Siswa>, sqlx::Error>;
    async fn find(&self, id: i64) -> Result<Option<Siswa>, sqlx::Error>;
    async fn create(&self, new: &NewSiswa) -> Result<Siswa, sqlx::Error>;
    /// `None` kalau id tidak ada.
    async fn update(&self, id: i64, patch: &SiswaPatch) -> Result<Option<Siswa>, sqlx::Error>;
    /// `false` kalau tidak ada baris yang terhapus.
    async fn delete(&self, id: i64) -> Result<bool, sqlx::Error>;
}

const SELECT_SISWA: &str = "SELECT id, nama, alamat, nisn, foto, created_at, updated_at FROM siswa";

pub struct MySqlSiswaRepository {
    pool: MySqlPool,
}

impl MySqlSiswaRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SiswaRepository for MySqlSiswaRepository {
    async fn all(&self) -> Result<Vec<Siswa>, sqlx::Error> {
        sqlx::query_as::<_, Siswa>(&format!("{} ORDER BY id", SELECT_SISWA))
            .fetch_all(&self.pool)
            .await
    }

    async fn find(&self, id: i64) -> Result<Option<Siswa>, sqlx::Error> {
        sqlx::query_as::<_, Siswa>(&format!("{} WHERE id = ?", SELECT_SISWA))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn create(&self, new: &NewSiswa) -> Result<Siswa, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO siswa (nama, alamat, nisn, foto, created_at, updated_at)
             VALUES (?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)",
        )
        .bind(&new.nama)
        .bind(&new.alamat)
        .bind(&new.nisn)
        .bind(&new.foto)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_id() as i64;
        sqlx::query_as::<_, Siswa>(&format!("{} WHERE id = ?", SELECT_SISWA))
            .bind(id)
            .fetch_one(&self.pool)
            .await
    }

    async fn update(&self, id: i64, patch: &SiswaPatch) -> Result<Option<Siswa>, sqlx::Error> {
        if !patch.is_empty() {
            let mut qb: QueryBuilder<MySql> = QueryBuilder::new("UPDATE siswa SET ");
            let mut set = qb.separated(", ");
            if let Some(v) = &patch.nama {
                set.push("nama = ").push_bind_unseparated(v.clone());
            }
            if let Some(v) = &patch.alamat {
                set.push("alamat = ").push_bind_unseparated(v.clone());
            }
            if let Some(v) = &patch.nisn {
                set.push("nisn = ").push_bind_unseparated(v.clone());
            }
            if let Some(v) = &patch.foto {
                set.push("foto = ").push_bind_unseparated(v.clone());
            }
            set.push("updated_at = CURRENT_TIMESTAMP");
            qb.push(" WHERE id = ").push_bind(id);

            qb.build().execute(&self.pool).await?;
        }

        self.find(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM siswa WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Repository di memori untuk pengujian handler.
#[cfg(test)]
#[derive(Default)]
pub struct MemorySiswaRepository {
    rows: tokio::sync::RwLock<std::collections::BTreeMap<i64, Siswa>>,
    next_id: std::sync::atomic::AtomicI64,
}

#[cfg(test)]
#[async_trait]
impl SiswaRepository for MemorySiswaRepository {
    async fn all(&self) -> Result<Vec<Siswa>, sqlx::Error> {
        Ok(self.rows.read().await.values().cloned().collect())
    }

    async fn find(&self, id: i64) -> Result<Option<Siswa>, sqlx::Error> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn create(&self, new: &NewSiswa) -> Result<Siswa, sqlx::Error> {
        let id = self
            .next_id
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst)
            + 1;
        let now = chrono::Local::now();
        let siswa = Siswa {
            id,
            nama: new.nama.clone(),
            alamat: new.alamat.clone(),
            nisn: new.nisn.clone(),
            foto: new.foto.clone(),
            created_at: now,
            updated_at: now,
        };
        self.rows.write().await.insert(id, siswa.clone());
        Ok(siswa)
    }

    async fn update(&self, id: i64, patch: &SiswaPatch) -> Result<Option<Siswa>, sqlx::Error> {
        let mut rows = self.rows.write().await;
        Ok(rows.get_mut(&id).map(|siswa| {
            if !patch.is_empty() {
                patch.apply(siswa);
                siswa.updated_at = chrono::Local::now();
            }
            siswa.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        Ok(self.rows.write().await.remove(&id).is_some())
    }
}

/// Repository yang selalu gagal saat insert, untuk menguji jalur error 500.
#[cfg(test)]
#[derive(Default)]
pub struct FailingCreateRepository;

#[cfg(test)]
#[async_trait]
impl SiswaRepository for FailingCreateRepository {
    async fn all(&self) -> Result<Vec<Siswa>, sqlx::Error> {
        Ok(Vec::new())
    }

    async fn find(&self, _id: i64) -> Result<Option<Siswa>, sqlx::Error> {
        Ok(None)
    }

    async fn create(&self, _new: &NewSiswa) -> Result<Siswa, sqlx::Error> {
        Err(sqlx::Error::PoolTimedOut)
    }

    async fn update(&self, _id: i64, _patch: &SiswaPatch) -> Result<Option<Siswa>, sqlx::Error> {
        Ok(None)
    }

    async fn delete(&self, _id: i64) -> Result<bool, sqlx::Error> {
        Ok(false)
    }
}
