use crate::config::Config;
use sqlx::{MySql, Pool};

pub async fn establish_connection(config: &Config) -> Result<Pool<MySql>, sqlx::Error> {
    let pool = sqlx::mysql::MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|e| {
            log::error!("Gagal membuat pool database: {:?}", e);
            e
        })?;

    sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
        log::error!("Gagal menjalankan migrasi: {:?}", e);
        sqlx::Error::from(e)
    })?;

    Ok(pool)
}
