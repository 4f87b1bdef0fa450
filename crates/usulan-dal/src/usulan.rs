use crate::{Batch, Error, ListingParams, error::Result};
use serde::{Deserialize, Serialize};
use sqlx::Pool;
use tracing::debug;

const ENTITY: &str = "UsulanBuku";
const ISBN_FIELD: &str = "isbn";

/// Payload for creating a new record; `image` is the blob key already
/// stored in the image store.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateUsulan {
    pub judul: String,
    pub isbn: String,
    pub penulis: String,
    pub penerbit: String,
    pub tahun_terbit: i32,
    pub kategori: String,
    pub pengusul_email: String,
    pub image: String,
}

/// Full field update; `image` left untouched when None.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UpdateUsulan {
    pub judul: String,
    pub isbn: String,
    pub penulis: String,
    pub penerbit: String,
    pub tahun_terbit: i32,
    pub kategori: String,
    pub pengusul_email: String,
    pub image: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Usulan {
    pub id: i64,
    pub judul: String,
    pub isbn: String,
    pub penulis: String,
    pub penerbit: String,
    pub tahun_terbit: i32,
    pub kategori: String,
    pub pengusul_email: String,
    /// blob key in the usulans store namespace
    pub image: String,
    pub created: time::PrimitiveDateTime,
    pub modified: time::PrimitiveDateTime,
}

pub type UsulanRepository = UsulanRepositoryImpl<Pool<crate::ChosenDB>>;

pub struct UsulanRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> UsulanRepositoryImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = crate::ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn create(&self, payload: CreateUsulan) -> Result<Usulan> {
        let result = sqlx::query(
            "INSERT INTO usulan_buku \
            (judul, isbn, penulis, penerbit, tahun_terbit, kategori, pengusul_email, image, created, modified) \
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, datetime('now'), datetime('now'))",
        )
        .bind(&payload.judul)
        .bind(&payload.isbn)
        .bind(&payload.penulis)
        .bind(&payload.penerbit)
        .bind(payload.tahun_terbit)
        .bind(&payload.kategori)
        .bind(&payload.pengusul_email)
        .bind(&payload.image)
        .execute(&self.executor)
        .await
        .map_err(|e| Error::from_db(ISBN_FIELD, e))?;

        let id = result.last_insert_rowid();
        self.get(id).await
    }

    pub async fn update(&self, id: i64, payload: UpdateUsulan) -> Result<Usulan> {
        let result = match &payload.image {
            Some(image) => {
                sqlx::query(
                    "UPDATE usulan_buku SET judul = ?, isbn = ?, penulis = ?, penerbit = ?, \
                    tahun_terbit = ?, kategori = ?, pengusul_email = ?, image = ?, \
                    modified = datetime('now') WHERE id = ?",
                )
                .bind(&payload.judul)
                .bind(&payload.isbn)
                .bind(&payload.penulis)
                .bind(&payload.penerbit)
                .bind(payload.tahun_terbit)
                .bind(&payload.kategori)
                .bind(&payload.pengusul_email)
                .bind(image)
                .bind(id)
                .execute(&self.executor)
                .await
            }
            None => {
                sqlx::query(
                    "UPDATE usulan_buku SET judul = ?, isbn = ?, penulis = ?, penerbit = ?, \
                    tahun_terbit = ?, kategori = ?, pengusul_email = ?, \
                    modified = datetime('now') WHERE id = ?",
                )
                .bind(&payload.judul)
                .bind(&payload.isbn)
                .bind(&payload.penulis)
                .bind(&payload.penerbit)
                .bind(payload.tahun_terbit)
                .bind(&payload.kategori)
                .bind(&payload.pengusul_email)
                .bind(id)
                .execute(&self.executor)
                .await
            }
        }
        .map_err(|e| Error::from_db(ISBN_FIELD, e))?;

        if result.rows_affected() == 0 {
            debug!("Update of missing record {id}");
            Err(Error::RecordNotFound(ENTITY.to_string()))
        } else {
            self.get(id).await
        }
    }

    /// Newest first, by creation order.
    pub async fn list(&self, params: ListingParams) -> Result<Batch<Usulan>> {
        let total = self.count().await?;
        let rows = sqlx::query_as::<_, Usulan>(
            "SELECT * FROM usulan_buku ORDER BY created DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(params.limit)
        .bind(params.offset)
        .fetch_all(&self.executor)
        .await?;
        Ok(Batch {
            offset: params.offset,
            total,
            rows,
        })
    }

    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM usulan_buku")
            .fetch_one(&self.executor)
            .await?;
        Ok(count as u64)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let res = sqlx::query("DELETE FROM usulan_buku WHERE id = ?")
            .bind(id)
            .execute(&self.executor)
            .await?;

        if res.rows_affected() == 0 {
            Err(Error::RecordNotFound(ENTITY.to_string()))
        } else {
            Ok(())
        }
    }

    pub async fn get(&self, id: i64) -> Result<Usulan> {
        let record = sqlx::query_as::<_, Usulan>("SELECT * FROM usulan_buku WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.executor)
            .await?;
        record.ok_or_else(|| Error::RecordNotFound(ENTITY.to_string()))
    }

    /// Uniqueness pre-check; `exclude_id` skips the record being updated.
    pub async fn isbn_taken(&self, isbn: &str, exclude_id: Option<i64>) -> Result<bool> {
        let count: i64 = match exclude_id {
            Some(id) => {
                sqlx::query_scalar("SELECT count(*) FROM usulan_buku WHERE isbn = ? AND id != ?")
                    .bind(isbn)
                    .bind(id)
                    .fetch_one(&self.executor)
                    .await?
            }
            None => {
                sqlx::query_scalar("SELECT count(*) FROM usulan_buku WHERE isbn = ?")
                    .bind(isbn)
                    .fetch_one(&self.executor)
                    .await?
            }
        };
        Ok(count > 0)
    }
}
