pub mod submission;
pub mod validation;

use std::future::Future;

use http::request::Parts;
use time::OffsetDateTime;
use tracing::{debug, error};
use usulan_dal::{
    Batch, ListingParams,
    usulan::{CreateUsulan, UpdateUsulan, Usulan, UsulanRepository},
};
use usulan_store::{Store as _, StorePrefix, ValidPath, file_store::FileStore, image_path};

use crate::error::{ApiError, ApiResult, NOT_FOUND_MESSAGE};
use crate::state::AppState;
use submission::{ImageUpload, SubmissionForm};
use validation::{FieldErrors, ImageRule, ValidSubmission, check_fields, check_image};

/// Coordinates submission validation, image blob lifecycle and record
/// mutation. Ordering matters: a blob is durably stored before the record
/// referencing it is written, and replaced/removed blobs go away only after
/// the record no longer points at them.
pub struct UsulanService {
    repository: UsulanRepository,
    store: FileStore,
}

impl UsulanService {
    pub fn new(repository: UsulanRepository, store: FileStore) -> Self {
        Self { repository, store }
    }

    fn current_year() -> i32 {
        OffsetDateTime::now_utc().year()
    }

    pub async fn list(&self, params: ListingParams) -> ApiResult<Batch<Usulan>> {
        Ok(self.repository.list(params).await?)
    }

    pub async fn get(&self, id: i64) -> ApiResult<Usulan> {
        self.repository.get(id).await.map_err(map_not_found)
    }

    pub async fn create(&self, form: SubmissionForm) -> ApiResult<Usulan> {
        let mut errors = FieldErrors::new();
        let image = check_image(form.image.as_ref(), ImageRule::Required, &mut errors);
        let fields = check_fields(&form.submission, Self::current_year(), &mut errors);
        if let Some(isbn) = form.submission.submitted_isbn() {
            if self.repository.isbn_taken(isbn, None).await? {
                errors.push("isbn", validation::taken_message("isbn"));
            }
        }

        match (fields, image) {
            (Some(fields), Some(image)) if errors.is_empty() => {
                self.store_and_create(fields, image).await
            }
            _ => Err(ApiError::Validation(errors)),
        }
    }

    async fn store_and_create(
        &self,
        fields: ValidSubmission,
        image: &ImageUpload,
    ) -> ApiResult<Usulan> {
        let (dest, key) = self.store_image(image).await?;
        let payload = CreateUsulan {
            judul: fields.judul,
            isbn: fields.isbn,
            penulis: fields.penulis,
            penerbit: fields.penerbit,
            tahun_terbit: fields.tahun_terbit,
            kategori: fields.kategori,
            pengusul_email: fields.pengusul_email,
            image: key,
        };
        match self.repository.create(payload).await {
            Ok(record) => Ok(record),
            Err(e) => {
                // a failed insert must not leave an orphaned blob behind
                self.discard_blob(&dest).await;
                Err(e.into())
            }
        }
    }

    pub async fn update(&self, id: i64, form: SubmissionForm) -> ApiResult<Usulan> {
        let mut errors = FieldErrors::new();
        let image = check_image(form.image.as_ref(), ImageRule::Optional, &mut errors);
        let fields = check_fields(&form.submission, Self::current_year(), &mut errors);
        if let Some(isbn) = form.submission.submitted_isbn() {
            if self.repository.isbn_taken(isbn, Some(id)).await? {
                errors.push("isbn", validation::taken_message("isbn"));
            }
        }
        let fields = match fields {
            Some(fields) if errors.is_empty() => fields,
            _ => return Err(ApiError::Validation(errors)),
        };

        let existing = self.repository.get(id).await.map_err(map_not_found)?;

        match image {
            Some(image) => {
                let (dest, key) = self.store_image(image).await?;
                match self
                    .repository
                    .update(id, update_payload(fields, Some(key)))
                    .await
                {
                    Ok(record) => {
                        // old blob is unreferenced now, removal is cleanup only
                        self.remove_stored_image(&existing.image).await;
                        Ok(record)
                    }
                    Err(e) => {
                        self.discard_blob(&dest).await;
                        Err(map_not_found(e))
                    }
                }
            }
            None => self
                .repository
                .update(id, update_payload(fields, None))
                .await
                .map_err(map_not_found),
        }
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        let existing = self.repository.get(id).await.map_err(map_not_found)?;
        // blob removal failure is surfaced in the log but must not block
        // record deletion
        self.remove_stored_image(&existing.image).await;
        self.repository.delete(id).await.map_err(map_not_found)?;
        Ok(())
    }

    /// Stores the blob under a fresh key, returns the full store path and
    /// the bare key persisted on the record.
    async fn store_image(&self, image: &ImageUpload) -> ApiResult<(ValidPath, String)> {
        let ext = image
            .format_extension()
            .ok_or_else(|| ApiError::InvalidRequest("Unsupported image format".into()))?;
        let dest = image_path(ext)?;
        self.store.store_data(&dest, &image.data).await?;
        let key = dest.clone().without_prefix(StorePrefix::Usulans)?.into();
        debug!("Stored image blob {}", dest.as_ref());
        Ok((dest, key))
    }

    async fn discard_blob(&self, path: &ValidPath) {
        if let Err(e) = self.store.remove_data(path).await {
            error!("Failed to remove blob {}: {e}", path.as_ref());
        }
    }

    async fn remove_stored_image(&self, key: &str) {
        match ValidPath::new(key) {
            Ok(path) => {
                let path = path.with_prefix(StorePrefix::Usulans);
                self.discard_blob(&path).await;
            }
            Err(e) => error!("Stored image key {key} is not a valid path: {e}"),
        }
    }
}

fn update_payload(fields: ValidSubmission, image: Option<String>) -> UpdateUsulan {
    UpdateUsulan {
        judul: fields.judul,
        isbn: fields.isbn,
        penulis: fields.penulis,
        penerbit: fields.penerbit,
        tahun_terbit: fields.tahun_terbit,
        kategori: fields.kategori,
        pengusul_email: fields.pengusul_email,
        image,
    }
}

fn map_not_found(e: usulan_dal::Error) -> ApiError {
    match e {
        usulan_dal::Error::RecordNotFound(_) => ApiError::NotFound(NOT_FOUND_MESSAGE.to_string()),
        other => other.into(),
    }
}

impl axum::extract::FromRequestParts<AppState> for UsulanService {
    type Rejection = http::StatusCode;

    fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        futures::future::ready(Ok(UsulanService::new(
            UsulanRepository::new(state.pool().clone()),
            state.store().clone(),
        )))
    }
}
