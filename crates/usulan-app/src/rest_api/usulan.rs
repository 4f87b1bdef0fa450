use axum::{
    Json,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use axum_valid::Garde;
use http::StatusCode;
use serde::Serialize;
use usulan_dal::usulan::Usulan;

use crate::{
    error::ApiResult,
    rest_api::{Envelope, Page, Paging},
    state::{AppConfig, AppState},
    usulan::{UsulanService, submission::SubmissionForm},
};

/// Wire form of a record - the stored image key is expanded into a public
/// URL, the persisted representation never leaves the server.
#[derive(Debug, Serialize)]
pub struct UsulanPayload {
    pub id: i64,
    pub judul: String,
    pub isbn: String,
    pub penulis: String,
    pub penerbit: String,
    pub tahun_terbit: i32,
    pub kategori: String,
    pub pengusul_email: String,
    pub image: String,
    pub created: time::PrimitiveDateTime,
    pub modified: time::PrimitiveDateTime,
}

impl UsulanPayload {
    pub fn from_record(record: Usulan, config: &AppConfig) -> Self {
        Self {
            id: record.id,
            judul: record.judul,
            isbn: record.isbn,
            penulis: record.penulis,
            penerbit: record.penerbit,
            tahun_terbit: record.tahun_terbit,
            kategori: record.kategori,
            pengusul_email: record.pengusul_email,
            image: config.image_url(&record.image),
            created: record.created,
            modified: record.modified,
        }
    }
}

pub async fn list(
    service: UsulanService,
    State(state): State<AppState>,
    Garde(Query(paging)): Garde<Query<Paging>>,
) -> ApiResult<impl IntoResponse> {
    let default_page_size = state.config().default_page_size;
    let page_size = paging.page_size(default_page_size);
    let listing_params = paging.into_listing_params(default_page_size);
    let batch = service.list(listing_params).await?;
    let batch = batch.map(|record| UsulanPayload::from_record(record, state.config()));
    Ok((
        StatusCode::OK,
        Json(Envelope::ok(
            "List Data Usulan Buku",
            Page::from_batch(batch, page_size),
        )),
    ))
}

pub async fn create(
    service: UsulanService,
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let form = SubmissionForm::from_multipart(multipart).await?;
    let record = service.create(form).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(
            "Data Usulan Buku Berhasil Ditambahkan!",
            UsulanPayload::from_record(record, state.config()),
        )),
    ))
}

pub async fn get_one(
    Path(id): Path<i64>,
    service: UsulanService,
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    let record = service.get(id).await?;
    Ok((
        StatusCode::OK,
        Json(Envelope::ok(
            "Detail Data Usulan Buku!",
            UsulanPayload::from_record(record, state.config()),
        )),
    ))
}

pub async fn update(
    Path(id): Path<i64>,
    service: UsulanService,
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let form = SubmissionForm::from_multipart(multipart).await?;
    let record = service.update(id, form).await?;
    Ok((
        StatusCode::OK,
        Json(Envelope::ok(
            "Data Usulan Buku Berhasil Diubah!",
            UsulanPayload::from_record(record, state.config()),
        )),
    ))
}

pub async fn remove(Path(id): Path<i64>, service: UsulanService) -> ApiResult<impl IntoResponse> {
    service.delete(id).await?;
    Ok((
        StatusCode::OK,
        Json(Envelope::ok_empty("Data Usulan Buku Berhasil Dihapus!")),
    ))
}

pub fn router(upload_limit_kb: usize) -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", get(list).post(create))
        .route(
            "/{id}",
            get(get_one).put(update).patch(update).delete(remove),
        )
        // double the image limit so oversized uploads reach validation
        // instead of dying on the body limit
        .layer(DefaultBodyLimit::max(1024 * upload_limit_kb * 2))
}
