//! Image API handlers

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use super::ApiSettings;
use crate::error::{GalleryError, Result};
use crate::gallery::Gallery;
use crate::query::{ListParams, SortKey, SortOrder};
use crate::store::{ImagePage, ImageRecord};

/// Query string of the list endpoint
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub query: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<SortKey>,
    pub sort_order: Option<SortOrder>,
}

impl ListQuery {
    fn into_params(self, default_limit: u32) -> ListParams {
        ListParams {
            query: self.query,
            page: self.page.unwrap_or(1),
            limit: self.limit.unwrap_or(default_limit),
            sort_by: self.sort_by.unwrap_or_default(),
            sort_order: self.sort_order.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RatingUpdate {
    pub rating: Option<i64>,
}

/// Register the image API and its extractor error handling
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| GalleryError::InvalidRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| GalleryError::InvalidRequest(err.to_string()).into()),
    )
    .service(sync_images)
    .service(list_images)
    .service(get_image)
    .service(rate_image)
    .service(delete_image);
}

/// Storage is blocking; keep it off the async workers
async fn blocking<T, F>(gallery: web::Data<Gallery>, f: F) -> Result<T>
where
    F: FnOnce(&Gallery) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || f(gallery.get_ref()))
        .await
        .map_err(|e| GalleryError::Task(e.to_string()))?
}

#[post("/api/images/sync")]
pub async fn sync_images(gallery: web::Data<Gallery>) -> Result<HttpResponse> {
    let report = blocking(gallery, |g| g.sync()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Synced {} new images.", report.synced),
        "synced_count": report.synced,
    })))
}

#[get("/api/images")]
pub async fn list_images(
    gallery: web::Data<Gallery>,
    settings: web::Data<ApiSettings>,
    query: web::Query<ListQuery>,
) -> Result<web::Json<ImagePage>> {
    let params = query.into_inner().into_params(settings.default_page_size);
    let page = blocking(gallery, move |g| g.list(params)).await?;
    Ok(web::Json(page))
}

#[get("/api/images/{id}")]
pub async fn get_image(
    gallery: web::Data<Gallery>,
    id: web::Path<i64>,
) -> Result<web::Json<ImageRecord>> {
    let id = id.into_inner();
    let record = blocking(gallery, move |g| g.get(id)).await?;
    Ok(web::Json(record))
}

#[put("/api/images/{id}/rate")]
pub async fn rate_image(
    gallery: web::Data<Gallery>,
    id: web::Path<i64>,
    body: web::Json<RatingUpdate>,
) -> Result<HttpResponse> {
    let id = id.into_inner();
    let rating = body.into_inner().rating;
    blocking(gallery, move |g| g.rate(id, rating)).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Image {} rating updated successfully.", id),
    })))
}

#[delete("/api/images/{id}")]
pub async fn delete_image(gallery: web::Data<Gallery>, id: web::Path<i64>) -> Result<HttpResponse> {
    let id = id.into_inner();
    blocking(gallery, move |g| g.delete(id)).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Image {} deleted successfully.", id),
    })))
}
