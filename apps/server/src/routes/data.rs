use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, get, web};
use sitewatch_service::StatusStore;
use tracing::error;

use crate::error::ApiError;

macros_utils::routes! {
    route data_route,
}

/// Full status history, oldest first.
///
/// The body is encoded into a buffer before anything is sent, so a failure
/// on either the read or the encode side yields a clean 500.
#[get("/data")]
pub async fn data_route(store: web::Data<dyn StatusStore>) -> Result<HttpResponse, ApiError> {
    let records = store.list_all().await.inspect_err(|e| error!("{}", e))?;

    let body = serde_json::to_vec(&records)
        .inspect_err(|e| error!("Failed to encode JSON response: {}", e))?;

    Ok(HttpResponse::Ok().content_type(ContentType::json()).body(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use deadpool::managed::PoolError;
    use serde_json::{Value, json};
    use sitewatch_service::database::DbError;
    use sitewatch_service::{LibsqlStatusStore, StatusRecord, StoreError};
    use std::sync::Arc;
    use tempfile::{TempDir, tempdir};

    async fn create_test_store() -> Result<(Arc<dyn StatusStore>, TempDir)> {
        let temp_dir = tempdir()?;
        let store = LibsqlStatusStore::initialize(temp_dir.path().join("status.db")).await?;
        Ok((Arc::new(store), temp_dir))
    }

    async fn get_data(store: Arc<dyn StatusStore>) -> (StatusCode, Option<String>, Vec<u8>) {
        let app =
            test::init_service(App::new().app_data(web::Data::from(store)).configure(routes)).await;
        let response =
            test::call_service(&app, test::TestRequest::get().uri("/data").to_request()).await;

        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = test::read_body(response).await.to_vec();
        (status, content_type, body)
    }

    struct BrokenStore;

    #[async_trait]
    impl StatusStore for BrokenStore {
        async fn append(&self, _record: &StatusRecord) -> Result<i64, StoreError> {
            unreachable!("the API never writes")
        }

        async fn list_all(&self) -> Result<Vec<StatusRecord>, StoreError> {
            Err(StoreError::Read(DbError::Pool(PoolError::Closed)))
        }
    }

    #[actix_web::test]
    async fn test_empty_store_returns_empty_array() -> Result<()> {
        let (store, _dir) = create_test_store().await?;

        let (status, content_type, body) = get_data(store).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        assert_eq!(serde_json::from_slice::<Value>(&body)?, json!([]));
        Ok(())
    }

    #[actix_web::test]
    async fn test_history_is_returned_oldest_first() -> Result<()> {
        let (store, _dir) = create_test_store().await?;
        let t1 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 10, 0).unwrap();

        store.append(&StatusRecord::new(t2, false, 0)).await?;
        store.append(&StatusRecord::new(t1, true, 120)).await?;

        let (status, _, body) = get_data(store).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            serde_json::from_slice::<Value>(&body)?,
            json!([
                {"timestamp": "2024-05-01T12:00:00.000Z", "online": true, "latency": 120},
                {"timestamp": "2024-05-01T12:10:00.000Z", "online": false, "latency": 0},
            ])
        );
        Ok(())
    }

    #[actix_web::test]
    async fn test_read_failure_is_plain_text_500() -> Result<()> {
        let (status, content_type, body) = get_data(Arc::new(BrokenStore)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(content_type.unwrap_or_default().starts_with("text/plain"));
        assert!(String::from_utf8(body)?.starts_with("Failed to fetch statuses:"));
        Ok(())
    }
}
