//! Response envelope shared by every `/api` route

use axum::{http::StatusCode, Json};
use library_shared::PageMeta;
use serde::Serialize;

/// `{ success, message, data }`, plus `meta` on paged lists.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

pub type Reply<T> = (StatusCode, Json<ApiResponse<T>>);

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            meta: None,
        }
    }

    pub fn paged(message: impl Into<String>, data: T, meta: PageMeta) -> Self {
        Self {
            meta: Some(meta),
            ..Self::success(message, data)
        }
    }

    pub fn failure(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data,
            meta: None,
        }
    }

    pub fn ok(message: impl Into<String>, data: T) -> Reply<T> {
        (StatusCode::OK, Json(Self::success(message, data)))
    }

    pub fn created(message: impl Into<String>, data: T) -> Reply<T> {
        (StatusCode::CREATED, Json(Self::success(message, data)))
    }
}

impl ApiResponse<()> {
    /// Success without a payload (`data: null`).
    pub fn done(message: impl Into<String>) -> Reply<()> {
        (
            StatusCode::OK,
            Json(Self { success: true, message: message.into(), data: None, meta: None }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::success("Fetched", vec![1, 2])).unwrap();
        assert_eq!(body, json!({ "success": true, "message": "Fetched", "data": [1, 2] }));
    }

    #[test]
    fn test_failure_has_null_data() {
        let body = serde_json::to_value(ApiResponse::<()>::failure("Nope", None)).unwrap();
        assert_eq!(body, json!({ "success": false, "message": "Nope", "data": null }));
    }

    #[test]
    fn test_paged_carries_meta() {
        let meta = PageMeta { total: 3, page: 1, limit: 2 };
        let body = serde_json::to_value(ApiResponse::paged("Fetched", Vec::<u8>::new(), meta)).unwrap();
        assert_eq!(body["meta"], json!({ "total": 3, "page": 1, "limit": 2 }));
    }
}
