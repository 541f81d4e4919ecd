use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;

use reservo_core::AppError;

/// `Json<T>` whose rejections answer with the usual `{"error": ...}` body.
///
/// Field constraints are not checked here; services run them so every entry
/// point (HTTP, CLI) applies the same rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

fn rejection_error(rejection: JsonRejection) -> AppError {
    let error_msg = rejection.body_text();

    if error_msg.contains("missing field") {
        let field = error_msg
            .split("missing field `")
            .nth(1)
            .and_then(|s| s.split('`').next())
            .unwrap_or("unknown");
        return AppError::validation(anyhow!("{} is required", field));
    }

    if error_msg.contains("invalid type") {
        return AppError::validation(anyhow!("Invalid field type in request"));
    }

    if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
        return AppError::validation(anyhow!("Missing 'Content-Type: application/json' header"));
    }

    AppError::validation(anyhow!("Invalid request body"))
}

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_error)?;
        Ok(JsonBody(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode, header};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[allow(dead_code)]
        name: String,
    }

    async fn extract(content_type: Option<&str>, body: &str) -> Result<Payload, AppError> {
        let mut builder = HttpRequest::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        JsonBody::<Payload>::from_request(request, &())
            .await
            .map(|JsonBody(payload)| payload)
    }

    #[tokio::test]
    async fn test_missing_field_names_the_field() {
        let err = extract(Some("application/json"), "{}").await.unwrap_err();
        assert_eq!(err.message(), "name is required");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_wrong_type() {
        let err = extract(Some("application/json"), r#"{"name": 4}"#)
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Invalid field type in request");
    }

    #[tokio::test]
    async fn test_missing_content_type() {
        let err = extract(None, r#"{"name": "x"}"#).await.unwrap_err();
        assert_eq!(
            err.message(),
            "Missing 'Content-Type: application/json' header"
        );
    }

    #[tokio::test]
    async fn test_valid_body() {
        assert!(extract(Some("application/json"), r#"{"name": "x"}"#).await.is_ok());
    }
}
