// Response handling shared by the reqwest-backed clients

use crate::error::ApiError;
use serde::de::DeserializeOwned;
use serde::Deserialize;

// Error body the backend attaches to non-2xx answers
#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: i32,
    #[serde(default)]
    message: String,
}

// Decodes a 2xx body as `T`. Non-2xx answers with a `{code, message}` body are
// business rejections; anything else is a transport-level failure.
pub(crate) async fn decode_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        return serde_json::from_str(&body).map_err(ApiError::from);
    }

    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(err) => Err(ApiError::Rejected {
            status_code: status.as_u16(),
            code: err.code,
            message: err.message,
        }),
        Err(_) => Err(ApiError::HttpStatus {
            status_code: status.as_u16(),
            message: status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string(),
        }),
    }
}
