use std::collections::HashMap;

use axum::extract::{FromRequest, Query, Request};
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Operation arguments assembled from the query string and the optional
/// JSON body, merged into one flat bag with body keys winning.
///
/// Query values are strings on the wire; bare numbers, booleans and null
/// are coerced so `?limit=5` and `{"limit": 5}` mean the same thing. The
/// rejection carries the standard failure envelope.
pub struct MergedArgs<T>(pub T);

impl<S, T> FromRequest<S> for MergedArgs<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = (StatusCode, Json<Value>);

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let query: Query<HashMap<String, String>> =
            Query::try_from_uri(req.uri()).map_err(|e| bad_request(e.to_string()))?;

        let mut merged = Map::new();
        for (key, value) in query.0 {
            merged.insert(key, coerce_scalar(&value));
        }

        let bytes = axum::body::to_bytes(req.into_body(), BODY_LIMIT)
            .await
            .map_err(|e| bad_request(e.to_string()))?;
        if !bytes.is_empty() {
            let body: Value = serde_json::from_slice(&bytes)
                .map_err(|e| bad_request(format!("Invalid JSON body: {e}")))?;
            match body {
                Value::Object(fields) => merged.extend(fields),
                Value::Null => {}
                _ => {
                    return Err(bad_request(
                        "Request body must be a JSON object".to_string(),
                    ))
                }
            }
        }

        let args = serde_json::from_value(Value::Object(merged))
            .map_err(|e| bad_request(format!("Invalid arguments: {e}")))?;
        Ok(Self(args))
    }
}

/// Coerces a query-string value to its JSON form where that is
/// unambiguous. Quoted strings and anything unparseable stay raw text, so
/// names and UUIDs pass through untouched.
fn coerce_scalar(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(v @ (Value::Number(_) | Value::Bool(_) | Value::Null)) => v,
        _ => Value::String(raw.to_string()),
    }
}

fn bad_request(message: String) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "success": false, "error": message })),
    )
}
