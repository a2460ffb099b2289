use crate::error::GatewayError;
use crate::services::tool_catalog::ToolCatalog;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde_json::{json, Map, Value};

/// Aggregated tool catalog across every tool provider
///
/// # Route
///
/// `GET /tools`
///
/// Always 200. Providers that could not be listed appear as
/// `{"error": ..., "kind": ...}` entries next to the successful ones.
pub async fn list_tools(State(state): State<AppState>) -> Json<ToolCatalog> {
    Json(state.gateway.list_all_tools().await)
}

/// Runs one tool on one provider
///
/// # Route
///
/// `POST /tools/{service}/{tool}`
///
/// The request body is the tool's `arguments` object. An empty body means no
/// arguments.
///
/// # Returns
///
/// * `200` - `{"service", "tool", "result"}`
/// * `400` - body is not a JSON object, or the service is not a tool provider
/// * `404` - unknown service
/// * `501` - provider only speaks stdio
/// * `502` / `504` - the provider failed or did not answer in time
pub async fn execute_tool(
    Path((service, tool)): Path<(String, String)>,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, GatewayError> {
    let arguments = parse_arguments(&body)?;
    let result = state.gateway.execute_tool(&service, &tool, arguments).await?;

    Ok(Json(json!({
        "service": service,
        "tool": tool,
        "result": result,
    })))
}

fn parse_arguments(body: &[u8]) -> Result<Value, GatewayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => Err(GatewayError::BadRequest(
            "tool arguments must be a JSON object".to_string(),
        )),
        Err(e) => Err(GatewayError::BadRequest(format!(
            "tool arguments are not valid JSON: {}",
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_means_no_arguments() {
        assert_eq!(parse_arguments(b"").unwrap(), json!({}));
        assert_eq!(parse_arguments(b"  \n").unwrap(), json!({}));
    }

    #[test]
    fn test_object_body_is_passed_through() {
        let args = parse_arguments(br#"{"query": "rust", "limit": 3}"#).unwrap();
        assert_eq!(args["limit"], 3);
    }

    #[test]
    fn test_non_object_body_is_rejected() {
        assert!(matches!(
            parse_arguments(b"[1, 2]"),
            Err(GatewayError::BadRequest(_))
        ));
        assert!(matches!(
            parse_arguments(b"{not json"),
            Err(GatewayError::BadRequest(_))
        ));
    }
}
