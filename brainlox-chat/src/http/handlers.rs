use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;

use super::{ApiError, AppState};
use crate::domain::ChatTurn;

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
    pub sources: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthBody {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

pub async fn chat(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ChatResponse>, ApiError> {
    let snapshot = match state.pipeline.ensure_ready().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::warn!(error = %e, "Chat request while pipeline is not ready");
            return Err(ApiError::Unavailable);
        }
    };

    let (query, history) = parse_chat_request(&body)?;
    tracing::info!(history = history.len(), "Received query");

    let answer = snapshot
        .retriever
        .ask(&query, &history)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, code = e.code(), "Error processing chat request");
            ApiError::Processing(e)
        })?;

    Ok(Json(ChatResponse {
        sources: answer.sources(),
        answer: answer.answer,
    }))
}

pub async fn health(State(state): State<AppState>) -> Response {
    if state.pipeline.is_ready() {
        (
            StatusCode::OK,
            Json(HealthBody {
                status: "operational",
                reason: None,
            }),
        )
            .into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthBody {
                status: "degraded",
                reason: Some("not fully initialized"),
            }),
        )
            .into_response()
    }
}

/// Validates a chat body: a JSON object with a non-blank string `query` and
/// an optional `chat_history` of `[question, answer]` string pairs.
fn parse_chat_request(body: &[u8]) -> Result<(String, Vec<ChatTurn>), ApiError> {
    let Ok(Value::Object(mut fields)) = serde_json::from_slice::<Value>(body) else {
        return Err(ApiError::NoInput);
    };

    let query = match fields.remove("query") {
        Some(Value::String(q)) if !q.trim().is_empty() => q,
        _ => return Err(ApiError::QueryMissing),
    };

    let history = match fields.remove("chat_history") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(turns)) => turns
            .into_iter()
            .map(parse_turn)
            .collect::<Option<Vec<_>>>()
            .ok_or(ApiError::InvalidChatHistory)?,
        Some(_) => return Err(ApiError::InvalidChatHistory),
    };

    Ok((query, history))
}

fn parse_turn(turn: Value) -> Option<ChatTurn> {
    let Value::Array(pair) = turn else {
        return None;
    };
    match <[Value; 2]>::try_from(pair).ok()? {
        [Value::String(question), Value::String(answer)] => {
            Some(ChatTurn::new(question, answer))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(body: &str) -> Result<(String, Vec<ChatTurn>), ApiError> {
        parse_chat_request(body.as_bytes())
    }

    #[test]
    fn test_rejects_missing_or_malformed_body() {
        for body in ["", "not json", "[1, 2]", "\"query\"", "null"] {
            assert!(matches!(parse(body), Err(ApiError::NoInput)), "{body:?}");
        }
    }

    #[test]
    fn test_rejects_missing_query() {
        for body in [
            "{}",
            r#"{"query": ""}"#,
            r#"{"query": "   "}"#,
            r#"{"query": 42}"#,
            r#"{"chat_history": []}"#,
        ] {
            assert!(matches!(parse(body), Err(ApiError::QueryMissing)), "{body:?}");
        }
    }

    #[test]
    fn test_parses_history_pairs() {
        let (query, history) = parse(
            r#"{"query": "And Java?", "chat_history": [["Python?", "Yes."], ["Ages?", "8+"]]}"#,
        )
        .unwrap();

        assert_eq!(query, "And Java?");
        assert_eq!(
            history,
            vec![ChatTurn::new("Python?", "Yes."), ChatTurn::new("Ages?", "8+")]
        );
    }

    #[test]
    fn test_null_history_is_empty() {
        let (_, history) = parse(r#"{"query": "Python?", "chat_history": null}"#).unwrap();
        assert!(history.is_empty());
    }

    #[test]
    fn test_rejects_malformed_history() {
        for history in [
            r#""text""#,
            r#"[["only one"]]"#,
            r#"[["a", 1]]"#,
            r#"[["a", "b", "c"]]"#,
            "[{}]",
        ] {
            let body = format!(r#"{{"query": "q", "chat_history": {history}}}"#);
            assert!(
                matches!(parse(&body), Err(ApiError::InvalidChatHistory)),
                "{history}"
            );
        }
    }
}
