use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use http::StatusCode;
use pyroingest::{DecodeError, ProfileDecoder, Record};
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

/// HTTP front of the decoder. Records are written to stdout as JSON lines.
#[derive(Debug)]
pub struct IngestService {
    decoder: ProfileDecoder,
    tags: HashMap<String, String>,
    max_body_bytes: usize,
}

impl IngestService {
    pub fn new(
        decoder: ProfileDecoder,
        tags: HashMap<String, String>,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            decoder,
            tags,
            max_body_bytes,
        }
    }

    pub fn router(self: Arc<Self>) -> Router {
        Router::new()
            .route("/healthcheck", get(|| async { "OK" }))
            .route("/ingest", post(ingest_handler))
            .with_state(self)
    }
}

pub fn status_for(e: &DecodeError) -> StatusCode {
    match e {
        DecodeError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        DecodeError::MalformedTrie(_)
        | DecodeError::MalformedProfile(_)
        | DecodeError::InvalidMetadata(_) => StatusCode::BAD_REQUEST,
    }
}

fn make_error_response(status: StatusCode, message: String) -> Response {
    (status, message).into_response()
}

fn write_records(records: &[Record]) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    for record in records {
        serde_json::to_writer(&mut out, record)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

async fn ingest_handler(State(state): State<Arc<IngestService>>, req: Request) -> Response {
    let (parts, body) = req.into_parts();

    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(body) => body,
        Err(e) => {
            log::warn!("failed to read ingest body for {}: {}", parts.uri, e);
            return make_error_response(
                StatusCode::PAYLOAD_TOO_LARGE,
                format!(
                    "failed to read body (limit {} bytes): {}",
                    state.max_body_bytes, e
                ),
            );
        }
    };

    let records = match state.decoder.decode(&body, &parts, &state.tags).await {
        Ok(records) => records,
        Err(e) => {
            log::warn!("rejected ingest request {}: {}", parts.uri, e);
            return make_error_response(status_for(&e), e.to_string());
        }
    };

    if let Err(e) = write_records(&records) {
        log::error!("failed to emit {} records: {}", records.len(), e);
        return make_error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
    }

    StatusCode::OK.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_for() {
        assert_eq!(
            status_for(&DecodeError::UnsupportedFormat("jfr".to_string())),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            status_for(&DecodeError::MalformedTrie("eof".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&DecodeError::InvalidMetadata("name".to_string())),
            StatusCode::BAD_REQUEST
        );
    }
}
