use crate::error::DecodeError;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::HeaderMap;
use std::convert::Infallible;

/// Form field Pyroscope agents put the current pprof profile in. Its siblings
/// (`prev_profile`, `sample_type_config`) are not used.
pub const PROFILE_FIELD: &str = "profile";

/// Boundary of a `multipart/form-data` request, `None` for any other content
/// type.
pub fn form_boundary(headers: &HeaderMap) -> Result<Option<String>, DecodeError> {
    let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return Ok(None);
    };

    let mime = content_type.split(';').next().unwrap_or_default().trim();
    if !mime.eq_ignore_ascii_case("multipart/form-data") {
        return Ok(None);
    }

    multer::parse_boundary(content_type)
        .map(Some)
        .map_err(|e| DecodeError::MalformedProfile(format!("bad multipart content type: {}", e)))
}

/// Pulls the `profile` part out of a multipart form body.
pub async fn profile_part(body: Bytes, boundary: &str) -> Result<Bytes, DecodeError> {
    let stream = futures_util::stream::once(async move { Ok::<Bytes, Infallible>(body) });
    let mut form = multer::Multipart::new(stream, boundary);

    while let Some(field) = form
        .next_field()
        .await
        .map_err(|e| DecodeError::MalformedProfile(format!("bad multipart body: {}", e)))?
    {
        if field.name() != Some(PROFILE_FIELD) {
            continue;
        }

        return field.bytes().await.map_err(|e| {
            DecodeError::MalformedProfile(format!("failed to read {} part: {}", PROFILE_FIELD, e))
        });
    }

    Err(DecodeError::MalformedProfile(format!(
        "multipart body has no {} part",
        PROFILE_FIELD
    )))
}
