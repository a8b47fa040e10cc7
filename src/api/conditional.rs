use axum::{
    extract::Request,
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};

/// Response marker carrying the returned entity's last-modified instant.
/// Single-entity success responses insert it; [`last_modified_layer`] reads
/// it back out to stamp headers.
#[derive(Debug, Clone, Copy)]
pub struct LastModified(pub DateTime<Utc>);

/// Body-less response signaling 304 Not Modified. Carries no per-request
/// data, so a single shared value serves every response.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotModified;

pub const NOT_MODIFIED: NotModified = NotModified;

impl IntoResponse for NotModified {
    fn into_response(self) -> Response {
        StatusCode::NOT_MODIFIED.into_response()
    }
}

/// Formats a timestamp as an RFC 1123 HTTP date, e.g.
/// `Tue, 15 Nov 1994 08:12:31 GMT`.
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Parses an HTTP date (or an RFC 3339 timestamp). Malformed values are
/// treated as absent.
fn parse_http_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|at| at.with_timezone(&Utc))
        .ok()
}

/// Conditional-request layer wrapped around every resource route.
///
/// The wrapped operation always runs first; a mutation whose response gets
/// downgraded to 304 has still taken effect. Afterwards, any 2xx response
/// carrying a [`LastModified`] marker is stamped with a `Last-Modified`
/// header, and when the request's `If-Modified-Since` is at least as new as
/// the entity (HTTP dates carry second precision, so the comparison
/// truncates to seconds) the body is replaced with [`NotModified`].
pub async fn last_modified_layer(request: Request, next: Next) -> Response {
    let if_modified_since = request
        .headers()
        .get(header::IF_MODIFIED_SINCE)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_http_date);

    let mut response = next.run(request).await;

    if !response.status().is_success() {
        return response;
    }
    let Some(LastModified(updated_at)) = response.extensions().get::<LastModified>().copied()
    else {
        return response;
    };

    let Ok(stamp) = HeaderValue::from_str(&http_date(updated_at)) else {
        return response;
    };
    response.headers_mut().insert(header::LAST_MODIFIED, stamp.clone());

    if let Some(since) = if_modified_since {
        if since.timestamp() >= updated_at.timestamp() {
            let mut not_modified = NOT_MODIFIED.into_response();
            not_modified.headers_mut().insert(header::LAST_MODIFIED, stamp);
            return not_modified;
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_rfc_1123_dates() {
        let at = Utc.with_ymd_and_hms(1994, 11, 15, 8, 12, 31).unwrap();
        assert_eq!(http_date(at), "Tue, 15 Nov 1994 08:12:31 GMT");
    }

    #[test]
    fn parses_its_own_output() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 23, 59, 59).unwrap();
        assert_eq!(parse_http_date(&http_date(at)), Some(at));
    }

    #[test]
    fn parses_rfc_3339_fallback() {
        let parsed = parse_http_date("2024-05-01T12:00:00Z");
        assert_eq!(parsed, Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_http_date("not a date"), None);
        assert_eq!(parse_http_date(""), None);
    }
}
