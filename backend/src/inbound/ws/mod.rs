//! WebSocket inbound adapter delivering live listing notifications.
//!
//! Responsibilities:
//! - validate upgrade requests (origin allow-list, bearer credential)
//! - start the per-connection session
//! - keep WebSocket-specific concerns at the edge of the system
//!
//! The credential is read from `Authorization: Bearer <token>` or, for
//! browsers that cannot set headers on upgrade, a `token` query parameter.
//! Rejected handshakes get the usual failure envelope and no upgrade.

use actix_web::http::header::{HeaderValue, ORIGIN};
use actix_web::web::{self, Payload};
use actix_web::{HttpRequest, HttpResponse, get};
use serde::Deserialize;
use tracing::{error, warn};
use url::Url;

use crate::domain::{ApiResult, Error, TraceId};
use crate::inbound::http::auth::{bearer_token, missing_credential};

mod session;

pub mod messages;
pub mod state;

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

fn handshake_token(req: &HttpRequest) -> Option<String> {
    bearer_token(req).or_else(|| {
        web::Query::<TokenQuery>::from_query(req.query_string())
            .ok()
            .and_then(|query| query.into_inner().token)
            .filter(|token| !token.trim().is_empty())
    })
}

/// Handle WebSocket upgrade for the `/ws` endpoint.
#[get("/ws")]
pub async fn ws_entry(
    state: web::Data<state::WsState>,
    req: HttpRequest,
    stream: Payload,
) -> ApiResult<HttpResponse> {
    let mut origins = req.headers().get_all(ORIGIN);
    if let Some(origin) = origins.next() {
        if origins.next().is_some() {
            error!("Multiple Origin headers on WebSocket upgrade");
            return Err(Error::invalid_request("Invalid Origin header"));
        }
        validate_origin(&state.origins, origin)?;
    }

    let token = handshake_token(&req).ok_or_else(missing_credential)?;
    let user = state.accounts.authenticate(&token).await?;

    let (response, session, messages) = actix_ws::handle(&req, stream).map_err(|error| {
        error!(error = %error, "WebSocket upgrade failed");
        Error::invalid_request("WebSocket upgrade failed")
    })?;

    let trace_id = TraceId::current_or_generate();
    actix_web::rt::spawn(TraceId::scope(
        trace_id,
        session::handle_ws_session(state.channels.clone(), user.id, session, messages),
    ));

    Ok(response)
}

fn validate_origin(allowed: &state::OriginAllowList, origin_header: &HeaderValue) -> ApiResult<()> {
    let origin_value = origin_header.to_str().map_err(|error| {
        error!(error = %error, "Failed to parse Origin header as string");
        Error::invalid_request("Invalid Origin header")
    })?;

    let origin = Url::parse(origin_value).map_err(|error| {
        error!(error = %error, "Failed to parse Origin header as URL");
        Error::invalid_request("Invalid Origin header")
    })?;

    if allowed.allows(&origin) {
        Ok(())
    } else {
        warn!(
            origin = origin_value,
            "Rejected WS upgrade due to disallowed Origin"
        );
        Err(Error::forbidden("Origin not allowed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use actix_web::test::TestRequest;
    use rstest::rstest;

    fn allow_list() -> state::OriginAllowList {
        state::OriginAllowList::new(["http://localhost:5173"])
    }

    #[rstest]
    #[case("http://localhost:5173", None)]
    #[case("https://example.com", Some(ErrorCode::Forbidden))]
    #[case("not a url", Some(ErrorCode::InvalidRequest))]
    fn origin_validation(#[case] origin: &str, #[case] expected: Option<ErrorCode>) {
        let header = HeaderValue::from_str(origin).expect("valid header value");
        let result = validate_origin(&allow_list(), &header);
        assert_eq!(result.err().map(|error| error.code()), expected);
    }

    #[test]
    fn rejects_non_utf8_origin_header() {
        let header = HeaderValue::from_bytes(&[0x80]).expect("opaque header value");
        let error = validate_origin(&allow_list(), &header).expect_err("origin rejected");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[case(TestRequest::default().insert_header(("Authorization", "Bearer header-token")), Some("header-token"))]
    #[case(TestRequest::with_uri("/ws?token=query-token"), Some("query-token"))]
    #[case(TestRequest::with_uri("/ws?token="), None)]
    #[case(TestRequest::with_uri("/ws"), None)]
    fn token_comes_from_header_or_query(#[case] request: TestRequest, #[case] expected: Option<&str>) {
        let req = request.to_http_request();
        assert_eq!(handshake_token(&req).as_deref(), expected);
    }
}
