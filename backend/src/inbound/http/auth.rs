//! Bearer-token extractors.
//!
//! Handlers take [`AuthenticatedUser`] when a credential is mandatory and
//! [`MaybeAuthenticated`] when it only refines the response. Both resolve the
//! token through the `AccountQuery` port. A mandatory credential that is
//! expired, forged, or names a deleted user is rejected with a distinct
//! `details.reason`; an optional one is set aside and the request proceeds
//! anonymously.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use serde_json::json;

use crate::domain::{Error, ErrorCode, User};

use super::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the token from an `Authorization: Bearer` header.
pub(crate) fn bearer_token(req: &HttpRequest) -> Option<String> {
    let header = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix(BEARER_PREFIX)?.trim();
    (!token.is_empty()).then(|| token.to_owned())
}

pub(crate) fn missing_credential() -> Error {
    Error::unauthorized("Authentication required").with_details(json!({"reason": "missing_token"}))
}

fn http_state(req: &HttpRequest) -> Result<web::Data<HttpState>, Error> {
    req.app_data::<web::Data<HttpState>>()
        .cloned()
        .ok_or_else(|| Error::internal("HTTP state is not configured"))
}

/// The caller, resolved from a valid bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let state = http_state(req);
        Box::pin(async move {
            let state = state?;
            let token = token.ok_or_else(missing_credential)?;
            let user = state.account_query.authenticate(&token).await?;
            Ok(Self(user))
        })
    }
}

/// The caller if a valid bearer token was supplied.
///
/// A token that fails verification does not reject the request. The
/// rejection is kept so handlers that later need a caller can report why.
#[derive(Debug, Clone, Default)]
pub struct MaybeAuthenticated {
    caller: Option<User>,
    rejection: Option<Error>,
}

impl MaybeAuthenticated {
    /// The verified caller, or the reason none is available.
    ///
    /// # Errors
    ///
    /// Returns the token rejection when one was supplied and failed, and a
    /// `missing_token` error when none was supplied.
    pub fn require(self) -> Result<User, Error> {
        match (self.caller, self.rejection) {
            (Some(user), _) => Ok(user),
            (None, Some(rejection)) => Err(rejection),
            (None, None) => Err(missing_credential()),
        }
    }
}

impl FromRequest for MaybeAuthenticated {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let state = http_state(req);
        Box::pin(async move {
            let Some(token) = token else {
                return Ok(Self::default());
            };
            match state?.account_query.authenticate(&token).await {
                Ok(user) => Ok(Self {
                    caller: Some(user),
                    rejection: None,
                }),
                Err(err) if err.code() == ErrorCode::Unauthorized => Ok(Self {
                    caller: None,
                    rejection: Some(err),
                }),
                Err(err) => Err(err.into()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use rstest::rstest;

    #[rstest]
    #[case(Some("Bearer abc.def"), Some("abc.def"))]
    #[case(Some("Bearer   "), None)]
    #[case(Some("Basic abc"), None)]
    #[case(None, None)]
    fn bearer_header_parsing(#[case] header: Option<&str>, #[case] expected: Option<&str>) {
        let mut req = TestRequest::default();
        if let Some(value) = header {
            req = req.insert_header((AUTHORIZATION, value));
        }
        assert_eq!(bearer_token(&req.to_http_request()).as_deref(), expected);
    }
}
