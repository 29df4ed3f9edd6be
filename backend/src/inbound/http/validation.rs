//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every request validation failure becomes `invalid_request` with
//! `details: {field, code}` (plus `value` for unparsable identifiers).

use actix_web::web;
use serde_json::json;

use crate::domain::{
    BusinessId, BusinessValidationError, Error, LoginValidationError, ReviewId,
    SignupValidationError, UserValidationError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidPlan,
    InvalidEmail,
    TooShort,
    TooLong,
    MalformedBody,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidPlan => "invalid_plan",
            ErrorCode::InvalidEmail => "invalid_email",
            ErrorCode::TooShort => "too_short",
            ErrorCode::TooLong => "too_long",
            ErrorCode::MalformedBody => "malformed_body",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: &str, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    field_error(
        field,
        ErrorCode::MissingField,
        format!("missing required field: {field}"),
    )
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
        "field": field,
        "value": value,
        "code": ErrorCode::InvalidUuid.as_str(),
    }))
}

/// Require a body field to be present.
pub(crate) fn require(value: Option<String>, field: FieldName) -> Result<String, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

pub(crate) fn parse_business_id(raw: &str) -> Result<BusinessId, Error> {
    BusinessId::new(raw).map_err(|_| invalid_uuid_error(FieldName::new("businessId"), raw))
}

pub(crate) fn parse_review_id(raw: &str) -> Result<ReviewId, Error> {
    ReviewId::new(raw).map_err(|_| invalid_uuid_error(FieldName::new("reviewId"), raw))
}

pub(crate) fn plan_error() -> Error {
    field_error(
        "plan",
        ErrorCode::InvalidPlan,
        "Invalid plan. Choose Standard, Gold, or Platinum",
    )
}

pub(crate) fn map_business_validation_error(err: BusinessValidationError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": err.field(),
        "code": err.code(),
    }))
}

pub(crate) fn map_user_validation_error(err: UserValidationError) -> Error {
    let (field, code) = match err {
        UserValidationError::InvalidId => ("userId", ErrorCode::InvalidUuid),
        UserValidationError::EmptyName => ("name", ErrorCode::MissingField),
        UserValidationError::NameTooLong { .. } => ("name", ErrorCode::TooLong),
        UserValidationError::EmptyEmail => ("email", ErrorCode::MissingField),
        UserValidationError::InvalidEmail => ("email", ErrorCode::InvalidEmail),
    };
    field_error(field, code, err.to_string())
}

pub(crate) fn map_signup_validation_error(err: SignupValidationError) -> Error {
    match err {
        SignupValidationError::User(inner) => map_user_validation_error(inner),
        SignupValidationError::PasswordTooShort { .. } => {
            field_error("password", ErrorCode::TooShort, err.to_string())
        }
        SignupValidationError::Plan(_) => plan_error(),
    }
}

pub(crate) fn map_login_validation_error(err: LoginValidationError) -> Error {
    let field = match err {
        LoginValidationError::EmptyEmail => "email",
        LoginValidationError::EmptyPassword => "password",
    };
    field_error(field, ErrorCode::MissingField, err.to_string())
}

/// JSON extractor config rendering body errors as envelopes.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        field_error("body", ErrorCode::MalformedBody, format!("invalid JSON body: {err}")).into()
    })
}

/// Query extractor config rendering query-string errors as envelopes.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        field_error("query", ErrorCode::MalformedBody, format!("invalid query string: {err}"))
            .into()
    })
}
