// Copyright 2019 Dmitry Tantsur <dtantsur@protonmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error and result implementations.

use std::fmt;

use reqwest::StatusCode;

/// Kind of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Authentication failure
    ///
    /// Maps to HTTP 401.
    AuthenticationFailed,

    /// Access denied.
    ///
    /// Maps to HTTP 403.
    AccessDenied,

    /// Requested resource was not found.
    ///
    /// Roughly maps to HTTP 404 and 410.
    ResourceNotFound,

    /// Requested service endpoint was not found.
    EndpointNotFound,

    /// Invalid value passed to one of paremeters.
    ///
    /// May be result of HTTP 400. Also returned when a required option is missing, in which
    /// case no request is sent at all.
    InvalidInput,

    /// Unsupported or incompatible API version.
    ///
    /// May be a result of HTTP 406.
    IncompatibleApiVersion,

    /// Conflict in the request.
    ///
    /// Maps to HTTP 409.
    Conflict,

    /// Operation has reached the specified time out.
    OperationTimedOut,

    /// Protocol-level error reported by underlying HTTP library.
    ProtocolError,

    /// Response received from the server is malformed.
    InvalidResponse,

    /// Internal server error.
    ///
    /// Maps to HTTP 5xx codes.
    InternalServerError,

    /// Invalid clouds.yaml file.
    InvalidConfig,

    /// The server returned a status code that is not an error, but is not expected either.
    UnexpectedStatus,
}

/// Error from an OpenStack call.
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    status: Option<StatusCode>,
    body: Option<String>,
}

impl ErrorKind {
    /// Short description of the error kind.
    pub fn description(self) -> &'static str {
        match self {
            ErrorKind::AuthenticationFailed => "Failed to authenticate",
            ErrorKind::AccessDenied => "Access to the resource is denied",
            ErrorKind::ResourceNotFound => "Requested resource was not found",
            ErrorKind::EndpointNotFound => "Requested endpoint was not found",
            ErrorKind::InvalidInput => "Input value(s) are invalid or missing",
            ErrorKind::IncompatibleApiVersion => "Incompatible or unsupported API version",
            ErrorKind::Conflict => "Requested cannot be fulfilled due to a conflict",
            ErrorKind::OperationTimedOut => "Time out reached while waiting for the operation",
            ErrorKind::ProtocolError => "Error when accessing the server",
            ErrorKind::InvalidResponse => "Received invalid response",
            ErrorKind::InternalServerError => "Internal server error or bad gateway",
            ErrorKind::InvalidConfig => "configuration file cannot be found or is invalid",
            ErrorKind::UnexpectedStatus => "Unexpected HTTP status code",
        }
    }
}

impl Error {
    /// Create a new error of the provided kind.
    #[inline]
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Error {
        Error {
            kind,
            message: Some(message.into()),
            status: None,
            body: None,
        }
    }

    /// Add an HTTP status code to the error.
    #[inline]
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    /// Add an HTTP status code to the error.
    #[inline]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.set_status(status);
        self
    }

    /// Attach the raw response body to the error.
    #[inline]
    pub fn with_body<S: Into<String>>(mut self, body: S) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Error kind.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Error message, if any.
    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// HTTP status code if known.
    #[inline]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Raw body of the failed response if known.
    #[inline]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if let Some(ref msg) = self.message {
            write!(f, ": {}", msg)?;
        }

        Ok(())
    }
}

impl ::std::error::Error for Error {}

impl From<ErrorKind> for Error {
    fn from(value: ErrorKind) -> Error {
        Error {
            kind: value,
            message: None,
            status: None,
            body: None,
        }
    }
}

impl From<StatusCode> for ErrorKind {
    fn from(value: StatusCode) -> ErrorKind {
        match value {
            StatusCode::UNAUTHORIZED => ErrorKind::AuthenticationFailed,
            StatusCode::FORBIDDEN => ErrorKind::AccessDenied,
            StatusCode::NOT_FOUND | StatusCode::GONE => ErrorKind::ResourceNotFound,
            StatusCode::NOT_ACCEPTABLE => ErrorKind::IncompatibleApiVersion,
            StatusCode::CONFLICT => ErrorKind::Conflict,
            c if c.is_client_error() => ErrorKind::InvalidInput,
            c if c.is_server_error() => ErrorKind::InternalServerError,
            _ => ErrorKind::UnexpectedStatus,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Error {
        let msg = value.to_string();
        let kind = if value.is_decode() {
            ErrorKind::InvalidResponse
        } else if value.is_timeout() {
            ErrorKind::OperationTimedOut
        } else if value.is_builder() {
            ErrorKind::InvalidInput
        } else {
            value
                .status()
                .map(From::from)
                .unwrap_or(ErrorKind::ProtocolError)
        };

        let error = Error::new(kind, msg);
        if let Some(status) = value.status() {
            error.with_status(status)
        } else {
            error
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Error {
        Error::new(
            ErrorKind::InvalidResponse,
            format!("Failed to decode the response: {}", value),
        )
    }
}

impl From<serde_urlencoded::ser::Error> for Error {
    fn from(value: serde_urlencoded::ser::Error) -> Error {
        Error::new(
            ErrorKind::InvalidInput,
            format!("Cannot build a query string: {}", value),
        )
    }
}

impl From<url::ParseError> for Error {
    fn from(value: url::ParseError) -> Error {
        Error::new(ErrorKind::InvalidInput, value.to_string())
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(value: http::header::InvalidHeaderValue) -> Error {
        Error::new(
            ErrorKind::InvalidInput,
            format!("Invalid header value: {}", value),
        )
    }
}

impl From<http::header::InvalidHeaderName> for Error {
    fn from(value: http::header::InvalidHeaderName) -> Error {
        Error::new(
            ErrorKind::InvalidInput,
            format!("Invalid header name: {}", value),
        )
    }
}

#[cfg(test)]
pub mod test {
    use reqwest::StatusCode;

    use super::{Error, ErrorKind};

    #[test]
    fn test_error_display() {
        let error = Error::new(ErrorKind::InvalidConfig, "boom");
        assert_eq!(
            error.to_string(),
            "configuration file cannot be found or is invalid: boom"
        );
        let error: Error = ErrorKind::ResourceNotFound.into();
        assert_eq!(error.to_string(), "Requested resource was not found");
    }

    #[test]
    fn test_error_kind_from_status() {
        for (status, kind) in [
            (StatusCode::UNAUTHORIZED, ErrorKind::AuthenticationFailed),
            (StatusCode::FORBIDDEN, ErrorKind::AccessDenied),
            (StatusCode::NOT_FOUND, ErrorKind::ResourceNotFound),
            (StatusCode::NOT_ACCEPTABLE, ErrorKind::IncompatibleApiVersion),
            (StatusCode::CONFLICT, ErrorKind::Conflict),
            (StatusCode::BAD_REQUEST, ErrorKind::InvalidInput),
            (StatusCode::BAD_GATEWAY, ErrorKind::InternalServerError),
            (StatusCode::ACCEPTED, ErrorKind::UnexpectedStatus),
        ] {
            assert_eq!(ErrorKind::from(status), kind);
        }
    }

    #[test]
    fn test_error_status_and_body() {
        let error = Error::new(ErrorKind::Conflict, "in use")
            .with_status(StatusCode::CONFLICT)
            .with_body("{}");
        assert_eq!(error.status(), Some(StatusCode::CONFLICT));
        assert_eq!(error.body(), Some("{}"));
        assert_eq!(error.message(), Some("in use"));
    }
}
