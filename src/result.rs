// Copyright 2021 Dmitry Tantsur <dtantsur@protonmail.com>
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

//! Results of API calls and extraction of typed values from them.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use http::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{Error, ErrorKind};

/// A fully read HTTP response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    url: Url,
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl RawResponse {
    pub(crate) fn new(url: Url, status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        RawResponse {
            url,
            status,
            headers,
            body,
        }
    }

    /// URL that produced this response.
    #[inline]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// HTTP status.
    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw response body.
    #[inline]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Consume the response and return the body.
    #[inline]
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Media type of the body without parameters.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::trim)
    }

    /// Decode the JSON body, optionally unwrapping an envelope key.
    pub fn json<T: DeserializeOwned>(&self, envelope: Option<&str>) -> Result<T, Error> {
        let value: Value = serde_json::from_slice(&self.body)?;
        let value = match envelope {
            Some(key) => match value {
                Value::Object(mut map) => map.remove(key).ok_or_else(|| {
                    Error::new(
                        ErrorKind::InvalidResponse,
                        format!("Response body has no {} key", key),
                    )
                })?,
                other => {
                    return Err(Error::new(
                        ErrorKind::InvalidResponse,
                        format!("Expected a JSON object with a {} key, got {}", key, other),
                    ))
                }
            },
            None => value,
        };
        serde_json::from_value(value).map_err(Error::from)
    }
}

/// Types that can be built from response headers.
pub trait FromHeaders: Sized {
    /// Build the value from the header map.
    fn from_headers(headers: &HeaderMap) -> Result<Self, Error>;
}

impl FromHeaders for HeaderMap {
    fn from_headers(headers: &HeaderMap) -> Result<Self, Error> {
        Ok(headers.clone())
    }
}

impl FromHeaders for () {
    fn from_headers(_headers: &HeaderMap) -> Result<Self, Error> {
        Ok(())
    }
}

/// Outcome of a single API call.
///
/// Holds either the response or the error. The value is decoded only when one of the
/// `extract` calls is made.
#[must_use = "the result must be extracted to learn about errors"]
pub struct ApiResult<T> {
    inner: Result<RawResponse, Error>,
    envelope: Option<&'static str>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for ApiResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ApiResult")
            .field("inner", &self.inner)
            .field("envelope", &self.envelope)
            .finish()
    }
}

impl<T> From<Result<RawResponse, Error>> for ApiResult<T> {
    fn from(value: Result<RawResponse, Error>) -> ApiResult<T> {
        ApiResult::new(value)
    }
}

impl<T> ApiResult<T> {
    /// Wrap a response or an error.
    pub fn new(inner: Result<RawResponse, Error>) -> ApiResult<T> {
        ApiResult {
            inner,
            envelope: None,
            _marker: PhantomData,
        }
    }

    /// Set the key that wraps the resource in the response body.
    pub fn with_envelope(mut self, envelope: &'static str) -> ApiResult<T> {
        self.envelope = Some(envelope);
        self
    }

    /// HTTP status if the request succeeded.
    pub fn status(&self) -> Option<StatusCode> {
        self.inner.as_ref().ok().map(RawResponse::status)
    }

    /// Response headers if the request succeeded.
    pub fn headers(&self) -> Option<&HeaderMap> {
        self.inner.as_ref().ok().map(RawResponse::headers)
    }

    /// Return only the error, if any.
    pub fn extract_err(self) -> Result<(), Error> {
        self.inner.map(|_| ())
    }

    /// Return the response headers.
    pub fn extract_headers(self) -> Result<HeaderMap, Error> {
        self.inner.map(|resp| resp.headers)
    }

    /// Collect metadata headers with the given prefix.
    pub fn extract_metadata(self, prefix: &str) -> Result<HashMap<String, String>, Error> {
        self.inner.map(|resp| extract_metadata(&resp.headers, prefix))
    }

    /// Decode the body into an arbitrary type.
    ///
    /// The envelope, if any, is still unwrapped. Use this call to decode a resource together
    /// with extension fields.
    pub fn extract_into<U: DeserializeOwned>(self) -> Result<U, Error> {
        let resp = self.inner?;
        resp.json(self.envelope)
    }

    /// Return the response as is.
    pub fn into_response(self) -> Result<RawResponse, Error> {
        self.inner
    }
}

impl<T: DeserializeOwned> ApiResult<T> {
    /// Decode the body into the resource.
    pub fn extract(self) -> Result<T, Error> {
        self.extract_into()
    }
}

impl<T: FromHeaders> ApiResult<T> {
    /// Decode the resource from the response headers.
    pub fn extract_from_headers(self) -> Result<T, Error> {
        let resp = self.inner?;
        T::from_headers(&resp.headers)
    }
}

/// Capitalize every dash-separated word: `foo-bar` becomes `Foo-Bar`.
pub(crate) fn canonical_header_key(key: &str) -> String {
    key.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Collect `(name, value)` pairs with names starting with the prefix (case-insensitive).
///
/// The prefix is stripped and the rest of the name is canonicalized.
pub fn metadata_from_pairs<I, K, V>(pairs: I, prefix: &str) -> HashMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let prefix = prefix.to_lowercase();
    pairs
        .into_iter()
        .filter_map(|(k, v)| {
            let key = k.as_ref().to_lowercase();
            key.strip_prefix(&prefix)
                .filter(|rest| !rest.is_empty())
                .map(|rest| (canonical_header_key(rest), v.as_ref().to_string()))
        })
        .collect()
}

/// Collect metadata from headers with the given prefix, e.g. `X-Account-Meta-`.
pub fn extract_metadata(headers: &HeaderMap, prefix: &str) -> HashMap<String, String> {
    metadata_from_pairs(
        headers
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str(), v))),
        prefix,
    )
}

/// Get a header as a string.
pub(crate) fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Get a header as an owned string.
pub(crate) fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    header_str(headers, name).map(String::from)
}

/// Parse a header value.
pub(crate) fn header_parse<T: std::str::FromStr>(
    headers: &HeaderMap,
    name: &str,
) -> Result<Option<T>, Error> {
    match header_str(headers, name) {
        Some(value) => value.trim().parse().map(Some).map_err(|_| {
            Error::new(
                ErrorKind::InvalidResponse,
                format!("Invalid value of header {}: {}", name, value),
            )
        }),
        None => Ok(None),
    }
}

/// Parse a boolean header (`true`/`false`, `yes`/`no`, `1`/`0`).
pub(crate) fn header_bool(headers: &HeaderMap, name: &str) -> Option<bool> {
    header_str(headers, name).and_then(|v| match v.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    })
}

/// Parse an HTTP date header.
pub(crate) fn header_date(headers: &HeaderMap, name: &str) -> Result<Option<DateTime<Utc>>, Error> {
    let value = match header_str(headers, name) {
        Some(value) => value.trim(),
        None => return Ok(None),
    };

    if let Ok(parsed) = DateTime::parse_from_rfc2822(value) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }

    // RFC 1123 with a symbolic zone, e.g. "Wed, 17 Aug 2016 19:25:43 GMT"
    let stripped = value
        .strip_suffix(" GMT")
        .or_else(|| value.strip_suffix(" UTC"))
        .unwrap_or(value);
    NaiveDateTime::parse_from_str(stripped, "%a, %d %b %Y %H:%M:%S")
        .map(|naive| Some(Utc.from_utc_datetime(&naive)))
        .map_err(|e| {
            Error::new(
                ErrorKind::InvalidResponse,
                format!("Invalid date in header {}: {}", name, e),
            )
        })
}

/// Parse a header with a UNIX timestamp, possibly fractional.
pub(crate) fn header_timestamp(
    headers: &HeaderMap,
    name: &str,
) -> Result<Option<DateTime<Utc>>, Error> {
    let value: Option<f64> = header_parse(headers, name)?;
    Ok(value.and_then(|ts| {
        let secs = ts.trunc() as i64;
        let nanos = (ts.fract() * 1e9) as u32;
        Utc.timestamp_opt(secs, nanos).single()
    }))
}
