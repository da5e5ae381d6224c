// Copyright 2020 Dmitry Tantsur <dtantsur@protonmail.com>
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

//! Building query strings and request bodies from option structures.

use reqwest::Url;
use serde::Serialize;
use serde_json::{Map, Value};

use super::{Error, ErrorKind};

/// Serialize options into a query string.
///
/// Fields are emitted in declaration order. Use `skip_serializing_if = "Option::is_none"` for
/// optional fields: `Some(0)` and `Some(false)` are still emitted.
///
/// ```rust
/// #[derive(serde::Serialize)]
/// struct ListOpts {
///     #[serde(skip_serializing_if = "Option::is_none")]
///     name: Option<String>,
///     #[serde(skip_serializing_if = "Option::is_none")]
///     limit: Option<u32>,
/// }
///
/// let query = osclient::build_query_string(&ListOpts {
///     name: Some("my volume".into()),
///     limit: Some(0),
/// }).unwrap();
/// assert_eq!(query, "name=my+volume&limit=0");
/// ```
pub fn build_query_string<T: Serialize + ?Sized>(opts: &T) -> Result<String, Error> {
    serde_urlencoded::to_string(opts).map_err(Error::from)
}

/// Append options to the query of a URL.
pub fn with_query<T: Serialize + ?Sized>(mut url: Url, opts: &T) -> Result<Url, Error> {
    let query = build_query_string(opts)?;
    if !query.is_empty() {
        let combined = match url.query() {
            Some(existing) if !existing.is_empty() => format!("{}&{}", existing, query),
            _ => query,
        };
        url.set_query(Some(&combined));
    }
    Ok(url)
}

/// An option structure that can be turned into a JSON request body.
///
/// Implementations validate required fields and return `InvalidInput` before any request
/// is made. Wrappers adding extension fields call the inner builder and amend its output.
pub trait BodyBuilder {
    /// Build the request body.
    fn to_body(&self) -> Result<Value, Error>;
}

/// Serialize options into a JSON object, optionally wrapped in an envelope key.
pub fn build_request_body<T: Serialize + ?Sized>(
    opts: &T,
    envelope: Option<&str>,
) -> Result<Value, Error> {
    let value = serde_json::to_value(opts).map_err(|e| {
        Error::new(
            ErrorKind::InvalidInput,
            format!("Cannot serialize the request body: {}", e),
        )
    })?;
    Ok(match envelope {
        Some(key) => wrap(key, value),
        None => value,
    })
}

/// Wrap a value into a single-key object.
pub fn wrap(key: &str, value: Value) -> Value {
    let mut map = Map::with_capacity(1);
    let _ = map.insert(key.to_string(), value);
    Value::Object(map)
}

/// Fail if a required option is left at its zero value.
pub fn require<T>(value: &T, field: &str) -> Result<(), Error>
where
    T: Default + PartialEq,
{
    if *value == T::default() {
        Err(Error::new(
            ErrorKind::InvalidInput,
            format!("Missing input for argument [{}]", field),
        ))
    } else {
        Ok(())
    }
}

/// Get the object under an envelope key for modification.
pub(crate) fn envelope_mut<'a>(
    body: &'a mut Value,
    envelope: &str,
) -> Result<&'a mut Map<String, Value>, Error> {
    body.get_mut(envelope)
        .and_then(Value::as_object_mut)
        .ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidInput,
                format!("Request body has no {} object to extend", envelope),
            )
        })
}

#[cfg(test)]
pub mod test {
    use reqwest::Url;
    use serde::Serialize;
    use serde_json::json;

    use super::{build_query_string, build_request_body, envelope_mut, require, with_query};
    use crate::ErrorKind;

    #[derive(Debug, Default, Serialize)]
    struct Opts {
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        admin_state_up: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        limit: Option<u32>,
    }

    #[test]
    fn test_query_skips_unset() {
        assert_eq!(build_query_string(&Opts::default()).unwrap(), "");
        let opts = Opts {
            name: None,
            admin_state_up: Some(false),
            limit: Some(0),
        };
        assert_eq!(
            build_query_string(&opts).unwrap(),
            "admin_state_up=false&limit=0"
        );
    }

    #[test]
    fn test_with_query_appends() {
        let url = Url::parse("http://127.0.0.1/v1/acct?format=json").unwrap();
        let opts = Opts {
            name: Some("a b".into()),
            ..Opts::default()
        };
        let url = with_query(url, &opts).unwrap();
        assert_eq!(url.query(), Some("format=json&name=a+b"));
    }

    #[test]
    fn test_body_envelope() {
        let opts = Opts {
            name: Some("n".into()),
            ..Opts::default()
        };
        let body = build_request_body(&opts, Some("thing")).unwrap();
        assert_eq!(body, json!({"thing": {"name": "n"}}));
    }

    #[test]
    fn test_envelope_mut() {
        let mut body = json!({"thing": {"name": "n"}});
        let _ = envelope_mut(&mut body, "thing")
            .unwrap()
            .insert("extra".into(), json!(1));
        assert_eq!(body, json!({"thing": {"name": "n", "extra": 1}}));
        assert!(envelope_mut(&mut body, "other").is_err());
    }

    #[test]
    fn test_require() {
        require(&42, "size").unwrap();
        let err = require(&0, "size").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("size"));
        assert!(require(&String::new(), "name").is_err());
    }
}
