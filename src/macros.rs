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

//! Useful macros for definiting protocol structures.

/// A macro for defining string enums used in requests and responses.
///
/// `Clone`, `Copy`, `Debug`, `Serialize`/`Deserialize`, `Display` and equality traits are
/// automatically derived:
///
/// ```rust
/// osclient::protocol_enum! {
///     #[doc = "Traffic direction."]
///     enum Direction {
///         Ingress = "ingress",
///         Egress = "egress"
///     }
/// }
/// ```
///
/// This variant fails when an unknown value is deserialized. If the set of values is open-ended,
/// provide a default value that unknown values map to:
///
/// ```rust
/// osclient::protocol_enum! {
///     #[doc = "Volume attach status."]
///     #[non_exhaustive]
///     enum AttachStatus = Unknown {
///         Attached = "attached",
///         Detached = "detached",
///         Unknown = "unknown"
///     }
/// }
/// ```
#[macro_export]
macro_rules! protocol_enum {
    {$(#[$attr:meta])* enum $name:ident {
        $($(#[$iattr:meta])* $item:ident = $val:expr),+
    }} => (
        $crate::protocol_enum! {
            $(#[$attr])*
            __private $name {
                $($(#[$iattr])* $item = $val),+
            }
        }

        impl<'de> ::serde::de::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
                    where D: ::serde::de::Deserializer<'de> {
                let value = <String as ::serde::de::Deserialize>::deserialize(deserializer)?;
                match value.as_str() {
                    $($val => Ok($name::$item)),+,
                    other => {
                        use ::serde::de::Error;
                        let err = format!("Unexpected {}: {}", stringify!($name), other);
                        Err(D::Error::custom(err))
                    }
                }
            }
        }
    );

    {$(#[$attr:meta])* enum $name:ident = $default:ident {
        $($(#[$iattr:meta])* $item:ident = $val:expr),+
    }} => (
        $crate::protocol_enum! {
            $(#[$attr])*
            __private $name {
                $($(#[$iattr])* $item = $val),+
            }
        }

        impl Default for $name {
            fn default() -> $name {
                $name::$default
            }
        }

        impl<'de> ::serde::de::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
                    where D: ::serde::de::Deserializer<'de> {
                let value = <String as ::serde::de::Deserialize>::deserialize(deserializer)?;
                Ok(match value.as_str() {
                    $($val => $name::$item),+,
                    _ => Default::default()
                })
            }
        }
    );

    {$(#[$attr:meta])* __private $name:ident {
        $($(#[$iattr:meta])* $item:ident = $val:expr),+
    }} => (
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$iattr])* $item),+,
        }

        impl $name {
            /// The protocol value.
            pub fn as_str(&self) -> &'static str {
                match *self {
                    $($name::$item => $val),+,
                }
            }
        }

        impl ::serde::ser::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
                    where S: ::serde::ser::Serializer {
                serializer.serialize_str(self.as_str())
            }
        }

        impl ::std::fmt::Display for $name {
            /// Displays the underlying protocol value.
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    );
}

#[cfg(test)]
pub mod test {
    use crate::protocol_enum;

    protocol_enum! {
        enum RuleKind {
            BandwidthLimit = "bandwidth_limit",
            DscpMarking = "dscp_marking",
            MinimumBandwidth = "minimum_bandwidth"
        }
    }

    #[test]
    fn test_string() {
        assert_eq!("dscp_marking", RuleKind::DscpMarking.as_str());
        assert_eq!("dscp_marking", RuleKind::DscpMarking.to_string());
        assert_eq!(
            RuleKind::BandwidthLimit,
            serde_json::from_str("\"bandwidth_limit\"").unwrap()
        );
        assert_eq!(
            "\"minimum_bandwidth\"",
            serde_json::to_string(&RuleKind::MinimumBandwidth).unwrap()
        );
        assert!(serde_json::from_str::<RuleKind>("\"banana\"").is_err());
        assert!(serde_json::from_str::<RuleKind>("42").is_err());
    }

    protocol_enum! {
        #[non_exhaustive]
        enum AgentKind = Unknown {
            Dhcp = "DHCP agent",
            L3 = "L3 agent",
            Unknown = "unknown"
        }
    }

    #[test]
    fn test_string_with_default() {
        assert_eq!(AgentKind::Unknown, AgentKind::default());
        assert_eq!(AgentKind::L3, serde_json::from_str("\"L3 agent\"").unwrap());
        assert_eq!(
            AgentKind::Unknown,
            serde_json::from_str("\"Metering agent\"").unwrap()
        );
        assert!(serde_json::from_str::<AgentKind>("42").is_err());
    }
}
