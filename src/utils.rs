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

use log::warn;
use serde_yaml::{Mapping, Value};

/// Merge two nested YAML mappings.
///
/// Values from `src` are merged into `dest`. Scalars in `dest` are replaced only when
/// `overwrite` is set, nested mappings are always merged recursively.
pub fn merge_mappings(src: Mapping, dest: &mut Mapping, overwrite: bool) {
    for (src_key, src_value) in src.into_iter() {
        if !dest.contains_key(&src_key) {
            let _ = dest.insert(src_key, src_value);
            continue;
        }

        match (src_value, dest.get_mut(&src_key)) {
            (Value::Mapping(src_mapping), Some(Value::Mapping(dest_mapping))) => {
                merge_mappings(src_mapping, dest_mapping, overwrite);
            }
            (Value::Mapping(src_mapping), Some(dest_value)) => {
                if overwrite {
                    warn!(
                        "Type mismatch while merging configuration: {:?} is not a mapping, replacing it",
                        dest_value
                    );
                    *dest_value = Value::Mapping(src_mapping);
                }
            }
            (other, Some(dest_value)) => {
                if overwrite {
                    *dest_value = other;
                }
            }
            (_, None) => {}
        }
    }
}

#[cfg(test)]
pub mod test {
    use super::merge_mappings;

    pub(crate) fn to_yaml<S: AsRef<str>>(source: S) -> serde_yaml::Mapping {
        let value = serde_yaml::from_str(source.as_ref()).unwrap();
        match value {
            serde_yaml::Value::Mapping(map) => map,
            _ => panic!("Unexpected {:?}", value),
        }
    }

    fn lookup<'a>(map: &'a serde_yaml::Mapping, path: &[&str]) -> &'a serde_yaml::Value {
        let (last, init) = path.split_last().unwrap();
        let mut current = map;
        for key in init {
            current = current.get(*key).unwrap().as_mapping().unwrap();
        }
        current.get(*last).unwrap()
    }

    #[test]
    fn test_merge_secure() {
        let src = to_yaml(
            r#"
clouds:
  devstack:
    auth:
      token: secret
    block_storage_endpoint_override: http://cinder/v3"#,
        );

        let mut dest = to_yaml(
            r#"
clouds:
  devstack:
    auth_type: admin_token
    auth:
      endpoint: http://neutron:9696
      token: placeholder
    region_name: region1"#,
        );

        merge_mappings(src, &mut dest, true);

        let cloud = ["clouds", "devstack"];
        assert_eq!(
            lookup(&dest, &[cloud[0], cloud[1], "auth", "token"]),
            "secret"
        );
        assert_eq!(
            lookup(&dest, &[cloud[0], cloud[1], "auth", "endpoint"]),
            "http://neutron:9696"
        );
        assert_eq!(
            lookup(&dest, &[cloud[0], cloud[1], "block_storage_endpoint_override"]),
            "http://cinder/v3"
        );
        assert_eq!(lookup(&dest, &[cloud[0], cloud[1], "region_name"]), "region1");
    }

    #[test]
    fn test_merge_without_overwrite() {
        let src = to_yaml("region_name: profile-region\ninterface: public");
        let mut dest = to_yaml("region_name: my-region");
        merge_mappings(src, &mut dest, false);
        assert_eq!(lookup(&dest, &["region_name"]), "my-region");
        assert_eq!(lookup(&dest, &["interface"]), "public");
    }

    #[test]
    fn test_merge_type_mismatch() {
        let src = to_yaml(
            r#"
map1:
  map2:
    auth:
      password: password1"#,
        );

        let mut dest = to_yaml(
            r#"
map1:
  map2: 123"#,
        );

        merge_mappings(src.clone(), &mut dest, true);

        assert_eq!(src, dest);
    }
}
