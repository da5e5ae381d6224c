use serde::Deserialize;

use osclient_derive::PaginatedResource;

#[derive(Debug, Deserialize, PaginatedResource)]
struct SimpleResource {
    #[resource_id]
    pub id: String,
    #[allow(dead_code)]
    pub not_id: String,
}

#[derive(Debug, Deserialize, PaginatedResource)]
struct QosPolicy {
    #[resource_id]
    pub id: String,
}

#[derive(Debug, Deserialize, PaginatedResource)]
struct Address {
    #[resource_id]
    pub id: String,
}

#[derive(Debug, Deserialize, PaginatedResource)]
#[collection_name = "items"]
struct RenamedResource {
    #[resource_id]
    pub id: String,
}

#[derive(Debug, Deserialize, PaginatedResource)]
#[flat_collection]
struct FlatResource {
    #[resource_id]
    pub name: String,
}

#[test]
fn test_simple_derive() {
    use osclient::PaginatedResource;

    let res = SimpleResource {
        id: "the id".into(),
        not_id: "not id".into(),
    };

    let res_id: String = res.resource_id();
    assert_eq!(&res_id, "the id");
    assert_eq!(SimpleResource::COLLECTION_NAME, Some("simple_resources"));

    let json =
        r#"{"simple_resources": [{"id": "1", "not_id": "abcd"}, {"id": "2", "not_id": "dcba"}]}"#;
    let resources: <SimpleResource as PaginatedResource>::Root =
        serde_json::from_str(json).unwrap();
    let items: Vec<SimpleResource> = resources.into();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].id, "2");
}

#[test]
fn test_plural_forms() {
    use osclient::PaginatedResource;

    assert_eq!(QosPolicy::COLLECTION_NAME, Some("qos_policies"));
    assert_eq!(Address::COLLECTION_NAME, Some("addresses"));
}

#[test]
fn test_renamed_collection() {
    use osclient::PaginatedResource;

    let json = r#"{"items": [{"id": "1"}, {"id": "2"}]}"#;
    let resources: <RenamedResource as PaginatedResource>::Root =
        serde_json::from_str(json).unwrap();
    assert_eq!(resources.items.len(), 2);
    assert_eq!(RenamedResource::COLLECTION_NAME, Some("items"));
}

#[test]
fn test_flat_collection() {
    use osclient::PaginatedResource;

    let res = FlatResource {
        name: "the name".into(),
    };

    let res_id: String = res.resource_id();
    assert_eq!(&res_id, "the name");
    assert_eq!(FlatResource::COLLECTION_NAME, None);

    let json = r#"[{"name": "1"}, {"name": "2"}]"#;
    let resources: <FlatResource as PaginatedResource>::Root = serde_json::from_str(json).unwrap();
    assert_eq!(resources.len(), 2);
}
