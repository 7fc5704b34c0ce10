use integration_tests::{entities, runtime};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use subgraph_engine::{ErrorCode, GraphqlError};

fn resolve_one(representation: Value) -> Result<Option<Value>, GraphqlError> {
    runtime().block_on(async {
        let mut results = entities::engine().resolve(vec![representation]).await;
        assert_eq!(results.len(), 1);
        results.remove(0)
    })
}

#[rstest]
#[case::missing_key(json!({"__typename": "Foo"}))]
#[case::null_key(json!({"__typename": "Foo", "id": null}))]
#[case::partial_compound_key(json!({"__typename": "Product", "sku": "chair"}))]
#[case::nested_key_not_an_object(json!({"__typename": "Review", "id": "r1", "product": "1"}))]
#[case::nested_key_missing_field(json!({"__typename": "Review", "id": "r1", "product": {}}))]
fn unsatisfied_keys(#[case] representation: Value) {
    let error = resolve_one(representation).unwrap_err();

    assert_eq!(error.code, ErrorCode::EntityResolutionError);
    assert_eq!(
        error.message,
        "Representation does not satisfy any set of uniquely identifying keys."
    );
}

#[rstest]
#[case::first_key(json!({"__typename": "Foo", "id": 42}))]
#[case::second_key(json!({"__typename": "Product", "sku": "table", "region": "eu"}))]
#[case::extra_fields(json!({"__typename": "Product", "upc": "1", "sku": "chair"}))]
fn satisfied_keys(#[case] representation: Value) {
    assert!(resolve_one(representation).unwrap().is_some());
}

#[test]
fn unknown_type() {
    let error = resolve_one(json!({"__typename": "Bar"})).unwrap_err();

    assert_eq!(error.message, r#"Unknown type: "Bar"."#);
}

#[test]
fn missing_resolver() {
    let error = resolve_one(json!({"__typename": "Account", "id": 1})).unwrap_err();

    assert_eq!(error.message, r#"No entity resolver found for type "Account"."#);
}

#[rstest]
#[case::not_an_object(json!("Foo"))]
#[case::without_typename(json!({"id": 42}))]
#[case::typename_not_a_string(json!({"__typename": 42, "id": 42}))]
fn malformed_representations(#[case] representation: Value) {
    let error = resolve_one(representation).unwrap_err();

    assert_eq!(error.code, ErrorCode::BadRequest);
}

#[test]
fn single_resolver_failures_are_scoped() {
    runtime().block_on(async {
        let response = entities::engine()
            .resolve_entities_field(&json!({
                "representations": [
                    {"__typename": "User", "id": "404"},
                    {"__typename": "User", "id": "1"},
                    {"__typename": "User", "id": "500"}
                ]
            }))
            .await;

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "data": {
                    "_entities": [
                        null,
                        {"__typename": "User", "id": "1", "username": "user1"},
                        null
                    ]
                },
                "errors": [
                    {
                        "message": "Entity of type \"User\" was not found.",
                        "path": ["_entities", 0],
                        "extensions": {"code": "ENTITY_RESOLUTION_ERROR"}
                    },
                    {
                        "message": "users service unavailable",
                        "path": ["_entities", 2],
                        "extensions": {"code": "ENTITY_RESOLUTION_ERROR"}
                    }
                ]
            })
        );
    });
}

#[test]
fn every_failure_has_its_own_error() {
    runtime().block_on(async {
        let response = entities::engine()
            .resolve_entities_field(&json!({
                "representations": [
                    {"__typename": "Account", "id": 1},
                    {"__typename": "Foo", "id": 42},
                    {"__typename": "Account", "id": 2},
                    {"__typename": "Foo"}
                ]
            }))
            .await;

        let entities = response.entities.unwrap();
        assert_eq!(entities.len(), 4);
        assert!(entities[1].is_some());

        let paths = response
            .errors
            .iter()
            .map(|error| serde_json::to_value(&error.path).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(
            paths,
            vec![json!(["_entities", 0]), json!(["_entities", 2]), json!(["_entities", 3])]
        );
    });
}
