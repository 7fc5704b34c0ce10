use integration_tests::{entities, runtime};
use serde_json::json;

#[test]
fn batched_entities() {
    runtime().block_on(async {
        let response = entities::engine()
            .resolve_entities_field(&json!({
                "representations": [
                    {"__typename": "Foo", "id": 42},
                    {"__typename": "Foo", "id": 69}
                ]
            }))
            .await;

        insta::assert_json_snapshot!(response, @r###"
        {
          "data": {
            "_entities": [
              {
                "__typename": "Foo",
                "id": 42,
                "name": "the answer"
              },
              {
                "__typename": "Foo",
                "id": 69,
                "name": "nice"
              }
            ]
          }
        }
        "###);
    });
}

#[test]
fn interleaved_types_keep_the_request_order() {
    runtime().block_on(async {
        let response = entities::engine()
            .resolve_entities_field(&json!({
                "representations": [
                    {"__typename": "User", "id": "1"},
                    {"__typename": "Foo", "id": 69},
                    {"__typename": "Review", "id": "r1", "product": {"upc": "2"}},
                    {"__typename": "Bar", "id": 1},
                    {"__typename": "Product", "sku": "chair", "region": "us"},
                    {"__typename": "Foo", "id": 42},
                    {"__typename": "User", "id": "2"}
                ]
            }))
            .await;

        insta::assert_json_snapshot!(response, @r###"
        {
          "data": {
            "_entities": [
              {
                "__typename": "User",
                "id": "1",
                "username": "user1"
              },
              {
                "__typename": "Foo",
                "id": 69,
                "name": "nice"
              },
              {
                "__typename": "Review",
                "id": "r1",
                "product": {
                  "upc": "2"
                }
              },
              null,
              {
                "__typename": "Product",
                "upc": "3",
                "sku": "chair",
                "region": "us",
                "price": 12
              },
              {
                "__typename": "Foo",
                "id": 42,
                "name": "the answer"
              },
              {
                "__typename": "User",
                "id": "2",
                "username": "user2"
              }
            ]
          },
          "errors": [
            {
              "message": "Unknown type: \"Bar\".",
              "path": [
                "_entities",
                3
              ],
              "extensions": {
                "code": "ENTITY_RESOLUTION_ERROR"
              }
            }
          ]
        }
        "###);
    });
}

#[test]
fn representation_resolver_returns_the_representation() {
    runtime().block_on(async {
        let representation = json!({"__typename": "Review", "id": "r1", "product": {"upc": "1"}, "body": "great"});

        let results = entities::engine().resolve(vec![representation.clone()]).await;

        assert_eq!(results, vec![Ok(Some(representation))]);
    });
}
