use indoc::indoc;
use integration_tests::{
    entities::{self, Catalog},
    runtime,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use subgraph_engine::{
    Config,
    federation::{BatchFn, EntityResolutionEngine, EntityResolverError, Representation},
};

#[test]
fn batches_receive_the_representations_of_their_type_in_order() {
    runtime().block_on(async {
        let products = Catalog::products();
        let engine = EntityResolutionEngine::new(
            entities::schema(),
            entities::registry(Catalog::foos(), products.clone()),
        );

        let results = engine
            .resolve(vec![
                json!({"__typename": "Product", "upc": "3"}),
                json!({"__typename": "Foo", "id": 42}),
                json!({"__typename": "Product", "upc": "404"}),
                json!({"__typename": "Product", "sku": "table", "region": "eu"}),
            ])
            .await;

        assert_eq!(
            products.batches(),
            vec![vec![
                json!({"__typename": "Product", "upc": "3"}),
                json!({"__typename": "Product", "upc": "404"}),
                json!({"__typename": "Product", "sku": "table", "region": "eu"}),
            ]]
        );

        let prices = results
            .into_iter()
            .map(|result| result.unwrap().and_then(|entity| entity.get("price").cloned()))
            .collect::<Vec<_>>();
        assert_eq!(prices, vec![Some(json!(12)), None, None, Some(json!(120))]);
    });
}

#[test]
fn batch_size_from_config() {
    let config = Config::from_toml_str(indoc! {r#"
        [federation]
        entities_batch_size = 2
    "#})
    .unwrap();

    runtime().block_on(async {
        let products = Catalog::products();
        let engine = EntityResolutionEngine::new(
            entities::schema(),
            entities::registry(Catalog::foos(), products.clone()),
        )
        .with_config(&config.federation);

        let results = engine
            .resolve(
                ["1", "2", "3", "1", "2"]
                    .into_iter()
                    .map(|upc| json!({"__typename": "Product", "upc": upc}))
                    .collect(),
            )
            .await;

        let batch_sizes = products.batches().iter().map(Vec::len).collect::<Vec<_>>();
        assert_eq!(batch_sizes, vec![2, 2, 1]);

        let upcs = results
            .into_iter()
            .map(|result| result.unwrap().unwrap()["upc"].clone())
            .collect::<Vec<_>>();
        assert_eq!(upcs, vec![json!("1"), json!("2"), json!("3"), json!("1"), json!("2")]);
    });
}

#[test]
fn failing_batch_fails_its_group_only() {
    runtime().block_on(async {
        let mut registry = entities::registry(Catalog::foos(), Catalog::products());
        registry.register_batched(
            "Product",
            BatchFn(|_: Vec<Representation>| async {
                Err::<Vec<Option<Value>>, _>(EntityResolverError::failed("inventory is down"))
            }),
        );
        let engine = EntityResolutionEngine::new(entities::schema(), registry);

        let response = engine
            .resolve_entities_field(&json!({
                "representations": [
                    {"__typename": "Product", "upc": "1"},
                    {"__typename": "Foo", "id": 42},
                    {"__typename": "Product", "upc": "2"}
                ]
            }))
            .await;

        insta::assert_json_snapshot!(response, @r###"
        {
          "data": {
            "_entities": [
              null,
              {
                "__typename": "Foo",
                "id": 42,
                "name": "the answer"
              },
              null
            ]
          },
          "errors": [
            {
              "message": "inventory is down",
              "path": [
                "_entities",
                0
              ],
              "extensions": {
                "code": "ENTITY_RESOLUTION_ERROR"
              }
            },
            {
              "message": "inventory is down",
              "path": [
                "_entities",
                2
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
