use indoc::indoc;
use integration_tests::{blog, runtime};
use pretty_assertions::assert_eq;
use serde_json::json;
use subgraph_engine::{
    Config, ErrorCode, GraphqlError,
    pagination::{PaginatedField, PaginationType},
    relation::{NoDecoration, PaginatedRelationLoader},
};

fn config() -> Config {
    Config::from_toml_str(indoc! {r#"
        log_level = "debug"

        [pagination]
        default_count = 2
        max_count = 5
        non_null_pagination_results = true
    "#})
    .unwrap()
}

#[test]
fn paginator_field() {
    let config = config();
    let field = PaginatedField::register("Post", None, &config.pagination);
    assert_eq!(field.field_type(), "PostPaginator!");

    runtime().block_on(async {
        let provider = blog::provider();
        let mut users = blog::users(&provider, &[3]);
        let page_args = field.extract_page_args(&json!({"page": 1})).unwrap();

        PaginatedRelationLoader::new(&provider, "posts", page_args, NoDecoration)
            .load(&mut users)
            .await
            .unwrap();

        let value = field.render(users[0].paginated("posts").unwrap()).unwrap();
        insta::assert_json_snapshot!(value, @r###"
        {
          "data": [
            {
              "id": 16,
              "user_id": 3,
              "title": "post 16",
              "published": true
            },
            {
              "id": 17,
              "user_id": 3,
              "title": "post 17",
              "published": false
            }
          ],
          "paginatorInfo": {
            "count": 2,
            "currentPage": 1,
            "firstItem": 1,
            "hasMorePages": false,
            "lastItem": 2,
            "lastPage": 1,
            "perPage": 2,
            "total": 2
          }
        }
        "###);
    });
}

#[test]
fn connection_field_walks_the_cursors() {
    let config = config();
    let field = PaginatedField::from_directive_argument("Post", Some("connection"), &config.pagination).unwrap();
    assert_eq!(field.type_name(), "PostConnection");
    assert_eq!(field.edge_type_name().as_deref(), Some("PostEdge"));

    runtime().block_on(async {
        let provider = blog::provider();
        let mut after = None;
        let mut pages = Vec::new();

        loop {
            let mut users = blog::users(&provider, &[2]);
            let arguments = json!({"first": 2, "after": after});
            let page_args = field.extract_page_args(&arguments).unwrap();

            PaginatedRelationLoader::new(&provider, "posts", page_args, NoDecoration)
                .load(&mut users)
                .await
                .unwrap();

            let value = field.render(users[0].paginated("posts").unwrap()).unwrap();
            let ids = value["edges"]
                .as_array()
                .unwrap()
                .iter()
                .map(|edge| edge["node"]["id"].clone())
                .collect::<Vec<_>>();
            pages.push(ids);

            if value["pageInfo"]["hasNextPage"] != json!(true) {
                break;
            }
            after = value["pageInfo"]["endCursor"].as_str().map(str::to_string);
        }

        assert_eq!(
            pages,
            vec![
                vec![json!(11), json!(12)],
                vec![json!(13), json!(14)],
                vec![json!(15)]
            ]
        );
    });
}

#[test]
fn invalid_arguments_are_bad_requests() {
    let config = config();
    let field = PaginatedField::register("Post", Some(PaginationType::Simple), &config.pagination);

    let error = GraphqlError::from(field.extract_page_args(&json!({"first": 6})).unwrap_err());
    assert_eq!(error.code, ErrorCode::BadRequest);
    assert_eq!(
        error.message,
        "Maximum number of 5 requested items exceeded, got 6. Fetch smaller chunks."
    );

    let error = GraphqlError::from(field.extract_page_args(&json!({"first": 2, "page": 0})).unwrap_err());
    assert_eq!(error.message, "Requested page must be at least 1, got 0.");
}
