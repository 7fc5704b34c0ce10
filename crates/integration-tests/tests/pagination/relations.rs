use integration_tests::{
    blog::{self, page_ids},
    runtime,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use subgraph_engine::{
    pagination::PageArgs,
    relation::{NoDecoration, PaginatedRelationLoader},
};

#[test]
fn belongs_to_many_rows_carry_their_pivot() {
    runtime().block_on(async {
        let provider = blog::provider();
        let mut users = blog::users(&provider, &[1, 2, 3]);

        PaginatedRelationLoader::new(&provider, "roles", PageArgs::new(1, 10), NoDecoration)
            .load(&mut users)
            .await
            .unwrap();

        assert_eq!(page_ids(&users[0], "roles"), vec![1, 2]);
        assert_eq!(page_ids(&users[1], "roles"), vec![2, 3]);
        assert_eq!(page_ids(&users[2], "roles"), Vec::<u64>::new());

        let editor = &users[1].related("roles").unwrap()[0];
        assert_eq!(editor.get("name"), Some(&json!("editor")));
        assert_eq!(editor.pivot(), json!({"user_id": 2, "role_id": 2}).as_object());
        assert!(editor.attributes().keys().all(|name| !name.starts_with("pivot_")));
    });
}

#[test]
fn has_many_through_rows_are_matched_on_the_through_key() {
    runtime().block_on(async {
        let provider = blog::provider();
        let mut users = blog::users(&provider, &[1, 2, 3]);

        PaginatedRelationLoader::new(&provider, "comments", PageArgs::new(1, 3), NoDecoration)
            .load(&mut users)
            .await
            .unwrap();

        assert_eq!(provider.union_executions(), 1);
        assert_eq!(page_ids(&users[0], "comments"), vec![10, 11, 20]);
        assert_eq!(page_ids(&users[1], "comments"), vec![110, 111]);
        assert_eq!(page_ids(&users[2], "comments"), Vec::<u64>::new());

        let totals = users
            .iter()
            .map(|user| user.paginated("comments").unwrap().total_count)
            .collect::<Vec<_>>();
        assert_eq!(totals, vec![4, 2, 0]);
    });
}

#[test]
fn default_eager_loads_are_loaded_on_the_page_rows() {
    runtime().block_on(async {
        let provider = blog::provider().with_default_eager_loads("Post", ["tags"]);
        let mut users = blog::users(&provider, &[1, 2]);

        PaginatedRelationLoader::new(&provider, "posts", PageArgs::new(1, 2), NoDecoration)
            .load(&mut users)
            .await
            .unwrap();

        assert_eq!(
            provider.eager_loads(),
            vec![("Post".to_string(), vec!["tags".to_string()])]
        );

        let first_post = &users[0].related("posts").unwrap()[0];
        let tags = first_post
            .related("tags")
            .unwrap()
            .iter()
            .map(|tag| tag.get("name").cloned())
            .collect::<Vec<_>>();
        assert_eq!(tags, vec![Some(json!("rust")), Some(json!("graphql"))]);

        let second_post = &users[0].related("posts").unwrap()[1];
        assert_eq!(second_post.related("tags"), Some(&[][..]));
        assert!(
            users[1]
                .related("posts")
                .unwrap()
                .iter()
                .all(|post| post.relation_loaded("tags"))
        );
    });
}

#[test]
fn nothing_to_eager_load_without_rows() {
    runtime().block_on(async {
        let provider = blog::provider().with_default_eager_loads("Post", ["tags"]);
        let mut users = blog::users(&provider, &[4]);

        PaginatedRelationLoader::new(&provider, "posts", PageArgs::new(1, 2), NoDecoration)
            .load(&mut users)
            .await
            .unwrap();

        assert!(provider.eager_loads().is_empty());
        assert_eq!(users[0].paginated("posts").unwrap().total_count, 0);
    });
}
