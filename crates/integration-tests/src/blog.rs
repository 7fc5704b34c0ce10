//! A small blog: users writing posts, posts having comments and tags, users having roles.
//!
//! * user 1 wrote posts 1 to 10, user 2 posts 11 to 15, user 3 posts 16 and 17, user 4 nothing.
//! * even posts are published.
//! * posts 1, 2 and 11 have two comments each.
//! * post 1 is tagged `rust` and `graphql`.
//! * user 1 is `admin` and `editor`, user 2 is `editor` and `viewer`.

use relation_mocks::InMemoryProvider;
use serde_json::json;
use subgraph_engine::relation::Model;

const AUTHORS: &[(u64, std::ops::RangeInclusive<u64>)] = &[(1, 1..=10), (2, 11..=15), (3, 16..=17)];

pub fn provider() -> InMemoryProvider {
    let users = (1..=4).map(|id| json!({"id": id, "name": format!("user {id}")}));

    let posts = AUTHORS.iter().flat_map(|(user_id, posts)| {
        posts.clone().map(move |id| {
            json!({
                "id": id,
                "user_id": user_id,
                "title": format!("post {id}"),
                "published": id % 2 == 0,
            })
        })
    });

    let comments = [1, 2, 11]
        .into_iter()
        .flat_map(|post_id| (0..2).map(move |n| json!({"id": post_id * 10 + n, "post_id": post_id})));

    InMemoryProvider::new()
        .with_table("users", "User", users)
        .with_table("posts", "Post", posts)
        .with_table("comments", "Comment", comments)
        .with_table(
            "tags",
            "Tag",
            [
                json!({"id": 1, "post_id": 1, "name": "rust"}),
                json!({"id": 2, "post_id": 1, "name": "graphql"}),
            ],
        )
        .with_table(
            "roles",
            "Role",
            [
                json!({"id": 1, "name": "admin"}),
                json!({"id": 2, "name": "editor"}),
                json!({"id": 3, "name": "viewer"}),
            ],
        )
        .with_pivot_table(
            "role_user",
            [
                json!({"user_id": 1, "role_id": 1}),
                json!({"user_id": 1, "role_id": 2}),
                json!({"user_id": 2, "role_id": 2}),
                json!({"user_id": 2, "role_id": 3}),
            ],
        )
        .has_many("User", "posts", "Post", "user_id")
        .has_many("Post", "tags", "Tag", "post_id")
        .belongs_to_many("User", "roles", "Role", "role_user", "user_id", "role_id")
        .has_many_through("User", "comments", "Comment", "Post", "user_id", "post_id")
}

/// Users with the given ids, in that order.
pub fn users(provider: &InMemoryProvider, ids: &[u64]) -> Vec<Model> {
    let users = provider.models("User");
    ids.iter()
        .filter_map(|id| users.iter().find(|user| user.get("id") == Some(&json!(id))).cloned())
        .collect()
}

/// Ids of the items of the `relation` page of `model`.
pub fn page_ids(model: &Model, relation: &str) -> Vec<u64> {
    model
        .related(relation)
        .unwrap_or_default()
        .iter()
        .filter_map(|item| item.get("id").and_then(|id| id.as_u64()))
        .collect()
}
