use integration_tests::{
    blog::{self, page_ids},
    runtime,
};
use pretty_assertions::assert_eq;
use relation_mocks::{MockQuery, Order};
use rstest::rstest;
use subgraph_engine::{
    ErrorCode, GraphqlError,
    pagination::PageArgs,
    relation::{FetchError, Model, NoDecoration, PaginatedRelationLoader},
};

#[test]
fn total_count_is_independent_of_the_page() {
    runtime().block_on(async {
        let provider = blog::provider();
        let mut users = blog::users(&provider, &[1]);

        PaginatedRelationLoader::new(&provider, "posts", PageArgs::new(2, 3), NoDecoration)
            .load(&mut users)
            .await
            .unwrap();

        let page = users[0].paginated("posts").unwrap();
        assert_eq!(page_ids(&users[0], "posts"), vec![4, 5, 6]);
        assert_eq!(page.total_count, 10);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.last_page(), 4);
    });
}

#[test]
fn every_parent_gets_its_own_window_in_a_single_round_trip() {
    runtime().block_on(async {
        let provider = blog::provider();
        let mut users = blog::users(&provider, &[2, 3, 4]);

        PaginatedRelationLoader::new(&provider, "posts", PageArgs::new(1, 3), NoDecoration)
            .load(&mut users)
            .await
            .unwrap();

        assert_eq!(provider.union_executions(), 1);
        assert_eq!(provider.count_executions(), 1);
        assert_eq!(provider.executed_windows(), vec![Some((0, 3)); 3]);

        assert_eq!(page_ids(&users[0], "posts"), vec![11, 12, 13]);
        assert_eq!(page_ids(&users[1], "posts"), vec![16, 17]);
        assert_eq!(page_ids(&users[2], "posts"), Vec::<u64>::new());

        let totals = users
            .iter()
            .map(|user| user.paginated("posts").unwrap().total_count)
            .collect::<Vec<_>>();
        assert_eq!(totals, vec![5, 2, 0]);
    });
}

#[test]
fn repeated_parents_keep_a_single_window() {
    runtime().block_on(async {
        let provider = blog::provider();
        let mut users = blog::users(&provider, &[1, 2, 1]);

        PaginatedRelationLoader::new(&provider, "posts", PageArgs::new(1, 3), NoDecoration)
            .load(&mut users)
            .await
            .unwrap();

        assert_eq!(provider.executed_windows(), vec![Some((0, 3)); 2]);

        for user in [&users[0], &users[2]] {
            let page = user.paginated("posts").unwrap();
            assert_eq!(page_ids(user, "posts"), vec![1, 2, 3]);
            assert!(page.count() <= 3);
            assert_eq!(page.total_count, 10);
        }
        assert_eq!(page_ids(&users[1], "posts"), vec![11, 12, 13]);
    });
}

#[test]
fn negative_page_size_fetches_every_row() {
    runtime().block_on(async {
        let provider = blog::provider();
        let mut users = blog::users(&provider, &[1, 2]);

        PaginatedRelationLoader::new(&provider, "posts", PageArgs::new(3, -1), NoDecoration)
            .load(&mut users)
            .await
            .unwrap();

        assert_eq!(provider.executed_windows(), vec![None, None]);
        assert_eq!(page_ids(&users[0], "posts"), (1..=10).collect::<Vec<_>>());
        assert_eq!(page_ids(&users[1], "posts"), (11..=15).collect::<Vec<_>>());

        let page = users[1].paginated("posts").unwrap();
        assert_eq!(page.page_size(), 5);
        assert_eq!(page.last_page(), 1);
        assert!(!page.has_more_pages());
    });
}

#[rstest]
#[case(1, vec![1, 2, 3, 4])]
#[case(3, vec![9, 10])]
#[case(4, vec![])]
fn pages_of_one_parent(#[case] page: u32, #[case] expected: Vec<u64>) {
    runtime().block_on(async {
        let provider = blog::provider();
        let mut users = blog::users(&provider, &[1]);

        PaginatedRelationLoader::new(&provider, "posts", PageArgs::new(page, 4), NoDecoration)
            .load(&mut users)
            .await
            .unwrap();

        assert_eq!(page_ids(&users[0], "posts"), expected);
        assert_eq!(users[0].paginated("posts").unwrap().total_count, 10);
    });
}

#[test]
fn decorated_queries() {
    runtime().block_on(async {
        let provider = blog::provider();
        let mut users = blog::users(&provider, &[1, 2]);
        let published_first = |query: &mut MockQuery, _: &Model| {
            query.where_eq("published", true).order_by("id", Order::Desc);
        };

        PaginatedRelationLoader::new(&provider, "posts", PageArgs::new(1, 2), published_first)
            .load(&mut users)
            .await
            .unwrap();

        assert_eq!(page_ids(&users[0], "posts"), vec![10, 8]);
        assert_eq!(page_ids(&users[1], "posts"), vec![14, 12]);
        assert_eq!(users[0].paginated("posts").unwrap().total_count, 5);
        assert_eq!(users[1].paginated("posts").unwrap().total_count, 2);
    });
}

#[test]
fn fetch_failures_abort_the_load() {
    runtime().block_on(async {
        let provider = blog::provider();
        let mut users = blog::users(&provider, &[1, 2]);

        provider.fail_next_fetch(FetchError::Connection("connection reset by peer".into()));

        let error = PaginatedRelationLoader::new(&provider, "posts", PageArgs::new(1, 2), NoDecoration)
            .load(&mut users)
            .await
            .unwrap_err();

        assert_eq!(error, FetchError::Connection("connection reset by peer".into()));
        assert!(users.iter().all(|user| !user.relation_loaded("posts")));
        assert_eq!(provider.union_executions(), 0);

        let error = GraphqlError::from(error);
        assert_eq!(error.code, ErrorCode::DataFetchError);
    });
}

#[test]
fn unknown_relation() {
    runtime().block_on(async {
        let provider = blog::provider();
        let mut users = blog::users(&provider, &[1]);

        let error = PaginatedRelationLoader::new(&provider, "followers", PageArgs::all(), NoDecoration)
            .load(&mut users)
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "type User has no relation named followers");
    });
}
