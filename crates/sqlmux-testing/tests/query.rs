//! Executor query-path tests: release discipline around single statements.

use std::sync::Arc;
use std::time::Duration;

use sqlmux::{Connection, Error, Executor, Pool, PoolConfig, QueryResult, Value};
use sqlmux_testing::{FakeConnection, FakeConnector, TestPool, blog_rows};
use tokio::sync::Barrier;

#[tokio::test]
async fn test_query_resolves_rows_and_releases() {
    // Three rows come back and the connection goes home.
    let conn = FakeConnection::new(1).on_query("SELECT * FROM t", blog_rows(3));
    let pool = TestPool::with_connections(vec![conn]);
    let executor = Executor::new(pool.clone());

    let result = executor
        .query("SELECT * FROM t", &[])
        .await
        .expect("query should succeed");

    assert_eq!(result.row_count(), 3);
    assert_eq!(result.rows[0].get_named("id").and_then(|v| v.as_int()), Some(1));

    let stats = pool.stats();
    assert_eq!(stats.released, 1);
    assert_eq!(stats.discarded, 0);
    assert_eq!(executor.status().available, 1);
    assert_eq!(executor.status().in_use, 0);
}

#[tokio::test]
async fn test_statement_error_still_releases() {
    let conn = FakeConnection::new(1).fail_statement("SELECT broken", "syntax error near 'broken'");
    let pool = TestPool::with_connections(vec![conn]);
    let executor = Executor::new(pool.clone());

    let err = executor
        .query("SELECT broken", &[])
        .await
        .expect_err("query should fail");

    assert!(err.is_statement());
    let stats = pool.stats();
    assert_eq!(stats.released, 1);
    assert_eq!(stats.discarded, 0);
}

#[tokio::test]
async fn test_acquisition_failure_touches_no_release_path() {
    let pool = TestPool::broken("pool saturated");
    let executor = Executor::new(pool.clone());

    let err = executor
        .query("SELECT 1", &[])
        .await
        .expect_err("acquisition should fail");

    assert!(matches!(err, Error::Acquire(ref m) if m == "pool saturated"));
    assert_eq!(pool.stats().released, 0);
    assert_eq!(pool.stats().discarded, 0);
}

#[tokio::test]
async fn test_saturated_pool_queues_the_query() {
    // With zero free connections the call pends, then proceeds once a
    // connection is returned.
    let conn = FakeConnection::new(1).on_query("SELECT 1", blog_rows(1));
    let pool = TestPool::with_connections(vec![conn]);
    let executor = Executor::new(pool.clone());

    let held = pool.acquire().await.expect("direct acquire");

    let waiting = {
        let executor = executor.clone();
        tokio::spawn(async move { executor.query("SELECT 1", &[]).await })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!waiting.is_finished(), "query must wait for a free connection");

    pool.release(held);
    let result = waiting
        .await
        .expect("task should not panic")
        .expect("query should succeed after release");
    assert_eq!(result.row_count(), 1);
    assert_eq!(pool.stats().released, 2);
}

#[tokio::test]
async fn test_concurrent_work_uses_distinct_connections() {
    let first = FakeConnection::new(1);
    let second = FakeConnection::new(2);
    let (log_a, log_b) = (first.log(), second.log());
    let pool = TestPool::with_connections(vec![first, second]);
    let executor = Executor::new(pool.clone());

    // Both units of work rendezvous while holding their connections, so
    // the overlap is forced rather than left to scheduling.
    let barrier = Arc::new(Barrier::new(2));
    let spawn_work = |statement: &'static str| {
        let executor = executor.clone();
        let pool = pool.clone();
        let barrier = Arc::clone(&barrier);
        tokio::spawn(async move {
            executor
                .transaction(move |conn| {
                    Box::pin(async move {
                        barrier.wait().await;
                        // Neither side can release until the second
                        // rendezvous, so both handles are out right now.
                        assert_eq!(pool.status().in_use, 2);
                        barrier.wait().await;
                        conn.query(statement, &[]).await?;
                        Ok(())
                    })
                })
                .await
        })
    };

    let (left, right) = tokio::join!(spawn_work("SELECT 'a'"), spawn_work("SELECT 'b'"));
    left.expect("left task").expect("left transaction");
    right.expect("right task").expect("right transaction");

    // BEGIN, the statement, COMMIT, once on each connection; the handles
    // were never shared.
    assert_eq!(log_a.statements().len(), 3);
    assert_eq!(log_b.statements().len(), 3);
    assert_eq!(pool.stats().released, 2);
}

#[tokio::test]
async fn test_configured_pool_creates_connections_lazily() {
    let config = PoolConfig::new().min_connections(0).max_connections(2);
    let connector = FakeConnector::new(vec![
        FakeConnection::new(1).on_query("SELECT 1", blog_rows(1)),
    ]);
    let pool = TestPool::configured(&config, connector).expect("valid config");
    let executor = Executor::new(pool.clone());

    let result = executor.query("SELECT 1", &[]).await.expect("query");
    assert_eq!(result.row_count(), 1);
    assert_eq!(pool.stats().created, 1);
    assert_eq!(pool.stats().released, 1);
}

#[tokio::test]
async fn test_closed_connection_is_not_returned_to_idle() {
    let conn = FakeConnection::new(1).closed();
    let pool = TestPool::with_connections(vec![conn]);
    let executor = Executor::new(pool.clone());

    executor.query("SELECT 1", &[]).await.expect("query");

    assert_eq!(pool.stats().released, 1);
    let status = executor.status();
    assert_eq!(status.available, 0);
    assert_eq!(status.total, 0);
}

#[tokio::test]
async fn test_ok_results_carry_affected_rows_and_insert_id() {
    let conn = FakeConnection::new(1).on_query(
        "INSERT INTO blog (content) VALUES (?)",
        QueryResult::ok(1, Some(42)),
    );
    let pool = TestPool::with_connections(vec![conn]);
    let executor = Executor::new(pool);

    let result = executor
        .query(
            "INSERT INTO blog (content) VALUES (?)",
            &[Value::from("hello world")],
        )
        .await
        .expect("insert");

    assert_eq!(result.rows_affected, 1);
    assert_eq!(result.last_insert_id, Some(42));
}
