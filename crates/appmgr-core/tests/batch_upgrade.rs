mod common;

use appmgr_core::cache::Session;
use appmgr_core::upgrade_all;

use common::{update, FakeApi};

#[tokio::test]
async fn failure_does_not_abort_remaining_upgrades() {
    let mut api = FakeApi::new();
    api.failing_upgrades.insert("b".into());
    let session = Session::new(api);

    let updates = vec![
        update("a", "1.0", "1.1"),
        update("b", "2.0", "2.1"),
        update("c", "3.0", "3.1"),
    ];

    let report = upgrade_all(&session, &updates).await;

    assert_eq!(
        session.api().calls(),
        vec!["upgrade:a:1.1", "upgrade:b:2.1", "upgrade:c:3.1"]
    );
    assert_eq!(report.succeeded, vec!["a", "c"]);
    assert_eq!(report.failure_count(), 1);
    assert_eq!(report.failed[0].id, "b");
    assert_eq!(report.attempted(), 3);
    assert!(!report.is_success());
    assert_eq!(report.summary(), "Upgraded 2 apps, 1 failed");
}

#[tokio::test]
async fn offers_that_are_not_newer_are_skipped() {
    let session = Session::new(FakeApi::new());
    let updates = vec![update("a", "1.1", "1.1"), update("b", "", "0.1")];

    let report = upgrade_all(&session, &updates).await;

    assert_eq!(report.skipped, vec!["a"]);
    assert_eq!(report.succeeded, vec!["b"]);
    assert!(report.is_success());
    assert_eq!(session.api().count("upgrade"), 1);
}

#[test]
fn empty_batch_reports_nothing() {
    let session = Session::new(FakeApi::new());
    let report = tokio_test::block_on(upgrade_all(&session, &[]));

    assert_eq!(report.attempted(), 0);
    assert_eq!(report.summary(), "Upgraded 0 apps");
}
