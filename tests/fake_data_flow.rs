mod common;

use account_service::db::fake::{FakeReport, FakeUser};
use account_service::types::permission::RoleKind;
use common::TestContext;

fn user(n: usize, email: &str) -> FakeUser {
    FakeUser {
        first_name: format!("First{n}"),
        last_name: format!("Last{n}"),
        email: email.to_string(),
        role_id: None,
    }
}

#[tokio::test]
async fn test_one_duplicate_in_a_hundred_commits_ninety_nine() {
    println!("\n\n[+] Running test: test_one_duplicate_in_a_hundred_commits_ninety_nine");
    let ctx = TestContext::new().await;

    let mut batch: Vec<FakeUser> = (0..99)
        .map(|n| user(n, &format!("fake{n}@example.com")))
        .collect();
    batch.insert(50, user(99, "fake7@example.com"));
    assert_eq!(batch.len(), 100);

    let report = ctx.db.insert_fake_users(batch).await.expect("fake insert failed");
    assert_eq!(report, FakeReport { inserted: 99, skipped: 1 });
    assert_eq!(ctx.db.count_users().await.unwrap(), 99);

    // the rows after the duplicate still made it
    assert!(ctx.db.user_exists_by_email("fake98@example.com").await.unwrap());
    println!("[/] Test passed");
}

#[tokio::test]
async fn test_fake_users_skip_existing_accounts() {
    let ctx = TestContext::new().await;
    let role = ctx.db.get_role_by_name(RoleKind::General.name()).await.unwrap();

    let first = ctx
        .db
        .insert_fake_users(vec![user(0, "a@example.com"), user(1, "b@example.com")])
        .await
        .unwrap();
    assert_eq!(first, FakeReport { inserted: 2, skipped: 0 });

    let mut again = user(2, "b@example.com");
    again.role_id = Some(role.id);
    let second = ctx
        .db
        .insert_fake_users(vec![again, user(3, "c@example.com")])
        .await
        .unwrap();
    assert_eq!(second, FakeReport { inserted: 1, skipped: 1 });
    assert_eq!(ctx.db.count_users().await.unwrap(), 3);

    let all_confirmed = ctx
        .db
        .list_users_with_roles()
        .await
        .unwrap()
        .iter()
        .all(|(u, _)| u.confirmed);
    assert!(all_confirmed);
}

#[tokio::test]
async fn test_generate_fake_assigns_seeded_roles() {
    let ctx = TestContext::new().await;

    let report = ctx.db.generate_fake(10).await.unwrap();
    assert_eq!(report.inserted + report.skipped, 10);
    assert_eq!(ctx.db.count_users().await.unwrap() as usize, report.inserted);

    for (_, role) in ctx.db.list_users_with_roles().await.unwrap() {
        let role = role.expect("fake user without role");
        assert!(RoleKind::from_name(&role.name).is_some());
    }
}

#[tokio::test]
async fn test_role_seeding_is_idempotent() {
    let ctx = TestContext::new().await;

    let again = ctx.db.insert_roles().await.unwrap();
    assert_eq!(again.len(), RoleKind::ALL.len());
    let roles = ctx.db.list_roles().await.unwrap();
    assert_eq!(roles.len(), 2);
    assert_eq!(roles[0].name, "User");
    assert_eq!(roles[0].permissions, 0x01);
    assert!(roles[0].is_default);
    assert_eq!(roles[1].name, "Administrator");
    assert_eq!(roles[1].permissions, 0xff);
    assert!(!roles[1].is_default);

    let default = ctx.db.default_role().await.unwrap().unwrap();
    assert_eq!(default.name, "User");
    assert_eq!(ctx.db.get_role(default.id).await.unwrap(), default);
}
