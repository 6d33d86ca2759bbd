use std::sync::Arc;

use budget_core::commands::{add_budget, add_transaction, TransactionDraft};
use budget_core::remote::documents::to_document;
use budget_core::remote::{Collection, MemoryRemoteStore, RemoteStore};
use budget_core::report::{budget_progress, category_spending, current_month_range};
use budget_core::repository::{MirrorOutcome, Repository};
use budget_core::storage::{Budget, Category, SqliteStore, Transaction, TransactionFilter};
use chrono::{Datelike, Duration, TimeZone, Utc};
use rust_decimal_macros::dec;

fn setup() -> (Repository<SqliteStore>, Arc<MemoryRemoteStore>) {
    let local = Arc::new(SqliteStore::open_in_memory().expect("open should succeed"));
    let remote = Arc::new(MemoryRemoteStore::new());
    (Repository::new(local, remote.clone()), remote)
}

#[tokio::test]
async fn test_electricity_bill_scenario() {
    let (repo, remote) = setup();
    let now = Utc::now();
    repo.ensure_default_categories(Some("u1")).unwrap();

    let saved = add_transaction(
        &repo,
        "u1",
        TransactionDraft {
            amount: dec!(50.0),
            description: "Electricity bill".to_string(),
            date: now,
            category_id: 5,
            is_income: false,
        },
        now,
    )
    .unwrap()
    .expect("valid transaction is written");
    assert_eq!(saved.mirror.wait().await, MirrorOutcome::Mirrored);

    let budget = add_budget(&repo, "u1", dec!(100.0), 5, now)
        .unwrap()
        .expect("valid budget is written");
    budget.mirror.wait().await;

    let month = repo
        .transactions("u1", TransactionFilter::new().range(current_month_range(now)))
        .current()
        .unwrap();
    let spending = category_spending(&month);
    assert_eq!(spending.len(), 1);
    assert_eq!(spending[&5], dec!(50));

    let budgets = repo.budgets_for_current_month("u1").current().unwrap();
    let progress = budget_progress(&budgets, &spending);
    assert_eq!(progress.len(), 1);
    assert_eq!(progress[0].percentage, dec!(50));
    assert!(!progress[0].near_limit);
    assert!(!progress[0].over_limit);

    assert_eq!(remote.documents(Collection::Transactions).len(), 1);
    assert_eq!(remote.documents(Collection::Budgets).len(), 1);
    // Seeding never touches the remote side.
    assert!(remote.documents(Collection::Categories).is_empty());
}

#[tokio::test]
async fn test_sync_overwrites_matching_and_inserts_new() {
    let (repo, remote) = setup();
    let yesterday = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
    let now = yesterday + Duration::days(1);

    let local = repo
        .insert("", Transaction::new(dec!(10), "Local copy", yesterday, 1, "u1"))
        .unwrap()
        .into_record();

    let remote_version = Transaction::new(dec!(12), "Remote copy", yesterday, 2, "u1")
        .income()
        .with_id(local.id);
    let remote_new = Transaction::new(dec!(7), "Only remote", now, 3, "u1").with_id(900);
    for tx in [&remote_version, &remote_new] {
        remote
            .set(
                Collection::Transactions,
                &tx.id.to_string(),
                to_document(tx).unwrap(),
            )
            .await
            .unwrap();
    }

    let report = repo.sync_from_remote("u1").await;
    assert!(report.is_complete());
    assert_eq!(report.transactions.updated, 1);
    assert_eq!(report.transactions.inserted, 1);

    let overwritten = repo.get::<Transaction>(local.id).unwrap().unwrap();
    assert_eq!(overwritten, remote_version);
    assert_eq!(repo.get::<Transaction>(900).unwrap(), Some(remote_new));
}

#[tokio::test]
async fn test_sync_pulls_current_month_budgets_and_owner_categories() {
    let (repo, remote) = setup();
    let now = Utc::now();
    let (last_year, this_year) = (now.year() - 1, now.year());

    let current = Budget::new(dec!(400), 1, now.month(), this_year, "u1").with_id(11);
    let stale = Budget::new(dec!(300), 1, now.month(), last_year, "u1").with_id(12);
    let foreign = Budget::new(dec!(200), 1, now.month(), this_year, "u2").with_id(13);
    for budget in [&current, &stale, &foreign] {
        remote
            .set(
                Collection::Budgets,
                &budget.id.to_string(),
                to_document(budget).unwrap(),
            )
            .await
            .unwrap();
    }
    let category = Category::new("Garden", 0x2E7D32).with_id(20).with_owner("u1");
    remote
        .set(Collection::Categories, "20", to_document(&category).unwrap())
        .await
        .unwrap();

    let report = repo.spawn_sync("u1").await.unwrap();
    assert_eq!(report.budgets.inserted, 1);
    assert_eq!(report.categories.inserted, 1);

    let budgets = repo.budgets("u1").current().unwrap();
    assert_eq!(budgets, vec![current]);
    assert_eq!(repo.category(20).current().unwrap(), Some(category));
}

#[tokio::test]
async fn test_sync_is_repeatable() {
    let (repo, remote) = setup();
    let tx = Transaction::new(dec!(3), "Snack", Utc::now(), 1, "u1").with_id(5);
    remote
        .set(Collection::Transactions, "5", to_document(&tx).unwrap())
        .await
        .unwrap();

    let first = repo.sync_from_remote("u1").await;
    let second = repo.sync_from_remote("u1").await;

    assert_eq!(first.transactions.inserted, 1);
    assert_eq!(second.transactions.updated, 1);
    assert_eq!(
        repo.transactions("u1", TransactionFilter::new())
            .current()
            .unwrap()
            .len(),
        1
    );
}
