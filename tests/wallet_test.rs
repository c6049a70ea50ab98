mod common;

use std::sync::Arc;

use anyhow::Result;
use common::{test_repository, StubPartner};
use ppr_wallet::application::{AppError, WalletService};
use ppr_wallet::domain::{
    account_balance, demo_users, trial_balance, AccountRef, NewUserBalance,
    DISBURSEMENT_TRANSACTION_NAME,
};
use ppr_wallet::io::{Exporter, ImportOptions, Importer};
use ppr_wallet::storage::Repository;

/// Service backed by the SQLite repository and a scripted partner.
fn sqlite_service(repo: &Repository, partner: Arc<StubPartner>) -> WalletService {
    let store = Arc::new(repo.clone());
    WalletService::new(store.clone(), store, partner)
}

#[tokio::test]
async fn test_disbursement_through_sqlite() -> Result<()> {
    let (repo, _temp) = test_repository().await?;
    let user = repo
        .insert_user_balance(&NewUserBalance::new(
            "andy123", 10000, "bca", "0810", "Andy",
        ))
        .await?;
    let partner = Arc::new(StubPartner::ok());
    let service = sqlite_service(&repo, partner.clone());

    let disbursement = service.disburse_balance(user.id).await?;

    let stored = repo.get_user_balance(user.id).await?.unwrap();
    assert_eq!(stored.balance, 0);
    assert!(stored.updated_at >= user.updated_at);

    let entries = repo.list_journal_entries().await?;
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.folio == disbursement.reference_id));
    assert!(entries
        .iter()
        .all(|e| e.transaction_name == DISBURSEMENT_TRANSACTION_NAME));
    assert_eq!(
        account_balance(&AccountRef::Internal(user.id), &entries),
        10000
    );
    assert_eq!(
        account_balance(&AccountRef::External("0810".into()), &entries),
        -10000
    );
    assert!(trial_balance(&entries).is_balanced());
    assert_eq!(partner.call_count(), 1);

    Ok(())
}

#[tokio::test]
async fn test_declined_payout_leaves_sqlite_untouched() -> Result<()> {
    let (repo, _temp) = test_repository().await?;
    let user = repo
        .insert_user_balance(&NewUserBalance::new(
            "cindy789",
            8000,
            "cempakabank",
            "11298800345",
            "Cindy Kat",
        ))
        .await?;
    let service = sqlite_service(&repo, Arc::new(StubPartner::declining("failed")));

    let result = service.disburse_balance(user.id).await;

    assert!(matches!(result, Err(AppError::PartnerError { .. })));
    assert_eq!(repo.get_user_balance(user.id).await?.unwrap().balance, 8000);
    assert!(repo.list_journal_entries().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_unknown_user_in_sqlite_is_not_found() -> Result<()> {
    let (repo, _temp) = test_repository().await?;
    let partner = Arc::new(StubPartner::ok());
    let service = sqlite_service(&repo, partner.clone());

    let result = service.disburse_balance(42).await;

    assert!(matches!(result, Err(AppError::UserNotFound(42))));
    assert_eq!(partner.call_count(), 0);

    Ok(())
}

#[tokio::test]
async fn test_demo_users_disburse_independently() -> Result<()> {
    let (repo, _temp) = test_repository().await?;
    let mut ids = Vec::new();
    for user in demo_users() {
        ids.push(repo.insert_user_balance(&user).await?.id);
    }
    let partner = Arc::new(StubPartner::ok());
    let service = sqlite_service(&repo, partner.clone());

    for id in &ids {
        service.disburse_balance(*id).await?;
    }

    let users = repo.list_user_balances().await?;
    assert!(users.iter().all(|u| u.balance == 0));

    let entries = repo.list_journal_entries().await?;
    assert_eq!(entries.len(), 6);
    let totals = trial_balance(&entries);
    assert_eq!(totals.total_debits, 10000 + 15000 + 8000);
    assert!(totals.is_balanced());

    let sent: Vec<_> = partner
        .requests()
        .iter()
        .map(|r| r.account.account_no.clone())
        .collect();
    assert_eq!(sent, ["083012322138", "0810123456878", "11298800345"]);

    Ok(())
}

#[tokio::test]
async fn test_import_then_export_balances() -> Result<()> {
    let (repo, _temp) = test_repository().await?;
    let csv = "username,balance,bank_code,account_no,account_name\n\
               andy123,10.000,arthagraha,083012322138,Andy Garcia\n\
               broken,-5,bca,0810,Nobody\n\
               brandy345,15000,bca,0810123456878,Brandy Joe\n";

    let result = Importer::new(&repo)
        .import_user_balances_csv(csv.as_bytes(), ImportOptions::default())
        .await?;

    assert_eq!(result.imported, 2);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].line, 3);
    assert_eq!(result.errors[0].field.as_deref(), Some("balance"));

    let mut out = Vec::new();
    let count = Exporter::new(&repo)
        .export_user_balances_csv(&mut out)
        .await?;
    assert_eq!(count, 2);

    let exported = String::from_utf8(out)?;
    let lines: Vec<_> = exported.lines().collect();
    assert_eq!(lines[0], "username,balance,bank_code,account_no,account_name");
    assert_eq!(lines[1], "andy123,10000,arthagraha,083012322138,Andy Garcia");
    assert_eq!(lines[2], "brandy345,15000,bca,0810123456878,Brandy Joe");

    Ok(())
}

#[tokio::test]
async fn test_dry_run_import_writes_nothing() -> Result<()> {
    let (repo, _temp) = test_repository().await?;
    let csv = "username,balance,bank_code,account_no,account_name\n\
               andy123,10000,arthagraha,083012322138,Andy Garcia\n";

    let result = Importer::new(&repo)
        .import_user_balances_csv(csv.as_bytes(), ImportOptions { dry_run: true })
        .await?;

    assert_eq!(result.imported, 1);
    assert!(repo.list_user_balances().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_journal_export_after_disbursement() -> Result<()> {
    let (repo, _temp) = test_repository().await?;
    let user = repo
        .insert_user_balance(&NewUserBalance::new(
            "andy123", 10000, "bca", "0810", "Andy",
        ))
        .await?;
    let disbursement = sqlite_service(&repo, Arc::new(StubPartner::ok()))
        .disburse_balance(user.id)
        .await?;

    let mut out = Vec::new();
    let count = Exporter::new(&repo).export_journal_csv(&mut out).await?;
    assert_eq!(count, 2);

    let exported = String::from_utf8(out)?;
    assert!(exported.starts_with(
        "id,account_kind,account_id,transaction_name,debit_amount,credit_amount,folio\n"
    ));
    let rows: Vec<_> = exported.lines().skip(1).collect();
    assert!(rows.iter().all(|row| row.ends_with(&disbursement.reference_id)));
    assert!(rows
        .iter()
        .any(|row| row.contains(&format!("internal,{},Balance disbursement,10000,0", user.id))));
    assert!(rows
        .iter()
        .any(|row| row.contains("external,0810,Balance disbursement,0,10000")));

    Ok(())
}
