use anyhow::Result;
use std::io::Read;

use crate::domain::{parse_amount, NewUserBalance};
use crate::storage::Repository;

/// Result of an import operation
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    pub imported: usize,
    pub errors: Vec<ImportError>,
}

/// Error that occurred during import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportError {
    pub line: usize,
    pub field: Option<String>,
    pub error: String,
}

/// Options for import operations
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Validate every row without writing anything
    pub dry_run: bool,
}

/// Importer for seeding balance records
pub struct Importer<'a> {
    repo: &'a Repository,
}

impl<'a> Importer<'a> {
    pub fn new(repo: &'a Repository) -> Self {
        Self { repo }
    }

    /// Import balance records from CSV.
    ///
    /// Expected columns: `username,balance,bank_code,account_no,account_name`.
    /// Bad rows are reported and skipped; the rest are imported.
    pub async fn import_user_balances_csv<R: Read>(
        &self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let mut result = ImportResult::default();

        for parsed in parse_user_balances_csv(reader) {
            let (line, user) = match parsed {
                Ok(row) => row,
                Err(error) => {
                    result.errors.push(error);
                    continue;
                }
            };

            if options.dry_run {
                result.imported += 1;
                continue;
            }

            match self.repo.insert_user_balance(&user).await {
                Ok(_) => result.imported += 1,
                Err(e) => result.errors.push(ImportError {
                    line,
                    field: None,
                    error: format!("Insert failed: {:#}", e),
                }),
            }
        }

        Ok(result)
    }
}

/// Parse balance records from CSV, yielding each row with its line number.
pub fn parse_user_balances_csv<R: Read>(
    reader: R,
) -> impl Iterator<Item = Result<(usize, NewUserBalance), ImportError>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let records: Vec<_> = csv_reader.records().collect();

    records
        .into_iter()
        .enumerate()
        .map(|(line_num, record)| {
            let line = line_num + 2; // +2 for header and 0-indexing
            let record = record.map_err(|e| ImportError {
                line,
                field: None,
                error: format!("CSV parse error: {}", e),
            })?;
            parse_row(line, &record).map(|user| (line, user))
        })
}

fn parse_row(line: usize, record: &csv::StringRecord) -> Result<NewUserBalance, ImportError> {
    let field = |index: usize, name: &str| -> Result<String, ImportError> {
        match record.get(index) {
            Some(value) if !value.is_empty() => Ok(value.to_string()),
            _ => Err(ImportError {
                line,
                field: Some(name.to_string()),
                error: "Missing value".to_string(),
            }),
        }
    };

    let username = field(0, "username")?;
    let balance_str = field(1, "balance")?;
    let bank_code = field(2, "bank_code")?;
    let account_no = field(3, "account_no")?;
    let account_name = field(4, "account_name")?;

    let balance = parse_amount(&balance_str).map_err(|e| ImportError {
        line,
        field: Some("balance".to_string()),
        error: format!("Invalid balance: {}", e),
    })?;

    Ok(NewUserBalance::new(
        username,
        balance,
        bank_code,
        account_no,
        account_name,
    ))
}
