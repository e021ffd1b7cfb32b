//! PostgreSQL loan repository implementation

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::loan::{Loan, LoanId, LoanQuery, LoanRepository, LoanStatus, SortOrder};
use crate::domain::user::UserId;
use crate::domain::DomainError;
use crate::infrastructure::storage::{read_error, write_error, OperationTimeout};

/// PostgreSQL implementation of LoanRepository
#[derive(Debug, Clone)]
pub struct PostgresLoanRepository {
    pool: PgPool,
    timeout: OperationTimeout,
}

impl PostgresLoanRepository {
    pub fn new(pool: PgPool, timeout: OperationTimeout) -> Self {
        Self { pool, timeout }
    }
}

/// Build the listing statement; `seq` preserves insertion order
fn list_sql(query: &LoanQuery) -> String {
    let mut sql = String::from("SELECT id, amount, user_id, status, created_at FROM loans");

    if query.status.is_some() {
        sql.push_str(" WHERE status = $1");
    }

    sql.push_str(match query.effective_order() {
        Some(SortOrder::Ascending) => " ORDER BY created_at ASC, seq ASC",
        Some(SortOrder::Descending) => " ORDER BY created_at DESC, seq ASC",
        None => " ORDER BY seq ASC",
    });

    sql
}

#[async_trait]
impl LoanRepository for PostgresLoanRepository {
    async fn insert(&self, loan: Loan) -> Result<Loan, DomainError> {
        self.timeout
            .run("insert_loan", async {
                sqlx::query(
                    r#"
                    INSERT INTO loans (id, amount, user_id, status, created_at)
                    VALUES ($1, $2, $3, $4, $5)
                    "#,
                )
                .bind(loan.id().as_uuid())
                .bind(loan.amount())
                .bind(loan.user_id().as_uuid())
                .bind(loan.status().as_str())
                .bind(loan.created_at())
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    write_error(e, |_| {
                        DomainError::conflict(format!("Loan with ID '{}' already exists", loan.id()))
                    })
                })?;

                Ok(())
            })
            .await?;

        Ok(loan)
    }

    async fn update(&self, loan: &Loan) -> Result<Loan, DomainError> {
        let affected = self
            .timeout
            .run("update_loan", async {
                let result = sqlx::query(
                    "UPDATE loans SET amount = $3, status = $4 WHERE id = $1 AND user_id = $2",
                )
                .bind(loan.id().as_uuid())
                .bind(loan.user_id().as_uuid())
                .bind(loan.amount())
                .bind(loan.status().as_str())
                .execute(&self.pool)
                .await
                .map_err(|e| DomainError::store_write_failed(format!("Failed to update loan: {}", e)))?;

                Ok(result.rows_affected())
            })
            .await?;

        if affected == 0 {
            return Err(DomainError::not_found(format!("Loan '{}' not found", loan.id())));
        }

        Ok(loan.clone())
    }

    async fn find_by_id(&self, id: &LoanId) -> Result<Option<Loan>, DomainError> {
        self.timeout
            .run("find_loan_by_id", async {
                let row = sqlx::query(
                    "SELECT id, amount, user_id, status, created_at FROM loans WHERE id = $1",
                )
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| read_error("Failed to get loan", e))?;

                row.as_ref().map(row_to_loan).transpose()
            })
            .await
    }

    async fn list(&self, query: LoanQuery) -> Result<Vec<Loan>, DomainError> {
        let sql = list_sql(&query);

        self.timeout
            .run("list_loans", async {
                let mut statement = sqlx::query(&sql);
                if let Some(status) = query.status {
                    statement = statement.bind(status.as_str());
                }

                let rows = statement
                    .fetch_all(&self.pool)
                    .await
                    .map_err(|e| read_error("Failed to list loans", e))?;

                rows.iter().map(row_to_loan).collect()
            })
            .await
    }
}

fn row_to_loan(row: &PgRow) -> Result<Loan, DomainError> {
    let field = |e: sqlx::Error| read_error("Failed to decode loan row", e);

    let id: Uuid = row.try_get("id").map_err(field)?;
    let user_id: Uuid = row.try_get("user_id").map_err(field)?;
    let status: String = row.try_get("status").map_err(field)?;

    Ok(Loan::restore(
        LoanId::from(id),
        row.try_get("amount").map_err(field)?,
        UserId::from(user_id),
        status.parse::<LoanStatus>()?,
        row.try_get("created_at").map_err(field)?,
    ))
}
