//! `PostgreSQL`-backed confirmed purchase ledger.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tessera_core::{
    ConfirmedPurchase, ConfirmedPurchaseLedger, EventId, PurchaseId, ReservationError, Result,
    TicketQuantity, UserId,
};
use uuid::Uuid;

/// `PostgreSQL`-backed, append-only purchase ledger.
///
/// Rows are inserted by confirm and never updated or deleted by the
/// engine; the table is the audit trail of every finalized sale.
///
/// # Example
///
/// ```no_run
/// use tessera_postgres::PostgresPurchaseLedger;
/// use sqlx::PgPool;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = PgPool::connect("postgresql://localhost/tessera").await?;
/// let ledger = PostgresPurchaseLedger::new(pool);
/// ledger.migrate().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PostgresPurchaseLedger {
    /// `PostgreSQL` connection pool.
    pool: PgPool,
}

impl PostgresPurchaseLedger {
    /// Create a new ledger over an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns error if migrations fail.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ReservationError::Ledger(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Map a `confirmed_purchases` row into the domain record.
    fn row_to_purchase(row: &PgRow) -> Result<ConfirmedPurchase> {
        let purchase_id: Uuid = row
            .try_get("purchase_id")
            .map_err(|e| ReservationError::Ledger(format!("Failed to read row: {e}")))?;
        let event_id: Uuid = row
            .try_get("event_id")
            .map_err(|e| ReservationError::Ledger(format!("Failed to read row: {e}")))?;
        let customer_name: String = row
            .try_get("customer_name")
            .map_err(|e| ReservationError::Ledger(format!("Failed to read row: {e}")))?;
        let customer_email: String = row
            .try_get("customer_email")
            .map_err(|e| ReservationError::Ledger(format!("Failed to read row: {e}")))?;
        let purchased_qty: i32 = row
            .try_get("purchased_qty")
            .map_err(|e| ReservationError::Ledger(format!("Failed to read row: {e}")))?;
        let purchase_date: DateTime<Utc> = row
            .try_get("purchase_date")
            .map_err(|e| ReservationError::Ledger(format!("Failed to read row: {e}")))?;
        let linked_user_id: Option<Uuid> = row
            .try_get("linked_user_id")
            .map_err(|e| ReservationError::Ledger(format!("Failed to read row: {e}")))?;

        // The CHECK constraint keeps quantities strictly positive; a row
        // that violates it anyway is corrupt, not a business rejection.
        let quantity = u32::try_from(purchased_qty)
            .ok()
            .and_then(TicketQuantity::new)
            .ok_or_else(|| {
                ReservationError::Ledger(format!(
                    "Corrupt ledger row {purchase_id}: non-positive quantity {purchased_qty}"
                ))
            })?;

        Ok(ConfirmedPurchase {
            id: PurchaseId::from_uuid(purchase_id),
            event_id: EventId::from_uuid(event_id),
            customer_name,
            customer_email,
            quantity,
            purchase_date,
            linked_user_id: linked_user_id.map(UserId::from_uuid),
        })
    }
}

impl ConfirmedPurchaseLedger for PostgresPurchaseLedger {
    async fn count_for_event(&self, event_id: EventId) -> Result<u32> {
        let total: (i64,) = sqlx::query_as(
            r"
            SELECT COALESCE(SUM(purchased_qty), 0)
            FROM confirmed_purchases
            WHERE event_id = $1
            ",
        )
        .bind(event_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ReservationError::Ledger(format!("Failed to count purchases: {e}")))?;

        Ok(u32::try_from(total.0).unwrap_or(u32::MAX))
    }

    async fn append(&self, purchase: &ConfirmedPurchase) -> Result<()> {
        let quantity = i32::try_from(purchase.quantity.get()).map_err(|_| {
            ReservationError::Ledger(format!(
                "Quantity {} does not fit the ledger column",
                purchase.quantity
            ))
        })?;

        sqlx::query(
            r"
            INSERT INTO confirmed_purchases (
                purchase_id, event_id, customer_name, customer_email,
                purchased_qty, purchase_date, linked_user_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(purchase.id.as_uuid())
        .bind(purchase.event_id.as_uuid())
        .bind(&purchase.customer_name)
        .bind(&purchase.customer_email)
        .bind(quantity)
        .bind(purchase.purchase_date)
        .bind(purchase.linked_user_id.map(|u| *u.as_uuid()))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return ReservationError::DuplicatePurchase(purchase.id);
                }
            }
            ReservationError::Ledger(format!("Failed to append purchase: {e}"))
        })?;

        tracing::info!(
            purchase_id = %purchase.id,
            event_id = %purchase.event_id,
            quantity = purchase.quantity.get(),
            "purchase appended to ledger"
        );

        metrics::counter!("ledger.purchases.appended").increment(1);

        Ok(())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<ConfirmedPurchase>> {
        let rows = sqlx::query(
            r"
            SELECT
                purchase_id, event_id, customer_name, customer_email,
                purchased_qty, purchase_date, linked_user_id
            FROM confirmed_purchases
            WHERE linked_user_id = $1
            ORDER BY purchase_date DESC
            ",
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ReservationError::Ledger(format!("Failed to list purchases: {e}")))?;

        rows.iter().map(Self::row_to_purchase).collect()
    }

    async fn list_for_event(&self, event_id: EventId) -> Result<Vec<ConfirmedPurchase>> {
        let rows = sqlx::query(
            r"
            SELECT
                purchase_id, event_id, customer_name, customer_email,
                purchased_qty, purchase_date, linked_user_id
            FROM confirmed_purchases
            WHERE event_id = $1
            ORDER BY purchase_date DESC
            ",
        )
        .bind(event_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ReservationError::Ledger(format!("Failed to list purchases: {e}")))?;

        rows.iter().map(Self::row_to_purchase).collect()
    }
}
