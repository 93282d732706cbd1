//! PostgreSQL adapter for BillRepository

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::domain::entities::{
    Bill, BillFilter, BillId, BillItem, BillTotals, BillWithItems, NewBill, OrganizationId,
    PaymentState, PaymentStatus, ProductId, UserId,
};
use crate::domain::ports::BillRepository;
use crate::entity::{bill_items, bills};
use crate::error::DomainError;

use super::finish;
use super::stock::reserve_stock;

/// PostgreSQL implementation of BillRepository
pub struct PostgresBillRepository {
    db: DatabaseConnection,
}

impl PostgresBillRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Midnight UTC at the start of `date`
fn day_start(date: NaiveDate) -> chrono::DateTime<chrono::FixedOffset> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default())
        .fixed_offset()
}

async fn create_in<C: ConnectionTrait>(
    conn: &C,
    bill: &NewBill,
) -> Result<BillWithItems, DomainError> {
    let lines: Vec<_> = bill
        .lines
        .iter()
        .map(|l| (l.product_id, l.quantity))
        .collect();
    let priced = reserve_stock(conn, &bill.organization_id, &lines).await?;

    let totals = BillTotals::compute(&priced, &bill.adjustments, bill.default_tax_percentage)?;
    let payment = PaymentState::resolve(totals.total_amount, bill.paid_amount)?;

    let now = Utc::now().fixed_offset();
    let bill_id = Uuid::new_v4();
    let model = bills::ActiveModel {
        id: Set(bill_id),
        organization_id: Set(bill.organization_id.0),
        bill_number: Set(bill.bill_number.clone()),
        customer_name: Set(bill.customer_name.clone()),
        customer_phone: Set(bill.customer_phone.clone()),
        subtotal: Set(totals.subtotal),
        discount_amount: Set(totals.discount_amount),
        tax_amount: Set(totals.tax_amount),
        total_amount: Set(totals.total_amount),
        paid_amount: Set(payment.paid_amount),
        due_amount: Set(payment.due_amount),
        payment_status: Set(payment.status.to_string()),
        payment_method: Set(bill.payment_method.clone()),
        notes: Set(bill.notes.clone()),
        created_by: Set(bill.created_by.map(|id| id.0)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await?;

    let mut items = Vec::with_capacity(priced.len());
    for line in &priced {
        let item = bill_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            bill_id: Set(bill_id),
            product_id: Set(line.product_id.0),
            product_name: Set(line.product_name.clone()),
            unit_price: Set(line.unit_price),
            quantity: Set(line.quantity),
            line_total: Set(line.line_total()),
        }
        .insert(conn)
        .await?;
        items.push(item.into());
    }

    Ok(BillWithItems {
        bill: model.into(),
        items,
    })
}

async fn record_payment_in<C: ConnectionTrait>(
    conn: &C,
    id: &BillId,
    amount: f64,
) -> Result<Bill, DomainError> {
    if amount <= 0.0 {
        return Err(DomainError::Validation(
            "Payment amount must be positive".to_string(),
        ));
    }

    let current = bills::Entity::find_by_id(id.0)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("Bill {} not found", id)))?;

    let payment = PaymentState::resolve(current.total_amount, current.paid_amount + amount)?;

    let mut model: bills::ActiveModel = current.into();
    model.paid_amount = Set(payment.paid_amount);
    model.due_amount = Set(payment.due_amount);
    model.payment_status = Set(payment.status.to_string());
    model.updated_at = Set(Utc::now().fixed_offset());
    let updated = model.update(conn).await?;

    Ok(updated.into())
}

#[async_trait]
impl BillRepository for PostgresBillRepository {
    async fn create(&self, bill: &NewBill) -> Result<BillWithItems, DomainError> {
        let txn = self.db.begin().await?;
        let result = create_in(&txn, bill).await;
        finish(txn, result).await
    }

    async fn find_by_id(&self, id: &BillId) -> Result<Option<BillWithItems>, DomainError> {
        let Some(bill) = bills::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        let items = bill_items::Entity::find()
            .filter(bill_items::Column::BillId.eq(bill.id))
            .order_by_asc(bill_items::Column::ProductName)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(Some(BillWithItems {
            bill: bill.into(),
            items: items.into_iter().map(|m| m.into()).collect(),
        }))
    }

    async fn list(
        &self,
        org_id: &OrganizationId,
        filter: &BillFilter,
    ) -> Result<Vec<Bill>, DomainError> {
        let mut query = bills::Entity::find().filter(bills::Column::OrganizationId.eq(org_id.0));
        if let Some(status) = filter.payment_status {
            query = query.filter(bills::Column::PaymentStatus.eq(status.to_string()));
        }
        if let Some(from) = filter.from {
            query = query.filter(bills::Column::CreatedAt.gte(day_start(from)));
        }
        if let Some(to) = filter.to.and_then(|d| d.succ_opt()) {
            query = query.filter(bills::Column::CreatedAt.lt(day_start(to)));
        }
        query = query.order_by_desc(bills::Column::CreatedAt).offset(filter.offset);
        if filter.limit > 0 {
            query = query.limit(filter.limit);
        }

        let results = query
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn record_payment(&self, id: &BillId, amount: f64) -> Result<Bill, DomainError> {
        let txn = self.db.begin().await?;
        let result = record_payment_in(&txn, id, amount).await;
        finish(txn, result).await
    }
}

/// Convert SeaORM model to domain entity
impl From<bills::Model> for Bill {
    fn from(model: bills::Model) -> Self {
        Bill {
            id: BillId(model.id),
            organization_id: OrganizationId(model.organization_id),
            bill_number: model.bill_number,
            customer_name: model.customer_name,
            customer_phone: model.customer_phone,
            subtotal: model.subtotal,
            discount_amount: model.discount_amount,
            tax_amount: model.tax_amount,
            total_amount: model.total_amount,
            paid_amount: model.paid_amount,
            due_amount: model.due_amount,
            payment_status: model
                .payment_status
                .parse()
                .unwrap_or_else(|_| PaymentStatus::derive(model.total_amount, model.paid_amount)),
            payment_method: model.payment_method,
            notes: model.notes,
            created_by: model.created_by.map(UserId),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<bill_items::Model> for BillItem {
    fn from(model: bill_items::Model) -> Self {
        BillItem {
            id: model.id,
            bill_id: BillId(model.bill_id),
            product_id: ProductId(model.product_id),
            product_name: model.product_name,
            unit_price: model.unit_price,
            quantity: model.quantity,
            line_total: model.line_total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_start_is_midnight_utc() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(day_start(date).to_rfc3339(), "2024-03-15T00:00:00+00:00");
    }
}
