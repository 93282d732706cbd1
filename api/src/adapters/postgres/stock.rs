//! Stock reservation shared by checkout and billing
//!
//! Both run inside a transaction: the product rows are locked, every line
//! is checked before anything is written, and then each product is
//! decremented with a guarded update.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

use crate::domain::entities::{add_quantities, OrganizationId, PricedLine, Product, ProductId};
use crate::entity::products;
use crate::error::DomainError;

/// Merge duplicate products, keeping first-seen order
fn merge_lines(lines: &[(ProductId, i32)]) -> Result<Vec<(ProductId, i32)>, DomainError> {
    if lines.is_empty() {
        return Err(DomainError::Validation(
            "At least one item is required".to_string(),
        ));
    }

    let mut merged: Vec<(ProductId, i32)> = Vec::with_capacity(lines.len());
    for &(product_id, quantity) in lines {
        if quantity <= 0 {
            return Err(DomainError::Validation(format!(
                "Quantity for product {} must be positive",
                product_id
            )));
        }
        match merged.iter_mut().find(|(id, _)| *id == product_id) {
            Some((_, total)) => *total = add_quantities(*total, quantity)?,
            None => merged.push((product_id, quantity)),
        }
    }
    Ok(merged)
}

/// Lock, check and decrement stock for every line; returns the lines
/// priced at the current catalog price
pub(super) async fn reserve_stock<C: ConnectionTrait>(
    conn: &C,
    org_id: &OrganizationId,
    lines: &[(ProductId, i32)],
) -> Result<Vec<PricedLine>, DomainError> {
    let lines = merge_lines(lines)?;
    let ids: Vec<_> = lines.iter().map(|(id, _)| id.0).collect();

    // Lock in id order so concurrent checkouts cannot deadlock
    let locked: HashMap<_, Product> = products::Entity::find()
        .filter(products::Column::Id.is_in(ids))
        .filter(products::Column::OrganizationId.eq(org_id.0))
        .order_by_asc(products::Column::Id)
        .lock_exclusive()
        .all(conn)
        .await?
        .into_iter()
        .map(|m| (ProductId(m.id), Product::from(m)))
        .collect();

    let mut priced = Vec::with_capacity(lines.len());
    for &(product_id, quantity) in &lines {
        let product = locked
            .get(&product_id)
            .ok_or_else(|| DomainError::NotFound(format!("Product {} not found", product_id)))?;
        product.ensure_stock(quantity)?;
        priced.push(PricedLine {
            product_id,
            product_name: product.name.clone(),
            unit_price: product.price,
            quantity,
        });
    }

    let now = Utc::now().fixed_offset();
    for line in &priced {
        let result = products::Entity::update_many()
            .col_expr(
                products::Column::StockQuantity,
                Expr::col(products::Column::StockQuantity).sub(line.quantity),
            )
            .col_expr(products::Column::UpdatedAt, Expr::value(now))
            .filter(products::Column::Id.eq(line.product_id.0))
            .filter(products::Column::StockQuantity.gte(line.quantity))
            .exec(conn)
            .await?;

        if result.rows_affected != 1 {
            return Err(DomainError::Conflict(format!(
                "Stock for '{}' changed during checkout",
                line.product_name
            )));
        }
    }

    Ok(priced)
}

/// Return quantities to stock
pub(super) async fn release_stock<C: ConnectionTrait>(
    conn: &C,
    lines: &[(ProductId, i32)],
) -> Result<(), DomainError> {
    let now = Utc::now().fixed_offset();
    for &(product_id, quantity) in lines {
        products::Entity::update_many()
            .col_expr(
                products::Column::StockQuantity,
                Expr::col(products::Column::StockQuantity).add(quantity),
            )
            .col_expr(products::Column::UpdatedAt, Expr::value(now))
            .filter(products::Column::Id.eq(product_id.0))
            .exec(conn)
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_products_are_merged() {
        let a = ProductId::new();
        let b = ProductId::new();

        let merged = merge_lines(&[(a, 2), (b, 1), (a, 3)]).unwrap();

        assert_eq!(merged, vec![(a, 5), (b, 1)]);
    }

    #[test]
    fn empty_and_non_positive_lines_are_rejected() {
        assert!(merge_lines(&[]).is_err());
        assert!(merge_lines(&[(ProductId::new(), 0)]).is_err());
        assert!(merge_lines(&[(ProductId::new(), -1)]).is_err());
    }

    #[test]
    fn merged_quantity_overflow_is_a_validation_error() {
        let a = ProductId::new();

        let result = merge_lines(&[(a, i32::MAX), (a, 1)]);

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }
}
