//! Mock implementations of port traits
//!
//! These are in-memory implementations that can be configured for testing.
//! They store data in memory and allow tests to verify behavior.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::domain::entities::{
    add_quantities, stock_bounds, AttendanceFilter, AttendanceId, AttendanceRecord, AttendanceUpdate, Bill, BillAdjustments,
    BillFilter, BillId, BillItem, BillTotals, BillWithItems, CartItem, CartLine, NewAttendance,
    NewBill, NewOrder, NewOrganization, NewProduct, NewUser, Order, OrderId, OrderItem,
    OrderStatus, OrderWithItems, Organization, OrganizationId, OrganizationUpdate, PaymentState,
    PricedLine, Product, ProductFilter, ProductId, ProductUpdate, User, UserFilter, UserId,
    UserUpdate,
};
use crate::domain::ports::{
    AttendanceRepository, BillRepository, CartRepository, OrderRepository,
    OrganizationRepository, ProductRepository, UserRepository,
};
use crate::error::DomainError;

type Shared<K, V> = Arc<RwLock<HashMap<K, V>>>;

/// Products table shared between the catalog, cart, order and bill mocks
pub type ProductTable = Shared<ProductId, Product>;

fn page<T>(items: Vec<T>, limit: u64, offset: u64) -> Vec<T> {
    let iter = items.into_iter().skip(offset as usize);
    if limit > 0 {
        iter.take(limit as usize).collect()
    } else {
        iter.collect()
    }
}

/// Check every line against stock and price it; nothing is written
fn price_lines(
    products: &HashMap<ProductId, Product>,
    org_id: &OrganizationId,
    lines: &[(ProductId, i32)],
) -> Result<Vec<PricedLine>, DomainError> {
    if lines.is_empty() {
        return Err(DomainError::Validation(
            "At least one item is required".to_string(),
        ));
    }

    let mut merged: Vec<(ProductId, i32)> = Vec::new();
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

    merged
        .into_iter()
        .map(|(product_id, quantity)| {
            let product = products
                .get(&product_id)
                .filter(|p| p.organization_id == *org_id)
                .ok_or_else(|| {
                    DomainError::NotFound(format!("Product {} not found", product_id))
                })?;
            product.ensure_stock(quantity)?;
            Ok(PricedLine {
                product_id,
                product_name: product.name.clone(),
                unit_price: product.price,
                quantity,
            })
        })
        .collect()
}

fn take_stock(products: &mut HashMap<ProductId, Product>, priced: &[PricedLine]) {
    for line in priced {
        if let Some(product) = products.get_mut(&line.product_id) {
            product.stock_quantity -= line.quantity;
        }
    }
}

// ============================================================================
// In-Memory Organization Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryOrganizationRepository {
    orgs: Shared<OrganizationId, Organization>,
}

impl InMemoryOrganizationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with an organization for testing
    pub fn with_org(self, org: Organization) -> Self {
        self.orgs.write().unwrap().insert(org.id, org);
        self
    }
}

#[async_trait]
impl OrganizationRepository for InMemoryOrganizationRepository {
    async fn find_by_id(&self, id: &OrganizationId) -> Result<Option<Organization>, DomainError> {
        Ok(self.orgs.read().unwrap().get(id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Organization>, DomainError> {
        let orgs = self.orgs.read().unwrap();
        Ok(orgs.values().find(|o| o.slug == slug).cloned())
    }

    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<Organization>, DomainError> {
        let mut orgs: Vec<_> = self.orgs.read().unwrap().values().cloned().collect();
        orgs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(orgs, limit, offset))
    }

    async fn create(&self, org: &NewOrganization) -> Result<Organization, DomainError> {
        let mut orgs = self.orgs.write().unwrap();
        if orgs.values().any(|o| o.slug == org.slug) {
            return Err(DomainError::AlreadyExists(format!(
                "Organization slug '{}'",
                org.slug
            )));
        }

        let created = Organization {
            id: OrganizationId::new(),
            name: org.name.clone(),
            slug: org.slug.clone(),
            gst_percentage: org.gst_percentage,
            address: org.address.clone(),
            phone: org.phone.clone(),
            is_active: true,
            created_at: Utc::now(),
        };
        orgs.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: &OrganizationId,
        update: &OrganizationUpdate,
    ) -> Result<Organization, DomainError> {
        let mut orgs = self.orgs.write().unwrap();
        let org = orgs
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("Organization {} not found", id)))?;

        if let Some(name) = &update.name {
            org.name = name.clone();
        }
        if let Some(gst) = update.gst_percentage {
            org.gst_percentage = Some(gst);
        }
        if let Some(address) = &update.address {
            org.address = Some(address.clone());
        }
        if let Some(phone) = &update.phone {
            org.phone = Some(phone.clone());
        }
        if let Some(active) = update.is_active {
            org.is_active = active;
        }
        Ok(org.clone())
    }
}

// ============================================================================
// In-Memory User Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Shared<UserId, User>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a user for testing
    pub fn with_user(self, user: User) -> Self {
        self.users.write().unwrap().insert(user.id, user);
        self
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        Ok(self.users.read().unwrap().get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let email = email.trim().to_lowercase();
        let users = self.users.read().unwrap();
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn list_by_org(
        &self,
        org_id: &OrganizationId,
        filter: &UserFilter,
    ) -> Result<Vec<User>, DomainError> {
        let mut users: Vec<_> = self
            .users
            .read()
            .unwrap()
            .values()
            .filter(|u| u.organization_id == Some(*org_id))
            .filter(|u| filter.role.map_or(true, |r| u.role == r))
            .filter(|u| filter.is_active.map_or(true, |a| u.is_active == a))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }

    async fn create(&self, user: &NewUser) -> Result<User, DomainError> {
        let email = user.email.trim().to_lowercase();
        let mut users = self.users.write().unwrap();
        if users.values().any(|u| u.email == email) {
            return Err(DomainError::AlreadyExists(format!("Email '{}'", email)));
        }

        let created = User {
            id: UserId::new(),
            organization_id: user.organization_id,
            name: user.name.clone(),
            email,
            password_hash: user.password_hash.clone(),
            role: user.role,
            phone: user.phone.clone(),
            base_salary: user.base_salary,
            target_amount: user.target_amount,
            incentive_percentage: user.incentive_percentage,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: &UserId, update: &UserUpdate) -> Result<User, DomainError> {
        let mut users = self.users.write().unwrap();
        let user = users
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("User {} not found", id)))?;

        if let Some(name) = &update.name {
            user.name = name.clone();
        }
        if let Some(phone) = &update.phone {
            user.phone = Some(phone.clone());
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        if let Some(base) = update.base_salary {
            user.base_salary = base;
        }
        if let Some(target) = update.target_amount {
            user.target_amount = target;
        }
        if let Some(pct) = update.incentive_percentage {
            user.incentive_percentage = pct;
        }
        if let Some(active) = update.is_active {
            user.is_active = active;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn update_password(&self, id: &UserId, password_hash: &str) -> Result<(), DomainError> {
        let mut users = self.users.write().unwrap();
        let user = users
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("User {} not found", id)))?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }
}

// ============================================================================
// In-Memory Product Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryProductRepository {
    products: ProductTable,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a product for testing
    pub fn with_product(self, product: Product) -> Self {
        self.products.write().unwrap().insert(product.id, product);
        self
    }

    /// Handle on the product table for the cart, order and bill mocks
    pub fn table(&self) -> ProductTable {
        self.products.clone()
    }

    /// Current stock level, for assertions
    pub fn stock_of(&self, id: &ProductId) -> Option<i32> {
        self.products
            .read()
            .unwrap()
            .get(id)
            .map(|p| p.stock_quantity)
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, DomainError> {
        Ok(self.products.read().unwrap().get(id).cloned())
    }

    async fn list(
        &self,
        org_id: &OrganizationId,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, DomainError> {
        let mut products: Vec<_> = self
            .products
            .read()
            .unwrap()
            .values()
            .filter(|p| p.organization_id == *org_id && filter.matches(p))
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(page(products, filter.limit, filter.offset))
    }

    async fn create(&self, product: &NewProduct) -> Result<Product, DomainError> {
        let created = Product {
            id: ProductId::new(),
            organization_id: product.organization_id,
            name: product.name.clone(),
            sku: product.sku.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            price: product.price,
            stock_quantity: product.stock_quantity,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.products
            .write()
            .unwrap()
            .insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: &ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, DomainError> {
        let mut products = self.products.write().unwrap();
        let product = products
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("Product {} not found", id)))?;

        if let Some(name) = &update.name {
            product.name = name.clone();
        }
        if let Some(sku) = &update.sku {
            product.sku = Some(sku.clone());
        }
        if let Some(description) = &update.description {
            product.description = Some(description.clone());
        }
        if let Some(category) = &update.category {
            product.category = Some(category.clone());
        }
        if let Some(price) = update.price {
            product.price = price;
        }
        if let Some(active) = update.is_active {
            product.is_active = active;
        }
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    async fn adjust_stock(&self, id: &ProductId, delta: i32) -> Result<Product, DomainError> {
        let mut products = self.products.write().unwrap();
        let product = products
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("Product {} not found", id)))?;

        let (floor, ceiling) = stock_bounds(delta)?;
        if product.stock_quantity < floor || product.stock_quantity > ceiling {
            return Err(DomainError::Validation(format!(
                "Stock for '{}' must stay between 0 and {} (current {}, change {})",
                product.name,
                i32::MAX,
                product.stock_quantity,
                delta
            )));
        }
        product.stock_quantity += delta;
        Ok(product.clone())
    }
}

// ============================================================================
// In-Memory Cart Repository
// ============================================================================

type CartRows = Shared<(UserId, ProductId), CartItem>;

pub struct InMemoryCartRepository {
    rows: CartRows,
    products: ProductTable,
}

impl InMemoryCartRepository {
    pub fn new(products: ProductTable) -> Self {
        Self {
            rows: Arc::default(),
            products,
        }
    }

    /// Handle on the cart rows for the order mock
    pub fn rows(&self) -> CartRows {
        self.rows.clone()
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    async fn list(&self, user_id: &UserId) -> Result<Vec<CartLine>, DomainError> {
        let rows = self.rows.read().unwrap();
        let products = self.products.read().unwrap();

        let mut lines: Vec<_> = rows
            .values()
            .filter(|item| item.user_id == *user_id)
            .filter_map(|item| {
                let product = products.get(&item.product_id)?.clone();
                Some(CartLine {
                    item: item.clone(),
                    product,
                })
            })
            .collect();
        lines.sort_by(|a, b| a.item.created_at.cmp(&b.item.created_at));
        Ok(lines)
    }

    async fn add(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: i32,
    ) -> Result<(), DomainError> {
        let mut rows = self.rows.write().unwrap();
        match rows.get_mut(&(*user_id, *product_id)) {
            Some(item) => item.quantity = add_quantities(item.quantity, quantity)?,
            None => {
                rows.insert(
                    (*user_id, *product_id),
                    CartItem {
                        id: Uuid::new_v4(),
                        user_id: *user_id,
                        product_id: *product_id,
                        quantity,
                        created_at: Utc::now(),
                    },
                );
            }
        }
        Ok(())
    }

    async fn set_quantity(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: i32,
    ) -> Result<(), DomainError> {
        if quantity <= 0 {
            return self.remove(user_id, product_id).await;
        }

        let mut rows = self.rows.write().unwrap();
        let item = rows.get_mut(&(*user_id, *product_id)).ok_or_else(|| {
            DomainError::NotFound(format!("Product {} is not in the cart", product_id))
        })?;
        item.quantity = quantity;
        Ok(())
    }

    async fn remove(&self, user_id: &UserId, product_id: &ProductId) -> Result<(), DomainError> {
        self.rows
            .write()
            .unwrap()
            .remove(&(*user_id, *product_id))
            .map(|_| ())
            .ok_or_else(|| {
                DomainError::NotFound(format!("Product {} is not in the cart", product_id))
            })
    }

    async fn clear(&self, user_id: &UserId) -> Result<(), DomainError> {
        self.rows
            .write()
            .unwrap()
            .retain(|(owner, _), _| owner != user_id);
        Ok(())
    }
}

// ============================================================================
// In-Memory Order Repository
// ============================================================================

pub struct InMemoryOrderRepository {
    orders: Shared<OrderId, OrderWithItems>,
    products: ProductTable,
    cart: CartRows,
}

impl InMemoryOrderRepository {
    pub fn new(products: ProductTable, cart: CartRows) -> Self {
        Self {
            orders: Arc::default(),
            products,
            cart,
        }
    }

    /// Pre-populate with an order for testing
    pub fn with_order(self, order: OrderWithItems) -> Self {
        self.orders.write().unwrap().insert(order.order.id, order);
        self
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn place(&self, order: &NewOrder) -> Result<OrderWithItems, DomainError> {
        let mut products = self.products.write().unwrap();

        let lines: Vec<_> = order
            .lines
            .iter()
            .map(|l| (l.product_id, l.quantity))
            .collect();
        let priced = price_lines(&products, &order.organization_id, &lines)?;
        let adjustments = BillAdjustments {
            tax_percentage: order.tax_percentage,
            ..Default::default()
        };
        let totals = BillTotals::compute(&priced, &adjustments, None)?;
        take_stock(&mut products, &priced);

        let id = OrderId::new();
        let placed = OrderWithItems {
            order: Order {
                id,
                organization_id: order.organization_id,
                user_id: order.user_id,
                order_number: order.order_number.clone(),
                status: OrderStatus::Pending,
                subtotal: totals.subtotal,
                tax_amount: totals.tax_amount,
                total_amount: totals.total_amount,
                shipping_address: order.shipping_address.clone(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            items: priced
                .iter()
                .map(|line| OrderItem {
                    id: Uuid::new_v4(),
                    order_id: id,
                    product_id: line.product_id,
                    product_name: line.product_name.clone(),
                    unit_price: line.unit_price,
                    quantity: line.quantity,
                    line_total: line.line_total(),
                })
                .collect(),
        };

        let mut cart = self.cart.write().unwrap();
        for line in &priced {
            cart.remove(&(order.user_id, line.product_id));
        }
        self.orders.write().unwrap().insert(id, placed.clone());
        Ok(placed)
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<OrderWithItems>, DomainError> {
        Ok(self.orders.read().unwrap().get(id).cloned())
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Order>, DomainError> {
        let mut orders: Vec<_> = self
            .orders
            .read()
            .unwrap()
            .values()
            .filter(|o| o.order.user_id == *user_id)
            .map(|o| o.order.clone())
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn list_by_org(
        &self,
        org_id: &OrganizationId,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, DomainError> {
        let mut orders: Vec<_> = self
            .orders
            .read()
            .unwrap()
            .values()
            .filter(|o| o.order.organization_id == *org_id)
            .filter(|o| status.map_or(true, |s| o.order.status == s))
            .map(|o| o.order.clone())
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn transition(&self, id: &OrderId, status: OrderStatus) -> Result<Order, DomainError> {
        let mut orders = self.orders.write().unwrap();
        let entry = orders
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("Order {} not found", id)))?;

        if !entry.order.status.can_transition_to(status) {
            return Err(DomainError::Validation(format!(
                "Order {} cannot move from {} to {}",
                entry.order.order_number, entry.order.status, status
            )));
        }

        if status == OrderStatus::Cancelled {
            let mut products = self.products.write().unwrap();
            for item in &entry.items {
                if let Some(product) = products.get_mut(&item.product_id) {
                    product.stock_quantity += item.quantity;
                }
            }
        }

        entry.order.status = status;
        entry.order.updated_at = Utc::now();
        Ok(entry.order.clone())
    }
}

// ============================================================================
// In-Memory Attendance Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryAttendanceRepository {
    records: Shared<AttendanceId, AttendanceRecord>,
    failing_date: Option<NaiveDate>,
}

impl InMemoryAttendanceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a record for testing
    pub fn with_record(self, record: AttendanceRecord) -> Self {
        self.records.write().unwrap().insert(record.id, record);
        self
    }

    pub fn count(&self) -> usize {
        self.records.read().unwrap().len()
    }

    /// Make writes for `date` fail as a lost database connection would
    pub fn failing_on(mut self, date: NaiveDate) -> Self {
        self.failing_date = Some(date);
        self
    }
}

#[async_trait]
impl AttendanceRepository for InMemoryAttendanceRepository {
    async fn upsert(&self, record: &NewAttendance) -> Result<AttendanceRecord, DomainError> {
        if self.failing_date == Some(record.date) {
            return Err(DomainError::Database(
                "error communicating with database: connection reset by peer".to_string(),
            ));
        }
        let mut records = self.records.write().unwrap();
        let existing = records
            .values()
            .find(|r| r.user_id == record.user_id && r.date == record.date)
            .map(|r| (r.id, r.created_at));
        let (id, created_at) = existing.unwrap_or_else(|| (AttendanceId::new(), Utc::now()));

        let stored = AttendanceRecord {
            id,
            organization_id: record.organization_id,
            user_id: record.user_id,
            date: record.date,
            status: record.status,
            work_hours: record.work_hours,
            sales_amount: record.sales_amount,
            check_in: record.check_in,
            check_out: record.check_out,
            notes: record.notes.clone(),
            marked_by: record.marked_by,
            created_at,
        };
        records.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(
        &self,
        id: &AttendanceId,
    ) -> Result<Option<AttendanceRecord>, DomainError> {
        Ok(self.records.read().unwrap().get(id).cloned())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        filter: &AttendanceFilter,
    ) -> Result<Vec<AttendanceRecord>, DomainError> {
        let mut records: Vec<_> = self
            .records
            .read()
            .unwrap()
            .values()
            .filter(|r| r.user_id == *user_id && r.date >= filter.from && r.date <= filter.to)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.date);
        Ok(records)
    }

    async fn update(
        &self,
        id: &AttendanceId,
        update: &AttendanceUpdate,
    ) -> Result<AttendanceRecord, DomainError> {
        let mut records = self.records.write().unwrap();
        let record = records
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("Attendance record {} not found", id)))?;

        if let Some(status) = update.status {
            record.status = status;
        }
        if let Some(hours) = update.work_hours {
            record.work_hours = hours;
        }
        if let Some(sales) = update.sales_amount {
            record.sales_amount = sales;
        }
        if let Some(check_in) = update.check_in {
            record.check_in = Some(check_in);
        }
        if let Some(check_out) = update.check_out {
            record.check_out = Some(check_out);
        }
        if let Some(notes) = &update.notes {
            record.notes = Some(notes.clone());
        }
        Ok(record.clone())
    }

    async fn delete(&self, id: &AttendanceId) -> Result<(), DomainError> {
        self.records
            .write()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DomainError::NotFound(format!("Attendance record {} not found", id)))
    }
}

// ============================================================================
// In-Memory Bill Repository
// ============================================================================

pub struct InMemoryBillRepository {
    bills: Shared<BillId, BillWithItems>,
    products: ProductTable,
}

impl InMemoryBillRepository {
    pub fn new(products: ProductTable) -> Self {
        Self {
            bills: Arc::default(),
            products,
        }
    }

    pub fn count(&self) -> usize {
        self.bills.read().unwrap().len()
    }
}

#[async_trait]
impl BillRepository for InMemoryBillRepository {
    async fn create(&self, bill: &NewBill) -> Result<BillWithItems, DomainError> {
        let mut products = self.products.write().unwrap();

        let lines: Vec<_> = bill
            .lines
            .iter()
            .map(|l| (l.product_id, l.quantity))
            .collect();
        let priced = price_lines(&products, &bill.organization_id, &lines)?;
        let totals = BillTotals::compute(&priced, &bill.adjustments, bill.default_tax_percentage)?;
        let payment = PaymentState::resolve(totals.total_amount, bill.paid_amount)?;
        take_stock(&mut products, &priced);

        let id = BillId::new();
        let created = BillWithItems {
            bill: Bill {
                id,
                organization_id: bill.organization_id,
                bill_number: bill.bill_number.clone(),
                customer_name: bill.customer_name.clone(),
                customer_phone: bill.customer_phone.clone(),
                subtotal: totals.subtotal,
                discount_amount: totals.discount_amount,
                tax_amount: totals.tax_amount,
                total_amount: totals.total_amount,
                paid_amount: payment.paid_amount,
                due_amount: payment.due_amount,
                payment_status: payment.status,
                payment_method: bill.payment_method.clone(),
                notes: bill.notes.clone(),
                created_by: bill.created_by,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            items: priced
                .iter()
                .map(|line| BillItem {
                    id: Uuid::new_v4(),
                    bill_id: id,
                    product_id: line.product_id,
                    product_name: line.product_name.clone(),
                    unit_price: line.unit_price,
                    quantity: line.quantity,
                    line_total: line.line_total(),
                })
                .collect(),
        };
        self.bills.write().unwrap().insert(id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: &BillId) -> Result<Option<BillWithItems>, DomainError> {
        Ok(self.bills.read().unwrap().get(id).cloned())
    }

    async fn list(
        &self,
        org_id: &OrganizationId,
        filter: &BillFilter,
    ) -> Result<Vec<Bill>, DomainError> {
        let mut bills: Vec<_> = self
            .bills
            .read()
            .unwrap()
            .values()
            .filter(|b| b.bill.organization_id == *org_id && filter.matches(&b.bill))
            .map(|b| b.bill.clone())
            .collect();
        bills.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(bills, filter.limit, filter.offset))
    }

    async fn record_payment(&self, id: &BillId, amount: f64) -> Result<Bill, DomainError> {
        if amount <= 0.0 {
            return Err(DomainError::Validation(
                "Payment amount must be positive".to_string(),
            ));
        }

        let mut bills = self.bills.write().unwrap();
        let entry = bills
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("Bill {} not found", id)))?;

        let payment =
            PaymentState::resolve(entry.bill.total_amount, entry.bill.paid_amount + amount)?;
        entry.bill.paid_amount = payment.paid_amount;
        entry.bill.due_amount = payment.due_amount;
        entry.bill.payment_status = payment.status;
        entry.bill.updated_at = Utc::now();
        Ok(entry.bill.clone())
    }
}
