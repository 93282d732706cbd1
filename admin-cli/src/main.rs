//! Commerce back-office CLI
//!
//! A thin client over the Commerce REST API for store staff: sign in,
//! manage the catalog, ring up bills, mark attendance and pull payroll.
//!
//! Reads `COMMERCE_API_URL` and `COMMERCE_API_TOKEN` from the environment.
//! Results are printed to stdout as JSON; logs go to stderr.

mod client;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use client::{
    BillItem, CommerceClient, DateRange, MarkAttendance, NewBill, NewProduct, ProductQuery,
};

#[derive(Parser, Debug)]
#[command(name = "commerce-admin")]
#[command(about = "Back-office client for the Commerce API")]
struct Cli {
    /// Base URL of the API
    #[arg(long, env = "COMMERCE_API_URL", default_value = "http://localhost:8080")]
    api_url: String,

    /// Bearer token from `login`
    #[arg(long, env = "COMMERCE_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the API is up
    Health,
    /// Sign in and print a bearer token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "COMMERCE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Show the signed-in user
    Me,
    #[command(subcommand)]
    Products(ProductCommand),
    #[command(subcommand)]
    Orders(OrderCommand),
    #[command(subcommand)]
    Bills(BillCommand),
    #[command(subcommand)]
    Attendance(AttendanceCommand),
    #[command(subcommand)]
    Salary(SalaryCommand),
}

#[derive(Subcommand, Debug)]
enum ProductCommand {
    /// List the organization's products
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        include_inactive: bool,
    },
    /// Add a product
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: f64,
        #[arg(long, default_value_t = 0)]
        stock: i32,
        #[arg(long)]
        sku: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Change stock by a signed amount
    Stock {
        product_id: Uuid,
        #[arg(long, allow_hyphen_values = true)]
        delta: i32,
    },
}

#[derive(Subcommand, Debug)]
enum OrderCommand {
    /// Orders placed with the organization
    List {
        #[arg(long)]
        status: Option<String>,
    },
    /// Move an order to a new status
    Status { order_id: Uuid, status: String },
}

#[derive(Subcommand, Debug)]
enum BillCommand {
    /// Ring up a bill, e.g. `--item <product-id>:2`
    Create {
        #[arg(long = "item", value_parser = parse_item, required = true)]
        items: Vec<BillItem>,
        #[arg(long)]
        customer: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        discount_percentage: Option<f64>,
        #[arg(long, default_value_t = 0.0)]
        paid: f64,
        #[arg(long)]
        method: Option<String>,
    },
    List {
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Record a payment against a bill
    Pay {
        bill_id: Uuid,
        #[arg(long)]
        amount: f64,
    },
    /// Totals over a date range
    Summary {
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
}

#[derive(Subcommand, Debug)]
enum AttendanceCommand {
    /// Mark one day for a staff member
    Mark {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        date: NaiveDate,
        /// present, absent, half_day, late or holiday
        #[arg(long)]
        status: String,
        #[arg(long)]
        hours: Option<f64>,
        #[arg(long)]
        sales: Option<f64>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// A month of attendance (defaults to yourself and this month)
    List {
        #[arg(long)]
        user: Option<Uuid>,
        #[arg(long)]
        month: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum SalaryCommand {
    /// One staff member's salary for a month
    Show {
        user_id: Uuid,
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        policy: Option<String>,
    },
    /// Payroll for the whole organization
    Report {
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        policy: Option<String>,
    },
}

/// Parse `PRODUCT_ID:QUANTITY`
fn parse_item(value: &str) -> Result<BillItem, String> {
    let (id, quantity) = value
        .split_once(':')
        .ok_or_else(|| format!("expected PRODUCT_ID:QUANTITY, got '{}'", value))?;
    let product_id = id
        .parse::<Uuid>()
        .map_err(|e| format!("invalid product id '{}': {}", id, e))?;
    let quantity = quantity
        .parse::<i32>()
        .map_err(|e| format!("invalid quantity '{}': {}", quantity, e))?;
    Ok(BillItem {
        product_id,
        quantity,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs to stderr so stdout stays pipeable JSON
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = CommerceClient::new(&cli.api_url, cli.token.as_deref())?;
    tracing::debug!(api_url = %cli.api_url, "Using Commerce API");

    let output = run(&client, cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run(client: &CommerceClient, command: Command) -> Result<Value> {
    match command {
        Command::Health => client.health().await,
        Command::Login { email, password } => {
            let response = client.login(&email, &password).await?;
            tracing::info!(
                expires_in = response.expires_in,
                "Signed in; export COMMERCE_API_TOKEN to reuse the token"
            );
            Ok(serde_json::json!({
                "token": response.token,
                "expires_in": response.expires_in,
                "user": response.user,
            }))
        }
        Command::Me => client.me().await,
        Command::Products(command) => match command {
            ProductCommand::List {
                category,
                search,
                include_inactive,
            } => {
                client
                    .list_products(&ProductQuery {
                        category,
                        search,
                        include_inactive,
                    })
                    .await
            }
            ProductCommand::Create {
                name,
                price,
                stock,
                sku,
                category,
            } => {
                client
                    .create_product(&NewProduct {
                        name,
                        price,
                        stock_quantity: stock,
                        sku,
                        category,
                    })
                    .await
            }
            ProductCommand::Stock { product_id, delta } => {
                client.adjust_stock(product_id, delta).await
            }
        },
        Command::Orders(command) => match command {
            OrderCommand::List { status } => client.list_org_orders(status.as_deref()).await,
            OrderCommand::Status { order_id, status } => {
                client.update_order_status(order_id, &status).await
            }
        },
        Command::Bills(command) => match command {
            BillCommand::Create {
                items,
                customer,
                phone,
                discount_percentage,
                paid,
                method,
            } => {
                let bill = client
                    .create_bill(&NewBill {
                        customer_name: customer,
                        customer_phone: phone,
                        items,
                        discount_percentage,
                        paid_amount: paid,
                        payment_method: method,
                    })
                    .await?;
                tracing::info!(bill_number = %bill["bill_number"], "Bill created");
                Ok(bill)
            }
            BillCommand::List { from, to } => client.list_bills(&DateRange { from, to }).await,
            BillCommand::Pay { bill_id, amount } => client.record_payment(bill_id, amount).await,
            BillCommand::Summary { from, to } => {
                client.bill_summary(&DateRange { from, to }).await
            }
        },
        Command::Attendance(command) => match command {
            AttendanceCommand::Mark {
                user,
                date,
                status,
                hours,
                sales,
                notes,
            } => {
                client
                    .mark_attendance(&MarkAttendance {
                        user_id: user,
                        date,
                        status,
                        work_hours: hours,
                        sales_amount: sales,
                        notes,
                    })
                    .await
            }
            AttendanceCommand::List { user, month } => {
                client.list_attendance(user, month.as_deref()).await
            }
        },
        Command::Salary(command) => match command {
            SalaryCommand::Show {
                user_id,
                month,
                policy,
            } => {
                client
                    .salary(user_id, month.as_deref(), policy.as_deref())
                    .await
            }
            SalaryCommand::Report { month, policy } => {
                client
                    .salary_report(month.as_deref(), policy.as_deref())
                    .await
            }
        },
    }
}
