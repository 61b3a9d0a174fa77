// sentinel-core/src/application/demo.rs

// A reproducible e-commerce sample seeded with one or more defects per rule,
// so a first `sentinel demo` shows every verdict type.

use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::domain::dataset::{Cell, Dataset};
use crate::error::SentinelError;

pub const DEMO_ROWS: usize = 100;
pub const DEMO_SEED: u64 = 42;
pub const DEMO_LINEAGE: &str = "demo_orders";

pub const DEMO_COLUMNS: [&str; 10] = [
    "order_id",
    "customer_id",
    "product",
    "price",
    "quantity",
    "email",
    "phone",
    "order_date",
    "status",
    "zip_code",
];

const PRODUCTS: [&str; 8] = [
    "Laptop",
    "Phone",
    "Tablet",
    "Headphones",
    "Monitor",
    "Keyboard",
    "Mouse",
    "Camera",
];
const STATUSES: [&str; 4] = ["pending", "completed", "shipped", "cancelled"];

fn pick(rng: &mut StdRng, items: &[&str]) -> String {
    items.choose(rng).map(|s| s.to_string()).unwrap_or_default()
}

/// 102 orders: 100 generated rows plus copies of rows 30 and 31.
///
/// Known defects: repeated `order_id` at rows 10 and 20, price -50 (row 5) and
/// 99999 (row 15), quantity -1 (row 25), three malformed emails, two bad
/// phones, a future and an unparseable date, two unknown statuses, two bad
/// ZIP codes and three missing cells.
pub fn demo_dataset() -> Result<Dataset, SentinelError> {
    let mut rng = StdRng::seed_from_u64(DEMO_SEED);
    let base_date = NaiveDate::from_ymd_opt(2024, 1, 1)
        .ok_or_else(|| SentinelError::InternalError("invalid demo base date".into()))?;

    let mut rows: Vec<Vec<Cell>> = Vec::with_capacity(DEMO_ROWS + 2);
    for i in 0..DEMO_ROWS {
        let date = base_date
            .checked_add_days(Days::new(rng.gen_range(0..365)))
            .unwrap_or(base_date);
        let row = [
            (i + 1).to_string(),
            format!("customer_{}", rng.gen_range(1..50)),
            pick(&mut rng, &PRODUCTS),
            format!("{:.2}", rng.gen_range(10.0..500.0)),
            rng.gen_range(1..10).to_string(),
            format!("user{}@example.com", i),
            format!("555-{}-{}", rng.gen_range(100..999), rng.gen_range(1000..9999)),
            date.format("%Y-%m-%d").to_string(),
            pick(&mut rng, &STATUSES),
            rng.gen_range(10000..99999).to_string(),
        ];
        rows.push(row.into_iter().map(Some).collect());
    }

    let mut set = |row: usize, column: &str, value: Option<&str>| {
        if let Some(idx) = DEMO_COLUMNS.iter().position(|c| *c == column) {
            rows[row][idx] = value.map(str::to_string);
        }
    };

    set(10, "order_id", Some("6"));
    set(20, "order_id", Some("16"));
    set(5, "price", Some("-50"));
    set(15, "price", Some("99999"));
    set(25, "quantity", Some("-1"));
    set(8, "email", Some("invalid-email"));
    set(18, "email", Some("missing@domain"));
    set(28, "email", Some("@nodomain.com"));
    set(12, "phone", Some("123"));
    set(22, "phone", Some("abc-def-ghij"));
    set(3, "order_date", Some("2030-12-31"));
    set(13, "order_date", Some("invalid-date"));
    set(7, "status", Some("UNKNOWN_STATUS"));
    set(17, "status", Some("InvalidValue"));
    set(9, "zip_code", Some("ABC"));
    set(19, "zip_code", Some("1234"));
    set(4, "customer_id", None);
    set(14, "product", None);
    set(24, "email", None);

    let copies = [rows[30].clone(), rows[31].clone()];
    rows.extend(copies);

    let columns = DEMO_COLUMNS.iter().map(|c| c.to_string()).collect();
    Ok(Dataset::new(columns, rows)?)
}
