//! SQLite schema definitions and SQL query constants.
//!
//! This module contains all SQL statements used by the SQLite repository,
//! plus the translation of a [`CarFilter`] into a `WHERE` clause. Pure data,
//! no I/O.

use garage_core::car::Price;
use garage_core::filter::{CarFilter, NumericRange};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::Value;

/// SQL statement to create all tables.
///
/// `enquiries.car_id` deliberately has no foreign key: deleting a car keeps
/// the enquiries that reference it.
pub const CREATE_TABLES: &str = r#"
-- Cars table
CREATE TABLE IF NOT EXISTS cars (
    id TEXT PRIMARY KEY,
    make TEXT NOT NULL,
    model TEXT NOT NULL,
    year INTEGER NOT NULL,
    price REAL NOT NULL,
    mileage INTEGER NOT NULL,
    engine_size TEXT NOT NULL,
    fuel_type TEXT NOT NULL,
    transmission TEXT NOT NULL,
    color TEXT NOT NULL,
    description TEXT NOT NULL,
    features TEXT NOT NULL,
    images TEXT NOT NULL,
    condition TEXT NOT NULL,
    body_type TEXT NOT NULL,
    registration_year INTEGER NOT NULL,
    vin TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Enquiries table
CREATE TABLE IF NOT EXISTS enquiries (
    id TEXT PRIMARY KEY,
    car_id TEXT NOT NULL,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    phone TEXT,
    message TEXT NOT NULL,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Indexes for efficient queries
CREATE INDEX IF NOT EXISTS idx_cars_created_at ON cars(created_at);
CREATE INDEX IF NOT EXISTS idx_cars_price ON cars(price);
CREATE INDEX IF NOT EXISTS idx_enquiries_created_at ON enquiries(created_at);
CREATE INDEX IF NOT EXISTS idx_enquiries_car_id ON enquiries(car_id);
"#;

// Car queries
pub const INSERT_CAR: &str = r#"
INSERT INTO cars (id, make, model, year, price, mileage, engine_size, fuel_type, transmission, color, description, features, images, condition, body_type, registration_year, vin, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)
"#;

pub const SELECT_CARS: &str = r#"
SELECT id, make, model, year, price, mileage, engine_size, fuel_type, transmission, color, description, features, images, condition, body_type, registration_year, vin, created_at, updated_at
FROM cars
"#;

pub const SELECT_CAR_BY_ID: &str = r#"
SELECT id, make, model, year, price, mileage, engine_size, fuel_type, transmission, color, description, features, images, condition, body_type, registration_year, vin, created_at, updated_at
FROM cars
WHERE id = ?1
"#;

pub const SELECT_CAR_BY_VIN: &str = r#"
SELECT id, make, model, year, price, mileage, engine_size, fuel_type, transmission, color, description, features, images, condition, body_type, registration_year, vin, created_at, updated_at
FROM cars
WHERE vin = ?1
"#;

pub const UPDATE_CAR: &str = r#"
UPDATE cars
SET make = ?2, model = ?3, year = ?4, price = ?5, mileage = ?6, engine_size = ?7, fuel_type = ?8, transmission = ?9, color = ?10, description = ?11, features = ?12, images = ?13, condition = ?14, body_type = ?15, registration_year = ?16, vin = ?17, updated_at = ?18
WHERE id = ?1
"#;

pub const DELETE_CAR: &str = r#"
DELETE FROM cars
WHERE id = ?1
"#;

pub const COUNT_CARS: &str = "SELECT COUNT(*) FROM cars";

const ORDER_NEWEST_FIRST: &str = "ORDER BY created_at DESC, id DESC";

// Enquiry queries
pub const INSERT_ENQUIRY: &str = r#"
INSERT INTO enquiries (id, car_id, name, email, phone, message, status, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
"#;

pub const SELECT_ENQUIRIES: &str = r#"
SELECT id, car_id, name, email, phone, message, status, created_at, updated_at
FROM enquiries
ORDER BY created_at DESC, id DESC
"#;

pub const SELECT_ENQUIRY_BY_ID: &str = r#"
SELECT id, car_id, name, email, phone, message, status, created_at, updated_at
FROM enquiries
WHERE id = ?1
"#;

pub const UPDATE_ENQUIRY: &str = r#"
UPDATE enquiries
SET status = ?2, updated_at = ?3
WHERE id = ?1
"#;

/// Name of the Unicode-aware lowercase function, see [`register_functions`].
const LOWER_FN: &str = "unicode_lower";

/// Registers the SQL functions the listing query relies on.
///
/// SQLite's own `lower()` and `LIKE` only fold ASCII, so `Škoda` would not
/// match `škoda`. Must run on every connection before querying.
pub fn register_functions(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        LOWER_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|s| s.to_lowercase()))
        },
    )
}

/// Builds the listing query for `filter`: the SQL text and its positional
/// parameters, in order.
///
/// `make`/`model` become `unicode_lower(col) LIKE '%..%'` against a
/// lowercased needle, range bounds become `>=`/`<=`, enum fields exact
/// matches.
pub fn car_list_query(filter: &CarFilter) -> (String, Vec<Value>) {
    let mut clauses: Vec<&'static str> = Vec::new();
    let mut params: Vec<Value> = Vec::new();

    if let Some(make) = &filter.make {
        clauses.push(r"unicode_lower(make) LIKE ? ESCAPE '\'");
        params.push(Value::Text(like_pattern(&make.to_lowercase())));
    }
    if let Some(model) = &filter.model {
        clauses.push(r"unicode_lower(model) LIKE ? ESCAPE '\'");
        params.push(Value::Text(like_pattern(&model.to_lowercase())));
    }

    push_range(
        &mut clauses,
        &mut params,
        filter.price,
        ("price >= ?", "price <= ?"),
        |price: Price| Value::Real(price.amount()),
    );
    push_range(
        &mut clauses,
        &mut params,
        filter.year,
        ("year >= ?", "year <= ?"),
        integer,
    );
    push_range(
        &mut clauses,
        &mut params,
        filter.mileage,
        ("mileage >= ?", "mileage <= ?"),
        integer,
    );

    if let Some(fuel_type) = filter.fuel_type {
        clauses.push("fuel_type = ?");
        params.push(Value::Text(fuel_type.as_str().to_string()));
    }
    if let Some(transmission) = filter.transmission {
        clauses.push("transmission = ?");
        params.push(Value::Text(transmission.as_str().to_string()));
    }
    if let Some(body_type) = filter.body_type {
        clauses.push("body_type = ?");
        params.push(Value::Text(body_type.as_str().to_string()));
    }

    let mut sql = SELECT_CARS.trim_end().to_string();
    if !clauses.is_empty() {
        sql.push_str("\nWHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push('\n');
    sql.push_str(ORDER_NEWEST_FIRST);

    (sql, params)
}

fn push_range<T: Copy + PartialOrd>(
    clauses: &mut Vec<&'static str>,
    params: &mut Vec<Value>,
    range: Option<NumericRange<T>>,
    (min_clause, max_clause): (&'static str, &'static str),
    to_value: fn(T) -> Value,
) {
    let Some(range) = range else {
        return;
    };

    if let Some(min) = range.min {
        clauses.push(min_clause);
        params.push(to_value(min));
    }
    if let Some(max) = range.max {
        clauses.push(max_clause);
        params.push(to_value(max));
    }
}

/// Integer bound, clamped to SQLite's signed 64-bit range.
fn integer(value: u64) -> Value {
    Value::Integer(i64::try_from(value).unwrap_or(i64::MAX))
}

/// `%needle%` with `%`, `_` and the escape character itself escaped.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
