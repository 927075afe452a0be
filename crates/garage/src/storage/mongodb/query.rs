//! Listing filter to MongoDB query document.

use garage_core::car::Price;
use garage_core::filter::{CarFilter, NumericRange};
use mongodb::bson::{doc, Bson, Document};

/// Compiles `filter` into a `find` query. An empty filter matches every car.
///
/// `make`/`model` become case-insensitive `$regex` substring matches on the
/// escaped input; each range becomes `$gte`/`$lte` on the supplied bounds.
pub fn car_filter_document(filter: &CarFilter) -> Document {
    let mut query = Document::new();

    if let Some(make) = &filter.make {
        query.insert("make", contains_ignore_case(make));
    }
    if let Some(model) = &filter.model {
        query.insert("model", contains_ignore_case(model));
    }
    if let Some(range) = filter.price {
        query.insert("price", range_document(range, |p: Price| Bson::Double(p.amount())));
    }
    if let Some(range) = filter.year {
        query.insert("year", range_document(range, integer));
    }
    if let Some(range) = filter.mileage {
        query.insert("mileage", range_document(range, integer));
    }
    if let Some(fuel_type) = filter.fuel_type {
        query.insert("fuelType", fuel_type.as_str());
    }
    if let Some(transmission) = filter.transmission {
        query.insert("transmission", transmission.as_str());
    }
    if let Some(body_type) = filter.body_type {
        query.insert("bodyType", body_type.as_str());
    }

    query
}

/// Sort order for listings: most recently created first.
pub fn newest_first() -> Document {
    doc! { "createdAt": -1, "_id": -1 }
}

fn contains_ignore_case(needle: &str) -> Document {
    doc! { "$regex": escape_regex(needle), "$options": "i" }
}

fn range_document<T: Copy + PartialOrd>(
    range: NumericRange<T>,
    to_bson: fn(T) -> Bson,
) -> Document {
    let mut bounds = Document::new();
    if let Some(min) = range.min {
        bounds.insert("$gte", to_bson(min));
    }
    if let Some(max) = range.max {
        bounds.insert("$lte", to_bson(max));
    }
    bounds
}

fn integer(value: u64) -> Bson {
    Bson::Int64(i64::try_from(value).unwrap_or(i64::MAX))
}

/// Escapes every regex metacharacter so user input matches literally.
fn escape_regex(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(
            c,
            '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
