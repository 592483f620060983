//! Built-in sample tables served by [`SampleReader`](super::SampleReader).

use serde_json::{json, Value};

use crate::Row;

/// Names of the built-in tables, in lookup order
pub const SAMPLE_TABLES: &[&str] = &["employees", "sales", "products", "customers"];

/// Rows of a built-in table, or `None` for an unknown name.
pub fn sample_table(name: &str) -> Option<Vec<Row>> {
    let value = match name {
        "employees" => employees(),
        "sales" => sales(),
        "products" => products(),
        "customers" => customers(),
        _ => return None,
    };
    Some(into_rows(value))
}

fn into_rows(value: Value) -> Vec<Row> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn employees() -> Value {
    json!([
        {"id": 1, "first_name": "Alice", "last_name": "Johnson", "department": "Engineering", "salary": 95000, "hire_date": "2022-01-15"},
        {"id": 2, "first_name": "Bob", "last_name": "Smith", "department": "Engineering", "salary": 85000, "hire_date": "2022-03-20"},
        {"id": 3, "first_name": "Carol", "last_name": "Williams", "department": "Sales", "salary": 70000, "hire_date": "2022-06-10"},
        {"id": 4, "first_name": "David", "last_name": "Brown", "department": "Sales", "salary": 75000, "hire_date": "2023-01-05"},
        {"id": 5, "first_name": "Eve", "last_name": "Davis", "department": "Marketing", "salary": 65000, "hire_date": "2023-03-15"},
        {"id": 6, "first_name": "Frank", "last_name": "Miller", "department": "Engineering", "salary": 105000, "hire_date": "2021-09-01"}
    ])
}

fn sales() -> Value {
    json!([
        {"id": 1, "product_id": 1, "region": "US", "amount": 1999.98, "sale_date": "2024-01-05"},
        {"id": 2, "product_id": 2, "region": "EU", "amount": 127.50, "sale_date": "2024-01-05"},
        {"id": 3, "product_id": 3, "region": "APAC", "amount": 225.00, "sale_date": "2024-01-12"},
        {"id": 4, "product_id": 4, "region": "US", "amount": 599.98, "sale_date": "2024-01-19"},
        {"id": 5, "product_id": 5, "region": "EU", "amount": 199.99, "sale_date": "2024-02-02"},
        {"id": 6, "product_id": 6, "region": "APAC", "amount": 699.98, "sale_date": "2024-02-09"},
        {"id": 7, "product_id": 7, "region": "US", "amount": 90.00, "sale_date": "2024-02-16"}
    ])
}

fn products() -> Value {
    json!([
        {"id": 1, "product_name": "Laptop", "category": "Electronics", "quantity": 42, "price": 999.99},
        {"id": 2, "product_name": "Mouse", "category": "Electronics", "quantity": 310, "price": 25.50},
        {"id": 3, "product_name": "Keyboard", "category": "Electronics", "quantity": 95, "price": 75.00},
        {"id": 4, "product_name": "Desk", "category": "Furniture", "quantity": 18, "price": 299.99},
        {"id": 5, "product_name": "Chair", "category": "Furniture", "quantity": 64, "price": 199.99},
        {"id": 6, "product_name": "Monitor", "category": "Electronics", "quantity": 120, "price": 349.99},
        {"id": 7, "product_name": "Lamp", "category": "Furniture", "quantity": 7, "price": 45.00}
    ])
}

fn customers() -> Value {
    json!([
        {"id": 1, "name": "Acme Corp", "email": "orders@acme.example", "city": "Chicago", "orders": 14},
        {"id": 2, "name": "Globex", "email": "buying@globex.example", "city": "Berlin", "orders": 9},
        {"id": 3, "name": "Initech", "email": "it@initech.example", "city": "Austin", "orders": 3},
        {"id": 4, "name": "Umbrella", "email": "supply@umbrella.example", "city": "Singapore", "orders": 21}
    ])
}
