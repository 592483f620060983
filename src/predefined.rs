//! Canned example queries offered to users.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PredefinedQuery {
    pub name: &'static str,
    pub query: &'static str,
}

pub const PREDEFINED_QUERIES: &[PredefinedQuery] = &[
    PredefinedQuery {
        name: "Employee List",
        query: "SELECT * FROM employees WHERE department = 'Engineering' ORDER BY last_name ASC;",
    },
    PredefinedQuery {
        name: "Sales By Region",
        query: "SELECT region, SUM(amount) as total_sales FROM sales GROUP BY region ORDER BY total_sales DESC;",
    },
    PredefinedQuery {
        name: "Product Inventory",
        query: "SELECT product_name, category, quantity, price FROM products WHERE quantity < 100 ORDER BY quantity ASC;",
    },
    PredefinedQuery {
        name: "Customer Orders",
        query: "SELECT c.name, c.email, COUNT(o.id) as order_count, SUM(o.total) as total_spent FROM customers c JOIN orders o ON c.id = o.customer_id GROUP BY c.id ORDER BY total_spent DESC LIMIT 10;",
    },
    PredefinedQuery {
        name: "Top 10 Products",
        query: "SELECT p.product_name, p.category, SUM(o.quantity) as units_sold FROM products p JOIN order_items o ON p.id = o.product_id GROUP BY p.id ORDER BY units_sold DESC LIMIT 10;",
    },
];

/// The query shown when nothing else has been chosen
pub fn default_query() -> &'static str {
    PREDEFINED_QUERIES[0].query
}

/// Look up a predefined query by name, ignoring case
pub fn find(name: &str) -> Option<&'static PredefinedQuery> {
    PREDEFINED_QUERIES
        .iter()
        .find(|q| q.name.eq_ignore_ascii_case(name.trim()))
}
