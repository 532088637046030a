//! Builtin customer-service tools.
//!
//! The toolset a returns-processing agent works with: three query tools over
//! the customer tables, a catalog search forwarder, and a native date tool.
//! Descriptions are what the model-facing selector reads when deciding which
//! tool fits a request, so they name the data each tool yields.

use std::sync::Arc;

use chrono::Local;

use super::definition::{
    ColumnSpec, Execution, ParamSpec, ReturnShape, ScalarType, ScalarValue, ToolSpecification,
};
use super::query::QueryTemplate;

const CUSTOMER_NAME_DESC: &str = "Full name of the customer, any capitalization";

/// Most recent purchase for a customer: join purchases to the customer
/// dimension, filter on the normalized name, newest first, single row.
pub fn return_last_order() -> ToolSpecification {
    ToolSpecification {
        name: "return_last_order".to_string(),
        description: "Returns the most recent purchase from our luxury fashion eshop for the customer"
            .to_string(),
        parameters: vec![ParamSpec::new("customer_name", ScalarType::String, CUSTOMER_NAME_DESC)],
        return_shape: ReturnShape::Table(vec![
            ColumnSpec::new("purchase_date", ScalarType::Date),
            ColumnSpec::new("item_id", ScalarType::String),
            ColumnSpec::new("customer_id", ScalarType::String),
            ColumnSpec::new("name", ScalarType::String),
        ]),
        execution: Execution::Query(QueryTemplate::new(
            "SELECT p.purchase_date, p.item_id, p.customer_id, c.name \
             FROM {purchases} p \
             JOIN {customers} c ON p.customer_id = c.customer_id \
             WHERE c.name = initcap(:customer_name) \
             ORDER BY p.purchase_date DESC \
             LIMIT 1",
        )),
    }
}

/// Browsing activity for a customer on the eshop
pub fn return_browsing_history() -> ToolSpecification {
    ToolSpecification {
        name: "return_browsing_history".to_string(),
        description: "Returns the most recent browsing history for the customer on the luxury fashion eshop"
            .to_string(),
        parameters: vec![ParamSpec::new("customer_name", ScalarType::String, CUSTOMER_NAME_DESC)],
        return_shape: ReturnShape::Table(vec![
            ColumnSpec::new("customer_id", ScalarType::String),
            ColumnSpec::new("item_id", ScalarType::String),
            ColumnSpec::new("action", ScalarType::String),
        ]),
        execution: Execution::Query(QueryTemplate::new(
            "SELECT b.customer_id, b.item_id, b.action \
             FROM {browsing_history} b \
             JOIN {customers} c ON b.customer_id = c.customer_id \
             WHERE c.name = initcap(:customer_name)",
        )),
    }
}

/// Emails sent to a customer, with open and click outcomes
pub fn return_email_log() -> ToolSpecification {
    ToolSpecification {
        name: "return_email_log".to_string(),
        description: "This takes the name of a customer as an input and returns the email log"
            .to_string(),
        parameters: vec![ParamSpec::new("customer_name", ScalarType::String, CUSTOMER_NAME_DESC)],
        return_shape: ReturnShape::Table(vec![
            ColumnSpec::new("customer_id", ScalarType::String),
            ColumnSpec::new("subject", ScalarType::String),
            ColumnSpec::new("sent_date", ScalarType::Date),
            ColumnSpec::new("opened", ScalarType::Boolean),
            ColumnSpec::new("clicked", ScalarType::Boolean),
        ]),
        execution: Execution::Query(QueryTemplate::new(
            "SELECT e.customer_id, e.subject, e.sent_date, e.opened, e.clicked \
             FROM {email_logs} e \
             JOIN {customers} c ON e.customer_id = c.customer_id \
             WHERE c.name = initcap(:customer_name)",
        )),
    }
}

/// Semantic search over product catalog descriptions, top 5 hits
pub fn product_vector_search() -> ToolSpecification {
    ToolSpecification {
        name: "product_vector_search".to_string(),
        description: "Executes a search on the product catalog to retrieve text documents most relevant to the input query"
            .to_string(),
        parameters: vec![ParamSpec::new(
            "query",
            ScalarType::String,
            "The query string for searching the product catalog",
        )],
        return_shape: ReturnShape::Table(vec![
            ColumnSpec::new("description", ScalarType::String),
            ColumnSpec::new("item_id", ScalarType::String),
        ]),
        execution: Execution::Search { num_results: 5 },
    }
}

/// Host-local date as `YYYY-MM-DD`. Models cannot reliably know the current
/// date, so scheduling pickups and refund timelines goes through this tool.
pub fn get_todays_date() -> ToolSpecification {
    ToolSpecification {
        name: "get_todays_date".to_string(),
        description: "Returns today's date in YYYY-MM-DD format".to_string(),
        parameters: vec![],
        return_shape: ReturnShape::Scalar(ScalarType::String),
        execution: Execution::Native(Arc::new(|_| {
            Ok(ScalarValue::Text(Local::now().format("%Y-%m-%d").to_string()))
        })),
    }
}

/// The full workshop toolset, in the order the agent expects to see it
pub fn all() -> Vec<ToolSpecification> {
    vec![
        product_vector_search(),
        return_last_order(),
        return_browsing_history(),
        return_email_log(),
        get_todays_date(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::invocation::ToolArgs;

    #[test]
    fn test_all_builtins_validate() {
        for spec in all() {
            spec.validate().unwrap_or_else(|e| panic!("{}: {}", spec.name, e));
        }
    }

    #[test]
    fn test_builtin_names_unique() {
        let specs = all();
        for (i, spec) in specs.iter().enumerate() {
            assert!(!specs[..i].iter().any(|s| s.name == spec.name));
        }
    }

    #[test]
    fn test_todays_date_shape() {
        let spec = get_todays_date();
        let Execution::Native(f) = &spec.execution else {
            panic!("expected native execution");
        };

        let value = f(&ToolArgs::new()).unwrap();
        let ScalarValue::Text(s) = value else {
            panic!("expected text");
        };
        // YYYY-MM-DD
        assert_eq!(s.len(), 10);
        assert!(chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d").is_ok());
    }

    #[test]
    fn test_last_order_declares_date_first() {
        let spec = return_last_order();
        let ReturnShape::Table(columns) = &spec.return_shape else {
            panic!("expected tabular return");
        };
        assert_eq!(columns[0].name, "purchase_date");
        assert_eq!(columns[0].column_type, ScalarType::Date);
    }
}
