use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Login {
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Register {
        pub name: String,
        pub email: String,
        pub password: String,
    }

    /// Body returned by `/login` and, on some deployments, `/register`.
    ///
    /// Only `token` matters to the client; the identity fields are kept for
    /// display when the backend sends them.
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct AuthResponse {
        #[serde(default, alias = "accessToken", alias = "jwt")]
        pub token: Option<String>,
        #[serde(default)]
        pub name: Option<String>,
        #[serde(default)]
        pub email: Option<String>,
    }
}

pub mod category {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Category {
        #[serde(default)]
        pub id: Option<i64>,
        /// Unique per user; the backend addresses categories by name.
        pub name: String,
        #[serde(default)]
        pub description: Option<String>,
    }

    /// Request body for creating or updating a category.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        pub description: Option<String>,
    }

    /// Category as it appears inside a transaction.
    ///
    /// Depending on the endpoint the backend either embeds the whole category
    /// or sends only its name.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum CategoryRef {
        Reference(String),
        Embedded(Category),
    }

    impl CategoryRef {
        pub fn display_name(&self) -> &str {
            match self {
                Self::Reference(name) => name,
                Self::Embedded(category) => &category.name,
            }
        }
    }
}

pub mod transaction {
    use super::*;
    use crate::category::CategoryRef;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum TransactionType {
        Income,
        Expense,
    }

    impl TransactionType {
        pub fn label(self) -> &'static str {
            match self {
                Self::Income => "Income",
                Self::Expense => "Expense",
            }
        }
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Transaction {
        #[serde(default)]
        pub id: Option<i64>,
        /// Always positive; `kind` carries the direction.
        pub amount: f64,
        #[serde(rename = "type")]
        pub kind: TransactionType,
        pub date: NaiveDate,
        #[serde(default)]
        pub title: Option<String>,
        #[serde(default)]
        pub category: Option<CategoryRef>,
    }

    impl Transaction {
        pub fn category_name(&self) -> Option<&str> {
            self.category.as_ref().map(CategoryRef::display_name)
        }

        /// Amount with the sign implied by the transaction type.
        pub fn signed_amount(&self) -> f64 {
            match self.kind {
                TransactionType::Income => self.amount,
                TransactionType::Expense => -self.amount,
            }
        }
    }

    /// Request body for `/api/transactions/add`; the category travels as the
    /// `categoryName` query parameter.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub amount: f64,
        #[serde(rename = "type")]
        pub kind: TransactionType,
        pub date: NaiveDate,
        pub title: Option<String>,
    }

    /// Query parameters for `/api/transactions/filter`.
    ///
    /// Unset criteria are skipped entirely; the backend treats a missing
    /// parameter as unconstrained, while an empty string is a real constraint.
    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct TransactionFilter {
        #[serde(rename = "categoryName", skip_serializing_if = "Option::is_none")]
        pub category_name: Option<String>,
        #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
        pub kind: Option<TransactionType>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub start: Option<NaiveDate>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub end: Option<NaiveDate>,
    }

    impl TransactionFilter {
        pub fn is_unconstrained(&self) -> bool {
            self.category_name.is_none()
                && self.kind.is_none()
                && self.start.is_none()
                && self.end.is_none()
        }
    }

    /// Combined list + totals computed by the backend for one filter set.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FilteredTransactions {
        #[serde(default)]
        pub transactions: Vec<Transaction>,
        pub total_income: f64,
        pub total_expenses: f64,
        pub net_amount: f64,
        #[serde(default)]
        pub transaction_count: u64,
    }
}

pub mod dashboard {
    use super::*;

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DashboardSummary {
        #[serde(default)]
        pub total_income: f64,
        #[serde(default, alias = "totalExpenses")]
        pub total_expense: f64,
        #[serde(default, alias = "netAmount")]
        pub balance: f64,
    }
}
