//! Filter criteria and the transaction list + totals kept in sync with them.
//!
//! The view-model is I/O free: every change that needs data hands out a
//! [`FetchTicket`], the caller runs the request however it likes and feeds the
//! result back through [`FilterViewModel::complete`]. Tickets carry a
//! monotonically increasing sequence number and only the newest one may touch
//! the snapshot, so a slow response can never overwrite a newer one.

use api_types::transaction::{
    FilteredTransactions, Transaction, TransactionFilter, TransactionType,
};
use chrono::NaiveDate;

use crate::client::{Client, ClientError};

pub const FILTERED_RESULT_BADGE: &str = "Filtered Result";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub category_name: Option<String>,
    pub kind: Option<TransactionType>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.category_name.is_none()
            && self.kind.is_none()
            && self.start.is_none()
            && self.end.is_none()
    }

    /// Outgoing query; unset criteria are left out rather than sent empty.
    pub fn to_query(&self) -> TransactionFilter {
        TransactionFilter {
            category_name: self.category_name.clone(),
            kind: self.kind,
            start: self.start,
            end: self.end,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Category,
    Type,
    Start,
    End,
}

impl FilterField {
    pub const ALL: [FilterField; 4] = [Self::Category, Self::Type, Self::Start, Self::End];

    pub fn label(self) -> &'static str {
        match self {
            Self::Category => "Category",
            Self::Type => "Type",
            Self::Start => "From",
            Self::End => "To",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Category => Self::Type,
            Self::Type => Self::Start,
            Self::Start => Self::End,
            Self::End => Self::Category,
        }
    }
}

/// A new value for one criterion; `None` clears it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChange {
    Category(Option<String>),
    Type(Option<TransactionType>),
    Start(Option<NaiveDate>),
    End(Option<NaiveDate>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterBadge {
    pub field: FilterField,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TotalsSnapshot {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_amount: f64,
    pub transaction_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub query: TransactionFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    Failed,
    /// A newer request was issued meanwhile; the response was dropped.
    Stale,
}

#[derive(Debug, Default)]
pub struct FilterViewModel {
    criteria: FilterCriteria,
    transactions: Vec<Transaction>,
    totals: Option<TotalsSnapshot>,
    error: Option<String>,
    latest_seq: u64,
    in_flight: usize,
}

impl FilterViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn totals(&self) -> Option<TotalsSnapshot> {
        self.totals
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    /// Only the very first load blocks the screen; later ones keep showing
    /// the previous snapshot.
    pub fn is_initial_load(&self) -> bool {
        self.is_loading() && self.totals.is_none()
    }

    pub fn has_active_filters(&self) -> bool {
        !self.criteria.is_empty()
    }

    pub fn badges(&self) -> Vec<FilterBadge> {
        let c = &self.criteria;
        let mut badges = Vec::new();
        if let Some(name) = &c.category_name {
            badges.push(FilterBadge {
                field: FilterField::Category,
                value: name.clone(),
            });
        }
        if let Some(kind) = c.kind {
            badges.push(FilterBadge {
                field: FilterField::Type,
                value: kind.label().to_string(),
            });
        }
        if let Some(start) = c.start {
            badges.push(FilterBadge {
                field: FilterField::Start,
                value: start.format("%Y-%m-%d").to_string(),
            });
        }
        if let Some(end) = c.end {
            badges.push(FilterBadge {
                field: FilterField::End,
                value: end.format("%Y-%m-%d").to_string(),
            });
        }
        badges
    }

    /// Badge shown on the income card; only meaningful in a filtered context.
    pub fn income_badge(&self) -> Option<&'static str> {
        self.has_active_filters().then_some(FILTERED_RESULT_BADGE)
    }

    /// Updates one criterion. Returns a ticket when the value actually changed;
    /// blank category names count as unset.
    pub fn set_filter(&mut self, change: FilterChange) -> Option<FetchTicket> {
        let c = &mut self.criteria;
        let changed = match change {
            FilterChange::Category(name) => {
                let name = name
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty());
                replace_if_changed(&mut c.category_name, name)
            }
            FilterChange::Type(kind) => replace_if_changed(&mut c.kind, kind),
            FilterChange::Start(date) => replace_if_changed(&mut c.start, date),
            FilterChange::End(date) => replace_if_changed(&mut c.end, date),
        };
        changed.then(|| self.begin_fetch())
    }

    pub fn clear_filters(&mut self) -> FetchTicket {
        self.criteria = FilterCriteria::default();
        self.begin_fetch()
    }

    /// Issues a request for the current criteria, superseding any in flight.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.latest_seq += 1;
        self.in_flight += 1;
        FetchTicket {
            seq: self.latest_seq,
            query: self.criteria.to_query(),
        }
    }

    /// Reconciles a response. Success replaces list and totals together;
    /// failure keeps the last good snapshot and records the error.
    pub fn complete(
        &mut self,
        seq: u64,
        result: std::result::Result<FilteredTransactions, ClientError>,
    ) -> FetchOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);

        if seq != self.latest_seq {
            tracing::debug!("dropping stale filter response {seq} (latest {})", self.latest_seq);
            return FetchOutcome::Stale;
        }

        match result {
            Ok(res) => {
                self.totals = Some(TotalsSnapshot {
                    total_income: res.total_income,
                    total_expenses: res.total_expenses,
                    net_amount: res.net_amount,
                    transaction_count: res.transaction_count,
                });
                self.transactions = res.transactions;
                self.error = None;
                FetchOutcome::Applied
            }
            Err(err) => {
                tracing::warn!("filtered transactions request failed: {err}");
                self.error = Some(err.user_message());
                FetchOutcome::Failed
            }
        }
    }

    /// Runs one fetch to completion against `client`.
    pub async fn fetch(&mut self, client: &Client) -> FetchOutcome {
        let ticket = self.begin_fetch();
        let result = client.transactions_filtered(&ticket.query).await;
        self.complete(ticket.seq, result)
    }
}

fn replace_if_changed<T: PartialEq>(slot: &mut Option<T>, value: Option<T>) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(amount: f64, kind: TransactionType) -> Transaction {
        Transaction {
            id: None,
            amount,
            kind,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            title: None,
            category: None,
        }
    }

    fn response(items: Vec<Transaction>, income: f64, expenses: f64) -> FilteredTransactions {
        FilteredTransactions {
            transaction_count: items.len() as u64,
            transactions: items,
            total_income: income,
            total_expenses: expenses,
            net_amount: income - expenses,
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn empty_criteria_produce_unconstrained_query() {
        let mut vm = FilterViewModel::new();
        let ticket = vm.begin_fetch();
        assert!(ticket.query.is_unconstrained());
        assert_eq!(ticket.query, TransactionFilter::default());
    }

    #[test]
    fn only_set_fields_reach_the_query() {
        let mut vm = FilterViewModel::new();
        vm.set_filter(FilterChange::Category(Some("Food".to_string())));
        let ticket = vm
            .set_filter(FilterChange::End(Some(date(31))))
            .unwrap();
        assert_eq!(
            ticket.query,
            TransactionFilter {
                category_name: Some("Food".to_string()),
                kind: None,
                start: None,
                end: Some(date(31)),
            }
        );
    }

    #[test]
    fn blank_category_is_treated_as_unset() {
        let mut vm = FilterViewModel::new();
        assert!(vm.set_filter(FilterChange::Category(Some("   ".to_string()))).is_none());
        assert!(vm.criteria().category_name.is_none());
        assert!(!vm.has_active_filters());
    }

    #[test]
    fn has_active_filters_for_every_combination() {
        for mask in 0u8..16 {
            let mut vm = FilterViewModel::new();
            if mask & 1 != 0 {
                vm.set_filter(FilterChange::Category(Some("Rent".to_string())));
            }
            if mask & 2 != 0 {
                vm.set_filter(FilterChange::Type(Some(TransactionType::Expense)));
            }
            if mask & 4 != 0 {
                vm.set_filter(FilterChange::Start(Some(date(1))));
            }
            if mask & 8 != 0 {
                vm.set_filter(FilterChange::End(Some(date(2))));
            }
            assert_eq!(vm.has_active_filters(), mask != 0, "mask {mask:04b}");
            assert_eq!(vm.badges().len(), mask.count_ones() as usize);
        }
    }

    #[test]
    fn each_change_issues_one_fetch_and_noops_issue_none() {
        let mut vm = FilterViewModel::new();
        let first = vm
            .set_filter(FilterChange::Type(Some(TransactionType::Income)))
            .unwrap();
        assert!(vm
            .set_filter(FilterChange::Type(Some(TransactionType::Income)))
            .is_none());
        let second = vm
            .set_filter(FilterChange::Type(Some(TransactionType::Expense)))
            .unwrap();
        assert_eq!(second.seq, first.seq + 1);
    }

    #[test]
    fn clear_filters_matches_initial_load() {
        let mut vm = FilterViewModel::new();
        let initial = vm.begin_fetch();
        vm.set_filter(FilterChange::Category(Some("Food".to_string())));
        vm.set_filter(FilterChange::Start(Some(date(5))));
        let cleared = vm.clear_filters();
        assert_eq!(cleared.query, initial.query);
        assert!(!vm.has_active_filters());
        assert!(vm.badges().is_empty());
    }

    #[test]
    fn income_filter_scenario_renders_response_as_is() {
        let mut vm = FilterViewModel::new();
        let ticket = vm
            .set_filter(FilterChange::Type(Some(TransactionType::Income)))
            .unwrap();
        let items = vec![
            tx(3000.0, TransactionType::Income),
            tx(2000.0, TransactionType::Income),
        ];
        let outcome = vm.complete(ticket.seq, Ok(response(items.clone(), 5000.0, 0.0)));

        assert_eq!(outcome, FetchOutcome::Applied);
        assert_eq!(vm.transactions(), items.as_slice());
        let totals = vm.totals().unwrap();
        assert_eq!(totals.total_income, 5000.0);
        assert_eq!(totals.total_expenses, 0.0);
        assert_eq!(totals.net_amount, 5000.0);
        assert_eq!(totals.transaction_count, 2);
        assert_eq!(vm.income_badge(), Some(FILTERED_RESULT_BADGE));

        vm.clear_filters();
        assert_eq!(vm.income_badge(), None);
    }

    #[test]
    fn failure_keeps_previous_snapshot() {
        let mut vm = FilterViewModel::new();
        let t1 = vm.begin_fetch();
        vm.complete(t1.seq, Ok(response(vec![tx(10.0, TransactionType::Expense)], 0.0, 10.0)));
        let before_items = vm.transactions().to_vec();
        let before_totals = vm.totals();

        let t2 = vm
            .set_filter(FilterChange::Type(Some(TransactionType::Income)))
            .unwrap();
        let outcome = vm.complete(t2.seq, Err(ClientError::Server("boom".to_string())));

        assert_eq!(outcome, FetchOutcome::Failed);
        assert_eq!(vm.transactions(), before_items.as_slice());
        assert_eq!(vm.totals(), before_totals);
        assert!(vm.error().is_some());
        assert!(!vm.is_loading());
    }

    #[test]
    fn late_response_never_overwrites_newer_state() {
        let mut vm = FilterViewModel::new();
        let income = vm
            .set_filter(FilterChange::Type(Some(TransactionType::Income)))
            .unwrap();
        let expense = vm
            .set_filter(FilterChange::Type(Some(TransactionType::Expense)))
            .unwrap();
        assert!(vm.is_loading());

        let expense_res = response(vec![tx(40.0, TransactionType::Expense)], 0.0, 40.0);
        assert_eq!(vm.complete(expense.seq, Ok(expense_res.clone())), FetchOutcome::Applied);
        assert!(vm.is_loading());

        let income_res = response(vec![tx(99.0, TransactionType::Income)], 99.0, 0.0);
        assert_eq!(vm.complete(income.seq, Ok(income_res)), FetchOutcome::Stale);

        assert!(!vm.is_loading());
        assert_eq!(vm.transactions(), expense_res.transactions.as_slice());
        assert_eq!(vm.totals().unwrap().total_expenses, 40.0);
    }

    #[test]
    fn stale_failure_does_not_report_error() {
        let mut vm = FilterViewModel::new();
        let old = vm.begin_fetch();
        let new = vm.begin_fetch();
        vm.complete(new.seq, Ok(response(Vec::new(), 0.0, 0.0)));
        assert_eq!(
            vm.complete(old.seq, Err(ClientError::NotFound)),
            FetchOutcome::Stale
        );
        assert!(vm.error().is_none());
    }

    #[test]
    fn only_first_load_blocks() {
        let mut vm = FilterViewModel::new();
        let t1 = vm.begin_fetch();
        assert!(vm.is_initial_load());
        vm.complete(t1.seq, Ok(response(Vec::new(), 0.0, 0.0)));
        vm.begin_fetch();
        assert!(vm.is_loading());
        assert!(!vm.is_initial_load());
    }
}
