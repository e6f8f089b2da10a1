use api_types::{
    category::{Category, CategoryNew},
    transaction::{TransactionNew, TransactionType},
};
use chrono::NaiveDate;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a `YYYY-MM-DD` date; blank input means "unset".
pub fn parse_optional_date(input: &str) -> Result<Option<NaiveDate>, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map(Some)
        .map_err(|_| format!("Invalid date \"{trimmed}\", expected YYYY-MM-DD."))
}

/// Accepts `.` or `,` as decimal separator, at most two decimals.
pub fn parse_amount(input: &str) -> Result<f64, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("Enter an amount.".to_string());
    }
    let normalized = trimmed.replace(',', ".");
    if let Some((_, decimals)) = normalized.split_once('.') {
        if decimals.len() > 2 {
            return Err("Use at most two decimals.".to_string());
        }
    }
    let amount: f64 = normalized
        .parse()
        .map_err(|_| "Invalid amount.".to_string())?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err("Amount must be greater than 0.".to_string());
    }
    Ok(amount)
}

/// Steps through `None` followed by each option, wrapping at both ends.
pub fn cycle_option<T: Clone + PartialEq>(
    current: Option<&T>,
    options: &[T],
    forward: bool,
) -> Option<T> {
    if options.is_empty() {
        return None;
    }
    let slots = options.len() + 1;
    let pos = current
        .and_then(|value| options.iter().position(|o| o == value))
        .map(|idx| idx + 1)
        .unwrap_or(0);
    let next = if forward {
        (pos + 1) % slots
    } else {
        (pos + slots - 1) % slots
    };
    next.checked_sub(1).map(|idx| options[idx].clone())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionFormField {
    Amount,
    Type,
    Date,
    Title,
    Category,
}

impl TransactionFormField {
    pub fn label(self) -> &'static str {
        match self {
            Self::Amount => "Amount",
            Self::Type => "Type",
            Self::Date => "Date",
            Self::Title => "Title",
            Self::Category => "Category",
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Amount => Self::Type,
            Self::Type => Self::Date,
            Self::Date => Self::Title,
            Self::Title => Self::Category,
            Self::Category => Self::Amount,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransactionForm {
    pub amount: String,
    pub kind: TransactionType,
    pub date: String,
    pub title: String,
    pub category: Option<String>,
    pub focus: TransactionFormField,
    pub error: Option<String>,
}

impl TransactionForm {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            amount: String::new(),
            kind: TransactionType::Expense,
            date: today.format(DATE_FORMAT).to_string(),
            title: String::new(),
            category: None,
            focus: TransactionFormField::Amount,
            error: None,
        }
    }

    pub fn advance_focus(&mut self) {
        self.focus = self.focus.next();
    }

    /// Text buffer behind the focused field, if it is a free-text field.
    pub fn active_text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            TransactionFormField::Amount => Some(&mut self.amount),
            TransactionFormField::Date => Some(&mut self.date),
            TransactionFormField::Title => Some(&mut self.title),
            TransactionFormField::Type | TransactionFormField::Category => None,
        }
    }

    /// Left/right on the selector fields.
    pub fn cycle(&mut self, categories: &[Category], forward: bool) {
        match self.focus {
            TransactionFormField::Type => {
                self.kind = match self.kind {
                    TransactionType::Income => TransactionType::Expense,
                    TransactionType::Expense => TransactionType::Income,
                };
            }
            TransactionFormField::Category => {
                let names: Vec<String> = categories.iter().map(|c| c.name.clone()).collect();
                self.category = cycle_option(self.category.as_ref(), &names, forward);
            }
            _ => {}
        }
    }

    /// Validates the form against the known categories; returns the body and
    /// the category name for the `categoryName` query parameter.
    pub fn validate(&self, categories: &[Category]) -> Result<(TransactionNew, String), String> {
        let amount = parse_amount(&self.amount)?;
        let date = parse_optional_date(&self.date)?.ok_or_else(|| "Enter a date.".to_string())?;
        let category = self
            .category
            .as_deref()
            .ok_or_else(|| "Select a category.".to_string())?;
        if !categories.iter().any(|c| c.name == category) {
            return Err(format!("Unknown category \"{category}\"."));
        }
        let title = self.title.trim();

        Ok((
            TransactionNew {
                amount,
                kind: self.kind,
                date,
                title: (!title.is_empty()).then(|| title.to_string()),
            },
            category.to_string(),
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFormField {
    Name,
    Description,
}

#[derive(Debug, Clone)]
pub struct CategoryForm {
    pub name: String,
    pub description: String,
    /// Original name of the category being edited; `None` when creating.
    pub editing: Option<String>,
    pub focus: CategoryFormField,
    pub error: Option<String>,
}

impl Default for CategoryForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            editing: None,
            focus: CategoryFormField::Name,
            error: None,
        }
    }
}

impl CategoryForm {
    pub fn edit(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            description: category.description.clone().unwrap_or_default(),
            editing: Some(category.name.clone()),
            ..Self::default()
        }
    }

    pub fn advance_focus(&mut self) {
        self.focus = match self.focus {
            CategoryFormField::Name => CategoryFormField::Description,
            CategoryFormField::Description => CategoryFormField::Name,
        };
    }

    pub fn active_text_mut(&mut self) -> &mut String {
        match self.focus {
            CategoryFormField::Name => &mut self.name,
            CategoryFormField::Description => &mut self.description,
        }
    }

    pub fn validate(&self) -> Result<CategoryNew, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Category name is required.".to_string());
        }
        let description = self.description.trim();
        Ok(CategoryNew {
            name: name.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
        })
    }
}
