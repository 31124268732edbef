use std::collections::{BTreeMap, BTreeSet};

use fraudlens_parser::schema::{AMOUNT, CATEGORY, IS_FRAUD};
use polars::prelude::{DataFrame, DataType, PolarsError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("polars operation failed: {0}")]
    Polars(#[from] PolarsError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub is_fraud: String,
    pub count: usize,
}

/// Row counts per merchant category split by fraud flag, plus the local table they came from.
#[derive(Debug, Clone)]
pub struct FraudSummary {
    /// `category`, `amt` and `is_fraud` (as a string label) of every processed row.
    pub table: DataFrame,
    pub categories: Vec<String>,
    pub fraud_labels: Vec<String>,
    pub counts: Vec<CategoryCount>,
}

impl FraudSummary {
    pub fn count(&self, category: &str, is_fraud: &str) -> usize {
        self.counts
            .iter()
            .find(|entry| entry.category == category && entry.is_fraud == is_fraud)
            .map(|entry| entry.count)
            .unwrap_or(0)
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().map(|entry| entry.count).max().unwrap_or(0)
    }

    pub fn counted_rows(&self) -> usize {
        self.counts.iter().map(|entry| entry.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Counts rows per `(category, is_fraud)`. Rows where either value is null are not counted.
/// Categories and flag labels come out sorted.
pub fn summarize_fraud_by_category(df: &DataFrame) -> Result<FraudSummary, SummaryError> {
    let category = df.column(CATEGORY)?.cast(&DataType::String)?;
    let amount = df.column(AMOUNT)?.cast(&DataType::Float64)?;
    let flag = df.column(IS_FRAUD)?.cast(&DataType::String)?;

    let mut grouped: BTreeMap<(String, String), usize> = BTreeMap::new();
    let mut fraud_labels: BTreeSet<String> = BTreeSet::new();
    for (category_value, flag_value) in category.str()?.into_iter().zip(flag.str()?) {
        let (Some(category_value), Some(flag_value)) = (category_value, flag_value) else {
            continue;
        };
        fraud_labels.insert(flag_value.to_string());
        *grouped
            .entry((category_value.to_string(), flag_value.to_string()))
            .or_insert(0) += 1;
    }

    let mut categories: Vec<String> = Vec::new();
    for (category_value, _) in grouped.keys() {
        if categories.last() != Some(category_value) {
            categories.push(category_value.clone());
        }
    }

    let counts = grouped
        .into_iter()
        .map(|((category, is_fraud), count)| CategoryCount {
            category,
            is_fraud,
            count,
        })
        .collect();

    let table = DataFrame::new(vec![category, amount, flag])?;

    Ok(FraudSummary {
        table,
        categories,
        fraud_labels: fraud_labels.into_iter().collect(),
        counts,
    })
}
