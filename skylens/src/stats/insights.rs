//! Filtered single-attribute insights.
//!
//! Unlike the snapshot endpoints, insights have no synthetic substitute, so
//! failures here surface to the caller as errors.

use super::decode::Row;
use super::domain::StatsDomain;
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct InsightsRequest {
    #[serde(default)]
    pub attribute: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

#[derive(Debug, Serialize)]
pub struct InsightValue {
    pub value: String,
    pub count: i64,
    pub percentage: f64,
}

#[derive(Debug, Serialize)]
pub struct InsightsFilters {
    pub company_name: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub success: bool,
    pub attribute: String,
    pub column_name: String,
    pub table: String,
    pub total_records: i64,
    pub unique_values: i64,
    pub insights: Vec<InsightValue>,
    pub filters: InsightsFilters,
}

/// A validated `table.column` attribute with its filter clauses.
#[derive(Debug)]
pub struct InsightsQuery {
    pub domain: StatsDomain,
    pub column: String,
    request: InsightsRequest,
}

impl InsightsQuery {
    /// Validate the request. The attribute must be `table.column` with a known
    /// table; filter fields are free-form.
    pub fn parse(request: InsightsRequest) -> Result<Self> {
        if request.attribute.is_empty() {
            return Err(Error::bad_request("Please select an insight attribute"));
        }

        let mut parts = request.attribute.split('.');
        let (Some(table), Some(column), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(Error::bad_request("Invalid attribute format"));
        };

        let domain: StatsDomain = table
            .parse()
            .map_err(|_| Error::bad_request(format!("Unknown table type: {table}")))?;

        if column.is_empty() || !column.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::bad_request("Invalid attribute format"));
        }

        Ok(Self {
            domain,
            column: column.to_string(),
            request,
        })
    }

    /// Company and date filter conditions shared by both statements.
    fn filter_conditions(&self) -> Vec<String> {
        let mut conditions = Vec::new();

        if !self.request.company_name.is_empty() {
            let needle = self.request.company_name.replace('\'', "''");
            conditions.push(format!(
                "LOWER({}) LIKE LOWER('%{needle}%')",
                self.domain.company_column()
            ));
        }

        let date_col = self.domain.date_column();
        if !self.request.start_date.is_empty() {
            let start = self.request.start_date.replace('\'', "''");
            conditions.push(format!("{date_col} >= '{start}'"));
        }
        if !self.request.end_date.is_empty() {
            let end = self.request.end_date.replace('\'', "''");
            conditions.push(format!("{date_col} <= '{end}'"));
        }

        conditions
    }

    fn where_clause(conditions: &[String]) -> String {
        if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        }
    }

    /// Grouped count/percentage statement, top 10 by count. Only this
    /// statement excludes NULL attribute values.
    pub fn distribution_statement(&self, table: &str) -> String {
        let mut conditions = self.filter_conditions();
        conditions.push(format!("{} IS NOT NULL", self.column));
        format!(
            "SELECT {col} as attribute_value, COUNT(*) as count, \
             COUNT(*) * 100.0 / SUM(COUNT(*)) OVER() as percentage \
             FROM {table}{where_clause} \
             GROUP BY {col} \
             ORDER BY count DESC \
             LIMIT 10",
            col = self.column,
            where_clause = Self::where_clause(&conditions),
        )
    }

    /// Totals statement: record count and distinct attribute values. Rows
    /// with a NULL attribute still count toward total_records, so only the
    /// company/date filters apply here.
    pub fn totals_statement(&self, table: &str) -> String {
        format!(
            "SELECT COUNT(*) as total_records, COUNT(DISTINCT {col}) as unique_values \
             FROM {table}{where_clause}",
            col = self.column,
            where_clause = Self::where_clause(&self.filter_conditions()),
        )
    }

    /// Assemble the response from the two result sets.
    pub fn decode(&self, distribution: &[Row], totals: &[Row]) -> InsightsResponse {
        let insights = distribution
            .iter()
            .map(|row| InsightValue {
                value: cell_text(row, 0),
                count: cell_int(row, 1),
                percentage: round1(cell_num(row, 2)),
            })
            .collect();

        let (total_records, unique_values) = totals
            .first()
            .map(|row| (cell_int(row, 0), cell_int(row, 1)))
            .unwrap_or((0, 0));

        InsightsResponse {
            success: true,
            attribute: self.request.attribute.clone(),
            column_name: self.column.clone(),
            table: self.domain.as_str().to_string(),
            total_records,
            unique_values,
            insights,
            filters: InsightsFilters {
                company_name: self.request.company_name.clone(),
                start_date: self.request.start_date.clone(),
                end_date: self.request.end_date.clone(),
            },
        }
    }
}

fn cell_text(row: &Row, idx: usize) -> String {
    row.get(idx)
        .and_then(|cell| cell.clone())
        .unwrap_or_else(|| "N/A".to_string())
}

fn cell_num(row: &Row, idx: usize) -> f64 {
    row.get(idx)
        .and_then(|cell| cell.as_deref())
        .and_then(|s| s.trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

fn cell_int(row: &Row, idx: usize) -> i64 {
    cell_num(row, idx) as i64
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
