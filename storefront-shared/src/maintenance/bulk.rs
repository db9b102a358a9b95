/// Bulk conditional updates
///
/// A [`BulkUpdate`] is one `UPDATE <table> SET ... WHERE ...` statement built
/// from code-chosen identifiers and bound values. It touches exactly the rows
/// matching its filter, in one statement, and reports how many it changed.
///
/// Scripts rely on convergence: when the filter excludes the value being
/// assigned (e.g. `upload_limit < 10` → `upload_limit = 10`), a second run
/// matches nothing.
///
/// # Example
///
/// ```no_run
/// use storefront_shared::maintenance::bulk::{BulkUpdate, Comparison};
/// # use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let affected = BulkUpdate::table("user_profiles")
///     .set("upload_limit", 10)
///     .filter("upload_limit", Comparison::Lt, 10)
///     .execute(&pool)
///     .await?;
/// println!("{} profiles raised", affected);
/// # Ok(())
/// # }
/// ```

use crate::error::{MaintenanceError, MaintenanceResult};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::fmt;
use tracing::{debug, info};
use uuid::Uuid;

/// Value bound into a bulk statement
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int(i64),
    Text(String),
    Bool(bool),
    Uuid(Uuid),
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v as i64)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<Uuid> for SqlValue {
    fn from(v: Uuid) -> Self {
        SqlValue::Uuid(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Int(v) => write!(f, "{}", v),
            // Rendered as a SQL literal so traces can be pasted into psql
            SqlValue::Text(v) => write!(f, "'{}'", v.replace('\'', "''")),
            SqlValue::Bool(v) => write!(f, "{}", v),
            SqlValue::Uuid(v) => write!(f, "'{}'", v),
        }
    }
}

/// Comparison operator of a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    IsNull,
    IsNotNull,
}

impl Comparison {
    fn sql(&self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::NotEq => "<>",
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
            Comparison::IsNull => "IS NULL",
            Comparison::IsNotNull => "IS NOT NULL",
        }
    }

    fn takes_value(&self) -> bool {
        !matches!(self, Comparison::IsNull | Comparison::IsNotNull)
    }
}

/// One `column <op> value` term; terms are joined with AND
#[derive(Debug, Clone)]
pub struct Filter {
    pub column: &'static str,
    pub op: Comparison,
    pub value: Option<SqlValue>,
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(v) => write!(f, "{} {} {}", self.column, self.op.sql(), v),
            None => write!(f, "{} {}", self.column, self.op.sql()),
        }
    }
}

/// A conditional `UPDATE` over one table
#[derive(Debug, Clone)]
pub struct BulkUpdate {
    table: &'static str,
    assignments: Vec<(&'static str, SqlValue)>,
    filters: Vec<Filter>,
    touch_updated_at: bool,
}

impl BulkUpdate {
    /// Starts an update of `table`
    pub fn table(table: &'static str) -> Self {
        Self {
            table,
            assignments: Vec::new(),
            filters: Vec::new(),
            touch_updated_at: false,
        }
    }

    /// Adds `column = value` to the SET list
    pub fn set(mut self, column: &'static str, value: impl Into<SqlValue>) -> Self {
        self.assignments.push((column, value.into()));
        self
    }

    /// Adds `column <op> value` to the WHERE clause
    pub fn filter(mut self, column: &'static str, op: Comparison, value: impl Into<SqlValue>) -> Self {
        self.filters.push(Filter {
            column,
            op,
            value: Some(value.into()),
        });
        self
    }

    /// Adds `column IS NULL`
    pub fn filter_null(mut self, column: &'static str) -> Self {
        self.filters.push(Filter {
            column,
            op: Comparison::IsNull,
            value: None,
        });
        self
    }

    /// Also sets `updated_at = NOW()` on changed rows
    pub fn touch_updated_at(mut self) -> Self {
        self.touch_updated_at = true;
        self
    }

    pub fn table_name(&self) -> &'static str {
        self.table
    }

    /// Human-readable WHERE clause, for logs and dry-run output
    pub fn describe_filter(&self) -> String {
        self.filters
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    fn validate(&self) -> MaintenanceResult<()> {
        if self.filters.is_empty() {
            return Err(MaintenanceError::Validation(format!(
                "refusing unconditional update of {}",
                self.table
            )));
        }

        for filter in &self.filters {
            if filter.op.takes_value() != filter.value.is_some() {
                return Err(MaintenanceError::Validation(format!(
                    "filter on {} has operator {} with {} value",
                    filter.column,
                    filter.op.sql(),
                    if filter.value.is_some() { "a" } else { "no" }
                )));
            }
        }

        for ident in std::iter::once(self.table)
            .chain(self.assignments.iter().map(|(c, _)| *c))
            .chain(self.filters.iter().map(|f| f.column))
        {
            if !is_identifier(ident) {
                return Err(MaintenanceError::Validation(format!(
                    "'{}' is not a plain identifier",
                    ident
                )));
            }
        }

        Ok(())
    }

    fn push_where(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        builder.push(" WHERE ");
        for (i, filter) in self.filters.iter().enumerate() {
            if i > 0 {
                builder.push(" AND ");
            }
            builder.push(filter.column);
            builder.push(" ");
            builder.push(filter.op.sql());
            if let Some(value) = &filter.value {
                builder.push(" ");
                push_value(builder, value);
            }
        }
    }

    fn build_update(&self) -> MaintenanceResult<QueryBuilder<'static, Postgres>> {
        self.validate()?;

        if self.assignments.is_empty() {
            return Err(MaintenanceError::Validation(format!(
                "update of {} assigns nothing",
                self.table
            )));
        }

        let mut builder = QueryBuilder::new("UPDATE ");
        builder.push(self.table);
        builder.push(" SET ");

        for (i, (column, value)) in self.assignments.iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            builder.push(*column);
            builder.push(" = ");
            push_value(&mut builder, value);
        }

        if self.touch_updated_at {
            builder.push(", updated_at = NOW()");
        }

        self.push_where(&mut builder);
        Ok(builder)
    }

    fn build_count(&self) -> MaintenanceResult<QueryBuilder<'static, Postgres>> {
        self.validate()?;

        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM ");
        builder.push(self.table);
        self.push_where(&mut builder);
        Ok(builder)
    }

    /// Applies the update and returns the number of rows changed
    ///
    /// # Errors
    ///
    /// `Validation` when there is no filter or no assignment; store errors
    /// are classified per [`MaintenanceError`].
    pub async fn execute(&self, pool: &PgPool) -> MaintenanceResult<u64> {
        let mut builder = self.build_update()?;
        debug!(sql = builder.sql(), "Executing bulk update");

        let result = builder.build().execute(pool).await?;

        info!(
            table = self.table,
            filter = %self.describe_filter(),
            affected = result.rows_affected(),
            "Bulk update applied"
        );
        Ok(result.rows_affected())
    }

    /// Counts the rows the update would change, without changing them
    pub async fn count_matching(&self, pool: &PgPool) -> MaintenanceResult<i64> {
        let mut builder = self.build_count()?;
        let count: i64 = builder.build_query_scalar().fetch_one(pool).await?;

        debug!(table = self.table, matching = count, "Dry run");
        Ok(count)
    }
}

fn push_value(builder: &mut QueryBuilder<'_, Postgres>, value: &SqlValue) {
    match value {
        SqlValue::Int(v) => {
            builder.push_bind(*v);
        }
        SqlValue::Text(v) => {
            builder.push_bind(v.clone());
        }
        SqlValue::Bool(v) => {
            builder.push_bind(*v);
        }
        SqlValue::Uuid(v) => {
            builder.push_bind(*v);
        }
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
