/// Batches of independent, idempotent operations
///
/// Items are processed in order with no transaction around the loop. A
/// failing item is logged and the batch moves on; items already processed
/// stay committed. Because each item is idempotent, re-running the whole
/// batch after a partial failure is safe.

use crate::models::product::Product;
use sqlx::PgPool;
use tracing::{info, warn};

/// What happened to one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The operation changed the store
    Applied,

    /// The target did not exist; nothing to do
    NotFound,

    /// The operation failed; the message is the error text
    Failed(String),
}

/// Per-item outcomes of a batch, in input order
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub items: Vec<(String, ItemOutcome)>,
}

impl BatchReport {
    pub fn applied(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Applied))
    }

    pub fn not_found(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::NotFound))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Failed(_)))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, pred: impl Fn(&ItemOutcome) -> bool) -> usize {
        self.items.iter().filter(|(_, o)| pred(o)).count()
    }
}

/// Deletes each slug in turn, continuing past missing slugs and failures
pub async fn delete_products_by_slug(pool: &PgPool, slugs: &[String]) -> BatchReport {
    let mut report = BatchReport::default();

    for slug in slugs {
        let outcome = match Product::delete_by_slug(pool, slug).await {
            Ok(true) => {
                info!(slug = %slug, "Deleted product");
                ItemOutcome::Applied
            }
            Ok(false) => {
                info!(slug = %slug, "Product not found, skipping");
                ItemOutcome::NotFound
            }
            Err(e) => {
                warn!(slug = %slug, error = %e, "Failed to delete product, continuing");
                ItemOutcome::Failed(e.to_string())
            }
        };
        report.items.push((slug.clone(), outcome));
    }

    report
}
