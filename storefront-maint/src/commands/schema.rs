use anyhow::Context;
use sqlx::PgPool;
use storefront_shared::db::schema_guard;

/// Applies the guarded schema repairs and lists each step
pub async fn ensure_schema(pool: &PgPool) -> anyhow::Result<()> {
    let applied = schema_guard::ensure_schema(pool)
        .await
        .context("Schema repair failed, no change was committed")?;

    for step in &applied {
        println!("  ok  {}", step);
    }
    println!("Schema is up to date ({} guarded steps)", applied.len());
    Ok(())
}
