use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;

/// user id -> username, used when rendering audit trails. Usernames change
/// rarely, so a day-long TTL is acceptable staleness.
pub static USER_NAME_CACHE: Lazy<Cache<u64, String>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(10_000)
        .time_to_live(Duration::from_secs(86400)) // 24h TTL
        .build()
});

/// Resolve a user's display name, falling back to the database on a miss.
pub async fn display_name(pool: &MySqlPool, user_id: u64) -> Option<String> {
    if let Some(name) = USER_NAME_CACHE.get(&user_id).await {
        return Some(name);
    }

    let name = sqlx::query_scalar::<_, String>("SELECT username FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .ok()??;

    USER_NAME_CACHE.insert(user_id, name.clone()).await;
    Some(name)
}

async fn batch_insert(rows: &[(u64, String)]) {
    let futures: Vec<_> = rows
        .iter()
        .map(|(id, name)| USER_NAME_CACHE.insert(*id, name.clone()))
        .collect();

    futures::future::join_all(futures).await;
}

/// Preload names of recently active users into the in-memory cache (batched)
pub async fn warmup_user_cache(pool: &MySqlPool, days: u32, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (u64, String)>(
        r#"
        SELECT id, username
        FROM users
        WHERE last_login_at >= NOW() - INTERVAL ? DAY
        ORDER BY last_login_at DESC
        "#,
    )
    .bind(days)
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        batch.push(row?);
        total_count += 1;

        if batch.len() >= batch_size {
            batch_insert(&batch).await;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        batch_insert(&batch).await;
    }

    tracing::info!(
        "User name cache warmup complete: {} recent users (last {} days)",
        total_count,
        days
    );

    Ok(())
}
