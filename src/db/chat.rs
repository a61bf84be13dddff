use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::db::StoreError;
use crate::models::chat::{ChatMessage, Sender};

/// Append messages to a user's transcript in one transaction
pub async fn insert_chat_messages(
    pool: &PgPool,
    user_id: &str,
    messages: &[ChatMessage],
) -> Result<(), StoreError> {
    let mut tx = pool.begin().await?;

    for message in messages {
        sqlx::query(
            r#"
            INSERT INTO chat_messages (user_id, sender, text, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user_id)
        .bind(message.sender.as_str())
        .bind(&message.text)
        .bind(message.timestamp)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Get the latest `limit` messages of a transcript, oldest first
pub async fn get_chat_history(
    pool: &PgPool,
    user_id: &str,
    limit: i64,
) -> Result<Vec<ChatMessage>, StoreError> {
    let rows = sqlx::query(
        r#"
        SELECT sender, text, created_at
        FROM (
            SELECT seq, sender, text, created_at
            FROM chat_messages
            WHERE user_id = $1
            ORDER BY seq DESC
            LIMIT $2
        ) latest
        ORDER BY seq ASC
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            let sender: String = row.get("sender");
            let timestamp: DateTime<Utc> = row.get("created_at");
            Ok(ChatMessage {
                sender: Sender::parse(&sender)
                    .ok_or_else(|| StoreError::Corrupt(format!("unknown chat sender '{}'", sender)))?,
                text: row.get("text"),
                timestamp,
            })
        })
        .collect()
}
