// src/db/outbox_repo.rs

use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::outbox::OutboxMessage};

#[derive(Clone)]
pub struct OutboxRepository {
    pool: PgPool,
}

impl OutboxRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Enfileira DENTRO da transação da mutação que originou a notificação.
    // Se o commit falhar, a notificação some junto — nunca notifica algo
    // que não aconteceu.
    pub async fn enqueue<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        customer_id: Uuid,
        template: &str,
        payload: &Value,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO notification_outbox (tenant_id, customer_id, template, payload)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(tenant_id)
        .bind(customer_id)
        .bind(template)
        .bind(payload)
        .execute(executor)
        .await?;

        Ok(())
    }

    // Entrega "pelo menos uma vez": se o processo cair entre o send e o
    // mark_sent, a mensagem sai de novo no próximo ciclo.
    pub async fn fetch_pending_batch(&self, batch: i64) -> Result<Vec<OutboxMessage>, AppError> {
        let messages = sqlx::query_as::<_, OutboxMessage>(
            r#"
            SELECT * FROM notification_outbox
            WHERE status = 'pending'
            ORDER BY created_at ASC
            LIMIT $1
            "#,
        )
        .bind(batch)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    pub async fn mark_sent(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE notification_outbox SET status = 'sent', sent_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn mark_failed(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE notification_outbox SET status = 'failed' WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
