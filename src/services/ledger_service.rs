// src/services/ledger_service.rs

use serde_json::Value;
use sqlx::{Acquire, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    common::pagination::{PageParams, Paginated},
    db::LedgerRepository,
    models::ledger::{PointTransactionKind, PointsBalance, PointsTransaction},
};

// O livro-razão de pontos. ÚNICO componente autorizado a escrever em
// points_balances / points_transactions.
#[derive(Clone)]
pub struct LedgerService {
    ledger_repo: LedgerRepository,
    pool: PgPool,
}

impl LedgerService {
    pub fn new(ledger_repo: LedgerRepository, pool: PgPool) -> Self {
        Self { ledger_repo, pool }
    }

    /// Registra um lançamento e atualiza o saldo materializado, tudo no
    /// mesmo escopo transacional.
    ///
    /// Aceita tanto a pool (abre transação própria) quanto `&mut *tx` de
    /// uma transação maior (aprovação de claim, resgate) — nesse caso vira
    /// um savepoint aninhado e comita junto com o chamador.
    pub async fn record<'a, A>(
        &self,
        conn: A,
        tenant_id: Uuid,
        customer_id: Uuid,
        kind: PointTransactionKind,
        points: i64,
        description: &str,
        metadata: Value,
    ) -> Result<PointsTransaction, AppError>
    where
        A: Acquire<'a, Database = Postgres>,
    {
        let mut tx = conn.begin().await?;

        self.ledger_repo
            .ensure_balance_row(&mut *tx, tenant_id, customer_id)
            .await?;

        // Ponto de serialização por cliente: débitos concorrentes esperam
        // aqui e o segundo enxerga o saldo já debitado.
        let balance = self
            .ledger_repo
            .lock_balance(&mut *tx, tenant_id, customer_id)
            .await?;

        if points < 0 && balance.current_balance + points < 0 {
            return Err(AppError::InsufficientBalance);
        }

        let transaction = self
            .ledger_repo
            .insert_transaction(
                &mut *tx,
                tenant_id,
                customer_id,
                kind,
                points,
                description,
                &metadata,
            )
            .await?;

        self.ledger_repo
            .apply_to_balance(&mut *tx, tenant_id, customer_id, points)
            .await?;

        tx.commit().await?;

        Ok(transaction)
    }

    pub async fn get_balance(
        &self,
        tenant_id: Uuid,
        customer_id: Uuid,
    ) -> Result<PointsBalance, AppError> {
        self.ledger_repo
            .get_balance(&self.pool, tenant_id, customer_id)
            .await
    }

    // Extrato paginado do cliente (mais recente primeiro)
    pub async fn list_transactions(
        &self,
        tenant_id: Uuid,
        customer_id: Uuid,
        params: &PageParams,
    ) -> Result<Paginated<PointsTransaction>, AppError> {
        let transactions = self
            .ledger_repo
            .list_transactions(tenant_id, customer_id, params)
            .await?;
        let total = self
            .ledger_repo
            .count_transactions(tenant_id, customer_id)
            .await?;

        Ok(Paginated::new(transactions, total, params))
    }
}
