// src/services/notifier.rs

use serde_json::Value;

use crate::{
    common::error::AppError,
    db::{CustomerRepository, OutboxRepository},
};

// Fronteira com o gateway do WhatsApp Business API. A implementação real
// vive fora deste core; aqui dentro o contrato é fire-and-forget.
pub trait WhatsappGateway: Send + Sync + 'static {
    fn send(
        &self,
        phone: &str,
        template: &str,
        payload: &Value,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;
}

// Implementação padrão: só loga. Útil em desenvolvimento e nos ambientes
// sem credenciais do WhatsApp.
#[derive(Clone)]
pub struct LogWhatsappGateway;

impl WhatsappGateway for LogWhatsappGateway {
    async fn send(&self, phone: &str, template: &str, payload: &Value) -> anyhow::Result<()> {
        tracing::info!("📨 WhatsApp [{}] para {}: {}", template, phone, payload);
        Ok(())
    }
}

// O despachante do outbox: consome as notificações pendentes e chama o
// gateway. Falha de entrega marca a linha como failed e segue — o commit
// do ledger que a originou já aconteceu e não volta atrás.
#[derive(Clone)]
pub struct NotificationDispatcher<G: WhatsappGateway> {
    outbox_repo: OutboxRepository,
    customer_repo: CustomerRepository,
    gateway: G,
}

impl<G: WhatsappGateway> NotificationDispatcher<G> {
    pub fn new(outbox_repo: OutboxRepository, customer_repo: CustomerRepository, gateway: G) -> Self {
        Self { outbox_repo, customer_repo, gateway }
    }

    pub async fn run_once(&self, batch: i64) -> Result<u64, AppError> {
        let messages = self.outbox_repo.fetch_pending_batch(batch).await?;
        let mut dispatched = 0u64;

        for message in messages {
            let customer = self
                .customer_repo
                .find_by_id_any(message.tenant_id, message.customer_id)
                .await;

            let result = match customer {
                Ok(customer) => {
                    self.gateway
                        .send(&customer.phone, &message.template, &message.payload)
                        .await
                }
                Err(e) => Err(anyhow::anyhow!("cliente da notificação sumiu: {}", e)),
            };

            match result {
                Ok(()) => {
                    self.outbox_repo.mark_sent(message.id).await?;
                    dispatched += 1;
                }
                Err(e) => {
                    // Entrega falhou: loga, marca e NÃO propaga — a mutação
                    // de negócio já está comitada.
                    tracing::warn!("⚠️ Falha ao notificar {}: {}", message.customer_id, e);
                    self.outbox_repo.mark_failed(message.id).await?;
                }
            }
        }

        Ok(dispatched)
    }
}
