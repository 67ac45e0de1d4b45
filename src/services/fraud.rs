// src/services/fraud.rs

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::models::{
    claim::FraudFlag,
    customer::CustomerClaimHistory,
    tenant::TenantSettings,
};

// Dados da claim recém-submetida que as heurísticas olham
#[derive(Debug, Clone, Copy)]
pub struct ClaimInput {
    pub amount_minor: i64,
    pub has_receipt: bool,
}

// Limiares vindos do tenant_settings (cada vendedor calibra os seus)
#[derive(Debug, Clone, Copy)]
pub struct FraudThresholds {
    pub high_amount_minor: i64,
    pub new_customer_days: i64,
    pub rejection_rate_pct: i64,
    pub rejection_min_claims: i64,
    pub repeated_amount_window_days: i64,
}

impl From<&TenantSettings> for FraudThresholds {
    fn from(s: &TenantSettings) -> Self {
        Self {
            high_amount_minor: s.fraud_high_amount_minor,
            new_customer_days: s.fraud_new_customer_days as i64,
            rejection_rate_pct: s.fraud_rejection_rate_pct as i64,
            rejection_min_claims: s.fraud_rejection_min_claims as i64,
            repeated_amount_window_days: s.fraud_repeated_amount_window_days as i64,
        }
    }
}

// Função pura: claim + histórico + limiares -> flags.
// As flags são SÓ um aviso na tela de revisão; a aprovação continua
// habilitada mesmo com todas acesas.
pub fn score_claim(
    input: ClaimInput,
    history: &CustomerClaimHistory,
    thresholds: FraudThresholds,
    now: DateTime<Utc>,
) -> Vec<FraudFlag> {
    let mut flags = Vec::new();

    // Valor alto: acima do teto absoluto do tenant, OU mais de 3x o
    // gasto médio do cliente quando há histórico de compras.
    let over_cap = input.amount_minor >= thresholds.high_amount_minor;
    let over_typical = history
        .avg_approved_amount_minor
        .map(|avg| Decimal::from(input.amount_minor) > avg * Decimal::from(3))
        .unwrap_or(false);
    if over_cap || over_typical {
        flags.push(FraudFlag::HighAmount);
    }

    // Cliente cadastrado há pouco tempo
    if now - history.enrolled_at < Duration::days(thresholds.new_customer_days) {
        flags.push(FraudFlag::NewCustomer);
    }

    if !input.has_receipt {
        flags.push(FraudFlag::NoReceipt);
    }

    // Taxa histórica de rejeição. Só conta com um mínimo de claims,
    // senão 1 rejeição em 1 claim já acenderia a flag.
    if history.total_claims >= thresholds.rejection_min_claims
        && history.rejected_claims * 100 >= thresholds.rejection_rate_pct * history.total_claims
    {
        flags.push(FraudFlag::HighRejectionRate);
    }

    // Mesmo valor reivindicado recentemente — possível duplicata
    if history.same_amount_recent > 0 {
        flags.push(FraudFlag::RepeatedAmount);
    }

    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> FraudThresholds {
        FraudThresholds {
            high_amount_minor: 5_000_000,
            new_customer_days: 7,
            rejection_rate_pct: 50,
            rejection_min_claims: 3,
            repeated_amount_window_days: 30,
        }
    }

    fn veteran_history() -> CustomerClaimHistory {
        CustomerClaimHistory {
            total_claims: 10,
            rejected_claims: 0,
            avg_approved_amount_minor: None,
            same_amount_recent: 0,
            enrolled_at: Utc::now() - Duration::days(365),
        }
    }

    #[test]
    fn claim_sem_recibo_recebe_no_receipt() {
        // ₦5.000 reivindicados sem recibo anexado
        let flags = score_claim(
            ClaimInput { amount_minor: 500000, has_receipt: false },
            &veteran_history(),
            thresholds(),
            Utc::now(),
        );
        assert!(flags.contains(&FraudFlag::NoReceipt));
        assert!(!flags.contains(&FraudFlag::HighAmount));
    }

    #[test]
    fn claim_limpa_nao_recebe_flags() {
        let flags = score_claim(
            ClaimInput { amount_minor: 500000, has_receipt: true },
            &veteran_history(),
            thresholds(),
            Utc::now(),
        );
        assert!(flags.is_empty());
    }

    #[test]
    fn valor_acima_do_teto_absoluto() {
        let flags = score_claim(
            ClaimInput { amount_minor: 5_000_000, has_receipt: true },
            &veteran_history(),
            thresholds(),
            Utc::now(),
        );
        assert!(flags.contains(&FraudFlag::HighAmount));
    }

    #[test]
    fn valor_3x_acima_do_gasto_medio() {
        let mut history = veteran_history();
        history.avg_approved_amount_minor = Some(Decimal::from(100_000));

        let flags = score_claim(
            ClaimInput { amount_minor: 300_001, has_receipt: true },
            &history,
            thresholds(),
            Utc::now(),
        );
        assert!(flags.contains(&FraudFlag::HighAmount));

        // Exatamente 3x ainda não acende
        let flags = score_claim(
            ClaimInput { amount_minor: 300_000, has_receipt: true },
            &history,
            thresholds(),
            Utc::now(),
        );
        assert!(!flags.contains(&FraudFlag::HighAmount));
    }

    #[test]
    fn cliente_recem_cadastrado() {
        let mut history = veteran_history();
        history.enrolled_at = Utc::now() - Duration::days(2);

        let flags = score_claim(
            ClaimInput { amount_minor: 100_000, has_receipt: true },
            &history,
            thresholds(),
            Utc::now(),
        );
        assert!(flags.contains(&FraudFlag::NewCustomer));
    }

    #[test]
    fn taxa_de_rejeicao_exige_minimo_de_claims() {
        // 1 rejeição em 2 claims: 50%, mas abaixo do mínimo de 3 claims
        let mut history = veteran_history();
        history.total_claims = 2;
        history.rejected_claims = 1;

        let flags = score_claim(
            ClaimInput { amount_minor: 100_000, has_receipt: true },
            &history,
            thresholds(),
            Utc::now(),
        );
        assert!(!flags.contains(&FraudFlag::HighRejectionRate));

        // 2 rejeições em 4: acende
        history.total_claims = 4;
        history.rejected_claims = 2;
        let flags = score_claim(
            ClaimInput { amount_minor: 100_000, has_receipt: true },
            &history,
            thresholds(),
            Utc::now(),
        );
        assert!(flags.contains(&FraudFlag::HighRejectionRate));
    }

    #[test]
    fn valor_repetido_recentemente() {
        let mut history = veteran_history();
        history.same_amount_recent = 2;

        let flags = score_claim(
            ClaimInput { amount_minor: 100_000, has_receipt: true },
            &history,
            thresholds(),
            Utc::now(),
        );
        assert!(flags.contains(&FraudFlag::RepeatedAmount));
    }

    #[test]
    fn varias_flags_podem_coexistir() {
        let mut history = veteran_history();
        history.enrolled_at = Utc::now() - Duration::days(1);
        history.same_amount_recent = 1;

        let flags = score_claim(
            ClaimInput { amount_minor: 6_000_000, has_receipt: false },
            &history,
            thresholds(),
            Utc::now(),
        );
        assert!(flags.contains(&FraudFlag::HighAmount));
        assert!(flags.contains(&FraudFlag::NewCustomer));
        assert!(flags.contains(&FraudFlag::NoReceipt));
        assert!(flags.contains(&FraudFlag::RepeatedAmount));
    }
}
