// src/services/earn_rate.rs

use crate::models::tenant::Currency;

// Todas as moedas suportadas têm 100 unidades menores por unidade maior
// (kobo, pence, cent).
pub const MINOR_PER_MAJOR: i64 = 100;

// Unidade de ganho em unidades MAIORES da moeda: quanto o cliente precisa
// gastar para ganhar 1 ponto. Taxa fixa do produto, não configurável por
// tenant — o preview do dashboard e o cálculo do servidor precisam bater
// exatamente.
pub fn earn_unit_major(currency: Currency) -> i64 {
    match currency {
        Currency::Ngn => 1000,
        Currency::Gbp | Currency::Usd | Currency::Eur => 1,
    }
}

// points = floor(valor_em_unidades_maiores / earn_unit).
// Determinística e sem efeitos colaterais: o dashboard mostra o preview e
// o servidor recalcula a partir do valor canônico em unidades menores.
pub fn points_for_amount(currency: Currency, amount_minor: i64) -> i64 {
    if amount_minor <= 0 {
        return 0;
    }
    amount_minor / (earn_unit_major(currency) * MINOR_PER_MAJOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ngn_1500_rende_1_ponto() {
        // ₦1.500 em kobo; 1 ponto a cada ₦1.000
        assert_eq!(points_for_amount(Currency::Ngn, 150000), 1);
    }

    #[test]
    fn gbp_5_50_rende_5_pontos() {
        // £5,50 em pence; 1 ponto por £1
        assert_eq!(points_for_amount(Currency::Gbp, 550), 5);
    }

    #[test]
    fn ngn_5000_rende_5_pontos() {
        assert_eq!(points_for_amount(Currency::Ngn, 500000), 5);
    }

    #[test]
    fn abaixo_da_unidade_de_ganho_rende_zero() {
        assert_eq!(points_for_amount(Currency::Ngn, 99999), 0);
        assert_eq!(points_for_amount(Currency::Usd, 99), 0);
    }

    #[test]
    fn exatamente_na_unidade_rende_um() {
        assert_eq!(points_for_amount(Currency::Ngn, 100000), 1);
        assert_eq!(points_for_amount(Currency::Eur, 100), 1);
    }

    #[test]
    fn valores_nao_positivos_rendem_zero() {
        assert_eq!(points_for_amount(Currency::Usd, 0), 0);
        assert_eq!(points_for_amount(Currency::Usd, -500), 0);
    }

    #[test]
    fn usd_e_eur_usam_a_mesma_taxa_do_gbp() {
        assert_eq!(points_for_amount(Currency::Usd, 1250), 12);
        assert_eq!(points_for_amount(Currency::Eur, 1250), 12);
    }
}
