// src/services/mod.rs

pub mod auth;
pub mod claim_service;
pub mod customer_service;
pub mod earn_rate;
pub mod fraud;
pub mod ledger_service;
pub mod notifier;
pub mod purchase_service;
pub mod redemption_service;
pub mod reward_service;
pub mod tenancy_service;

pub use auth::AuthService;
pub use claim_service::ClaimService;
pub use customer_service::CustomerService;
pub use ledger_service::LedgerService;
pub use purchase_service::PurchaseService;
pub use redemption_service::RedemptionService;
pub use reward_service::RewardService;
pub use tenancy_service::TenancyService;
