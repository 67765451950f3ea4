use std::sync::Arc;

use anyhow::{Context, Result};
use benefit_engine::{
    BalanceLedger, BenefitRequestLedger, CardService, DependantDirectory, EligibilityPolicy,
    EligibilityResolver, WalletService,
};
use email_service::{EmailConfig, EmailService};
use payment_gateway::{HttpPaymentGateway, PaymentVerifier};
use qr_service::QrGenerator;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Main CareLink server state
#[derive(Clone)]
pub struct CarelinkServer {
    /// Server configuration
    pub config: ServerConfig,
    /// Database pool
    pub db_pool: PgPool,
    /// Eligibility resolution (direct + sponsored)
    pub resolver: EligibilityResolver,
    /// Sponsor/dependant directory
    pub directory: DependantDirectory,
    /// Benefit request lifecycle
    pub requests: BenefitRequestLedger,
    /// Balance ledger reads
    pub balance: BalanceLedger,
    /// Gateway-verified wallet top-ups
    pub wallet: WalletService,
    /// Loyalty card issuance
    pub cards: CardService,
    /// Outbound notifications
    pub email: EmailService,
    /// QR rendering for card issuance
    pub qr: QrGenerator,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server name
    pub name: String,
    /// Base URL of the customer-facing frontend (QR payloads link here)
    pub frontend_url: String,
    /// HS256 secret shared with the identity provider
    pub jwt_secret: String,
    /// Directory QR code PNGs are written to
    pub qr_directory: String,
    /// Payment gateway base URL
    pub gateway_url: String,
    /// Payment gateway secret key
    pub gateway_secret: String,
    /// Maximum database connections
    pub max_connections: u32,
}

impl ServerConfig {
    /// Load configuration from the environment. `JWT_SECRET` is required;
    /// everything else has a development default.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            name: "CareLink Engine".to_string(),
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            jwt_secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            qr_directory: std::env::var("QR_DIRECTORY")
                .unwrap_or_else(|_| "uploads/qrcode".to_string()),
            gateway_url: std::env::var("PAYMENT_GATEWAY_URL")
                .unwrap_or_else(|_| "https://api.paystack.co".to_string()),
            gateway_secret: std::env::var("PAYMENT_GATEWAY_SECRET").unwrap_or_default(),
            max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        })
    }
}

impl CarelinkServer {
    /// Create a server instance, connecting to `DATABASE_URL`.
    pub async fn new(config: ServerConfig) -> Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&database_url)
            .await
            .context("Failed to connect to database")?;
        Self::new_with_pool(pool, config)
    }

    /// Create a server instance over an existing pool (used by tests).
    pub fn new_with_pool(pool: PgPool, config: ServerConfig) -> Result<Self> {
        let policy = EligibilityPolicy::from_env();
        let gateway: Arc<dyn PaymentVerifier> = Arc::new(
            HttpPaymentGateway::new(config.gateway_url.clone(), config.gateway_secret.clone())
                .context("Failed to build payment gateway client")?,
        );
        Ok(Self::assemble(pool, config, policy, gateway))
    }

    /// Wire up all services. Exposed so tests can inject a mock gateway.
    pub fn assemble(
        pool: PgPool,
        config: ServerConfig,
        policy: EligibilityPolicy,
        gateway: Arc<dyn PaymentVerifier>,
    ) -> Self {
        let email = EmailService::new(EmailConfig::from_env());
        let qr = QrGenerator::new(&config.qr_directory);
        Self {
            resolver: EligibilityResolver::new(pool.clone(), policy.clone()),
            directory: DependantDirectory::new(pool.clone()),
            requests: BenefitRequestLedger::new(pool.clone(), policy.clone()),
            balance: BalanceLedger::new(pool.clone()),
            wallet: WalletService::new(pool.clone(), gateway),
            cards: CardService::new(pool.clone(), policy),
            email,
            qr,
            db_pool: pool,
            config,
        }
    }
}
