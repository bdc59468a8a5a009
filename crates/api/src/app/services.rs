//! Shared application services handed to every handler via `Extension`.
//!
//! Storage is injected here as trait objects; nothing in the HTTP layer
//! reaches for a global handle.

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;

use storefront_auth::{
    Gateway, Role, SessionTokens, SubjectId, TokenSessionResolver, User, decoy_hash, hash_password, normalize_email,
};
use storefront_infra::config::{AdminBootstrap, AppConfig, DatabaseConfig};
use storefront_infra::resolver::StoredRoleResolver;
use storefront_infra::store::{
    IdentityStore, InMemoryIdentityStore, InMemoryProductStore, PostgresIdentityStore, PostgresProductStore,
    ProductStore, connect, ensure_schema,
};

const DEFAULT_SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Clone)]
pub struct AppServices {
    pub gateway: Gateway,
    pub tokens: SessionTokens,
    pub identities: Arc<dyn IdentityStore>,
    pub products: Arc<dyn ProductStore>,
    pub session_ttl: chrono::Duration,
    pub secure_cookies: bool,
}

impl AppServices {
    /// Wire the gateway to a token resolver sharing `tokens`' key material.
    ///
    /// Resolved sessions are checked against the stored role, so a role
    /// change takes effect on the next request.
    pub fn new(tokens: SessionTokens, identities: Arc<dyn IdentityStore>, products: Arc<dyn ProductStore>) -> Self {
        let resolver = Arc::new(StoredRoleResolver::new(
            TokenSessionResolver::new(tokens.clone()),
            identities.clone(),
        ));
        Self {
            gateway: Gateway::new(resolver),
            tokens,
            identities,
            products,
            session_ttl: chrono::Duration::seconds(DEFAULT_SESSION_TTL_SECS),
            secure_cookies: true,
        }
    }

    /// Empty in-memory stores; used by tests and `DATABASE_URL=memory://`.
    pub fn in_memory(secret: &[u8]) -> Self {
        Self::new(
            SessionTokens::new(secret),
            Arc::new(InMemoryIdentityStore::new()),
            Arc::new(InMemoryProductStore::new()),
        )
    }

    pub fn with_gateway(mut self, gateway: Gateway) -> Self {
        self.gateway = gateway;
        self
    }

    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let tokens = SessionTokens::new(config.auth_secret.as_bytes());

        let mut services = match &config.database {
            DatabaseConfig::InMemory => {
                tracing::warn!("using in-memory stores; data is lost on restart");
                Self::new(
                    tokens,
                    Arc::new(InMemoryIdentityStore::new()),
                    Arc::new(InMemoryProductStore::new()),
                )
            }
            DatabaseConfig::Postgres { url, max_connections } => {
                let pool = connect(url, *max_connections)
                    .await
                    .context("failed to connect to database")?;
                ensure_schema(&pool).await.context("failed to create schema")?;
                tracing::info!(max_connections, "connected to postgres");
                Self::new(
                    tokens,
                    Arc::new(PostgresIdentityStore::new(pool.clone())),
                    Arc::new(PostgresProductStore::new(pool)),
                )
            }
        };

        services.gateway = services.gateway.clone().with_resolve_timeout(config.resolve_timeout);
        services.session_ttl =
            chrono::Duration::from_std(config.session_ttl).context("SESSION_TTL_SECS is out of range")?;
        services.secure_cookies = config.secure_cookies;

        // Pay for the decoy hash now rather than on the first unknown-email sign-in.
        tokio::task::spawn_blocking(decoy_hash)
            .await
            .context("failed to prepare decoy password hash")?;

        if let Some(admin) = &config.bootstrap_admin {
            services.bootstrap_admin(admin).await?;
        }

        Ok(services)
    }

    /// Make sure the configured admin identity exists.
    ///
    /// An existing account with that email is left untouched.
    pub async fn bootstrap_admin(&self, admin: &AdminBootstrap) -> anyhow::Result<()> {
        let email = normalize_email(&admin.email).context("ADMIN_EMAIL is invalid")?;

        if let Some(existing) = self.identities.find_by_email(&email).await? {
            if existing.role != Role::Admin {
                tracing::warn!(subject_id = %existing.id, "bootstrap admin email belongs to a non-admin account");
            }
            return Ok(());
        }

        let hash = hash_password(&admin.password).context("ADMIN_PASSWORD is invalid")?;
        let user = User::new(SubjectId::new(), &email, "Administrator", Role::Admin, hash, Utc::now())?;
        let id = user.id;
        self.identities.insert(user).await?;
        tracing::info!(subject_id = %id, "bootstrap admin created");
        Ok(())
    }
}
