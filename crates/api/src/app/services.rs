use std::sync::Arc;

use chrono::Duration;

use cohabit_auth::{SessionIssuer, StaticIdentityVerifier};
use cohabit_directory::{
    AccountDirectory, CommunityDirectory, InMemoryAccountDirectory, InMemoryCommunityDirectory,
};
use cohabit_membership::{AuthorizationGuard, IdentityBridge, MembershipLifecycle, RandomCodes};

/// Runtime configuration for the API process.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HS256 secret the session tokens are signed with.
    pub session_secret: String,
    /// Session token lifetime.
    pub session_ttl: Duration,
}

impl ApiConfig {
    /// Read configuration from the environment, warning on insecure defaults.
    pub fn from_env() -> Self {
        let session_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let session_ttl = std::env::var("SESSION_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .map(Duration::seconds)
            .unwrap_or_else(|| Duration::minutes(15));

        Self {
            session_secret,
            session_ttl,
        }
    }
}

/// Everything the handlers need, wired once at startup.
///
/// The directory and verifier handles stay typed to the in-memory
/// implementations: this is the dev/test wiring (the reference semantics).
/// A deployment swaps in its own stores and identity-provider client behind
/// the same `AccountDirectory`/`CommunityDirectory`/`IdentityVerifier` seams.
pub struct AppServices {
    pub accounts: Arc<dyn AccountDirectory>,
    pub communities: Arc<dyn CommunityDirectory>,
    pub verifier: Arc<StaticIdentityVerifier>,
    pub sessions: Arc<SessionIssuer>,
    pub guard: Arc<AuthorizationGuard>,
    pub bridge: IdentityBridge,
    pub lifecycle: MembershipLifecycle,
}

/// Wire the in-memory service graph for the given configuration.
pub fn build_services(config: &ApiConfig) -> AppServices {
    let accounts: Arc<dyn AccountDirectory> = Arc::new(InMemoryAccountDirectory::new());
    let communities: Arc<dyn CommunityDirectory> = Arc::new(InMemoryCommunityDirectory::new());
    let verifier = Arc::new(StaticIdentityVerifier::new());
    let sessions = Arc::new(SessionIssuer::new(
        config.session_secret.as_bytes(),
        config.session_ttl,
    ));

    let guard = Arc::new(AuthorizationGuard::new(sessions.clone(), accounts.clone()));
    let bridge = IdentityBridge::new(verifier.clone(), sessions.clone(), accounts.clone());
    let lifecycle = MembershipLifecycle::new(
        accounts.clone(),
        communities.clone(),
        Arc::new(RandomCodes),
        sessions.clone(),
    );

    AppServices {
        accounts,
        communities,
        verifier,
        sessions,
        guard,
        bridge,
        lifecycle,
    }
}
