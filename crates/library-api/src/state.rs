use std::sync::Arc;

use library_core::repositories::{
    CategoryRepository, CollectionRepository, GuestLogRepository, MemberRepository, UserRepository,
};
use library_core::services::{
    AuthService, CategoryService, CollectionService, GuestService, IdentitySyncService, MemberService,
};
use library_core::{CoverStore, IdentityGateway};
use library_security::JwtService;
use library_shared::config::AppConfig;

use crate::middleware::rate_limit::IpRateLimiter;

/// Adapters the services are built on.
pub struct Ports {
    pub users: Arc<dyn UserRepository>,
    pub members: Arc<dyn MemberRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub collections: Arc<dyn CollectionRepository>,
    pub guest_logs: Arc<dyn GuestLogRepository>,
    pub gateway: Arc<dyn IdentityGateway>,
    pub covers: Arc<dyn CoverStore>,
}

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub categories: Arc<CategoryService>,
    pub collections: Arc<CollectionService>,
    pub guests: Arc<GuestService>,
    pub members: Arc<MemberService>,
    pub users: Arc<dyn UserRepository>,
    pub jwt: JwtService,
    pub auth_limiter: IpRateLimiter,
}

impl AppState {
    pub fn new(ports: Ports, config: &AppConfig) -> Self {
        let jwt = JwtService::new(config.jwt.secret.clone(), config.jwt.access_token_expiry);
        let sync = Arc::new(IdentitySyncService::new(ports.users.clone(), ports.members.clone()));

        Self {
            auth: Arc::new(AuthService::new(
                ports.gateway.clone(),
                sync,
                ports.users.clone(),
                jwt.clone(),
            )),
            categories: Arc::new(CategoryService::new(ports.categories.clone())),
            collections: Arc::new(CollectionService::new(
                ports.collections,
                ports.categories,
                ports.covers,
            )),
            guests: Arc::new(GuestService::new(
                ports.gateway,
                ports.guest_logs,
                config.app.utc_offset_hours,
                config.app.default_institution.clone(),
            )),
            members: Arc::new(MemberService::new(ports.members, ports.users.clone())),
            users: ports.users,
            jwt,
            auth_limiter: IpRateLimiter::per_minute(config.rate_limit.auth_per_minute),
        }
    }
}
