//! Business logic services

pub mod auth;
pub mod catalog;
pub mod loans;
pub mod seed;
pub mod stats;
pub mod users;

use crate::{config::AuthConfig, policy::FinePolicy, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub users: users::UsersService,
    pub loans: loans::LoansService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, fine_policy: FinePolicy) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            catalog: catalog::CatalogService::new(repository.clone()),
            users: users::UsersService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone(), fine_policy),
            stats: stats::StatsService::new(repository.clone()),
            repository,
        }
    }
}
