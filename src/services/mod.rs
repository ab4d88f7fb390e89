//! Business logic services

pub mod borrows;
pub mod catalog;
pub mod sessions;
pub mod users;

use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub sessions: sessions::SessionService,
    pub users: users::UsersService,
    pub catalog: catalog::CatalogService,
    pub borrows: borrows::BorrowsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, sessions: sessions::SessionService) -> Self {
        Self {
            sessions,
            users: users::UsersService::new(repository.clone()),
            catalog: catalog::CatalogService::new(repository.clone()),
            borrows: borrows::BorrowsService::new(repository),
        }
    }
}
