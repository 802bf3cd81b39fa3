pub use sea_orm_migration::prelude::*;

mod m20260815_000001_users;
mod m20260815_000002_statuses;
mod m20260815_000003_follows;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260815_000001_users::Migration),
            Box::new(m20260815_000002_statuses::Migration),
            Box::new(m20260815_000003_follows::Migration),
        ]
    }
}
