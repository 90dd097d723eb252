pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users;
mod m20250301_000002_create_movie;
mod m20250301_000003_create_review;
mod m20250301_000004_create_comment;
mod m20250302_000001_create_session;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users::Migration),
            Box::new(m20250301_000002_create_movie::Migration),
            Box::new(m20250301_000003_create_review::Migration),
            Box::new(m20250301_000004_create_comment::Migration),
            Box::new(m20250302_000001_create_session::Migration),
        ]
    }
}
