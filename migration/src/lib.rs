pub use sea_orm_migration::prelude::*;

mod m20250901_101500_create_startups_table;
mod m20250901_102000_create_founders_table;
mod m20250901_103000_create_users_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_101500_create_startups_table::Migration),
            Box::new(m20250901_102000_create_founders_table::Migration),
            Box::new(m20250901_103000_create_users_table::Migration),
        ]
    }
}
