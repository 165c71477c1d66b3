pub use sea_orm_migration::prelude::*;

mod m20251001_000001_create_promo_orders;
mod m20251001_000002_create_prize_counts;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251001_000001_create_promo_orders::Migration),
            Box::new(m20251001_000002_create_prize_counts::Migration),
        ]
    }
}
