use anyhow::{anyhow, Context};
use diesel::{
	prelude::*,
	r2d2::{self, ConnectionManager},
};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub fn get_db_pool(database_url: &str, max_size: u32) -> anyhow::Result<DbPool> {
	let manager = ConnectionManager::<PgConnection>::new(database_url);
	r2d2::Pool::builder().max_size(max_size).build(manager).context("Failed to create pool")
}

/// Applies any migration not yet recorded in the database.
pub fn init(pool: &DbPool) -> anyhow::Result<()> {
	let mut conn = pool.get().context("can not get a connection from the pool")?;
	let applied = conn
		.run_pending_migrations(MIGRATIONS)
		.map_err(|e| anyhow!("failed to run migrations: {e}"))?;
	for version in applied {
		log::info!("Applied migration {}", version);
	}
	Ok(())
}
