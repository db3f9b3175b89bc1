//! # Schoolhouse CLI
//!
//! Administrative tasks that run directly against the database: creating a
//! teacher (login account plus profile) and seeding fake data for
//! development.
//!
//! ```ignore
//! use schoolhouse_cli::seeder::{seed_all, SeedConfig};
//!
//! seed_all(&pool, SeedConfig::default()).await?;
//! ```

pub mod seeder;
pub mod teachers;
