mod credentials;
mod seeder;

pub use credentials::{hash_password, random_string, DAEMON_TOKEN_ID_LEN, DAEMON_TOKEN_LEN};
pub use seeder::{Provisioned, SeedReport, Seeder};
