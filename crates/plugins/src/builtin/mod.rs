//! Plugins shipped with LinkGator.

mod local_auth;
mod memory_database;
mod sql_database;
mod theme;

pub use local_auth::LocalAuthPlugin;
pub use memory_database::MemoryDatabasePlugin;
pub use sql_database::SqlDatabasePlugin;
pub use theme::CssThemePlugin;
