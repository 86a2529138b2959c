//! CLI command implementations.

mod config;
mod doctor;
mod export;
mod ingest;
mod list;
mod search;
mod serve;

pub use config::run_config;
pub use doctor::run_doctor;
pub use export::run_export;
pub use ingest::run_ingest;
pub use list::run_list;
pub use search::run_search;
pub use serve::{router, run_serve, AppState};
