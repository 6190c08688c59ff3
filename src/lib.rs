pub mod app;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod expiry;
pub mod form;
pub mod handlers;
pub mod items;
pub mod models;
pub mod notifications;
pub mod rules;
pub mod state;
pub mod stats;
pub mod storage;
pub mod suggest;
pub mod ui;

pub use app::router;
pub use catalog::load_catalog;
pub use config::Config;
pub use state::AppState;
pub use storage::load_data;
