pub mod app;
pub mod clock;
pub mod delivery;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod occurrence;
pub mod recovery;
pub mod scheduler;
pub mod state;
pub mod storage;
pub mod ui;
pub mod worker;

pub use app::router;
pub use state::AppState;
pub use storage::{load_state, resolve_data_path, Store};
