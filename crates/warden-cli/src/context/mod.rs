mod app_context;
mod fixtures;
mod project_root;

pub use app_context::AppContext;
pub use fixtures::{DEFAULT_FIXTURES_FILE, load_registry};
pub use project_root::find_project_root;
