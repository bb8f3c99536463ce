type AppState = axum::extract::State<std::sync::Arc<crate::AppState>>;

mod gate;
pub use gate::gate;
