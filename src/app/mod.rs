pub mod api;
pub mod context;
pub mod server;

pub use context::{AppContext, BackgroundTasks};
