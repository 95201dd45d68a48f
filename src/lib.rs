pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use app::{AppContext, BackgroundTasks};
pub use config::AppConfig;
pub use crate::core::{directory::DirectoryClient, dispatcher::TaskDispatcher};
pub use domain::model::{CountryRequest, CountryResult, UniversityRecord};
pub use utils::error::{Result, ServiceError};
