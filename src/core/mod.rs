pub mod backend;
pub mod broker;
pub mod directory;
pub mod dispatcher;
pub mod group;
pub mod retry;
pub mod tasks;

pub use crate::domain::model::{merge_into, CountryRequest, CountryResult, UniversityRecord};
pub use crate::domain::ports::{DirectorySource, ResultBackend};
pub use crate::domain::task::{TaskId, TaskInfo, TaskKind, TaskState};
pub use crate::utils::error::Result;
