pub mod commit;
pub mod differ;
pub mod engine;
pub mod group_check;
pub mod loader;
pub mod normalize;
pub mod review;

pub use crate::domain::model::{ChangeSet, DirectoryRecord, SourceRecord};
pub use crate::domain::ports::{AnswerSource, DirectoryClient};
pub use crate::utils::error::Result;
