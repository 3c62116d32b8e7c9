pub mod events;
pub mod filters;
pub mod markup;
pub mod reindex;
pub mod serialize;
pub mod sources;
pub mod submission;
pub mod types;
pub mod variants;
