pub mod collection;
pub mod record;
pub mod retrieval;
