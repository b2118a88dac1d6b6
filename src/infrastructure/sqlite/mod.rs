pub mod collection_store;
pub mod migrations;
