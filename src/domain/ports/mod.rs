pub mod collection_store;
pub mod embedding_port;
