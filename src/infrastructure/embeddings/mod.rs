#[cfg(feature = "minilm")]
pub mod minilm;
pub mod noop;
pub mod openai;
