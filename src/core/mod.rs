//! 核心：错误分类

pub mod error;

pub use error::FetchError;
