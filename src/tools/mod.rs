//! Tool abstractions and the photo search tool

pub mod function_factory;
pub mod tool;
pub mod unsplash;

pub use function_factory::FunctionFactory;
pub use tool::{Tool, ToolFuture, ToolRegistry};
pub use unsplash::{Photo, UnsplashTool};
