// Data models module

pub mod history;
pub mod prompt;
pub mod workflow;

pub use history::*;
pub use prompt::*;
pub use workflow::*;
