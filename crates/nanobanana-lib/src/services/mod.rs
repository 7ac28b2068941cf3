// Services module
// Business logic: media generation, history persistence and the workflow

pub mod download;
pub mod history;
pub mod media;
pub mod workflow;

pub use download::*;
pub use history::*;
pub use workflow::*;
