pub mod history;
pub mod preprocess;
pub mod sources;
pub mod state;
