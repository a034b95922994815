pub mod aggregate;
pub mod charts;
pub mod export;
pub mod format;
pub mod handlers;
pub mod summary;
pub mod table;
