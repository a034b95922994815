pub mod assembler;
pub mod form;
pub mod handlers;
pub mod session;
