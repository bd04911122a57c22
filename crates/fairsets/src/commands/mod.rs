pub mod codes;
pub mod diabetes;
