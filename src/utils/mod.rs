pub mod naming;
pub mod scratch;
