pub mod prep;
pub mod records;
