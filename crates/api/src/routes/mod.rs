pub mod movies;
pub mod ops;
