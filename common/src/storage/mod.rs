pub mod corpus;
pub mod store;
pub mod types;
