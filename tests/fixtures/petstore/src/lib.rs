// Petstore test fixture - models spread over several modules
pub mod models;
pub mod store;
