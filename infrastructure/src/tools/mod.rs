//! Tool schema serialization
//!
//! The SQL tools themselves live in the application layer
//! (`SqlToolSet`); this module only renders their definitions for the
//! completion API.

mod schema;

pub use schema::JsonSchemaToolConverter;
