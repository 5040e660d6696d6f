pub mod introspect;
pub mod plan;
