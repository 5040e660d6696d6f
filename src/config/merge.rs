use crate::config::types::*;

/// Trait for merging optional configuration values
pub trait Merge<T> {
    fn merge(self, other: T) -> T;
}

impl<T> Merge<Option<T>> for Option<T> {
    fn merge(self, other: Option<T>) -> Option<T> {
        other.or(self)
    }
}

impl Merge<ConfigInput> for ConfigInput {
    fn merge(self, other: ConfigInput) -> ConfigInput {
        ConfigInput {
            database: self.database.merge(other.database),
            schema: match (self.schema, other.schema) {
                (Some(a), Some(b)) => Some(a.merge_with(b)),
                (a, b) => b.or(a),
            },
            renames: match (self.renames, other.renames) {
                (Some(a), Some(b)) => Some(a.merge_with(b)),
                (a, b) => b.or(a),
            },
        }
    }
}

impl SchemaInput {
    pub fn merge_with(self, other: SchemaInput) -> SchemaInput {
        SchemaInput {
            name: other.name.or(self.name),
            camel_case_enabled: other.camel_case_enabled.or(self.camel_case_enabled),
            introspect: other.introspect.or(self.introspect),
        }
    }
}

impl RenamesInput {
    /// Renames accumulate across layers instead of overriding.
    pub fn merge_with(self, other: RenamesInput) -> RenamesInput {
        fn concat<T>(a: Option<Vec<T>>, b: Option<Vec<T>>) -> Option<Vec<T>> {
            match (a, b) {
                (Some(mut a), Some(b)) => {
                    a.extend(b);
                    Some(a)
                }
                (a, b) => b.or(a),
            }
        }
        RenamesInput {
            tables: concat(self.tables, other.tables),
            columns: concat(self.columns, other.columns),
        }
    }
}
