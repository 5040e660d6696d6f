//! Hash-identified table objects.
//!
//! Indexes, unique/check/foreign key constraints and triggers are diffed by
//! the hash of a canonical definition. [`TableObject`] is the closed union of
//! those kinds so the diff and the generators can treat them uniformly.

use itertools::Itertools;
use serde::Serialize;

use super::constraint::{CheckConstraint, ForeignKey, UniqueConstraint};
use super::hash::{
    NameMap, canonicalize_expression, compute_hash, generated_name, parse_generated_name,
};
use super::index::Index;
use super::table::{PrimaryKey, Table};
use super::triggers::Trigger;
use crate::constants::{
    CHECK_SUFFIX, FOREIGN_KEY_SUFFIX, INDEX_SUFFIX, PRIMARY_KEY_SUFFIX, TRIGGER_SUFFIX,
    UNIQUE_SUFFIX,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Index,
    Unique,
    Check,
    ForeignKey,
    Trigger,
}

impl ObjectKind {
    /// Diff traversal order.
    pub const ALL: [ObjectKind; 5] = [
        ObjectKind::Index,
        ObjectKind::Unique,
        ObjectKind::Check,
        ObjectKind::ForeignKey,
        ObjectKind::Trigger,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            ObjectKind::Index => INDEX_SUFFIX,
            ObjectKind::Unique => UNIQUE_SUFFIX,
            ObjectKind::Check => CHECK_SUFFIX,
            ObjectKind::ForeignKey => FOREIGN_KEY_SUFFIX,
            ObjectKind::Trigger => TRIGGER_SUFFIX,
        }
    }

    /// Name of the table field holding objects of this kind.
    pub fn collection(self) -> &'static str {
        match self {
            ObjectKind::Index => "indexes",
            ObjectKind::Unique => "unique_constraints",
            ObjectKind::Check => "check_constraints",
            ObjectKind::ForeignKey => "foreign_keys",
            ObjectKind::Trigger => "triggers",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.collection())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableObject {
    Index(Index),
    Unique(UniqueConstraint),
    Check(CheckConstraint),
    ForeignKey(ForeignKey),
    Trigger(Trigger),
}

impl TableObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            TableObject::Index(_) => ObjectKind::Index,
            TableObject::Unique(_) => ObjectKind::Unique,
            TableObject::Check(_) => ObjectKind::Check,
            TableObject::ForeignKey(_) => ObjectKind::ForeignKey,
            TableObject::Trigger(_) => ObjectKind::Trigger,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            TableObject::Index(o) => o.name.as_deref(),
            TableObject::Unique(o) => o.name.as_deref(),
            TableObject::Check(o) => o.name.as_deref(),
            TableObject::ForeignKey(o) => o.name.as_deref(),
            TableObject::Trigger(o) => o.name.as_deref(),
        }
    }

    /// Copy of this object with table and column identifiers passed through
    /// `names`. `table` is the owning table as the object refers to it.
    pub fn translated(&self, schema: &str, table: &str, names: &NameMap) -> TableObject {
        if names.is_identity() {
            return self.clone();
        }
        let rewrite = |expr: &str| names.rewrite_expression(schema, table, expr);
        match self {
            TableObject::Index(index) => TableObject::Index(Index {
                columns: index.columns.iter().map(|c| rewrite(c.as_str())).collect(),
                predicate: index.predicate.as_deref().map(rewrite),
                ..index.clone()
            }),
            TableObject::Unique(unique) => TableObject::Unique(UniqueConstraint {
                columns: names.columns(schema, table, &unique.columns),
                ..unique.clone()
            }),
            TableObject::Check(check) => TableObject::Check(CheckConstraint {
                expression: rewrite(&check.expression),
                ..check.clone()
            }),
            TableObject::ForeignKey(fk) => {
                let ref_schema = fk.referenced_schema(schema);
                TableObject::ForeignKey(ForeignKey {
                    columns: names.columns(schema, table, &fk.columns),
                    referenced_table: names.table(ref_schema, &fk.referenced_table),
                    referenced_columns: names.columns(
                        ref_schema,
                        &fk.referenced_table,
                        &fk.referenced_columns,
                    ),
                    ..fk.clone()
                })
            }
            TableObject::Trigger(trigger) => TableObject::Trigger(Trigger {
                condition: trigger.condition.as_deref().map(rewrite),
                ..trigger.clone()
            }),
        }
    }

    /// Definition hashed to identify the object. Excludes the object's own name.
    pub fn canonical_definition(&self, schema: &str, table: &str, names: &NameMap) -> String {
        let canon_list = |items: &[String]| {
            items.iter().map(|i| canonicalize_expression(i)).join(", ")
        };

        match self.translated(schema, table, names) {
            TableObject::Index(index) => {
                let mut def = format!(
                    "{}{} ({})",
                    if index.unique { "unique " } else { "" },
                    index.method.to_lowercase(),
                    canon_list(&index.columns)
                );
                if let Some(predicate) = &index.predicate {
                    def.push_str(&format!(" where {}", canonicalize_expression(predicate)));
                }
                def
            }
            TableObject::Unique(unique) => format!("unique ({})", canon_list(&unique.columns)),
            TableObject::Check(check) => {
                format!("check ({})", canonicalize_expression(&check.expression))
            }
            TableObject::ForeignKey(fk) => format!(
                "foreign key ({}) references {}.{} ({}) on delete {} on update {}",
                canon_list(&fk.columns),
                fk.referenced_schema(schema),
                fk.referenced_table,
                canon_list(&fk.referenced_columns),
                fk.on_delete.to_string().to_lowercase(),
                fk.on_update.to_string().to_lowercase()
            ),
            TableObject::Trigger(trigger) => {
                let events = trigger
                    .sorted_events()
                    .iter()
                    .map(|e| e.to_string().to_lowercase())
                    .join(" or ");
                let mut def = format!(
                    "{} {} for each {}",
                    trigger.timing.to_string().to_lowercase(),
                    events,
                    if trigger.for_each_row { "row" } else { "statement" }
                );
                if let Some(condition) = &trigger.condition {
                    def.push_str(&format!(" when ({})", canonicalize_expression(condition)));
                }
                def.push_str(&format!(
                    " execute function {}({})",
                    trigger.function_in(schema).to_lowercase(),
                    trigger.arguments.join(", ")
                ));
                def
            }
        }
    }

    /// Diff identity: the hash embedded in a generated name, otherwise the
    /// hash of the canonical definition.
    pub fn hash(&self, schema: &str, table: &str, names: &NameMap) -> String {
        if let Some((_, hash, suffix)) = self.name().and_then(parse_generated_name)
            && suffix == self.kind().suffix()
        {
            return hash.to_string();
        }
        compute_hash(&self.canonical_definition(schema, table, names))
    }

    /// The name this object has, or will have once created on `table`.
    pub fn expected_name(&self, schema: &str, table: &str) -> String {
        match self.name() {
            Some(name) => name.to_string(),
            None => generated_name(
                table,
                &compute_hash(&self.canonical_definition(schema, table, &NameMap::identity())),
                self.kind().suffix(),
            ),
        }
    }
}

impl Table {
    pub fn objects(&self, kind: ObjectKind) -> Vec<TableObject> {
        match kind {
            ObjectKind::Index => self.indexes.iter().cloned().map(TableObject::Index).collect(),
            ObjectKind::Unique => self
                .unique_constraints
                .iter()
                .cloned()
                .map(TableObject::Unique)
                .collect(),
            ObjectKind::Check => self
                .check_constraints
                .iter()
                .cloned()
                .map(TableObject::Check)
                .collect(),
            ObjectKind::ForeignKey => self
                .foreign_keys
                .iter()
                .cloned()
                .map(TableObject::ForeignKey)
                .collect(),
            ObjectKind::Trigger => self
                .triggers
                .iter()
                .cloned()
                .map(TableObject::Trigger)
                .collect(),
        }
    }
}

pub fn primary_key_definition(pk: &PrimaryKey) -> String {
    format!("primary key ({})", pk.columns.join(", "))
}

/// Name of the primary key constraint as it exists, or will be created.
pub fn primary_key_name(table: &str, pk: &PrimaryKey) -> String {
    match &pk.name {
        Some(name) => name.clone(),
        None => generated_name(
            table,
            &compute_hash(&primary_key_definition(pk)),
            PRIMARY_KEY_SUFFIX,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::constraint::ReferentialAction;
    use crate::catalog::triggers::{TriggerEvent, TriggerTiming};

    fn fk() -> TableObject {
        TableObject::ForeignKey(ForeignKey {
            columns: vec!["author_id".to_string()],
            referenced_schema: None,
            referenced_table: "users".to_string(),
            referenced_columns: vec!["id".to_string()],
            on_delete: ReferentialAction::Cascade,
            on_update: ReferentialAction::NoAction,
            name: None,
        })
    }

    #[test]
    fn test_canonical_foreign_key() {
        assert_eq!(
            fk().canonical_definition("public", "posts", &NameMap::identity()),
            "foreign key (author_id) references public.users (id) on delete cascade on update no action"
        );
    }

    #[test]
    fn test_canonical_index_with_predicate() {
        let index = TableObject::Index(
            Index::on(&["email"])
                .unique()
                .with_predicate("(deleted_at IS NULL)"),
        );
        assert_eq!(
            index.canonical_definition("public", "users", &NameMap::identity()),
            "unique btree (email) where deleted_at is null"
        );
    }

    #[test]
    fn test_canonical_trigger_ignores_event_order() {
        let trigger = |events: Vec<TriggerEvent>| {
            TableObject::Trigger(Trigger {
                timing: TriggerTiming::Before,
                events,
                for_each_row: true,
                function: "public.touch".to_string(),
                arguments: vec![],
                condition: None,
                name: None,
            })
        };
        let a = trigger(vec![TriggerEvent::Update, TriggerEvent::Insert]);
        let b = trigger(vec![TriggerEvent::Insert, TriggerEvent::Update]);
        let names = NameMap::identity();
        assert_eq!(
            a.canonical_definition("public", "users", &names),
            "before insert or update for each row execute function touch()"
        );
        assert_eq!(a.hash("public", "users", &names), b.hash("public", "users", &names));
    }

    #[test]
    fn test_hash_prefers_generated_name() {
        let named = TableObject::Unique(UniqueConstraint {
            columns: vec!["email".to_string()],
            name: Some("users_0badc0de_key".to_string()),
        });
        assert_eq!(named.hash("public", "users", &NameMap::identity()), "0badc0de");

        let postgres_named = TableObject::Unique(UniqueConstraint {
            columns: vec!["email".to_string()],
            name: Some("users_email_key".to_string()),
        });
        let unnamed = TableObject::Unique(UniqueConstraint {
            columns: vec!["email".to_string()],
            name: None,
        });
        let names = NameMap::identity();
        assert_eq!(
            postgres_named.hash("public", "users", &names),
            unnamed.hash("public", "users", &names)
        );
    }

    #[test]
    fn test_previous_names_reproduce_remote_hash() {
        let remote = TableObject::Unique(UniqueConstraint {
            columns: vec!["email_address".to_string()],
            name: None,
        });
        let local = TableObject::Unique(UniqueConstraint {
            columns: vec!["email".to_string()],
            name: None,
        });
        let mut previous = NameMap::identity();
        previous.insert_table("public", "accounts", "users");
        previous.insert_column("public", "accounts", "email", "email_address");

        assert_eq!(
            local.hash("public", "accounts", &previous),
            remote.hash("public", "users", &NameMap::identity())
        );
    }

    #[test]
    fn test_translated_foreign_key_maps_referenced_table() {
        let mut previous = NameMap::identity();
        previous.insert_table("public", "users", "members");
        previous.insert_column("public", "users", "id", "member_id");

        let TableObject::ForeignKey(translated) = fk().translated("public", "posts", &previous)
        else {
            panic!("expected a foreign key");
        };
        assert_eq!(translated.referenced_table, "members");
        assert_eq!(translated.referenced_columns, vec!["member_id".to_string()]);
        assert_eq!(translated.columns, vec!["author_id".to_string()]);
    }

    #[test]
    fn test_expected_name_embeds_hash() {
        let name = fk().expected_name("public", "posts");
        let (owner, hash, suffix) = parse_generated_name(&name).unwrap();
        assert_eq!(owner, "posts");
        assert_eq!(suffix, "fkey");
        assert_eq!(hash, fk().hash("public", "posts", &NameMap::identity()));
    }
}
