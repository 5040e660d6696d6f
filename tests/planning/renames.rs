use crate::helpers::declarations::{USERS, plan, plan_with, up_sql};
use pgdelta::changeset::ChangesetKind;
use pgdelta::diff::renames::{CannedRenames, NoRenames, RenameIntent};

const ACCOUNTS: &str = r#"
tables:
  accounts:
    columns:
      - name: id
        data_type: bigint
      - name: email
        data_type: text
    primary_key:
      columns: [id]
"#;

const USERS_WITH_CONTACT: &str = r#"
tables:
  users:
    columns:
      - name: id
        data_type: bigint
      - name: contact
        data_type: text
    primary_key:
      columns: [id]
"#;

fn table_rename() -> RenameIntent {
    RenameIntent::Table {
        schema: "public".to_string(),
        from: "users".to_string(),
        to: "accounts".to_string(),
    }
}

#[test]
fn test_configured_table_rename_replaces_drop_and_create() {
    let result = plan_with(USERS, ACCOUNTS, vec![table_rename()], &NoRenames);
    assert_eq!(result.applied_renames, vec![table_rename()]);
    assert_eq!(result.changesets.len(), 1);
    assert_eq!(result.changesets[0].kind, ChangesetKind::RenameTable);
    assert_eq!(
        up_sql(&result),
        vec!["ALTER TABLE \"public\".\"users\" RENAME TO \"accounts\";"]
    );
    assert_eq!(
        result.changesets[0].down_sql(),
        vec!["ALTER TABLE \"public\".\"accounts\" RENAME TO \"users\";"]
    );
}

#[test]
fn test_without_rename_the_table_is_dropped_and_created() {
    let result = plan(USERS, ACCOUNTS);
    let kinds: Vec<ChangesetKind> = result.changesets.iter().map(|c| c.kind).collect();
    assert!(kinds.contains(&ChangesetKind::CreateTable));
    assert!(kinds.contains(&ChangesetKind::DropTable));
    assert_eq!(result.unresolved_renames.len(), 1);
    assert!(result.warnings().any(|(_, w)| w.code == "unresolved_rename"));
}

#[test]
fn test_oracle_column_rename() {
    let oracle = CannedRenames(vec![RenameIntent::Column {
        schema: "public".to_string(),
        table: "users".to_string(),
        from: "email".to_string(),
        to: "contact".to_string(),
    }]);
    let result = plan_with(USERS, USERS_WITH_CONTACT, Vec::new(), &oracle);
    assert_eq!(result.changesets.len(), 1);
    assert_eq!(result.changesets[0].kind, ChangesetKind::RenameColumn);
    assert!(result.unresolved_renames.is_empty());
}

#[test]
fn test_intent_that_matches_nothing_is_ignored() {
    let stale = RenameIntent::Table {
        schema: "public".to_string(),
        from: "members".to_string(),
        to: "people".to_string(),
    };
    let result = plan_with(USERS, USERS, vec![stale], &NoRenames);
    assert!(result.applied_renames.is_empty());
    assert!(!result.has_changes);
}
