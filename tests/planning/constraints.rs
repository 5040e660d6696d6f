use crate::helpers::declarations::{plan, up_sql};
use pgdelta::changeset::{ChangesetKind, Phase, WarningKind};

const WITH_UNIQUE: &str = r#"
tables:
  users:
    columns:
      - name: id
        data_type: bigint
      - name: email
        data_type: text
    unique_constraints:
      - columns: [email]
        name: users_email_key
"#;

const WITHOUT_UNIQUE: &str = r#"
tables:
  users:
    columns:
      - name: id
        data_type: bigint
      - name: email
        data_type: text
"#;

#[test]
fn test_dropped_unique_is_restored_on_rollback() {
    let result = plan(WITH_UNIQUE, WITHOUT_UNIQUE);
    assert_eq!(result.changesets.len(), 1);

    let changeset = &result.changesets[0];
    assert_eq!(changeset.kind, ChangesetKind::DropUnique);
    assert_eq!(changeset.phase, Phase::Contract);
    assert_eq!(
        changeset.up_sql(),
        vec!["ALTER TABLE \"public\".\"users\" DROP CONSTRAINT \"users_email_key\";"]
    );
    assert_eq!(
        changeset.down_sql(),
        vec![
            "ALTER TABLE \"public\".\"users\" ADD CONSTRAINT \"users_email_key\" UNIQUE (\"email\");"
        ]
    );
}

#[test]
fn test_added_unique_might_fail_on_existing_rows() {
    let local = r#"
tables:
  users:
    columns:
      - name: id
        data_type: bigint
      - name: email
        data_type: text
    unique_constraints:
      - columns: [email]
"#;
    let result = plan(WITHOUT_UNIQUE, local);
    assert_eq!(result.changesets.len(), 1);
    assert_eq!(result.changesets[0].kind, ChangesetKind::CreateUnique);
    assert!(
        result
            .warnings()
            .any(|(_, w)| w.kind == WarningKind::MightFail && w.code == "unique_existing_rows")
    );
    assert!(up_sql(&result)[0].contains("UNIQUE (\"email\")"));
}

#[test]
fn test_index_on_existing_table_is_built_concurrently_outside_transaction() {
    let local = r#"
tables:
  users:
    columns:
      - name: id
        data_type: bigint
      - name: email
        data_type: text
    indexes:
      - columns: [email]
"#;
    let result = plan(WITHOUT_UNIQUE, local);
    assert_eq!(result.changesets.len(), 1);
    assert!(up_sql(&result)[0].starts_with("CREATE INDEX CONCURRENTLY"));
    assert_eq!(result.phases.len(), 1);
    assert!(!result.phases[0].transactional);
}

#[test]
fn test_equivalent_constraints_are_not_changes() {
    let local = r#"
tables:
  users:
    columns:
      - name: id
        data_type: bigint
      - name: email
        data_type: text
    unique_constraints:
      - columns: [email]
        name: users_email_key
"#;
    assert!(!plan(WITH_UNIQUE, local).has_changes);
}
