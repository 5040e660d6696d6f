use crate::helpers::declarations::{USERS, plan, up_sql};
use pgdelta::changeset::{ChangesetKind, Phase, WarningKind};
use pgdelta::migrate::render_plan_sql;

#[test]
fn test_identical_declarations_plan_nothing() {
    let result = plan(USERS, USERS);
    assert!(!result.has_changes);
    assert!(result.changesets.is_empty());
    assert_eq!(render_plan_sql(&result.phases), "-- No changes detected\n");
}

#[test]
fn test_formatting_differences_are_not_changes() {
    let remote = r#"
tables:
  users:
    columns:
      - name: id
        data_type: int8
      - name: status
        data_type: varchar(20)
        default: "'active'"
"#;
    let local = r#"
tables:
  users:
    columns:
      - name: id
        data_type: BIGINT
      - name: status
        data_type: character varying(20)
        default: "  'active'  "
"#;
    assert!(!plan(remote, local).has_changes);
}

#[test]
fn test_not_null_column_with_default_is_added_in_steps() {
    let local = r#"
tables:
  users:
    columns:
      - name: id
        data_type: bigint
      - name: email
        data_type: text
      - name: count
        data_type: integer
        nullable: false
        default: 0
    primary_key:
      columns: [id]
"#;
    let result = plan(USERS, local);
    assert_eq!(result.changesets.len(), 1);

    let changeset = &result.changesets[0];
    assert_eq!(changeset.kind, ChangesetKind::AddColumn);
    assert_eq!(changeset.phase, Phase::Expand);
    assert_eq!(changeset.warnings.len(), 1);
    assert_eq!(changeset.warnings[0].kind, WarningKind::MightFail);
    assert_eq!(changeset.warnings[0].code, "not_null_column");

    let up = up_sql(&result);
    assert_eq!(up.len(), 4);
    assert_eq!(
        up[0],
        "ALTER TABLE \"public\".\"users\" ADD COLUMN \"count\" integer;"
    );
    assert_eq!(
        up[1],
        "ALTER TABLE \"public\".\"users\" ALTER COLUMN \"count\" SET DEFAULT 0;"
    );
    assert!(up[2].starts_with("COMMENT ON COLUMN \"public\".\"users\".\"count\" IS '"));
    assert_eq!(
        up[3],
        "ALTER TABLE \"public\".\"users\" ALTER COLUMN \"count\" SET NOT NULL;"
    );
    assert_eq!(
        changeset.down_sql(),
        vec!["ALTER TABLE \"public\".\"users\" DROP COLUMN \"count\";"]
    );
}

#[test]
fn test_removed_column_is_contracted_with_warning() {
    let local = r#"
tables:
  users:
    columns:
      - name: id
        data_type: bigint
    primary_key:
      columns: [id]
"#;
    let result = plan(USERS, local);
    assert_eq!(result.changesets.len(), 1);
    assert_eq!(result.changesets[0].kind, ChangesetKind::DropColumn);
    assert_eq!(result.phases.len(), 1);
    assert_eq!(result.phases[0].phase, Phase::Contract);

    let codes: Vec<&str> = result.warnings().map(|(_, w)| w.code.as_str()).collect();
    assert_eq!(codes, vec!["drop_column"]);
}

#[test]
fn test_type_change_casts_existing_values() {
    let local = r#"
tables:
  users:
    columns:
      - name: id
        data_type: bigint
      - name: email
        data_type: varchar(320)
    primary_key:
      columns: [id]
"#;
    let result = plan(USERS, local);
    assert_eq!(result.changesets.len(), 1);
    assert_eq!(result.changesets[0].kind, ChangesetKind::AlterDataType);
    assert!(up_sql(&result)[0].contains("USING \"email\"::character varying(320)"));
    assert!(
        result
            .warnings()
            .any(|(_, w)| w.code == "alter_data_type")
    );
}

#[test]
fn test_new_table_comes_before_its_columns_objects() {
    let local = r#"
tables:
  users:
    columns:
      - name: id
        data_type: bigint
      - name: email
        data_type: text
    primary_key:
      columns: [id]
  sessions:
    columns:
      - name: id
        data_type: bigint
      - name: user_id
        data_type: bigint
    indexes:
      - columns: [user_id]
"#;
    let result = plan(USERS, local);
    let kinds: Vec<ChangesetKind> = result.changesets.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![ChangesetKind::CreateTable, ChangesetKind::CreateIndex]
    );
    assert!(result.phases.iter().all(|p| p.phase == Phase::Expand));
}
