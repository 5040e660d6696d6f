use crate::helpers::declarations::{USERS, plan};
use pgdelta::changeset::Phase;
use pgdelta::migrate::render_plan_sql;

const REWORKED: &str = r#"
tables:
  users:
    columns:
      - name: id
        data_type: bigint
      - name: name
        data_type: text
    primary_key:
      columns: [id]
"#;

#[test]
fn test_phases_run_in_deployment_order() {
    let result = plan(USERS, REWORKED);
    let phases: Vec<Phase> = result.phases.iter().map(|p| p.phase).collect();
    assert_eq!(phases, vec![Phase::Expand, Phase::Contract]);
}

#[test]
fn test_rollback_undoes_contract_before_expand() {
    let result = plan(USERS, REWORKED);
    let rollback = render_plan_sql(&result.rollback);

    let restore = rollback
        .find("ADD COLUMN \"email\" text")
        .expect("rollback restores the dropped column");
    let remove = rollback
        .find("DROP COLUMN \"name\"")
        .expect("rollback drops the added column");
    assert!(restore < remove);
}
