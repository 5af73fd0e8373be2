#[cfg(test)]
mod tests {
    use mkmig::schema::analyze::{analyze, Analysis};
    use mkmig::schema::diff::{diff, has_changes, Change};
    use mkmig::schema::model::Schema;

    fn analyzed(yaml: &str) -> Analysis {
        let schema: Schema = serde_yaml::from_str(yaml).unwrap();
        analyze(&schema)
    }

    const USERS: &str = r#"
tables:
  - name: users
    fields:
      - name: id
        type: serial
        primary_key: true
      - name: email
        type: varchar
        length: 255
        nullable: false
"#;

    #[test]
    fn test_diff_against_self_is_empty() {
        let analysis = analyzed(USERS);
        let changes = diff(Some(&analysis), &analysis);
        assert!(!has_changes(&changes));
    }

    #[test]
    fn test_cosmetic_nullable_respelling_is_not_a_change() {
        let implicit = analyzed("tables:\n  - name: users\n    fields:\n      - name: bio\n        type: text\n");
        let explicit = analyzed("tables:\n  - name: users\n    fields:\n      - name: bio\n        type: text\n        nullable: true\n");

        assert!(!has_changes(&diff(Some(&implicit), &explicit)));
    }

    #[test]
    fn test_initial_diff_adds_every_table_in_dependency_order() {
        let analysis = analyzed(
            r#"
tables:
  - name: posts
    fields:
      - name: id
        type: serial
        primary_key: true
      - name: author_id
        type: foreign_key
        foreign_key:
          table: users
  - name: users
    fields:
      - name: id
        type: serial
        primary_key: true
"#,
        );

        let changes = diff(None, &analysis);
        assert_eq!(
            changes,
            vec![Change::TableAdded("users".to_string()), Change::TableAdded("posts".to_string())]
        );
    }

    #[test]
    fn test_field_addition() {
        let old = analyzed(USERS);
        let new = analyzed(
            r#"
tables:
  - name: users
    fields:
      - name: id
        type: serial
        primary_key: true
      - name: email
        type: varchar
        length: 255
        nullable: false
      - name: phone
        type: varchar
        length: 20
"#,
        );

        let changes = diff(Some(&old), &new);
        assert_eq!(
            changes,
            vec![Change::FieldAdded {
                table: "users".to_string(),
                field: "phone".to_string()
            }]
        );
    }

    #[test]
    fn test_field_modification() {
        let old = analyzed(USERS);
        let new = analyzed(
            r#"
tables:
  - name: users
    fields:
      - name: id
        type: serial
        primary_key: true
      - name: email
        type: varchar
        length: 320
        nullable: false
"#,
        );

        let changes = diff(Some(&old), &new);
        assert_eq!(
            changes,
            vec![Change::FieldModified {
                table: "users".to_string(),
                field: "email".to_string()
            }]
        );
    }

    #[test]
    fn test_removed_tables_come_out_in_reverse_dependency_order() {
        let old = analyzed(
            r#"
tables:
  - name: posts
    fields:
      - name: id
        type: serial
        primary_key: true
      - name: author_id
        type: foreign_key
        foreign_key:
          table: users
  - name: users
    fields:
      - name: id
        type: serial
        primary_key: true
"#,
        );
        let new = analyzed("tables: []\n");

        let changes = diff(Some(&old), &new);
        // Dependents first: posts references users, so posts drops first.
        assert_eq!(
            changes,
            vec![Change::TableRemoved("posts".to_string()), Change::TableRemoved("users".to_string())]
        );
    }

    #[test]
    fn test_index_redefinition_is_remove_then_add() {
        let old = analyzed(
            r#"
tables:
  - name: users
    fields:
      - name: id
        type: serial
        primary_key: true
      - name: email
        type: varchar
        length: 255
    indexes:
      - name: idx_users_email
        fields: [email]
"#,
        );
        let new = analyzed(
            r#"
tables:
  - name: users
    fields:
      - name: id
        type: serial
        primary_key: true
      - name: email
        type: varchar
        length: 255
    indexes:
      - name: idx_users_email
        fields: [email]
        unique: true
"#,
        );

        let changes = diff(Some(&old), &new);
        assert_eq!(
            changes,
            vec![
                Change::IndexRemoved {
                    table: "users".to_string(),
                    index: "idx_users_email".to_string()
                },
                Change::IndexAdded {
                    table: "users".to_string(),
                    index: "idx_users_email".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_mixed_changes_keep_stable_grouping() {
        let old = analyzed(USERS);
        let new = analyzed(
            r#"
tables:
  - name: posts
    fields:
      - name: id
        type: serial
        primary_key: true
      - name: author_id
        type: foreign_key
        foreign_key:
          table: users
  - name: users
    fields:
      - name: id
        type: serial
        primary_key: true
"#,
        );

        let changes = diff(Some(&old), &new);
        assert_eq!(
            changes,
            vec![
                Change::TableAdded("posts".to_string()),
                Change::FieldRemoved {
                    table: "users".to_string(),
                    field: "email".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_diff_is_deterministic() {
        let old = analyzed(USERS);
        let new = analyzed(
            r#"
tables:
  - name: users
    fields:
      - name: id
        type: serial
        primary_key: true
      - name: email
        type: varchar
        length: 320
      - name: phone
        type: varchar
        length: 20
"#,
        );

        let first = diff(Some(&old), &new);
        let second = diff(Some(&old), &new);
        assert_eq!(first, second);
    }
}
