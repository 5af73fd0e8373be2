#[cfg(test)]
mod tests {
    use mkmig::dialect::Dialect;
    use mkmig::schema::model::Schema;
    use mkmig::schema::validate::{validate, Severity};
    use mkmig::schema::Error;

    fn schema(yaml: &str) -> Schema {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn errors_of(result: Result<Vec<mkmig::schema::validate::Finding>, Error>) -> Vec<String> {
        match result {
            Err(Error::Validation(findings)) => findings
                .iter()
                .filter(|f| f.severity == Severity::Error)
                .map(|f| format!("{}: {}", f.location, f.message))
                .collect(),
            other => panic!("expected validation failure, got {:?}", other.map(|w| w.len())),
        }
    }

    #[test]
    fn test_valid_schema_passes_with_no_findings() {
        let schema = schema(
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
    indexes:
      - name: idx_users_email
        fields: [email]
        unique: true
"#,
        );

        let findings = validate(&schema, Dialect::Postgresql).unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn test_structural_errors_accumulate() {
        // Three independent structural problems must all be reported in one run.
        let schema = schema(
            r#"
tables:
  - name: users
    fields:
      - name: id
        type: serial
        primary_key: true
        nullable: true
      - name: age
        type: integer
        length: 10
      - name: created_at
        type: date
        auto_create: true
"#,
        );

        let errors = errors_of(validate(&schema, Dialect::Postgresql));
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.contains("users.id")));
        assert!(errors.iter().any(|e| e.contains("users.age")));
        assert!(errors.iter().any(|e| e.contains("users.created_at")));
    }

    #[test]
    fn test_duplicate_names_are_errors() {
        let schema = schema(
            r#"
tables:
  - name: users
    fields:
      - name: id
        type: serial
        primary_key: true
      - name: id
        type: integer
"#,
        );

        let errors = errors_of(validate(&schema, Dialect::Postgresql));
        assert!(errors.iter().any(|e| e.contains("duplicate field name")));
    }

    #[test]
    fn test_multiple_primary_keys_are_an_error() {
        let schema = schema(
            r#"
tables:
  - name: users
    fields:
      - name: id
        type: serial
        primary_key: true
      - name: uuid
        type: uuid
        primary_key: true
"#,
        );

        let errors = errors_of(validate(&schema, Dialect::Postgresql));
        assert!(errors.iter().any(|e| e.contains("more than one primary key")));
    }

    #[test]
    fn test_foreign_key_target_must_exist() {
        let schema = schema(
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
"#,
        );

        let errors = errors_of(validate(&schema, Dialect::Postgresql));
        assert!(errors.iter().any(|e| e.contains("unknown table 'users'")));
    }

    #[test]
    fn test_foreign_key_target_needs_primary_key() {
        let schema = schema(
            r#"
tables:
  - name: users
    fields:
      - name: email
        type: varchar
        length: 64
  - name: posts
    fields:
      - name: id
        type: serial
        primary_key: true
      - name: author_id
        type: foreign_key
        foreign_key:
          table: users
"#,
        );

        let errors = errors_of(validate(&schema, Dialect::Postgresql));
        assert!(errors.iter().any(|e| e.contains("no primary key")));
    }

    #[test]
    fn test_index_fields_must_exist() {
        let schema = schema(
            r#"
tables:
  - name: users
    fields:
      - name: id
        type: serial
        primary_key: true
    indexes:
      - name: idx_users_email
        fields: [email]
"#,
        );

        let errors = errors_of(validate(&schema, Dialect::Postgresql));
        assert!(errors.iter().any(|e| e.contains("unknown field 'email'")));
    }

    #[test]
    fn test_unresolvable_symbolic_default_is_an_error() {
        // `new_uuid` is symbolic and has no postgresql defaults entry here.
        let schema = schema(
            r#"
tables:
  - name: users
    fields:
      - name: id
        type: uuid
        primary_key: true
        default: new_uuid
"#,
        );

        let errors = errors_of(validate(&schema, Dialect::Postgresql));
        assert!(errors.iter().any(|e| e.contains("new_uuid")));
    }

    #[test]
    fn test_symbolic_default_resolves_through_defaults_table() {
        let schema = schema(
            r#"
defaults:
  postgresql:
    new_uuid: gen_random_uuid()
tables:
  - name: users
    fields:
      - name: id
        type: uuid
        primary_key: true
        default: new_uuid
"#,
        );

        assert!(validate(&schema, Dialect::Postgresql).unwrap().is_empty());
    }

    #[test]
    fn test_varchar_cap_is_dialect_specific() {
        let schema = schema(
            r#"
tables:
  - name: notes
    fields:
      - name: id
        type: serial
        primary_key: true
      - name: body
        type: varchar
        length: 9000
"#,
        );

        // Over the SQL Server cap, fine everywhere else.
        assert!(matches!(validate(&schema, Dialect::Sqlserver), Err(Error::Validation(_))));
        assert!(validate(&schema, Dialect::Postgresql).unwrap().is_empty());
    }

    #[test]
    fn test_json_degradation_is_a_warning_not_an_error() {
        let schema = schema(
            r#"
tables:
  - name: events
    fields:
      - name: id
        type: serial
        primary_key: true
      - name: payload
        type: jsonb
"#,
        );

        let findings = validate(&schema, Dialect::Sqlite).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Warning);
        assert!(findings[0].message.contains("TEXT"));
    }

    #[test]
    fn test_varchar_without_length_warns() {
        let schema = schema(
            r#"
tables:
  - name: users
    fields:
      - name: id
        type: serial
        primary_key: true
      - name: name
        type: varchar
"#,
        );

        let findings = validate(&schema, Dialect::Postgresql).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Warning);
    }
}
