#[cfg(test)]
mod tests {
    use mkmig::dialect::Dialect;
    use mkmig::libs::config::Config;
    use mkmig::migration::writer::MigrationWriter;
    use mkmig::schema::analyze::analyze;
    use mkmig::schema::diff::{diff, has_changes};
    use mkmig::schema::merge::merge;
    use mkmig::schema::model::Schema;
    use mkmig::schema::snapshot::SnapshotStore;
    use mkmig::schema::validate::validate;
    use std::path::Path;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct FlowTestContext {
        temp_dir: TempDir,
    }

    impl TestContext for FlowTestContext {
        fn setup() -> Self {
            FlowTestContext {
                temp_dir: tempfile::tempdir().unwrap(),
            }
        }
    }

    impl FlowTestContext {
        fn config(&self) -> Config {
            Config {
                migrations_dir: self.temp_dir.path().to_path_buf(),
                silent: true,
                ..Config::default()
            }
        }
    }

    fn schema(yaml: &str) -> Schema {
        serde_yaml::from_str(yaml).unwrap()
    }

    /// Runs the whole pipeline once: merge, validate, analyze, diff against
    /// the snapshot, write the migration, commit the snapshot.
    fn generate(config: &Config, documents: &[&str]) -> Option<mkmig::migration::writer::Migration> {
        let schemas: Vec<Schema> = documents.iter().map(|d| schema(d)).collect();
        let merged = merge(&schemas).unwrap();
        validate(&merged, config.dialect).unwrap();
        let analysis = analyze(&merged);

        let store = SnapshotStore::new(&config.migrations_dir, &config.snapshot_filename);
        let old_schema = store.load().unwrap();
        let old_analysis = old_schema.as_ref().map(analyze);

        let changes = diff(old_analysis.as_ref(), &analysis);
        if !has_changes(&changes) {
            return None;
        }

        let migration = MigrationWriter::new(config)
            .write(&changes, old_analysis.as_ref(), &analysis, None)
            .unwrap();
        store.save(&analysis.schema).unwrap();
        Some(migration)
    }

    fn sql_files(dir: &Path) -> Vec<String> {
        let mut files: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".sql"))
            .collect();
        files.sort();
        files
    }

    const USERS: &str = r#"
database:
  name: app
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
      - name: email
        type: varchar
        length: 255
        nullable: false
"#;

    #[test_context(FlowTestContext)]
    #[test]
    fn test_initial_generation(ctx: &mut FlowTestContext) {
        let config = ctx.config();
        let migration = generate(&config, &[USERS]).expect("initial migration");

        let content = std::fs::read_to_string(ctx.temp_dir.path().join(&migration.filename)).unwrap();
        assert!(content.contains("CREATE TABLE \"users\""));
        assert!(content.contains("\"id\" UUID NOT NULL DEFAULT gen_random_uuid()"));
        assert!(content.contains("\"email\" VARCHAR(255) NOT NULL"));
        assert!(content.contains("-- REVIEW: reverts add table users\nDROP TABLE \"users\";"));

        // The snapshot now equals the canonical form of the input schema.
        let store = SnapshotStore::new(&config.migrations_dir, &config.snapshot_filename);
        let snapshot = store.load().unwrap().expect("snapshot written");
        assert!(snapshot.table("users").is_some());
        let mut expected = merge(&[schema(USERS)]).unwrap();
        expected.database.tool_version = env!("CARGO_PKG_VERSION").to_string();
        assert_eq!(snapshot, expected);
    }

    #[test_context(FlowTestContext)]
    #[test]
    fn test_additive_change_generates_exactly_one_alter(ctx: &mut FlowTestContext) {
        let config = ctx.config();
        generate(&config, &[USERS]).expect("initial migration");

        let with_phone = r#"
database:
  name: app
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
      - name: email
        type: varchar
        length: 255
        nullable: false
      - name: phone
        type: varchar
        length: 20
        nullable: true
"#;
        let migration = generate(&config, &[with_phone]).expect("second migration");

        assert_eq!(migration.up_sql, "ALTER TABLE \"users\" ADD COLUMN \"phone\" VARCHAR(20);");
        assert_eq!(
            migration.down_sql,
            "-- REVIEW: reverts add column users.phone\nALTER TABLE \"users\" DROP COLUMN \"phone\";"
        );
    }

    #[test_context(FlowTestContext)]
    #[test]
    fn test_conflicting_documents_merge_to_the_stricter_column(ctx: &mut FlowTestContext) {
        let config = ctx.config();
        let loose = r#"
tables:
  - name: users
    fields:
      - name: id
        type: serial
        primary_key: true
      - name: email
        type: varchar
        length: 100
        nullable: true
"#;
        let strict = r#"
tables:
  - name: users
    fields:
      - name: email
        type: varchar
        length: 255
        nullable: false
"#;

        let migration = generate(&config, &[loose, strict]).expect("initial migration");
        assert!(migration.up_sql.contains("\"email\" VARCHAR(255) NOT NULL"));
    }

    #[test_context(FlowTestContext)]
    #[test]
    fn test_destructive_drop_with_silent_mode(ctx: &mut FlowTestContext) {
        let config = ctx.config();
        let with_posts = r#"
tables:
  - name: posts
    fields:
      - name: id
        type: serial
        primary_key: true
      - name: title
        type: varchar
        length: 200
        nullable: false
"#;
        generate(&config, &[with_posts]).expect("initial migration");

        let migration = generate(&config, &["tables: []\n"]).expect("drop migration");
        assert!(migration.destructive);
        assert!(migration.up_sql.contains("-- REVIEW: drop table posts\nDROP TABLE \"posts\";"));
        assert!(migration.down_sql.contains("CREATE TABLE \"posts\""));
        assert!(migration.down_sql.contains("\"title\" VARCHAR(200) NOT NULL"));
    }

    #[test_context(FlowTestContext)]
    #[test]
    fn test_no_changes_writes_nothing(ctx: &mut FlowTestContext) {
        let config = ctx.config();
        generate(&config, &[USERS]).expect("initial migration");
        let before = sql_files(ctx.temp_dir.path());

        // Identical schema: the pipeline reports no changes and the
        // migrations directory is untouched.
        assert!(generate(&config, &[USERS]).is_none());
        assert_eq!(sql_files(ctx.temp_dir.path()), before);
    }

    #[test_context(FlowTestContext)]
    #[test]
    fn test_pipeline_is_deterministic(ctx: &mut FlowTestContext) {
        let config_a = Config {
            migrations_dir: ctx.temp_dir.path().join("a"),
            silent: true,
            ..Config::default()
        };
        let config_b = Config {
            migrations_dir: ctx.temp_dir.path().join("b"),
            silent: true,
            ..Config::default()
        };

        let first = generate(&config_a, &[USERS]).expect("migration");
        let second = generate(&config_b, &[USERS]).expect("migration");

        assert_eq!(first.filename, second.filename);
        let left = std::fs::read_to_string(config_a.migrations_dir.join(&first.filename)).unwrap();
        let right = std::fs::read_to_string(config_b.migrations_dir.join(&second.filename)).unwrap();
        assert_eq!(left, right);

        let snap_left = std::fs::read_to_string(config_a.migrations_dir.join(&config_a.snapshot_filename)).unwrap();
        let snap_right = std::fs::read_to_string(config_b.migrations_dir.join(&config_b.snapshot_filename)).unwrap();
        assert_eq!(snap_left, snap_right);
    }

    #[test_context(FlowTestContext)]
    #[test]
    fn test_junction_tables_flow_through_to_ddl(ctx: &mut FlowTestContext) {
        let config = ctx.config();
        let with_m2m = r#"
tables:
  - name: posts
    fields:
      - name: id
        type: serial
        primary_key: true
      - name: tags
        type: many_to_many
        many_to_many:
          table: tags
  - name: tags
    fields:
      - name: id
        type: serial
        primary_key: true
"#;

        let migration = generate(&config, &[with_m2m]).expect("initial migration");

        assert!(migration.up_sql.contains("CREATE TABLE \"posts_tags\""));
        assert!(migration.up_sql.contains("CREATE UNIQUE INDEX \"idx_posts_tags_unique\""));
        // The relationship pseudo-field itself never becomes a column.
        assert!(!migration.up_sql.contains("\"tags\" BIGINT"));

        let store = SnapshotStore::new(&config.migrations_dir, &config.snapshot_filename);
        let snapshot = store.load().unwrap().expect("snapshot written");
        assert!(snapshot.table("posts_tags").is_some());

        // A rerun with the unchanged schema is a fixed point.
        assert!(generate(&config, &[with_m2m]).is_none());
    }

    #[test_context(FlowTestContext)]
    #[test]
    fn test_validation_blocks_generation(ctx: &mut FlowTestContext) {
        let config = ctx.config();
        let broken = schema(
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

        let merged = merge(&[broken]).unwrap();
        assert!(validate(&merged, Dialect::Postgresql).is_err());
        assert!(sql_files(ctx.temp_dir.path()).is_empty());
    }
}
