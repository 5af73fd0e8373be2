#[cfg(test)]
mod tests {
    use mkmig::schema::model::Schema;
    use mkmig::schema::snapshot::SnapshotStore;
    use mkmig::schema::Error;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct SnapshotTestContext {
        temp_dir: TempDir,
    }

    impl TestContext for SnapshotTestContext {
        fn setup() -> Self {
            SnapshotTestContext {
                temp_dir: tempfile::tempdir().unwrap(),
            }
        }
    }

    impl SnapshotTestContext {
        fn store(&self) -> SnapshotStore {
            SnapshotStore::new(self.temp_dir.path(), ".schema_snapshot.yaml")
        }
    }

    fn schema(yaml: &str) -> Schema {
        serde_yaml::from_str(yaml).unwrap()
    }

    const USERS: &str = r#"
database:
  name: app
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

    #[test_context(SnapshotTestContext)]
    #[test]
    fn test_missing_snapshot_means_first_run(ctx: &mut SnapshotTestContext) {
        assert!(ctx.store().load().unwrap().is_none());
    }

    #[test_context(SnapshotTestContext)]
    #[test]
    fn test_round_trip_preserves_the_schema(ctx: &mut SnapshotTestContext) {
        let mut original = schema(USERS);
        original.canonicalize();

        let store = ctx.store();
        store.save(&original).unwrap();
        let loaded = store.load().unwrap().expect("snapshot present");

        // The store stamps the running tool version on save.
        original.database.tool_version = env!("CARGO_PKG_VERSION").to_string();
        assert_eq!(loaded, original);
    }

    #[test_context(SnapshotTestContext)]
    #[test]
    fn test_equivalent_schemas_serialize_identically(ctx: &mut SnapshotTestContext) {
        let _ = ctx;
        // Same schema, tables and fields declared in a different order.
        let forward = schema(USERS);
        let reordered = schema(
            r#"
database:
  name: app
tables:
  - name: users
    fields:
      - name: email
        type: varchar
        length: 255
        nullable: false
      - name: id
        type: serial
        primary_key: true
"#,
        );

        let left = SnapshotStore::serialize(&forward).unwrap();
        let right = SnapshotStore::serialize(&reordered).unwrap();
        assert_eq!(left, right);
    }

    #[test_context(SnapshotTestContext)]
    #[test]
    fn test_save_overwrites_previous_snapshot(ctx: &mut SnapshotTestContext) {
        let store = ctx.store();
        store.save(&schema(USERS)).unwrap();
        store.save(&schema("database:\n  name: app\ntables: []\n")).unwrap();

        let loaded = store.load().unwrap().expect("snapshot present");
        assert!(loaded.tables.is_empty());
    }

    #[test_context(SnapshotTestContext)]
    #[test]
    fn test_snapshot_from_newer_tool_is_refused(ctx: &mut SnapshotTestContext) {
        let newer = "database:\n  name: app\n  tool_version: 99.0.0\ntables: []\n";
        std::fs::write(ctx.store().path(), newer).unwrap();

        assert!(matches!(ctx.store().load(), Err(Error::SnapshotStale { .. })));
    }

    #[test_context(SnapshotTestContext)]
    #[test]
    fn test_unreadable_snapshot_is_a_parse_error(ctx: &mut SnapshotTestContext) {
        std::fs::write(ctx.store().path(), "tables:\n  - broken: [\n").unwrap();
        assert!(matches!(ctx.store().load(), Err(Error::Parse { .. })));
    }
}
