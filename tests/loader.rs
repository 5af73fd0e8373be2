#[cfg(test)]
mod tests {
    use mkmig::schema::loader::{MemoryDocumentSource, SchemaLoader};
    use mkmig::schema::Error;

    fn source_with(documents: &[(&str, &str, &str)]) -> MemoryDocumentSource {
        let mut source = MemoryDocumentSource::new();
        for (origin, path, content) in documents {
            source.insert(*origin, *path, *content);
        }
        source
    }

    #[test]
    fn test_loads_single_document() {
        let source = source_with(&[(
            "",
            "schema.yaml",
            "database:\n  name: app\ntables:\n  - name: users\n    fields:\n      - name: id\n        type: serial\n        primary_key: true\n",
        )]);

        let mut loader = SchemaLoader::new(&source);
        let schemas = loader.load("", "schema.yaml").unwrap();

        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas[0].database.name, "app");
        assert!(loader.warnings().is_empty());
    }

    #[test]
    fn test_resolves_includes_depth_first() {
        let source = source_with(&[
            (
                "",
                "schema.yaml",
                "database:\n  name: app\ninclude:\n  - origin: auth\n    path: schema.yaml\ntables: []\n",
            ),
            (
                "auth",
                "schema.yaml",
                "include:\n  - origin: auth\n    path: roles.yaml\ntables:\n  - name: users\n    fields:\n      - name: id\n        type: serial\n        primary_key: true\n",
            ),
            ("auth", "roles.yaml", "tables:\n  - name: roles\n    fields:\n      - name: id\n        type: serial\n        primary_key: true\n"),
        ]);

        let mut loader = SchemaLoader::new(&source);
        let schemas = loader.load("", "schema.yaml").unwrap();

        assert_eq!(schemas.len(), 3);
        assert_eq!(schemas[0].origin, "schema.yaml");
        assert_eq!(schemas[1].origin, "auth:schema.yaml");
        assert_eq!(schemas[2].origin, "auth:roles.yaml");
    }

    #[test]
    fn test_repeated_include_is_idempotent() {
        // A diamond: the root and one include both pull in the same leaf.
        let source = source_with(&[
            (
                "",
                "schema.yaml",
                "include:\n  - origin: shared\n    path: base.yaml\n  - origin: auth\n    path: schema.yaml\ntables: []\n",
            ),
            (
                "auth",
                "schema.yaml",
                "include:\n  - origin: shared\n    path: base.yaml\ntables: []\n",
            ),
            ("shared", "base.yaml", "tables:\n  - name: settings\n    fields:\n      - name: id\n        type: serial\n        primary_key: true\n"),
        ]);

        let mut loader = SchemaLoader::new(&source);
        let schemas = loader.load("", "schema.yaml").unwrap();

        let settings = schemas.iter().filter(|s| s.table("settings").is_some()).count();
        assert_eq!(settings, 1);
        assert!(loader.warnings().is_empty());
    }

    #[test]
    fn test_include_cycle_is_elided_with_warning() {
        let source = source_with(&[
            ("", "schema.yaml", "include:\n  - origin: a\n    path: schema.yaml\ntables: []\n"),
            ("a", "schema.yaml", "include:\n  - origin: b\n    path: schema.yaml\ntables: []\n"),
            ("b", "schema.yaml", "include:\n  - origin: a\n    path: schema.yaml\ntables: []\n"),
        ]);

        let mut loader = SchemaLoader::new(&source);
        let schemas = loader.load("", "schema.yaml").unwrap();

        assert_eq!(schemas.len(), 3);
        assert_eq!(loader.warnings().len(), 1);
        assert!(loader.warnings()[0].contains("cycle"));
    }

    #[test]
    fn test_missing_include_is_fatal() {
        let source = source_with(&[("", "schema.yaml", "include:\n  - origin: missing\n    path: schema.yaml\ntables: []\n")]);

        let mut loader = SchemaLoader::new(&source);
        let result = loader.load("", "schema.yaml");

        assert!(matches!(result, Err(Error::Include { .. })));
    }

    #[test]
    fn test_unparseable_document_is_fatal() {
        let source = source_with(&[("", "schema.yaml", "tables:\n  - name: users\n   fields: [broken\n")]);

        let mut loader = SchemaLoader::new(&source);
        let result = loader.load("", "schema.yaml");

        assert!(matches!(result, Err(Error::Parse { .. })));
    }

    #[test]
    fn test_unknown_top_level_key_warns() {
        let source = source_with(&[("", "schema.yaml", "tables: []\nviews:\n  - name: totals\n")]);

        let mut loader = SchemaLoader::new(&source);
        let schemas = loader.load("", "schema.yaml").unwrap();

        assert_eq!(schemas.len(), 1);
        assert_eq!(loader.warnings().len(), 1);
        assert!(loader.warnings()[0].contains("views"));
    }

    #[test]
    fn test_unknown_field_type_is_fatal() {
        let source = source_with(&[(
            "",
            "schema.yaml",
            "tables:\n  - name: users\n    fields:\n      - name: id\n        type: hyperloglog\n",
        )]);

        let mut loader = SchemaLoader::new(&source);
        assert!(matches!(loader.load("", "schema.yaml"), Err(Error::Parse { .. })));
    }
}
