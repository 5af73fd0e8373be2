#[cfg(test)]
mod tests {
    use mkmig::schema::analyze::analyze;
    use mkmig::schema::model::{FieldType, OnDelete, Schema};

    fn schema(yaml: &str) -> Schema {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_referenced_tables_come_first() {
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
  - name: users
    fields:
      - name: id
        type: serial
        primary_key: true
"#,
        );

        let analysis = analyze(&schema);
        let users = analysis.order.iter().position(|t| t == "users").unwrap();
        let posts = analysis.order.iter().position(|t| t == "posts").unwrap();
        assert!(users < posts);
        assert!(analysis.deferred.is_empty());
    }

    #[test]
    fn test_independent_tables_order_lexicographically() {
        let schema = schema(
            r#"
tables:
  - name: zebras
    fields:
      - name: id
        type: serial
        primary_key: true
  - name: apples
    fields:
      - name: id
        type: serial
        primary_key: true
"#,
        );

        let analysis = analyze(&schema);
        assert_eq!(analysis.order, vec!["apples".to_string(), "zebras".to_string()]);
    }

    #[test]
    fn test_cycle_defers_the_later_tables_constraint() {
        let schema = schema(
            r#"
tables:
  - name: a
    fields:
      - name: id
        type: serial
        primary_key: true
      - name: b_id
        type: foreign_key
        foreign_key:
          table: b
  - name: b
    fields:
      - name: id
        type: serial
        primary_key: true
      - name: a_id
        type: foreign_key
        foreign_key:
          table: a
"#,
        );

        let analysis = analyze(&schema);

        // The cycle breaks at the edge leaving the lexicographically later
        // table: b's constraint is deferred, a's stays inline.
        assert_eq!(analysis.deferred.len(), 1);
        assert_eq!(analysis.deferred[0].table, "b");
        assert_eq!(analysis.deferred[0].field, "a_id");
        assert_eq!(analysis.deferred[0].references, "a");

        // With the broken edge removed, b precedes its referencer a.
        assert_eq!(analysis.order, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_self_reference_stays_inline() {
        let schema = schema(
            r#"
tables:
  - name: employees
    fields:
      - name: id
        type: serial
        primary_key: true
      - name: manager_id
        type: foreign_key
        nullable: true
        foreign_key:
          table: employees
"#,
        );

        let analysis = analyze(&schema);
        assert!(analysis.deferred.is_empty());
        assert_eq!(analysis.order, vec!["employees".to_string()]);
    }

    #[test]
    fn test_junction_synthesis() {
        let schema = schema(
            r#"
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
"#,
        );

        let analysis = analyze(&schema);
        let junction = analysis.schema.table("posts_tags").expect("junction table");

        let posts_id = junction.field("posts_id").expect("near foreign key");
        let tags_id = junction.field("tags_id").expect("far foreign key");
        assert!(!posts_id.is_nullable());
        assert!(!tags_id.is_nullable());
        assert_eq!(posts_id.foreign_key.as_ref().unwrap().on_delete, OnDelete::Cascade);
        assert_eq!(tags_id.foreign_key.as_ref().unwrap().table, "tags");

        let index = &junction.indexes[0];
        assert!(index.unique);
        assert_eq!(index.fields, vec!["posts_id".to_string(), "tags_id".to_string()]);

        // Junction tables order after the tables they reference.
        let order = &analysis.order;
        assert!(order.iter().position(|t| t == "posts").unwrap() < order.iter().position(|t| t == "posts_tags").unwrap());
        assert!(order.iter().position(|t| t == "tags").unwrap() < order.iter().position(|t| t == "posts_tags").unwrap());
    }

    #[test]
    fn test_explicit_junction_name_wins() {
        let schema = schema(
            r#"
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
          junction: post_taggings
  - name: tags
    fields:
      - name: id
        type: serial
        primary_key: true
"#,
        );

        let analysis = analyze(&schema);
        assert!(analysis.schema.table("post_taggings").is_some());
        assert!(analysis.schema.table("posts_tags").is_none());
    }

    #[test]
    fn test_many_to_many_fields_never_survive_analysis() {
        let schema = schema(
            r#"
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
"#,
        );

        let analysis = analyze(&schema);
        for table in &analysis.schema.tables {
            assert!(table.fields.iter().all(|f| f.field_type != FieldType::ManyToMany));
        }
    }
}
