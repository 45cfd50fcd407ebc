mod dialect;
mod error;
mod io;
mod statement;

pub use error::{ParseError, ParseErrorKind};
pub use io::{collect_versions_from_directory, parse_version_from_name};
pub use statement::StatementCollection;


/// This test suite has a number of aims:
/// 1) Test that SQL files are split into the statements that will be executed.
/// 2) Test that literals and comments never split or produce statements.
/// 3) Test that step directories are discovered and ordered by semantic version.
#[cfg(test)]
mod tests {
    use super::*;
    use semver::Version;
    use std::fs;

    #[test]
    fn test_split_multi_statement_sql() {
        let collection = StatementCollection::parse_sql(
            "CREATE TABLE jobs (id INT); INSERT INTO jobs VALUES (1)"
        ).unwrap();

        assert_eq!(
            collection.as_slice(),
            ["CREATE TABLE jobs (id INT);", "INSERT INTO jobs VALUES (1);"]
        );
    }

    #[test]
    fn test_semicolon_inside_literal_is_not_a_separator() {
        let collection = StatementCollection::parse_sql(
            "INSERT INTO notes VALUES ('a;b');"
        ).unwrap();

        assert_eq!(collection.as_slice(), ["INSERT INTO notes VALUES ('a;b');"]);
    }

    #[test]
    fn test_comment_only_fragments_are_dropped() {
        let cases: &[(&str, usize)] = &[
            ("", 0),
            ("   \n\t", 0),
            ("-- nothing to do here\n", 0),
            ("/* header */ ;;", 0),
            ("-- create\nCREATE TABLE t (id INT);\n-- trailing\n", 1),
        ];

        for (sql, expected) in cases {
            let collection = StatementCollection::parse_sql(sql).unwrap();
            assert_eq!(collection.len(), *expected, "Unexpected split for {:?}: {:?}", sql, collection);
        }
    }

    #[test]
    fn test_escaped_quotes_are_kept_verbatim() {
        let cases: &[&str] = &[
            "INSERT INTO t VALUES ('it''s')",
            r"INSERT INTO t VALUES ('it\'s')",
        ];

        for sql in cases {
            let collection = StatementCollection::parse_sql(sql).unwrap();
            assert_eq!(collection.len(), 1, "Unexpected split for {:?}: {:?}", sql, collection);
            assert_eq!(collection[0], format!("{sql};"));
        }
    }

    #[test]
    fn test_session_statement_round_trips() {
        let sql = r#"SET @@GLOBAL.SQL_MODE="NO_ENGINE_SUBSTITUTION""#;
        let collection = StatementCollection::parse_sql(sql).unwrap();

        assert_eq!(collection.len(), 1);
        assert_eq!(collection[0], format!("{sql};"));
    }

    #[test]
    fn test_parse_version_from_name() {
        let valid: &[(&str, &str)] = &[
            ("6.2.1_add_index", "6.2.1"),
            ("v6.3.0_rename_column", "6.3.0"),
            ("7.0.0-rc.1_preview", "7.0.0-rc.1"),
            ("6.1.0", "6.1.0"),
        ];
        for (name, version) in valid {
            assert_eq!(parse_version_from_name(name).unwrap(), Version::parse(version).unwrap());
        }

        let invalid = ["_no_version", "6.2_short", "latest_step", "v_"];
        for name in invalid {
            assert!(parse_version_from_name(name).is_err(), "{name} should not parse");
        }
    }

    #[test]
    fn test_collect_versions_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["6.3.0_c", "6.1.0_a", "6.2.1_b", "notes", "6.2.1_dup"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        fs::write(dir.path().join("README.md"), "not a step").unwrap();

        let versions = collect_versions_from_directory(dir.path()).unwrap();
        let names: Vec<String> = versions
            .iter()
            .map(|(v, _)| v.to_string())
            .collect();

        assert_eq!(names, ["6.1.0", "6.2.1", "6.2.1", "6.3.0"]);
    }

    #[test]
    fn test_collect_versions_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = collect_versions_from_directory(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::InvalidDirectory(_)));
    }

    #[test]
    fn test_from_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = StatementCollection::from_file(&dir.path().join("up.sql")).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::FileNotFound(_)));
    }
}
