#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        -- `directory` is root-relative unless it starts with '/'.
        CREATE TABLE IF NOT EXISTS file (
          id INTEGER PRIMARY KEY,
          directory TEXT NOT NULL,
          name TEXT NOT NULL,
          fingerprint TEXT NOT NULL,
          mod_time INTEGER NOT NULL,
          size INTEGER NOT NULL,
          is_dir INTEGER NOT NULL,
          UNIQUE (directory, name)
        );

        CREATE TABLE IF NOT EXISTS file_tag (
          file_id INTEGER NOT NULL,
          tag_id INTEGER NOT NULL,
          value_id INTEGER NOT NULL,
          PRIMARY KEY (file_id, tag_id, value_id)
        );
"#;
