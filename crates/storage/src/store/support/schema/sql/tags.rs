#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE TABLE IF NOT EXISTS tag (
          id INTEGER PRIMARY KEY,
          name TEXT NOT NULL UNIQUE
        );

        -- Values are shared across tags. Row id 0 is reserved for "no value".
        CREATE TABLE IF NOT EXISTS value (
          id INTEGER PRIMARY KEY CHECK (id > 0),
          name TEXT NOT NULL UNIQUE
        );
"#;
