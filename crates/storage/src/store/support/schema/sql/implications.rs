#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        -- value_id / implied_value_id are 0 for a valueless side.
        CREATE TABLE IF NOT EXISTS implication (
          tag_id INTEGER NOT NULL,
          value_id INTEGER NOT NULL,
          implied_tag_id INTEGER NOT NULL,
          implied_value_id INTEGER NOT NULL,
          PRIMARY KEY (tag_id, value_id, implied_tag_id, implied_value_id)
        );
"#;
