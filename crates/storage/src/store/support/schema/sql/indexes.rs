#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE INDEX IF NOT EXISTS idx_file_fingerprint ON file(fingerprint);
        CREATE INDEX IF NOT EXISTS idx_file_directory ON file(directory);
        CREATE INDEX IF NOT EXISTS idx_file_tag_tag ON file_tag(tag_id, value_id);
        CREATE INDEX IF NOT EXISTS idx_file_tag_value ON file_tag(value_id);
        CREATE INDEX IF NOT EXISTS idx_implication_implied ON implication(implied_tag_id, implied_value_id);
        CREATE INDEX IF NOT EXISTS idx_implication_value ON implication(value_id);
"#;
