//! Event log migrations - embedded SQL files
//!
//! Each migration is a tuple of (name, sql_content), applied in order.
//! When adding one, create `NNN_description.sql` and list it here.

pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    (
        "001_initial_schema.sql",
        include_str!("001_initial_schema.sql"),
    ),
];
