use rolodex_db::{init_schema, seed_database, Database, DbSettings};

#[test]
fn db_initialization_works() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("rolodex.db");
    let db = Database::open(path.to_str().unwrap(), DbSettings::default())
        .expect("failed to open database");
    let conn = db.connect().expect("failed to get connection");
    init_schema(&conn).expect("failed to init schema");

    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
        .expect("failed to prepare table query");
    let tables: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .expect("failed to execute table query")
        .map(|r| r.expect("failed to read table name"))
        .collect();

    assert_eq!(tables, vec!["addresses", "customers"]);
}

#[test]
fn seeded_database_keeps_bundled_rows() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let bundled = dir.path().join("bundled.db");
    {
        let db = Database::open(bundled.to_str().unwrap(), DbSettings::default()).unwrap();
        let conn = db.connect().unwrap();
        init_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO customers (first_name, last_name, phone_number) VALUES ('Seed', 'Row', '000')",
            [],
        )
        .unwrap();
        // Fold the WAL back into the main file before copying it.
        conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);").unwrap();
    }

    let scratch = dir.path().join("tmp").join("rolodex.db");
    assert!(seed_database(&bundled, &scratch).expect("seed should copy"));

    let db = Database::open(scratch.to_str().unwrap(), DbSettings::default()).unwrap();
    let conn = db.connect().unwrap();
    init_schema(&conn).expect("schema init on a seeded file is a no-op");
    let name: String = conn
        .query_row("SELECT first_name FROM customers WHERE phone_number = '000'", [], |row| row.get(0))
        .expect("seeded row should be readable");
    assert_eq!(name, "Seed");
}
