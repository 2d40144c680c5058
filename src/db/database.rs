use std::{collections::HashMap, path::Path, sync::Arc};

use tokio::sync::AcquireError;
use tracing::{debug, info, instrument, warn};

use crate::{
    BatchError, DatabaseConfig, DatabaseError, EngineError, Row, Schema, Value,
    db::{
        document::Document,
        executor::{self, Mutation},
        guard::TableGuard,
        table::Table,
    },
    sql::{
        CreateStatement, DropStatement, SelectStatement, Statement, parse_statements,
        params::bind_parameters,
        validator::{Validator, validate_definitions},
    },
    storage::{JsonFileBackend, MemoryBackend, StorageBackend},
};

/// The main database handle.
///
/// `Database` owns the storage backend and one [`TableGuard`] per table.
/// Statements on different tables run concurrently; statements on the same
/// table follow the guard's arrival order, with consecutive reads sharing
/// access.
///
/// Each statement reloads the whole document from the backend after it is
/// admitted, so it always sees every change committed before it. Writes to
/// the backend are serialized by a commit lock, which keeps concurrent
/// writers on different tables from overwriting each other's document.
///
/// The handle is `Send + Sync`; share it between tasks with an [`Arc`].
pub struct Database {
    backend: Arc<dyn StorageBackend>,
    config: DatabaseConfig,
    guards: parking_lot::Mutex<HashMap<String, Arc<TableGuard>>>,
    commit: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("config", &self.config)
            .field("tables", &self.guards.lock().len())
            .finish_non_exhaustive()
    }
}

impl Database {
    /// Opens the database persisted as JSON at `path`, starting empty if the
    /// file does not exist yet.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, DatabaseError> {
        Self::with_backend(
            Arc::new(JsonFileBackend::new(path)),
            DatabaseConfig::default(),
        )
        .await
    }

    /// Creates an empty database that lives only as long as the handle.
    pub fn in_memory() -> Self {
        Self::from_document(
            Arc::new(MemoryBackend::new()),
            DatabaseConfig::default(),
            &Document::default(),
        )
    }

    /// Opens a database over any backend. The document is read once to learn
    /// which tables exist.
    pub async fn with_backend(
        backend: Arc<dyn StorageBackend>,
        config: DatabaseConfig,
    ) -> Result<Self, DatabaseError> {
        let document = backend.read().await?;
        info!(tables = document.tables.len(), "database opened");

        Ok(Self::from_document(backend, config, &document))
    }

    fn from_document(
        backend: Arc<dyn StorageBackend>,
        config: DatabaseConfig,
        document: &Document,
    ) -> Self {
        let guards = document
            .tables
            .keys()
            .map(|name| (name.clone(), Arc::new(TableGuard::new())))
            .collect();

        Self {
            backend,
            config,
            guards: parking_lot::Mutex::new(guards),
            commit: tokio::sync::Mutex::new(()),
        }
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Binds `params` to the `$n` placeholders in `sql`, then executes every
    /// statement in order.
    ///
    /// Returns the rows of the last statement. Use [`Database::run_all`] to
    /// keep the result of each statement.
    pub async fn run(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, DatabaseError> {
        let sql = bind_parameters(sql, params)?;

        let mut last = Vec::new();
        for statement in parse_statements(&sql)? {
            last = self.execute(&statement).await?;
        }

        Ok(last)
    }

    /// Executes every statement in `sql`, returning one result per statement.
    ///
    /// All statements are parsed before any of them runs, so a lexical or
    /// syntax error anywhere leaves the database untouched. Execution stops
    /// at the first failing statement; the results of the statements before
    /// it are carried in the [`BatchError`].
    pub async fn run_all(&self, sql: &str) -> Result<Vec<Vec<Row>>, BatchError> {
        let statements = parse_statements(sql).map_err(|source| BatchError {
            results: Vec::new(),
            source,
        })?;

        let mut results = Vec::with_capacity(statements.len());
        for statement in &statements {
            match self.execute(statement).await {
                Ok(rows) => results.push(rows),
                Err(source) => return Err(BatchError { results, source }),
            }
        }

        Ok(results)
    }

    /// Executes one parsed statement.
    ///
    /// Returns the SELECT result set or the RETURNING projection, and an
    /// empty list for everything else.
    #[instrument(skip_all, fields(kind = statement.kind(), table = statement.table_name()))]
    pub async fn execute(&self, statement: &Statement) -> Result<Vec<Row>, DatabaseError> {
        debug!("executing statement");

        match statement {
            Statement::Select(select) => self.select(select).await,
            Statement::Insert(insert) => {
                self.modify(statement, |table| executor::insert(table, insert))
                    .await
            }
            Statement::Update(update) => {
                self.modify(statement, |table| executor::update(table, update))
                    .await
            }
            Statement::Delete(delete) => {
                self.modify(statement, |table| executor::delete(table, delete))
                    .await
            }
            Statement::Create(create) => self.create_table(create).await,
            Statement::Drop(drop) => self.drop_table(drop).await,
        }
    }

    /// Names of every table, in lexicographic order.
    pub async fn table_names(&self) -> Result<Vec<String>, DatabaseError> {
        let document = self.backend.read().await?;
        Ok(document.tables.into_keys().collect())
    }

    pub async fn schema(&self, table: &str) -> Result<Schema, DatabaseError> {
        let mut document = self.backend.read().await?;
        let table = document
            .tables
            .remove(table)
            .ok_or_else(|| EngineError::TableNotFound {
                table: table.to_owned(),
            })?;

        Ok(table.schema)
    }

    async fn select(&self, select: &SelectStatement) -> Result<Vec<Row>, DatabaseError> {
        let guard = self.guard_for(&select.table).await?;
        let _read = self.acquire(&select.table, guard.read()).await?;

        let document = self.backend.read().await?;
        let table = document.get_table(&select.table)?;
        Validator::new(&select.table, &table.schema).validate_select(select)?;

        let rows = executor::select(table, select);
        debug!(rows = rows.len(), "rows selected");

        Ok(rows)
    }

    /// Runs an INSERT, UPDATE or DELETE under the table's write guard and
    /// persists the document if any row changed.
    async fn modify(
        &self,
        statement: &Statement,
        apply: impl FnOnce(&mut Table) -> Mutation,
    ) -> Result<Vec<Row>, DatabaseError> {
        let name = statement.table_name();
        let guard = self.guard_for(name).await?;
        let _write = self.acquire(name, guard.write()).await?;
        let _commit = self.commit.lock().await;

        let mut document = self.backend.read().await?;
        let table = document.get_table_mut(name)?;
        Validator::new(name, &table.schema).validate(statement)?;

        let mutation = apply(table);
        if mutation.affected > 0 {
            self.backend.write(&document).await?;
        }
        debug!(affected = mutation.affected, "statement applied");

        Ok(mutation.returned)
    }

    async fn create_table(&self, create: &CreateStatement) -> Result<Vec<Row>, DatabaseError> {
        validate_definitions(&create.definitions)?;

        let _commit = self.commit.lock().await;
        let mut document = self.backend.read().await?;

        if document.contains(&create.table) {
            if create.if_not_exists {
                debug!("table already exists");
                return Ok(Vec::new());
            }

            return Err(EngineError::TableExists {
                table: create.table.clone(),
            }
            .into());
        }

        document
            .tables
            .insert(create.table.clone(), Table::new(create.definitions.clone()));
        self.backend.write(&document).await?;

        // A statement may have reached the new table while the write was in
        // flight and already registered a guard for it.
        self.guards
            .lock()
            .entry(create.table.clone())
            .or_default();
        info!(columns = create.definitions.len(), "table created");

        Ok(Vec::new())
    }

    async fn drop_table(&self, drop: &DropStatement) -> Result<Vec<Row>, DatabaseError> {
        match self.drop_existing(&drop.table).await {
            Err(DatabaseError::Engine(EngineError::TableNotFound { .. })) if drop.if_exists => {
                debug!("table does not exist");
                Ok(Vec::new())
            }
            result => result,
        }
    }

    /// Removes the table once every statement queued before the DROP has
    /// finished. Statements still queued behind it fail with
    /// [`EngineError::TableNotFound`].
    async fn drop_existing(&self, name: &str) -> Result<Vec<Row>, DatabaseError> {
        let guard = self.guard_for(name).await?;
        let _write = self.acquire(name, guard.write()).await?;
        let _commit = self.commit.lock().await;

        let mut document = self.backend.read().await?;
        if document.tables.remove(name).is_none() {
            return Err(EngineError::TableNotFound {
                table: name.to_owned(),
            }
            .into());
        }
        self.backend.write(&document).await?;

        {
            let mut guards = self.guards.lock();
            if guards
                .get(name)
                .is_some_and(|current| Arc::ptr_eq(current, &guard))
            {
                guards.remove(name);
            }
        }
        guard.close();
        info!("table dropped");

        Ok(Vec::new())
    }

    /// Looks up the guard for `table`. A table present in the document but
    /// unknown to this handle, e.g. written by another process, gets a fresh
    /// guard.
    async fn guard_for(&self, table: &str) -> Result<Arc<TableGuard>, DatabaseError> {
        let existing = self.guards.lock().get(table).cloned();
        if let Some(guard) = existing {
            return Ok(guard);
        }

        let document = self.backend.read().await?;
        if !document.contains(table) {
            return Err(EngineError::TableNotFound {
                table: table.to_owned(),
            }
            .into());
        }

        let guard = Arc::clone(self.guards.lock().entry(table.to_owned()).or_default());
        Ok(guard)
    }

    /// Waits on a guard request, bounded by the configured lock timeout. A
    /// closed guard means the table was dropped while the request waited.
    async fn acquire<G>(
        &self,
        table: &str,
        request: impl Future<Output = Result<G, AcquireError>>,
    ) -> Result<G, DatabaseError> {
        let acquired = match self.config.lock_timeout {
            Some(timeout) => tokio::time::timeout(timeout, request).await.map_err(|_| {
                warn!(table, ?timeout, "timed out waiting for table guard");
                EngineError::LockTimeout {
                    table: table.to_owned(),
                    timeout,
                }
            })?,
            None => request.await,
        };

        acquired.map_err(|_| {
            EngineError::TableNotFound {
                table: table.to_owned(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::time::sleep;

    use super::*;
    use crate::{DataType, StorageError, SyntaxError, ValidationError};

    /// Memory backend whose reads and writes take a while, so tests can line
    /// statements up behind a table guard. Writes are stored before the delay.
    struct SlowBackend {
        inner: MemoryBackend,
        read_delay: Duration,
        write_delay: Duration,
    }

    #[async_trait]
    impl StorageBackend for SlowBackend {
        async fn read(&self) -> Result<Document, StorageError> {
            if !self.read_delay.is_zero() {
                sleep(self.read_delay).await;
            }
            self.inner.read().await
        }

        async fn write(&self, document: &Document) -> Result<(), StorageError> {
            self.inner.write(document).await?;
            if !self.write_delay.is_zero() {
                sleep(self.write_delay).await;
            }
            Ok(())
        }
    }

    async fn slow_database(delay: Duration, config: DatabaseConfig) -> Arc<Database> {
        let backend = Arc::new(SlowBackend {
            inner: MemoryBackend::new(),
            read_delay: delay,
            write_delay: Duration::ZERO,
        });
        let db = Database::with_backend(backend, config).await.unwrap();
        db.run_all(
            "CREATE TABLE users (id NUMERIC, name TEXT);
             INSERT INTO users VALUES (1, 'John'), (2, 'Jane');",
        )
        .await
        .unwrap();

        Arc::new(db)
    }

    fn row(columns: &[(&str, Value)]) -> Row {
        columns.iter().cloned().collect()
    }

    async fn users() -> Database {
        let db = Database::in_memory();
        db.run_all(
            "CREATE TABLE users (id NUMERIC, name TEXT, active BOOLEAN);
             INSERT INTO users VALUES (1, 'John', TRUE), (2, 'Jane', TRUE), (3, 'Joan', FALSE);",
        )
        .await
        .unwrap();
        db
    }

    #[tokio::test]
    async fn test_insert_then_select_round_trip() {
        let db = Database::in_memory();

        db.run("CREATE TABLE t (id NUMERIC, name TEXT, ok BOOLEAN)", &[])
            .await
            .unwrap();
        db.run("INSERT INTO t VALUES (1.5, 'a b', FALSE)", &[])
            .await
            .unwrap();

        let rows = db.run("SELECT * FROM t", &[]).await.unwrap();
        assert_eq!(
            rows,
            vec![row(&[
                ("id", Value::Number(1.5)),
                ("name", Value::from("a b")),
                ("ok", Value::Boolean(false)),
            ])]
        );
    }

    #[tokio::test]
    async fn test_select_is_idempotent() {
        let db = users().await;

        let first = db.run("SELECT * FROM users", &[]).await.unwrap();
        let second = db.run("SELECT * FROM users", &[]).await.unwrap();

        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_select_with_conditions() {
        let db = users().await;

        let rows = db
            .run(
                "SELECT name FROM users WHERE id > 1 AND active = TRUE OR id = 1 AND active = FALSE",
                &[],
            )
            .await
            .unwrap();

        assert_eq!(rows, vec![row(&[("name", Value::from("Jane"))])]);
    }

    #[tokio::test]
    async fn test_type_enforcement() {
        let db = users().await;

        let err = db
            .run("INSERT INTO users VALUES (4, 5, TRUE)", &[])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DatabaseError::Validation(ValidationError::TypeMismatch { .. })
        ));
        assert!(err.to_string().starts_with("name expects TEXT"));

        let rows = db.run("SELECT * FROM users", &[]).await.unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[tokio::test]
    async fn test_update_returning_persists() {
        let db = users().await;

        let returned = db
            .run(
                "UPDATE users SET name = 'Jan' WHERE id = 2 RETURNING id, name",
                &[],
            )
            .await
            .unwrap();
        assert_eq!(
            returned,
            vec![row(&[("id", Value::from(2)), ("name", Value::from("Jan"))])]
        );

        let rows = db
            .run("SELECT name FROM users WHERE id = 2", &[])
            .await
            .unwrap();
        assert_eq!(rows, vec![row(&[("name", Value::from("Jan"))])]);
    }

    #[tokio::test]
    async fn test_delete_returning() {
        let db = users().await;

        let returned = db
            .run("DELETE FROM users WHERE active = FALSE RETURNING name", &[])
            .await
            .unwrap();
        assert_eq!(returned, vec![row(&[("name", Value::from("Joan"))])]);

        let rows = db.run("SELECT id FROM users", &[]).await.unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_missing_row_is_not_an_error() {
        let db = users().await;

        let returned = db
            .run("DELETE FROM users WHERE id = 99 RETURNING *", &[])
            .await
            .unwrap();

        assert!(returned.is_empty());
        assert_eq!(db.run("SELECT * FROM users", &[]).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_create_twice() {
        let db = users().await;

        let err = db
            .run("CREATE TABLE users (id NUMERIC)", &[])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::Engine(EngineError::TableExists { .. })
        ));

        db.run("CREATE TABLE IF NOT EXISTS users (id NUMERIC)", &[])
            .await
            .unwrap();

        // The original schema is untouched.
        let schema = db.schema("users").await.unwrap();
        assert_eq!(schema.len(), 3);
    }

    #[tokio::test]
    async fn test_drop_table() {
        let db = users().await;

        db.run("DROP TABLE users", &[]).await.unwrap();

        let err = db.run("SELECT * FROM users", &[]).await.unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::Engine(EngineError::TableNotFound { .. })
        ));
        assert!(matches!(
            db.run("DROP TABLE users", &[]).await,
            Err(DatabaseError::Engine(EngineError::TableNotFound { .. }))
        ));
        db.run("DROP TABLE IF EXISTS users", &[]).await.unwrap();

        // The name can be reused.
        db.run("CREATE TABLE users (id NUMERIC)", &[]).await.unwrap();
        assert!(db.run("SELECT * FROM users", &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_table() {
        let db = Database::in_memory();

        for sql in [
            "SELECT * FROM ghosts",
            "INSERT INTO ghosts VALUES (1)",
            "UPDATE ghosts SET id = 1",
            "DELETE FROM ghosts",
        ] {
            assert!(
                matches!(
                    db.run(sql, &[]).await,
                    Err(DatabaseError::Engine(EngineError::TableNotFound { .. }))
                ),
                "{sql}"
            );
        }
    }

    #[tokio::test]
    async fn test_run_binds_parameters() {
        let db = users().await;

        let rows = db
            .run(
                "SELECT id FROM users WHERE name = $1 OR id = $2",
                &[Value::from("Jane"), Value::from(3)],
            )
            .await
            .unwrap();

        assert_eq!(
            rows,
            vec![row(&[("id", Value::from(2))]), row(&[("id", Value::from(3))])]
        );
    }

    #[tokio::test]
    async fn test_bound_values_keep_their_value() {
        let db = Database::in_memory();
        db.run("CREATE TABLE t (n NUMERIC, s TEXT)", &[]).await.unwrap();

        let values = [
            (Value::Number(1e20), Value::from(r#"say "hi""#)),
            (Value::Number(1e-7), Value::from("it's")),
        ];
        for (n, s) in &values {
            db.run("INSERT INTO t VALUES ($1, $2)", &[n.clone(), s.clone()])
                .await
                .unwrap();
        }

        let rows = db.run("SELECT * FROM t", &[]).await.unwrap();
        let stored: Vec<_> = rows
            .iter()
            .map(|r| (r.get("n").cloned().unwrap(), r.get("s").cloned().unwrap()))
            .collect();
        assert_eq!(stored, values);

        assert!(matches!(
            db.run("INSERT INTO t VALUES (1, $1)", &[Value::from(r#"it's "x""#)])
                .await,
            Err(DatabaseError::Syntax(SyntaxError::UnbindableParameter { index: 1, .. }))
        ));
    }

    #[tokio::test]
    async fn test_run_returns_last_statement() {
        let db = Database::in_memory();

        let rows = db
            .run(
                "CREATE TABLE users (id NUMERIC, name TEXT);
                 INSERT INTO users VALUES (1, 'John'), (2, 'Jane');
                 SELECT name FROM users WHERE id = 2;",
                &[],
            )
            .await
            .unwrap();

        assert_eq!(rows, vec![row(&[("name", Value::from("Jane"))])]);
    }

    #[tokio::test]
    async fn test_run_all_returns_every_result() {
        let db = Database::in_memory();

        let results = db
            .run_all(
                "CREATE TABLE t (id NUMERIC);
                 INSERT INTO t VALUES (1), (2) RETURNING id;
                 SELECT * FROM t WHERE id >= 2;",
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert!(results[0].is_empty());
        assert_eq!(results[1].len(), 2);
        assert_eq!(results[2], vec![row(&[("id", Value::from(2))])]);
    }

    #[tokio::test]
    async fn test_run_all_stops_at_first_error() {
        let db = Database::in_memory();

        let err = db
            .run_all(
                "CREATE TABLE t (id NUMERIC);
                 INSERT INTO t VALUES (1) RETURNING *;
                 INSERT INTO t VALUES ('x');
                 INSERT INTO t VALUES (3);",
            )
            .await
            .unwrap_err();

        assert_eq!(err.results.len(), 2);
        assert!(matches!(err.source, DatabaseError::Validation(_)));

        let rows = db.run("SELECT * FROM t", &[]).await.unwrap();
        assert_eq!(rows, vec![row(&[("id", Value::from(1))])]);
    }

    #[tokio::test]
    async fn test_run_all_parses_before_executing() {
        let db = Database::in_memory();

        let err = db
            .run_all("CREATE TABLE t (id NUMERIC); SELECT FROM t;")
            .await
            .unwrap_err();

        assert!(err.results.is_empty());
        assert!(matches!(err.source, DatabaseError::Syntax(_)));
        assert!(db.table_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_catalog() {
        let db = users().await;
        db.run("CREATE TABLE accounts (id NUMERIC)", &[])
            .await
            .unwrap();

        assert_eq!(db.table_names().await.unwrap(), vec!["accounts", "users"]);

        let schema = db.schema("users").await.unwrap();
        assert_eq!(
            schema.column_names().collect::<Vec<_>>(),
            vec!["id", "name", "active"]
        );
        assert_eq!(
            schema.get_column("active").map(|c| c.data_type),
            Some(DataType::Boolean)
        );
        assert!(db.schema("ghosts").await.is_err());
    }

    #[tokio::test]
    async fn test_json_file_persists_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");

        {
            let db = Database::open(&path).await.unwrap();
            db.run_all(
                "CREATE TABLE users (id NUMERIC, name TEXT);
                 INSERT INTO users VALUES (1, 'John');",
            )
            .await
            .unwrap();
        }

        let db = Database::open(&path).await.unwrap();
        let rows = db.run("SELECT name FROM users", &[]).await.unwrap();
        assert_eq!(rows, vec![row(&[("name", Value::from("John"))])]);
    }

    #[tokio::test]
    async fn test_sees_tables_written_by_another_handle() {
        let backend: Arc<dyn StorageBackend> = Arc::new(MemoryBackend::new());
        let first = Database::with_backend(Arc::clone(&backend), DatabaseConfig::default())
            .await
            .unwrap();
        let second = Database::with_backend(backend, DatabaseConfig::default())
            .await
            .unwrap();

        first
            .run_all("CREATE TABLE t (id NUMERIC); INSERT INTO t VALUES (7);")
            .await
            .unwrap();

        let rows = second.run("SELECT * FROM t", &[]).await.unwrap();
        assert_eq!(rows, vec![row(&[("id", Value::from(7))])]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_table_used_during_create_keeps_one_guard() {
        let backend = Arc::new(SlowBackend {
            inner: MemoryBackend::new(),
            read_delay: Duration::ZERO,
            write_delay: Duration::from_millis(20),
        });
        let db = Arc::new(
            Database::with_backend(backend, DatabaseConfig::default())
                .await
                .unwrap(),
        );

        let create = {
            let db = Arc::clone(&db);
            tokio::spawn(async move { db.run("CREATE TABLE t (id NUMERIC)", &[]).await })
        };
        sleep(Duration::from_millis(1)).await;

        // The table is already stored while CREATE is still writing.
        let during = db.guard_for("t").await.unwrap();
        let _write = during.write().await.unwrap();

        create.await.unwrap().unwrap();

        let after = db.guard_for("t").await.unwrap();
        assert!(Arc::ptr_eq(&during, &after));
        assert!(
            tokio::time::timeout(Duration::from_millis(10), after.write())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_concurrent_writes_to_different_tables() {
        let db = Arc::new(Database::in_memory());
        db.run_all("CREATE TABLE a (id NUMERIC); CREATE TABLE b (id NUMERIC);")
            .await
            .unwrap();

        let mut tasks = Vec::new();
        for i in 0..20 {
            let db = Arc::clone(&db);
            let table = if i % 2 == 0 { "a" } else { "b" };
            tasks.push(tokio::spawn(async move {
                db.run(&format!("INSERT INTO {table} VALUES ($1)"), &[Value::from(i)])
                    .await
                    .unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(db.run("SELECT * FROM a", &[]).await.unwrap().len(), 10);
        assert_eq!(db.run("SELECT * FROM b", &[]).await.unwrap().len(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_is_not_overtaken_by_later_read() {
        let db = slow_database(Duration::from_millis(20), DatabaseConfig::default()).await;

        let reader = |db: Arc<Database>| async move {
            db.run("SELECT name FROM users WHERE id = 1", &[])
                .await
                .unwrap()
        };

        let first = tokio::spawn(reader(Arc::clone(&db)));
        sleep(Duration::from_millis(1)).await;
        let writer = {
            let db = Arc::clone(&db);
            tokio::spawn(async move {
                db.run("UPDATE users SET name = 'Jack' WHERE id = 1", &[])
                    .await
                    .unwrap()
            })
        };
        sleep(Duration::from_millis(1)).await;
        let second = tokio::spawn(reader(Arc::clone(&db)));

        // The first read started before the update, the second one queued
        // behind it.
        assert_eq!(
            first.await.unwrap(),
            vec![row(&[("name", Value::from("John"))])]
        );
        writer.await.unwrap();
        assert_eq!(
            second.await.unwrap(),
            vec![row(&[("name", Value::from("Jack"))])]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_lock_timeout() {
        let config = DatabaseConfig::default().with_lock_timeout(Duration::from_millis(10));
        let db = slow_database(Duration::from_millis(50), config).await;

        let writer = {
            let db = Arc::clone(&db);
            tokio::spawn(async move {
                db.run("UPDATE users SET name = 'Jack' WHERE id = 1", &[])
                    .await
            })
        };
        sleep(Duration::from_millis(1)).await;

        let err = db.run("SELECT * FROM users", &[]).await.unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::Engine(EngineError::LockTimeout { .. })
        ));

        writer.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_statement_queued_behind_drop_fails() {
        let db = slow_database(Duration::from_millis(20), DatabaseConfig::default()).await;

        let dropper = {
            let db = Arc::clone(&db);
            tokio::spawn(async move { db.run("DROP TABLE users", &[]).await })
        };
        sleep(Duration::from_millis(1)).await;

        let err = db.run("SELECT * FROM users", &[]).await.unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::Engine(EngineError::TableNotFound { .. })
        ));

        dropper.await.unwrap().unwrap();
    }
}
