//! End-to-end tests: definition file in, DDL artifact and Rust source out.

use std::cell::RefCell;
use std::fs;

use spanner_gen::codegen::RustRenderer;
use spanner_gen::commands::{Execute, GenerateCmd};
use spanner_gen::config::Config;
use spanner_gen::db::schema::compilers::DdlArtifact;
use spanner_gen::db::schema::{DatabaseDefinition, StaticResolver};
use spanner_gen::generator::DatabaseGenerator;
use spanner_gen::runtime::{self, QueryRunner, Row, Statement, WireType, WireValue};
use spanner_gen::sink::OutputRegistry;

const LIBRARY: &str = r#"{
    "name": "LibraryDatabase",
    "tables": [
        {
            "name": "Books",
            "columns": [
                {"name": "isbn", "type": "string"},
                {"name": "title", "type": "string"},
                {"name": "pages", "type": "int64"},
                {"name": "subtitle", "type": "string", "nullable": true}
            ],
            "primaryKeys": ["isbn"],
            "insert": "InsertBook",
            "get": "GetBook"
        },
        {
            "name": "Holds",
            "columns": [
                {"name": "isbn", "type": "string"},
                {"name": "patron", "type": "string"}
            ],
            "primaryKeys": ["isbn", "patron"],
            "interleave": {"parentTable": "Books"},
            "task": {}
        }
    ],
    "selects": [
        {
            "name": "ListLongBooks",
            "fromTable": "Books",
            "where": {"op": ">=", "leftColumn": {"name": "pages"}},
            "orderBy": [{"kind": "column", "name": "pages", "desc": true}],
            "limit": true,
            "getColumns": [{"kind": "column", "name": "title"}, {"kind": "column", "name": "subtitle"}]
        }
    ]
}"#;

fn library() -> DatabaseDefinition {
    DatabaseDefinition::from_json_str(LIBRARY).unwrap()
}

#[test]
fn test_generate_command_writes_ddl_and_code() {
    let dir = tempfile::tempdir().unwrap();
    let definition = dir.path().join("library.json");
    fs::write(&definition, LIBRARY).unwrap();

    let result = GenerateCmd {
        definition,
        out_dir: Some(dir.path().join("out")),
    }
    .execute(&Config::default())
    .unwrap();

    assert_eq!(
        result.statements,
        vec![
            "InsertBook",
            "GetBook",
            "UpdateHoldsMetadata",
            "ListPendingHolds",
            "GetHoldsMetadata",
            "ListLongBooks",
        ]
    );

    let ddl: DdlArtifact =
        serde_json::from_str(&fs::read_to_string(dir.path().join("out/library_database_ddl.json")).unwrap())
            .unwrap();
    assert_eq!(
        ddl.tables[0].create_table_ddl,
        "CREATE TABLE Books (isbn STRING(MAX) NOT NULL, title STRING(MAX) NOT NULL, pages INT64 NOT NULL, subtitle STRING(MAX)) PRIMARY KEY (isbn ASC)"
    );
    assert!(ddl.tables[1].create_table_ddl.ends_with(", INTERLEAVE IN PARENT Books"));

    let code = fs::read_to_string(dir.path().join("out/library_database_sql.rs")).unwrap();
    assert!(code.starts_with("//! Statements for LibraryDatabase."));
    assert!(code.contains("pub struct ListLongBooksRow {\n    pub books_title: String,\n    pub books_subtitle: Option<String>,\n}"));
    assert!(code.contains("pub async fn list_pending_holds("));
}

#[test]
fn test_generation_passes_are_independent() {
    let resolver = StaticResolver::default();
    let generator = DatabaseGenerator::new(&resolver);
    let renderer = RustRenderer::new("spanner_gen::runtime");

    let mut outputs = Vec::new();
    for _ in 0..2 {
        let def = library();
        let generated = generator.generate(&def).unwrap();
        let mut sink = OutputRegistry::new();
        generated.emit(&def, &renderer, &mut sink).unwrap();
        outputs.push(sink.render_all());
    }
    assert_eq!(outputs[0], outputs[1]);
}

#[test]
fn test_list_long_books_sql() {
    let resolver = StaticResolver::default();
    let generated = DatabaseGenerator::new(&resolver).generate(&library()).unwrap();
    let select = generated
        .statements
        .iter()
        .find(|s| s.name == "ListLongBooks")
        .unwrap();
    assert_eq!(
        select.sql,
        "SELECT Books.title, Books.subtitle FROM Books WHERE Books.pages >= @booksPagesGe ORDER BY Books.pages DESC LIMIT @limit"
    );
}

/// Hand-written equivalent of the generated `list_long_books` function.
#[derive(Debug, PartialEq)]
struct ListLongBooksRow {
    books_title: String,
    books_subtitle: Option<String>,
}

impl ListLongBooksRow {
    fn from_row(row: &Row) -> Result<Self, runtime::Error> {
        Ok(Self {
            books_title: runtime::string_from_wire(row.cell(0)?)?,
            books_subtitle: runtime::nullable_from_wire(row.cell(1)?, |v| runtime::string_from_wire(v))?,
        })
    }
}

struct RecordingRunner {
    rows: Vec<Row>,
    statements: RefCell<Vec<Statement>>,
}

impl QueryRunner for RecordingRunner {
    async fn run(&self, statement: Statement) -> Result<Vec<Row>, runtime::Error> {
        self.statements.borrow_mut().push(statement);
        Ok(self.rows.clone())
    }
}

#[tokio::test]
async fn test_runtime_round_trip_through_runner() {
    let runner = RecordingRunner {
        rows: vec![
            Row::new(vec![WireValue::String("Dune".to_string()), WireValue::Null]),
            Row::new(vec![
                WireValue::String("Hyperion".to_string()),
                WireValue::String("Cantos".to_string()),
            ]),
        ],
        statements: RefCell::new(vec![]),
    };
    let pages_ge: i64 = 400;
    let limit: i64 = 10;
    let statement = Statement::new("SELECT Books.title, Books.subtitle FROM Books WHERE Books.pages >= @booksPagesGe ORDER BY Books.pages DESC LIMIT @limit")
        .bind("booksPagesGe", WireType::Int64, runtime::int_to_wire(&pages_ge))
        .bind("limit", WireType::Int64, runtime::int_to_wire(&limit));

    let rows = runtime::run_select(&runner, statement, ListLongBooksRow::from_row)
        .await
        .unwrap();

    assert_eq!(
        rows,
        vec![
            ListLongBooksRow {
                books_title: "Dune".to_string(),
                books_subtitle: None,
            },
            ListLongBooksRow {
                books_title: "Hyperion".to_string(),
                books_subtitle: Some("Cantos".to_string()),
            },
        ]
    );
    let seen = runner.statements.borrow();
    assert_eq!(seen[0].params["booksPagesGe"], WireValue::Int(400));
    assert_eq!(seen[0].types["limit"], WireType::Int64);
}
