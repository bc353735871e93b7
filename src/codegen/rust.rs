//! Rust rendering of compiled statements.
//!
//! Each statement becomes a `<name>_statement` builder returning a
//! `runtime::Statement`. Selects additionally get a `<Name>Row` struct with a
//! row parser and an async function that runs the statement through a
//! `runtime::QueryRunner`.

use std::collections::HashMap;

use heck::{ToSnakeCase, ToUpperCamelCase};

use crate::db::schema::compilers::{CompiledStatement, StatementKind};
use crate::db::schema::types::ColumnType;
use crate::db::{CompileError, ResultExt};
use crate::runtime::WireType;

/// Keywords usable as raw identifiers (`r#type`).
const RAW_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do", "dyn",
    "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in", "let",
    "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref", "return",
    "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized", "use",
    "virtual", "where", "while", "yield",
];

/// Keywords that cannot be written as raw identifiers.
const RESERVED: &[&str] = &["crate", "self", "Self", "super", "_"];

/// Argument every generated select function takes first.
const RUNNER_ARGUMENT: &str = "runner";

/// Code for one statement plus the use-paths it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedStatement {
    pub code: String,
    pub imports: Vec<String>,
}

pub struct RustRenderer {
    runtime_path: String,
}

impl RustRenderer {
    /// `runtime_path` is the module generated code reaches the runtime through.
    pub fn new(runtime_path: impl Into<String>) -> Self {
        Self {
            runtime_path: runtime_path.into(),
        }
    }

    /// Use-path binding the runtime module as `runtime`.
    pub fn runtime_import(&self) -> String {
        if self.runtime_path == "runtime" || self.runtime_path.ends_with("::runtime") {
            self.runtime_path.clone()
        } else {
            format!("{} as runtime", self.runtime_path)
        }
    }

    pub fn render(&self, statement: &CompiledStatement) -> RenderedStatement {
        let mut imports: Vec<String> = statement
            .params
            .iter()
            .map(|p| &p.column_type)
            .chain(statement.outputs.iter().map(|o| &o.column_type))
            .flat_map(ColumnType::host_imports)
            .collect();
        imports.sort();
        imports.dedup();

        let mut code = render_builder(statement);
        if statement.kind == StatementKind::Select {
            code.push_str("\n\n");
            code.push_str(&render_row(statement));
            code.push_str("\n\n");
            code.push_str(&render_runner(statement));
        }

        tracing::trace!(statement = %statement.name, lines = code.lines().count(), "rendered statement");
        RenderedStatement { code, imports }
    }
}

/// Snake-case Rust identifier for `name`, raw when it is a keyword.
fn rust_ident(name: &str) -> String {
    let ident = name.to_snake_case();
    if RAW_KEYWORDS.contains(&ident.as_str()) {
        format!("r#{}", ident)
    } else {
        ident
    }
}

fn check_ident(what: &'static str, name: &str) -> Result<String, CompileError> {
    let ident = name.to_snake_case();
    let well_formed = ident
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && ident.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !well_formed || RESERVED.contains(&ident.as_str()) {
        return Err(CompileError::invalid(format!(
            "{} {} does not map to a usable Rust identifier.",
            what, name
        )));
    }
    Ok(ident)
}

/// Records `ident` for `name`, failing if another name already produced it.
fn claim<'n>(
    seen: &mut HashMap<String, &'n str>,
    what: &'static str,
    name: &'n str,
    ident: String,
) -> Result<(), CompileError> {
    if let Some(other) = seen.get(&ident) {
        return Err(CompileError::invalid(format!(
            "{} {} and {} both map to the Rust identifier {}.",
            what, other, name, ident
        )));
    }
    seen.insert(ident, name);
    Ok(())
}

/// Checks that every statement renders to distinct, valid Rust identifiers.
pub fn check_identifiers(statements: &[CompiledStatement]) -> Result<(), CompileError> {
    let mut functions = HashMap::new();
    let mut rows = HashMap::new();
    for statement in statements {
        let ident = check_ident("statement", &statement.name)
            .with_context(|| format!("When generating {}", statement.name))?;
        claim(&mut functions, "statements", &statement.name, ident)
            .with_context(|| format!("When generating {}", statement.name))?;
        if statement.kind == StatementKind::Select {
            claim(&mut rows, "statements", &statement.name, row_name(statement))
                .with_context(|| format!("When generating {}", statement.name))?;
        }
        check_statement(statement).with_context(|| format!("When generating {}", statement.name))?;
    }
    Ok(())
}

fn check_statement(statement: &CompiledStatement) -> Result<(), CompileError> {
    let mut arguments = HashMap::new();
    if statement.kind == StatementKind::Select {
        arguments.insert(RUNNER_ARGUMENT.to_string(), RUNNER_ARGUMENT);
    }
    for param in &statement.params {
        let ident = check_ident("parameter", &param.name)?;
        claim(&mut arguments, "parameters", &param.name, ident)?;
    }

    let mut fields = HashMap::new();
    for output in &statement.outputs {
        let ident = check_ident("output field", &output.name)?;
        claim(&mut fields, "output fields", &output.name, ident)?;
    }
    Ok(())
}

fn builder_name(statement: &CompiledStatement) -> String {
    format!("{}_statement", statement.name.to_snake_case())
}

fn row_name(statement: &CompiledStatement) -> String {
    format!("{}Row", statement.name.to_upper_camel_case())
}

fn arguments(statement: &CompiledStatement) -> Vec<String> {
    statement
        .params
        .iter()
        .map(|p| format!("{}: {}", rust_ident(&p.name), p.column_type.host_type()))
        .collect()
}

fn render_builder(statement: &CompiledStatement) -> String {
    let mut code = format!(
        "/// `{}`\npub fn {}({}) -> runtime::Statement {{\n    runtime::Statement::new({:?})",
        statement.sql,
        builder_name(statement),
        arguments(statement).join(", "),
        statement.sql
    );
    for param in &statement.params {
        code.push_str(&format!(
            "\n        .bind({:?}, {}, {})",
            param.name,
            wire_type_expr(&param.column_type.wire_type()),
            param.column_type.marshal_expr(&rust_ident(&param.name))
        ));
    }
    code.push_str("\n}");
    code
}

fn render_row(statement: &CompiledStatement) -> String {
    let name = row_name(statement);
    let fields = statement
        .outputs
        .iter()
        .map(|o| format!("    pub {}: {},\n", rust_ident(&o.name), o.column_type.host_type()))
        .collect::<String>();
    let parsers = statement
        .outputs
        .iter()
        .enumerate()
        .map(|(i, o)| {
            format!(
                "            {}: {}?,\n",
                rust_ident(&o.name),
                o.column_type.unmarshal_expr(&format!("row.cell({})?", i))
            )
        })
        .collect::<String>();

    format!(
        "#[derive(Debug, Clone, PartialEq)]\npub struct {name} {{\n{fields}}}\n\n\
         impl {name} {{\n    pub fn from_row(row: &runtime::Row) -> Result<Self, runtime::Error> {{\n        \
         Ok(Self {{\n{parsers}        }})\n    }}\n}}"
    )
}

fn render_runner(statement: &CompiledStatement) -> String {
    let mut arguments = vec![format!("{}: &impl runtime::QueryRunner", RUNNER_ARGUMENT)];
    arguments.extend(self::arguments(statement));
    let names = statement
        .params
        .iter()
        .map(|p| rust_ident(&p.name))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "pub async fn {}({}) -> Result<Vec<{}>, runtime::Error> {{\n    \
         runtime::run_select({}, {}({}), {}::from_row).await\n}}",
        rust_ident(&statement.name),
        arguments.join(", "),
        row_name(statement),
        RUNNER_ARGUMENT,
        builder_name(statement),
        names,
        row_name(statement)
    )
}

fn wire_type_expr(wire_type: &WireType) -> String {
    match wire_type {
        WireType::Bool => "runtime::WireType::Bool".to_string(),
        WireType::Int64 => "runtime::WireType::Int64".to_string(),
        WireType::Float64 => "runtime::WireType::Float64".to_string(),
        WireType::Timestamp => "runtime::WireType::Timestamp".to_string(),
        WireType::String => "runtime::WireType::String".to_string(),
        WireType::Bytes => "runtime::WireType::Bytes".to_string(),
        WireType::Array(child) => format!("runtime::WireType::array({})", wire_type_expr(child)),
    }
}
