//! Spanner DDL compiler.
//!
//! Generates incremental `ALTER TABLE ... ADD COLUMN` fragments, a full
//! `CREATE TABLE` statement and index DDL from a table definition, validating
//! keys, interleaving and search columns along the way. A compiled table is
//! registered in the [`SchemaRegistry`] so statements can reference it.
//!
//! Output is deterministic: columns, search columns and indexes appear in
//! declaration order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::db::schema::definition::{KeyColumn, TableDefinition};
use crate::db::schema::registry::{Column, KeyPart, SchemaRegistry, SearchColumn, Table};
use crate::db::schema::types::{PrimitiveType, TypeCatalog};
use crate::db::{CompileError, ResultExt};

/// DDL for every table of a database, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DdlArtifact {
    pub tables: Vec<TableDdl>,
}

impl DdlArtifact {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDdl {
    pub name: String,
    pub columns: Vec<ColumnDdl>,
    pub create_table_ddl: String,
    pub indexes: Vec<IndexDdl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDdl {
    pub name: String,
    pub add_column_ddl: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDdl {
    pub name: String,
    pub create_index_ddl: String,
}

/// Compiler for generating Spanner DDL from table definitions.
pub struct DdlCompiler;

impl DdlCompiler {
    /// Validate and compile one table, then register it.
    pub fn compile_table(
        definition: &TableDefinition,
        catalog: &TypeCatalog<'_>,
        registry: &mut SchemaRegistry,
    ) -> Result<TableDdl, CompileError> {
        let label = format!("When generating table {}", definition.name);
        let table = Self::build_table(definition, catalog, registry).context(label.clone())?;
        let ddl = Self::render_table(&table);
        registry.register(table).context(label)?;

        tracing::debug!(
            table = %ddl.name,
            columns = ddl.columns.len(),
            indexes = ddl.indexes.len(),
            "compiled table ddl"
        );
        Ok(ddl)
    }

    fn build_table(
        definition: &TableDefinition,
        catalog: &TypeCatalog<'_>,
        registry: &SchemaRegistry,
    ) -> Result<Table, CompileError> {
        if definition.name.is_empty() {
            return Err(CompileError::missing("name"));
        }
        if definition.columns.is_empty() {
            return Err(CompileError::missing("columns"));
        }
        if definition.primary_keys.is_empty() {
            return Err(CompileError::missing("primaryKeys"));
        }

        let owner = format!("table {}", definition.name);
        let mut columns = IndexMap::new();
        for column in &definition.columns {
            if column.name.is_empty() {
                return Err(CompileError::missing("name of a column"));
            }
            if columns.contains_key(&column.name) {
                return Err(CompileError::invalid(format!(
                    "column {} is declared more than once.",
                    column.name
                )));
            }
            let column_type = catalog.resolve_column(&owner, column)?;
            if column.allow_commit_timestamp
                && (!column_type.is_primitive(PrimitiveType::Timestamp) || column_type.is_array)
            {
                return Err(CompileError::invalid(format!(
                    "column {} allows commit timestamp but is not a non-array timestamp.",
                    column.name
                )));
            }
            columns.insert(
                column.name.clone(),
                Column {
                    name: column.name.clone(),
                    column_type,
                    allow_commit_timestamp: column.allow_commit_timestamp,
                },
            );
        }

        let mut table = Table {
            name: definition.name.clone(),
            columns,
            primary_keys: Vec::new(),
            search_columns: IndexMap::new(),
            column_groups: IndexMap::new(),
            definition: definition.clone(),
        };

        for search_column in &definition.search_columns {
            let search = Self::build_search_column(&table, &search_column.name, &search_column.source_columns)
                .with_context(|| format!("and when generating search column {}", search_column.name))?;
            table.search_columns.insert(search.name.clone(), search);
        }

        table.primary_keys = Self::build_key(&table, &definition.primary_keys)
            .context("and when generating primary keys")?;

        for group in &definition.column_groups {
            if table.column_groups.contains_key(&group.name) {
                return Err(CompileError::invalid(format!(
                    "column group {} is declared more than once.",
                    group.name
                )));
            }
            for name in &group.columns {
                table
                    .column(name)
                    .with_context(|| format!("and when generating column group {}", group.name))?;
            }
            table
                .column_groups
                .insert(group.name.clone(), group.columns.clone());
        }

        if let Some(interleave) = &definition.interleave {
            let parent = registry
                .table(&interleave.parent_table)
                .with_context(|| format!("and when interleaving in {}", interleave.parent_table))?;
            Self::check_interleave(&table, parent)
                .with_context(|| format!("and when interleaving in {}", interleave.parent_table))?;
        }

        for index in &definition.indexes {
            Self::check_index(&table, &index.name, &index.columns)
                .with_context(|| format!("and when generating index {}", index.name))?;
        }

        for index in &definition.search_indexes {
            Self::check_search_index(&table, index)
                .with_context(|| format!("and when generating search index {}", index.name))?;
        }

        Ok(table)
    }

    fn build_search_column(table: &Table, name: &str, sources: &[String]) -> Result<SearchColumn, CompileError> {
        if table.columns.contains_key(name) || table.search_columns.contains_key(name) {
            return Err(CompileError::invalid(format!(
                "search column {} conflicts with another column of the same name.",
                name
            )));
        }
        if sources.is_empty() {
            return Err(CompileError::missing("sourceColumns"));
        }
        for source in sources {
            let column = table.column(source)?;
            if !column.column_type.is_primitive(PrimitiveType::String) || column.column_type.is_array {
                return Err(CompileError::invalid(format!(
                    "column {} must be a non-array string to be tokenized.",
                    source
                )));
            }
        }
        Ok(SearchColumn {
            name: name.to_string(),
            source_columns: sources.to_vec(),
        })
    }

    fn build_key(table: &Table, keys: &[KeyColumn]) -> Result<Vec<KeyPart>, CompileError> {
        let mut parts: Vec<KeyPart> = Vec::with_capacity(keys.len());
        for key in keys {
            let column = table.column(key.name())?;
            if column.column_type.is_array {
                return Err(CompileError::invalid(format!(
                    "primary key column {} cannot be an array.",
                    key.name()
                )));
            }
            if parts.iter().any(|p| p.name == key.name()) {
                return Err(CompileError::invalid(format!(
                    "primary key column {} is listed more than once.",
                    key.name()
                )));
            }
            parts.push(KeyPart {
                name: key.name().to_string(),
                desc: key.desc(),
            });
        }
        Ok(parts)
    }

    /// The child key must strictly extend the parent key: same names,
    /// directions and types for every parent position.
    fn check_interleave(child: &Table, parent: &Table) -> Result<(), CompileError> {
        if child.primary_keys.len() <= parent.primary_keys.len() {
            return Err(CompileError::invalid(format!(
                "table {} has {} primary keys but must have more than the {} of parent table {}.",
                child.name,
                child.primary_keys.len(),
                parent.primary_keys.len(),
                parent.name
            )));
        }

        for (position, (parent_key, child_key)) in
            parent.primary_keys.iter().zip(&child.primary_keys).enumerate()
        {
            if parent_key.name != child_key.name {
                return Err(CompileError::invalid(format!(
                    "primary key at position {} must be {} to match parent table {}, but is {}.",
                    position, parent_key.name, parent.name, child_key.name
                )));
            }
            if parent_key.desc != child_key.desc {
                return Err(CompileError::invalid(format!(
                    "primary key {} at position {} must be {} to match parent table {}.",
                    child_key.name,
                    position,
                    direction(parent_key.desc),
                    parent.name
                )));
            }
            let parent_type = &parent.column(&parent_key.name)?.column_type;
            let child_type = &child.column(&child_key.name)?.column_type;
            if parent_type != child_type {
                return Err(CompileError::invalid(format!(
                    "primary key {} at position {} has type {} but parent table {} has type {}.",
                    child_key.name,
                    position,
                    describe_type(child_type),
                    parent.name,
                    describe_type(parent_type)
                )));
            }
        }
        Ok(())
    }

    fn check_index(table: &Table, name: &str, columns: &[KeyColumn]) -> Result<(), CompileError> {
        if name.is_empty() {
            return Err(CompileError::missing("name"));
        }
        if columns.is_empty() {
            return Err(CompileError::missing("columns"));
        }
        for key in columns {
            let column = table.column(key.name())?;
            if column.column_type.is_array {
                return Err(CompileError::invalid(format!(
                    "column {} is an array and cannot be indexed.",
                    key.name()
                )));
            }
        }
        Ok(())
    }

    fn check_search_index(
        table: &Table,
        index: &crate::db::schema::definition::SearchIndexDefinition,
    ) -> Result<(), CompileError> {
        if index.columns.is_empty() {
            return Err(CompileError::missing("columns"));
        }
        for name in &index.columns {
            table.search_column(name)?;
        }
        for name in &index.partition_by_columns {
            let column = table.column(name)?;
            if column.column_type.is_array {
                return Err(CompileError::invalid(format!(
                    "partition by column {} cannot be an array.",
                    name
                )));
            }
        }
        for name in &index.order_by_columns {
            let column_type = &table.column(name)?.column_type;
            if !column_type.is_primitive(PrimitiveType::Int64) || column_type.is_array || column_type.nullable {
                return Err(CompileError::invalid(format!(
                    "order by column {} of search index {} must be a non-array, non-nullable int64.",
                    name, index.name
                )));
            }
        }
        Ok(())
    }

    fn render_table(table: &Table) -> TableDdl {
        let mut fragments = Vec::new();
        let mut columns = Vec::new();

        for column in table.columns.values() {
            let fragment = Self::column_fragment(column);
            columns.push(ColumnDdl {
                name: column.name.clone(),
                add_column_ddl: format!("ALTER TABLE {} ADD COLUMN {}", table.name, fragment),
            });
            fragments.push(fragment);
        }
        for search in table.search_columns.values() {
            let fragment = Self::search_column_fragment(search);
            columns.push(ColumnDdl {
                name: search.name.clone(),
                add_column_ddl: format!("ALTER TABLE {} ADD COLUMN {}", table.name, fragment),
            });
            fragments.push(fragment);
        }

        let primary_key = table
            .primary_keys
            .iter()
            .map(|k| format!("{} {}", k.name, direction(k.desc)))
            .collect::<Vec<_>>()
            .join(", ");

        let interleave = table
            .definition
            .interleave
            .as_ref()
            .map(|i| {
                format!(
                    ", INTERLEAVE IN PARENT {}{}",
                    i.parent_table,
                    if i.cascade_on_delete { " ON DELETE CASCADE" } else { "" }
                )
            })
            .unwrap_or_default();

        let create_table_ddl = format!(
            "CREATE TABLE {} ({}) PRIMARY KEY ({}){}",
            table.name,
            fragments.join(", "),
            primary_key,
            interleave
        );

        let mut indexes: Vec<IndexDdl> = table
            .definition
            .indexes
            .iter()
            .map(|index| {
                let keys = index
                    .columns
                    .iter()
                    .map(|k| if k.desc() { format!("{} DESC", k.name()) } else { k.name().to_string() })
                    .collect::<Vec<_>>()
                    .join(", ");
                IndexDdl {
                    name: index.name.clone(),
                    create_index_ddl: format!(
                        "CREATE {}{}INDEX {} ON {}({})",
                        if index.unique { "UNIQUE " } else { "" },
                        if index.null_filtered { "NULL_FILTERED " } else { "" },
                        index.name,
                        table.name,
                        keys
                    ),
                }
            })
            .collect();

        indexes.extend(table.definition.search_indexes.iter().map(|index| {
            let mut ddl = format!(
                "CREATE SEARCH INDEX {} ON {}({})",
                index.name,
                table.name,
                index.columns.join(", ")
            );
            if !index.partition_by_columns.is_empty() {
                ddl.push_str(&format!(" PARTITION BY {}", index.partition_by_columns.join(", ")));
            }
            if !index.order_by_columns.is_empty() {
                ddl.push_str(&format!(" ORDER BY {}", index.order_by_columns.join(", ")));
            }
            IndexDdl {
                name: index.name.clone(),
                create_index_ddl: ddl,
            }
        }));

        TableDdl {
            name: table.name.clone(),
            columns,
            create_table_ddl,
            indexes,
        }
    }

    fn column_fragment(column: &Column) -> String {
        format!(
            "{} {}{}{}",
            column.name,
            column.column_type.ddl_type(),
            if column.column_type.nullable { "" } else { " NOT NULL" },
            if column.allow_commit_timestamp {
                " OPTIONS(allow_commit_timestamp=true)"
            } else {
                ""
            }
        )
    }

    fn search_column_fragment(search: &SearchColumn) -> String {
        format!(
            "{} TOKENLIST AS (TOKENIZE_FULLTEXT({})) HIDDEN",
            search.name,
            search.source_columns.join(" || ' ' || ")
        )
    }
}

fn direction(desc: bool) -> &'static str {
    if desc { "DESC" } else { "ASC" }
}

fn describe_type(column_type: &crate::db::schema::types::ColumnType) -> String {
    format!(
        "{}{}",
        column_type.ddl_type(),
        if column_type.nullable { "" } else { " NOT NULL" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::definition::{
        ColumnDefinition, ColumnGroupDefinition, IndexDefinition, InterleaveDefinition,
        SearchColumnDefinition, SearchIndexDefinition,
    };
    use crate::db::schema::types::StaticResolver;
    use crate::db::ErrorCategory;
    use rstest::{fixture, rstest};

    #[fixture]
    fn resolver() -> StaticResolver {
        StaticResolver::default()
    }

    fn items() -> TableDefinition {
        TableDefinition {
            name: "Items".to_string(),
            columns: vec![
                ColumnDefinition::new("id", "string"),
                ColumnDefinition::new("price", "float64"),
                ColumnDefinition::new("tag", "string").array(),
            ],
            primary_keys: vec!["id".into()],
            ..Default::default()
        }
    }

    fn compile(def: &TableDefinition, resolver: &StaticResolver, registry: &mut SchemaRegistry) -> Result<TableDdl, CompileError> {
        let catalog = TypeCatalog::new(resolver);
        DdlCompiler::compile_table(def, &catalog, registry)
    }

    #[rstest]
    fn test_items_compilation(resolver: StaticResolver) {
        let mut registry = SchemaRegistry::new();
        let ddl = compile(&items(), &resolver, &mut registry).unwrap();

        assert_eq!(ddl.name, "Items");
        let names: Vec<_> = ddl.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "price", "tag"]);
        assert_eq!(
            ddl.columns[2].add_column_ddl,
            "ALTER TABLE Items ADD COLUMN tag Array<STRING(MAX)> NOT NULL"
        );
        assert_eq!(
            ddl.create_table_ddl,
            "CREATE TABLE Items (id STRING(MAX) NOT NULL, price FLOAT64 NOT NULL, tag Array<STRING(MAX)> NOT NULL) PRIMARY KEY (id ASC)"
        );
        assert!(ddl.indexes.is_empty());
        assert!(registry.contains("Items"));
    }

    #[rstest]
    fn test_modifiers_appear_once_per_column(resolver: StaticResolver) {
        let mut def = items();
        def.columns.push(ColumnDefinition::new("note", "string").nullable());
        def.columns.push(ColumnDefinition {
            allow_commit_timestamp: true,
            ..ColumnDefinition::new("updatedAt", "timestamp")
        });
        let ddl = compile(&def, &resolver, &mut SchemaRegistry::new()).unwrap();

        assert_eq!(ddl.columns[3].add_column_ddl, "ALTER TABLE Items ADD COLUMN note STRING(MAX)");
        assert_eq!(
            ddl.columns[4].add_column_ddl,
            "ALTER TABLE Items ADD COLUMN updatedAt TIMESTAMP NOT NULL OPTIONS(allow_commit_timestamp=true)"
        );
        assert_eq!(ddl.create_table_ddl.matches("NOT NULL").count(), 4);
        assert_eq!(ddl.create_table_ddl.matches("allow_commit_timestamp").count(), 1);
    }

    #[rstest]
    #[case(ColumnDefinition::new("at", "string"))]
    #[case(ColumnDefinition::new("at", "timestamp").array())]
    fn test_commit_timestamp_requires_scalar_timestamp(resolver: StaticResolver, #[case] column: ColumnDefinition) {
        let mut def = items();
        def.columns.push(ColumnDefinition {
            allow_commit_timestamp: true,
            ..column
        });
        let err = compile(&def, &resolver, &mut SchemaRegistry::new()).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InvalidShape);
        assert!(err.to_string().starts_with("When generating table Items, column at allows commit timestamp"));
    }

    #[rstest]
    #[case::name(TableDefinition { name: String::new(), ..items() }, "name is missing.")]
    #[case::columns(TableDefinition { columns: vec![], ..items() }, "columns is missing.")]
    #[case::keys(TableDefinition { primary_keys: vec![], ..items() }, "primaryKeys is missing.")]
    fn test_missing_fields(resolver: StaticResolver, #[case] def: TableDefinition, #[case] message: &str) {
        let err = compile(&def, &resolver, &mut SchemaRegistry::new()).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::MissingField);
        assert!(err.to_string().ends_with(message), "{}", err);
    }

    #[rstest]
    fn test_array_primary_key_is_rejected(resolver: StaticResolver) {
        let def = TableDefinition {
            primary_keys: vec!["tag".into()],
            ..items()
        };
        let err = compile(&def, &resolver, &mut SchemaRegistry::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "When generating table Items, and when generating primary keys, primary key column tag cannot be an array."
        );
    }

    #[rstest]
    fn test_unknown_primary_key(resolver: StaticResolver) {
        let def = TableDefinition {
            primary_keys: vec!["sku".into()],
            ..items()
        };
        let err = compile(&def, &resolver, &mut SchemaRegistry::new()).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::UnresolvedReference);
        assert!(err.to_string().ends_with("column sku is not found in table Items."));
    }

    fn reviews(keys: Vec<KeyColumn>) -> TableDefinition {
        TableDefinition {
            name: "Reviews".to_string(),
            columns: vec![
                ColumnDefinition::new("id", "string"),
                ColumnDefinition::new("reviewId", "int64"),
                ColumnDefinition::new("body", "string"),
            ],
            primary_keys: keys,
            interleave: Some(InterleaveDefinition {
                parent_table: "Items".to_string(),
                cascade_on_delete: true,
            }),
            ..Default::default()
        }
    }

    #[rstest]
    fn test_interleave_success(resolver: StaticResolver) {
        let mut registry = SchemaRegistry::new();
        compile(&items(), &resolver, &mut registry).unwrap();
        let ddl = compile(&reviews(vec!["id".into(), "reviewId".into()]), &resolver, &mut registry).unwrap();
        assert!(ddl.create_table_ddl.ends_with(
            "PRIMARY KEY (id ASC, reviewId ASC), INTERLEAVE IN PARENT Items ON DELETE CASCADE"
        ));
    }

    #[rstest]
    #[case::same_length(vec!["id".into()], "has 1 primary keys but must have more than the 1 of parent table Items")]
    #[case::wrong_name(vec!["reviewId".into(), "id".into()], "primary key at position 0 must be id to match parent table Items, but is reviewId")]
    #[case::wrong_direction(
        vec![KeyColumn::Entry { name: "id".to_string(), desc: true }, "reviewId".into()],
        "primary key id at position 0 must be ASC to match parent table Items"
    )]
    fn test_interleave_prefix_violations(
        resolver: StaticResolver,
        #[case] keys: Vec<KeyColumn>,
        #[case] expected: &str,
    ) {
        let mut registry = SchemaRegistry::new();
        compile(&items(), &resolver, &mut registry).unwrap();
        let err = compile(&reviews(keys), &resolver, &mut registry).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InvalidShape);
        assert!(err.to_string().contains("and when interleaving in Items"));
        assert!(err.to_string().contains(expected), "{}", err);
        assert!(!registry.contains("Reviews"));
    }

    #[rstest]
    fn test_interleave_type_mismatch(resolver: StaticResolver) {
        let mut registry = SchemaRegistry::new();
        compile(&items(), &resolver, &mut registry).unwrap();
        let mut def = reviews(vec!["id".into(), "reviewId".into()]);
        def.columns[0] = ColumnDefinition::new("id", "int64");
        let err = compile(&def, &resolver, &mut registry).unwrap_err();
        assert!(err.to_string().ends_with(
            "primary key id at position 0 has type INT64 NOT NULL but parent table Items has type STRING(MAX) NOT NULL."
        ));
    }

    #[rstest]
    fn test_interleave_requires_declared_parent(resolver: StaticResolver) {
        let err = compile(&reviews(vec!["id".into(), "reviewId".into()]), &resolver, &mut SchemaRegistry::new())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "When generating table Reviews, and when interleaving in Items, table Items is not found."
        );
    }

    #[rstest]
    fn test_indexes(resolver: StaticResolver) {
        let mut def = items();
        def.indexes = vec![
            IndexDefinition {
                name: "ItemsByPrice".to_string(),
                columns: vec![KeyColumn::Entry {
                    name: "price".to_string(),
                    desc: true,
                }],
                unique: false,
                null_filtered: false,
            },
            IndexDefinition {
                name: "ItemsByIdPrice".to_string(),
                columns: vec!["id".into(), "price".into()],
                unique: true,
                null_filtered: true,
            },
        ];
        let ddl = compile(&def, &resolver, &mut SchemaRegistry::new()).unwrap();
        assert_eq!(ddl.indexes[0].create_index_ddl, "CREATE INDEX ItemsByPrice ON Items(price DESC)");
        assert_eq!(
            ddl.indexes[1].create_index_ddl,
            "CREATE UNIQUE NULL_FILTERED INDEX ItemsByIdPrice ON Items(id, price)"
        );
    }

    #[rstest]
    fn test_array_index_column_is_rejected(resolver: StaticResolver) {
        let mut def = items();
        def.indexes = vec![IndexDefinition {
            name: "ItemsByTag".to_string(),
            columns: vec!["tag".into()],
            unique: false,
            null_filtered: false,
        }];
        let err = compile(&def, &resolver, &mut SchemaRegistry::new()).unwrap_err();
        assert!(err.to_string().contains("and when generating index ItemsByTag, column tag is an array"));
    }

    fn searchable() -> TableDefinition {
        let mut def = items();
        def.columns.push(ColumnDefinition::new("title", "string"));
        def.columns.push(ColumnDefinition::new("body", "string"));
        def.columns.push(ColumnDefinition::new("rank", "int64"));
        def.search_columns = vec![SearchColumnDefinition {
            name: "content".to_string(),
            source_columns: vec!["title".to_string(), "body".to_string()],
        }];
        def
    }

    #[rstest]
    fn test_search_column_and_index(resolver: StaticResolver) {
        let mut def = searchable();
        def.search_indexes = vec![SearchIndexDefinition {
            name: "ItemsSearch".to_string(),
            columns: vec!["content".to_string()],
            partition_by_columns: vec!["id".to_string()],
            order_by_columns: vec!["rank".to_string()],
        }];
        let ddl = compile(&def, &resolver, &mut SchemaRegistry::new()).unwrap();

        let content = ddl.columns.last().unwrap();
        assert_eq!(content.name, "content");
        assert_eq!(
            content.add_column_ddl,
            "ALTER TABLE Items ADD COLUMN content TOKENLIST AS (TOKENIZE_FULLTEXT(title || ' ' || body)) HIDDEN"
        );
        assert!(ddl.create_table_ddl.contains(
            "rank INT64 NOT NULL, content TOKENLIST AS (TOKENIZE_FULLTEXT(title || ' ' || body)) HIDDEN)"
        ));
        assert_eq!(
            ddl.indexes[0].create_index_ddl,
            "CREATE SEARCH INDEX ItemsSearch ON Items(content) PARTITION BY id ORDER BY rank"
        );
    }

    #[rstest]
    fn test_search_index_order_by_must_be_int(resolver: StaticResolver) {
        let mut def = searchable();
        def.search_indexes = vec![SearchIndexDefinition {
            name: "ItemsSearch".to_string(),
            columns: vec!["content".to_string()],
            partition_by_columns: vec![],
            order_by_columns: vec!["price".to_string()],
        }];
        let err = compile(&def, &resolver, &mut SchemaRegistry::new()).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InvalidShape);
        assert_eq!(
            err.to_string(),
            "When generating table Items, and when generating search index ItemsSearch, order by column price of search index ItemsSearch must be a non-array, non-nullable int64."
        );
    }

    #[rstest]
    #[case::array("tag")]
    #[case::not_string("price")]
    fn test_search_column_sources_must_be_scalar_strings(resolver: StaticResolver, #[case] source: &str) {
        let mut def = items();
        def.search_columns = vec![SearchColumnDefinition {
            name: "content".to_string(),
            source_columns: vec![source.to_string()],
        }];
        let err = compile(&def, &resolver, &mut SchemaRegistry::new()).unwrap_err();
        assert!(err
            .to_string()
            .contains("and when generating search column content, column"));
        assert!(err.to_string().ends_with("must be a non-array string to be tokenized."));
    }

    #[rstest]
    fn test_column_group_references_are_checked(resolver: StaticResolver) {
        let mut def = items();
        def.column_groups = vec![ColumnGroupDefinition {
            name: "summary".to_string(),
            columns: vec!["id".to_string(), "sku".to_string()],
        }];
        let err = compile(&def, &resolver, &mut SchemaRegistry::new()).unwrap_err();
        assert!(err
            .to_string()
            .ends_with("and when generating column group summary, column sku is not found in table Items."));
    }

    #[rstest]
    fn test_artifact_json_uses_camel_case(resolver: StaticResolver) {
        let ddl = compile(&items(), &resolver, &mut SchemaRegistry::new()).unwrap();
        let json = DdlArtifact { tables: vec![ddl] }.to_json().unwrap();
        assert!(json.contains("\"createTableDdl\""));
        assert!(json.contains("\"addColumnDdl\""));
    }
}
