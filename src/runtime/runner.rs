//! Query runner capability used by generated select functions.

use std::future::Future;

use super::{Error, Row, Statement};

/// Executes a statement against a database or transaction.
pub trait QueryRunner {
    fn run(&self, statement: Statement) -> impl Future<Output = Result<Vec<Row>, Error>>;
}

/// Runs a select statement and parses every returned row.
pub async fn run_select<R, T, F>(runner: &R, statement: Statement, parse: F) -> Result<Vec<T>, Error>
where
    R: QueryRunner + ?Sized,
    F: Fn(&Row) -> Result<T, Error>,
{
    let rows = runner.run(statement).await?;
    rows.iter().map(parse).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{string_from_wire, WireValue};
    use std::cell::RefCell;

    struct FakeRunner {
        rows: Vec<Row>,
        seen: RefCell<Vec<String>>,
    }

    impl QueryRunner for FakeRunner {
        async fn run(&self, statement: Statement) -> Result<Vec<Row>, Error> {
            self.seen.borrow_mut().push(statement.sql);
            Ok(self.rows.clone())
        }
    }

    #[tokio::test]
    async fn test_run_select_parses_rows_in_order() {
        let runner = FakeRunner {
            rows: vec![
                Row::new(vec![WireValue::String("a".to_string())]),
                Row::new(vec![WireValue::String("b".to_string())]),
            ],
            seen: RefCell::new(vec![]),
        };

        let names = run_select(&runner, Statement::new("SELECT T.name FROM T"), |row| {
            string_from_wire(row.cell(0)?)
        })
        .await
        .unwrap();

        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(*runner.seen.borrow(), vec!["SELECT T.name FROM T".to_string()]);
    }

    #[tokio::test]
    async fn test_run_select_propagates_parse_errors() {
        let runner = FakeRunner {
            rows: vec![Row::new(vec![WireValue::Int(1)])],
            seen: RefCell::new(vec![]),
        };

        let result = run_select(&runner, Statement::new("SELECT T.name FROM T"), |row| {
            string_from_wire(row.cell(0)?)
        })
        .await;

        assert!(matches!(result, Err(Error::Conversion { .. })));
    }
}
