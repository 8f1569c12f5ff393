use std::io;
use std::path::PathBuf;

use recipe_csv::{CsvWriter, write_table_to_path};
use recipe_query::{SqliteConnection, execute};
use recipe_table::{ScalarValue, Table};
use recipe_transform::Pipeline;
use tracing::{debug, info};

use crate::config::Recipe;
use crate::errors::Result;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// SQLite database to query.
    pub database: PathBuf,
    /// Recipe file.
    pub recipe: PathBuf,
    /// Parameter values overriding the recipe's.
    pub params: Vec<(String, ScalarValue)>,
    /// Output path overriding the recipe's.
    pub output: Option<PathBuf>,
}

/// Run a recipe end to end.
///
/// Steps are validated before the database is touched. The result is written
/// to the output path if there is one, otherwise to `stdout`.
pub fn run<W: io::Write>(opts: &RunOptions, stdout: W) -> Result<Table> {
    let recipe = Recipe::from_file(&opts.recipe)?;
    let pipeline = Pipeline::try_new(recipe.steps.iter().cloned())?;

    let mut spec = recipe.query_spec()?;
    for (name, value) in &opts.params {
        spec.bind(name.clone(), value.clone());
    }

    let mut conn = SqliteConnection::open_read_only(&opts.database)?;
    let table = execute(&mut conn, &spec)?;
    conn.close()?;
    info!(rows = table.num_rows(), columns = table.num_columns(), "query complete");

    let table = pipeline.apply(table)?;
    info!(
        steps = pipeline.len(),
        rows = table.num_rows(),
        columns = table.num_columns(),
        "pipeline complete"
    );

    let dialect = recipe.output.dialect()?;
    let output = match &opts.output {
        Some(path) => Some(path.clone()),
        None => recipe.output.path.as_deref().map(|p| recipe.resolve(p)),
    };

    match output {
        Some(path) => {
            write_table_to_path(&path, &table, dialect, recipe.output.header)?;
            info!(path = %path.display(), "wrote output");
        }
        None => {
            debug!("writing output to stdout");
            let mut writer = CsvWriter::new(stdout, dialect, recipe.output.header);
            writer.write_table(&table)?;
            writer.flush()?;
        }
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::errors::RecipeError;

    fn setup_db(dir: &Path) -> PathBuf {
        let path = dir.join("records.db");
        let mut conn = SqliteConnection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE smr01 (LINK_NO INTEGER, ADMISSION_DATE DATE, HBRES TEXT, MAIN_CONDITION TEXT);
             INSERT INTO smr01 VALUES
                (1, '2019-05-02', 'S08000019', 'I21'),
                (1, '2019-07-09', 'S08000019', 'I25'),
                (2, '2019-08-20', 'S08000031', 'J00'),
                (3, '2020-01-15', 'S08000019', NULL);",
        )
        .unwrap();
        path
    }

    fn write_recipe(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("recipe.json");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn run_to_stdout() {
        logutil::init_test();
        let dir = tempfile::tempdir().unwrap();
        let database = setup_db(dir.path());
        let recipe = write_recipe(
            dir.path(),
            r#"{
                "query": {"sql": "SELECT LINK_NO, ADMISSION_DATE, HBRES, MAIN_CONDITION FROM smr01 WHERE ADMISSION_DATE >= :start ORDER BY LINK_NO, ADMISSION_DATE"},
                "params": {"start": "2019-01-01"},
                "steps": [
                    {"kind": "derive_date_part", "column": "ADMISSION_DATE", "output": "YEAR", "part": "year"},
                    {"kind": "dedupe_by_keys", "keys": ["LINK_NO", "YEAR"]},
                    {"kind": "map_lookup", "column": "HBRES", "mapping": {"S08000019": "NHS Forth Valley"}, "default": "Other"},
                    {"kind": "regex_flag", "column": "MAIN_CONDITION", "pattern": "^I2[0-5]", "output": "IHD"},
                    {"kind": "select_columns", "columns": ["LINK_NO", "YEAR", "HBRES", "IHD"]}
                ]
            }"#,
        );

        let mut out = Vec::new();
        let opts = RunOptions {
            database,
            recipe,
            ..Default::default()
        };
        let table = run(&opts, &mut out).unwrap();
        assert_eq!(3, table.num_rows());
        assert_eq!(
            "LINK_NO,YEAR,HBRES,IHD\n\
             1,2019,NHS Forth Valley,1\n\
             2,2019,Other,0\n\
             3,2020,NHS Forth Valley,0\n",
            String::from_utf8(out).unwrap()
        );
    }

    #[test]
    fn param_override_and_output_file() {
        logutil::init_test();
        let dir = tempfile::tempdir().unwrap();
        let database = setup_db(dir.path());
        let recipe = write_recipe(
            dir.path(),
            r#"{
                "query": {"sql": "SELECT LINK_NO FROM smr01 WHERE HBRES = :hb ORDER BY LINK_NO"},
                "params": {"hb": "S08000019"},
                "steps": [{"kind": "dedupe_by_keys", "keys": ["LINK_NO"]}],
                "output": {"path": "out.csv", "header": false}
            }"#,
        );

        let opts = RunOptions {
            database: database.clone(),
            recipe: recipe.clone(),
            ..Default::default()
        };
        run(&opts, io::sink()).unwrap();
        assert_eq!(
            "1\n3\n",
            std::fs::read_to_string(dir.path().join("out.csv")).unwrap()
        );

        let override_path = dir.path().join("override.csv");
        let opts = RunOptions {
            database,
            recipe,
            params: vec![("hb".to_string(), ScalarValue::from("S08000031"))],
            output: Some(override_path.clone()),
        };
        run(&opts, io::sink()).unwrap();
        assert_eq!("2\n", std::fs::read_to_string(&override_path).unwrap());
    }

    #[test]
    fn invalid_step_fails_before_query() {
        let dir = tempfile::tempdir().unwrap();
        let recipe = write_recipe(
            dir.path(),
            r#"{
                "query": {"sql": "SELECT 1"},
                "steps": [{"kind": "bucket_numeric", "column": "a", "output": "b", "boundaries": [1], "labels": []}]
            }"#,
        );
        // Database doesn't exist, so reaching the query would be a different error.
        let opts = RunOptions {
            database: dir.path().join("missing.db"),
            recipe,
            ..Default::default()
        };
        let err = run(&opts, io::sink()).unwrap_err();
        match err {
            RecipeError::Pipeline(err) => assert_eq!(1, err.position),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_param() {
        let dir = tempfile::tempdir().unwrap();
        let database = setup_db(dir.path());
        let recipe = write_recipe(
            dir.path(),
            r#"{"query": {"sql": "SELECT * FROM smr01 WHERE HBRES = :hb"}}"#,
        );
        let opts = RunOptions {
            database,
            recipe,
            ..Default::default()
        };
        let err = run(&opts, io::sink()).unwrap_err();
        assert!(err.to_string().contains("hb"), "err: {err}");
    }
}
