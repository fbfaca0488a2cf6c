use std::collections::HashMap;

use thiserror::Error;

/// One cell of the in-memory table.
///
/// `Missing` is the single designated missing-value marker; score functions
/// return it instead of raising, and arithmetic never sees an implicit NaN.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    Text(String),
    Number(f64),
    #[default]
    Missing,
}

impl Value {
    /// Parse a raw CSV field: blank cells become `Missing`, everything else
    /// is kept verbatim as text. Numeric interpretation happens on demand.
    pub fn from_csv_field(raw: &str) -> Value {
        if raw.trim().is_empty() {
            Value::Missing
        } else {
            Value::Text(raw.to_string())
        }
    }

    pub fn text(value: impl Into<String>) -> Value {
        Value::Text(value.into())
    }

    pub fn number(value: f64) -> Value {
        Value::Number(value)
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Numeric view: `Number` directly, `Text` via parse, `Missing` never.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => s.trim().parse::<f64>().ok(),
            Value::Missing => None,
        }
    }

    /// Present values rendered for text assembly (profile descriptions,
    /// address strings); `Missing` yields `None`.
    pub fn to_display(&self) -> Option<String> {
        match self {
            Value::Text(s) => Some(s.clone()),
            Value::Number(n) => Some(format_number(*n)),
            Value::Missing => None,
        }
    }

    /// Key used when grouping and sorting rows by cell content. Missing
    /// values are distinguishable and order after any present value.
    pub fn sort_key(&self) -> (bool, String) {
        match self.to_display() {
            Some(text) => (false, text),
            None => (true, String::new()),
        }
    }

    fn render_csv(&self) -> String {
        self.to_display().unwrap_or_default()
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),
    #[error("unknown column: {0}")]
    UnknownColumn(String),
    #[error("row has {got} values, table has {expected} columns")]
    RowArity { expected: usize, got: usize },
    #[error("column {column} has {got} values, table has {expected} rows")]
    ColumnLength {
        column: String,
        expected: usize,
        got: usize,
    },
}

/// In-memory tabular dataset: ordered headers, verbatim-name lookup, rows.
///
/// The cleaning stages consume and return the same structure; nothing is
/// persisted here.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Result<Self, TableError> {
        let mut index = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(TableError::DuplicateColumn(name.clone()));
            }
        }
        Ok(Self {
            columns,
            index,
            rows: Vec::new(),
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn require_column(&self, name: &str) -> Result<usize, TableError> {
        self.column_index(name)
            .ok_or_else(|| TableError::UnknownColumn(name.to_string()))
    }

    pub fn push_row(&mut self, values: Vec<Value>) -> Result<(), TableError> {
        if values.len() != self.columns.len() {
            return Err(TableError::RowArity {
                expected: self.columns.len(),
                got: values.len(),
            });
        }
        self.rows.push(Row::new(values));
        Ok(())
    }

    /// Cell lookup by verbatim column name. Absent columns read as `Missing`
    /// so the score functions can degrade instead of aborting the batch.
    pub fn value(&self, row: usize, column: &str) -> &Value {
        match self.column_index(column) {
            Some(col) => &self.rows[row].values[col],
            None => &Value::Missing,
        }
    }

    pub fn set(&mut self, row: usize, column: &str, value: Value) -> Result<(), TableError> {
        let col = self.require_column(column)?;
        self.rows[row].values[col] = value;
        Ok(())
    }

    /// Rewrite every header through `f`, rebuilding the lookup index.
    pub fn rename_columns(
        &mut self,
        mut f: impl FnMut(&str) -> String,
    ) -> Result<(), TableError> {
        let renamed: Vec<String> = self.columns.iter().map(|c| f(c)).collect();
        let mut index = HashMap::with_capacity(renamed.len());
        for (i, name) in renamed.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(TableError::DuplicateColumn(name.clone()));
            }
        }
        self.columns = renamed;
        self.index = index;
        Ok(())
    }

    /// Append a derived column; `values` must be row-parallel.
    pub fn add_column(&mut self, name: &str, values: Vec<Value>) -> Result<(), TableError> {
        if values.len() != self.rows.len() {
            return Err(TableError::ColumnLength {
                column: name.to_string(),
                expected: self.rows.len(),
                got: values.len(),
            });
        }
        if self.index.contains_key(name) {
            return Err(TableError::DuplicateColumn(name.to_string()));
        }
        self.index.insert(name.to_string(), self.columns.len());
        self.columns.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.values.push(value);
        }
        Ok(())
    }

    /// Keep only rows whose index satisfies the predicate.
    pub fn retain_rows(&mut self, mut keep: impl FnMut(usize) -> bool) {
        let mut i = 0;
        self.rows.retain(|_| {
            let keep_row = keep(i);
            i += 1;
            keep_row
        });
    }

    /// Keep only the listed columns, in their current table order. Names not
    /// present in the table are ignored.
    pub fn retain_columns(&mut self, keep: &[&str]) {
        let kept: Vec<usize> = (0..self.columns.len())
            .filter(|&i| keep.contains(&self.columns[i].as_str()))
            .collect();
        self.columns = kept.iter().map(|&i| self.columns[i].clone()).collect();
        for row in &mut self.rows {
            row.values = kept.iter().map(|&i| row.values[i].clone()).collect();
        }
        self.index = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
    }

    /// Group row indices by the content of `column`, preserving the order in
    /// which keys are first encountered. Rows with a missing key are skipped,
    /// mirroring how the source data treats records without an identifier.
    pub fn group_rows_by(&self, column: &str) -> Result<Vec<(String, Vec<usize>)>, TableError> {
        let col = self.require_column(column)?;
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, row) in self.rows.iter().enumerate() {
            let Some(key) = row.values[col].to_display() else {
                continue;
            };
            groups
                .entry(key.clone())
                .or_insert_with(|| {
                    order.push(key.clone());
                    Vec::new()
                })
                .push(i);
        }
        Ok(order
            .into_iter()
            .map(|key| {
                let rows = groups.remove(&key).unwrap_or_default();
                (key, rows)
            })
            .collect())
    }

    /// Render the table as CSV records (headers first), for the batch binary.
    pub fn to_csv_records(&self) -> Vec<Vec<String>> {
        let mut records = Vec::with_capacity(self.rows.len() + 1);
        records.push(self.columns.clone());
        for row in &self.rows {
            records.push(row.values.iter().map(Value::render_csv).collect());
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        let mut table = Table::new(vec!["ID".into(), "Sector".into()]).unwrap();
        table
            .push_row(vec![Value::text("a"), Value::text("IT")])
            .unwrap();
        table
            .push_row(vec![Value::text("b"), Value::Missing])
            .unwrap();
        table
            .push_row(vec![Value::text("a"), Value::text("Finance")])
            .unwrap();
        table
    }

    #[test]
    fn blank_csv_fields_become_missing() {
        assert_eq!(Value::from_csv_field("   "), Value::Missing);
        assert_eq!(Value::from_csv_field("x "), Value::text("x "));
    }

    #[test]
    fn numeric_text_parses_on_demand() {
        assert_eq!(Value::text(" 42 ").as_number(), Some(42.0));
        assert_eq!(Value::text("n/a").as_number(), None);
        assert_eq!(Value::number(1.5).as_number(), Some(1.5));
        assert_eq!(Value::Missing.as_number(), None);
    }

    #[test]
    fn missing_sorts_after_present_values() {
        assert!(Value::text("z").sort_key() < Value::Missing.sort_key());
    }

    #[test]
    fn duplicate_columns_are_rejected() {
        let err = Table::new(vec!["ID".into(), "ID".into()]).unwrap_err();
        assert_eq!(err, TableError::DuplicateColumn("ID".into()));
    }

    #[test]
    fn absent_column_reads_as_missing() {
        let table = sample_table();
        assert!(table.value(0, "No Such Column").is_missing());
    }

    #[test]
    fn group_rows_preserves_first_encounter_order() {
        let table = sample_table();
        let groups = table.group_rows_by("ID").unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], ("a".to_string(), vec![0, 2]));
        assert_eq!(groups[1], ("b".to_string(), vec![1]));
    }

    #[test]
    fn group_rows_skips_missing_keys() {
        let mut table = sample_table();
        table.push_row(vec![Value::Missing, Value::text("IT")]).unwrap();
        let groups = table.group_rows_by("ID").unwrap();
        assert_eq!(groups.iter().map(|(_, r)| r.len()).sum::<usize>(), 3);
    }

    #[test]
    fn add_column_requires_row_parallel_values() {
        let mut table = sample_table();
        let err = table.add_column("score", vec![Value::number(1.0)]).unwrap_err();
        assert!(matches!(err, TableError::ColumnLength { .. }));

        table
            .add_column(
                "score",
                vec![Value::number(1.0), Value::Missing, Value::number(0.5)],
            )
            .unwrap();
        assert_eq!(table.value(2, "score").as_number(), Some(0.5));
    }

    #[test]
    fn retain_columns_drops_everything_else() {
        let mut table = sample_table();
        table.retain_columns(&["Sector", "not there"]);
        assert_eq!(table.columns(), ["Sector".to_string()]);
        assert_eq!(table.value(0, "Sector").as_text(), Some("IT"));
        assert!(table.value(0, "ID").is_missing());
    }
}
