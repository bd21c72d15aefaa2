///
/// Row and result-set buffers.
///
/// A `Row` is the ordered cells of one output row; `Rows` collects the rows
/// of a script's final statement. `Rows` keeps its growth policy observable:
/// capacity grows 0 -> 10 and then doubles while rows are captured, and
/// `finish` trims the allocation to the exact row count once stepping
/// completes.
///

use crate::value::Value;

/// One result row. Length equals the statement's column count at the time
/// the row was produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<Value>,
}

impl Row {
    pub(crate) fn new(columns: Vec<Value>) -> Row {
        Row { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.columns.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.columns.iter()
    }
}

impl std::ops::Index<usize> for Row {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.columns[index]
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

/// The captured output of a script's final statement.
///
/// Row count is monotonically non-decreasing while the executor populates
/// the buffer and frozen after `finish`; after `finish`, `capacity() == len()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rows {
    rows: Vec<Row>,
}

impl Rows {
    pub(crate) fn new() -> Rows {
        Rows { rows: Vec::new() }
    }

    /// Append one captured row, growing capacity 0 -> 10, then doubling.
    /// `reserve_exact` keeps the policy observable through `capacity`.
    pub(crate) fn push(&mut self, row: Row) {
        if self.rows.len() == self.rows.capacity() {
            let grow = if self.rows.capacity() == 0 {
                10
            } else {
                self.rows.capacity()
            };
            self.rows.reserve_exact(grow);
        }
        self.rows.push(row);
    }

    /// Trim the backing allocation to exactly the collected row count.
    pub(crate) fn finish(&mut self) {
        self.rows.shrink_to_fit();
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Backing allocation size in rows. Exposed so the growth and trim
    /// policy stays testable.
    pub fn capacity(&self) -> usize {
        self.rows.capacity()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }
}

impl std::ops::Index<usize> for Rows {
    type Output = Row;

    fn index(&self, index: usize) -> &Row {
        &self.rows[index]
    }
}

impl<'a> IntoIterator for &'a Rows {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_cell(v: i64) -> Row {
        Row::new(vec![Value::Integer(v)])
    }

    #[test]
    fn test_capacity_starts_at_ten_then_doubles() {
        let mut rows = Rows::new();
        assert_eq!(rows.capacity(), 0);

        rows.push(one_cell(0));
        assert_eq!(rows.capacity(), 10);

        for i in 1..10 {
            rows.push(one_cell(i));
        }
        assert_eq!(rows.len(), 10);
        assert_eq!(rows.capacity(), 10);

        rows.push(one_cell(10));
        assert_eq!(rows.capacity(), 20);

        for i in 11..20 {
            rows.push(one_cell(i));
        }
        rows.push(one_cell(20));
        assert_eq!(rows.capacity(), 40);
    }

    #[test]
    fn test_finish_trims_to_exact_length() {
        let mut rows = Rows::new();
        for i in 0..13 {
            rows.push(one_cell(i));
        }
        assert_eq!(rows.len(), 13);
        assert_eq!(rows.capacity(), 20);

        rows.finish();
        assert_eq!(rows.len(), 13);
        assert_eq!(rows.capacity(), 13);
    }

    #[test]
    fn test_finish_on_empty_buffer() {
        let mut rows = Rows::new();
        rows.finish();
        assert!(rows.is_empty());
        assert_eq!(rows.capacity(), 0);
    }

    #[test]
    fn test_row_accessors() {
        let row = Row::new(vec![Value::Integer(1), Value::from("x")]);
        assert_eq!(row.len(), 2);
        assert!(!row.is_empty());
        assert_eq!(row.get(0), Some(&Value::Integer(1)));
        assert_eq!(row.get(2), None);
        assert_eq!(row[1], Value::Text("x".to_string()));

        let tags: Vec<_> = row.iter().map(|v| v.tag()).collect();
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn test_rows_accessors() {
        let mut rows = Rows::new();
        rows.push(one_cell(1));
        rows.push(one_cell(2));
        rows.finish();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows.get(0).map(|r| r.len()), Some(1));
        assert_eq!(rows.get(5), None);
        assert_eq!(rows[1][0], Value::Integer(2));

        let collected: Vec<_> = rows.iter().collect();
        assert_eq!(collected.len(), 2);
    }
}
