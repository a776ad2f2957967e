use chrono::NaiveDate;

use crate::FrameError;

/// Row labels of a [`Frame`].
#[derive(Debug, Clone, PartialEq)]
pub enum Index {
    /// Plain row positions `0..n`.
    Positional(usize),
    /// Trading dates, one per row.
    Dates(Vec<NaiveDate>),
    /// Arbitrary text labels, one per row.
    Labels(Vec<String>),
}

impl Index {
    pub fn len(&self) -> usize {
        match self {
            Index::Positional(n) => *n,
            Index::Dates(d) => d.len(),
            Index::Labels(l) => l.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text form of each label; `None` for a positional index.
    pub fn labels(&self) -> Option<Vec<String>> {
        match self {
            Index::Positional(_) => None,
            Index::Dates(d) => Some(d.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect()),
            Index::Labels(l) => Some(l.clone()),
        }
    }
}

/// A named series of values aligned with the frame index.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

/// Index plus named numeric columns, all of the index length.
///
/// Missing values are stored as `NaN`. Columns keep their insertion order,
/// which is what "first column" refers to.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    index: Index,
    columns: Vec<Column>,
}

impl Frame {
    pub fn new(index: Index) -> Self {
        Frame {
            index,
            columns: Vec::new(),
        }
    }

    /// Build a frame from `(name, values)` pairs.
    pub fn from_columns<S: Into<String>>(
        index: Index,
        columns: Vec<(S, Vec<f64>)>,
    ) -> Result<Self, FrameError> {
        let mut frame = Frame::new(index);
        for (name, values) in columns {
            frame.insert_column(name, values)?;
        }
        Ok(frame)
    }

    /// Builder form of [`Frame::insert_column`].
    pub fn with_column<S: Into<String>>(
        mut self,
        name: S,
        values: Vec<f64>,
    ) -> Result<Self, FrameError> {
        self.insert_column(name, values)?;
        Ok(self)
    }

    /// Add a column, replacing an existing one with the same name in place.
    pub fn insert_column<S: Into<String>>(
        &mut self,
        name: S,
        values: Vec<f64>,
    ) -> Result<(), FrameError> {
        let name = name.into();
        if values.len() != self.index.len() {
            return Err(FrameError::LengthMismatch {
                name,
                expected: self.index.len(),
                actual: values.len(),
            });
        }

        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.values = values,
            None => self.columns.push(Column { name, values }),
        }
        Ok(())
    }

    pub fn column(&self, name: &str) -> Result<&[f64], FrameError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| FrameError::ColumnNotFound(name.to_string()))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn first_column(&self) -> Result<&Column, FrameError> {
        self.columns.first().ok_or(FrameError::NoColumns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Frame {
        Frame::from_columns(
            Index::Positional(3),
            vec![("a", vec![1.0, 2.0, 3.0]), ("b", vec![4.0, 5.0, 6.0])],
        )
        .unwrap()
    }

    #[test]
    fn test_column_lookup() {
        let frame = sample();
        assert_eq!(frame.column("b").unwrap(), &[4.0, 5.0, 6.0]);
        assert!(frame.has_column("a"));
        assert!(matches!(frame.column("zz"), Err(FrameError::ColumnNotFound(n)) if n == "zz"));
    }

    #[test]
    fn test_first_column_follows_insertion_order() {
        let frame = sample();
        assert_eq!(frame.first_column().unwrap().name, "a");
        assert_eq!(frame.column_names(), vec!["a", "b"]);

        let empty = Frame::new(Index::Positional(3));
        assert!(matches!(empty.first_column(), Err(FrameError::NoColumns)));
    }

    #[test]
    fn test_insert_replaces_and_checks_length() {
        let mut frame = sample();
        frame.insert_column("a", vec![7.0, 8.0, 9.0]).unwrap();
        assert_eq!(frame.columns().len(), 2);
        assert_eq!(frame.column("a").unwrap()[0], 7.0);

        let err = frame.insert_column("c", vec![1.0]).unwrap_err();
        assert!(matches!(err, FrameError::LengthMismatch { expected: 3, actual: 1, .. }));
    }

    #[test]
    fn test_date_labels() {
        let d = NaiveDate::from_ymd_opt(2023, 1, 3).unwrap();
        let index = Index::Dates(vec![d]);
        assert_eq!(index.labels().unwrap(), vec!["2023-01-03".to_string()]);
        assert_eq!(Index::Positional(4).labels(), None);
    }
}
