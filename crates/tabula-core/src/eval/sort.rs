//! Row ordering for sort groups.

use std::cmp::Ordering;

use super::{Evaluator, RowSource};
use crate::filter::{SortDirection, SortExp};

impl Evaluator<'_> {
    /// Compare two rows under `sort`.
    ///
    /// Each entry resolves its reference on both rows and compares the
    /// results by [`Value::natural_cmp`](super::Value::natural_cmp), absent
    /// values first. Later entries only break ties left by earlier ones.
    pub fn compare(&self, sort: &[SortExp], a: &dyn RowSource, b: &dyn RowSource) -> Ordering {
        for exp in sort {
            let left = self.eval_ref(&exp.left, a).unwrap_or_default();
            let right = self.eval_ref(&exp.left, b).unwrap_or_default();
            let ord = match exp.direction {
                SortDirection::Asc => left.natural_cmp(&right),
                SortDirection::Desc => right.natural_cmp(&left),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// Sort `rows` in place. The sort is stable.
    pub fn sort_rows<R: RowSource>(&self, sort: &[SortExp], rows: &mut [R]) {
        rows.sort_by(|a, b| self.compare(sort, a, b));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{Row, Value};
    use crate::filter::Reference;
    use crate::typesystem::Typesystem;

    fn ids(rows: &[Row]) -> Vec<f64> {
        rows.iter()
            .map(|r| r.get("id").and_then(Value::as_number).unwrap_or(-1.0))
            .collect()
    }

    #[test]
    fn test_sort_numbers() {
        let ts = Typesystem::new();
        let eval = Evaluator::new(&ts);
        let mut rows = vec![
            Row::new().with("id", 1).with("n", 3),
            Row::new().with("id", 2).with("n", 1),
            Row::new().with("id", 3).with("n", 2),
        ];
        eval.sort_rows(&[SortExp::asc(Reference::var("n"))], &mut rows);
        assert_eq!(ids(&rows), vec![2.0, 3.0, 1.0]);

        eval.sort_rows(&[SortExp::desc(Reference::var("n"))], &mut rows);
        assert_eq!(ids(&rows), vec![1.0, 3.0, 2.0]);
    }

    #[test]
    fn test_absent_sorts_first() {
        let ts = Typesystem::new();
        let eval = Evaluator::new(&ts);
        let mut rows = vec![
            Row::new().with("id", 1).with("name", "b"),
            Row::new().with("id", 2),
            Row::new().with("id", 3).with("name", "a"),
        ];
        eval.sort_rows(&[SortExp::asc(Reference::var("name"))], &mut rows);
        assert_eq!(ids(&rows), vec![2.0, 3.0, 1.0]);
    }

    #[test]
    fn test_tie_breakers_and_stability() {
        let ts = Typesystem::new();
        let eval = Evaluator::new(&ts);
        let mut rows = vec![
            Row::new().with("id", 1).with("done", true).with("due", 5),
            Row::new().with("id", 2).with("done", false).with("due", 9),
            Row::new().with("id", 3).with("done", true).with("due", 1),
            Row::new().with("id", 4).with("done", false).with("due", 9),
        ];
        let sort = vec![
            SortExp::asc(Reference::var("done")),
            SortExp::desc(Reference::var("due")),
        ];
        eval.sort_rows(&sort, &mut rows);
        assert_eq!(ids(&rows), vec![2.0, 4.0, 1.0, 3.0]);
    }

    #[test]
    fn test_empty_sort_keeps_order() {
        let ts = Typesystem::new();
        let eval = Evaluator::new(&ts);
        let a = Row::new().with("id", 1);
        let b = Row::new().with("id", 2);
        assert_eq!(eval.compare(&[], &a, &b), Ordering::Equal);
    }
}
