use crate::error::AssessmentError;
use crate::types::EditOperation;

/// Unit-cost edit distance table, `(m + 1) x (n + 1)` stored row-major.
struct CostTable {
    cols: usize,
    cells: Vec<usize>,
}

impl CostTable {
    fn build<S: PartialEq>(reference: &[S], hypothesis: &[S]) -> Self {
        let m = reference.len();
        let n = hypothesis.len();
        let cols = n + 1;
        let mut cells = vec![0usize; (m + 1) * cols];

        for i in 0..=m {
            cells[i * cols] = i;
        }
        for (j, cell) in cells.iter_mut().enumerate().take(cols) {
            *cell = j;
        }

        for i in 1..=m {
            let row = i * cols;
            let prev_row = (i - 1) * cols;
            for j in 1..=n {
                let sub_cost = usize::from(reference[i - 1] != hypothesis[j - 1]);
                let diagonal = cells[prev_row + j - 1] + sub_cost;
                let up = cells[prev_row + j] + 1;
                let left = cells[row + j - 1] + 1;
                cells[row + j] = diagonal.min(up).min(left);
            }
        }

        Self { cols, cells }
    }

    #[inline(always)]
    fn at(&self, i: usize, j: usize) -> usize {
        self.cells[i * self.cols + j]
    }

    fn corner(&self) -> usize {
        self.cells.last().copied().unwrap_or(0)
    }
}

/// One step of the optimal path, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Match { ref_index: usize, hyp_index: usize },
    Edit(EditOperation),
}

/// Walks the table from `(m, n)` back to the origin.
///
/// Tie-break order at every cell is fixed: diagonal (match or substitution)
/// first, then insertion, then deletion. Downstream confidence lookups rely on
/// exactly this order when several paths have the same cost.
fn backtrace<S: PartialEq>(table: &CostTable, reference: &[S], hypothesis: &[S]) -> Vec<Step> {
    let mut i = reference.len();
    let mut j = hypothesis.len();
    let mut steps = Vec::with_capacity(i.max(j));

    while i > 0 || j > 0 {
        let cost = table.at(i, j);

        if i > 0 && j > 0 {
            let sub_cost = usize::from(reference[i - 1] != hypothesis[j - 1]);
            if cost == table.at(i - 1, j - 1) + sub_cost {
                let (ref_index, hyp_index) = (i - 1, j - 1);
                steps.push(if sub_cost == 1 {
                    Step::Edit(EditOperation::Substitute {
                        ref_index,
                        hyp_index,
                    })
                } else {
                    Step::Match {
                        ref_index,
                        hyp_index,
                    }
                });
                i -= 1;
                j -= 1;
                continue;
            }
        }

        if j > 0 && cost == table.at(i, j - 1) + 1 {
            steps.push(Step::Edit(EditOperation::Insert {
                ref_cursor: i,
                hyp_index: j - 1,
            }));
            j -= 1;
            continue;
        }

        debug_assert!(i > 0 && cost == table.at(i - 1, j) + 1);
        steps.push(Step::Edit(EditOperation::Delete {
            ref_index: i - 1,
            hyp_cursor: j,
        }));
        i -= 1;
    }

    steps.reverse();
    steps
}

/// Minimum edit script turning `reference` into `hypothesis`, in left-to-right
/// order. Exact matches emit nothing.
pub fn align<S: PartialEq>(reference: &[S], hypothesis: &[S]) -> Vec<EditOperation> {
    let table = CostTable::build(reference, hypothesis);
    backtrace(&table, reference, hypothesis)
        .into_iter()
        .filter_map(|step| match step {
            Step::Edit(op) => Some(op),
            Step::Match { .. } => None,
        })
        .collect()
}

pub fn edit_distance<S: PartialEq>(reference: &[S], hypothesis: &[S]) -> usize {
    CostTable::build(reference, hypothesis).corner()
}

/// Both sequences laid out along the optimal path, `None` marking a gap.
/// The two vectors always have the same length.
pub fn align_sequences<'a, S: PartialEq>(
    reference: &'a [S],
    hypothesis: &'a [S],
) -> (Vec<Option<&'a S>>, Vec<Option<&'a S>>) {
    let table = CostTable::build(reference, hypothesis);
    let steps = backtrace(&table, reference, hypothesis);

    let mut ref_row = Vec::with_capacity(steps.len());
    let mut hyp_row = Vec::with_capacity(steps.len());
    for step in steps {
        let (r, h) = match step {
            Step::Match {
                ref_index,
                hyp_index,
            }
            | Step::Edit(EditOperation::Substitute {
                ref_index,
                hyp_index,
            }) => (Some(&reference[ref_index]), Some(&hypothesis[hyp_index])),
            Step::Edit(EditOperation::Delete { ref_index, .. }) => {
                (Some(&reference[ref_index]), None)
            }
            Step::Edit(EditOperation::Insert { hyp_index, .. }) => {
                (None, Some(&hypothesis[hyp_index]))
            }
        };
        ref_row.push(r);
        hyp_row.push(h);
    }
    (ref_row, hyp_row)
}

/// Replays an edit script against `reference`, taking inserted and substituted
/// symbols from `hypothesis`. Reference symbols between operations are copied
/// through unchanged.
pub fn apply_edit_script<S: Clone>(
    reference: &[S],
    hypothesis: &[S],
    operations: &[EditOperation],
) -> Result<Vec<S>, AssessmentError> {
    let mut out = Vec::with_capacity(hypothesis.len());
    let mut cursor = 0usize;

    let copy_until = |out: &mut Vec<S>, cursor: usize, until: usize| {
        reference
            .get(cursor..until)
            .map(|run| out.extend_from_slice(run))
            .ok_or_else(|| {
                AssessmentError::invalid_input(format!(
                    "edit script out of order: reference cursor {cursor} cannot advance to {until}"
                ))
            })
    };
    let hyp_symbol = |hyp_index: usize| {
        hypothesis.get(hyp_index).cloned().ok_or_else(|| {
            AssessmentError::invalid_input(format!(
                "edit script hypothesis index {hyp_index} out of range (len {})",
                hypothesis.len()
            ))
        })
    };

    for op in operations {
        match *op {
            EditOperation::Substitute {
                ref_index,
                hyp_index,
            } => {
                copy_until(&mut out, cursor, ref_index)?;
                if ref_index >= reference.len() {
                    return Err(AssessmentError::invalid_input(format!(
                        "edit script reference index {ref_index} out of range"
                    )));
                }
                out.push(hyp_symbol(hyp_index)?);
                cursor = ref_index + 1;
            }
            EditOperation::Delete { ref_index, .. } => {
                copy_until(&mut out, cursor, ref_index)?;
                if ref_index >= reference.len() {
                    return Err(AssessmentError::invalid_input(format!(
                        "edit script reference index {ref_index} out of range"
                    )));
                }
                cursor = ref_index + 1;
            }
            EditOperation::Insert {
                ref_cursor,
                hyp_index,
            } => {
                copy_until(&mut out, cursor, ref_cursor)?;
                out.push(hyp_symbol(hyp_index)?);
                cursor = ref_cursor;
            }
        }
    }
    copy_until(&mut out, cursor, reference.len())?;
    Ok(out)
}
