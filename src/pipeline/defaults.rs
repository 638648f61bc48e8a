use crate::alignment::levenshtein::align;
use crate::pipeline::traits::SequenceAligner;
use crate::types::{EditOperation, Symbol};

pub struct LevenshteinAligner;

impl SequenceAligner for LevenshteinAligner {
    fn edit_script(&self, reference: &[Symbol], hypothesis: &[Symbol]) -> Vec<EditOperation> {
        align(reference, hypothesis)
    }
}
