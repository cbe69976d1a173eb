/// One line awaiting translation: its slot in the output buffer plus the
/// payload and disambiguating context extracted from the record.
#[derive(Clone, Debug)]
pub struct PendingLine {
    pub index: usize,
    pub text: String,
    pub context: String,
}

/// Partition pending lines into contiguous batches of at most `batch_size`,
/// keeping the original file order inside each batch so line indices map back
/// to their source records. Batch size is validated at configuration time.
pub fn plan_batches(pending: Vec<PendingLine>, batch_size: usize) -> Vec<Vec<PendingLine>> {
    debug_assert!(batch_size > 0);
    pending
        .chunks(batch_size.max(1))
        .map(|chunk| chunk.to_vec())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(n: usize) -> Vec<PendingLine> {
        (0..n)
            .map(|i| PendingLine {
                index: i,
                text: format!("text {i}"),
                context: String::new(),
            })
            .collect()
    }

    #[test]
    fn empty_input_plans_no_batches() {
        assert!(plan_batches(Vec::new(), 50).is_empty());
    }

    #[test]
    fn splits_with_remainder() {
        let batches = plan_batches(pending(12), 5);
        let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![5, 5, 2]);
    }

    #[test]
    fn exact_multiple_has_no_tail() {
        let batches = plan_batches(pending(10), 5);
        assert_eq!(batches.len(), 2);
    }

    #[test]
    fn order_is_preserved_within_batches() {
        let batches = plan_batches(pending(7), 3);
        let flat: Vec<usize> = batches.iter().flatten().map(|p| p.index).collect();
        assert_eq!(flat, (0..7).collect::<Vec<_>>());
    }
}
