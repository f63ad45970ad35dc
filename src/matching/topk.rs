/// A candidate index with its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scored {
    pub score: f64,
    pub index: usize,
}

/// Keeps the `capacity` lowest-scoring candidates seen so far, ascending.
///
/// Equal scores keep arrival order, so feeding candidates in catalog order
/// breaks ties by insertion order.
#[derive(Debug, Clone)]
pub struct BoundedTopK {
    capacity: usize,
    entries: Vec<Scored>,
}

impl BoundedTopK {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity + 1),
        }
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Score of the worst kept candidate, if any.
    pub fn worst(&self) -> Option<f64> {
        self.entries.last().map(|e| e.score)
    }

    /// Offer a candidate. Returns whether it was kept.
    pub fn offer(&mut self, score: f64, index: usize) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.is_full() && self.worst().is_some_and(|worst| score >= worst) {
            return false;
        }
        let pos = self.entries.partition_point(|e| e.score <= score);
        self.entries.insert(pos, Scored { score, index });
        if self.entries.len() > self.capacity {
            self.entries.pop();
        }
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_sorted_vec(self) -> Vec<Scored> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(top: BoundedTopK) -> Vec<usize> {
        top.into_sorted_vec().into_iter().map(|s| s.index).collect()
    }

    #[test]
    fn keeps_lowest_scores_in_order() {
        let mut top = BoundedTopK::new(3);
        for (i, score) in [5.0, 1.0, 4.0, 2.0, 3.0, 0.5].into_iter().enumerate() {
            top.offer(score, i);
        }
        assert_eq!(indices(top), vec![5, 1, 3]);
    }

    #[test]
    fn rejects_candidate_not_better_than_worst_when_full() {
        let mut top = BoundedTopK::new(2);
        assert!(top.offer(1.0, 0));
        assert!(top.offer(2.0, 1));
        assert!(!top.offer(2.0, 2), "ties with the worst are rejected");
        assert!(!top.offer(9.0, 3));
        assert!(top.offer(1.5, 4));
        assert_eq!(indices(top), vec![0, 4]);
    }

    #[test]
    fn ties_keep_arrival_order() {
        let mut top = BoundedTopK::new(5);
        for i in 0..4 {
            top.offer(1.0, i);
        }
        top.offer(0.5, 9);
        assert_eq!(indices(top), vec![9, 0, 1, 2, 3]);
    }

    #[test]
    fn fewer_candidates_than_capacity() {
        let mut top = BoundedTopK::new(5);
        top.offer(3.0, 0);
        top.offer(1.0, 1);
        assert!(!top.is_full());
        assert_eq!(top.len(), 2);
        assert_eq!(indices(top), vec![1, 0]);
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut top = BoundedTopK::new(0);
        assert!(!top.offer(1.0, 0));
        assert!(top.is_empty());
    }
}
