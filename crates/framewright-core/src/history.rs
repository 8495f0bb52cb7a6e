//! Linear undo/redo over whole snapshots.
//!
//! `set` overwrites the current snapshot (live edits while dragging);
//! `push` truncates the redo tail, appends and advances (committed edits).

/// Snapshot list plus the index of the current one.
#[derive(Debug, Clone)]
pub struct History<T> {
    snapshots: Vec<T>,
    index: usize,
}

impl<T> History<T> {
    /// A history whose only snapshot is `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            snapshots: vec![initial],
            index: 0,
        }
    }

    pub fn current(&self) -> &T {
        &self.snapshots[self.index]
    }

    /// Replace the current snapshot without recording a step.
    pub fn set(&mut self, value: T) {
        self.snapshots[self.index] = value;
    }

    /// Record a new step, discarding anything that could have been redone.
    pub fn push(&mut self, value: T) {
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(value);
        self.index += 1;
    }

    /// Step back. Returns false at the oldest snapshot.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.index -= 1;
        true
    }

    /// Step forward. Returns false at the newest snapshot.
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.index += 1;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    /// Number of stored snapshots (committed steps + 1).
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl<T: Default> Default for History<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Push(u32),
        Set(u32),
        Undo,
        Redo,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            any::<u32>().prop_map(Op::Push),
            any::<u32>().prop_map(Op::Set),
            Just(Op::Undo),
            Just(Op::Redo),
        ]
    }

    proptest! {
        #[test]
        fn prop_undo_then_redo_restores(ops in proptest::collection::vec(op(), 0..40)) {
            let mut h = History::new(0u32);
            for op in ops {
                match op {
                    Op::Push(v) => h.push(v),
                    Op::Set(v) => h.set(v),
                    Op::Undo => { h.undo(); }
                    Op::Redo => { h.redo(); }
                }
                prop_assert!(h.index() < h.len());
            }
            let before = *h.current();
            if h.undo() {
                prop_assert!(h.redo());
            }
            prop_assert_eq!(*h.current(), before);
        }

        #[test]
        fn prop_push_clears_redo(values in proptest::collection::vec(any::<u32>(), 1..20), back in 0usize..20) {
            let mut h = History::new(0u32);
            for v in &values {
                h.push(*v);
            }
            for _ in 0..back {
                h.undo();
            }
            h.push(7);
            prop_assert!(!h.can_redo());
            prop_assert_eq!(*h.current(), 7);
        }
    }
}
