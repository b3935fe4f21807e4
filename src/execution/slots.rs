use parking_lot::Mutex;

/// A table of lazily created local values, one slot per worker of a pool.
///
/// A value is taken out of its slot while a task uses it, so no lock is held while the
/// task runs. A task that re-enters the table from the same worker, which happens when
/// it blocks on nested pool work, gets a fresh value instead of waiting on its own.
#[derive(Debug)]
pub struct PerWorker<L> {
    slots: Box<[Mutex<Vec<L>>]>,
}

impl<L> PerWorker<L> {
    /// Creates a new `PerWorker` table with `workers` empty slots.
    pub fn new(workers: usize) -> Self {
        let slots = (0..workers.max(1)).map(|_| Mutex::new(Vec::new())).collect();
        Self { slots }
    }

    /// Runs `f` over a value of worker `idx`'s slot, creating one with `init` if the slot
    /// has none to spare.
    pub fn with<R>(
        &self,
        idx: usize,
        init: impl FnOnce() -> L,
        f: impl FnOnce(&mut L) -> R,
    ) -> R {
        let slot = &self.slots[idx % self.slots.len()];

        let spare = slot.lock().pop();
        let mut local = spare.unwrap_or_else(init);
        let out = f(&mut local);

        slot.lock().push(local);
        out
    }

    /// Every value some worker created.
    pub fn into_values(self) -> Vec<L> {
        self.slots
            .into_vec()
            .into_iter()
            .flat_map(Mutex::into_inner)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_touched_slots_are_returned() {
        let table = PerWorker::new(4);
        table.with(1, || 10, |v| *v += 1);
        table.with(1, || 10, |v| *v += 1);
        table.with(6, || 0, |v| *v += 5);

        assert_eq!(table.into_values(), vec![12, 5]);
    }

    #[test]
    fn nested_use_gets_its_own_value() {
        let table = PerWorker::new(2);
        table.with(
            0,
            || 1,
            |outer| {
                table.with(0, || 10, |inner| *inner += 1);
                *outer += 1;
            },
        );
        table.with(0, || 100, |v| *v += 1);

        let mut values = table.into_values();
        values.sort();
        assert_eq!(values, vec![3, 11]);
    }
}
