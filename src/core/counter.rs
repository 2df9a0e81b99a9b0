use std::sync::atomic::{AtomicU64, Ordering};

/// Cumulative number of simulated windows. Owned by the caller and shared by
/// reference; it only ever grows.
#[derive(Debug, Default)]
pub struct RunCounter {
    ran: AtomicU64,
}

impl RunCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, windows: usize) {
        self.ran.fetch_add(windows as u64, Ordering::Relaxed);
    }

    pub fn simulations_ran(&self) -> u64 {
        self.ran.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn accumulates_across_threads() {
        let counter = Arc::new(RunCounter::new());
        let handles = (0..4)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    for _ in 0..100 {
                        counter.add(12);
                    }
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().expect("worker panicked");
        }
        assert_eq!(counter.simulations_ran(), 4 * 100 * 12);
    }
}
