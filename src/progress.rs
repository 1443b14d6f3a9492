//! Console progress reporting for long simulation runs. A pure renderer; the
//! simulator samples it from a ticker thread.

use std::time::Duration;

pub struct ProgressBar {
    total: u64,
    width: usize,
}

impl ProgressBar {
    pub fn new(total: u64) -> Self {
        Self { total, width: 40 }
    }

    pub fn render(&self, completed: u64, elapsed: Duration) -> String {
        let fraction = if self.total == 0 {
            1.0
        } else {
            completed as f64 / self.total as f64
        };
        let filled = (fraction * self.width as f64).round() as usize;
        let filled = filled.min(self.width);
        let mut bar = String::with_capacity(self.width);
        for _ in 0..filled {
            bar.push('█');
        }
        for _ in filled..self.width {
            bar.push('░');
        }
        let per_draw = if completed == 0 {
            0.0
        } else {
            elapsed.as_secs_f64() / completed as f64
        };
        format!(
            "[{bar}] {completed}/{total} ({per_draw:.3}s/draw)",
            total = self.total
        )
    }
}
