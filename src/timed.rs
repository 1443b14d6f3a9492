//! Timing of computations.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
pub struct Timed<V> {
    pub value: V,
    pub elapsed: Duration,
}

impl<V> Timed<V> {
    pub fn run(f: impl FnOnce() -> V) -> Timed<V> {
        let start_time = Instant::now();
        let value = f();
        Timed {
            value,
            elapsed: start_time.elapsed(),
        }
    }

    pub fn result<E>(f: impl FnOnce() -> Result<V, E>) -> Result<Timed<V>, E> {
        let start_time = Instant::now();
        f().map(|value| Timed {
            value,
            elapsed: start_time.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_value_and_elapsed() {
        let timed = Timed::run(|| 42);
        assert_eq!(42, timed.value);
        assert!(timed.elapsed <= Duration::from_secs(1));
    }

    #[test]
    fn propagates_errors() {
        let result: Result<Timed<()>, &str> = Timed::result(|| Err("boom"));
        assert_eq!(Err("boom"), result);
    }
}
