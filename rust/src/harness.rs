use clap::ValueEnum;
use std::hint::black_box;
use std::time::Instant;

use crate::codec::CodecConfig;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Profile {
    #[default]
    Quick,
    Full,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Quick => "quick",
            Profile::Full => "full",
        }
    }
}

/// Encodings at least this large run with scaled-down iteration counts.
pub const LARGE_PAYLOAD_BYTES: usize = 1 << 20;
const LARGE_PAYLOAD_DIVISOR: u64 = 100;

#[derive(Clone, Debug, Default)]
pub struct BenchConfig {
    pub profile: Profile,
    pub codec: CodecConfig,
}

impl BenchConfig {
    pub fn warmup_iters(&self) -> u64 {
        match self.profile {
            Profile::Quick => 32,
            Profile::Full => 200,
        }
    }

    pub fn iters(&self) -> u64 {
        match self.profile {
            Profile::Quick => 300,
            Profile::Full => 3_000,
        }
    }

    /// (iters, warmup) for a shape whose encoding is `encoded_bytes` long.
    pub fn iters_for(&self, encoded_bytes: usize) -> (u64, u64) {
        if encoded_bytes >= LARGE_PAYLOAD_BYTES {
            (
                (self.iters() / LARGE_PAYLOAD_DIVISOR).max(3),
                (self.warmup_iters() / LARGE_PAYLOAD_DIVISOR).max(1),
            )
        } else {
            (self.iters(), self.warmup_iters())
        }
    }
}

#[derive(Clone, Debug)]
pub struct Measured {
    pub iters: u64,
    pub warmup_iters: u64,
    pub total_ns: u128,
    pub ns_per_iter: f64,
}

impl Measured {
    fn new(iters: u64, warmup_iters: u64, total_ns: u128) -> Self {
        let denom = iters.max(1) as f64;
        Self {
            iters,
            warmup_iters,
            total_ns,
            ns_per_iter: (total_ns as f64) / denom,
        }
    }
}

pub fn measure_fn<T>(iters: u64, warmup_iters: u64, mut f: impl FnMut() -> T) -> Measured {
    for _ in 0..warmup_iters {
        black_box(f());
    }

    let start = Instant::now();
    for _ in 0..iters {
        black_box(f());
    }
    let elapsed = start.elapsed();

    Measured::new(iters, warmup_iters, elapsed.as_nanos())
}

/// Like [`measure_fn`], but runs an untimed `setup` on `state` before every
/// timed `routine` call. Only the routine contributes to `total_ns`.
pub fn measure_batched<S, T>(
    iters: u64,
    warmup_iters: u64,
    state: &mut S,
    mut setup: impl FnMut(&mut S),
    mut routine: impl FnMut(&mut S) -> T,
) -> Measured {
    for _ in 0..warmup_iters {
        setup(state);
        black_box(routine(state));
    }

    let mut total_ns: u128 = 0;
    for _ in 0..iters {
        setup(state);
        let start = Instant::now();
        let out = routine(state);
        total_ns += start.elapsed().as_nanos();
        black_box(out);
    }

    Measured::new(iters, warmup_iters, total_ns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_iterations() {
        let mut calls = 0u64;
        let m = measure_fn(10, 3, || {
            calls += 1;
            calls
        });
        assert_eq!(calls, 13);
        assert_eq!(m.iters, 10);
        assert_eq!(m.warmup_iters, 3);
    }

    #[test]
    fn batched_runs_setup_before_each_routine() {
        let mut state = (0u32, 0u32);
        let m = measure_batched(
            5,
            2,
            &mut state,
            |s| s.0 += 1,
            |s| {
                s.1 += 1;
                assert_eq!(s.0, s.1);
            },
        );
        assert_eq!(state, (7, 7));
        assert!(m.ns_per_iter >= 0.0);
    }

    #[test]
    fn large_payloads_scale_down() {
        let cfg = BenchConfig::default();
        assert_eq!(cfg.iters_for(10), (300, 32));
        assert_eq!(cfg.iters_for(LARGE_PAYLOAD_BYTES), (3, 1));

        let full = BenchConfig {
            profile: Profile::Full,
            ..Default::default()
        };
        assert_eq!(full.iters_for(LARGE_PAYLOAD_BYTES * 10), (30, 2));
    }
}
