//! Per-shape serialization benchmarks.
//!
//! Setup resolves the descriptor, builds the fixture and encodes it once to
//! produce the canned buffer read by `deserialize` and `both`. Buffer resets
//! (rewinding the read cursor, truncating re-encoded output) happen outside
//! the timed interval.

use clap::ValueEnum;
use std::hint::black_box;
use std::sync::Arc;
use tracing::{info, warn};

use crate::buffer::WireBuffer;
use crate::codec::{self, CodecConfig};
use crate::descriptor::Descriptor;
use crate::error::Result;
use crate::harness::{measure_batched, measure_fn, BenchConfig, Measured};
use crate::protocol::CompactProtocol;
use crate::registry::ShapeRegistry;
use crate::report::Measurement;
use crate::value::Instance;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Operation {
    /// Encode the fixture into a fresh buffer.
    Serialize,
    /// Decode the canned buffer.
    Deserialize,
    /// Decode the canned buffer, then re-encode into the same buffer.
    Both,
    /// Construct the protocol over a fresh buffer without encoding anything.
    Overhead,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Serialize,
        Operation::Deserialize,
        Operation::Both,
        Operation::Overhead,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Serialize => "serialize",
            Operation::Deserialize => "deserialize",
            Operation::Both => "both",
            Operation::Overhead => "overhead",
        }
    }
}

/// Benchmark state for one shape.
pub struct ShapeBench {
    descriptor: Arc<Descriptor>,
    instance: Instance,
    canned: WireBuffer,
    canned_len: usize,
    codec: CodecConfig,
}

impl ShapeBench {
    pub fn setup(registry: &ShapeRegistry, shape: &str, codec: CodecConfig) -> Result<Self> {
        let descriptor = registry.resolve(shape)?;
        let instance = registry.build(shape)?;
        // canned input comes from a second build, as the live path would see it
        let canned = codec::encode_with(&registry.build(shape)?, &descriptor, &codec)?;
        let canned_len = canned.len();
        Ok(Self {
            descriptor,
            instance,
            canned,
            canned_len,
            codec,
        })
    }

    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub fn encoded_len(&self) -> usize {
        self.canned_len
    }

    /// The canned encoding, excluding anything `both` appended.
    pub fn canned_bytes(&self) -> &[u8] {
        &self.canned.as_slice()[..self.canned_len]
    }

    /// Rewind the canned buffer and drop any re-encoded tail.
    pub fn reset(&mut self) {
        self.canned.truncate(self.canned_len);
        self.canned.rewind();
    }

    /// Encode into a fresh buffer presized to the canned length.
    pub fn serialize(&self) -> Result<WireBuffer> {
        let mut buf = WireBuffer::with_capacity(self.canned_len);
        codec::encode_into(&self.instance, &self.descriptor, &mut buf, &self.codec)?;
        Ok(buf)
    }

    /// Decode from the canned buffer's read cursor. Call [`reset`](Self::reset) first.
    pub fn deserialize(&mut self) -> Result<Instance> {
        Ok(codec::decode_with(
            &mut self.canned,
            &self.descriptor,
            &self.codec,
        )?)
    }

    /// Decode then re-encode through one protocol over the canned buffer.
    /// Returns the number of bytes written. Call [`reset`](Self::reset) first.
    pub fn both(&mut self) -> Result<usize> {
        let mut proto = CompactProtocol::new(&mut self.canned);
        let value = self.descriptor.read(&mut proto, &self.codec)?;
        self.descriptor.write(&value, &mut proto, &self.codec)?;
        Ok(proto.buffer().len() - self.canned_len)
    }

    /// Baseline: protocol construction over a fresh buffer.
    pub fn overhead() -> WireBuffer {
        let mut buf = WireBuffer::new();
        {
            let proto = CompactProtocol::new(&mut buf);
            black_box(&proto);
        }
        buf
    }

    /// Run `op` once untimed so codec failures abort instead of being timed.
    pub fn verify(&mut self, op: Operation) -> Result<()> {
        match op {
            Operation::Serialize => {
                self.serialize()?;
            }
            Operation::Deserialize => {
                self.reset();
                self.deserialize()?;
            }
            Operation::Both => {
                self.reset();
                self.both()?;
            }
            Operation::Overhead => {
                Self::overhead();
            }
        }
        self.reset();
        Ok(())
    }

    pub fn measure(&mut self, op: Operation, iters: u64, warmup: u64) -> Result<Measured> {
        self.verify(op)?;
        let m = match op {
            Operation::Serialize => measure_fn(iters, warmup, || self.serialize()),
            Operation::Deserialize => {
                measure_batched(iters, warmup, self, Self::reset, |b| b.deserialize())
            }
            Operation::Both => measure_batched(iters, warmup, self, Self::reset, |b| b.both()),
            Operation::Overhead => measure_fn(iters, warmup, Self::overhead),
        };
        self.reset();
        Ok(m)
    }
}

/// Run every requested (shape, op) pair. Shapes without a fixture are skipped.
pub fn run(
    cfg: &BenchConfig,
    registry: &ShapeRegistry,
    shapes: &[String],
    ops: &[Operation],
) -> Result<Vec<Measurement>> {
    let mut out = Vec::with_capacity(shapes.len() * ops.len());

    for shape in shapes {
        if registry.shape(shape).is_some() && !registry.has_fixture(shape) {
            warn!(shape = shape.as_str(), "no fixture registered, skipping");
            continue;
        }

        let mut bench = ShapeBench::setup(registry, shape, cfg.codec)?;
        let (iters, warmup) = cfg.iters_for(bench.encoded_len());

        for &op in ops {
            let m = bench.measure(op, iters, warmup)?;
            info!(
                shape = shape.as_str(),
                op = op.as_str(),
                ns_per_iter = m.ns_per_iter,
                "measured"
            );
            out.push(Measurement {
                shape: shape.clone(),
                op: op.as_str().to_string(),
                unit: "ns/iter".to_string(),
                iters: m.iters,
                warmup_iters: m.warmup_iters,
                total_ns: m.total_ns,
                ns_per_iter: m.ns_per_iter,
                encoded_bytes: bench.encoded_len() as u64,
            });
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::harness::Profile;
    use crate::registry;

    fn bench(shape: &str) -> ShapeBench {
        ShapeBench::setup(registry::global().unwrap(), shape, CodecConfig::default()).unwrap()
    }

    #[test]
    fn deserialize_is_repeatable_after_reset() {
        let mut b = bench(catalog::MIXED);
        for _ in 0..3 {
            b.reset();
            assert_eq!(&b.deserialize().unwrap(), b.instance());
        }
    }

    #[test]
    fn both_appends_identical_encoding() {
        let mut b = bench(catalog::SMALL_LIST_INT);
        for _ in 0..3 {
            b.reset();
            let written = b.both().unwrap();
            assert_eq!(written, b.encoded_len());
            let canned = b.canned_bytes().to_vec();
            assert_eq!(&b.canned.as_slice()[b.canned_len..], canned.as_slice());
        }
        b.reset();
        assert_eq!(b.canned.len(), b.encoded_len());
    }

    #[test]
    fn serialize_uses_fresh_buffer() {
        let b = bench(catalog::SMALL_STRING);
        let first = b.serialize().unwrap();
        let second = b.serialize().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.as_slice(), b.canned_bytes());
    }

    #[test]
    fn overhead_writes_nothing() {
        assert!(ShapeBench::overhead().is_empty());
    }

    #[test]
    fn run_reports_every_pair() {
        let cfg = BenchConfig {
            profile: Profile::Quick,
            codec: CodecConfig::default(),
        };
        let shapes = vec![catalog::EMPTY.to_string(), catalog::SMALL_INT.to_string()];
        let out = run(&cfg, registry::global().unwrap(), &shapes, &Operation::ALL).unwrap();
        assert_eq!(out.len(), 8);
        assert_eq!(out[0].shape, "Empty");
        assert_eq!(out[0].op, "serialize");
        assert_eq!(out[0].encoded_bytes, 1);
        assert_eq!(out[7].op, "overhead");
        assert!(out.iter().all(|m| m.iters == 300));
    }

    #[test]
    fn unknown_shape_aborts_run() {
        let cfg = BenchConfig::default();
        let shapes = vec!["Nope".to_string()];
        assert!(run(&cfg, registry::global().unwrap(), &shapes, &[Operation::Serialize]).is_err());
    }
}
