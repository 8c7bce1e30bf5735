use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    pub schema_version: u32,
    pub bench_version: String,
    pub profile: String,
    pub max_depth: usize,
    pub timestamp_utc: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    pub shape: String,
    pub op: String,
    pub unit: String,

    pub iters: u64,
    pub warmup_iters: u64,

    pub total_ns: u128,
    pub ns_per_iter: f64,

    /// Length of the canned encoding for the shape.
    pub encoded_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchReport {
    pub run: RunMeta,
    pub measurements: Vec<Measurement>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_serializes_to_json() {
        let report = BenchReport {
            run: RunMeta {
                schema_version: 1,
                bench_version: "0.1.0".into(),
                profile: "quick".into(),
                max_depth: 64,
                timestamp_utc: "unix:0".into(),
            },
            measurements: vec![Measurement {
                shape: "SmallInt".into(),
                op: "serialize".into(),
                unit: "ns/iter".into(),
                iters: 300,
                warmup_iters: 32,
                total_ns: 6_000,
                ns_per_iter: 20.0,
                encoded_bytes: 3,
            }],
        };

        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["run"]["profile"], "quick");
        assert_eq!(json["measurements"][0]["shape"], "SmallInt");
        assert_eq!(json["measurements"][0]["encoded_bytes"], 3);
    }
}
