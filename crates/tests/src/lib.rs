//! # Integration Tests
//!
//! End-to-end tests over synthetic logs.
//!
//! Covers:
//! - Full file-to-file synchronization through `magsync::synchronize_files`
//! - Overlap and schema failures surfaced before any output is written
//! - Output formatting, trailing trim and the async pipeline
//! - Magnetometer protocol and dense-sample coalescing

#[cfg(test)]
mod fixtures {
    use std::fmt::Write as _;
    use std::fs;
    use std::path::{Path, PathBuf};

    use contracts::Micros;
    use export::formatter::format_precise_timestamp;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// 2024-03-01 12:00:00 UTC
    pub const T0: Micros = 1_709_294_400_000_000;
    pub const STEP: Micros = 10_000;

    pub const INS_HEADER: &str = "Timestamp,Acceleration X (g),Acceleration Y (g),Acceleration Z (g),\
        Angular_Velocity_X (dps),Temperature (°C),Longitude,Latitude,Base_Time";

    /// Jittered sample instants starting at `start`
    pub fn jittered(rng: &mut StdRng, start: Micros, records: usize) -> Vec<Micros> {
        (0..records as i64)
            .map(|i| start + i * STEP + rng.random_range(-2_000..=2_000))
            .collect()
    }

    pub fn ins_csv(seed: u64, start: Micros, records: usize) -> String {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut out = String::from(INS_HEADER);
        out.push('\n');
        for (i, t) in jittered(&mut rng, start, records).into_iter().enumerate() {
            let phase = i as f64 * 0.05;
            let _ = writeln!(
                out,
                "{},{:.6},{:.6},{:.6},{:.6},{:.2},{:.9},{:.9},{}",
                format_precise_timestamp(t),
                phase.sin() * 0.1,
                rng.random_range(-0.01..0.01),
                1.0 + rng.random_range(-0.01..0.01),
                phase.cos() * 20.0,
                25.0 + rng.random_range(-0.5..0.5),
                113.0 + i as f64 * 1e-7,
                23.0 + i as f64 * 1e-7,
                i,
            );
        }
        out
    }

    pub fn mag_csv(seed: u64, start: Micros, records: usize) -> String {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut out = String::from("timestamp,time,x,y,z,magnitude,base_time\n");
        for (i, t) in jittered(&mut rng, start, records).into_iter().enumerate() {
            let x: f64 = 0.3 + rng.random_range(-0.01..0.01);
            let y: f64 = -0.1 + rng.random_range(-0.01..0.01);
            let z: f64 = 0.5 + rng.random_range(-0.01..0.01);
            let magnitude = (x * x + y * y + z * z).sqrt();
            let _ = writeln!(
                out,
                "{},{:.3},{:.8},{:.8},{:.8},{:.8},{}",
                format_precise_timestamp(t),
                i as f64 * 0.01,
                x,
                y,
                z,
                magnitude,
                i,
            );
        }
        out
    }

    pub fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    /// Grid rows for two first/last pairs under the ceil/floor alignment
    pub fn expected_rows(a: (Micros, Micros), b: (Micros, Micros)) -> usize {
        let ceil = |t: Micros| (t + STEP - 1).div_euclid(STEP) * STEP;
        let floor = |t: Micros| t.div_euclid(STEP) * STEP;
        let start = ceil(a.0).max(ceil(b.0));
        let end = floor(a.1).min(floor(b.1));
        ((end - start) / STEP + 1) as usize
    }

    /// First and last timestamps a fixture generates
    pub fn bounds(seed: u64, start: Micros, records: usize) -> (Micros, Micros) {
        let mut rng = StdRng::seed_from_u64(seed);
        let ts = jittered(&mut rng, start, records);
        (ts[0], ts[records - 1])
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::fs;

    use contracts::{ContractError, StreamKind, SyncConfig, SyncReport};
    use magsync::pipeline::load_log;
    use magsync::{synchronize_files, OutputTargets, Pipeline, PipelineConfig, PipelineError};
    use sync_engine::evaluate;
    use tempfile::tempdir;

    use crate::fixtures::*;

    /// Full run over jittered logs: grid size, header and precision
    #[test]
    fn test_synchronize_files_end_to_end() {
        let dir = tempdir().unwrap();
        let ins = write(dir.path(), "ins.csv", &ins_csv(7, T0, 500));
        let mag = write(dir.path(), "mag.csv", &mag_csv(11, T0 + 4_000, 500));
        let out = dir.path().join("merged.csv");

        let report = synchronize_files(&ins, &mag, &out, &SyncConfig::default()).unwrap();

        let expected = expected_rows(bounds(11, T0 + 4_000, 500), bounds(7, T0, 500));
        assert_eq!(report.grid_rows, expected);
        assert_eq!(report.output_rows + report.trimmed_rows, report.grid_rows);
        assert_eq!(report.interval_ms, 10);

        let text = fs::read_to_string(&out).unwrap();
        let mut lines = text.lines();
        let header: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(header[0], "timestamp");
        assert!(header.contains(&"time"));
        assert!(!header.iter().any(|h| h.contains("base_time")));
        assert_eq!(
            report.dropped_columns,
            vec!["base_time".to_string(), "mag_base_time".to_string()]
        );

        let first: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(first.len(), header.len());
        // grid instants render with millisecond precision, on the 10 ms grid
        assert!(first[0].ends_with('0'));
        assert_eq!(first[0].len(), "2024-03-01 12:00:00.010".len());

        let lon = header.iter().position(|h| *h == "longitude").unwrap();
        let x = header.iter().position(|h| *h == "x").unwrap();
        let temp = header.iter().position(|h| *h == "temperature (°c)").unwrap();
        assert_eq!(first[lon].split('.').nth(1).unwrap().len(), 8);
        assert_eq!(first[x].split('.').nth(1).unwrap().len(), 6);
        assert_eq!(first[temp].split('.').nth(1).unwrap().len(), 4);
        assert_eq!(lines.count(), report.output_rows - 1);
    }

    /// Same inputs produce byte-identical output
    #[test]
    fn test_rerun_is_byte_identical() {
        let dir = tempdir().unwrap();
        let ins = write(dir.path(), "ins.csv", &ins_csv(3, T0, 300));
        let mag = write(dir.path(), "mag.csv", &mag_csv(5, T0 + 2_500, 300));
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");

        synchronize_files(&ins, &mag, &a, &SyncConfig::default()).unwrap();
        synchronize_files(&ins, &mag, &b, &SyncConfig::default()).unwrap();
        assert_eq!(fs::read(&a).unwrap(), fs::read(&b).unwrap());
    }

    /// 0.3 s of overlap against the 1 s minimum
    #[test]
    fn test_short_overlap_writes_nothing() {
        let dir = tempdir().unwrap();
        let ins = write(dir.path(), "ins.csv", &ins_csv(1, T0, 50));
        let mag = write(dir.path(), "mag.csv", &mag_csv(2, T0 + 200_000, 40));
        let out = dir.path().join("merged.csv");

        match synchronize_files(&ins, &mag, &out, &SyncConfig::default()) {
            Err(PipelineError::Sync(ContractError::Overlap {
                overlap_s,
                required_s,
                ..
            })) => {
                assert!(overlap_s < 0.31 && overlap_s > 0.25, "overlap {overlap_s}");
                assert_eq!(required_s, 1.0);
            }
            other => panic!("expected overlap error, got {other:?}"),
        }
        assert!(!out.exists());
    }

    #[test]
    fn test_missing_required_channel_names_it() {
        let dir = tempdir().unwrap();
        let ins_text: String = ins_csv(1, T0, 200)
            .lines()
            .map(|line| {
                let mut fields: Vec<&str> = line.split(',').collect();
                fields.remove(2);
                fields.join(",") + "\n"
            })
            .collect();
        let ins = write(dir.path(), "ins.csv", &ins_text);
        let mag = write(dir.path(), "mag.csv", &mag_csv(2, T0, 200));

        let err = synchronize_files(&ins, &mag, &dir.path().join("m.csv"), &SyncConfig::default())
            .unwrap_err();
        match &err {
            PipelineError::Sync(ContractError::Schema { missing, .. }) => {
                assert_eq!(missing, &vec!["acceleration y (g)".to_string()]);
            }
            other => panic!("expected schema error, got {other:?}"),
        }
        assert!(err.to_string().contains("acceleration y (g)"));
    }

    /// A blank magnetometer cell stays blank in the output; the file ends
    /// on a row with data
    #[test]
    fn test_interior_blank_kept_trailing_trimmed() {
        let dir = tempdir().unwrap();
        let ins = write(dir.path(), "ins.csv", &ins_csv(4, T0, 300));
        let mag_text: String = mag_csv(9, T0, 300)
            .lines()
            .enumerate()
            .map(|(i, line)| {
                let mut fields: Vec<&str> = line.split(',').collect();
                if (120..126).contains(&i) {
                    fields[2] = "";
                }
                fields.join(",") + "\n"
            })
            .collect();
        let mag = write(dir.path(), "mag.csv", &mag_text);
        let out = dir.path().join("merged.csv");

        let report = synchronize_files(&ins, &mag, &out, &SyncConfig::default()).unwrap();
        let text = fs::read_to_string(&out).unwrap();
        let rows: Vec<Vec<&str>> = text.lines().map(|l| l.split(',').collect()).collect();
        let x = rows[0].iter().position(|h| *h == "x").unwrap();

        let blank = rows[1..].iter().position(|r| r[x].is_empty()).unwrap();
        assert!(blank > 100 && blank < rows.len() - 2);
        assert!(rows.last().unwrap()[1..].iter().any(|v| !v.is_empty()));
        assert_eq!(rows.len() - 1, report.output_rows);
    }

    /// Pipeline run with a JSON report next to the CSV
    /// A merged file reads back as its own kind and feeds the evaluator
    #[test]
    fn test_merged_output_loads_for_evaluation() {
        let dir = tempdir().unwrap();
        let ins = write(dir.path(), "ins.csv", &ins_csv(5, T0, 300));
        let mag = write(dir.path(), "mag.csv", &mag_csv(9, T0 + 2_000, 300));
        let out = dir.path().join("merged.csv");
        let report = synchronize_files(&ins, &mag, &out, &SyncConfig::default()).unwrap();

        let merged = load_log(StreamKind::Merged, &out).unwrap();
        assert_eq!(merged.stream.kind(), StreamKind::Merged);
        assert_eq!(merged.stream.len(), report.output_rows);
        assert!(merged.stream.channel("x").is_some());

        let raw = load_log(StreamKind::Magnetometer, &mag).unwrap();
        let evaluation = evaluate(raw.stream.channels(), merged.stream.channels());
        let axes: Vec<&str> = evaluation.axes.iter().map(|a| a.axis.as_str()).collect();
        assert_eq!(axes, vec!["x", "y", "z"]);

        let err = load_log(StreamKind::Merged, &dir.path().join("absent.csv")).unwrap_err();
        assert!(format!("{err:#}").contains("merged log"), "got: {err:#}");
    }

    #[tokio::test]
    async fn test_pipeline_writes_report() {
        let dir = tempdir().unwrap();
        let config = PipelineConfig {
            ins_path: write(dir.path(), "ins.csv", &ins_csv(21, T0, 400)),
            mag_path: write(dir.path(), "mag.csv", &mag_csv(22, T0 + 3_000, 400)),
            targets: OutputTargets {
                output: dir.path().join("merged.csv"),
                report: Some(dir.path().join("report.json")),
            },
            sync: SyncConfig::default(),
        };

        let stats = Pipeline::new(config).run().await.unwrap();
        assert_eq!(stats.rows_written, stats.report.output_rows);

        let json = fs::read_to_string(dir.path().join("report.json")).unwrap();
        let report: SyncReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report.grid_rows, stats.report.grid_rows);
        assert_eq!(report.dropped_columns, stats.report.dropped_columns);
        assert_eq!(report.ins.records, 400);
        assert!(!report.quality.is_empty());

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["interval_ms"], 10);
        assert!(value["magnetometer"]["drift"]["window"].is_number());
    }
}

#[cfg(test)]
mod protocol_tests {
    use ingestion::protocol::parse_capture;
    use ingestion::{ReadingTokenizer, SampleBuffer};

    #[test]
    fn test_single_reading() {
        let (readings, stats) = parse_capture("RD 1.0,2,3,4");
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].t, 1.0);
        assert_eq!(readings[0].z, 4.0);
        assert_eq!(stats.malformed, 0);
    }

    #[test]
    fn test_short_payload_is_malformed() {
        let (readings, stats) = parse_capture("RD 1,2,3");
        assert!(readings.is_empty());
        assert_eq!(stats.malformed, 1);
    }

    /// Chunked feed into a buffer, handed off as a stream
    #[test]
    fn test_chunked_capture_to_stream() {
        let mut tokenizer = ReadingTokenizer::new();
        let mut buffer = SampleBuffer::magnetometer();
        let chunks = ["noise RD 0.00,1,2", ",3\nRD 0.01,", "4,5,6 RD"];

        let base = 1_709_294_400_000_000;
        let mut n = 0;
        for chunk in chunks {
            for reading in tokenizer.feed(chunk) {
                buffer.push_reading(base + n * 10_000, &reading).unwrap();
                n += 1;
            }
        }
        let (rest, stats, _) = tokenizer.finish();
        assert!(rest.is_empty());
        assert_eq!(stats.readings, 2);
        assert_eq!(stats.malformed, 1);

        let stream = buffer.handoff().unwrap();
        assert_eq!(stream.len(), 2);
        assert_eq!(stream.channel("x").unwrap().values, vec![1.0, 4.0]);
    }
}

#[cfg(test)]
mod coalesce_tests {
    use contracts::{CoalesceConfig, StreamKind};
    use ingestion::CsvLogLoader;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use sync_engine::coalesce_dense;

    use crate::fixtures::mag_csv;

    /// Early arrivals never coalesce without accumulating the budget
    #[test]
    fn test_regular_capture_unchanged() {
        let loaded = CsvLogLoader::new(StreamKind::Magnetometer)
            .load_reader(mag_csv(3, 1_709_294_400_000_000, 200).as_bytes())
            .unwrap();
        let outcome = coalesce_dense(loaded.stream, &CoalesceConfig::default()).unwrap();
        assert_eq!(outcome.merged_pairs, 0);
        assert_eq!(outcome.stream.len(), 200);
    }

    /// Record count drops by exactly the merged pairs; device time stays
    /// increasing
    #[test]
    fn test_dense_capture_properties() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut text = String::from("timestamp,time,x,y,z\n");
        let mut t = 0.0;
        for i in 0..400 {
            let ts = 1_709_294_400.0 + t;
            text.push_str(&format!("{ts:.6},{t:.4},{},{},{}\n", i, i * 2, -i));
            t += if rng.random_bool(0.3) { 0.0085 } else { 0.0100 };
        }
        let loaded = CsvLogLoader::new(StreamKind::Magnetometer)
            .load_reader(text.as_bytes())
            .unwrap();

        let outcome = coalesce_dense(loaded.stream, &CoalesceConfig::default()).unwrap();
        assert!(outcome.merged_pairs > 0);
        assert_eq!(outcome.stream.len(), 400 - outcome.merged_pairs);

        let time = &outcome.stream.channel("time").unwrap().values;
        assert!(time.windows(2).all(|w| w[1] > w[0]));
        // merged values are pair means: half-integers appear, order preserved
        let x = &outcome.stream.channel("x").unwrap().values;
        assert!(x.iter().any(|v| v.fract() == 0.5));
        assert!(x.windows(2).all(|w| w[1] > w[0]));
    }
}

#[cfg(test)]
mod config_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::SyncConfig;

    #[test]
    fn test_toml_round_trip_validates() {
        let config = SyncConfig {
            grid_interval_ms: 20,
            drop_incomplete_rows: true,
            ..Default::default()
        };
        let text = ConfigLoader::to_toml(&config).unwrap();
        let loaded = ConfigLoader::load_from_str(&text, ConfigFormat::Toml).unwrap();
        assert_eq!(loaded.grid_interval_ms, 20);
        assert!(loaded.drop_incomplete_rows);
        ConfigLoader::validate(&loaded).unwrap();
    }
}
