//! Pipeline statistics.

use std::time::Duration;

use contracts::SyncReport;
use ingestion::LoadStats;
use observability::RunSummary;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Diagnostics of the synchronization
    pub report: SyncReport,

    /// Rows written to the merged CSV
    pub rows_written: usize,

    /// INS log loading counters
    pub ins_load: LoadStats,

    /// Magnetometer log loading counters
    pub mag_load: LoadStats,

    /// Time spent parsing both logs
    pub load_duration: Duration,

    /// Total duration of the run
    pub duration: Duration,
}

impl PipelineStats {
    /// Rows written per second of total run time
    pub fn rows_per_second(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.rows_written as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        let report = &self.report;

        println!("\n=== Pipeline Statistics ===\n");
        println!("Overview");
        println!("   ├─ Duration: {:.3}s (loading {:.3}s)", self.duration.as_secs_f64(), self.load_duration.as_secs_f64());
        println!("   ├─ Grid: {} .. {} every {} ms", report.grid_start, report.grid_end, report.interval_ms);
        println!("   ├─ Overlap: {:.3}s", report.overlap_s);
        println!("   ├─ Rows written: {} of {}", self.rows_written, report.grid_rows);
        println!("   └─ Rows/s: {:.0}", self.rows_per_second());

        println!("\nInputs");
        println!(
            "   ├─ INS: {} rows read, {} records, {} unparseable timestamps, {} duplicates folded",
            self.ins_load.rows_read,
            report.ins.records,
            self.ins_load.unparseable_timestamps,
            report.ins.coalesced_duplicates
        );
        println!(
            "   └─ Magnetometer: {} rows read, {} records, {} unparseable timestamps, {} dense pairs merged",
            self.mag_load.rows_read,
            report.magnetometer.records,
            self.mag_load.unparseable_timestamps,
            report.magnetometer.dense_pairs_merged
        );

        if !report.dropped_columns.is_empty() {
            println!("\nDropped columns: {}", report.dropped_columns.join(", "));
        }

        if !report.notes.is_empty() {
            println!("\nQuality notes");
            for note in &report.notes {
                println!("   ├─ {} {}: {:?}", note.stream, note.channel, note.kind);
            }
        }

        println!("\n{}", RunSummary::from_report(report));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_per_second() {
        let stats = PipelineStats {
            rows_written: 500,
            duration: Duration::from_millis(250),
            ..Default::default()
        };
        assert!((stats.rows_per_second() - 2000.0).abs() < 1e-9);
        assert_eq!(PipelineStats::default().rows_per_second(), 0.0);
    }
}
