//! Line-oriented output for partitions and sweep trials.

use crate::clustering::{Cluster, Partition, SweepReport, TrialResult};
use crate::core::float::ForelFloat;
use crate::dataset::Dataset;
use crate::error::{ForelError, ForelResult};
use colored::Colorize;
use std::fmt;
use std::io::Write;

/// Writes per-cluster statistics and the feature salience of every
/// multi-member cluster.
pub fn write_cluster_analysis<F, W>(
    out: &mut W,
    dataset: &Dataset<F>,
    partition: &Partition<F>,
) -> ForelResult<()>
where
    F: ForelFloat,
    W: Write,
{
    writeln!(out, "{}", "=== Cluster Analysis ===".bold())?;

    let stats: Vec<ClusterStats> = partition
        .clusters
        .iter()
        .map(|cluster| ClusterStats::new(cluster, dataset))
        .collect();
    write_summary_statistics(out, &stats, partition)?;

    for cluster in partition.clusters.iter().filter(|c| c.len() > 1) {
        writeln!(out)?;
        writeln!(out, "{}", stats[cluster.id - 1].to_string().green())?;
        if let Some(salience) = &cluster.salience {
            writeln!(out, "  most valuable fields:")?;
            for score in salience {
                writeln!(out, "    {}: {}", score.field, score.score)?;
            }
        }
    }
    Ok(())
}

#[derive(Debug)]
struct ClusterStats {
    cluster_id: usize,
    size: usize,
    center: String,
    weight: f64,
    avg_distance_to_center: f64,
}

impl ClusterStats {
    fn new<F: ForelFloat>(cluster: &Cluster<F>, dataset: &Dataset<F>) -> Self {
        let weight = cluster.weight.to_f64().unwrap_or(f64::NAN);
        let avg_distance_to_center = if cluster.is_empty() {
            0.0
        } else {
            weight / cluster.len() as f64
        };
        Self {
            cluster_id: cluster.id,
            size: cluster.len(),
            center: dataset.identifier(cluster.center_idx).to_string(),
            weight,
            avg_distance_to_center,
        }
    }
}

impl fmt::Display for ClusterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cluster {}: {} points, Center: {}, Weight: {:.4}, Avg Distance: {:.4}",
            self.cluster_id, self.size, self.center, self.weight, self.avg_distance_to_center
        )
    }
}

fn write_summary_statistics<F: ForelFloat, W: Write>(
    out: &mut W,
    stats: &[ClusterStats],
    partition: &Partition<F>,
) -> ForelResult<()> {
    writeln!(out, "{}", "Summary Statistics:".bold())?;
    writeln!(out, "Radius: {}", partition.radius)?;
    writeln!(out, "Total Clusters: {}", stats.len())?;

    let total_points: usize = stats.iter().map(|s| s.size).sum();
    let singletons = stats.iter().filter(|s| s.size == 1).count();
    let largest = stats.iter().map(|s| s.size).max().unwrap_or(0);
    let avg_cluster_size = if stats.is_empty() {
        0.0
    } else {
        total_points as f64 / stats.len() as f64
    };

    writeln!(out, "Total Points: {}", total_points)?;
    writeln!(out, "Average Cluster Size: {:.2}", avg_cluster_size)?;
    writeln!(out, "Largest Cluster: {}", largest)?;
    writeln!(out, "Singletons: {}", singletons)?;
    writeln!(out, "Total Weight: {}", partition.total_weight)?;
    Ok(())
}

/// Writes one `identifier;cluster` line per record, followed by the raw
/// values of `show_fields` when any are given.
pub fn write_partition<F, W>(
    out: &mut W,
    dataset: &Dataset<F>,
    partition: &Partition<F>,
    show_fields: &[String],
) -> ForelResult<()>
where
    F: ForelFloat,
    W: Write,
{
    let columns = show_fields
        .iter()
        .map(|field| {
            dataset.space().position(field).ok_or_else(|| {
                ForelError::Configuration(format!("cannot show unknown feature field `{}`", field))
            })
        })
        .collect::<ForelResult<Vec<usize>>>()?;

    let values = dataset.values();
    for (idx, label) in partition.labels.iter().enumerate() {
        write!(out, "{};{}", dataset.identifier(idx), label)?;
        for &col in &columns {
            write!(out, ";{}", values[[idx, col]])?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// `index;radius;clusters;weight;objective` with decimal commas.
pub fn format_trial<F: ForelFloat>(trial: &TrialResult<F>) -> String {
    format!(
        "{};{};{};{};{}",
        trial.index, trial.radius, trial.cluster_count, trial.total_weight, trial.objective
    )
    .replace('.', ",")
}

pub fn write_sweep<F: ForelFloat, W: Write>(out: &mut W, report: &SweepReport<F>) -> ForelResult<()> {
    for trial in &report.trials {
        writeln!(out, "{}", format_trial(trial))?;
    }
    Ok(())
}

pub fn write_sweep_summary<F: ForelFloat, W: Write>(
    out: &mut W,
    report: &SweepReport<F>,
) -> ForelResult<()> {
    writeln!(out, "\n{}", "Sweep Summary:".bold())?;
    writeln!(out, "Diameter: {}", report.diameter)?;
    writeln!(out, "Trials: {}", report.trials.len())?;
    if !report.skipped.is_empty() {
        let skipped: Vec<String> = report.skipped.iter().map(|i| i.to_string()).collect();
        writeln!(out, "{}", format!("Skipped: {}", skipped.join(", ")).yellow())?;
    }
    match report.best() {
        Some(best) => writeln!(
            out,
            "Best: trial {} radius {} ({} clusters, weight {}, objective {})",
            best.index, best.radius, best.cluster_count, best.total_weight, best.objective
        )?,
        None => writeln!(out, "{}", "No usable trials".red())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::{Forel, Metric};
    use crate::matrices::DistanceMatrix;
    use ndarray::array;

    fn dataset() -> Dataset<f64> {
        Dataset::from_array(
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            &["x", "y"],
            array![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [10.0, 10.5]],
        )
        .unwrap()
    }

    fn partition(dataset: &Dataset<f64>) -> Partition<f64> {
        let d = DistanceMatrix::build(dataset).unwrap();
        Forel::new(Metric::Euclidean(&d))
            .with_salience(dataset)
            .run(1.5)
            .unwrap()
    }

    #[test]
    fn test_partition_lines() {
        let dataset = dataset();
        let partition = partition(&dataset);
        let mut out = Vec::new();
        write_partition(&mut out, &dataset, &partition, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a;1\nb;1\nc;1\nd;2\n");
    }

    #[test]
    fn test_partition_lines_with_fields() {
        let dataset = dataset();
        let partition = partition(&dataset);
        let mut out = Vec::new();
        write_partition(&mut out, &dataset, &partition, &["y".to_string()]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().last(), Some("d;2;10.5"));

        let mut out = Vec::new();
        let unknown = write_partition(&mut out, &dataset, &partition, &["z".to_string()]);
        assert!(matches!(unknown, Err(ForelError::Configuration(_))));
    }

    #[test]
    fn test_trial_uses_decimal_commas() {
        let trial = TrialResult {
            index: 3,
            radius: 0.25,
            cluster_count: 7,
            total_weight: 12.5,
            objective: 1.125,
        };
        assert_eq!(format_trial(&trial), "3;0,25;7;12,5;1,125");
    }

    #[test]
    fn test_cluster_analysis_mentions_multi_member_clusters() {
        colored::control::set_override(false);
        let dataset = dataset();
        let partition = partition(&dataset);
        let mut out = Vec::new();
        write_cluster_analysis(&mut out, &dataset, &partition).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Total Clusters: 2"));
        assert!(text.contains("Cluster 1: 3 points, Center: a"));
        assert!(!text.contains("Cluster 2:"));
        assert!(text.contains("most valuable fields:"));
    }
}
