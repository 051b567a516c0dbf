//! Training-time labels: does 20-day realized volatility rise over the horizon?

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use csv::Writer;
use tracing::{debug, info};

use crate::core::io::create_parent_dirs;
use crate::error::{Result, VolcastError};
use crate::features::{Feature, FeatureTable, N_FEATURES};

/// Horizon used by the production model.
pub const DEFAULT_HORIZON: usize = 20;

/// Label for one row of a feature table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub current_volatility: f64,
    pub future_volatility: f64,
    /// 1 when volatility rises over the horizon, 0 otherwise.
    pub label: u8,
}

/// Labels every row: `future = volatility_20d[i + horizon]`, label 1 iff
/// `future > current`.
///
/// A row's target is `None` when either side is undefined. The last
/// `horizon` rows are therefore always `None`.
pub fn label_targets(table: &FeatureTable, horizon: usize) -> Result<Vec<Option<Target>>> {
    if horizon == 0 {
        return Err(VolcastError::InvalidParameter(
            "horizon must be greater than 0".to_string(),
        ));
    }

    let vol = table.column(Feature::Volatility20d);
    let targets = (0..vol.len())
        .map(|i| {
            let current = vol[i]?;
            let future = (*vol.get(i.checked_add(horizon)?)?)?;
            Some(Target {
                current_volatility: current,
                future_volatility: future,
                label: u8::from(future > current),
            })
        })
        .collect();

    Ok(targets)
}

/// Supervised (X, y) pairs: rows with a defined label and a complete feature row.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    /// Bar date of each case
    pub dates: Vec<NaiveDate>,
    /// Feature matrix: n_cases x n_vars, canonical feature order
    pub data: Vec<f64>,
    /// Labels: n_cases
    pub targets: Vec<u8>,
    /// 20-day volatility `horizon` bars ahead of each case
    pub future_volatility: Vec<f64>,
    /// Number of cases
    pub n_cases: usize,
    /// Number of variables (features)
    pub n_vars: usize,
}

impl TrainingSet {
    /// Labels `table` and keeps only usable rows. Rows without a label (the
    /// trailing `horizon` rows among them) never reach the training set.
    pub fn build(table: &FeatureTable, horizon: usize) -> Result<Self> {
        let targets = label_targets(table, horizon)?;

        let mut set = TrainingSet {
            dates: Vec::new(),
            data: Vec::new(),
            targets: Vec::new(),
            future_volatility: Vec::new(),
            n_cases: 0,
            n_vars: N_FEATURES,
        };

        for ((date, row), target) in table.dates().iter().zip(table.rows()).zip(&targets) {
            let (Some(target), Some(x)) = (target, row.to_vector()) else {
                continue;
            };
            set.dates.push(*date);
            set.data.extend_from_slice(&x);
            set.targets.push(target.label);
            set.future_volatility.push(target.future_volatility);
            set.n_cases += 1;
        }

        debug!(
            rows = table.len(),
            cases = set.n_cases,
            horizon,
            "built training set"
        );
        Ok(set)
    }

    /// Feature vector of case `i`.
    pub fn case(&self, i: usize) -> &[f64] {
        &self.data[i * self.n_vars..(i + 1) * self.n_vars]
    }

    /// Number of cases labeled "volatility will increase".
    pub fn n_increase(&self) -> usize {
        self.targets.iter().filter(|&&y| y == 1).count()
    }

    /// Number of cases labeled "volatility will decrease".
    pub fn n_decrease(&self) -> usize {
        self.n_cases - self.n_increase()
    }

    /// Writes the set as CSV: `Date`, the canonical features,
    /// `future_volatility`, `target`.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        create_parent_dirs(path)?;
        let mut writer = Writer::from_writer(File::create(path)?);

        let mut header = vec!["Date"];
        header.extend(Feature::names());
        header.extend(["future_volatility", "target"]);
        writer.write_record(&header)?;

        for i in 0..self.n_cases {
            let mut record = Vec::with_capacity(self.n_vars + 3);
            record.push(self.dates[i].format("%Y-%m-%d").to_string());
            record.extend(self.case(i).iter().map(|x| x.to_string()));
            record.push(self.future_volatility[i].to_string());
            record.push(self.targets[i].to_string());
            writer.write_record(&record)?;
        }
        writer.flush()?;

        info!(
            path = %path.display(),
            cases = self.n_cases,
            increase = self.n_increase(),
            decrease = self.n_decrease(),
            "wrote training set"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureRow;
    use chrono::Duration;

    /// A table where every feature is defined and volatility_20d follows `vol`.
    fn table_with_volatility(vol: &[f64]) -> FeatureTable {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates = (0..vol.len())
            .map(|i| start + Duration::days(i as i64))
            .collect();
        let rows = vol
            .iter()
            .map(|&v| {
                let mut row = FeatureRow::new([Some(1.0); N_FEATURES]);
                row.set(Feature::Volatility20d, Some(v));
                row
            })
            .collect();
        FeatureTable::from_rows(dates, rows).unwrap()
    }

    #[test]
    fn test_horizon_trims_last_rows() {
        let vol: Vec<f64> = (0..80).map(|i| 0.01 + (i as f64 * 0.4).sin().abs() * 0.01).collect();
        let table = table_with_volatility(&vol);

        let targets = label_targets(&table, 20).unwrap();
        assert_eq!(targets.len(), 80);
        assert_eq!(targets.iter().flatten().count(), 60);
        assert!(targets[59].is_some());
        assert!(targets[60..].iter().all(Option::is_none));

        let set = TrainingSet::build(&table, 20).unwrap();
        assert_eq!(set.n_cases, 60);
        assert_eq!(set.data.len(), 60 * N_FEATURES);
        assert_eq!(set.dates.last(), Some(&table.dates()[59]));
    }

    #[test]
    fn test_label_direction() {
        let vol = vec![0.01, 0.02, 0.02, 0.01];
        let table = table_with_volatility(&vol);
        let targets = label_targets(&table, 1).unwrap();

        assert_eq!(targets[0].unwrap().label, 1); // 0.01 -> 0.02
        assert_eq!(targets[1].unwrap().label, 0); // unchanged is not an increase
        assert_eq!(targets[2].unwrap().label, 0); // 0.02 -> 0.01
        assert!(targets[3].is_none());

        let set = TrainingSet::build(&table, 1).unwrap();
        assert_eq!(set.n_increase(), 1);
        assert_eq!(set.n_decrease(), 2);
    }

    #[test]
    fn test_undefined_rows_are_excluded() {
        let mut table = table_with_volatility(&[0.01; 30]);
        let dates = table.dates().to_vec();
        let mut rows = table.rows().to_vec();
        rows[0].set(Feature::Volatility20d, None);
        rows[1].set(Feature::Sma50, None);
        table = FeatureTable::from_rows(dates, rows).unwrap();

        let targets = label_targets(&table, 5).unwrap();
        assert!(targets[0].is_none());
        assert!(targets[1].is_some());

        // row 1 has a label but an incomplete feature vector
        let set = TrainingSet::build(&table, 5).unwrap();
        assert_eq!(set.n_cases, 30 - 5 - 2);
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let table = table_with_volatility(&[0.01; 5]);
        assert!(matches!(
            label_targets(&table, 0),
            Err(VolcastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_horizon_past_end_labels_nothing() {
        let table = table_with_volatility(&[0.01, 0.02, 0.03, 0.02, 0.01]);

        for horizon in [5, 1_000, usize::MAX] {
            let targets = label_targets(&table, horizon).unwrap();
            assert_eq!(targets.len(), 5);
            assert!(targets.iter().all(Option::is_none));
        }

        let set = TrainingSet::build(&table, usize::MAX).unwrap();
        assert_eq!(set.n_cases, 0);
    }

    #[test]
    fn test_write_csv() {
        let table = table_with_volatility(&[0.01, 0.03, 0.02]);
        let set = TrainingSet::build(&table, 1).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/features.csv");
        set.write_csv(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Date,returns,returns_5d"));
        assert!(lines[0].ends_with("macd_histogram,future_volatility,target"));
        assert!(lines[1].starts_with("2024-01-01,"));
        assert!(lines[1].ends_with(",0.03,1"));
    }
}
