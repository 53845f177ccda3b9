//! Analytics: Aggregate statistics over the in-memory patient history.

use chrono::NaiveDate;

use crate::domain::{Condition, Gender, PatientRecord, RiskLevel, UNDERWEIGHT_BMI};

/// BMI category used by the distribution chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmiBucket {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiBucket {
    pub const ALL: [BmiBucket; 4] = [
        BmiBucket::Underweight,
        BmiBucket::Normal,
        BmiBucket::Overweight,
        BmiBucket::Obese,
    ];

    #[must_use]
    pub fn of(bmi: f64) -> Self {
        if bmi < UNDERWEIGHT_BMI {
            Self::Underweight
        } else if bmi < 25.0 {
            Self::Normal
        } else if bmi < 30.0 {
            Self::Overweight
        } else {
            Self::Obese
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Underweight => "Under",
            Self::Normal => "Normal",
            Self::Overweight => "Over",
            Self::Obese => "Obese",
        }
    }
}

/// Snapshot of the history, recomputed whenever the analytics view draws.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryStats {
    pub total: usize,
    /// Rounded to whole years; 0 when there is no history
    pub average_age: u32,
    pub critical: usize,
    pub male: usize,
    pub female: usize,
    /// In order of first appearance in the history
    pub comorbidities: Vec<(Condition, usize)>,
    /// Counts per bucket, in `BmiBucket::ALL` order
    pub bmi_distribution: [usize; 4],
    pub average_risk: f64,
    /// Records per intake date, oldest first
    pub trend: Vec<(NaiveDate, usize)>,
}

impl HistoryStats {
    #[must_use]
    pub fn from_history(history: &[PatientRecord]) -> Self {
        let total = history.len();
        if total == 0 {
            return Self::default();
        }

        let age_sum: f64 = history.iter().map(|r| r.age).sum();
        let risk_sum: u32 = history.iter().map(|r| u32::from(r.risk_score)).sum();

        let mut comorbidities: Vec<(Condition, usize)> = Vec::new();
        let mut bmi_distribution = [0usize; 4];
        let mut trend: Vec<(NaiveDate, usize)> = Vec::new();

        for record in history {
            match comorbidities.iter_mut().find(|(c, _)| *c == record.condition) {
                Some((_, n)) => *n += 1,
                None => comorbidities.push((record.condition, 1)),
            }

            let bucket = BmiBucket::of(record.bmi);
            if let Some(idx) = BmiBucket::ALL.iter().position(|b| *b == bucket) {
                bmi_distribution[idx] += 1;
            }

            match trend.iter_mut().find(|(d, _)| *d == record.date) {
                Some((_, n)) => *n += 1,
                None => trend.push((record.date, 1)),
            }
        }
        trend.sort_by_key(|(d, _)| *d);

        Self {
            total,
            average_age: (age_sum / total as f64).round() as u32,
            critical: history
                .iter()
                .filter(|r| r.risk_level == RiskLevel::Critical)
                .count(),
            male: history.iter().filter(|r| r.gender == Gender::Male).count(),
            female: history.iter().filter(|r| r.gender == Gender::Female).count(),
            comorbidities,
            bmi_distribution,
            average_risk: f64::from(risk_sum) / total as f64,
            trend,
        }
    }

    /// Share of critical cases in [0, 1].
    #[must_use]
    pub fn critical_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.critical as f64 / self.total as f64
        }
    }
}
