//----------------------------------------
// Power calculator
//----------------------------------------
use crate::error::CtpowerErr;
use crate::power::error::PowerErr;
use crate::power::formulas::strategy_for;
use crate::power::types::{EffectSize, PowerDesign, PowerRecord, SampleSize, TestExtras, TestType};
use parking_lot::Mutex;
use tracing::debug;

/// Computes power for a single test. Every call is recorded in an
/// append-only history that may be inspected or cleared; the history never
/// influences results.
#[derive(Debug, Default)]
pub struct PowerCalculator {
    history: Mutex<Vec<PowerRecord>>,
}

impl PowerCalculator {
    pub fn new() -> Self {
        PowerCalculator::default()
    }

    /// Power in [0, 1] of `test_type` at the given sample size, effect size
    /// and alpha
    pub fn power(
        &self,
        test_type: TestType,
        sample_size: &SampleSize,
        effect_size: EffectSize,
        alpha: f64,
        extras: &TestExtras,
    ) -> Result<f64, CtpowerErr> {
        let group_sizes =
            sample_size.group_sizes(test_type.n_groups(extras), extras.allocation_ratio());
        let res = self.power_at(test_type, &group_sizes, effect_size, alpha, extras);

        let record = PowerRecord {
            test_type,
            group_sizes,
            effect_size: effect_size.value,
            effect_size_type: effect_size.kind,
            alpha,
            power: *res.as_ref().unwrap_or(&0.0),
            error: res.as_ref().err().map(|e| e.to_string()),
        };
        self.history.lock().push(record);

        res
    }

    fn power_at(
        &self,
        test_type: TestType,
        group_sizes: &[usize],
        effect_size: EffectSize,
        alpha: f64,
        extras: &TestExtras,
    ) -> Result<f64, CtpowerErr> {
        let design = validate(test_type, group_sizes, effect_size, alpha, extras)?;
        let power = strategy_for(test_type).power(&design)?;
        debug!(
            test_type = %test_type,
            group_sizes = ?group_sizes,
            effect = effect_size.value,
            alpha,
            power,
            "computed power"
        );
        Ok(power)
    }

    /// Mean of the test statistic under the alternative, for tests whose
    /// statistic is approximately a single z. Not recorded in the history.
    pub fn expected_z(
        &self,
        test_type: TestType,
        sample_size: &SampleSize,
        effect_size: EffectSize,
        alpha: f64,
        extras: &TestExtras,
    ) -> Result<Option<f64>, CtpowerErr> {
        let group_sizes =
            sample_size.group_sizes(test_type.n_groups(extras), extras.allocation_ratio());
        let design = validate(test_type, &group_sizes, effect_size, alpha, extras)?;
        strategy_for(test_type).expected_z(&design)
    }

    pub fn history(&self) -> Vec<PowerRecord> {
        self.history.lock().clone()
    }

    pub fn history_len(&self) -> usize {
        self.history.lock().len()
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
    }
}

/// Checks every argument a formula relies on and bundles them
pub(crate) fn validate(
    test_type: TestType,
    group_sizes: &[usize],
    effect_size: EffectSize,
    alpha: f64,
    extras: &TestExtras,
) -> Result<PowerDesign, CtpowerErr> {
    //----------------------------------------
    // Check arguments
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(PowerErr::BadAlpha(alpha).into());
    }
    effect_size.validate()?;

    let expected_groups = test_type.n_groups(extras);
    let groups_ok = match test_type {
        TestType::OneWayAnova => group_sizes.len() >= 2,
        _ => group_sizes.len() == expected_groups,
    };
    if !groups_ok {
        return Err(PowerErr::WrongGroupCount {
            test_type,
            expected: expected_groups,
            got: group_sizes.len(),
        }
        .into());
    }

    if group_sizes
        .iter()
        .try_fold(0usize, |acc, &n| acc.checked_add(n))
        .is_none()
    {
        return Err(PowerErr::SampleSizeTooLarge {
            test_type,
            got: group_sizes.to_vec(),
        }
        .into());
    }

    let minimum = test_type.min_group_size(extras);
    if let Some(&smallest) = group_sizes.iter().min() {
        if smallest < minimum {
            return Err(PowerErr::SampleSizeTooSmall {
                test_type,
                minimum,
                got: smallest,
            }
            .into());
        }
    }

    if let Some(ratio) = extras.allocation_ratio {
        if !(ratio > 0.0 && ratio.is_finite()) {
            return Err(PowerErr::BadExtra {
                test_type,
                name: "allocation_ratio",
                value: ratio,
            }
            .into());
        }
    }

    Ok(PowerDesign {
        test_type,
        group_sizes: group_sizes.to_vec(),
        effect_size,
        alpha,
        extras: extras.clone(),
    })
}
