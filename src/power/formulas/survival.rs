//----------------------------------------
// log-rank test
//----------------------------------------
use crate::error::CtpowerErr;
use crate::power::error::PowerErr;
use crate::power::formulas::{PowerFormula, normal_power, unsupported};
use crate::power::types::{EffectSizeType, PowerDesign};

/// Schoenfeld's approximation: the log-rank statistic is normal with mean
/// |log HR| sqrt(D p (1 - p)), D the expected number of events and p the
/// proportion randomized to the first arm
pub(crate) struct LogRank;

impl PowerFormula for LogRank {
    fn power(&self, design: &PowerDesign) -> Result<f64, CtpowerErr> {
        let z_crit = design.extras.z_crit(design.alpha)?;
        Ok(normal_power(
            schoenfeld_shift(design)?,
            z_crit,
            design.extras.alternative,
        ))
    }

    fn expected_z(&self, design: &PowerDesign) -> Result<Option<f64>, CtpowerErr> {
        schoenfeld_shift(design).map(Some)
    }
}

fn schoenfeld_shift(design: &PowerDesign) -> Result<f64, CtpowerErr> {
    let hr = match design.effect_size.kind {
        EffectSizeType::HazardRatio => design.effect_size.value,
        kind => return Err(unsupported(design.test_type, kind)),
    };
    let event_rate = design.extras.event_rate.unwrap_or(1.0);
    if !(event_rate > 0.0 && event_rate <= 1.0) {
        return Err(PowerErr::BadExtra {
            test_type: design.test_type,
            name: "event_rate",
            value: event_rate,
        }
        .into());
    }
    let n1 = design.group_sizes[0] as f64;
    let n_total = design.total() as f64;
    let p = n1 / n_total;
    let events = n_total * event_rate;
    Ok(hr.ln() * (events * p * (1. - p)).sqrt())
}
