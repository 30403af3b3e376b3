//----------------------------------------
// correlation
//----------------------------------------
use crate::error::CtpowerErr;
use crate::power::formulas::{PowerFormula, normal_power, unsupported};
use crate::power::types::{EffectSizeType, PowerDesign};

/// Test of zero correlation via Fisher's z: atanh(r) sqrt(n - 3)
pub(crate) struct Correlation;

impl PowerFormula for Correlation {
    fn power(&self, design: &PowerDesign) -> Result<f64, CtpowerErr> {
        let z_crit = design.extras.z_crit(design.alpha)?;
        Ok(normal_power(
            fisher_z_shift(design)?,
            z_crit,
            design.extras.alternative,
        ))
    }

    fn expected_z(&self, design: &PowerDesign) -> Result<Option<f64>, CtpowerErr> {
        fisher_z_shift(design).map(Some)
    }
}

fn fisher_z_shift(design: &PowerDesign) -> Result<f64, CtpowerErr> {
    let r = match design.effect_size.kind {
        EffectSizeType::PearsonR => design.effect_size.value,
        kind => return Err(unsupported(design.test_type, kind)),
    };
    let n = design.group_sizes[0] as f64;
    Ok(r.atanh() * (n - 3.).sqrt())
}
