//----------------------------------------
// Warnings and recommendations
//----------------------------------------
use crate::config::AdviceConfig;
use crate::power::formulas::cohens_h_from;
use crate::power::types::{EffectSize, EffectSizeType, TestExtras, TestType};

pub(crate) fn small_sample(total: usize, config: &AdviceConfig) -> Option<String> {
    (total < config.small_sample_threshold).then(|| {
        format!(
            "total sample size {total} is below {}; normal approximation may be unreliable",
            config.small_sample_threshold
        )
    })
}

/// Effect actually driving the calculation; proportion tests given both
/// proportions use Cohen's h between them
fn effective_effect(test_type: TestType, effect: EffectSize, extras: &TestExtras) -> EffectSize {
    match (test_type, extras.p1, extras.p2) {
        (
            TestType::OneSampleProportion | TestType::TwoSampleProportion | TestType::FisherExact,
            Some(p1),
            Some(p2),
        ) => EffectSize::new(cohens_h_from(p1, p2), EffectSizeType::CohensH),
        _ => effect,
    }
}

pub(crate) fn small_effect(
    test_type: TestType,
    effect: EffectSize,
    extras: &TestExtras,
) -> Option<String> {
    let effect = effective_effect(test_type, effect, extras);
    let threshold = effect.kind.small_effect_threshold();
    (effect.distance_from_null() < threshold).then(|| {
        format!(
            "effect size {} ({}) is below the small-effect threshold {threshold}; \
             reassess whether the study is feasible",
            effect.value, effect.kind
        )
    })
}

pub(crate) fn power_level(power: f64, config: &AdviceConfig) -> Option<String> {
    if power < config.low_power_threshold {
        Some(format!(
            "power {power:.3} is below {}; increase the sample size or target a larger effect",
            config.low_power_threshold
        ))
    } else if power > config.high_power_threshold {
        Some(format!(
            "power {power:.3} exceeds {}; the study may be larger than needed",
            config.high_power_threshold
        ))
    } else {
        None
    }
}
