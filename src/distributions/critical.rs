//----------------------------------------
// Critical values of central distributions
//----------------------------------------
use crate::distributions::error::DistributionErr;
use crate::error::CtpowerErr;
use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor, StudentsT};

fn check_p(p: f64) -> Result<(), CtpowerErr> {
    if !(p > 0.0 && p < 1.0) {
        return Err(DistributionErr::QuantileOutOfBounds(p).into());
    }
    Ok(())
}

fn check_df(df: f64) -> Result<(), CtpowerErr> {
    if !(df > 0.0 && df.is_finite()) {
        return Err(DistributionErr::BadDegreesOfFreedom(df).into());
    }
    Ok(())
}

pub fn t_quantile(p: f64, df: f64) -> Result<f64, CtpowerErr> {
    check_p(p)?;
    check_df(df)?;
    let t = StudentsT::new(0.0, 1.0, df).map_err(|_| DistributionErr::BadDegreesOfFreedom(df))?;
    Ok(t.inverse_cdf(p))
}

pub fn f_quantile(p: f64, df1: f64, df2: f64) -> Result<f64, CtpowerErr> {
    check_p(p)?;
    check_df(df1)?;
    check_df(df2)?;
    let f = FisherSnedecor::new(df1, df2)
        .map_err(|_| DistributionErr::BadDegreesOfFreedom(df1.min(df2)))?;
    Ok(f.inverse_cdf(p))
}

pub fn chi_squared_quantile(p: f64, df: f64) -> Result<f64, CtpowerErr> {
    check_p(p)?;
    check_df(df)?;
    let chi = ChiSquared::new(df).map_err(|_| DistributionErr::BadDegreesOfFreedom(df))?;
    Ok(chi.inverse_cdf(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_quantile_58() {
        assert!((t_quantile(0.975, 58.).unwrap() - 2.001717).abs() < 1e-4);
    }

    #[test]
    fn f_quantile_2_57() {
        assert!((f_quantile(0.95, 2., 57.).unwrap() - 3.158843).abs() < 1e-3);
    }

    #[test]
    fn chi_squared_quantile_1() {
        assert!((chi_squared_quantile(0.95, 1.).unwrap() - 3.841459).abs() < 1e-4);
    }

    #[test]
    fn bad_df_error() {
        assert!(matches!(
            t_quantile(0.975, 0.),
            Err(CtpowerErr::Distribution(DistributionErr::BadDegreesOfFreedom(_)))
        ));
    }
}
