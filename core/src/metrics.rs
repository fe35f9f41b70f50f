//! Aggregerings-primitiver over valgfrie metrikker.
//!
//! Manglende verdier (`None`) deltar aldri i snitt eller maks; sum behandler
//! dem som null.

use ordered_float::OrderedFloat;

/// Sum der manglende verdier teller som 0.0.
pub fn sum_or_zero<I>(xs: I) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    xs.into_iter().flatten().sum()
}

/// Enkelt snitt over tilstedeværende verdier. `None` når ingen finnes.
pub fn mean<I>(xs: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut sum = 0.0;
    let mut cnt = 0usize;
    for x in xs.into_iter().flatten() {
        sum += x;
        cnt += 1;
    }
    if cnt == 0 {
        None
    } else {
        Some(sum / cnt as f64)
    }
}

/// Maks over tilstedeværende verdier. `None` når ingen finnes.
pub fn max_value<I>(xs: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    xs.into_iter()
        .flatten()
        .map(OrderedFloat)
        .max()
        .map(|x| x.0)
}

/// Tidsvektet snitt: sum(v·w)/sum(w) over par der både verdi og vekt finnes.
/// Like vekter reduserer dette til det vanlige snittet. 0.0 uten gyldige par.
pub fn time_weighted_mean<I>(pairs: I) -> f64
where
    I: IntoIterator<Item = (Option<f64>, Option<f64>)>,
{
    let mut weighted = 0.0;
    let mut total_w = 0.0;
    for (v, w) in pairs {
        if let (Some(v), Some(w)) = (v, w) {
            weighted += v * w;
            total_w += w;
        }
    }
    if total_w > 0.0 {
        weighted / total_w
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_behandler_none_som_null() {
        assert_eq!(sum_or_zero([Some(80.0), None, Some(120.0)]), 200.0);
        assert_eq!(sum_or_zero(std::iter::empty()), 0.0);
    }

    #[test]
    fn mean_hopper_over_none() {
        assert_eq!(mean([Some(2.0), None, Some(4.0)]), Some(3.0));
        assert_eq!(mean([None, None]), None);
    }

    #[test]
    fn max_over_tilstedeværende() {
        assert_eq!(max_value([Some(1.0), Some(3.0), None]), Some(3.0));
        assert_eq!(max_value([None]), None);
    }

    #[test]
    fn vektet_snitt_matcher_regneeksempelet() {
        // 40 min på IF 0.75 + 60 min på IF 0.85 → 0.81
        let got = time_weighted_mean([
            (Some(0.75), Some(2400.0)),
            (Some(0.85), Some(3600.0)),
        ]);
        assert!((got - 0.81).abs() < 1e-9);
    }

    #[test]
    fn like_vekter_gir_vanlig_snitt() {
        let got = time_weighted_mean([
            (Some(0.7), Some(3600.0)),
            (Some(0.9), Some(3600.0)),
        ]);
        assert!((got - 0.8).abs() < 1e-9);
    }

    #[test]
    fn vektet_snitt_ignorerer_ufullstendige_par() {
        let got = time_weighted_mean([
            (Some(0.7), None),
            (None, Some(3600.0)),
            (Some(0.9), Some(3600.0)),
        ]);
        assert!((got - 0.9).abs() < 1e-9);
    }
}
