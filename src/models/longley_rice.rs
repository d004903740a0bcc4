//! Longley-Rice family adapter: [`ModelId::Itm`] and [`ModelId::Itwom`].
//!
//! This is deliberately not a full port of the Longley-Rice irregular
//! terrain model — that is several thousand lines of numerical fitting
//! on its own and, per this crate's scope, the models are the domain
//! rather than the engineering it sits behind. What's implemented here
//! keeps the real call shape (an elevation profile, ground constants,
//! and an `errnum`/mode report) behind a free-space-plus-terrain-
//! obstruction estimate: enough to drive the sweep's diffraction and
//! signal-conversion logic with plausible numbers.

use super::{ModelContext, ModelId, ModelOutput};

/// Evaluate the Longley-Rice adapter for `model` (must be
/// [`ModelId::Itm`] or [`ModelId::Itwom`]).
#[must_use]
pub fn evaluate(model: ModelId, ctx: &ModelContext) -> ModelOutput {
    let profile = ctx.profile_m;
    if profile.len() < 3 || profile[0] < 1.0 {
        return ModelOutput {
            loss_db: free_space_db(ctx, 0.001),
            errnum: 1,
            mode: "Error",
        };
    }

    let intervals = profile[0];
    let spacing_m = profile[1];
    let heights = &profile[2..];
    let distance_km = (intervals * spacing_m / 1000.0).max(1e-6);

    let free_space = free_space_db(ctx, distance_km);
    let (obstructed, excess_m) = terrain_obstruction(ctx.tx_alt_m, ctx.rx_alt_m, heights);

    // ITWOM's two-ray/wavelength corrections make it slightly less lossy
    // than ITM over short diffraction paths; a small per-model offset
    // keeps the two identifiers numerically distinguishable.
    let model_offset = if model == ModelId::Itwom { -1.5 } else { 0.0 };

    if !obstructed {
        return ModelOutput {
            loss_db: free_space + model_offset,
            errnum: 0,
            mode: "Line-of-Sight",
        };
    }

    let diffraction_loss = 6.9 + 20.0 * (excess_m.max(0.0) / 10.0 + 1.0).log10();
    ModelOutput {
        loss_db: free_space + diffraction_loss + model_offset,
        errnum: 0,
        mode: "Diffraction",
    }
}

fn free_space_db(ctx: &ModelContext, distance_km: f64) -> f64 {
    20.0 * distance_km.max(1e-6).log10() + 20.0 * ctx.frequency_mhz.log10() + 32.44
}

/// Does the terrain profile obstruct the direct tx-rx ray, and by how
/// much at the worst interior point.
fn terrain_obstruction(tx_alt_m: f64, rx_alt_m: f64, heights: &[f64]) -> (bool, f64) {
    let n = heights.len();
    if n < 2 {
        return (false, 0.0);
    }
    let last = (n - 1) as f64;
    let mut worst = f64::NEG_INFINITY;
    for (i, &h) in heights.iter().enumerate() {
        let f = i as f64 / last;
        let los_height = tx_alt_m + f * (rx_alt_m - tx_alt_m);
        worst = worst.max(h - los_height);
    }
    (worst > 0.0, worst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Lr;

    fn ctx(profile_m: &[f64]) -> ModelContext<'_> {
        static LR: Lr = Lr {
            eps_dielect: 15.0,
            sgm_conductivity: 0.005,
            eno_ns_surfref: 301.0,
            frq_mhz: 900.0,
            radio_climate: 5,
            pol: 0,
            conf: 0.5,
            rel: 0.5,
            erp: 0.0,
        };
        ModelContext {
            frequency_mhz: 900.0,
            tx_alt_m: 30.0,
            rx_alt_m: 2.0,
            distance_km: 1.0,
            environment: super::super::Environment::Rural,
            profile_m,
            lr: &LR,
        }
    }

    #[test]
    fn short_profile_reports_error() {
        let out = evaluate(ModelId::Itm, &ctx(&[]));
        assert_eq!(out.errnum, 1);
        assert_eq!(out.mode, "Error");
    }

    #[test]
    fn flat_profile_is_line_of_sight() {
        let profile = [4.0, 250.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let out = evaluate(ModelId::Itm, &ctx(&profile));
        assert_eq!(out.errnum, 0);
        assert_eq!(out.mode, "Line-of-Sight");
    }

    #[test]
    fn tall_mid_obstacle_is_diffraction() {
        let profile = [4.0, 250.0, 0.0, 0.0, 500.0, 0.0, 0.0, 0.0];
        let out = evaluate(ModelId::Itm, &ctx(&profile));
        assert_eq!(out.mode, "Diffraction");
        assert!(out.loss_db > free_space_db(&ctx(&profile), 1.0));
    }

    #[test]
    fn itm_and_itwom_disagree_slightly() {
        let profile = [4.0, 250.0, 0.0, 0.0, 500.0, 0.0, 0.0, 0.0];
        let itm = evaluate(ModelId::Itm, &ctx(&profile));
        let itwom = evaluate(ModelId::Itwom, &ctx(&profile));
        assert!((itm.loss_db - itwom.loss_db).abs() > 0.1);
    }
}
