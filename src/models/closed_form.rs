//! Closed-form path-loss models: Hata, ECC-33, SUI, COST-231 Hata,
//! free-space path loss, Ericsson 9999, plane-earth (flat-earth
//! two-ray), Egli and a simple ground-conductivity ("soil") model.
//!
//! Every model shares the call shape `loss_db = f(frequency_mhz,
//! tx_alt_m, rx_alt_m, distance_km, environment)`; [`evaluate`] is the
//! dispatch table, a direct analogue of this crate's other
//! identifier-to-function tables.

use super::{Environment, ModelContext, ModelId};

type ClosedFormFn = fn(&ModelContext) -> f64;

const TABLE: &[(ModelId, ClosedFormFn)] = &[
    (ModelId::Hata, hata),
    (ModelId::Ecc33, ecc33),
    (ModelId::Sui, sui),
    (ModelId::Cost231, cost231),
    (ModelId::Fspl, fspl),
    (ModelId::Ericsson, ericsson),
    (ModelId::PlaneEarth, plane_earth),
    (ModelId::Egli, egli),
    (ModelId::Soil, soil),
];

/// Dispatch `model` to its closed-form implementation. `model` must not
/// be [`ModelId::Itm`] or [`ModelId::Itwom`] (the caller routes those to
/// [`super::longley_rice`]); such a value falls back to [`fspl`] rather
/// than panicking, since dispatch tables in this crate never panic on
/// their input.
#[must_use]
pub fn evaluate(model: ModelId, ctx: &ModelContext) -> f64 {
    TABLE
        .iter()
        .find(|(id, _)| *id == model)
        .map_or_else(|| fspl(ctx), |(_, f)| f(ctx))
}

/// Okumura-Hata, urban/suburban/open variants, valid roughly 150-1500 MHz.
fn hata(ctx: &ModelContext) -> f64 {
    let f = ctx.frequency_mhz;
    let hb = ctx.tx_alt_m.max(1.0);
    let hm = ctx.rx_alt_m.max(1.0);
    let d = ctx.distance_km.max(0.01);

    let a_hm = (1.1 * f.log10() - 0.7) * hm - (1.56 * f.log10() - 0.8);
    let urban = 69.55 + 26.16 * f.log10() - 13.82 * hb.log10() - a_hm
        + (44.9 - 6.55 * hb.log10()) * d.log10();

    match ctx.environment {
        Environment::Urban => urban,
        Environment::Suburban => urban - 2.0 * (f / 28.0).log10().powi(2) - 5.4,
        Environment::Rural => urban - 4.78 * f.log10().powi(2) + 18.33 * f.log10() - 40.94,
    }
}

/// ECC-33, a free-space-plus-clutter model used above the Hata band.
fn ecc33(ctx: &ModelContext) -> f64 {
    let f_ghz = ctx.frequency_mhz / 1000.0;
    let hb = ctx.tx_alt_m.max(1.0);
    let hm = ctx.rx_alt_m.max(1.0);
    let d = ctx.distance_km.max(0.01);

    let a_fs = 92.4 + 20.0 * d.log10() + 20.0 * f_ghz.log10();
    let a_bm = 20.41 + 9.83 * d.log10() + 7.894 * f_ghz.log10() + 9.56 * f_ghz.log10().powi(2);
    let g_b = (hb / 200.0).log10() * (13.958 + 5.8 * d.log10().powi(2));
    let g_r = (42.57 + 13.7 * f_ghz.log10()) * (hm.log10() - 0.585);

    a_fs + a_bm - g_b - g_r
}

/// Stanford University Interim model, terrain category B coefficients.
fn sui(ctx: &ModelContext) -> f64 {
    const A: f64 = 4.0;
    const B: f64 = 0.0065;
    const C: f64 = 17.1;
    const D0_M: f64 = 100.0;

    let hb = ctx.tx_alt_m.max(1.0);
    let hm = ctx.rx_alt_m.max(1.0);
    let d_m = (ctx.distance_km * 1000.0).max(D0_M);
    let lambda_m = 299.792_458 / ctx.frequency_mhz;

    let gamma = A - B * hb + C / hb;
    let a = 20.0 * (4.0 * std::f64::consts::PI * D0_M / lambda_m).log10();
    let x_f = 6.0 * (ctx.frequency_mhz / 2000.0).log10();
    let x_h = -10.8 * (hm / 2000.0).log10();

    a + 10.0 * gamma * (d_m / D0_M).log10() + x_f + x_h
}

/// COST-231 extension of Hata up to 2 GHz; `Cm` is the urban/suburban
/// correction term.
fn cost231(ctx: &ModelContext) -> f64 {
    let f = ctx.frequency_mhz;
    let hb = ctx.tx_alt_m.max(1.0);
    let hm = ctx.rx_alt_m.max(1.0);
    let d = ctx.distance_km.max(0.01);

    let a_hm = (1.1 * f.log10() - 0.7) * hm - (1.56 * f.log10() - 0.8);
    let cm = if ctx.environment == Environment::Urban { 3.0 } else { 0.0 };

    46.3 + 33.9 * f.log10() - 13.82 * hb.log10() - a_hm + (44.9 - 6.55 * hb.log10()) * d.log10() + cm
}

/// Free-space path loss; ignores altitude entirely.
fn fspl(ctx: &ModelContext) -> f64 {
    let d = ctx.distance_km.max(1e-6);
    20.0 * d.log10() + 20.0 * ctx.frequency_mhz.log10() + 32.44
}

/// Ericsson 9999, a Hata-family model with an explicit frequency term.
fn ericsson(ctx: &ModelContext) -> f64 {
    const A0: f64 = 36.2;
    const A1: f64 = 30.2;
    const A2: f64 = -12.0;
    const A3: f64 = 0.1;

    let f = ctx.frequency_mhz;
    let hb = ctx.tx_alt_m.max(1.0);
    let hm = ctx.rx_alt_m.max(1.0);
    let d = ctx.distance_km.max(0.01);

    let g_f = 44.49 * f.log10() - 4.78 * f.log10().powi(2);
    A0 + A1 * d.log10() + A2 * hb.log10() + A3 * hb.log10() * d.log10()
        - 3.2 * (11.75 * hm).log10().powi(2)
        + g_f
}

/// Flat-earth two-ray ground reflection loss.
fn plane_earth(ctx: &ModelContext) -> f64 {
    let hb = ctx.tx_alt_m.max(1.0);
    let hm = ctx.rx_alt_m.max(1.0);
    let d_m = (ctx.distance_km * 1000.0).max(1.0);
    40.0 * d_m.log10() - 20.0 * hb.log10() - 20.0 * hm.log10()
}

/// Egli (1957), a simple terrain-statistics empirical model with a
/// frequency correction relative to a 40 MHz reference.
fn egli(ctx: &ModelContext) -> f64 {
    let f = ctx.frequency_mhz;
    let hb = ctx.tx_alt_m.max(1.0);
    let hm = ctx.rx_alt_m.max(1.0);
    let d = ctx.distance_km.max(0.01);

    117.0 + 40.0 * d.log10() - 20.0 * (hb * hm).log10() + 20.0 * (f / 40.0).log10()
}

/// A simplified ground-conductivity ("soil") model: free-space loss
/// plus an attenuation term growing with distance and shrinking with
/// ground conductivity and dielectric constant.
fn soil(ctx: &ModelContext) -> f64 {
    let free_space = fspl(ctx);
    let sigma = ctx.lr.sgm_conductivity.max(1e-6);
    let eps = ctx.lr.eps_dielect.max(1.0);
    let ground_loss = ctx.distance_km.max(0.0) * (2.0 / (sigma * eps).sqrt());
    free_space + ground_loss
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Lr;

    fn ctx(environment: Environment) -> ModelContext<'static> {
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
            environment,
            profile_m: &[],
            lr: &LR,
        }
    }

    #[test]
    fn fspl_matches_known_value() {
        // 900 MHz, 1 km: textbook value is ~91.5 dB.
        let loss = fspl(&ctx(Environment::Rural));
        float_eq::assert_float_eq!(loss, 91.53, abs <= 0.1);
    }

    #[test]
    fn losses_are_finite_and_positive_across_models() {
        for model in [
            ModelId::Hata,
            ModelId::Ecc33,
            ModelId::Sui,
            ModelId::Cost231,
            ModelId::Fspl,
            ModelId::Ericsson,
            ModelId::PlaneEarth,
            ModelId::Egli,
            ModelId::Soil,
        ] {
            let loss = evaluate(model, &ctx(Environment::Urban));
            assert!(loss.is_finite() && loss > 0.0, "{model:?} -> {loss}");
        }
    }

    #[test]
    fn hata_urban_exceeds_rural_at_same_distance() {
        let urban = hata(&ctx(Environment::Urban));
        let rural = hata(&ctx(Environment::Rural));
        assert!(urban > rural, "urban={urban} rural={rural}");
    }

    #[test]
    fn loss_grows_with_distance() {
        let mut near = ctx(Environment::Urban);
        near.distance_km = 1.0;
        let mut far = ctx(Environment::Urban);
        far.distance_km = 10.0;
        assert!(fspl(&far) > fspl(&near));
    }
}
