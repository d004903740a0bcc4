//! Propagation dispatch (C5): model identifiers and the uniform context
//! every path-loss model is evaluated against.
//!
//! The closed-form models (see [`closed_form`]) share one signature; the
//! Longley-Rice family (see [`longley_rice`]) additionally consumes an
//! elevation profile and ground constants, and reports an error code and
//! mode string alongside the loss. [`evaluate`] hides that split behind
//! one entry point, mirroring the dispatch-table idiom the rest of this
//! crate uses for model selection.

pub mod closed_form;
pub mod longley_rice;

use crate::config::Lr;

/// A path-loss model identifier, as received from a caller.
///
/// Identifier `2` is reserved and unused upstream; [`ModelId::from_id`]
/// folds it (and every other unknown value) onto [`ModelId::Itm`], per
/// the dispatch fallback rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ModelId {
    Itm = 1,
    Hata = 3,
    Ecc33 = 4,
    Sui = 5,
    Cost231 = 6,
    Fspl = 7,
    Itwom = 8,
    Ericsson = 9,
    PlaneEarth = 10,
    Egli = 11,
    Soil = 12,
}

impl ModelId {
    #[must_use]
    pub fn from_id(id: i32) -> Self {
        match id {
            1 => ModelId::Itm,
            3 => ModelId::Hata,
            4 => ModelId::Ecc33,
            5 => ModelId::Sui,
            6 => ModelId::Cost231,
            7 => ModelId::Fspl,
            8 => ModelId::Itwom,
            9 => ModelId::Ericsson,
            10 => ModelId::PlaneEarth,
            11 => ModelId::Egli,
            12 => ModelId::Soil,
            _ => ModelId::Itm,
        }
    }

    #[must_use]
    pub fn is_longley_rice(self) -> bool {
        matches!(self, ModelId::Itm | ModelId::Itwom)
    }
}

/// Coarse clutter/morphology category, used by the closed-form models
/// that distinguish urban, suburban and open terrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Urban,
    Suburban,
    Rural,
}

/// Everything a model needs to evaluate one ray sample. Closed-form
/// models only ever read `frequency_mhz`, `tx_alt_m`, `rx_alt_m`,
/// `distance_km` and `environment`; `profile_m` and `lr` exist solely for
/// the Longley-Rice family.
pub struct ModelContext<'a> {
    pub frequency_mhz: f64,
    pub tx_alt_m: f64,
    pub rx_alt_m: f64,
    pub distance_km: f64,
    pub environment: Environment,
    /// Elevation profile in meters, Longley-Rice convention: `[0]` is
    /// the sample count minus one, `[1]` is the inter-sample spacing in
    /// meters, `[2..]` are the terrain heights.
    pub profile_m: &'a [f64],
    pub lr: &'a Lr,
}

/// The result of one model evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelOutput {
    pub loss_db: f64,
    /// Non-zero only for the Longley-Rice family; see §4.7/§7.
    pub errnum: i32,
    /// Longley-Rice propagation mode string (e.g. "Line-of-Sight"),
    /// empty for closed-form models.
    pub mode: &'static str,
}

/// Evaluate `model` against `ctx`, routing to the Longley-Rice adapter
/// or the closed-form table as appropriate.
#[must_use]
pub fn evaluate(model: ModelId, ctx: &ModelContext) -> ModelOutput {
    if model.is_longley_rice() {
        longley_rice::evaluate(model, ctx)
    } else {
        ModelOutput {
            loss_db: closed_form::evaluate(model, ctx),
            errnum: 0,
            mode: "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_and_reserved_ids_fall_back_to_itm() {
        assert_eq!(ModelId::from_id(2), ModelId::Itm);
        assert_eq!(ModelId::from_id(99), ModelId::Itm);
        assert_eq!(ModelId::from_id(1), ModelId::Itm);
    }

    #[test]
    fn known_ids_round_trip() {
        assert_eq!(ModelId::from_id(7), ModelId::Fspl);
        assert_eq!(ModelId::from_id(12), ModelId::Soil);
    }
}
