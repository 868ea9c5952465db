//! Splits a total quantity into order legs under the exchange freeze limit.
//!
//! The exchange rejects any single order at or above the freeze quantity, so a
//! large quantity is spread over several legs. The user may also ask for more
//! legs than the freeze rules need (`given_nlegs`), which is honoured when it
//! yields more legs than the freeze-mandated minimum.

use serde::{Deserialize, Serialize};

use super::error::SizingError;

/// Inputs to leg allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationInput {
    /// Total quantity to place (lot aligned, post margin throttle).
    pub quantity: u64,
    /// Exchange freeze quantity for the contract.
    pub freeze_qty: u64,
    /// Contract lot size.
    pub lot_size: u64,
    /// User's leg-count hint. Zero is treated as one.
    pub given_nlegs: u32,
}

impl AllocationInput {
    /// Build an input, defaulting a missing freeze quantity to `quantity + 1`
    /// (which disables freeze splitting).
    #[must_use]
    pub fn new(quantity: u64, freeze_qty: Option<u64>, lot_size: u64, given_nlegs: u32) -> Self {
        Self {
            quantity,
            freeze_qty: effective_freeze_qty(freeze_qty, quantity),
            lot_size,
            given_nlegs,
        }
    }
}

/// Freeze quantity to use when security info may not carry one.
#[must_use]
pub fn effective_freeze_qty(freeze_qty: Option<u64>, quantity: u64) -> u64 {
    match freeze_qty {
        Some(frz) if frz > 0 => frz,
        _ => quantity.saturating_add(1),
    }
}

/// Allocation result: `leg_count` legs of `per_leg_qty` plus one residual leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegPlan {
    /// Number of identical legs.
    pub leg_count: u64,
    /// Quantity of each identical leg. Zero only when `leg_count` is zero.
    pub per_leg_qty: u64,
    /// Quantity of the trailing residual leg (0 = no residual leg).
    pub residual_qty: u64,
}

impl LegPlan {
    /// Quantity covered by the plan.
    #[must_use]
    pub const fn total_quantity(&self) -> u64 {
        self.leg_count * self.per_leg_qty + self.residual_qty
    }

    /// Number of orders the plan turns into.
    #[must_use]
    pub const fn order_count(&self) -> u64 {
        let residual_leg = if self.residual_qty > 0 { 1 } else { 0 };
        self.leg_count + residual_leg
    }

    /// Quantity of each order, in submission order.
    #[must_use]
    pub fn leg_quantities(&self) -> Vec<u64> {
        let mut quantities: Vec<u64> = (0..self.leg_count).map(|_| self.per_leg_qty).collect();
        if self.residual_qty > 0 {
            quantities.push(self.residual_qty);
        }
        quantities
    }
}

/// Freeze-aware quantity allocator.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuantityAllocator;

impl QuantityAllocator {
    /// Create an allocator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Split `input.quantity` into legs.
    ///
    /// Guarantees `per_leg_qty < freeze_qty`, `residual_qty < freeze_qty`,
    /// lot-multiple leg quantities and `total_quantity() == quantity`.
    pub fn allocate(&self, input: &AllocationInput) -> Result<LegPlan, SizingError> {
        let AllocationInput {
            quantity: qty,
            freeze_qty: frz,
            lot_size: ls,
            given_nlegs,
        } = *input;

        if qty == 0 {
            return Err(SizingError::ZeroQuantity);
        }
        if ls == 0 {
            return Err(SizingError::InvalidInput(
                "lot size must be positive".to_string(),
            ));
        }
        if qty % ls != 0 {
            return Err(SizingError::InvalidInput(format!(
                "quantity {qty} is not a multiple of lot size {ls}"
            )));
        }
        if frz == 0 {
            return Err(SizingError::InvalidInput(
                "freeze quantity must be positive".to_string(),
            ));
        }

        // Largest lot multiple strictly below the freeze quantity.
        let freeze_leg_qty = (frz - 1) / ls * ls;
        if qty >= frz && freeze_leg_qty == 0 {
            return Err(SizingError::FreezeBelowLotSize {
                freeze_qty: frz,
                lot_size: ls,
            });
        }

        let given = u64::from(given_nlegs.max(1));
        let min_nlegs = qty / frz;
        let extra_leg = u64::from(qty % frz != 0);
        let use_hint = given > min_nlegs + extra_leg;

        let (mut nlegs, per_leg_qty) = if qty < frz {
            tracing::info!(qty, frz, given, min_nlegs, extra_leg, "qty below freeze");
            if use_hint {
                (given - extra_leg, qty / (given * ls) * ls)
            } else {
                (min_nlegs, 0)
            }
        } else {
            tracing::info!(qty, frz, given, min_nlegs, extra_leg, "qty at or above freeze");
            let hinted_qty = qty / given / ls * ls;
            if use_hint && hinted_qty > 0 {
                (given - extra_leg, hinted_qty)
            } else {
                (min_nlegs, freeze_leg_qty)
            }
        };
        if per_leg_qty == 0 {
            nlegs = 0;
        }

        let mut residual = qty - nlegs * per_leg_qty;

        // Fold an oversized residual back into whole legs.
        if residual >= frz && per_leg_qty > 0 {
            let moved = (residual - frz) / per_leg_qty + 1;
            nlegs += moved;
            residual -= moved * per_leg_qty;
        }

        let plan = LegPlan {
            leg_count: nlegs,
            per_leg_qty,
            residual_qty: residual,
        };
        Self::verify(&plan, input)?;

        tracing::info!(
            nlegs = plan.leg_count,
            per_leg_qty = plan.per_leg_qty,
            residual = plan.residual_qty,
            "Leg plan computed"
        );

        Ok(plan)
    }

    fn verify(plan: &LegPlan, input: &AllocationInput) -> Result<(), SizingError> {
        let violated = if plan.total_quantity() != input.quantity {
            Some("legs do not sum to quantity")
        } else if plan.per_leg_qty >= input.freeze_qty || plan.residual_qty >= input.freeze_qty {
            Some("leg at or above freeze quantity")
        } else if plan.per_leg_qty % input.lot_size != 0 || plan.residual_qty % input.lot_size != 0
        {
            Some("leg not a lot multiple")
        } else {
            None
        };

        match violated {
            Some(what) => Err(SizingError::InvariantViolation(format!(
                "{what}: {plan:?} for {input:?}"
            ))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    fn allocate(qty: u64, frz: u64, ls: u64, given: u32) -> LegPlan {
        QuantityAllocator::new()
            .allocate(&AllocationInput {
                quantity: qty,
                freeze_qty: frz,
                lot_size: ls,
                given_nlegs: given,
            })
            .unwrap()
    }

    #[test_case(500, 900, 1, 1 => (0, 0, 500); "below freeze single leg")]
    #[test_case(2500, 900, 1, 1 => (2, 899, 702); "above freeze splits at freeze minus one")]
    #[test_case(2700, 900, 1, 1 => (3, 899, 3); "exact freeze multiple")]
    #[test_case(500, 900, 1, 3 => (2, 166, 168); "hint honoured below freeze")]
    #[test_case(2500, 900, 1, 5 => (4, 500, 500); "hint honoured above freeze")]
    #[test_case(2500, 900, 1, 3 => (2, 899, 702); "hint not above minimum")]
    #[test_case(500, 900, 1, 0 => (0, 0, 500); "zero hint treated as one")]
    fn scenarios(qty: u64, frz: u64, ls: u64, given: u32) -> (u64, u64, u64) {
        let plan = allocate(qty, frz, ls, given);
        (plan.leg_count, plan.per_leg_qty, plan.residual_qty)
    }

    #[test]
    fn oversized_residual_becomes_a_leg() {
        // 1799 = 899 + 900; 900 would hit the freeze, so it splits again.
        let plan = allocate(1799, 900, 1, 1);
        assert_eq!(plan.leg_quantities(), vec![899, 899, 1]);
    }

    #[test]
    fn freeze_leg_is_lot_aligned() {
        // Freeze 1800 with lot 50: largest leg below freeze is 1750.
        let plan = allocate(4000, 1800, 50, 1);
        assert_eq!(plan.per_leg_qty, 1750);
        assert_eq!(plan.leg_quantities(), vec![1750, 1750, 500]);
    }

    #[test]
    fn hint_too_large_for_lots_falls_back_to_single_order() {
        // 50 units in lots of 25 cannot be spread over three legs.
        let plan = allocate(50, 900, 25, 3);
        assert_eq!(plan.leg_count, 0);
        assert_eq!(plan.residual_qty, 50);
        assert_eq!(plan.order_count(), 1);
    }

    #[test]
    fn missing_freeze_disables_splitting() {
        let input = AllocationInput::new(5000, None, 1, 1);
        assert_eq!(input.freeze_qty, 5001);

        let plan = QuantityAllocator::new().allocate(&input).unwrap();
        assert_eq!(plan.leg_quantities(), vec![5000]);
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let err = QuantityAllocator::new()
            .allocate(&AllocationInput::new(0, Some(900), 1, 1))
            .unwrap_err();
        assert_eq!(err, SizingError::ZeroQuantity);
    }

    #[test]
    fn misaligned_quantity_is_rejected() {
        let err = QuantityAllocator::new()
            .allocate(&AllocationInput::new(60, Some(900), 25, 1))
            .unwrap_err();
        assert!(matches!(err, SizingError::InvalidInput(_)));
    }

    #[test]
    fn freeze_not_above_lot_is_rejected() {
        let err = QuantityAllocator::new()
            .allocate(&AllocationInput::new(100, Some(50), 50, 1))
            .unwrap_err();
        assert!(matches!(err, SizingError::FreezeBelowLotSize { .. }));
    }

    proptest! {
        #[test]
        fn plan_respects_freeze_and_accounts_for_quantity(
            lot_size in 1u64..100,
            lots in 1u64..500,
            freeze_extra in 1u64..5000,
            given in 0u32..20,
        ) {
            let qty = lots * lot_size;
            let frz = lot_size + freeze_extra;
            let plan = allocate(qty, frz, lot_size, given);

            prop_assert!(plan.per_leg_qty < frz);
            prop_assert!(plan.residual_qty < frz);
            prop_assert_eq!(plan.leg_count * plan.per_leg_qty + plan.residual_qty, qty);
            prop_assert_eq!(plan.per_leg_qty % lot_size, 0);
            prop_assert_eq!(plan.residual_qty % lot_size, 0);
            prop_assert!(plan.leg_quantities().iter().all(|q| *q > 0));
        }
    }
}
