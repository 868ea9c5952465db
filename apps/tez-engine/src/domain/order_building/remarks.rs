//! Traceability tags stamped on each leg.

use crate::domain::shared::DomainError;

/// Format the remarks tag `TeZ_<index>_Qty_<legQty>_of_<total>`.
///
/// `index` is 1-based.
pub fn leg_remarks(index: usize, leg_qty: u64, total_qty: u64) -> Result<String, DomainError> {
    if index == 0 {
        return Err(DomainError::invalid("remarks", "leg index is 1-based"));
    }
    if leg_qty == 0 || leg_qty > total_qty {
        return Err(DomainError::invalid(
            "remarks",
            format!("leg quantity {leg_qty} outside 1..={total_qty}"),
        ));
    }
    Ok(format!("TeZ_{index}_Qty_{leg_qty}_of_{total_qty}"))
}
