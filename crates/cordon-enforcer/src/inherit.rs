use std::collections::HashSet;

use cordon_core::RegionId;

/// Expands a set of shared regions with every region that precedes one of
/// them in a feature's declared order.
///
/// A region declared later in the order inherits the export surface of
/// every region declared before it, so sharing the later region grants
/// access to everything the earlier ones expose. The expansion only adds
/// entries: the result always contains `shared`, and a shared region absent
/// from `declared` passes through without pulling anything in.
pub fn expand_inherited(declared: &[RegionId], shared: &HashSet<RegionId>) -> HashSet<RegionId> {
    let mut expanded = shared.clone();
    for region in shared {
        if let Some(position) = declared.iter().position(|candidate| candidate == region) {
            expanded.extend(declared[..position].iter().cloned());
        }
    }
    expanded
}
