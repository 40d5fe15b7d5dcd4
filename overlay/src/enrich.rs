//! Preparing detected turns for traversal.
//!
//! After enrichment every operation knows how far along its segment it is,
//! which ring of the other input it touches, and where a walker leaving it
//! along its own ring arrives next.

use std::collections::BTreeMap;

use crate::{
    geom::PointOrder,
    num::Float,
    ordering::{compare_operations, OperationRanks},
    rings::{RingId, Rings},
    strategy::ComparableDistance,
    turns::{op_indices, operation, operation_mut, OpIdx, Turn},
};

/// Swaps union and intersection on every operation.
///
/// The detector classifies operations as if the rings were clockwise; this
/// fixes them up for counter-clockwise rings.
pub fn reverse_operations<F: Float>(turns: &mut [Turn<F>]) {
    for turn in turns {
        for op in &mut turn.operations {
            op.kind = op.kind.reversed();
        }
    }
}

/// Fills in the enrichment info of every operation.
///
/// If `order` is counter-clockwise, this starts by reversing the operations.
pub fn enrich<F, D>(
    turns: &mut [Turn<F>],
    a: &Rings<F>,
    b: &Rings<F>,
    order: PointOrder,
    distance: &D,
    ranks: &OperationRanks,
) where
    F: Float,
    D: ComparableDistance<F>,
{
    if order == PointOrder::CounterClockwise {
        reverse_operations(turns);
    }
    let rings = [a, b];

    for turn in turns.iter_mut() {
        let others = [
            turn.operations[1].seg_id.ring(),
            turn.operations[0].seg_id.ring(),
        ];
        for (source, op) in turn.operations.iter_mut().enumerate() {
            let seg = rings[source].segment(op.seg_id);
            op.enriched.distance = Some(distance.comparable(&seg.start, &turn.point));
            op.enriched.other_ring = Some(others[source]);
        }
    }

    let mut per_ring: BTreeMap<RingId, Vec<OpIdx>> = BTreeMap::new();
    for idx in op_indices(turns) {
        per_ring
            .entry(operation(turns, idx).seg_id.ring())
            .or_default()
            .push(idx);
    }

    for (ring_id, ops) in &mut per_ring {
        ops.sort_by(|&l, &r| compare_operations(operation(turns, l), operation(turns, r), ranks));
        let ring_len = rings[ring_id.source].ring(*ring_id).len();
        let n = ops.len();
        for k in 0..n {
            let here = ops[k];
            let point = &turns[here.turn.0].point;
            let (target, wrapped) = (1..n)
                .map(|j| (ops[(k + j) % n], k + j >= n))
                .find(|(t, _)| &turns[t.turn.0].point != point)
                .unwrap_or((here, true));

            let seg_here = operation(turns, here).seg_id.segment_index;
            let seg_there = operation(turns, target).seg_id.segment_index;
            let vertex = if !wrapped && seg_here == seg_there {
                None
            } else {
                Some((seg_here + 1) % ring_len)
            };

            let enriched = &mut operation_mut(turns, here).enriched;
            enriched.travels_to = Some(target);
            enriched.travels_to_vertex = vertex;
        }
    }
    log::debug!(
        "enriched {} turns on {} rings",
        turns.len(),
        per_ring.len()
    );
}
