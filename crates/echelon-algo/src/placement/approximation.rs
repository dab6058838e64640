//! Per-stage tangent coefficients owned by one placement run.

use std::collections::HashMap;

use echelon_core::NodeId;

use super::cost::{round_to, ConcaveCost, Tangent, TANGENT_DECIMALS};

/// Local error under which a stage keeps its current tangent.
///
/// Re-centering a tangent that already fits makes neighbouring expansion
/// points trade places without progress.
pub const LOCAL_FIT_THRESHOLD: f64 = 0.01;

/// Point at which every stage's first tangent is taken.
pub const INITIAL_EXPANSION_POINT: f64 = 1.0;

/// The `(slope, intercept)` pair of every stage.
#[derive(Debug, Clone, Default)]
pub struct ApproximationTable {
    tangents: HashMap<NodeId, Tangent>,
}

impl ApproximationTable {
    /// Start every stage on the tangent at [`INITIAL_EXPANSION_POINT`].
    pub fn new(nodes: impl IntoIterator<Item = NodeId>, cost: &dyn ConcaveCost) -> Self {
        let initial = cost.tangent(INITIAL_EXPANSION_POINT);
        Self {
            tangents: nodes.into_iter().map(|id| (id, initial)).collect(),
        }
    }

    pub fn get(&self, node: NodeId) -> Option<Tangent> {
        self.tangents.get(&node).copied()
    }

    pub fn set(&mut self, node: NodeId, tangent: Tangent) {
        self.tangents.insert(node, tangent);
    }

    pub fn len(&self) -> usize {
        self.tangents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tangents.is_empty()
    }

    /// Surrogate cost of a stage, unweighted. Unknown stages cost nothing.
    pub fn approx_cost(&self, node: NodeId, nrp: f64, indicator: f64) -> f64 {
        self.get(node)
            .map_or(0.0, |tangent| tangent.evaluate(nrp, indicator))
    }

    /// `|surrogate − f(nrp)|` with the true value rounded to three decimals.
    pub fn node_error(&self, node: NodeId, nrp: f64, indicator: f64, cost: &dyn ConcaveCost) -> f64 {
        let truth = round_to(cost.evaluate(nrp), TANGENT_DECIMALS);
        (self.approx_cost(node, nrp, indicator) - truth).abs()
    }

    /// Re-center the tangent of `node` on `nrp` unless it already fits within
    /// `local_threshold`. Returns whether the stored pair changed.
    pub fn refresh(
        &mut self,
        node: NodeId,
        nrp: f64,
        indicator: f64,
        cost: &dyn ConcaveCost,
        local_threshold: f64,
    ) -> bool {
        if self.node_error(node, nrp, indicator, cost) < local_threshold {
            return false;
        }
        let tangent = cost.tangent(round_to(nrp, TANGENT_DECIMALS));
        self.tangents.insert(node, tangent) != Some(tangent)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, Tangent)> + '_ {
        self.tangents.iter().map(|(id, t)| (*id, *t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::cost::SquareRoot;

    fn table() -> (ApproximationTable, NodeId) {
        let node = NodeId::new(0);
        (ApproximationTable::new([node], &SquareRoot), node)
    }

    #[test]
    fn starts_on_tangent_at_one() {
        let (table, node) = table();
        assert_eq!(table.get(node), Some(Tangent::new(0.5, 0.5)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn zero_period_costs_nothing_for_either_indicator() {
        let (mut table, node) = table();
        table.set(node, SquareRoot.tangent(0.0));
        assert_eq!(table.approx_cost(node, 0.0, 0.0), 0.0);
        assert_eq!(table.approx_cost(node, 0.0, 1.0), 0.0);
        assert_eq!(table.node_error(node, 0.0, 1.0, &SquareRoot), 0.0);
    }

    #[test]
    fn well_fit_stage_is_frozen() {
        let (mut table, node) = table();
        // Tangent at 1 touches the curve at 1
        assert!(!table.refresh(node, 1.0, 1.0, &SquareRoot, LOCAL_FIT_THRESHOLD));
        assert_eq!(table.get(node), Some(Tangent::new(0.5, 0.5)));
    }

    #[test]
    fn poorly_fit_stage_moves_to_new_point() {
        let (mut table, node) = table();
        assert!(table.refresh(node, 4.0, 1.0, &SquareRoot, LOCAL_FIT_THRESHOLD));
        assert_eq!(table.get(node), Some(Tangent::new(0.25, 1.0)));
    }

    #[test]
    fn frozen_error_does_not_increase() {
        let (mut table, node) = table();
        let x = 9.0;
        table.refresh(node, x, 1.0, &SquareRoot, LOCAL_FIT_THRESHOLD);
        let first = table.node_error(node, x, 1.0, &SquareRoot);
        let changed = table.refresh(node, x, 1.0, &SquareRoot, LOCAL_FIT_THRESHOLD);
        let second = table.node_error(node, x, 1.0, &SquareRoot);
        assert!(!changed);
        assert!(second <= first);
    }

    #[test]
    fn refresh_is_idempotent_on_converged_state() {
        let (mut table, node) = table();
        table.refresh(node, 2.5, 1.0, &SquareRoot, LOCAL_FIT_THRESHOLD);
        let converged = table.get(node);
        assert!(!table.refresh(node, 2.5, 1.0, &SquareRoot, LOCAL_FIT_THRESHOLD));
        assert!(!table.refresh(node, 2.5, 1.0, &SquareRoot, LOCAL_FIT_THRESHOLD));
        assert_eq!(table.get(node), converged);
    }

    #[test]
    fn switched_on_zero_period_takes_sentinel() {
        let (mut table, node) = table();
        // Indicator on with zero period leaves the intercept as error
        assert!(table.refresh(node, 0.0, 1.0, &SquareRoot, LOCAL_FIT_THRESHOLD));
        assert!(table.get(node).is_some_and(|t| t.is_degenerate()));
    }

    #[test]
    fn evaluation_point_is_rounded() {
        let (mut table, node) = table();
        table.refresh(node, 4.0004, 1.0, &SquareRoot, LOCAL_FIT_THRESHOLD);
        assert_eq!(table.get(node), Some(SquareRoot.tangent(4.0)));
    }
}
