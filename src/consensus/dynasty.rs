// Dynasty Delta Ledger - scheduled changes to the active deposit total
//
// Invariant: sum of deltas for dynasties <= current dynasty equals the
// current-dynasty total of scaled deposits.

use crate::types::{DynastyNumber, EpochNumber, ScaledDeposit};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynastyLedger {
    /// Current dynasty
    dynasty: DynastyNumber,

    /// Signed scaled-deposit delta per dynasty. Missing entries are zero.
    deltas: BTreeMap<DynastyNumber, ScaledDeposit>,

    /// Scaled deposits of the current dynasty's validator set
    total_curdyn_deposits: ScaledDeposit,

    /// Scaled deposits of the previous dynasty's validator set
    total_prevdyn_deposits: ScaledDeposit,

    /// First epoch of each dynasty
    dynasty_start_epoch: BTreeMap<DynastyNumber, EpochNumber>,
}

impl DynastyLedger {
    pub fn new(genesis_epoch: EpochNumber) -> Self {
        let mut dynasty_start_epoch = BTreeMap::new();
        dynasty_start_epoch.insert(0, genesis_epoch);
        Self {
            dynasty: 0,
            deltas: BTreeMap::new(),
            total_curdyn_deposits: 0,
            total_prevdyn_deposits: 0,
            dynasty_start_epoch,
        }
    }

    pub fn dynasty(&self) -> DynastyNumber {
        self.dynasty
    }

    /// Delta scheduled (or archived) for `dynasty`
    pub fn delta(&self, dynasty: DynastyNumber) -> ScaledDeposit {
        self.deltas.get(&dynasty).copied().unwrap_or(0)
    }

    /// Accumulate `amount` into the delta of `dynasty`
    pub fn schedule(&mut self, dynasty: DynastyNumber, amount: ScaledDeposit) {
        *self.deltas.entry(dynasty).or_insert(0) += amount;
    }

    pub fn total_curdyn_deposits(&self) -> ScaledDeposit {
        self.total_curdyn_deposits
    }

    pub fn total_prevdyn_deposits(&self) -> ScaledDeposit {
        self.total_prevdyn_deposits
    }

    /// Both the current and previous validator sets hold stake
    pub fn deposit_exists(&self) -> bool {
        self.total_curdyn_deposits > 0 && self.total_prevdyn_deposits > 0
    }

    /// Credit a reward to the running totals the validator contributes to
    pub fn credit(&mut self, amount: ScaledDeposit, in_current: bool, in_previous: bool) {
        if in_current {
            self.total_curdyn_deposits += amount;
        }
        if in_previous {
            self.total_prevdyn_deposits += amount;
        }
    }

    /// Advance to the next dynasty, folding its delta into the totals
    pub fn advance(&mut self, epoch: EpochNumber) -> DynastyNumber {
        self.dynasty += 1;
        self.total_prevdyn_deposits = self.total_curdyn_deposits;
        self.total_curdyn_deposits += self.delta(self.dynasty);
        self.dynasty_start_epoch.insert(self.dynasty, epoch);

        if self.total_curdyn_deposits < 0 {
            warn!(
                "Dynasty {} deposit total is negative ({}): deltas removed more than was deposited",
                self.dynasty, self.total_curdyn_deposits
            );
        }
        info!(
            "Dynasty {} started at epoch {} (curdyn {}, prevdyn {})",
            self.dynasty, epoch, self.total_curdyn_deposits, self.total_prevdyn_deposits
        );
        self.dynasty
    }

    pub fn dynasty_start_epoch(&self, dynasty: DynastyNumber) -> Option<EpochNumber> {
        self.dynasty_start_epoch.get(&dynasty).copied()
    }

    /// Sum of all deltas up to and including `dynasty`
    pub fn cumulative_delta(&self, dynasty: DynastyNumber) -> ScaledDeposit {
        self.deltas.range(..=dynasty).map(|(_, d)| *d).sum()
    }

    /// Non-zero entries, for audit
    pub fn entries(&self) -> impl Iterator<Item = (DynastyNumber, ScaledDeposit)> + '_ {
        self.deltas.iter().map(|(d, v)| (*d, *v))
    }
}
