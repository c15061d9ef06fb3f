// Epoch transition - rescaling, reward factor, insta-finalization and dynasty
// advancement
use super::host::Host;
use super::CasperEngine;
use crate::consensus::checkpoint::Checkpoint;
use crate::consensus::economics;
use crate::error::{CasperError, CasperResult};
use crate::types::{DynastyNumber, EpochNumber};
use tracing::{debug, info};

/// Summary of an `initialize_epoch` call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochTransition {
    pub epoch: EpochNumber,
    pub dynasty: DynastyNumber,
    pub dynasty_advanced: bool,
    /// No deposits in both dynasties: the previous epoch was finalized outright
    pub insta_finalized: bool,
    pub collective_reward: f64,
    pub reward_factor: f64,
    pub deposit_scale_factor: f64,
}

impl<H: Host> CasperEngine<H> {
    /// Start `epoch`. Must be called once per epoch, in order, once the chain
    /// has reached it.
    pub fn initialize_epoch(&mut self, epoch: EpochNumber) -> CasperResult<EpochTransition> {
        let expected = self.state.current_epoch + 1;
        if epoch != expected {
            return Err(CasperError::InvalidEpoch { expected, got: epoch });
        }
        let chain_epoch = self.host.current_chain_epoch();
        if epoch > chain_epoch {
            return Err(CasperError::TooEarly(format!(
                "epoch {} not reached, chain is at epoch {}",
                epoch, chain_epoch
            )));
        }

        let previous = epoch - 1;
        let deposit_exists = self.state.dynasties.deposit_exists();

        // Snapshot deposits at the outgoing factor
        let mut checkpoint = Checkpoint::new(self.host.checkpoint_hash(epoch));
        checkpoint.cur_dyn_deposits = self.total_curdyn_deposits();
        checkpoint.prev_dyn_deposits = self.total_prevdyn_deposits();
        self.state.checkpoints.insert(epoch, checkpoint);
        self.state.current_epoch = epoch;

        // Rescale everyone by the collective reward of last epoch's voters
        let esf = self.esf();
        let (cur_votes, prev_votes) = self.votes(previous, self.state.expected_source_epoch);
        let vote_fraction = economics::vote_fraction(
            cur_votes,
            self.total_curdyn_deposits_scaled(),
            prev_votes,
            self.total_prevdyn_deposits_scaled(),
        );
        let collective_reward =
            economics::collective_reward(vote_fraction, self.state.reward_factor, esf, deposit_exists);
        let (voter_rescale, nonvoter_rescale) =
            economics::rescales(collective_reward, self.state.reward_factor);
        self.state.scale.set_rescales(voter_rescale, nonvoter_rescale);
        let deposit_scale_factor = self.state.scale.recompute(epoch, nonvoter_rescale - 1.0);

        let carried = self.total_slashed(previous);
        self.state.total_slashed.insert(epoch, carried);

        let insta_finalized = !deposit_exists;
        if deposit_exists {
            let sqrt_deposits = economics::sqrt_of_total_deposits(
                self.total_curdyn_deposits_scaled(),
                self.total_prevdyn_deposits_scaled(),
                self.state.scale.factor_at(previous),
            );
            self.state.reward_factor = economics::reward_factor(
                self.config.base_interest_factor,
                self.config.base_penalty_factor,
                sqrt_deposits,
                esf,
            );
        } else {
            self.insta_finalize(previous);
            self.state.reward_factor = 0.0;
        }

        let dynasty_advanced =
            epoch >= self.config.genesis_epoch + 2 && self.is_finalized(epoch - 2);
        if dynasty_advanced {
            self.state.dynasties.advance(epoch);
        }

        if self.state.main_hash_justified {
            self.state.expected_source_epoch = previous;
        }
        self.state.main_hash_justified = false;

        debug!(
            "Epoch {}: collective reward {:.6}, reward factor {:.6}, scale factor {:.6}",
            epoch, collective_reward, self.state.reward_factor, deposit_scale_factor
        );
        info!(
            "Epoch {} initialized (dynasty {}, expected source {})",
            epoch,
            self.dynasty(),
            self.state.expected_source_epoch
        );

        Ok(EpochTransition {
            epoch,
            dynasty: self.dynasty(),
            dynasty_advanced,
            insta_finalized,
            collective_reward,
            reward_factor: self.state.reward_factor,
            deposit_scale_factor,
        })
    }

    /// Without stake in both dynasties nothing can vote, so the previous
    /// checkpoint is finalized directly to keep dynasties moving
    fn insta_finalize(&mut self, epoch: EpochNumber) {
        self.justify(epoch);
        self.finalize(epoch);
    }
}
