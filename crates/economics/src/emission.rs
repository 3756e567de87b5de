use crate::distribution::FeeSplitter;
use crate::errors::EconomicsError;
use crate::params::EmissionParams;
use brew_types::{Amount, BasisPoints, BlockHeight};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Lifecycle of the emission schedule. `Capped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum EmissionPhase {
    Emitting,
    Capped { at_block: BlockHeight },
}

/// Holds the emission rate, start block and lifetime counter, and
/// grants gross emission to settlements until the hard cap is reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionController {
    params: EmissionParams,
    #[serde(with = "brew_types::amount_serde")]
    configured_rate: Amount,
    start_block: BlockHeight,
    #[serde(with = "brew_types::amount_serde")]
    total_emitted: Amount,
    phase: EmissionPhase,
}

impl EmissionController {
    /// The initial rate is taken as-is; the ceiling applies to updates only.
    pub fn new(
        params: EmissionParams,
        rate_per_block: Amount,
        start_block: BlockHeight,
    ) -> Result<Self, EconomicsError> {
        params.validate()?;
        Ok(Self {
            params,
            configured_rate: rate_per_block,
            start_block,
            total_emitted: 0,
            phase: EmissionPhase::Emitting,
        })
    }

    pub fn params(&self) -> &EmissionParams {
        &self.params
    }

    /// Effective rate: zero forever once capped.
    pub fn rate_per_block(&self) -> Amount {
        match self.phase {
            EmissionPhase::Emitting => self.configured_rate,
            EmissionPhase::Capped { .. } => 0,
        }
    }

    /// Last rate stored by the owner, regardless of phase.
    pub fn configured_rate(&self) -> Amount {
        self.configured_rate
    }

    pub fn start_block(&self) -> BlockHeight {
        self.start_block
    }

    pub fn total_emitted(&self) -> Amount {
        self.total_emitted
    }

    pub fn hard_cap(&self) -> Amount {
        self.params.hard_cap
    }

    pub fn headroom(&self) -> Amount {
        self.params.hard_cap.saturating_sub(self.total_emitted)
    }

    pub fn phase(&self) -> EmissionPhase {
        self.phase
    }

    pub fn is_capped(&self) -> bool {
        matches!(self.phase, EmissionPhase::Capped { .. })
    }

    pub fn burn_fee_bps(&self) -> BasisPoints {
        self.params.burn_fee_bps
    }

    pub fn operator_cut_bps(&self) -> BasisPoints {
        self.params.operator_cut_bps
    }

    /// Fee splitter configured with the current percentages.
    pub fn splitter(&self) -> FeeSplitter {
        FeeSplitter::new(self.params.operator_cut_bps, self.params.burn_fee_bps)
    }

    /// Blocks eligible for emission between `last` and `current`.
    /// Nothing accrues before the start block.
    pub fn elapsed(&self, last: BlockHeight, current: BlockHeight) -> BlockHeight {
        let from = last.max(self.start_block);
        current.saturating_sub(from)
    }

    /// Gross emission scheduled for one pool over `elapsed` blocks,
    /// before the hard-cap clamp.
    pub fn scheduled_emission(
        &self,
        elapsed: BlockHeight,
        weight: u64,
        total_weight: u64,
    ) -> Result<Amount, EconomicsError> {
        if elapsed == 0 || weight == 0 || total_weight == 0 {
            return Ok(0);
        }
        self.rate_per_block()
            .checked_mul(elapsed as u128)
            .and_then(|v| v.checked_mul(weight as u128))
            .map(|v| v / total_weight as u128)
            .ok_or(EconomicsError::ArithmeticFault("scheduled emission overflow"))
    }

    /// What `claim` would grant for `requested`, without recording it.
    pub fn peek_available(&self, requested: Amount) -> Amount {
        if self.is_capped() {
            return 0;
        }
        requested.min(self.headroom())
    }

    /// Grant up to `requested` gross emission at block `at`.
    ///
    /// A request larger than the headroom is clamped and the phase is left
    /// alone; the next call then finds no headroom and caps. A request that
    /// exactly exhausts the headroom caps immediately.
    pub fn claim(&mut self, requested: Amount, at: BlockHeight) -> Result<Amount, EconomicsError> {
        if self.is_capped() {
            return Ok(0);
        }

        let remaining = self.headroom();
        if remaining == 0 {
            self.cap(at);
            return Ok(0);
        }

        let granted = requested.min(remaining);
        self.total_emitted = self
            .total_emitted
            .checked_add(granted)
            .ok_or(EconomicsError::ArithmeticFault("total_emitted overflow"))?;

        if requested == remaining {
            self.cap(at);
        } else if requested > remaining {
            debug!(
                target: "emission",
                requested,
                granted,
                "final emission clamped to remaining headroom"
            );
        }

        Ok(granted)
    }

    /// Store a new per-block rate. Rejected above the ceiling.
    /// Once capped the value is stored but the effective rate stays zero.
    pub fn update_rate(&mut self, new_rate: Amount) -> Result<Amount, EconomicsError> {
        if new_rate > self.params.max_rate_per_block {
            return Err(EconomicsError::InvalidRate {
                rate: new_rate,
                max: self.params.max_rate_per_block,
            });
        }

        let previous = self.configured_rate;
        self.configured_rate = new_rate;

        if self.is_capped() {
            debug!(
                target: "emission",
                new_rate,
                "rate stored after cap; effective rate remains zero"
            );
        } else {
            info!(target: "emission", previous, new_rate, "emission rate updated");
        }
        Ok(previous)
    }

    pub fn set_burn_fee(&mut self, bps: BasisPoints) -> Result<(), EconomicsError> {
        if bps > self.params.max_burn_fee_bps {
            return Err(EconomicsError::InvalidBurnFee {
                bps,
                max: self.params.max_burn_fee_bps,
            });
        }
        info!(
            target: "emission",
            previous = self.params.burn_fee_bps,
            bps,
            "burn fee updated"
        );
        self.params.burn_fee_bps = bps;
        Ok(())
    }

    fn cap(&mut self, at: BlockHeight) {
        self.phase = EmissionPhase::Capped { at_block: at };
        warn!(
            target: "emission",
            at_block = at,
            total_emitted = self.total_emitted,
            hard_cap = self.params.hard_cap,
            "hard cap reached; emission permanently disabled"
        );
    }
}
