//! # Transfer Mapping
//!
//! Turns a [`TransferTokensAction`] into particle groups: the sender's
//! unspent particles are consumed until they cover the amount, the
//! recipient gets one new particle and any excess returns to the sender.

use super::TokenDefinitionsState;
use crate::domain::{TransferError, TransferTokensAction};
use lc_02_atom_model::{MessageParticle, ParticleGroup, SpunParticle, TransferrableTokensParticle};
use shared_types::{NonNegativeAmount, PositiveAmount};
use tracing::debug;

/// Metadata key marking message particles attached to transfers.
pub const APPLICATION_KEY: &str = "application";

/// Application value of transfer attachments.
pub const MESSAGE_APPLICATION: &str = "message";

/// Maps transfers to particle groups against the sender's unspent tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransferTokensActionToParticleGroupsMapper;

impl TransferTokensActionToParticleGroupsMapper {
    /// Particle groups executing `action`.
    ///
    /// `unspent` holds particles currently up; only those owned by the
    /// sender and of the transferred token are considered.
    pub fn particle_groups(
        &self,
        action: &TransferTokensAction,
        unspent: &[TransferrableTokensParticle],
        definitions: &TokenDefinitionsState,
    ) -> Result<Vec<ParticleGroup>, TransferError> {
        let definition = definitions
            .definition(&action.rri)
            .ok_or_else(|| TransferError::UnknownToken(action.rri.clone()))?;
        if !action.amount.is_multiple_of(&definition.granularity) {
            return Err(TransferError::AmountNotMultipleOfGranularity {
                amount: action.amount,
                granularity: definition.granularity,
            });
        }

        let candidates: Vec<&TransferrableTokensParticle> = unspent
            .iter()
            .filter(|p| p.address == action.from && p.token_definition_reference == action.rri)
            .collect();

        let requested = NonNegativeAmount::from(action.amount);
        let mut consumed = Vec::new();
        let mut covered = NonNegativeAmount::ZERO;
        for particle in &candidates {
            if covered >= requested {
                break;
            }
            covered = covered.add(particle.amount)?;
            consumed.push(*particle);
        }
        if covered < requested {
            let current_balance = candidates
                .iter()
                .try_fold(NonNegativeAmount::ZERO, |sum, p| sum.add(p.amount))?;
            return Err(TransferError::InsufficientFunds {
                current_balance,
                requested: action.amount,
            });
        }

        let permissions = definition.permissions();
        let granularity = definition.granularity;
        let mut spun: Vec<SpunParticle> = consumed
            .iter()
            .map(|p| SpunParticle::down((*p).clone()))
            .collect();
        spun.push(SpunParticle::up(TransferrableTokensParticle::new(
            action.to.clone(),
            action.amount,
            action.rri.clone(),
            permissions,
            granularity,
        )?));
        let change = covered.subtract(requested)?;
        if !change.is_zero() {
            spun.push(SpunParticle::up(TransferrableTokensParticle::new(
                action.from.clone(),
                PositiveAmount::try_from(change)?,
                action.rri.clone(),
                permissions,
                granularity,
            )?));
        }
        debug!(
            rri = %action.rri,
            consumed = consumed.len(),
            change = %change,
            "Mapped transfer"
        );

        let mut groups = vec![ParticleGroup::new(spun)];
        if let Some(bytes) = &action.message {
            let message = MessageParticle::new(action.from.clone(), action.to.clone(), bytes.clone())
                .with_meta(APPLICATION_KEY, MESSAGE_APPLICATION);
            groups.push(ParticleGroup::new(vec![SpunParticle::up(message)]));
        }
        Ok(groups)
    }
}
