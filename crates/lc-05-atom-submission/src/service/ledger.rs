//! # In-Memory Ledger State
//!
//! Particles the client has seen. A particle is unspent when it has been
//! seen up and never seen down, whatever the order the two arrived in.
//!
//! Observers get a `watch` per address (token balances) and one for token
//! definitions. Both are re-reduced from the up particles after every
//! change and only notified when the projection differs.

use crate::ports::LedgerState;
use lc_02_atom_model::{Atom, Particle, Spin, SpunParticle, TransferrableTokensParticle};
use lc_03_reduction::{
    ParticleReducer, ReductionError, TokenBalanceReducer, TokenBalances, TokenDefinitionsReducer,
    TokenDefinitionsState,
};
use parking_lot::{Mutex, RwLock};
use shared_types::Address;
use std::collections::{BTreeSet, HashMap, HashSet};
use tokio::sync::watch;
use tracing::{trace, warn};

#[derive(Debug, Default)]
struct ParticleSet {
    up: Vec<Particle>,
    consumed: HashSet<Particle>,
}

impl ParticleSet {
    /// Returns whether the set changed.
    fn apply(&mut self, spun: &SpunParticle) -> bool {
        match spun.spin {
            Spin::Up => {
                if self.consumed.contains(&spun.particle) {
                    trace!(particle = spun.particle.serializer(), "Up particle already consumed");
                    return false;
                }
                if self.up.contains(&spun.particle) {
                    return false;
                }
                self.up.push(spun.particle.clone());
                true
            }
            Spin::Down => {
                if !self.consumed.insert(spun.particle.clone()) {
                    return false;
                }
                if let Some(index) = self.up.iter().position(|p| *p == spun.particle) {
                    self.up.swap_remove(index);
                } else {
                    trace!(particle = spun.particle.serializer(), "Down particle seen before up");
                }
                true
            }
        }
    }

    fn spun_up(&self, filter: impl Fn(&Particle) -> bool) -> Vec<SpunParticle> {
        self.up
            .iter()
            .filter(|&p| filter(p))
            .cloned()
            .map(SpunParticle::up)
            .collect()
    }
}

/// Ledger view, updated as particles and atoms are applied.
#[derive(Debug)]
pub struct InMemoryLedgerState {
    particles: RwLock<ParticleSet>,
    balance_watchers: Mutex<HashMap<Address, watch::Sender<TokenBalances>>>,
    definitions: watch::Sender<TokenDefinitionsState>,
}

impl Default for InMemoryLedgerState {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLedgerState {
    /// Empty ledger.
    #[must_use]
    pub fn new() -> Self {
        let (definitions, _) = watch::channel(TokenDefinitionsState::default());
        Self {
            particles: RwLock::new(ParticleSet::default()),
            balance_watchers: Mutex::new(HashMap::new()),
            definitions,
        }
    }

    /// Apply one spun particle.
    pub fn apply(&self, spun: &SpunParticle) {
        let changed = self.particles.write().apply(spun);
        if changed {
            self.notify(&spun.particle.addresses());
        }
    }

    /// Apply every particle of `atom`, notifying observers once.
    pub fn apply_atom(&self, atom: &Atom) {
        let mut touched = BTreeSet::new();
        {
            let mut particles = self.particles.write();
            for spun in atom.spun_particles() {
                if particles.apply(spun) {
                    touched.extend(spun.particle.addresses());
                }
            }
        }
        if !touched.is_empty() {
            self.notify(&touched);
        }
    }

    /// Number of up particles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.read().up.len()
    }

    /// Whether nothing is up.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.read().up.is_empty()
    }

    /// Balances of every holder.
    pub fn balances(&self) -> Result<TokenBalances, ReductionError> {
        TokenBalanceReducer.reduce_all(&self.particles.read().spun_up(|_| true))
    }

    /// Balances held by `address`, recomputed whenever its particles change.
    pub fn observe_balances(&self, address: &Address) -> watch::Receiver<TokenBalances> {
        let mut watchers = self.balance_watchers.lock();
        if let Some(sender) = watchers.get(address) {
            return sender.subscribe();
        }
        let initial = self.balances_at(address).unwrap_or_else(|e| {
            warn!(address = %address, error = %e, "Cannot reduce balances");
            TokenBalances::default()
        });
        let (sender, receiver) = watch::channel(initial);
        watchers.insert(address.clone(), sender);
        receiver
    }

    /// Token definitions, recomputed whenever particles change.
    #[must_use]
    pub fn observe_token_definitions(&self) -> watch::Receiver<TokenDefinitionsState> {
        self.definitions.subscribe()
    }

    fn balances_at(&self, address: &Address) -> Result<TokenBalances, ReductionError> {
        let spun = self
            .particles
            .read()
            .spun_up(|p| p.addresses().contains(address));
        TokenBalanceReducer.reduce_all(&spun)
    }

    fn notify(&self, touched: &BTreeSet<Address>) {
        {
            let mut watchers = self.balance_watchers.lock();
            watchers.retain(|_, sender| !sender.is_closed());
            for address in touched {
                let Some(sender) = watchers.get(address) else {
                    continue;
                };
                match self.balances_at(address) {
                    Ok(balances) => {
                        sender.send_if_modified(|current| {
                            if *current == balances {
                                return false;
                            }
                            *current = balances;
                            true
                        });
                    }
                    Err(e) => warn!(address = %address, error = %e, "Cannot reduce balances"),
                }
            }
        }

        let definitions = self.token_definitions();
        self.definitions.send_if_modified(|current| {
            if *current == definitions {
                return false;
            }
            *current = definitions;
            true
        });
    }
}

impl LedgerState for InMemoryLedgerState {
    fn unspent_tokens(&self, owner: &Address) -> Vec<TransferrableTokensParticle> {
        self.particles
            .read()
            .up
            .iter()
            .filter_map(Particle::as_transferrable)
            .filter(|tokens| &tokens.address == owner)
            .cloned()
            .collect()
    }

    fn token_definitions(&self) -> TokenDefinitionsState {
        let spun = self.particles.read().spun_up(|_| true);
        match TokenDefinitionsReducer.reduce_all(&spun) {
            Ok(state) => state,
            Err(never) => match never {},
        }
    }
}
