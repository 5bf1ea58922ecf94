use tracing::{debug, trace};

use crate::assets::{
    AssetReference, AssetStore, ResolvedAsset, Ticket, DEFAULT_EXTENSION, SLOTS_PER_CATEGORY,
};
use crate::rng::UniformSource;
use crate::wheel::Category;

/// What the envelope panel currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeView {
    /// `None` renders as `-`
    pub number: Option<u8>,
    /// Image being shown (or loading)
    pub asset: Option<AssetReference>,
    /// Set once the shown image has been confirmed present
    pub resolved: Option<ResolvedAsset>,
    /// "image missing" hint
    pub hint_visible: bool,
}

impl Default for EnvelopeView {
    fn default() -> Self {
        Self {
            number: None,
            asset: None,
            resolved: None,
            hint_visible: true,
        }
    }
}

/// Outcome of a single [`EnvelopePresenter::present`] call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    /// No level selected; nothing was requested
    Placeholder,
    Requested {
        ticket: Ticket,
        reference: AssetReference,
    },
}

/// The authoritative envelope of a landed spin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalPresentation {
    pub number: Option<u8>,
    pub reference: Option<AssetReference>,
    pub found: bool,
}

#[derive(Debug, Clone)]
struct Outstanding {
    ticket: Ticket,
    reference: AssetReference,
    number: Option<u8>,
    is_final: bool,
}

/// Picks an image from the selected level's pool for every number the wheel
/// shows and tracks whether it could be loaded.
pub struct EnvelopePresenter<R: UniformSource, S: AssetStore> {
    rng: R,
    store: S,
    extension: String,
    view: EnvelopeView,
    last_ticket: Ticket,
    outstanding: Option<Outstanding>,
    final_outcome: Option<FinalPresentation>,
}

impl<R: UniformSource, S: AssetStore> EnvelopePresenter<R, S> {
    pub fn new(rng: R, store: S) -> Self {
        Self::with_extension(rng, store, DEFAULT_EXTENSION)
    }

    pub fn with_extension(rng: R, store: S, extension: impl Into<String>) -> Self {
        Self {
            rng,
            store,
            extension: extension.into(),
            view: EnvelopeView::default(),
            last_ticket: 0,
            outstanding: None,
            final_outcome: None,
        }
    }

    pub fn view(&self) -> &EnvelopeView {
        &self.view
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Last landed envelope whose image lookup has completed
    pub fn final_outcome(&self) -> Option<&FinalPresentation> {
        self.final_outcome.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.outstanding.is_some()
    }

    pub fn show_number(&mut self, number: Option<u8>) {
        self.view.number = number;
    }

    /// Draw a fresh image for `category`. Any earlier lookup still in flight
    /// is superseded.
    pub fn present(&mut self, category: Option<Category>, is_final: bool) -> Presentation {
        let Some(category) = category else {
            self.view.asset = None;
            self.view.resolved = None;
            self.view.hint_visible = true;
            self.outstanding = None;
            if is_final {
                self.final_outcome = Some(FinalPresentation {
                    number: self.view.number,
                    reference: None,
                    found: false,
                });
            }
            return Presentation::Placeholder;
        };

        let slot = self.rng.below(SLOTS_PER_CATEGORY);
        let reference = AssetReference::new(category, slot, self.extension.as_str());
        self.last_ticket += 1;
        let ticket = self.last_ticket;

        if is_final {
            debug!(ticket, locator = %reference.locator().display(), "final envelope requested");
        }

        self.view.asset = Some(reference.clone());
        self.view.resolved = None;
        self.store.request(ticket, &reference);
        self.outstanding = Some(Outstanding {
            ticket,
            reference: reference.clone(),
            number: self.view.number,
            is_final,
        });

        Presentation::Requested { ticket, reference }
    }

    /// Apply lookups that have completed. Only the newest request counts;
    /// older outcomes are dropped. Returns how many outcomes were applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        for (ticket, outcome) in self.store.drain() {
            let is_current = self
                .outstanding
                .as_ref()
                .is_some_and(|o| o.ticket == ticket);
            if !is_current {
                trace!(ticket, "dropping superseded asset lookup");
                continue;
            }
            let Some(request) = self.outstanding.take() else {
                continue;
            };

            let found = match outcome {
                Ok(asset) => {
                    self.view.hint_visible = false;
                    self.view.resolved = Some(asset);
                    true
                }
                Err(e) => {
                    debug!(error = %e, "envelope image unavailable");
                    self.view.asset = None;
                    self.view.resolved = None;
                    self.view.hint_visible = true;
                    false
                }
            };

            if request.is_final {
                self.final_outcome = Some(FinalPresentation {
                    number: request.number,
                    reference: Some(request.reference),
                    found,
                });
            }
            applied += 1;
        }
        applied
    }
}
