//! Client-local projection of the vendor list.
//!
//! The list is replaced wholesale on every reload. Toggle phases live next
//! to it; a reload drops settled phases but keeps pending ones, and a
//! pending toggle's tentative value wins over the reloaded row.

use std::collections::HashMap;

use tokio::sync::RwLock;

use keliling_core::types::VendorId;
use keliling_entity::vendor::VendorSummary;

use crate::presence::state::{ToggleEvent, TogglePhase, reduce};

/// Load state of the list itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListPhase {
    #[default]
    Empty,
    Loading,
    Ready,
    Failed { message: String },
}

/// One rendered row.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewEntry {
    pub vendor: VendorSummary,
    /// A toggle for this vendor is in flight.
    pub updating: bool,
}

#[derive(Debug, Default)]
struct ViewState {
    phase: ListPhase,
    vendors: Vec<VendorSummary>,
    toggles: HashMap<VendorId, TogglePhase>,
}

/// Shared vendor list plus per-vendor toggle phases.
#[derive(Debug, Default)]
pub struct VendorListView {
    state: RwLock<ViewState>,
}

impl VendorListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn list_phase(&self) -> ListPhase {
        self.state.read().await.phase.clone()
    }

    pub async fn set_loading(&self) {
        self.state.write().await.phase = ListPhase::Loading;
    }

    /// Records a failed reload. The previous rows stay visible.
    pub async fn set_failed(&self, message: impl Into<String>) {
        self.state.write().await.phase = ListPhase::Failed {
            message: message.into(),
        };
    }

    /// Replaces the list with a fresh read.
    pub async fn replace(&self, mut vendors: Vec<VendorSummary>) {
        let mut state = self.state.write().await;
        state.toggles.retain(|_, phase| phase.is_pending());

        for vendor in &mut vendors {
            if let Some(online) = state.toggles.get(&vendor.id).and_then(TogglePhase::displayed) {
                vendor.online = online;
            }
        }

        state.vendors = vendors;
        state.phase = ListPhase::Ready;
    }

    /// Feeds a toggle event for `vendor_id` through the state machine.
    ///
    /// Returns the new phase, or `None` when the event was stale and
    /// nothing changed.
    pub async fn apply(&self, vendor_id: VendorId, event: ToggleEvent) -> Option<TogglePhase> {
        let mut state = self.state.write().await;
        let current = state.toggles.get(&vendor_id).copied().unwrap_or_default();
        if !current.accepts(&event) {
            return None;
        }

        let next = reduce(&current, event);
        state.toggles.insert(vendor_id, next);
        if let Some(online) = next.displayed()
            && let Some(vendor) = state.vendors.iter_mut().find(|v| v.id == vendor_id)
        {
            vendor.online = online;
        }
        Some(next)
    }

    pub async fn phase(&self, vendor_id: VendorId) -> TogglePhase {
        self.state
            .read()
            .await
            .toggles
            .get(&vendor_id)
            .copied()
            .unwrap_or_default()
    }

    /// The presence value currently shown for `vendor_id`.
    pub async fn online(&self, vendor_id: VendorId) -> Option<bool> {
        let state = self.state.read().await;
        state
            .toggles
            .get(&vendor_id)
            .and_then(TogglePhase::displayed)
            .or_else(|| {
                state
                    .vendors
                    .iter()
                    .find(|v| v.id == vendor_id)
                    .map(|v| v.online)
            })
    }

    pub async fn is_updating(&self, vendor_id: VendorId) -> bool {
        self.phase(vendor_id).await.is_pending()
    }

    pub async fn vendors(&self) -> Vec<VendorSummary> {
        self.state.read().await.vendors.clone()
    }

    pub async fn entries(&self) -> Vec<ViewEntry> {
        let state = self.state.read().await;
        state
            .vendors
            .iter()
            .map(|vendor| ViewEntry {
                vendor: vendor.clone(),
                updating: state
                    .toggles
                    .get(&vendor.id)
                    .is_some_and(TogglePhase::is_pending),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: VendorId, online: bool) -> VendorSummary {
        VendorSummary {
            id,
            name: "Bakso".to_string(),
            description: None,
            photo_url: None,
            location: None,
            online,
        }
    }

    #[tokio::test]
    async fn test_replace_marks_ready() {
        let view = VendorListView::new();
        assert_eq!(view.list_phase().await, ListPhase::Empty);
        let id = VendorId::new();
        view.replace(vec![summary(id, true)]).await;
        assert_eq!(view.list_phase().await, ListPhase::Ready);
        assert_eq!(view.online(id).await, Some(true));
    }

    #[tokio::test]
    async fn test_pending_survives_reload() {
        let view = VendorListView::new();
        let id = VendorId::new();
        view.replace(vec![summary(id, false)]).await;
        view.apply(
            id,
            ToggleEvent::Begin {
                current_known: false,
                seq: 1,
            },
        )
        .await;

        view.replace(vec![summary(id, false)]).await;
        assert_eq!(view.online(id).await, Some(true));
        assert!(view.entries().await[0].updating);
    }

    #[tokio::test]
    async fn test_settled_phase_dropped_on_reload() {
        let view = VendorListView::new();
        let id = VendorId::new();
        view.replace(vec![summary(id, false)]).await;
        view.apply(
            id,
            ToggleEvent::Begin {
                current_known: false,
                seq: 1,
            },
        )
        .await;
        view.apply(id, ToggleEvent::Failed { seq: 1 }).await;
        assert_eq!(view.online(id).await, Some(false));

        view.replace(vec![summary(id, true)]).await;
        assert_eq!(view.phase(id).await, TogglePhase::Idle);
        assert_eq!(view.online(id).await, Some(true));
    }

    #[tokio::test]
    async fn test_stale_event_returns_none() {
        let view = VendorListView::new();
        let id = VendorId::new();
        assert!(view.apply(id, ToggleEvent::Failed { seq: 9 }).await.is_none());
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_rows() {
        let view = VendorListView::new();
        let id = VendorId::new();
        view.replace(vec![summary(id, true)]).await;
        view.set_failed("Failed to list vendors").await;
        assert_eq!(view.vendors().await.len(), 1);
        assert!(matches!(view.list_phase().await, ListPhase::Failed { .. }));
    }
}
