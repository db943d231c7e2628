use crate::core::list::{self, ListState, RateListView};
use crate::core::repository::RateRepository;
use crate::core::tabs::{Tab, TabController, TabInit, TabTransition};
use crate::core::form::collect;
use crate::core::{BackendClient, FormSource};
use crate::domain::model::{RateFilter, RateId, RateType, StoredRate};
use crate::domain::ports::{FormPreparer, Notification, Notifier};
use crate::utils::error::{ErrorCategory, RateError};

/// For surfaces without dropdowns or date pickers (CLI, tests).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPreparer;

impl FormPreparer for NoopPreparer {
    fn populate_dropdowns(&mut self, _rate_type: RateType) {}
    fn apply_default_dates(&mut self, _rate_type: RateType) {}
}

/// Event handlers of the rates page. Every failure ends as a notification;
/// callers only see `None`/`false` for operations that did not go through.
pub struct RatesPage<B: BackendClient, N: Notifier, P: FormPreparer> {
    repository: RateRepository<B>,
    tabs: TabController,
    list_state: ListState,
    last_view: Option<RateListView>,
    notifier: N,
    preparer: P,
}

impl<B: BackendClient, N: Notifier, P: FormPreparer> RatesPage<B, N, P> {
    pub fn new(repository: RateRepository<B>, notifier: N, preparer: P) -> Self {
        Self {
            repository,
            tabs: TabController::default(),
            list_state: ListState::default(),
            last_view: None,
            notifier,
            preparer,
        }
    }

    pub fn repository(&self) -> &RateRepository<B> {
        &self.repository
    }

    pub fn tabs(&self) -> &TabController {
        &self.tabs
    }

    pub fn list_state(&self) -> ListState {
        self.list_state
    }

    pub fn last_view(&self) -> Option<&RateListView> {
        self.last_view.as_ref()
    }

    pub fn preparer(&self) -> &P {
        &self.preparer
    }

    fn report(&self, err: &RateError) {
        let message = err.user_friendly_message();
        let notification = match err.category() {
            ErrorCategory::Validation => {
                tracing::warn!("Rejected input: {}", err);
                Notification::warning(message)
            }
            category => {
                tracing::error!("Operation failed ({:?}): {}", category, err);
                Notification::error(message)
            }
        };
        self.notifier.notify(notification);
    }

    pub async fn switch_tab(&mut self, target: Tab) -> TabTransition {
        let transition = self.tabs.switch_to(target);
        match transition.init {
            TabInit::PrepareForm(rate_type) => {
                self.preparer.populate_dropdowns(rate_type);
                self.preparer.apply_default_dates(rate_type);
            }
            TabInit::RefreshList => {
                self.refresh().await;
            }
        }
        transition
    }

    /// Saves the active form tab's fields as a new rate.
    pub async fn save<F: FormSource + ?Sized>(&mut self, form: &F) -> Option<StoredRate> {
        let Some(rate_type) = self.tabs.active().rate_type() else {
            self.report(&RateError::validation(
                "tab",
                "Open one of the rate forms before saving",
            ));
            return None;
        };

        let rate = match collect(rate_type, form) {
            Ok(rate) => rate,
            Err(e) => {
                self.report(&e);
                return None;
            }
        };

        match self.repository.save(&rate).await {
            Ok(stored) => {
                self.notifier
                    .notify(Notification::success(format!("{} rate saved", rate_type.label())));
                Some(stored)
            }
            Err(e) => {
                self.report(&e);
                None
            }
        }
    }

    /// Re-renders the list with the current filter. On failure the previous
    /// view is kept.
    pub async fn refresh(&mut self) -> Option<&RateListView> {
        let rendered = list::render(&self.repository, &self.list_state).await;
        match rendered {
            Ok(view) => {
                self.last_view = Some(view);
                self.last_view.as_ref()
            }
            Err(e) => {
                self.report(&e);
                None
            }
        }
    }

    pub async fn set_filter(&mut self, filter: RateFilter) -> Option<&RateListView> {
        self.list_state = ListState { filter };
        self.refresh().await
    }

    pub async fn delete(&mut self, id: &RateId) -> bool {
        if let Err(e) = self.repository.delete(id).await {
            self.report(&e);
            return false;
        }
        self.notifier.notify(Notification::success("Rate deleted"));
        self.refresh().await;
        true
    }
}
