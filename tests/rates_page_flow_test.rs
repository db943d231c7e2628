use freight_rates::core::list::ListBody;
use freight_rates::core::tabs::TabInit;
use freight_rates::domain::ports::{Notification, NotificationLevel, Notifier};
use freight_rates::{
    InMemoryBackend, NoopPreparer, RateDetails, RateFilter, RateRepository, RateType, RatesPage,
    Tab,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct RecordingNotifier {
    seen: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    fn last(&self) -> Option<Notification> {
        self.seen.lock().unwrap().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
    }
}

type Page = RatesPage<InMemoryBackend, RecordingNotifier, NoopPreparer>;

fn page_for(backend: &InMemoryBackend) -> (Page, RecordingNotifier) {
    let notifier = RecordingNotifier::default();
    let page = RatesPage::new(
        RateRepository::new(backend.clone()),
        notifier.clone(),
        NoopPreparer,
    );
    (page, notifier)
}

fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn test_missing_required_field_makes_no_backend_call() {
    let backend = InMemoryBackend::signed_in("user-1");
    let (mut page, notifier) = page_for(&backend);

    page.switch_tab(Tab::Form(RateType::Sea)).await;
    let saved = page
        .save(&form(&[("destination_port", "USNYC"), ("price", "1200")]))
        .await;

    assert!(saved.is_none());
    assert_eq!(backend.calls(), 0);
    let note = notifier.last().unwrap();
    assert_eq!(note.level, NotificationLevel::Warning);
    assert_eq!(note.message, "Origin port is required");
}

#[tokio::test]
async fn test_saved_sea_rate_comes_back_with_id_and_timestamp() {
    let backend = InMemoryBackend::signed_in("user-1");
    let (mut page, notifier) = page_for(&backend);

    let saved = page
        .save(&form(&[
            ("origin_port", "TRPOT"),
            ("destination_port", "USNYC"),
            ("price", "1200"),
        ]))
        .await
        .unwrap();
    assert_eq!(
        notifier.last().unwrap(),
        Notification::success("Sea Freight rate saved")
    );

    let loaded = page.repository().load(RateFilter::All).await.unwrap();
    assert_eq!(loaded.len(), 1);
    let record = &loaded[0];
    assert_eq!(record, &saved);
    assert!(!record.id.as_str().is_empty());
    assert_eq!(record.user_id, "user-1");
    assert_eq!(record.rate.price, 1200.0);
    assert_eq!(
        record.rate.details,
        RateDetails::Sea {
            origin_port: "TRPOT".to_string(),
            destination_port: "USNYC".to_string(),
            container_type: None,
            incoterm: None,
        }
    );
}

#[tokio::test]
async fn test_my_rates_lists_only_own_rates_newest_first_and_filters() {
    let backend = InMemoryBackend::signed_in("user-1");
    let (mut page, _) = page_for(&backend);

    page.switch_tab(Tab::Form(RateType::Sea)).await;
    let first = page
        .save(&form(&[("origin_port", "TRPOT"), ("destination_port", "USNYC")]))
        .await
        .unwrap();

    page.switch_tab(Tab::Form(RateType::Customs)).await;
    let second = page
        .save(&form(&[("country", "TR"), ("price", "150")]))
        .await
        .unwrap();

    // someone else's rate in the same table
    backend.sign_in("user-2").await;
    let (mut other_page, _) = page_for(&backend);
    other_page
        .save(&form(&[("origin_port", "NLRTM"), ("destination_port", "CNSHA")]))
        .await
        .unwrap();
    backend.sign_in("user-1").await;

    let transition = page.switch_tab(Tab::MyRates).await;
    assert_eq!(transition.init, TabInit::RefreshList);

    let view = page.last_view().unwrap();
    let ids: Vec<&str> = view.rows().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);
    assert_eq!(view.counts.total, 2);
    assert_eq!(view.counts.get(RateType::Sea), 1);
    assert_eq!(view.counts.get(RateType::Customs), 1);

    let sea = page.set_filter(RateFilter::Only(RateType::Sea)).await.unwrap();
    assert_eq!(sea.rows().len(), 1);
    assert!(sea.rows().iter().all(|r| r.rate_type == RateType::Sea));
    assert_eq!(page.list_state().filter, RateFilter::Only(RateType::Sea));

    let terminal = page
        .set_filter(RateFilter::Only(RateType::Terminal))
        .await
        .unwrap();
    assert!(matches!(terminal.body, ListBody::Placeholder { .. }));
}

#[tokio::test]
async fn test_deleted_rate_disappears_from_list() {
    let backend = InMemoryBackend::signed_in("user-1");
    let (mut page, notifier) = page_for(&backend);

    page.switch_tab(Tab::Form(RateType::Terminal)).await;
    let keep = page.save(&form(&[("port", "TRMER")])).await.unwrap();
    let gone = page
        .save(&form(&[("port", "TRAMB"), ("included_services", "THC")]))
        .await
        .unwrap();

    assert!(page.delete(&gone.id).await);
    assert_eq!(notifier.last().unwrap(), Notification::success("Rate deleted"));

    let view = page.last_view().unwrap();
    let ids: Vec<&str> = view.rows().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec![keep.id.as_str()]);

    let loaded = page.repository().load(RateFilter::All).await.unwrap();
    assert!(loaded.iter().all(|r| r.id != gone.id));
}

#[tokio::test]
async fn test_signed_out_user_gets_error_notification() {
    let backend = InMemoryBackend::new();
    let (mut page, notifier) = page_for(&backend);

    let saved = page.save(&form(&[("origin_port", "TRPOT"), ("destination_port", "USNYC")])).await;
    assert!(saved.is_none());
    let note = notifier.last().unwrap();
    assert_eq!(note.level, NotificationLevel::Error);
    assert_eq!(note.message, "Please sign in to manage your rates.");

    page.switch_tab(Tab::MyRates).await;
    assert!(page.last_view().is_none());
    assert_eq!(backend.table_calls(), 0);
}

#[tokio::test]
async fn test_store_error_message_reaches_notification() {
    let backend = InMemoryBackend::signed_in("user-1");
    let (mut page, notifier) = page_for(&backend);
    backend.fail_with("relation \"freight_rates\" does not exist").await;

    assert!(page.save(&form(&[("country", "TR")])).await.is_none());
    // the sea form is active, so this is a validation failure, not a store one
    assert_eq!(notifier.last().unwrap().level, NotificationLevel::Warning);

    page.switch_tab(Tab::Form(RateType::Customs)).await;
    assert!(page.save(&form(&[("country", "TR")])).await.is_none());
    let note = notifier.last().unwrap();
    assert_eq!(note.level, NotificationLevel::Error);
    assert!(note.message.contains("relation \"freight_rates\" does not exist"));

    assert!(!page.delete(&"missing".parse().unwrap()).await);
}

#[tokio::test]
async fn test_tab_switch_changes_exactly_one_visible_tab() {
    let backend = InMemoryBackend::signed_in("user-1");
    let (mut page, _) = page_for(&backend);

    assert_eq!(page.tabs().active(), Tab::Form(RateType::Sea));
    let transition = page.switch_tab(Tab::Form(RateType::OnCarriage)).await;

    assert_eq!(transition.deactivated, Some(Tab::Form(RateType::Sea)));
    assert_eq!(transition.activated, Tab::Form(RateType::OnCarriage));
    assert_eq!(
        page.tabs().visible_tabs(),
        vec![Tab::Form(RateType::OnCarriage)]
    );
    assert!(!page.tabs().is_visible(Tab::Form(RateType::Sea)));
}
