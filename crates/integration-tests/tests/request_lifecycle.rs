//! Request lifecycle against a real SQLite store

mod common;

use cctv_core::application::request::AttachmentSlot;
use cctv_core::application::ChangeKind;
use cctv_core::domain::{RequestStatus, TransitionPolicy};
use cctv_core::error::AppError;
use cctv_core::port::{NoopNotifier, RequestFilter};
use common::{
    file, memory_pool, rawai_draft, service, service_with, ChannelNotifier, FailingNotifier,
    LinkStore,
};
use regex::Regex;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_test::assert_ok;

#[tokio::test]
async fn test_rawai_beach_scenario() {
    let service = service().await;

    let tracking_id = service.submit(rawai_draft()).await.unwrap();
    let re = Regex::new(r"^REQ-\d{8}-\d{4}$").unwrap();
    assert!(re.is_match(tracking_id.as_str()), "{}", tracking_id);

    let request = service.lookup(tracking_id.as_str()).await.unwrap();
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.status_history.len(), 1);
    assert_eq!(request.incident.location, "Rawai Beach");
    assert_eq!(request.incident.coordinates.lat, 7.78);

    service
        .update_status(
            request.id.clone(),
            RequestStatus::Completed,
            Some("พบภาพเหตุการณ์".to_string()),
        )
        .await
        .unwrap();

    let request = service.lookup(tracking_id.as_str()).await.unwrap();
    assert_eq!(request.status, RequestStatus::Completed);
    assert_eq!(request.status_history.len(), 2);
    assert_eq!(request.status_history[1].note, "พบภาพเหตุการณ์");
    assert!(request.history_is_consistent());
}

#[tokio::test]
async fn test_missing_coordinates_writes_nothing() {
    let pool = memory_pool().await;
    let store = Arc::new(LinkStore::default());
    let service = service_with(
        pool,
        store.clone(),
        Arc::new(NoopNotifier),
        TransitionPolicy::Permissive,
    );

    let mut draft = rawai_draft();
    draft.incident.lng = None;
    draft.files = vec![file(AttachmentSlot::Scene, "scene.jpg")];

    let err = service.submit(draft).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "{err:?}");
    assert_eq!(store.uploads.load(Ordering::SeqCst), 0);
    assert!(service.list(&RequestFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_attachments_land_in_tracking_folder() {
    let service = service().await;

    let mut draft = rawai_draft();
    draft.files = vec![
        file(AttachmentSlot::IdCard, "id.jpg"),
        file(AttachmentSlot::Scene, "scene-1.jpg"),
        file(AttachmentSlot::Scene, "scene-2.jpg"),
    ];
    let tracking_id = service.submit(draft).await.unwrap();

    let request = service.lookup(tracking_id.as_str()).await.unwrap();
    let folder = format!("https://drive.example/{}/", tracking_id);
    assert!(request.attachments.id_card.unwrap().starts_with(&folder));
    assert!(request.attachments.report.is_none());
    assert_eq!(request.attachments.scene.len(), 2);
    assert!(request.attachments.scene[1].ends_with("scene-2.jpg"));
}

#[tokio::test]
async fn test_unknown_tracking_id_is_not_found() {
    let service = service().await;
    service.submit(rawai_draft()).await.unwrap();

    let err = service.lookup("REQ-19990101-0000").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_update_unknown_id_is_not_found() {
    let service = service().await;

    let err = service
        .update_status("no-such-id", RequestStatus::Verifying, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_each_update_appends_one_entry() {
    let service = service().await;
    let tracking_id = service.submit(rawai_draft()).await.unwrap();
    let id = service.lookup(tracking_id.as_str()).await.unwrap().id;

    let steps = [
        RequestStatus::Verifying,
        RequestStatus::Searching,
        RequestStatus::Completed,
    ];
    for (i, status) in steps.into_iter().enumerate() {
        service.update_status(id.clone(), status, None).await.unwrap();

        let request = service.get(&id).await.unwrap();
        assert_eq!(request.status_history.len(), i + 2);
        assert_eq!(
            request.status_history.last().unwrap().note,
            format!("Status changed to {}", status)
        );
    }

    let statuses: Vec<_> = service
        .get(&id)
        .await
        .unwrap()
        .status_history
        .iter()
        .map(|e| e.status)
        .collect();
    assert_eq!(
        statuses,
        vec![
            RequestStatus::Pending,
            RequestStatus::Verifying,
            RequestStatus::Searching,
            RequestStatus::Completed
        ]
    );
}

#[tokio::test]
async fn test_concurrent_updates_keep_both_notes() {
    let service = Arc::new(service().await);
    let tracking_id = service.submit(rawai_draft()).await.unwrap();
    let id = service.lookup(tracking_id.as_str()).await.unwrap().id;

    let a = {
        let service = service.clone();
        let id = id.clone();
        tokio::spawn(async move {
            service
                .update_status(id, RequestStatus::Verifying, Some("officer A".to_string()))
                .await
        })
    };
    let b = {
        let service = service.clone();
        let id = id.clone();
        tokio::spawn(async move {
            service
                .update_status(id, RequestStatus::Rejected, Some("officer B".to_string()))
                .await
        })
    };
    assert_ok!(a.await.unwrap());
    assert_ok!(b.await.unwrap());

    let request = service.get(&id).await.unwrap();
    assert_eq!(request.status_history.len(), 3);

    let notes: Vec<_> = request.status_history.iter().map(|e| e.note.as_str()).collect();
    assert!(notes.contains(&"officer A"));
    assert!(notes.contains(&"officer B"));

    // Last write wins
    assert_eq!(request.status, request.status_history[2].status);
}

#[tokio::test]
async fn test_strict_policy_rejects_skipping_steps() {
    let strict = service_with(
        memory_pool().await,
        Arc::new(LinkStore::default()),
        Arc::new(NoopNotifier),
        TransitionPolicy::Strict,
    );
    let tracking_id = strict.submit(rawai_draft()).await.unwrap();
    let id = strict.lookup(tracking_id.as_str()).await.unwrap().id;

    let err = strict
        .update_status(id.clone(), RequestStatus::Completed, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)), "{err:?}");
    assert_eq!(strict.get(&id).await.unwrap().status_history.len(), 1);

    assert_ok!(
        strict
            .update_status(id.clone(), RequestStatus::Verifying, None)
            .await
    );

    let permissive = service().await;
    let tracking_id = permissive.submit(rawai_draft()).await.unwrap();
    let id = permissive.lookup(tracking_id.as_str()).await.unwrap().id;
    assert_ok!(
        permissive
            .update_status(id, RequestStatus::Completed, None)
            .await
    );
}

#[tokio::test]
async fn test_notifier_receives_alert() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let service = service_with(
        memory_pool().await,
        Arc::new(LinkStore::default()),
        Arc::new(ChannelNotifier(tx)),
        TransitionPolicy::Permissive,
    );

    let tracking_id = service.submit(rawai_draft()).await.unwrap();

    let alert = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(alert.tracking_id, tracking_id.to_string());
    assert!(alert
        .fields
        .iter()
        .any(|(_, value)| value == "Rawai Beach"));
}

#[tokio::test]
async fn test_notifier_failure_does_not_fail_submission() {
    let service = service_with(
        memory_pool().await,
        Arc::new(LinkStore::default()),
        Arc::new(FailingNotifier),
        TransitionPolicy::Permissive,
    );

    let tracking_id = service.submit(rawai_draft()).await.unwrap();

    // Let the background alert run and fail
    tokio::task::yield_now().await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    let request = service.lookup(tracking_id.as_str()).await.unwrap();
    assert_eq!(request.status, RequestStatus::Pending);
}

#[tokio::test]
async fn test_stats_and_listing() {
    let service = service().await;

    let mut ids = Vec::new();
    for _ in 0..3 {
        let tracking_id = service.submit(rawai_draft()).await.unwrap();
        ids.push(service.lookup(tracking_id.as_str()).await.unwrap().id);
    }
    service
        .update_status(ids[0].clone(), RequestStatus::Rejected, None)
        .await
        .unwrap();

    let stats = service.stats().await.unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.count(RequestStatus::Pending), 2);
    assert_eq!(stats.count(RequestStatus::Rejected), 1);
    assert_eq!(stats.count(RequestStatus::Completed), 0);

    let pending = service
        .list(&RequestFilter {
            status: Some(RequestStatus::Pending),
            limit: None,
        })
        .await
        .unwrap();
    assert_eq!(pending.len(), 2);
    assert!(pending.iter().all(|r| r.status == RequestStatus::Pending));
}

#[tokio::test]
async fn test_change_feed_sees_every_write() {
    let service = service().await;
    let mut changes = service.subscribe();

    let tracking_id = service.submit(rawai_draft()).await.unwrap();
    let id = service.lookup(tracking_id.as_str()).await.unwrap().id;
    service
        .update_status(id.clone(), RequestStatus::Searching, None)
        .await
        .unwrap();

    let created = changes.recv().await.unwrap();
    assert_eq!(created.kind, ChangeKind::Created);
    assert_eq!(created.request_id, id);

    let changed = changes.recv().await.unwrap();
    assert_eq!(changed.kind, ChangeKind::StatusChanged);
    assert_eq!(changed.status, RequestStatus::Searching);
}

#[tokio::test]
async fn test_records_survive_pool_restart() {
    let path = std::env::temp_dir().join(format!(
        "cctv-restart-{}-{}.db",
        std::process::id(),
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    ));
    let url = format!("sqlite://{}", path.display());

    let tracking_id = {
        let pool = cctv_infra_sqlite::create_pool(&url).await.unwrap();
        cctv_infra_sqlite::run_migrations(&pool).await.unwrap();
        let service = service_with(
            pool.clone(),
            Arc::new(LinkStore::default()),
            Arc::new(NoopNotifier),
            TransitionPolicy::Permissive,
        );
        let tracking_id = service.submit(rawai_draft()).await.unwrap();
        pool.close().await;
        tracking_id
    };

    let pool = cctv_infra_sqlite::create_pool(&url).await.unwrap();
    cctv_infra_sqlite::run_migrations(&pool).await.unwrap();
    let service = service_with(
        pool.clone(),
        Arc::new(LinkStore::default()),
        Arc::new(NoopNotifier),
        TransitionPolicy::Permissive,
    );
    let request = service.lookup(tracking_id.as_str()).await.unwrap();
    assert_eq!(request.status_history.len(), 1);

    pool.close().await;
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
    }
}
