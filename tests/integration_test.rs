// Integration tests for settings persistence and end-to-end shift editing

mod fixtures;

use std::sync::atomic::Ordering;

use chrono::Duration;
use egui::{Pos2, Vec2};
use pretty_assertions::assert_eq;
use shift_calendar::interaction::gesture::{GestureConfig, GestureEffect, GestureInterpreter, PointerEvent};
use shift_calendar::layout::geometry::{AnchorTable, GeometryResolver};
use shift_calendar::models::settings::Settings;
use shift_calendar::models::shift::ShiftFlag;
use shift_calendar::services::auth::TokenStore;
use shift_calendar::services::reconcile::{CreateFlow, Navigation, NoticeLevel, ReconciliationController};
use shift_calendar::services::settings::{AppPaths, SettingsService};
use tempfile::TempDir;

use fixtures::{dates, FakeShiftService};

fn service() -> FakeShiftService {
    FakeShiftService::with_accounts(&[("alice", "pw", false), ("boss", "root", true)])
}

async fn signed_in(service: &FakeShiftService, user: &str, password: &str) -> ReconciliationController {
    let mut controller =
        ReconciliationController::new(Settings::default(), TokenStore::in_memory(), dates::wednesday());
    controller.login(service, user, password).await;
    assert_eq!(controller.take_navigation(), Some(Navigation::Week));
    let request = controller.refresh();
    controller.run(service, request).await;
    controller
}

#[test]
fn test_settings_persistence() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let paths = AppPaths::in_dir(dir.path());
    let settings_service = SettingsService::new(paths.settings_file.clone());

    // Get default settings
    let mut settings = settings_service.get().expect("Failed to get settings");
    assert_eq!(settings, Settings::default());

    // Update settings to simulate a user pointing at another server
    settings.server_url = "https://shifts.example.org".to_string();
    settings.first_day_of_week = 1;
    settings.default_shift_minutes = 120;
    settings_service.update(&settings).expect("Failed to update settings");

    // Verify persistence by reading again through a fresh service
    let reloaded = SettingsService::new(paths.settings_file)
        .get()
        .expect("Failed to load settings");
    assert_eq!(reloaded, settings);
}

#[tokio::test]
async fn test_wrong_password_stays_on_login() {
    let service = service();
    let mut controller =
        ReconciliationController::new(Settings::default(), TokenStore::in_memory(), dates::wednesday());

    controller.login(&service, "alice", "nope").await;

    assert_eq!(controller.take_navigation(), None);
    assert!(controller.identity().is_none());
    let notices = controller.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_create_then_drag_shift() {
    let service = service();
    let mut alice = signed_in(&service, "alice", "pw").await;
    assert_eq!(alice.week_start(), dates::week_start());
    assert!(alice.shifts().is_empty());

    // Wednesday 09:00, default one hour
    let Some(CreateFlow::Submit(request)) = alice.click_empty_cell(18, 3) else {
        panic!("plain users create directly");
    };
    alice.run(&service, Some(request)).await;

    assert_eq!(alice.shifts().len(), 1);
    let created = alice.shifts()[0].clone();
    assert_eq!(created.start_time, dates::at(dates::wednesday(), 9, 0));
    assert_eq!(created.end_time, dates::at(dates::wednesday(), 10, 0));
    assert_eq!(alice.lanes().lane_of(created.id), Some(0));

    // Drag one day later and half an hour down
    let moved = created
        .with_times(
            created.start_time + Duration::days(1) + Duration::minutes(30),
            created.end_time + Duration::days(1) + Duration::minutes(30),
        )
        .unwrap();
    let request = alice.prepare_commit(&created, moved.clone());
    alice.run(&service, request).await;

    assert_eq!(alice.shift(created.id), Some(&moved));
    assert_eq!(service.stored(), vec![moved]);
    assert!(alice.take_notices().is_empty());
}

#[tokio::test]
async fn test_pointer_drag_reaches_the_service() {
    let service = service();
    let mut alice = signed_in(&service, "alice", "pw").await;
    let Some(CreateFlow::Submit(request)) = alice.click_empty_cell(18, 3) else {
        panic!("plain users create directly");
    };
    alice.run(&service, Some(request)).await;
    let created = alice.shifts()[0].clone();

    // 100 px columns, 20 px half-hour slots
    let mut resolver = GeometryResolver::new(alice.settings());
    resolver.install(AnchorTable::uniform(Pos2::ZERO, 100.0, 0.0, 20.0).unwrap());
    let segments = resolver.resolve(&created, alice.lanes());
    assert_eq!(segments.len(), 1);

    let mut interpreter = GestureInterpreter::new(created.id, GestureConfig::from_settings(alice.settings()));
    let press = segments[0].rect.center();
    let target = press + Vec2::new(100.0, 20.0);
    let mut effects = Vec::new();
    for event in [
        PointerEvent::Down { pos: press },
        PointerEvent::Move { pos: target },
        PointerEvent::Up { pos: target },
    ] {
        effects.extend(interpreter.handle(event, &created, &segments, &resolver));
    }
    let Some(GestureEffect::Commit { original, updated }) = effects.pop() else {
        panic!("a drag across a column commits");
    };
    assert_eq!(original, created);

    let request = alice.prepare_commit(&original, updated);
    alice.run(&service, request).await;

    let offset = Duration::days(1) + Duration::minutes(30);
    let stored = service.stored();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].start_time, created.start_time + offset);
    assert_eq!(stored[0].end_time, created.end_time + offset);
    assert_eq!(service.updates.load(Ordering::SeqCst), 1);
    assert_eq!(alice.shift(created.id), Some(&stored[0]));
}

#[tokio::test]
async fn test_permitted_shift_is_locked_for_owner() {
    let service = service();
    let mut alice = signed_in(&service, "alice", "pw").await;
    if let Some(CreateFlow::Submit(request)) = alice.click_empty_cell(20, 2) {
        alice.run(&service, Some(request)).await;
    }
    let id = alice.shifts()[0].id;

    let mut boss = signed_in(&service, "boss", "root").await;
    assert_eq!(boss.shifts().len(), 1);
    let request = boss.prepare_flag(id, ShiftFlag::Permitted);
    boss.run(&service, request).await;
    assert!(boss.shift(id).unwrap().permitted);

    let request = alice.refresh();
    alice.run(&service, request).await;
    let locked = alice.shift(id).unwrap().clone();
    assert!(locked.permitted);

    let attempted = locked
        .with_times(locked.start_time + Duration::hours(1), locked.end_time + Duration::hours(1))
        .unwrap();
    assert!(alice.prepare_commit(&locked, attempted).is_none());

    // Rejected locally: nothing sent, shift back where it was, user told why
    assert_eq!(service.updates.load(Ordering::SeqCst), 0);
    assert_eq!(alice.shift(id), Some(&locked));
    let notices = alice.take_notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].blocking);

    // Absence can still be recorded once permitted
    let request = alice.prepare_flag(id, ShiftFlag::Absent);
    alice.run(&service, request).await;
    assert!(service.stored()[0].absent);
}

#[tokio::test]
async fn test_admin_creates_shift_for_someone_else() {
    let service = service();
    let mut boss = signed_in(&service, "boss", "root").await;
    let request = boss.prepare_list_users();
    boss.run(&service, request).await;
    assert_eq!(boss.users().len(), 2);

    let Some(CreateFlow::PickAssignee(picker)) = boss.click_empty_cell(16, 0) else {
        panic!("admins pick an assignee");
    };
    let request = boss.choose_assignee(picker, "alice");
    boss.run(&service, request).await;

    let stored = service.stored();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].username, "alice");
    assert_eq!(stored[0].created_by, "boss");
}
