use indoc::indoc;
use snap_desk::constants::{CUSTOM_WORKSPACES_STORAGE_KEY, WORKSPACE_METADATA_STORAGE_KEY};
use snap_desk::layout::{LayoutType, Rect, ZoneId};
use snap_desk::persistence::MemoryBackend;
use snap_desk::window::{EntityId, WindowId, WindowManager};
use snap_desk::{Command, DesktopConfig};

fn hn() -> WindowId {
    WindowId::new("hacker-news")
}

fn todo() -> WindowId {
    WindowId::new("todo-list")
}

fn desktop_on(backend: &MemoryBackend) -> WindowManager {
    WindowManager::new(DesktopConfig::default(), Box::new(backend.clone()))
}

#[test]
fn builtin_preset_places_and_raises_apps() {
    let mut wm = desktop_on(&MemoryBackend::new());
    wm.dispatch(Command::ApplyWorkspace("main".into()));

    let hn_rec = wm.windows().get(&hn()).unwrap();
    let todo_rec = wm.windows().get(&todo()).unwrap();
    assert_eq!(hn_rec.rect(), Rect::new(50.0, 50.0, 900.0, 600.0));
    assert_eq!(todo_rec.rect(), Rect::new(400.0, 100.0, 500.0, 800.0));
    assert!(hn_rec.visible && todo_rec.visible);
    assert!(todo_rec.z_index > hn_rec.z_index);
}

#[test]
fn applying_a_preset_dissolves_existing_folders() {
    let mut wm = desktop_on(&MemoryBackend::new());
    wm.dispatch(Command::Launch(hn()));
    wm.dispatch(Command::Launch(todo()));
    wm.dispatch(Command::SnapToZone(EntityId::Window(hn()), ZoneId::HalfLeft));
    wm.dispatch(Command::SnapToZone(EntityId::Window(todo()), ZoneId::HalfLeft));
    assert_eq!(wm.folders().len(), 1);

    wm.dispatch(Command::ApplyWorkspace("interview".into()));
    assert!(wm.folders().is_empty());
    assert!(wm.windows().iter().all(|record| record.visible));
}

#[test]
fn unknown_preset_is_a_no_op() {
    let mut wm = desktop_on(&MemoryBackend::new());
    let before = wm.snapshot();
    wm.dispatch(Command::ApplyWorkspace("does-not-exist".into()));
    assert_eq!(wm.snapshot(), before);
}

#[test]
fn custom_preset_skips_missing_apps_and_builds_folders() {
    let backend = MemoryBackend::new();
    backend.seed(
        CUSTOM_WORKSPACES_STORAGE_KEY,
        indoc! {r#"
            {
              "focus": {
                "apps": [
                  {"id": "deleted-app", "position": {"x": 0, "y": 0}, "size": {"width": 300, "height": 300}}
                ],
                "folders": [
                  {"apps": ["deleted-app", "todo-list", "hacker-news"], "activeAppId": "hacker-news",
                   "position": {"x": 60, "y": 70}, "size": {"width": 900, "height": 700}}
                ],
                "layoutType": "quarters"
              },
              "broken": {"apps": 42}
            }
        "#},
    );
    let mut wm = desktop_on(&backend);
    wm.dispatch(Command::ApplyWorkspace("focus".into()));

    assert_eq!(wm.folders().len(), 1);
    let folder = wm.folders().iter().next().unwrap();
    assert_eq!(folder.apps, vec![todo(), hn()]);
    assert_eq!(folder.active_app_id, hn());
    assert_eq!(folder.rect(), Rect::new(60.0, 70.0, 900.0, 700.0));
    assert!(wm.windows().iter().all(|record| !record.visible));
    assert_eq!(wm.layout_type(), Some(LayoutType::Quarters));
    assert_eq!(wm.zones().len(), 4);

    let before = wm.snapshot();
    wm.dispatch(Command::ApplyWorkspace("broken".into()));
    assert_eq!(wm.snapshot(), before);
}

#[test]
fn saved_workspace_restores_arrangement() {
    let backend = MemoryBackend::new();
    let mut wm = desktop_on(&backend);
    wm.dispatch(Command::SetLayoutType(Some(LayoutType::Thirds)));
    wm.dispatch(Command::Launch(hn()));
    wm.dispatch(Command::SnapToZone(EntityId::Window(hn()), ZoneId::ThirdLeft));
    let saved_rect = wm.windows().get(&hn()).unwrap().rect();
    wm.dispatch(Command::SaveWorkspace {
        key: "reading".into(),
        name: "Reading".into(),
    });
    assert_eq!(backend.writes_for(CUSTOM_WORKSPACES_STORAGE_KEY), 1);
    assert_eq!(backend.writes_for(WORKSPACE_METADATA_STORAGE_KEY), 1);

    wm.dispatch(Command::ApplyWorkspace("nexus".into()));
    wm.dispatch(Command::SetLayoutType(None));
    assert_ne!(wm.windows().get(&hn()).unwrap().rect(), saved_rect);

    // a fresh desktop on the same store sees the saved preset
    drop(wm);
    let mut wm = desktop_on(&backend);
    assert_eq!(wm.workspaces().metadata()[0].name, "Reading");
    wm.dispatch(Command::ApplyWorkspace("reading".into()));
    assert_eq!(wm.windows().get(&hn()).unwrap().rect(), saved_rect);
    assert!(!wm.windows().get(&todo()).unwrap().visible);
    assert_eq!(wm.layout_type(), Some(LayoutType::Thirds));
}

#[test]
fn saved_workspace_keeps_folders() {
    let backend = MemoryBackend::new();
    let mut wm = desktop_on(&backend);
    wm.dispatch(Command::Launch(hn()));
    wm.dispatch(Command::Launch(todo()));
    wm.dispatch(Command::SnapToZone(EntityId::Window(hn()), ZoneId::HalfRight));
    wm.dispatch(Command::SnapToZone(EntityId::Window(todo()), ZoneId::HalfRight));
    let folder_id = wm.folders().iter().next().unwrap().id.clone();
    wm.dispatch(Command::FolderTabSwitch(folder_id.clone(), todo()));
    wm.dispatch(Command::SaveWorkspace {
        key: "paired".into(),
        name: "Paired".into(),
    });
    wm.dispatch(Command::FolderQuit(folder_id));
    assert!(wm.folders().is_empty());

    wm.dispatch(Command::ApplyWorkspace("paired".into()));
    let folder = wm.folders().iter().next().unwrap();
    assert_eq!(folder.apps, vec![hn(), todo()]);
    assert_eq!(folder.active_app_id, todo());
    assert!(wm.windows().iter().all(|record| !record.visible));
}
