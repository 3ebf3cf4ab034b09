use std::mem;
use std::time::Instant;

use super::stacking::next_z;
use super::{
    DesktopEvent, EntityId, Folder, FolderId, FolderRegistry, GeometryPatch,
    InteractionController, Release, WindowId, WindowRecord, WindowRegistry, ZIndex,
};
use crate::config::{DesktopConfig, default_apps};
use crate::layout::floating::{HitRegion, hit_region};
use crate::layout::{
    LayoutType, Point, Rect, Viewport, Zone, ZoneId, rect_hit, zone_rect_for, zones_for_layout,
};
use crate::persistence::{PersistenceStore, Snapshot, StorageBackend, merge_defaults};
use crate::workspace::{FolderPreset, WorkspaceAppConfig, WorkspaceConfig, WorkspaceLibrary};

/// Everything the surrounding UI may ask of the desktop.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Launch(WindowId),
    Minimize(WindowId),
    Quit(WindowId),
    Focus(WindowId),
    DockClick(WindowId),
    UpdateGeometry(WindowId, GeometryPatch),
    ApplyWorkspace(String),
    ArrangeFocused(ZoneId),
    SnapToZone(EntityId, ZoneId),
    FolderTabSwitch(FolderId, WindowId),
    FolderQuit(FolderId),
    FolderMinimize(FolderId),
    FocusFolder(FolderId),
    UpdateFolderGeometry(FolderId, GeometryPatch),
    SetLayoutType(Option<LayoutType>),
    SetViewport(Viewport),
    SaveWorkspace { key: String, name: String },
}

/// Render data for one folder frame.
#[derive(Debug)]
pub struct FolderView<'a> {
    pub folder: &'a Folder,
    /// Member whose content is drawn.
    pub active: &'a WindowRecord,
    /// Members in tab order.
    pub tabs: Vec<&'a WindowRecord>,
}

/// Single owner of the desktop state.
///
/// Registries are only mutated through [`WindowManager::dispatch`] (or the
/// named command methods) and the pointer entry points. Every mutation
/// schedules a debounced snapshot write; the host drives the debounce with
/// [`WindowManager::tick`].
pub struct WindowManager {
    config: DesktopConfig,
    windows: WindowRegistry,
    folders: FolderRegistry,
    store: PersistenceStore,
    workspaces: WorkspaceLibrary,
    interaction: InteractionController,
    zones: Vec<Zone>,
    events: Vec<DesktopEvent>,
}

impl WindowManager {
    pub fn new(config: DesktopConfig, backend: Box<dyn StorageBackend>) -> Self {
        Self::with_catalogue(config, backend, default_apps())
    }

    /// Start from the last saved snapshot, merged with `catalogue`. A missing
    /// or unreadable snapshot falls back to `catalogue` alone.
    pub fn with_catalogue(
        config: DesktopConfig,
        backend: Box<dyn StorageBackend>,
        catalogue: Vec<WindowRecord>,
    ) -> Self {
        let store = PersistenceStore::with_delay(backend, config.save_debounce);
        let (windows, folders) = match store.load() {
            Some(Snapshot {
                windows,
                mut folders,
            }) => {
                let mut windows = merge_defaults(windows, &folders, &catalogue);
                repair_loaded(&mut windows, &mut folders);
                tracing::info!(
                    windows = windows.len(),
                    folders = folders.len(),
                    "restored desktop"
                );
                (windows, folders)
            }
            None => {
                tracing::info!("no saved desktop; using defaults");
                (
                    WindowRegistry::from_records(catalogue),
                    FolderRegistry::new(),
                )
            }
        };
        let workspaces = WorkspaceLibrary::load(&store);
        let zones = compute_zones(&config);
        Self {
            config,
            windows,
            folders,
            store,
            workspaces,
            interaction: InteractionController::new(),
            zones,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &DesktopConfig {
        &self.config
    }

    pub fn windows(&self) -> &WindowRegistry {
        &self.windows
    }

    pub fn folders(&self) -> &FolderRegistry {
        &self.folders
    }

    pub fn workspaces(&self) -> &WorkspaceLibrary {
        &self.workspaces
    }

    /// Active zones; empty when layout mode is off.
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn layout_type(&self) -> Option<LayoutType> {
        self.config.layout
    }

    pub fn interaction(&self) -> &InteractionController {
        &self.interaction
    }

    pub fn live_rect(&self) -> Option<Rect> {
        self.interaction.live_rect()
    }

    pub fn hovered_zone(&self) -> Option<ZoneId> {
        self.interaction.hovered_zone()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            windows: self.windows.clone(),
            folders: self.folders.clone(),
        }
    }

    pub fn has_pending_save(&self) -> bool {
        self.store.has_pending()
    }

    /// When the host should next call [`WindowManager::tick`].
    pub fn next_deadline(&self) -> Option<Instant> {
        self.store.deadline()
    }

    pub fn take_events(&mut self) -> Vec<DesktopEvent> {
        mem::take(&mut self.events)
    }

    pub fn dispatch(&mut self, command: Command) {
        tracing::debug!(?command, "dispatch");
        match command {
            Command::Launch(id) => self.launch(&id),
            Command::Minimize(id) => self.minimize(&id),
            Command::Quit(id) => self.quit(&id),
            Command::Focus(id) => self.focus(&id),
            Command::DockClick(id) => self.dock_click(&id),
            Command::UpdateGeometry(id, patch) => self.update_geometry(&id, patch),
            Command::ApplyWorkspace(key) => self.apply_workspace(&key),
            Command::ArrangeFocused(zone) => self.arrange_focused(zone),
            Command::SnapToZone(entity, zone) => self.snap_to_zone(&entity, zone),
            Command::FolderTabSwitch(folder, member) => self.folder_tab_switch(&folder, &member),
            Command::FolderQuit(folder) => self.folder_quit(&folder),
            Command::FolderMinimize(folder) => self.folder_minimize(&folder),
            Command::FocusFolder(folder) => self.focus_folder(&folder),
            Command::UpdateFolderGeometry(folder, patch) => {
                self.update_folder_geometry(&folder, patch)
            }
            Command::SetLayoutType(layout) => self.set_layout_type(layout),
            Command::SetViewport(viewport) => self.set_viewport(viewport),
            Command::SaveWorkspace { key, name } => self.save_workspace(&key, &name),
        }
    }

    // -- window lifecycle ---------------------------------------------------

    /// Open (or re-open) a window on top. A folder member brings its folder
    /// forward with that tab active instead.
    pub fn launch(&mut self, id: &WindowId) {
        if !self.known_window(id, "launch") {
            return;
        }
        if self.focus_via_folder(id) {
            return;
        }
        let z = self.next_z();
        self.windows.launch(id, z);
        tracing::debug!(window_id = %id, z, "launched");
        self.schedule_save();
    }

    pub fn minimize(&mut self, id: &WindowId) {
        if !self.known_window(id, "minimize") {
            return;
        }
        self.drop_interaction_for(&EntityId::Window(id.clone()));
        self.windows.minimize(id);
        self.schedule_save();
    }

    /// Close a window. A folder member leaves its folder first; a folder left
    /// without members is deleted.
    pub fn quit(&mut self, id: &WindowId) {
        if !self.known_window(id, "quit") {
            return;
        }
        self.drop_interaction_for(&EntityId::Window(id.clone()));
        if let Some(folder_id) = self.folders.folder_of(id).map(|f| f.id.clone()) {
            let emptied = self
                .folders
                .get_mut(&folder_id)
                .is_some_and(|folder| folder.remove_member(id));
            if emptied {
                tracing::debug!(folder_id = %folder_id, "last member quit; removing folder");
                self.remove_folder(&folder_id);
            }
        }
        self.windows.quit(id);
        self.schedule_save();
    }

    /// Raise to the top of the stacking order. Geometry is untouched.
    pub fn focus(&mut self, id: &WindowId) {
        if !self.known_window(id, "focus") {
            return;
        }
        if self.focus_via_folder(id) {
            return;
        }
        let z = self.next_z();
        self.windows.set_z(id, z);
        self.schedule_save();
    }

    /// Dock icon click: launch a closed app, reveal a hidden one, or focus a
    /// visible one.
    pub fn dock_click(&mut self, id: &WindowId) {
        let Some(flags) = self
            .windows
            .get(id)
            .map(|record| (record.launched, record.visible))
        else {
            tracing::debug!(window_id = %id, "dock click on unknown window");
            return;
        };
        if self.focus_via_folder(id) {
            return;
        }
        match flags {
            (false, _) => self.launch(id),
            (true, false) => {
                tracing::debug!(window_id = %id, "revealing hidden window");
                self.launch(id);
            }
            (true, true) => self.focus(id),
        }
    }

    pub fn update_geometry(&mut self, id: &WindowId, patch: GeometryPatch) {
        if patch.is_empty() {
            return;
        }
        if self.windows.update_geometry(id, patch) {
            self.schedule_save();
        } else {
            tracing::debug!(window_id = %id, "geometry update for unknown window");
        }
    }

    // -- folders ------------------------------------------------------------

    pub fn focus_folder(&mut self, id: &FolderId) {
        let z = self.next_z();
        let Some(folder) = self.folders.get_mut(id) else {
            tracing::debug!(folder_id = %id, "focus on unknown folder");
            return;
        };
        folder.z_index = z;
        self.schedule_save();
    }

    /// Change the rendered tab. Visibility and geometry are untouched.
    pub fn folder_tab_switch(&mut self, id: &FolderId, member: &WindowId) {
        let Some(folder) = self.folders.get_mut(id) else {
            tracing::debug!(folder_id = %id, "tab switch on unknown folder");
            return;
        };
        if !folder.set_active(member) {
            tracing::debug!(folder_id = %id, window_id = %member, "tab switch to non-member");
            return;
        }
        self.schedule_save();
    }

    /// Dissolve the folder and show every member again.
    pub fn folder_quit(&mut self, id: &FolderId) {
        let Some(folder) = self.remove_folder(id) else {
            tracing::debug!(folder_id = %id, "quit on unknown folder");
            return;
        };
        // Active member is raised last so it ends up frontmost.
        let mut order: Vec<&WindowId> = folder
            .apps
            .iter()
            .filter(|member| **member != folder.active_app_id)
            .collect();
        order.push(&folder.active_app_id);
        for member in order {
            let z = self.next_z();
            self.windows.launch(member, z);
        }
        tracing::debug!(folder_id = %id, members = folder.apps.len(), "folder dissolved");
        self.schedule_save();
    }

    /// Delete the folder record only. Members stay hidden and come back one at
    /// a time through the dock.
    pub fn folder_minimize(&mut self, id: &FolderId) {
        let Some(folder) = self.remove_folder(id) else {
            tracing::debug!(folder_id = %id, "minimize on unknown folder");
            return;
        };
        tracing::info!(
            folder_id = %id,
            members = folder.apps.len(),
            "folder minimized; members remain hidden"
        );
        self.schedule_save();
    }

    pub fn update_folder_geometry(&mut self, id: &FolderId, patch: GeometryPatch) {
        if patch.is_empty() {
            return;
        }
        let Some(folder) = self.folders.get_mut(id) else {
            tracing::debug!(folder_id = %id, "geometry update for unknown folder");
            return;
        };
        folder.apply_geometry(patch);
        self.schedule_save();
    }

    /// Render data for a folder, or `None` if its active member no longer
    /// exists.
    pub fn folder_view(&self, id: &FolderId) -> Option<FolderView<'_>> {
        let folder = self.folders.get(id)?;
        let Some(active) = self.windows.get(&folder.active_app_id) else {
            tracing::warn!(
                folder_id = %id,
                window_id = %folder.active_app_id,
                "folder active member missing; not rendering"
            );
            return None;
        };
        let tabs = folder
            .apps
            .iter()
            .filter_map(|member| self.windows.get(member))
            .collect();
        Some(FolderView {
            folder,
            active,
            tabs,
        })
    }

    // -- layout and snapping ------------------------------------------------

    pub fn set_layout_type(&mut self, layout: Option<LayoutType>) {
        self.config.layout = layout;
        self.zones = compute_zones(&self.config);
        self.interaction.rezone(&self.zones, &mut self.events);
        tracing::debug!(?layout, zones = self.zones.len(), "layout mode changed");
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.config.viewport = viewport;
        self.zones = compute_zones(&self.config);
        self.interaction.rezone(&self.zones, &mut self.events);
    }

    /// Place `entity` into `zone`, merging into a folder when the zone is
    /// already occupied.
    ///
    /// Occupancy is decided by stored origins within the collision tolerance
    /// of the zone origin. A folder is only ever repositioned; a window joins
    /// an occupying folder, forms a new folder with an occupying visible
    /// window, or is moved into the zone.
    pub fn snap_to_zone(&mut self, entity: &EntityId, zone: ZoneId) {
        let target = zone_rect_for(zone, self.config.viewport, self.config.zone_padding);
        match entity {
            EntityId::Folder(folder_id) => {
                let Some(folder) = self.folders.get_mut(folder_id) else {
                    tracing::debug!(folder_id = %folder_id, "snap of unknown folder");
                    return;
                };
                folder.apply_geometry(GeometryPatch::rect(target));
                tracing::debug!(folder_id = %folder_id, zone = %zone, "folder snapped");
            }
            EntityId::Window(window_id) => {
                if !self.known_window(window_id, "snap") {
                    return;
                }
                if self.folders.folder_of(window_id).is_some() {
                    tracing::debug!(window_id = %window_id, "snap of folder member ignored");
                    return;
                }
                self.snap_window(window_id, zone, target);
            }
        }
        self.schedule_save();
    }

    /// String boundary of [`WindowManager::snap_to_zone`]. Unknown zone names
    /// leave everything where it was.
    pub fn snap_to_zone_named(&mut self, entity: &EntityId, zone: &str) {
        match zone.parse::<ZoneId>() {
            Ok(zone) => self.snap_to_zone(entity, zone),
            Err(err) => tracing::debug!(entity = %entity, error = %err, "snap ignored"),
        }
    }

    fn snap_window(&mut self, id: &WindowId, zone: ZoneId, target: Rect) {
        let origin = target.position();
        let tolerance = self.config.collision_tolerance;

        let occupying_folder = self
            .folders
            .iter()
            .find(|folder| folder.position.near(origin, tolerance))
            .map(|folder| folder.id.clone());
        if let Some(folder_id) = occupying_folder {
            if let Some(folder) = self.folders.get_mut(&folder_id) {
                folder.push_member(id.clone());
            }
            self.windows.hide_in_folder(id);
            tracing::info!(window_id = %id, folder_id = %folder_id, zone = %zone, "joined folder");
            return;
        }

        let occupying_window = self
            .windows
            .iter()
            .find(|record| {
                record.id != *id && record.visible && record.position.near(origin, tolerance)
            })
            .map(|record| record.id.clone());
        if let Some(other) = occupying_window {
            let z = self.next_z();
            let members = vec![other.clone(), id.clone()];
            if let Some(folder) = Folder::new(FolderId::generate(), members, target, z) {
                tracing::info!(
                    folder_id = %folder.id,
                    zone = %zone,
                    first = %other,
                    second = %id,
                    "created folder"
                );
                self.folders.insert(folder);
            }
            self.windows.hide_in_folder(&other);
            self.windows.hide_in_folder(id);
            return;
        }

        self.windows.update_geometry(id, GeometryPatch::rect(target));
        tracing::debug!(window_id = %id, zone = %zone, "window snapped");
    }

    /// Move the frontmost visible window or folder into `zone` without any
    /// merge.
    pub fn arrange_focused(&mut self, zone: ZoneId) {
        let Some(entity) = self.focused_entity() else {
            tracing::debug!(zone = %zone, "nothing to arrange");
            return;
        };
        let patch = GeometryPatch::rect(zone_rect_for(
            zone,
            self.config.viewport,
            self.config.zone_padding,
        ));
        match &entity {
            EntityId::Window(id) => {
                self.windows.update_geometry(id, patch);
            }
            EntityId::Folder(id) => {
                if let Some(folder) = self.folders.get_mut(id) {
                    folder.apply_geometry(patch);
                }
            }
        }
        tracing::debug!(entity = %entity, zone = %zone, "arranged");
        self.schedule_save();
    }

    // -- workspaces ---------------------------------------------------------

    /// Copy a preset into the live registries. Apps the preset names but the
    /// registry lacks are skipped; folders are rebuilt from the preset.
    pub fn apply_workspace(&mut self, key: &str) {
        let Some(preset) = self.workspaces.resolve(key) else {
            tracing::debug!(workspace = %key, "unknown workspace");
            return;
        };
        self.interaction.cancel(&mut self.events);

        let dissolved = self.folders.clear();
        if !dissolved.is_empty() {
            tracing::debug!(folders = dissolved.len(), "dissolved folders for workspace");
        }

        let ids: Vec<WindowId> = self.windows.ids().cloned().collect();
        for id in &ids {
            if !preset.apps.iter().any(|app| &app.id == id) {
                self.windows.minimize(id);
            }
        }

        for app in &preset.apps {
            if !self.windows.contains(&app.id) {
                tracing::debug!(workspace = %key, window_id = %app.id, "workspace app missing; skipped");
                continue;
            }
            self.windows.update_geometry(&app.id, GeometryPatch::rect(app.rect()));
            let z = self.next_z();
            self.windows.launch(&app.id, z);
        }

        for preset_folder in &preset.folders {
            self.build_preset_folder(preset_folder);
        }

        if let Some(layout) = preset.layout_type {
            self.set_layout_type(Some(layout));
        }
        tracing::info!(workspace = %key, "workspace applied");
        self.schedule_save();
    }

    fn build_preset_folder(&mut self, preset: &FolderPreset) {
        let members: Vec<WindowId> = preset
            .apps
            .iter()
            .filter(|id| self.windows.contains(id))
            .cloned()
            .collect();
        let z = self.next_z();
        let Some(mut folder) = Folder::new(FolderId::generate(), members, preset.rect(), z) else {
            tracing::debug!("workspace folder has no live members; skipped");
            return;
        };
        if let Some(active) = &preset.active_app_id {
            folder.set_active(active);
        }
        for member in &folder.apps {
            self.windows.hide_in_folder(member);
        }
        self.folders.insert(folder);
    }

    /// Store the current visible arrangement as a custom preset. Written
    /// immediately, not debounced.
    pub fn save_workspace(&mut self, key: &str, name: &str) {
        let apps = self
            .windows
            .iter()
            .filter(|record| record.visible)
            .map(|record| WorkspaceAppConfig {
                id: record.id.clone(),
                position: record.position,
                size: record.size,
            })
            .collect();
        let folders = self
            .folders
            .iter()
            .map(|folder| FolderPreset {
                apps: folder.apps.clone(),
                active_app_id: Some(folder.active_app_id.clone()),
                position: folder.position,
                size: folder.size,
            })
            .collect();
        let config = WorkspaceConfig {
            apps,
            folders,
            layout_type: self.config.layout,
            icon: None,
        };
        match self.workspaces.save(&mut self.store, key, name, config) {
            Ok(()) => tracing::info!(workspace = %key, "workspace saved"),
            Err(err) => tracing::warn!(workspace = %key, error = %err, "failed to save workspace"),
        }
    }

    // -- pointer input ------------------------------------------------------

    /// Pointer-down anywhere on the desktop. Focuses the topmost surface
    /// under `point`, then switches tab or starts a drag/resize depending on
    /// the region hit. Returns `false` when nothing was hit.
    pub fn pointer_down(&mut self, point: Point) -> bool {
        let Some((entity, rect)) = self.hit_test(point) else {
            return false;
        };
        let region = match &entity {
            EntityId::Window(id) => {
                self.focus(id);
                hit_region(rect, point, 0)
            }
            EntityId::Folder(id) => {
                self.focus_folder(id);
                let tabs = self.folders.get(id).map_or(0, |folder| folder.apps.len());
                hit_region(rect, point, tabs)
            }
        };
        if let (EntityId::Folder(folder_id), HitRegion::TabStrip { member: Some(idx) }) =
            (&entity, region)
            && let Some(member) = self
                .folders
                .get(folder_id)
                .and_then(|folder| folder.apps.get(idx))
                .cloned()
        {
            self.folder_tab_switch(folder_id, &member);
            return true;
        }
        self.interaction.begin(entity, rect, region, point);
        true
    }

    /// Pointer-down when the caller has already resolved the surface and
    /// region. Returns `false` if nothing started.
    pub fn pointer_down_on(&mut self, entity: EntityId, region: HitRegion, point: Point) -> bool {
        let Some(rect) = self.entity_rect(&entity) else {
            tracing::debug!(entity = %entity, "pointer-down on unknown surface");
            return false;
        };
        self.interaction.begin(entity, rect, region, point)
    }

    pub fn pointer_move(&mut self, point: Point) {
        self.interaction
            .pointer_move(point, &self.zones, &mut self.events);
    }

    pub fn pointer_up(&mut self) {
        match self.interaction.pointer_up(&mut self.events) {
            None => {}
            Some(Release::DroppedOnZone { entity, zone }) => self.snap_to_zone(&entity, zone),
            Some(Release::Commit { entity, patch }) => match entity {
                EntityId::Window(id) => self.update_geometry(&id, patch),
                EntityId::Folder(id) => self.update_folder_geometry(&id, patch),
            },
        }
    }

    fn hit_test(&self, point: Point) -> Option<(EntityId, Rect)> {
        self.display_order()
            .into_iter()
            .rev()
            .filter_map(|entity| {
                let rect = self.stored_rect(&entity)?;
                Some((entity, rect))
            })
            .find(|(_, rect)| rect_hit(*rect, point))
    }

    // -- queries ------------------------------------------------------------

    /// Visible windows and all folders, back to front.
    pub fn display_order(&self) -> Vec<EntityId> {
        let mut entries: Vec<(ZIndex, EntityId)> = self
            .windows
            .iter()
            .filter(|record| record.visible)
            .map(|record| (record.z_index, EntityId::Window(record.id.clone())))
            .chain(
                self.folders
                    .iter()
                    .map(|folder| (folder.z_index, EntityId::Folder(folder.id.clone()))),
            )
            .collect();
        entries.sort_by_key(|(z, _)| *z);
        entries.into_iter().map(|(_, entity)| entity).collect()
    }

    /// Frontmost visible surface.
    pub fn focused_entity(&self) -> Option<EntityId> {
        self.display_order().pop()
    }

    /// Geometry to draw `entity` with: the live mirror while it is being
    /// dragged or resized, the stored geometry otherwise.
    pub fn entity_rect(&self, entity: &EntityId) -> Option<Rect> {
        if self.interaction.entity() == Some(entity)
            && let Some(live) = self.interaction.live_rect()
        {
            return Some(live);
        }
        self.stored_rect(entity)
    }

    fn stored_rect(&self, entity: &EntityId) -> Option<Rect> {
        match entity {
            EntityId::Window(id) => self.windows.get(id).map(WindowRecord::rect),
            EntityId::Folder(id) => self.folders.get(id).map(Folder::rect),
        }
    }

    // -- persistence --------------------------------------------------------

    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    /// Write the pending snapshot if its debounce deadline is at or before
    /// `now`.
    pub fn tick_at(&mut self, now: Instant) -> bool {
        self.store.poll(now)
    }

    /// End any interaction and flush the pending snapshot.
    pub fn shutdown(&mut self) {
        self.interaction.cancel(&mut self.events);
        self.store.flush_pending();
    }

    fn schedule_save(&mut self) {
        let snapshot = self.snapshot();
        self.store.debounced_save(snapshot, Instant::now());
    }

    // -- helpers ------------------------------------------------------------

    fn next_z(&self) -> ZIndex {
        next_z(&self.windows, &self.folders)
    }

    fn known_window(&self, id: &WindowId, op: &'static str) -> bool {
        let known = self.windows.contains(id);
        if !known {
            tracing::debug!(window_id = %id, op, "unknown window; ignored");
        }
        known
    }

    /// If `id` belongs to a folder, raise the folder with `id` as the active
    /// tab. Returns `true` when handled.
    fn focus_via_folder(&mut self, id: &WindowId) -> bool {
        let Some(folder_id) = self.folders.folder_of(id).map(|f| f.id.clone()) else {
            return false;
        };
        let z = self.next_z();
        if let Some(folder) = self.folders.get_mut(&folder_id) {
            folder.set_active(id);
            folder.z_index = z;
        }
        tracing::debug!(window_id = %id, folder_id = %folder_id, "focused through folder");
        self.schedule_save();
        true
    }

    fn remove_folder(&mut self, id: &FolderId) -> Option<Folder> {
        self.drop_interaction_for(&EntityId::Folder(id.clone()));
        self.folders.remove(id)
    }

    /// Abandon an interaction whose surface is going away.
    fn drop_interaction_for(&mut self, entity: &EntityId) {
        if self.interaction.entity() != Some(entity) {
            return;
        }
        tracing::debug!(entity = %entity, "surface removed mid-interaction");
        self.interaction.cancel(&mut self.events);
    }
}

impl Drop for WindowManager {
    fn drop(&mut self) {
        self.store.flush_pending();
    }
}

impl std::fmt::Debug for WindowManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowManager")
            .field("windows", &self.windows.len())
            .field("folders", &self.folders.len())
            .field("layout", &self.config.layout)
            .field("interaction", &self.interaction)
            .finish()
    }
}

fn compute_zones(config: &DesktopConfig) -> Vec<Zone> {
    config
        .layout
        .map(|layout| zones_for_layout(layout, config.viewport, config.zone_padding))
        .unwrap_or_default()
}

/// Bring a loaded snapshot back in line with the registry invariants:
/// folder members must exist, folders must be non-empty, the active member
/// must be a member, members are hidden, and nothing visible is unlaunched.
fn repair_loaded(windows: &mut WindowRegistry, folders: &mut FolderRegistry) {
    folders.retain(|folder| {
        let before = folder.apps.len();
        folder.apps.retain(|member| windows.contains(member));
        if folder.apps.len() != before {
            tracing::warn!(folder_id = %folder.id, "dropped missing folder members");
        }
        let Some(first) = folder.apps.first().cloned() else {
            tracing::warn!(folder_id = %folder.id, "discarding empty folder");
            return false;
        };
        if !folder.contains(&folder.active_app_id) {
            tracing::warn!(folder_id = %folder.id, "resetting orphaned active member");
            folder.active_app_id = first;
        }
        true
    });

    let members: Vec<WindowId> = folders
        .iter()
        .flat_map(|folder| folder.apps.iter().cloned())
        .collect();
    for member in &members {
        windows.hide_in_folder(member);
    }

    let orphaned: Vec<(WindowId, ZIndex)> = windows
        .iter()
        .filter(|record| record.visible && !record.launched)
        .map(|record| (record.id.clone(), record.z_index))
        .collect();
    for (id, z) in orphaned {
        windows.launch(&id, z);
    }
}
