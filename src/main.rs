use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, terminal};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout, Rect as CellRect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Clear, Paragraph};
use ratatui::{Frame, Terminal};

use snap_desk::layout::{LayoutType, Point, Rect, Viewport};
use snap_desk::persistence::FileBackend;
use snap_desk::window::{DesktopEvent, EntityId, WindowManager};
use snap_desk::{Command, DesktopConfig, tracing_sub};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);
const SAVED_WORKSPACE_KEY: &str = "custom";

#[derive(Parser, Debug)]
#[command(
    name = "snap-desk",
    version = env!("CARGO_PKG_VERSION"),
    about = "Terminal desktop with snap zones, tabbed folders and workspaces"
)]
struct DeskCli {
    /// Directory holding the persisted desktop state.
    #[arg(long = "state-dir", value_name = "DIR", default_value = ".snap-desk")]
    state_dir: PathBuf,

    /// Width of one terminal cell in desktop pixels.
    #[arg(long = "cell-width", value_name = "PX", default_value_t = 8.0)]
    cell_width: f64,

    /// Height of one terminal cell in desktop pixels.
    #[arg(long = "cell-height", value_name = "PX", default_value_t = 16.0)]
    cell_height: f64,

    /// Snap layout to start with (halves, thirds, quarters, two-quarters-left).
    #[arg(short = 'l', long = "layout", value_name = "LAYOUT")]
    layout: Option<String>,

    /// Log file. Defaults to `snap-desk.log` inside the state directory.
    #[arg(long = "log-file", value_name = "FILE")]
    log_file: Option<PathBuf>,
}

struct DeskConfig {
    state_dir: PathBuf,
    cell: CellSize,
    layout: Option<LayoutType>,
    log_file: PathBuf,
}

impl TryFrom<&DeskCli> for DeskConfig {
    type Error = String;

    fn try_from(cli: &DeskCli) -> Result<Self, Self::Error> {
        if !(1.0..=64.0).contains(&cli.cell_width) || !(1.0..=64.0).contains(&cli.cell_height) {
            return Err("cell size must be between 1 and 64 pixels".to_string());
        }
        let layout = cli
            .layout
            .as_deref()
            .map(str::parse::<LayoutType>)
            .transpose()
            .map_err(|err| err.to_string())?;
        let log_file = cli
            .log_file
            .clone()
            .unwrap_or_else(|| cli.state_dir.join("snap-desk.log"));
        Ok(Self {
            state_dir: cli.state_dir.clone(),
            cell: CellSize {
                width: cli.cell_width,
                height: cli.cell_height,
            },
            layout,
            log_file,
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct CellSize {
    width: f64,
    height: f64,
}

impl CellSize {
    fn viewport(self, area: CellRect) -> Viewport {
        Viewport::new(
            f64::from(area.width) * self.width,
            f64::from(area.height) * self.height,
        )
    }

    /// Desktop point at the centre of a terminal cell.
    fn point(self, column: u16, row: u16) -> Point {
        Point::new(
            (f64::from(column) + 0.5) * self.width,
            (f64::from(row) + 0.5) * self.height,
        )
    }

    /// Cells covered by `rect`, clipped to `area`.
    fn cells(self, rect: Rect, area: CellRect) -> Option<CellRect> {
        let x0 = (rect.x / self.width).floor().max(0.0);
        let y0 = (rect.y / self.height).floor().max(0.0);
        let x1 = (rect.right() / self.width).ceil().min(f64::from(area.width));
        let y1 = (rect.bottom() / self.height).ceil().min(f64::from(area.height));
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(CellRect {
            x: area.x + x0 as u16,
            y: area.y + y0 as u16,
            width: (x1 - x0) as u16,
            height: (y1 - y0) as u16,
        })
    }
}

fn main() -> io::Result<()> {
    let args = DeskCli::parse();
    let config = DeskConfig::try_from(&args)
        .map_err(|msg| io::Error::new(io::ErrorKind::InvalidInput, msg))?;

    std::fs::create_dir_all(&config.state_dir)?;
    tracing_sub::init_default(Some(&config.log_file))?;

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        cursor::Hide
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    let result = run(&mut terminal, &config);

    terminal.show_cursor()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        cursor::Show
    )?;
    terminal::disable_raw_mode()?;

    result
}

type DeskTerminal = Terminal<CrosstermBackend<Stdout>>;

fn run(terminal: &mut DeskTerminal, config: &DeskConfig) -> io::Result<()> {
    let size = terminal.size()?;
    let (desktop, _) = split_screen(CellRect::new(0, 0, size.width, size.height));
    let desk_config = DesktopConfig::default()
        .with_viewport(config.cell.viewport(desktop))
        .with_layout(config.layout);
    let wm = WindowManager::new(
        desk_config,
        Box::new(FileBackend::new(config.state_dir.clone())),
    );
    let mut app = DeskApp::new(wm, config.cell);
    tracing::info!(state_dir = %config.state_dir.display(), "desktop started");

    while !app.quit {
        terminal.draw(|frame| draw(frame, &app))?;
        if event::poll(app.poll_timeout())? {
            let evt = event::read()?;
            app.handle_event(&evt);
        }
        app.wm.tick();
    }

    app.wm.shutdown();
    tracing::info!("desktop stopped");
    Ok(())
}

struct DeskApp {
    wm: WindowManager,
    cell: CellSize,
    status: String,
    workspace_cursor: usize,
    zone_cursor: usize,
    quit: bool,
}

impl DeskApp {
    fn new(wm: WindowManager, cell: CellSize) -> Self {
        Self {
            wm,
            cell,
            status: String::new(),
            workspace_cursor: 0,
            zone_cursor: 0,
            quit: false,
        }
    }

    /// Wake for the next frame or the pending save, whichever comes first.
    fn poll_timeout(&self) -> Duration {
        match self.wm.next_deadline() {
            Some(deadline) => deadline
                .saturating_duration_since(Instant::now())
                .min(FRAME_INTERVAL),
            None => FRAME_INTERVAL,
        }
    }

    fn handle_event(&mut self, evt: &Event) {
        match evt {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(*key),
            Event::Mouse(mouse) => self.handle_mouse(*mouse),
            Event::Resize(width, height) => {
                let (desktop, _) = split_screen(CellRect::new(0, 0, *width, *height));
                self.wm.set_viewport(self.cell.viewport(desktop));
            }
            _ => {}
        }
        for event in self.wm.take_events() {
            self.status = match event {
                DesktopEvent::DragStarted(entity) => format!("dragging {entity}"),
                DesktopEvent::ZoneHoverChanged(Some(zone)) => {
                    format!("release to snap: {}", zone.label())
                }
                DesktopEvent::ZoneHoverChanged(None) => String::new(),
            };
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let point = self.cell.point(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.wm.pointer_down(point);
            }
            MouseEventKind::Drag(MouseButton::Left) => self.wm.pointer_move(point),
            MouseEventKind::Up(MouseButton::Left) => self.wm.pointer_up(),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit = true;
            return;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
            KeyCode::Char(digit @ '1'..='9') => {
                let idx = digit as usize - '1' as usize;
                let target = self.wm.windows().ids().nth(idx).cloned();
                if let Some(id) = target {
                    self.wm.dispatch(Command::DockClick(id));
                }
            }
            KeyCode::Char('l') => {
                let next = match self.wm.layout_type() {
                    None => Some(LayoutType::Halves),
                    Some(LayoutType::TwoQuartersLeft) => None,
                    Some(layout) => Some(layout.next()),
                };
                self.wm.dispatch(Command::SetLayoutType(next));
                self.zone_cursor = 0;
                self.status = match next {
                    Some(layout) => format!("layout: {layout}"),
                    None => "layout mode off".to_string(),
                };
            }
            KeyCode::Char('m') => match self.wm.focused_entity() {
                Some(EntityId::Window(id)) => self.wm.dispatch(Command::Minimize(id)),
                Some(EntityId::Folder(id)) => self.wm.dispatch(Command::FolderMinimize(id)),
                None => {}
            },
            KeyCode::Char('x') => match self.wm.focused_entity() {
                Some(EntityId::Window(id)) => self.wm.dispatch(Command::Quit(id)),
                Some(EntityId::Folder(id)) => self.wm.dispatch(Command::FolderQuit(id)),
                None => {}
            },
            KeyCode::Tab => self.next_tab(),
            KeyCode::Char('w') => {
                let keys = self.wm.workspaces().keys();
                if let Some(key) = keys.get(self.workspace_cursor % keys.len().max(1)).cloned() {
                    self.workspace_cursor = self.workspace_cursor.wrapping_add(1);
                    self.status = format!("workspace: {key}");
                    self.wm.dispatch(Command::ApplyWorkspace(key));
                }
            }
            KeyCode::Char('s') => {
                self.wm.dispatch(Command::SaveWorkspace {
                    key: SAVED_WORKSPACE_KEY.to_string(),
                    name: "Custom".to_string(),
                });
                self.status = format!("saved workspace '{SAVED_WORKSPACE_KEY}'");
            }
            KeyCode::Char(']') => self.arrange(1),
            KeyCode::Char('[') => self.arrange(-1),
            _ => {}
        }
    }

    fn next_tab(&mut self) {
        let Some(EntityId::Folder(folder_id)) = self.wm.focused_entity() else {
            return;
        };
        let Some(folder) = self.wm.folders().get(&folder_id) else {
            return;
        };
        let current = folder
            .apps
            .iter()
            .position(|member| *member == folder.active_app_id)
            .unwrap_or(0);
        let next = folder.apps.get((current + 1) % folder.apps.len().max(1)).cloned();
        if let Some(next) = next {
            self.wm.dispatch(Command::FolderTabSwitch(folder_id, next));
        }
    }

    fn arrange(&mut self, step: isize) {
        let zones = self.wm.zones();
        if zones.is_empty() {
            self.status = "press l to pick a layout first".to_string();
            return;
        }
        let len = zones.len() as isize;
        let idx = (self.zone_cursor as isize + step).rem_euclid(len) as usize;
        let zone = zones[idx].id;
        self.zone_cursor = idx;
        self.wm.dispatch(Command::ArrangeFocused(zone));
    }
}

fn split_screen(area: CellRect) -> (CellRect, CellRect) {
    let [desktop, dock] = Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
    (desktop, dock)
}

fn draw(frame: &mut Frame, app: &DeskApp) {
    let (desktop, dock) = split_screen(frame.area());
    if desktop.width == 0 || desktop.height == 0 {
        return;
    }
    draw_zones(frame, app, desktop);

    let focused = app.wm.focused_entity();
    for entity in app.wm.display_order() {
        let Some(rect) = app.wm.entity_rect(&entity) else {
            continue;
        };
        let Some(area) = app.cell.cells(rect, desktop) else {
            continue;
        };
        let is_focused = focused.as_ref() == Some(&entity);
        match &entity {
            EntityId::Window(id) => {
                let Some(record) = app.wm.windows().get(id) else {
                    continue;
                };
                let title = Line::from(format!(" {} ", record.title));
                let body = Paragraph::new(record.image_alt.as_str());
                draw_frame(frame, area, title, body, is_focused);
            }
            EntityId::Folder(id) => {
                let Some(view) = app.wm.folder_view(id) else {
                    continue;
                };
                let tabs: Vec<Span> = view
                    .tabs
                    .iter()
                    .map(|tab| {
                        let style = if tab.id == view.active.id {
                            Style::default().add_modifier(Modifier::REVERSED)
                        } else {
                            Style::default()
                        };
                        Span::styled(format!(" {} ", tab.title), style)
                    })
                    .collect();
                let body = Paragraph::new(view.active.image_alt.as_str());
                draw_frame(frame, area, Line::from(tabs), body, is_focused);
            }
        }
    }

    draw_dock(frame, app, dock);
}

fn draw_frame(frame: &mut Frame, area: CellRect, title: Line, body: Paragraph, focused: bool) {
    let border = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Gray)
    };
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(border)
        .title(title);
    frame.render_widget(Clear, area);
    frame.render_widget(body.block(block), area);
}

fn draw_zones(frame: &mut Frame, app: &DeskApp, desktop: CellRect) {
    let hovered = app.wm.hovered_zone();
    for zone in app.wm.zones() {
        let Some(area) = app.cell.cells(zone.rect, desktop) else {
            continue;
        };
        let style = if hovered == Some(zone.id) {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .border_type(BorderType::Double)
            .border_style(style)
            .title(Line::from(zone.label).centered());
        frame.render_widget(block, area);
    }
}

fn draw_dock(frame: &mut Frame, app: &DeskApp, dock: CellRect) {
    let mut spans: Vec<Span> = Vec::new();
    for (idx, record) in app.wm.windows().iter().enumerate() {
        let marker = match (record.launched, record.visible) {
            (true, true) => "●",
            (true, false) => "○",
            (false, _) => " ",
        };
        spans.push(Span::styled(
            format!(" {}:{}{} ", idx + 1, marker, record.title),
            Style::default().fg(Color::Black).bg(Color::Gray),
        ));
        spans.push(Span::raw(" "));
    }
    if let Some(layout) = app.wm.layout_type() {
        spans.push(Span::styled(
            format!("[{layout}] "),
            Style::default().fg(Color::Yellow),
        ));
    }
    spans.push(Span::raw(app.status.as_str()));
    frame.render_widget(Paragraph::new(Line::from(spans)), dock);
}

#[cfg(test)]
mod tests {
    use super::*;
    use snap_desk::layout::ZoneId;
    use snap_desk::persistence::MemoryBackend;
    use snap_desk::window::WindowId;

    fn app() -> DeskApp {
        let wm = WindowManager::new(DesktopConfig::default(), Box::new(MemoryBackend::new()));
        DeskApp::new(
            wm,
            CellSize {
                width: 8.0,
                height: 16.0,
            },
        )
    }

    fn press(app: &mut DeskApp, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn digit_key_clicks_dock_entry() {
        let mut app = app();
        press(&mut app, KeyCode::Char('2'));
        let todo = app.wm.windows().get(&WindowId::new("todo-list")).unwrap();
        assert!(todo.launched && todo.visible);
        press(&mut app, KeyCode::Char('9'));
        assert!(!app.wm.windows().get(&WindowId::new("hacker-news")).unwrap().launched);
    }

    #[test]
    fn tab_key_cycles_focused_folder() {
        let mut app = app();
        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Char('2'));
        for id in ["hacker-news", "todo-list"] {
            app.wm.dispatch(Command::SnapToZone(
                EntityId::Window(WindowId::new(id)),
                ZoneId::HalfLeft,
            ));
        }
        press(&mut app, KeyCode::Tab);
        let folder = app.wm.folders().iter().next().unwrap();
        assert_eq!(folder.active_app_id, WindowId::new("todo-list"));
    }
}
