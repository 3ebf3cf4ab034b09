use std::io;
use std::time::{Duration, Instant};

use clap::Parser;
use snap_desk::constants::{FOLDERS_STORAGE_KEY, WINDOWS_STORAGE_KEY};
use snap_desk::layout::{LayoutType, Point, Size};
use snap_desk::persistence::MemoryBackend;
use snap_desk::window::{WindowId, WindowRecord};
use snap_desk::{DesktopConfig, WindowManager};

#[derive(Parser, Debug)]
#[command(
    name = "snap-bench",
    version = env!("CARGO_PKG_VERSION"),
    about = "Replays synthetic drags against the layout engine"
)]
struct BenchCli {
    /// Number of windows on the desktop.
    #[arg(short = 'w', long = "windows", value_name = "COUNT", default_value_t = 16)]
    windows: usize,

    /// Number of complete drag gestures to replay.
    #[arg(short = 'd', long = "drags", value_name = "COUNT", default_value_t = 2_000)]
    drags: usize,

    /// Pointer moves per drag.
    #[arg(short = 'f', long = "frames", value_name = "FRAMES", default_value_t = 60)]
    frames: usize,

    /// Snap layout active during the run; omit to benchmark plain drags.
    #[arg(short = 'l', long = "layout", value_name = "LAYOUT")]
    layout: Option<String>,
}

struct BenchConfig {
    windows: usize,
    drags: usize,
    frames: usize,
    layout: Option<LayoutType>,
}

impl TryFrom<&BenchCli> for BenchConfig {
    type Error = String;

    fn try_from(cli: &BenchCli) -> Result<Self, Self::Error> {
        if !(1..=512).contains(&cli.windows) {
            return Err("windows must be between 1 and 512".to_string());
        }
        if !(1..=1_000_000).contains(&cli.drags) {
            return Err("drags must be between 1 and 1000000".to_string());
        }
        if !(1..=10_000).contains(&cli.frames) {
            return Err("frames must be between 1 and 10000".to_string());
        }
        let layout = cli
            .layout
            .as_deref()
            .map(str::parse::<LayoutType>)
            .transpose()
            .map_err(|err| err.to_string())?;
        Ok(Self {
            windows: cli.windows,
            drags: cli.drags,
            frames: cli.frames,
            layout,
        })
    }
}

fn main() -> io::Result<()> {
    let args = BenchCli::parse();
    let config = BenchConfig::try_from(&args)
        .map_err(|msg| io::Error::new(io::ErrorKind::InvalidInput, msg))?;

    let stats = run_benchmark(&config);
    println!("{}", stats.final_report(&config));
    if stats.writes_during_frames > 0 {
        return Err(io::Error::other("live frames reached storage"));
    }
    Ok(())
}

fn catalogue(count: usize) -> Vec<WindowRecord> {
    (0..count)
        .map(|i| {
            let col = (i % 4) as f64;
            let row = (i / 4 % 4) as f64;
            let mut record = WindowRecord::new(
                format!("app-{i}"),
                format!("App {i}"),
                Point::new(60.0 + col * 420.0, 80.0 + row * 240.0),
                Size::new(360.0, 200.0),
            );
            record.z_index = i as u64 + 1;
            record
        })
        .collect()
}

fn run_benchmark(config: &BenchConfig) -> BenchStats {
    let backend = MemoryBackend::new();
    let desk = DesktopConfig::default().with_layout(config.layout);
    let mut wm = WindowManager::with_catalogue(
        desk,
        Box::new(backend.clone()),
        catalogue(config.windows),
    );
    let ids: Vec<WindowId> = wm.windows().ids().cloned().collect();
    for id in &ids {
        wm.launch(id);
    }
    let viewport = wm.config().viewport;

    let mut stats = BenchStats::new();
    for drag in 0..config.drags {
        let id = &ids[drag % ids.len()];
        let Some(rect) = wm.windows().get(id).map(WindowRecord::rect) else {
            continue;
        };
        if !wm.windows().get(id).is_some_and(|record| record.visible) {
            // swallowed by a folder on an earlier drop
            wm.dock_click(id);
            stats.skipped += 1;
            continue;
        }
        let grab = Point::new(rect.x + 10.0, rect.y + 10.0);
        if !wm.pointer_down(grab) {
            stats.skipped += 1;
            continue;
        }

        let writes_before = backend.total_writes();
        let start = Instant::now();
        for frame in 1..=config.frames {
            let t = frame as f64 / config.frames as f64;
            let sweep = (drag as f64 * 0.37).fract();
            wm.pointer_move(Point::new(
                grab.x + (viewport.width * sweep - grab.x) * t,
                grab.y + (viewport.height * 0.5 - grab.y) * t,
            ));
        }
        stats.move_time += start.elapsed();
        stats.frames += config.frames as u64;
        stats.writes_during_frames += backend.total_writes() - writes_before;

        wm.pointer_up();
        stats.events += wm.take_events().len() as u64;
        stats.drags += 1;
    }
    wm.shutdown();

    stats.window_writes = backend.writes_for(WINDOWS_STORAGE_KEY);
    stats.folder_writes = backend.writes_for(FOLDERS_STORAGE_KEY);
    stats.folders = wm.folders().len();
    stats.mark_completed();
    tracing::debug!(drags = stats.drags, "benchmark finished");
    stats
}

struct BenchStats {
    start: Instant,
    completed_at: Option<Instant>,
    drags: u64,
    skipped: u64,
    frames: u64,
    events: u64,
    move_time: Duration,
    writes_during_frames: usize,
    window_writes: usize,
    folder_writes: usize,
    folders: usize,
}

impl BenchStats {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            completed_at: None,
            drags: 0,
            skipped: 0,
            frames: 0,
            events: 0,
            move_time: Duration::ZERO,
            writes_during_frames: 0,
            window_writes: 0,
            folder_writes: 0,
            folders: 0,
        }
    }

    fn elapsed(&self) -> Duration {
        match self.completed_at {
            Some(done) => done.duration_since(self.start),
            None => self.start.elapsed(),
        }
    }

    fn mark_completed(&mut self) {
        self.completed_at = Some(Instant::now());
    }

    fn frames_per_second(&self) -> f64 {
        let secs = self.move_time.as_secs_f64();
        if secs > 0.0 {
            self.frames as f64 / secs
        } else {
            0.0
        }
    }

    fn average_frame_us(&self) -> f64 {
        if self.frames == 0 {
            return 0.0;
        }
        self.move_time.as_secs_f64() / self.frames as f64 * 1_000_000.0
    }

    fn final_report(&self, config: &BenchConfig) -> String {
        let layout = config
            .layout
            .map_or_else(|| "off".to_string(), |layout| layout.to_string());
        indoc::formatdoc!(
            r#"
            Snap bench completed in {elapsed:.2}s.
            Windows: {windows} | Layout: {layout}
            Drags: {drags} (skipped {skipped}) | Frames: {frames} | Events: {events}
            Live frames: {fps:.0}/s | Avg frame: {avg:.2} us
            Storage writes: windows {window_writes}, folders {folder_writes} | during frames {live_writes}
            Folders at exit: {folders}
            "#,
            elapsed = self.elapsed().as_secs_f64(),
            windows = config.windows,
            layout = layout,
            drags = self.drags,
            skipped = self.skipped,
            frames = self.frames,
            events = self.events,
            fps = self.frames_per_second(),
            avg = self.average_frame_us(),
            window_writes = self.window_writes,
            folder_writes = self.folder_writes,
            live_writes = self.writes_during_frames,
            folders = self.folders,
        )
    }
}
