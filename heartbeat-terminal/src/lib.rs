/// Terminal host for the beating heart: drives frames and delivers mouse clicks
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self},
};
use heartbeat_core::{
    Camera, FrameHandler, FrameScheduler, HeartResult, PointerEvent, Scene, SceneRenderer,
    Viewport,
};
use log::{debug, info, warn};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Viewport used for picking and projection.
///
/// Terminal cells are roughly twice as tall as they are wide, so rows count
/// double to keep the heart's proportions.
pub fn cell_viewport(columns: u16, rows: u16) -> Viewport {
    Viewport::new(columns as f32, rows as f32 * 2.0)
}

/// Convert a mouse press into a pointer event at the centre of the clicked cell
pub fn pointer_event(mouse: &MouseEvent) -> Option<PointerEvent> {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(PointerEvent::mouse(
            mouse.column as f32 + 0.5,
            (mouse.row as f32 + 0.5) * 2.0,
        )),
        _ => None,
    }
}

/// Rasterizes into the ASCII buffer, then writes it and a status line out
struct TerminalSurface<'a, W: Write> {
    renderer: &'a mut AsciiRenderer,
    out: W,
    fps: f32,
}

impl<W: Write> SceneRenderer for TerminalSurface<'_, W> {
    fn draw(&mut self, scene: &Scene, camera: &Camera) -> HeartResult<()> {
        self.renderer.rasterize(scene, camera);

        queue!(self.out, cursor::MoveTo(0, 0))?;
        self.renderer.present(&mut self.out)?;

        // Draw UI overlay
        queue!(
            self.out,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::DarkRed),
            SetBackgroundColor(Color::Reset),
            Print(format!(
                "Heartbeat | FPS: {:.1} | Click the heart to make it beat, Q=Quit",
                self.fps
            )),
            ResetColor
        )?;

        self.out.flush()?;
        Ok(())
    }
}

/// Fixed-rate frame loop over the terminal's input and output
pub struct TerminalScheduler {
    handler: Option<Box<dyn FrameHandler>>,
    renderer: AsciiRenderer,
    viewport: Viewport,
    frame_time: Duration,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalScheduler {
    pub fn new(target_fps: u32) -> io::Result<Self> {
        let (width, height) = terminal::size()?;

        Ok(Self {
            handler: None,
            renderer: AsciiRenderer::new(width as usize, height as usize),
            viewport: cell_viewport(width, height),
            frame_time: Duration::from_secs(1) / target_fps.max(1),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> HeartResult<()> {
        let Some(mut handler) = self.handler.take() else {
            warn!("no frame callback registered, nothing to run");
            return Ok(());
        };

        let result = self.enter_and_loop(handler.as_mut());
        self.handler = Some(handler);

        // Cleanup runs whether or not setup and the loop succeeded
        let restored = restore_terminal(&mut stdout());
        if let Err(err) = &restored {
            warn!("failed to restore the terminal: {err}");
        }
        result.and(restored.map_err(Into::into))
    }

    fn enter_and_loop(&mut self, handler: &mut dyn FrameHandler) -> HeartResult<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;

        handler.on_resize(&self.viewport);
        self.main_loop(handler)
    }

    fn main_loop(&mut self, handler: &mut dyn FrameHandler) -> HeartResult<()> {
        info!("frame loop started at {:?} per frame", self.frame_time);

        while self.running {
            let frame_start = Instant::now();

            // Handle input between frames
            while event::poll(Duration::from_millis(0))? {
                let event = event::read()?;
                self.handle_event(event, handler);
            }

            let mut surface = TerminalSurface {
                renderer: &mut self.renderer,
                out: stdout(),
                fps: self.fps,
            };
            handler.on_frame(&mut surface)?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < self.frame_time {
                std::thread::sleep(self.frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        info!("frame loop stopped");
        Ok(())
    }

    fn handle_event(&mut self, event: Event, handler: &mut dyn FrameHandler) {
        match event {
            Event::Key(KeyEvent {
                code, modifiers, ..
            }) => match code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.running = false;
                }
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    self.running = false;
                }
                _ => {}
            },
            Event::Mouse(mouse) => {
                if let Some(pointer) = pointer_event(&mouse) {
                    debug!("click at cell ({}, {})", mouse.column, mouse.row);
                    handler.on_pointer(&pointer, &self.viewport);
                }
            }
            Event::Resize(width, height) => {
                debug!("terminal resized to {width}x{height}");
                self.renderer.resize(width as usize, height as usize);
                self.viewport = cell_viewport(width, height);
                handler.on_resize(&self.viewport);
            }
            _ => {}
        }
    }
}

/// Undo every terminal mode `run` may have switched on.
///
/// Each step is attempted even if an earlier one fails; the first error wins.
fn restore_terminal<W: Write>(out: &mut W) -> io::Result<()> {
    let steps = [
        terminal::disable_raw_mode(),
        execute!(out, DisableMouseCapture),
        execute!(out, terminal::LeaveAlternateScreen),
        execute!(out, cursor::Show),
    ];
    steps.into_iter().collect()
}

impl FrameScheduler for TerminalScheduler {
    fn register_frame_callback(&mut self, handler: Box<dyn FrameHandler>) {
        if self.handler.replace(handler).is_some() {
            warn!("frame callback replaced");
        }
    }
}
