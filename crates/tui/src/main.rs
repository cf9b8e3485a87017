use confirm_box_tui::{
    ConfirmConfig, ConfirmOptions, Confirmation, ConfirmationProvider, ConfirmationRegistry,
    ScopedConfirmation,
};
use crossterm::cursor::Show;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::Paragraph;
use ratatui::{Frame, Terminal};
use std::env;
use std::fs::File;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing_subscriber::EnvFilter;

const TICK: Duration = Duration::from_millis(50);
const MAX_LOG_LINES: usize = 200;
const HELP: &str = "d delete file  p remove plugin (scoped)  r chained prompt  q quit";

struct TerminalRestoreGuard;

impl Drop for TerminalRestoreGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = std::io::stdout();
        let _ = stdout.execute(LeaveAlternateScreen);
        let _ = stdout.execute(Show);
    }
}

fn parse_config_path(args: impl IntoIterator<Item = impl AsRef<str>>) -> Option<PathBuf> {
    let mut args = args.into_iter().map(|arg| arg.as_ref().to_string());
    let mut path = None;
    while let Some(arg) = args.next() {
        if let Some(value) = arg.strip_prefix("--config=") {
            path = Some(PathBuf::from(value));
            continue;
        }
        if arg == "-c" || arg == "--config" {
            if let Some(value) = args.next() {
                path = Some(PathBuf::from(value));
            }
        }
    }
    path
}

/// Logs go to the file named by `CONFIRM_BOX_LOG`; stderr would tear the TUI.
fn init_logging() -> std::io::Result<()> {
    let Some(path) = env::var_os("CONFIRM_BOX_LOG") else {
        return Ok(());
    };
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("confirm_box_tui=debug,confirm_box_demo=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .ok();
    Ok(())
}

fn report_outcome(handle: &Handle, confirmation: Confirmation, label: String, tx: Sender<String>) {
    handle.spawn(async move {
        let outcome = if confirmation.await {
            "confirmed"
        } else {
            "cancelled"
        };
        tracing::info!(label = %label, outcome, "prompt settled");
        let _ = tx.send(format!("{label}: {outcome}"));
    });
}

struct Demo {
    registry: ConfirmationRegistry,
    plugins: ScopedConfirmation,
    handle: Handle,
    tx: Sender<String>,
    log: Vec<String>,
    next_file: usize,
}

impl Demo {
    fn push_line(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
        if self.log.len() > MAX_LOG_LINES {
            let overflow = self.log.len() - MAX_LOG_LINES;
            self.log.drain(..overflow);
        }
    }

    fn drain_outcomes(&mut self, rx: &Receiver<String>) -> bool {
        let mut changed = false;
        while let Ok(line) = rx.try_recv() {
            self.push_line(line);
            changed = true;
        }
        changed
    }

    fn prompt_delete(&mut self) {
        self.next_file += 1;
        let name = format!("report-{}.txt", self.next_file);
        let options = ConfirmOptions::new()
            .title("Delete?")
            .description(format!("{name} will be removed permanently."))
            .confirm_text("Delete")
            .warning();
        match self.registry.prompt(options) {
            Ok(confirmation) => {
                report_outcome(&self.handle, confirmation, format!("delete {name}"), self.tx.clone())
            }
            Err(error) => self.push_line(format!("error: {error}")),
        }
    }

    fn prompt_plugin(&mut self) {
        let options = ConfirmOptions::new().description("Remove the markdown preview plugin?");
        match self.plugins.prompt(options) {
            Ok(confirmation) => report_outcome(
                &self.handle,
                confirmation,
                "remove plugin".to_string(),
                self.tx.clone(),
            ),
            Err(error) => self.push_line(format!("error: {error}")),
        }
    }

    fn prompt_chained(&mut self) {
        let registry = self.registry.clone();
        let handle = self.handle.clone();
        let tx = self.tx.clone();
        let options = ConfirmOptions::new()
            .title("Reset settings")
            .description("Restore every setting to its default value?")
            .on_confirm(move || {
                let follow_up = ConfirmOptions::new()
                    .title("Really reset?")
                    .description("Custom key bindings will be lost too.")
                    .warning();
                match registry.prompt(follow_up) {
                    Ok(confirmation) => report_outcome(
                        &handle,
                        confirmation,
                        "reset (second step)".to_string(),
                        tx.clone(),
                    ),
                    Err(error) => {
                        let _ = tx.send(format!("error: {error}"));
                    }
                }
            });
        match self.registry.prompt(options) {
            Ok(confirmation) => report_outcome(
                &self.handle,
                confirmation,
                "reset (first step)".to_string(),
                self.tx.clone(),
            ),
            Err(error) => self.push_line(format!("error: {error}")),
        }
    }
}

fn draw(f: &mut Frame, demo: &Demo, providers: [&ConfirmationProvider; 2]) {
    let area = f.area();
    if area.width == 0 || area.height == 0 {
        return;
    }
    let help_area = Rect::new(area.x, area.y, area.width, 1);
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            HELP,
            Style::default().add_modifier(Modifier::DIM),
        ))),
        help_area,
    );

    let log_height = area.height.saturating_sub(2) as usize;
    let start = demo.log.len().saturating_sub(log_height);
    let lines: Vec<Line> = demo.log[start..]
        .iter()
        .map(|line| Line::from(line.as_str()))
        .collect();
    let log_area = Rect::new(area.x, area.y + 2, area.width, area.height.saturating_sub(2));
    f.render_widget(Paragraph::new(Text::from(lines)), log_area);

    for provider in providers {
        f.render_widget(provider, area);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match parse_config_path(env::args().skip(1)) {
        Some(path) => ConfirmConfig::load(&path)?,
        None => ConfirmConfig::from_env()?,
    };
    init_logging()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .build()?;
    let _runtime_guard = runtime.enter();

    let registry = ConfirmationRegistry::new(config);
    let mut provider = ConfirmationProvider::mount(&registry)?;
    let plugins = registry.create_confirmation(
        ConfirmOptions::new()
            .title("Plugin manager")
            .confirm_text("Remove")
            .cancel_text("Keep"),
        None,
    );
    let mut plugin_provider = plugins.mount_provider()?;

    let (tx, rx) = mpsc::channel::<String>();
    let mut demo = Demo {
        registry,
        plugins,
        handle: runtime.handle().clone(),
        tx,
        log: Vec::new(),
        next_file: 0,
    };
    demo.push_line("Confirmation demo. Outcomes appear below.");

    let mut stdout = std::io::stdout();
    let _restore_guard = TerminalRestoreGuard;
    enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let mut needs_redraw = true;
    loop {
        if demo.drain_outcomes(&rx) {
            needs_redraw = true;
        }
        // Both providers must tick every frame; avoid short-circuiting.
        if provider.tick() | plugin_provider.tick() {
            needs_redraw = true;
        }
        if needs_redraw {
            terminal.draw(|f| draw(f, &demo, [&provider, &plugin_provider]))?;
            needs_redraw = false;
        }

        if !event::poll(TICK)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            needs_redraw = true;
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            break;
        }
        if plugin_provider.handle_key(key) || provider.handle_key(key) {
            needs_redraw = true;
            continue;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => break,
            KeyCode::Char('d') => demo.prompt_delete(),
            KeyCode::Char('p') => demo.prompt_plugin(),
            KeyCode::Char('r') => demo.prompt_chained(),
            _ => continue,
        }
        needs_redraw = true;
    }

    drop(plugin_provider);
    drop(provider);
    Ok(())
}
