mod config;
mod events;
mod server;
mod tui;

use std::io;
use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use config::ServerConfig;
use events::ServerEvent;
use server::GameServer;

const DEFAULT_PORT: u16 = 7777;

#[derive(Parser)]
#[command(name = "rewind-server")]
#[command(about = "Client-side prediction / server reconciliation host demo")]
struct Args {
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    #[arg(short, long, default_value_t = 30)]
    tick_rate: u32,

    #[arg(short, long, default_value_t = 32)]
    max_clients: usize,

    #[arg(long)]
    headless: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let bind_addr = format!("{}:{}", args.bind, args.port);

    let config = ServerConfig {
        tick_rate: args.tick_rate,
        max_clients: args.max_clients,
    };

    let mut server = GameServer::new(&bind_addr, config)?;

    if args.headless {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        log::info!("server started on {}", server.local_addr());
        server.run();
        log::info!("server shutting down");
    } else {
        run_with_tui(&mut server)?;
    }

    Ok(())
}

fn run_with_tui(server: &mut GameServer) -> io::Result<()> {
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, cursor::Hide)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let running = server.running();
    log::info!("server started on {}", server.local_addr());

    while running.load(Ordering::SeqCst) {
        server.tick_once();

        for event in server.drain_events() {
            match event {
                ServerEvent::ClientConnected { addr, entity_id } => {
                    log::info!("client connected from {addr} (entity {entity_id})");
                }
                ServerEvent::ClientDisconnected { entity_id, reason } => {
                    log::info!("entity {entity_id} {}", reason.as_str());
                }
                ServerEvent::Error { message } => {
                    log::warn!("{message}");
                }
            }
        }

        if event::poll(Duration::from_millis(1))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press
                    && matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
                {
                    running.store(false, Ordering::SeqCst);
                }
            }
        }

        let stats = server.stats();
        terminal.draw(|frame| {
            tui::render(frame, &stats);
        })?;
    }

    server.shutdown_connections();

    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, cursor::Show)?;

    Ok(())
}
