mod client;
mod config;
mod input;
mod tui;

use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use client::GameClient;
use config::ClientConfig;
use input::KeyboardInput;

#[derive(Parser)]
#[command(name = "rewind-client")]
#[command(about = "Client-side prediction / server reconciliation client demo")]
struct Args {
    #[arg(short, long)]
    server: SocketAddr,

    #[arg(short, long, default_value = "0.0.0.0:0")]
    bind: String,

    #[arg(short, long, default_value_t = 30)]
    tick_rate: u32,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = ClientConfig {
        tick_rate: args.tick_rate,
    };
    let mut game_client = GameClient::new(&args.bind, args.server, config)?;
    log::info!("client bound on {}, connecting to {}", game_client.local_addr(), args.server);

    run(&mut game_client)?;
    Ok(())
}

fn run(game_client: &mut GameClient) -> io::Result<()> {
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, cursor::Hide)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut keyboard = KeyboardInput::new();
    let mut last_frame = Instant::now();
    let mut quit = false;

    while !quit {
        let now = Instant::now();
        let dt = (now - last_frame).as_secs_f32();
        last_frame = now;

        if event::poll(Duration::from_millis(1))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                        quit = true;
                    } else {
                        keyboard.on_key(key.code);
                    }
                }
            }
        }

        game_client.set_input(keyboard.build(dt));
        if let Err(e) = game_client.tick_once() {
            log::warn!("network error: {e}");
        }

        terminal.draw(|frame| {
            tui::render(frame, game_client);
        })?;
    }

    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, cursor::Show)?;
    Ok(())
}
