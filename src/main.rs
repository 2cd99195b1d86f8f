/// Entry point and frame loop.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::fs::File;
use std::io;
use std::path::Path;
use std::time::Instant;

use crossterm::event::KeyCode;
use log::{debug, error, info, warn};
use rand::rngs::ThreadRng;

use config::GameConfig;
use domain::article::Catalog;
use domain::treasure::GRID_SIZE;
use sim::event::GameEvent;
use sim::game::{Game, Screen};
use sim::history::HistoryLedger;
use sim::store::{save_dir, FileStore, MemoryStore, Store};
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const LOG_FILE: &str = "treasure-quiz.log";

fn main() {
    let save_dir = save_dir();
    init_logging(save_dir.as_deref());
    info!("treasure-quiz {} starting", env!("CARGO_PKG_VERSION"));

    let config = GameConfig::load();

    // Fatal before the terminal is taken over, so the message stays visible.
    let catalog = match Catalog::load(&config.data_dir) {
        Ok(c) => c,
        Err(e) => {
            error!("failed to load quiz data: {e}");
            eprintln!("Failed to load quiz data: {e}");
            eprintln!("Expected questions.json and articles.json in {}", config.data_dir.display());
            std::process::exit(1);
        }
    };
    info!("loaded {} articles from {}", catalog.len(), config.data_dir.display());

    let store = match save_dir {
        Some(dir) => Store::File(FileStore::new(dir)),
        None => {
            warn!("no writable save directory, play history will not persist");
            Store::Memory(MemoryStore::new())
        }
    };

    let mut game = Game::new(catalog, HistoryLedger::new(store), config.timing);
    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut game, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!("game loop aborted: {e}");
        eprintln!("Game error: {e}");
    }

    info!("shutting down");
    println!("Thanks for playing!");
}

/// Log to a file in the save directory; stderr belongs to the terminal UI.
/// `RUST_LOG` overrides the default `info` level.
fn init_logging(dir: Option<&Path>) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(log::LevelFilter::Info).parse_default_env();

    let file = dir.and_then(|d| {
        File::options().create(true).append(true).open(d.join(LOG_FILE)).ok()
    });
    match file {
        Some(f) => {
            builder.target(env_logger::Target::Pipe(Box::new(f)));
        }
        None => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    builder.init();
}

fn game_loop(
    game: &mut Game<Store>,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> io::Result<()> {
    let mut input = InputState::new();
    let mut rng = rand::thread_rng();

    loop {
        input.drain_events();

        if input.ctrl_c_pressed() {
            break;
        }

        let now = Instant::now();
        if handle_input(game, renderer, &input, config, &mut rng, now) {
            break;
        }

        game.tick(now);
        process_events(sound, &game.take_events());

        renderer.render(game)?;
        std::thread::sleep(config.timing.frame);
    }

    Ok(())
}

fn process_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    for event in events {
        debug!("{:?}", event);
        let Some(sfx) = sound else { continue };
        match event {
            GameEvent::TreasureFound { .. } => sfx.play_found(),
            GameEvent::AllTreasureFound => sfx.play_stage_complete(),
            GameEvent::WrongGuess { .. } => sfx.play_freeze(),
            GameEvent::Unlocked(_) => sfx.play_unlock(),
            GameEvent::AnswerCorrect => sfx.play_correct(),
            GameEvent::AnswerWrong => sfx.play_wrong(),
            GameEvent::SessionSucceeded { .. } => sfx.play_success(),
            _ => {}
        }
    }
}

// ── Key Constants ──

const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];
const KEYS_RANDOM: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_MANUAL: &[KeyCode] = &[KeyCode::Char('m'), KeyCode::Char('M')];
const KEYS_VIEW: &[KeyCode] = &[KeyCode::Char('v'), KeyCode::Char('V')];
const KEYS_STAGE2: &[KeyCode] = &[KeyCode::Char('s'), KeyCode::Char('S')];

/// Route this frame's input to the active screen. Returns true to quit.
fn handle_input(
    game: &mut Game<Store>,
    renderer: &Renderer,
    input: &InputState,
    config: &GameConfig,
    rng: &mut ThreadRng,
    now: Instant,
) -> bool {
    match game.screen() {
        Screen::Start => {
            if input.any_pressed(KEYS_QUIT) {
                return true;
            }
            if input.any_pressed(KEYS_CONFIRM) {
                game.start();
            }
        }
        Screen::Coordinate => handle_coordinate(game, renderer, input, config, now),
        Screen::StageComplete => {
            let clicked = input.clicks.iter().find_map(|&(_, row)| renderer.item_at(row));
            if input.any_pressed(KEYS_RANDOM) || clicked == Some(0) {
                game.choose_random(rng);
            } else if input.any_pressed(KEYS_MANUAL) || clicked == Some(1) {
                game.open_manual_select();
            }
        }
        Screen::Select => handle_select(game, renderer, input),
        Screen::Game => handle_quiz(game, renderer, input, now),
        Screen::Fail => {
            if input.any_pressed(KEYS_STAGE2) {
                game.retry_stage2();
            } else if input.any_pressed(&[KeyCode::Enter, KeyCode::Esc]) {
                game.retry();
            }
        }
        Screen::Success => {
            if input.any_pressed(&[KeyCode::Enter, KeyCode::Esc]) {
                game.play_again();
            }
        }
    }
    false
}

fn handle_coordinate(
    game: &mut Game<Store>,
    renderer: &Renderer,
    input: &InputState,
    config: &GameConfig,
    now: Instant,
) {
    for _ in 0..input.count(config.unlock_key) {
        game.unlock_key(now);
    }

    // The overlay covers the whole screen: any click is a tap on it.
    if game.freeze_state().active {
        for _ in &input.clicks {
            game.overlay_tap(now);
        }
        return;
    }

    let (mut x, mut y) = game.ui.grid_cursor;
    for key in &input.keys {
        match key.code {
            KeyCode::Left | KeyCode::Char('a') => x -= 1,
            KeyCode::Right | KeyCode::Char('d') => x += 1,
            KeyCode::Up | KeyCode::Char('w') => y += 1,
            KeyCode::Down | KeyCode::Char('s') => y -= 1,
            _ => {}
        }
    }
    game.ui.grid_cursor = (x.clamp(0, GRID_SIZE - 1), y.clamp(0, GRID_SIZE - 1));

    if input.any_pressed(KEYS_CONFIRM) {
        let (x, y) = game.ui.grid_cursor;
        game.submit_guess(x, y, now);
    }

    for &(col, row) in &input.clicks {
        if let Some((x, y)) = renderer.grid_cell_at(col, row) {
            game.ui.grid_cursor = (x, y);
            game.submit_guess(x, y, now);
        }
    }
}

fn handle_select(game: &mut Game<Store>, renderer: &Renderer, input: &InputState) {
    if input.was_pressed(KeyCode::Esc) {
        game.back_to_stage_complete();
        return;
    }
    if input.was_pressed(KeyCode::Enter) {
        // Game has already returned to Start with a message up.
        if let Err(e) = game.confirm_manual() {
            debug!("confirm rejected: {e}");
        }
        return;
    }

    let total = game.catalog().len();
    let page = renderer.list_visible();
    let mut cursor = game.ui.list_cursor as i64;
    for key in &input.keys {
        match key.code {
            KeyCode::Up => cursor -= 1,
            KeyCode::Down => cursor += 1,
            KeyCode::PageUp => cursor -= page as i64,
            KeyCode::PageDown => cursor += page as i64,
            KeyCode::Home => cursor = 0,
            KeyCode::End => cursor = total as i64 - 1,
            _ => {}
        }
    }
    cursor += input.scroll as i64;
    game.ui.list_cursor = cursor.clamp(0, total.saturating_sub(1) as i64) as usize;

    let mut toggles = Vec::new();
    if input.was_pressed(KeyCode::Char(' ')) {
        toggles.push(game.ui.list_cursor);
    }
    for &(_, row) in &input.clicks {
        if let Some(i) = renderer.item_at(row) {
            game.ui.list_cursor = i;
            toggles.push(i);
        }
    }
    for i in toggles {
        let id = game.catalog().sorted_by_id().get(i).map(|a| a.id.clone());
        if let Some(id) = id {
            game.toggle_article(&id);
        }
    }

    // Keep the cursor inside the visible window.
    let ui = &mut game.ui;
    if ui.list_cursor < ui.list_scroll {
        ui.list_scroll = ui.list_cursor;
    } else if ui.list_cursor >= ui.list_scroll + page {
        ui.list_scroll = ui.list_cursor + 1 - page;
    }
}

fn handle_quiz(game: &mut Game<Store>, renderer: &Renderer, input: &InputState, now: Instant) {
    if input.any_pressed(KEYS_VIEW) {
        game.toggle_article_view();
    }

    let max_scroll = renderer.article_max_scroll() as i64;
    let mut scroll = game.ui.article_scroll as i64 + input.scroll as i64;
    let mut option = game.ui.option_cursor as i64;
    for key in &input.keys {
        match key.code {
            KeyCode::PageUp => scroll -= 5,
            KeyCode::PageDown => scroll += 5,
            KeyCode::Up => option -= 1,
            KeyCode::Down => option += 1,
            _ => {}
        }
    }
    game.ui.article_scroll = scroll.clamp(0, max_scroll) as usize;
    game.ui.option_cursor = option.clamp(0, 3) as usize;

    let letter = input.keys.iter().find_map(|k| match k.code {
        KeyCode::Char(c @ 'a'..='d') => Some(c as usize - 'a' as usize),
        KeyCode::Char(c @ 'A'..='D') => Some(c as usize - 'A' as usize),
        _ => None,
    });
    let chosen = input
        .digit_pressed()
        .or(letter)
        .or_else(|| input.clicks.iter().find_map(|&(_, row)| renderer.item_at(row)))
        .or_else(|| input.was_pressed(KeyCode::Enter).then_some(game.ui.option_cursor));

    if let Some(option) = chosen {
        game.ui.option_cursor = option.min(3);
        game.submit_answer(option, now);
    }
}
