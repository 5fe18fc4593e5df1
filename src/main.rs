//! Neon Arcade entry point
//!
//! On the web this mounts one game on `#canvas`. Natively it runs a headless
//! Breakout demo on autopilot and logs the result.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use wasm_bindgen::JsCast;
    use web_sys::HtmlElement;

    use neon_arcade::games::{self, breakout};
    use neon_arcade::platform::web;

    const CANVAS_ID: &str = "canvas";

    /// Game id from `data-game` on the canvas, then `?game=` in the URL
    fn pick_game(document: &web_sys::Document) -> String {
        let from_attr = document
            .get_element_by_id(CANVAS_ID)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            .and_then(|el| el.dataset().get("game"));
        if let Some(id) = from_attr {
            return id;
        }

        let search = document
            .location()
            .and_then(|loc| loc.search().ok())
            .unwrap_or_default();
        search
            .trim_start_matches('?')
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(k, _)| *k == "game")
            .map(|(_, v)| v.to_string())
            .unwrap_or_else(|| breakout::ID.to_string())
    }

    pub fn run() -> Result<(), web::MountError> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("logger already set: {e}").into());
        }

        log::info!("Neon Arcade starting...");

        let window = web_sys::window().ok_or(web::MountError::NoWindow)?;
        let document = window.document().ok_or(web::MountError::NoWindow)?;

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let game_id = pick_game(&document);
        if !games::GAME_IDS.contains(&game_id.as_str()) {
            log::warn!("Available games: {}", games::GAME_IDS.join(", "));
        }

        let seed = js_sys::Date::now() as u64;
        log::info!("Seed: {seed}");
        web::mount(CANVAS_ID, &game_id, seed)?;
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()?;
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::cell::RefCell;
    use std::rc::Rc;

    use neon_arcade::Engine;
    use neon_arcade::bridge::RecordingSink;
    use neon_arcade::engine::Runtime;
    use neon_arcade::games::Breakout;
    use neon_arcade::persistence::MemoryStore;
    use neon_arcade::platform::{LoopDriver, ManualScheduler};
    use neon_arcade::renderer::{Frame, Surface};
    use neon_arcade::sim::Phase;
    use neon_arcade::{QualityPreset, Settings};

    /// Surface that only counts draw commands
    #[derive(Default)]
    struct Headless {
        commands: usize,
    }

    impl Surface for Headless {
        fn present(&mut self, frame: &Frame) {
            self.commands += frame.cmds.len();
        }
    }

    env_logger::init();
    log::info!("Neon Arcade (native) starting...");
    log::info!("Browser mode needs the wasm build; running a headless Breakout demo");

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(7);
    let quality = args
        .next()
        .and_then(|s| QualityPreset::parse(&s))
        .unwrap_or_default();
    let sink = Rc::new(RefCell::new(RecordingSink::default()));
    let mut engine = Engine::new(
        Breakout::default(),
        seed,
        Box::new(MemoryStore::new()),
        Box::new(sink.clone()),
    );
    engine.set_settings(Settings::from_preset(quality));
    let mut driver = LoopDriver::new(ManualScheduler::new());
    let mut surface = Headless::default();

    // Start the run from the title screen
    Runtime::input(&mut engine).press(None);
    driver.start();

    const MAX_FRAMES: u32 = 60 * 60 * 5;
    for frame in 0..MAX_FRAMES {
        if let Some(p) = Breakout::autopilot(engine.state()) {
            Runtime::input(&mut engine).pointer_move(p);
        }
        let relaunch = engine.state().ball_attached() && frame % 30 == 0;
        if relaunch || engine.phase() == Phase::LevelUp {
            Runtime::input(&mut engine).press(None);
        }

        let Some(handle) = driver.scheduler_mut().fire() else {
            break;
        };
        driver.on_frame(handle, &mut engine, Some(&mut surface));

        if engine.phase() == Phase::Over {
            break;
        }
    }
    driver.stop();

    let world = engine.world();
    log::info!(
        "Demo finished: phase {:?}, score {}, level {}, lives {}, {} ticks, {} draw commands",
        world.phase,
        world.progress.score,
        world.progress.level,
        world.progress.lives,
        world.time_ticks,
        surface.commands
    );
    let sink = sink.borrow();
    for record in &sink.scores {
        println!(
            "{} scored {} (high score: {})",
            record.game_id, record.score, record.is_high_score
        );
    }
    if !sink.unlocks.is_empty() {
        println!("Unlocked: {}", sink.unlocks.join(", "));
    }
}
