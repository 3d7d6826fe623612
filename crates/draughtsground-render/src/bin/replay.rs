//! Replay moves on a headless board and report renderer churn.
//!
//! The first stdin line is a JSON configuration; every following line is a
//! move such as `32-28`, or `32x23x14` for a capture chain.

use draughtsground_core::{Config, Draughtsground, Key};
use draughtsground_render::{BoardRenderer, MemorySurface, RenderStats};
use kurbo::Rect;
use std::io::{self, BufRead};

const FRAME_MS: f64 = 16.0;

fn parse_move(line: &str) -> Option<Vec<Key>> {
    let keys: Option<Vec<Key>> = line.split(['-', 'x']).map(|s| s.trim().parse().ok()).collect();
    keys.filter(|k| k.len() >= 2)
}

fn add(total: &mut RenderStats, stats: RenderStats) {
    total.created += stats.created;
    total.reused += stats.reused;
    total.same += stats.same;
    total.removed += stats.removed;
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let config = match lines.next() {
        Some(line) => Config::from_json(&line?)?,
        None => Config::default(),
    };
    let mut board = Draughtsground::new(&config);
    board.set_bounds(Rect::new(0.0, 0.0, 800.0, 800.0));
    let mut renderer = BoardRenderer::new();
    let mut surface = MemorySurface::new();
    let mut total = RenderStats::default();
    let mut now = 0.0;
    add(&mut total, renderer.render(board.state_mut(), &mut surface));

    for line in lines {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some(keys) = parse_move(line) else {
            log::warn!("Skipping unreadable move {line:?}");
            continue;
        };
        for hop in keys.windows(2) {
            if !board.move_piece(hop[0], hop[1], now) {
                log::warn!("Move {}-{} rejected", hop[0], hop[1]);
                break;
            }
            loop {
                let status = board.frame(now);
                add(&mut total, renderer.render(board.state_mut(), &mut surface));
                now += FRAME_MS;
                if !status.needs_frame() {
                    break;
                }
            }
        }
        board.flush();
        println!("{line}: {}", board.get_fen_with_turn());
    }

    log::info!("Replay finished after {now} ms");
    println!(
        "elements: {} created, {} reused, {} same, {} removed",
        total.created, total.reused, total.same, total.removed
    );
    Ok(())
}
