/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Compose the next frame into `front` (array of Cell)
///   2. Compare each cell with `back` (previous frame)
///   3. Emit terminal commands only for changed cells, batched with `queue!`
///   4. Flush once, then swap front/back
///
/// While composing, the renderer also records where clickable things
/// landed (grid cells, menu rows, answer options) so mouse clicks can be
/// mapped back to game actions without the game knowing the layout.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::selection::{SelectionMode, MANUAL_ARTICLES};
use crate::domain::article::QUESTIONS_PER_ARTICLE;
use crate::domain::treasure::GRID_SIZE;
use crate::sim::game::{Game, Screen};
use crate::sim::store::KeyValueStore;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: [u8; 4],
    ch_len: u8,
    fg: Color,
    bg: Color,
    wide: bool, // occupies 2 terminal columns
    cont: bool, // right half of a wide char (skip render)
}

impl Cell {
    /// Explicit background for every cell. Matching the Clear color keeps
    /// VTE terminals from showing seams between rows.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: false,
    };

    const WIDE_CONT: Cell = Cell {
        ch: [0; 4],
        ch_len: 0,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: true,
    };

    /// Differs from every real cell; filling `back` with it forces a repaint.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
        wide: false,
        cont: false,
    };

    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        cell.ch_len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell.wide = char_width(c) == 2;
        cell
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or(" ")
    }
}

/// Terminal column width of `c`. Covers the CJK, Hangul, fullwidth and
/// emoji blocks that article text uses; everything else is one column.
fn char_width(c: char) -> usize {
    if c.is_control() {
        return 0;
    }
    match c as u32 {
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xA000..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x1F300..=0x1F64F
        | 0x1F900..=0x1F9FF
        | 0x20000..=0x3FFFD => 2,
        _ => 1,
    }
}

fn str_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

/// Hard-wrap `text` to `width` columns. Existing line breaks are kept;
/// lines break between characters so CJK text wraps too.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(2);
    let mut out = Vec::new();
    for raw in text.lines() {
        let mut line = String::new();
        let mut used = 0;
        for c in raw.chars() {
            let w = char_width(c);
            if used + w > width {
                out.push(std::mem::take(&mut line));
                used = 0;
            }
            line.push(c);
            used += w;
        }
        out.push(line);
    }
    out
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write `s` at (x, y). Wide chars take two columns; a wide char that
    /// would straddle the right edge is dropped. Returns the column after
    /// the last one written.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) -> usize {
        let mut cx = x;
        for ch in s.chars() {
            let w = char_width(ch);
            if w == 0 {
                continue;
            }
            if cx + w > self.width {
                break;
            }
            self.set(cx, y, Cell::from_char(ch, fg, bg));
            if w == 2 {
                let mut cont = Cell::WIDE_CONT;
                cont.bg = Cell::norm_bg(bg);
                self.set(cx + 1, y, cont);
            }
            cx += w;
        }
        cx
    }

    fn fill_row(&mut self, y: usize, x0: usize, x1: usize, bg: Color) {
        for x in x0..x1.min(self.width) {
            self.set(x, y, Cell::from_char(' ', Color::White, bg));
        }
    }

    /// Copy of the row as plain text (continuation cells skipped).
    #[cfg(test)]
    fn row_text(&self, y: usize) -> String {
        (0..self.width)
            .map(|x| self.get(x, y))
            .filter(|c| !c.cont)
            .map(|c| c.as_str().to_string())
            .collect()
    }
}

// ── Palette ──

const GOLD: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const GREEN: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const RED: Color = Color::Rgb { r: 255, g: 70, b: 70 };
const CYAN: Color = Color::Rgb { r: 100, g: 200, b: 255 };
const DIM: Color = Color::DarkGrey;
const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const CURSOR_BG: Color = Color::Rgb { r: 30, g: 60, b: 30 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const FREEZE_BG: Color = Color::Rgb { r: 20, g: 40, b: 70 };
const RIGHT_BG: Color = Color::Rgb { r: 20, g: 90, b: 30 };
const WRONG_BG: Color = Color::Rgb { r: 110, g: 25, b: 25 };

// ── Layout ──

/// Each grid cell is 3 terminal columns wide (" · ").
const CELL_W: usize = 3;
const GRID_LEFT: usize = 4;
const GRID_TOP: usize = 2;

/// Rows kept below the article body for question, options and help.
const QUESTION_AREA: usize = 12;

/// Where clickable things were drawn in the last composed frame.
#[derive(Clone, Debug, Default)]
struct HitMap {
    grid: bool,
    /// (terminal row, item index) for menu entries, list rows and options.
    rows: Vec<(usize, usize)>,
    list_visible: usize,
    article_max_scroll: usize,
}

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_screen: Option<Screen>,
    hits: HitMap,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_screen: None,
            hits: HitMap::default(),
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render<S: KeyValueStore>(&mut self, g: &Game<S>) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        if self.last_screen != Some(g.screen()) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_screen = Some(g.screen());
        }

        self.compose(g);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Hit testing (layout of the last composed frame) ──

    /// Grid coordinate under terminal position (col, row), if any.
    pub fn grid_cell_at(&self, col: u16, row: u16) -> Option<(i32, i32)> {
        if !self.hits.grid {
            return None;
        }
        let (col, row) = (col as usize, row as usize);
        if col < GRID_LEFT || row < GRID_TOP {
            return None;
        }
        let gx = (col - GRID_LEFT) / CELL_W;
        let gy = row - GRID_TOP;
        if gx >= GRID_SIZE as usize || gy >= GRID_SIZE as usize {
            return None;
        }
        // Row 0 on screen is y = 19.
        Some((gx as i32, GRID_SIZE - 1 - gy as i32))
    }

    /// Menu entry, list row or answer option drawn on terminal `row`.
    pub fn item_at(&self, row: u16) -> Option<usize> {
        self.hits.rows.iter().find(|(r, _)| *r == row as usize).map(|(_, i)| *i)
    }

    /// Number of article rows the select list shows at once.
    pub fn list_visible(&self) -> usize {
        self.hits.list_visible.max(1)
    }

    pub fn article_max_scroll(&self) -> usize {
        self.hits.article_max_scroll
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Not ResetColor: the terminal default may differ from BASE_BG.
        queue!(self.writer, SetForegroundColor(Color::White), SetBackgroundColor(Cell::BASE_BG))?;

        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                if cell.cont {
                    if cell != prev { need_move = true; }
                    x += 1;
                    continue;
                }

                let cont_changed = cell.wide
                    && x + 1 < self.front.width
                    && self.front.get(x + 1, y) != self.back.get(x + 1, y);

                if cell == prev && !cont_changed {
                    need_move = true;
                    x += 1;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.as_str()))?;

                if cell.wide {
                    last_x = x + 1;
                    x += 2;
                } else {
                    last_x = x;
                    x += 1;
                }
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose<S: KeyValueStore>(&mut self, g: &Game<S>) {
        self.front.clear();
        self.hits = HitMap::default();

        match g.screen() {
            Screen::Start => self.compose_start(g),
            Screen::Coordinate => {
                self.compose_coordinate(g);
                if g.freeze_state().active {
                    self.compose_freeze_overlay(g);
                }
            }
            Screen::StageComplete => self.compose_stage_complete(),
            Screen::Select => self.compose_select(g),
            Screen::Game => self.compose_quiz(g),
            Screen::Fail => self.compose_fail(g),
            Screen::Success => self.compose_success(g),
        }

        if let Some(msg) = g.message() {
            let row = self.front.height.saturating_sub(1);
            let width = self.front.width;
            self.front.fill_row(row, 0, width, MSG_BG);
            self.front.put_str(0, row, &format!(" ◈ {} ", msg), Color::Black, MSG_BG);
        }
    }

    fn compose_banner(&mut self, x: usize, y: usize, lines: &[&str], fg: Color) {
        for (i, l) in lines.iter().enumerate() {
            self.front.put_str(x, y + i, l, fg, Color::Reset);
        }
    }

    fn compose_start<S: KeyValueStore>(&mut self, g: &Game<S>) {
        self.compose_banner(4, 1, &[
            "╔══════════════════════════════════════╗",
            "║     TREASURE  HUNT  &  ARTICLE QUIZ  ║",
            "╚══════════════════════════════════════╝",
        ], GOLD);
        self.front.put_str(6, 5, "Stage 1  Follow five clues across a 20×20 grid", Color::White, Color::Reset);
        self.front.put_str(6, 6, "Stage 2  Answer every question. One miss ends the run", Color::White, Color::Reset);

        self.front.put_str(6, 8, "ENTER  Start", GREEN, Color::Reset);
        self.front.put_str(6, 9, "  Q    Quit", Color::White, Color::Reset);

        self.front.put_str(6, 11, "Recent plays", GOLD, Color::Reset);
        let records = g.history();
        if records.is_empty() {
            self.front.put_str(6, 12, "No plays yet", DIM, Color::Reset);
            return;
        }

        self.front.put_str(6, 12, &format!("{:<12} {:<10} {:<8} {}", "Date", "Mode", "Result", "Correct"), DIM, Color::Reset);
        let room = self.front.height.saturating_sub(15);
        for (i, r) in records.iter().take(room).enumerate() {
            let (result, color) = if r.success { ("Passed", GREEN) } else { ("Failed", RED) };
            let line = format!(
                "{:<12} {:<10} {:<8} {}/{}",
                r.short_date(), r.mode.label(), result, r.correct, r.total
            );
            self.front.put_str(6, 13 + i, &line, color, Color::Reset);
        }
    }

    fn compose_coordinate<S: KeyValueStore>(&mut self, g: &Game<S>) {
        let hunt = g.hunt();
        let width = self.front.width;

        self.front.fill_row(0, 0, width, HUD_BG);
        let hud = format!(" STAGE 1 · TREASURE HUNT   Found {}/{} ", hunt.current_index(), hunt.len());
        self.front.put_str(0, 0, &hud, Color::White, HUD_BG);

        if !hunt.is_complete() {
            self.front.put_str(1, 1, &format!("Clue: {}", hunt.clue()), GOLD, Color::Reset);
        } else {
            self.front.put_str(1, 1, "All treasure found!", GREEN, Color::Reset);
        }

        let (cx, cy) = g.ui.grid_cursor;
        for gy in 0..GRID_SIZE as usize {
            let y = GRID_SIZE - 1 - gy as i32;
            let row = GRID_TOP + gy;
            self.front.put_str(0, row, &format!("{:>3}", y), DIM, Color::Reset);
            for gx in 0..GRID_SIZE as usize {
                let x = gx as i32;
                let col = GRID_LEFT + gx * CELL_W;
                let bg = if (x, y) == (cx, cy) { CURSOR_BG } else { Color::Reset };
                let (text, fg) = if hunt.is_found(x, y) { (" ◆ ", GOLD) } else { (" · ", DIM) };
                self.front.put_str(col, row, text, fg, bg);
            }
        }

        let label_row = GRID_TOP + GRID_SIZE as usize;
        for gx in 0..GRID_SIZE as usize {
            self.front.put_str(GRID_LEFT + gx * CELL_W, label_row, &format!("{:>2}", gx), DIM, Color::Reset);
        }
        self.front.put_str(1, label_row + 1, "←↑↓→ Move   ENTER/SPACE Dig   or click a cell", DIM, Color::Reset);

        self.hits.grid = true;
    }

    fn compose_freeze_overlay<S: KeyValueStore>(&mut self, g: &Game<S>) {
        self.hits.grid = false;

        let box_w = 44_usize.min(self.front.width);
        let box_h = 11_usize.min(self.front.height);
        let box_x = self.front.width.saturating_sub(box_w) / 2;
        let box_y = self.front.height.saturating_sub(box_h) / 2;

        for y in box_y..box_y + box_h {
            self.front.fill_row(y, box_x, box_x + box_w, FREEZE_BG);
        }

        let remaining = g.freeze_state().remaining_seconds;
        let center = |s: &str| box_x + box_w.saturating_sub(str_width(s)) / 2;

        let title = "FROZEN";
        self.front.put_str(center(title), box_y + 1, title, CYAN, FREEZE_BG);
        let timer = format!("{}:{:02}", remaining / 60, remaining % 60);
        self.front.put_str(center(&timer), box_y + 3, &timer, Color::White, FREEZE_BG);

        self.front.put_str(box_x + 2, box_y + 5, "Missed clue:", DIM, FREEZE_BG);
        for (i, line) in wrap(g.hunt().clue(), box_w.saturating_sub(4)).iter().take(2).enumerate() {
            self.front.put_str(box_x + 2, box_y + 6 + i, line, GOLD, FREEZE_BG);
        }
        let hint = "Guessing resumes when the timer ends";
        self.front.put_str(center(hint), box_y + 9, hint, DIM, FREEZE_BG);
    }

    fn compose_stage_complete(&mut self) {
        self.compose_banner(4, 2, &[
            "╔════════════════════════════════╗",
            "║    ★  STAGE 1  COMPLETE!  ★    ║",
            "╚════════════════════════════════╝",
        ], GOLD);
        self.front.put_str(6, 6, "Choose how stage 2 picks its articles:", Color::White, Color::Reset);

        let describe = |key: char, mode: SelectionMode, verb: &str| {
            let n = mode.article_count();
            format!("{}  {}: {}{} articles, {} questions", key, mode.label(), verb, n, n * QUESTIONS_PER_ARTICLE)
        };
        let random = describe('R', SelectionMode::Random, "");
        let manual = describe('M', SelectionMode::Manual, "pick ");
        self.front.put_str(8, 8, &random, GREEN, Color::Reset);
        self.front.put_str(8, 9, &manual, CYAN, Color::Reset);
        self.hits.rows = vec![(8, 0), (9, 1)];
    }

    fn compose_select<S: KeyValueStore>(&mut self, g: &Game<S>) {
        let selection = g.selection();
        let articles = g.catalog().sorted_by_id();
        let width = self.front.width;

        self.front.fill_row(0, 0, width, HUD_BG);
        let hud = format!(" CHOOSE {} ARTICLES   Selected {}/{} ", MANUAL_ARTICLES, selection.len(), MANUAL_ARTICLES);
        self.front.put_str(0, 0, &hud, Color::White, HUD_BG);

        let list_top = 2;
        let visible = self.front.height.saturating_sub(list_top + 4).max(1);
        let scroll = g.ui.list_scroll;
        self.hits.list_visible = visible;

        if scroll > 0 {
            self.front.put_str(2, list_top - 1, "    ▲ ▲ ▲", DIM, Color::Reset);
        }

        for (i, article) in articles.iter().enumerate().skip(scroll).take(visible) {
            let row = list_top + (i - scroll);
            let picked = selection.contains(&article.id);
            let mark = if picked { "[x]" } else { "[ ]" };
            let fg = if picked { GREEN } else { Color::White };

            if i == g.ui.list_cursor {
                self.front.fill_row(row, 0, width, CURSOR_BG);
                self.front.put_str(1, row, "▸", GREEN, CURSOR_BG);
            }
            let bg = if i == g.ui.list_cursor { CURSOR_BG } else { Color::Reset };
            let x = self.front.put_str(3, row, mark, fg, bg);
            let x = self.front.put_str(x + 1, row, article.date_label(), DIM, bg);
            self.front.put_str(x + 2, row, &article.title, fg, bg);
            self.hits.rows.push((row, i));
        }

        if scroll + visible < articles.len() {
            self.front.put_str(2, list_top + visible, "    ▼ ▼ ▼", DIM, Color::Reset);
        }

        let footer = list_top + visible + 1;
        let (confirm, color) = if selection.can_confirm() {
            ("ENTER Start quiz", GREEN)
        } else {
            ("ENTER Start quiz (pick exactly 7)", DIM)
        };
        let x = self.front.put_str(2, footer, confirm, color, Color::Reset);
        self.front.put_str(x + 3, footer, "SPACE/click Toggle   ↑↓ Move   ESC Back", DIM, Color::Reset);
    }

    fn compose_quiz<S: KeyValueStore>(&mut self, g: &Game<S>) {
        let (Some(session), Some((article, q_index, question))) = (g.session(), g.displayed_question()) else {
            return;
        };
        let width = self.front.width;
        let feedback = g.feedback();
        let article_index = feedback.map(|f| f.article_index).unwrap_or(session.article_index());

        self.front.fill_row(0, 0, width, HUD_BG);
        let hud = format!(
            " Article {}/{}   Question {}/{}   Correct: {} ",
            article_index + 1, session.articles().len(), q_index + 1, QUESTIONS_PER_ARTICLE, session.total_correct()
        );
        self.front.put_str(0, 0, &hud, Color::White, HUD_BG);

        self.front.put_str(1, 2, &article.title, GOLD, Color::Reset);
        self.front.put_str(1, 3, &article.link, DIM, Color::Reset);

        let mut row = 4;
        if g.ui.article_open {
            self.front.put_str(1, row, "[V] Hide article   PgUp/PgDn Scroll", CYAN, Color::Reset);
            row += 1;
            let body_h = self.front.height.saturating_sub(row + QUESTION_AREA).max(3);
            let lines = match g.catalog().content(&article.id) {
                Some(text) if !text.trim().is_empty() => wrap(text, width.saturating_sub(4)),
                _ => vec!["(No article text. Read it at the link above.)".to_string()],
            };
            self.hits.article_max_scroll = lines.len().saturating_sub(body_h);
            let scroll = g.ui.article_scroll.min(self.hits.article_max_scroll);
            for (i, line) in lines.iter().skip(scroll).take(body_h).enumerate() {
                self.front.put_str(2, row + i, line, Color::White, Color::Reset);
            }
            row += body_h;
        } else {
            self.front.put_str(1, row, "[V] Show article", CYAN, Color::Reset);
            row += 1;
        }

        row += 1;
        for line in wrap(&question.question, width.saturating_sub(2)).iter().take(2) {
            self.front.put_str(1, row, line, Color::White, Color::Reset);
            row += 1;
        }
        row += 1;

        for (i, option) in question.options.iter().enumerate() {
            let label = format!(" {}. {} ", (b'A' + i as u8) as char, option);
            let (fg, bg) = match feedback {
                Some(_) if question.is_correct(i) => (Color::White, RIGHT_BG),
                Some(f) if f.chosen == i => (Color::White, WRONG_BG),
                Some(_) => (DIM, Color::Reset),
                None if i == g.ui.option_cursor => (GREEN, CURSOR_BG),
                None => (Color::White, Color::Reset),
            };
            if bg != Color::Reset {
                self.front.fill_row(row, 1, width.saturating_sub(1), bg);
            }
            self.front.put_str(2, row, &label, fg, bg);
            self.hits.rows.push((row, i));
            row += 1;
        }

        row += 1;
        match feedback {
            Some(f) if f.correct => { self.front.put_str(2, row, "Correct!", GREEN, Color::Reset); }
            Some(_) => { self.front.put_str(2, row, "Wrong!", RED, Color::Reset); }
            None => { self.front.put_str(2, row, "A-D / 1-4 / click  Answer   ↑↓ ENTER", DIM, Color::Reset); }
        }
    }

    fn compose_fail<S: KeyValueStore>(&mut self, g: &Game<S>) {
        self.compose_banner(4, 2, &[
            "╔════════════════════════════════╗",
            "║        ✕  RUN  FAILED  ✕       ║",
            "╚════════════════════════════════╝",
        ], RED);

        let width = self.front.width.saturating_sub(8);
        let mut row = 6;
        if let Some(f) = g.failure() {
            for (label, value, color) in [
                ("Article", &f.article_title, Color::White),
                ("Question", &f.question, Color::White),
                ("Correct answer", &f.correct_answer, GREEN),
            ] {
                self.front.put_str(6, row, &format!("{}:", label), DIM, Color::Reset);
                row += 1;
                for line in wrap(value, width).iter().take(3) {
                    self.front.put_str(8, row, line, color, Color::Reset);
                    row += 1;
                }
            }
        }
        if let Some(s) = g.session() {
            let score = format!("◈ Correct: {}/{}", s.total_correct(), s.total_questions());
            self.front.put_str(6, row + 1, &score, Color::White, Color::Reset);
        }
        self.front.put_str(6, row + 3, "▸ ENTER  Back to start", GREEN, Color::Reset);
        self.front.put_str(6, row + 4, "▸ S      Retry stage 2", CYAN, Color::Reset);
    }

    fn compose_success<S: KeyValueStore>(&mut self, g: &Game<S>) {
        self.compose_banner(4, 2, &[
            "╔════════════════════════════════╗",
            "║   ★  ALL QUESTIONS CLEARED  ★  ║",
            "╚════════════════════════════════╝",
        ], GOLD);
        if let Some(s) = g.session() {
            let score = format!("◈ You answered {}/{} correctly!", s.total_correct(), s.total_questions());
            self.front.put_str(6, 6, &score, GREEN, Color::Reset);
        }
        self.front.put_str(6, 8, "▸ ENTER  Play again", GREEN, Color::Reset);
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimingConfig;
    use crate::domain::article::fixtures::catalog;
    use crate::domain::treasure::TREASURE_PATH;
    use crate::sim::history::HistoryLedger;
    use crate::sim::store::MemoryStore;
    use std::time::Instant;

    fn sized(w: usize, h: usize) -> Renderer {
        let mut r = Renderer::new();
        r.front.resize(w, h);
        r.back.resize(w, h);
        r
    }

    fn game() -> Game<MemoryStore> {
        Game::new(catalog(9), HistoryLedger::new(MemoryStore::new()), TimingConfig::default())
    }

    fn screen_text(r: &Renderer) -> String {
        (0..r.front.height).map(|y| r.front.row_text(y)).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn cjk_and_emoji_are_wide() {
        assert_eq!(char_width('a'), 1);
        assert_eq!(char_width('題'), 2);
        assert_eq!(char_width('🎁'), 2);
        assert_eq!(str_width("答對3"), 5);
    }

    #[test]
    fn wrap_respects_display_width() {
        let lines = wrap("寶藏寶藏寶藏", 5);
        assert_eq!(lines, vec!["寶藏", "寶藏", "寶藏"]);
        assert_eq!(wrap("ab\ncd", 10), vec!["ab", "cd"]);
    }

    #[test]
    fn wide_char_fills_continuation_cell() {
        let mut fb = FrameBuffer::new(4, 1);
        let end = fb.put_str(0, 0, "寶a", Color::White, Color::Reset);
        assert_eq!(end, 3);
        assert!(fb.get(0, 0).wide);
        assert!(fb.get(1, 0).cont);
        // A wide char never straddles the edge.
        let end = fb.put_str(3, 0, "藏", Color::White, Color::Reset);
        assert_eq!(end, 3);
    }

    #[test]
    fn grid_hit_test_maps_top_row_to_y19() {
        let mut r = sized(80, 24);
        let mut g = game();
        g.start();
        r.compose(&g);
        assert_eq!(r.grid_cell_at(GRID_LEFT as u16, GRID_TOP as u16), Some((0, 19)));
        let (px, py) = (TREASURE_PATH[1].x as usize, TREASURE_PATH[1].y as usize);
        let col = (GRID_LEFT + px * CELL_W + 1) as u16;
        let row = (GRID_TOP + (GRID_SIZE as usize - 1 - py)) as u16;
        assert_eq!(r.grid_cell_at(col, row), Some((px as i32, py as i32)));
        assert_eq!(r.grid_cell_at(0, 0), None);
    }

    #[test]
    fn freeze_overlay_hides_grid_hits() {
        let mut r = sized(80, 24);
        let mut g = game();
        g.start();
        g.submit_guess(19, 19, Instant::now());
        r.compose(&g);
        assert_eq!(r.grid_cell_at(GRID_LEFT as u16, GRID_TOP as u16), None);
        let text = screen_text(&r);
        assert!(text.contains("FROZEN"));
        assert!(text.contains("3:00"));
    }

    #[test]
    fn start_screen_lists_empty_history() {
        let mut r = sized(80, 24);
        r.compose(&game());
        assert!(screen_text(&r).contains("No plays yet"));
    }

    #[test]
    fn select_rows_are_clickable() {
        let mut r = sized(80, 24);
        let mut g = game();
        g.start();
        for p in TREASURE_PATH.iter() {
            g.submit_guess(p.x, p.y, Instant::now());
        }
        g.tick(Instant::now() + std::time::Duration::from_secs(1));
        g.open_manual_select();
        r.compose(&g);
        assert_eq!(r.item_at(2), Some(0));
        assert_eq!(r.item_at(10), Some(8));
        assert!(screen_text(&r).contains("Selected 0/7"));
    }
}
