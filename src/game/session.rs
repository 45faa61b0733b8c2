//! Progression state machine — the per-session game core.
//!
//! One logged-in player answers questions from the current round's
//! categories; the session tracks level, hit points, coin score, and the
//! consecutive-correct-round streak, and draws the next round when the
//! current one is exhausted. Every mutation enters through a single event
//! (`answer`, `login`, `restart`, ...) so there are no re-entrant reactive
//! cascades — state transitions are explicit.
//!
//! Uses `thread_local!` + `RefCell` for safe mutable access in
//! single-threaded WASM; the Web Worker keeps the module alive so the
//! session persists across `handle_request` calls.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

use crate::game::catalog::Question;
use crate::game::errors::GameError;
use crate::game::modes::GameType;
use crate::game::roster::{PlayerRecord, STARTING_HP};
use crate::game::rounds;
use crate::game::skin::Skin;

/// Consecutive fully-correct rounds needed for one bonus hit point.
pub const STREAK_BONUS_ROUNDS: u32 = 3;

/// Fixed fallback seed; the login route reseeds from the JS clock.
const DEFAULT_SEED: u64 = 0x7269_7669_6121;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No player logged in.
    Idle,
    /// Categories drawn, at least one question unanswered.
    InRound,
    /// Every question of the current categories is answered. Transient:
    /// `answer` draws the next round before it returns.
    RoundComplete,
    /// Hit points reached 0. Further answers are rejected.
    GameOver,
    /// Every category has been played clean. The board is cleared.
    Exhausted,
}

/// What a single `answer` call did.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerOutcome {
    pub correct: bool,
    /// Coins gained (the question's rate, 0 when absent or answer wrong).
    pub score_delta: u32,
    /// The answer finished the current round.
    pub round_completed: bool,
    /// The finished round had no wrong answers (level advanced).
    pub round_clean: bool,
    /// Phase after the transition settled.
    pub phase: Phase,
}

/// Read-only view of the current player for the score widgets.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerSnapshot {
    pub name: String,
    pub level: u32,
    pub score: u32,
    pub hp: i32,
    pub streak: u32,
    pub sheet: String,
    pub game_type: GameType,
    pub skin: Skin,
    pub total_correct: u32,
    pub total_asked: u32,
}

/// Aggregate view consumed by the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub player: Option<PlayerSnapshot>,
    pub current_categories: Vec<String>,
    pub available_categories: Vec<String>,
    pub answered: HashMap<String, bool>,
    /// Comma-joined `wrong (correct)` pairs, oldest first.
    pub wrong_answers: String,
    /// Questions of the current round's categories.
    pub questions: Vec<Question>,
}

#[derive(Debug)]
pub struct Session {
    player: Option<String>,
    sheet: Option<String>,
    phase: Phase,
    level: u32,
    score: u32,
    hp: i32,
    streak: u32,
    total_correct: u32,
    total_asked: u32,
    game_type: GameType,
    skin: Skin,
    questions: Vec<Question>,
    all_categories: Vec<String>,
    used: BTreeSet<String>,
    current: Vec<String>,
    answered: HashMap<String, bool>,
    round_had_wrong: bool,
    wrong_log: Vec<String>,
    rng: SmallRng,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            player: None,
            sheet: None,
            phase: Phase::Idle,
            level: 1,
            score: 0,
            hp: STARTING_HP,
            streak: 0,
            total_correct: 0,
            total_asked: 0,
            game_type: GameType::default(),
            skin: Skin::default(),
            questions: Vec::new(),
            all_categories: Vec::new(),
            used: BTreeSet::new(),
            current: Vec::new(),
            answered: HashMap::new(),
            round_had_wrong: false,
            wrong_log: Vec::new(),
            rng: SmallRng::seed_from_u64(DEFAULT_SEED),
        }
    }
}

impl Session {
    /// Reseed the round-draw RNG (called with the JS clock at login so
    /// draws differ between visits; tests pass fixed seeds).
    pub fn reseed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }

    /// Replace the question set (a sheet finished loading). Round state is
    /// recomputed; player stats are untouched.
    pub fn set_questions(&mut self, questions: Vec<Question>) {
        self.all_categories = first_appearance_categories(&questions);
        self.questions = questions;
        self.used.clear();
        self.wrong_log.clear();
        if self.player.is_some() {
            self.draw_round();
        } else {
            self.current.clear();
            self.answered.clear();
            self.round_had_wrong = false;
        }
    }

    /// Start playing as `record`. Resets round state and draws the first
    /// round from the loaded questions.
    pub fn login(&mut self, record: &PlayerRecord) {
        self.player = Some(record.name.clone());
        self.sheet = Some(record.sheet.clone());
        self.level = record.level;
        self.score = record.score;
        self.hp = record.hp;
        self.streak = record.streak;
        self.total_correct = record.total_correct;
        self.total_asked = record.total_asked;
        self.game_type = record.game_type;
        self.skin = record.skin;
        self.used.clear();
        self.wrong_log.clear();
        self.draw_round();
    }

    /// Leave the game. Round state is dropped; the caller persists the
    /// returned record first (write-after-mutate).
    pub fn logout(&mut self) -> Option<PlayerRecord> {
        let record = self.to_record();
        *self = Session {
            rng: SmallRng::seed_from_u64(DEFAULT_SEED),
            questions: std::mem::take(&mut self.questions),
            all_categories: std::mem::take(&mut self.all_categories),
            ..Session::default()
        };
        record
    }

    /// Start over: fresh stats, empty board history, new first round.
    pub fn restart(&mut self) -> Result<(), GameError> {
        if self.player.is_none() {
            return Err(GameError::Precondition("restart with no player".into()));
        }
        self.level = 1;
        self.score = 0;
        self.hp = STARTING_HP;
        self.streak = 0;
        self.used.clear();
        self.wrong_log.clear();
        self.draw_round();
        Ok(())
    }

    /// Process one answered question. This is the single entry point for
    /// all progression: scoring, HP, streaks, round completion, eviction of
    /// dirty rounds, and terminal checks all happen here.
    pub fn answer(&mut self, question_text: &str, chosen: &str) -> Result<AnswerOutcome, GameError> {
        match self.phase {
            Phase::InRound => {}
            Phase::GameOver => {
                return Err(GameError::Precondition("answer after game over".into()))
            }
            Phase::Exhausted => {
                return Err(GameError::Precondition("answer after board cleared".into()))
            }
            Phase::Idle | Phase::RoundComplete => {
                return Err(GameError::Precondition("no active round".into()))
            }
        }

        let question = self
            .questions
            .iter()
            .find(|q| q.question == question_text && self.current.contains(&q.category))
            .cloned()
            .ok_or_else(|| {
                GameError::Precondition(format!("'{question_text}' is not in the current round"))
            })?;
        if self.answered.get(question_text).copied().unwrap_or(false) {
            return Err(GameError::Precondition(format!(
                "'{question_text}' was already answered"
            )));
        }

        self.answered.insert(question.question.clone(), true);
        self.total_asked += 1;

        let correct = chosen == question.correct;
        let mut score_delta = 0;
        if correct {
            score_delta = question.rate.unwrap_or(0);
            self.score += score_delta;
            self.total_correct += 1;
        } else {
            self.hp -= 1;
            self.streak = 0;
            self.round_had_wrong = true;
            self.wrong_log
                .push(format!("{} ({})", chosen, question.correct));
        }

        let round_completed = self.round_complete();
        let mut round_clean = false;
        if round_completed {
            self.phase = Phase::RoundComplete;
            round_clean = !self.round_had_wrong;
            if round_clean {
                // Clean sweep: advance, count toward the HP bonus, retire
                // the round's categories.
                self.level += 1;
                self.streak += 1;
                if self.streak == STREAK_BONUS_ROUNDS {
                    self.hp += 1;
                    self.streak = 0;
                }
                for cat in &self.current {
                    self.used.insert(cat.clone());
                }
            } else {
                // Any miss evicts the whole round back to the pool; the
                // next draw may select the same categories again.
                for cat in &self.current {
                    self.used.remove(cat);
                }
            }
            self.draw_round();
        }

        // Terminal checks, in priority order: out of HP beats a cleared board.
        if self.hp <= 0 {
            self.phase = Phase::GameOver;
        }

        Ok(AnswerOutcome {
            correct,
            score_delta,
            round_completed,
            round_clean,
            phase: self.phase,
        })
    }

    /// Every question of the current categories is answered.
    fn round_complete(&self) -> bool {
        self.questions
            .iter()
            .filter(|q| self.current.contains(&q.category))
            .all(|q| self.answered.get(&q.question).copied().unwrap_or(false))
    }

    /// Draw the next round and settle the phase. Clears per-round tracking.
    fn draw_round(&mut self) {
        self.answered.clear();
        self.round_had_wrong = false;
        self.current = rounds::select_round(
            &self.all_categories,
            &self.used,
            rounds::ROUND_SIZE,
            &mut self.rng,
        );
        self.phase = if self.current.is_empty()
            && !self.all_categories.is_empty()
            && self.all_categories.iter().all(|c| self.used.contains(c))
        {
            Phase::Exhausted
        } else {
            Phase::InRound
        };
    }

    // ── Read accessors ─────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn skin(&self) -> Skin {
        self.skin
    }

    pub fn set_skin(&mut self, skin: Skin) {
        self.skin = skin;
    }

    pub fn current_categories(&self) -> &[String] {
        &self.current
    }

    /// Categories not yet retired, in catalog order.
    pub fn available_categories(&self) -> Vec<String> {
        self.all_categories
            .iter()
            .filter(|c| !self.used.contains(*c))
            .cloned()
            .collect()
    }

    pub fn used_categories(&self) -> &BTreeSet<String> {
        &self.used
    }

    /// Questions of the current round's categories, in catalog order.
    pub fn current_round_questions(&self) -> Vec<Question> {
        self.questions
            .iter()
            .filter(|q| self.current.contains(&q.category))
            .cloned()
            .collect()
    }

    /// The wrong-answer log as the `wrong (correct)` display string.
    pub fn wrong_answers_str(&self) -> String {
        self.wrong_log.join(", ")
    }

    pub fn player_snapshot(&self) -> Option<PlayerSnapshot> {
        let name = self.player.as_ref()?;
        Some(PlayerSnapshot {
            name: name.clone(),
            level: self.level,
            score: self.score,
            hp: self.hp,
            streak: self.streak,
            sheet: self.sheet.clone().unwrap_or_default(),
            game_type: self.game_type,
            skin: self.skin,
            total_correct: self.total_correct,
            total_asked: self.total_asked,
        })
    }

    /// The profile as it should be persisted right now.
    pub fn to_record(&self) -> Option<PlayerRecord> {
        let name = self.player.as_ref()?;
        Some(PlayerRecord {
            name: name.clone(),
            level: self.level,
            score: self.score,
            hp: self.hp,
            streak: self.streak,
            sheet: self.sheet.clone().unwrap_or_default(),
            game_type: self.game_type,
            skin: self.skin,
            total_correct: self.total_correct,
            total_asked: self.total_asked,
        })
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            player: self.player_snapshot(),
            current_categories: self.current.clone(),
            available_categories: self.available_categories(),
            answered: self.answered.clone(),
            wrong_answers: self.wrong_answers_str(),
            questions: self.current_round_questions(),
        }
    }
}

fn first_appearance_categories(questions: &[Question]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    questions
        .iter()
        .filter(|q| seen.insert(q.category.clone()))
        .map(|q| q.category.clone())
        .collect()
}

// ── Thread-local session ───────────────────────────────────────────

thread_local! {
    static SESSION: RefCell<Session> = RefCell::new(Session::default());
}

/// Execute a closure with read access to the session.
pub fn with_session<F, R>(f: F) -> R
where
    F: FnOnce(&Session) -> R,
{
    SESSION.with(|s| f(&s.borrow()))
}

/// Execute a closure with mutable access to the session.
pub fn with_session_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut Session) -> R,
{
    SESSION.with(|s| f(&mut s.borrow_mut()))
}

/// Reset the session to logged-out defaults.
pub fn reset_session() {
    SESSION.with(|s| *s.borrow_mut() = Session::default());
}
