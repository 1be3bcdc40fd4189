//! Quiz Session Module
//!
//! 出題ページのランタイムと同じ状態遷移を持つ、1回分の受験セッション。
//!
//! # 状態遷移
//!
//! ```text
//!            start               submit
//!   Idle ───────────▶ Running ───────────▶ Finished
//!    ▲                   │                    │
//!    └──── restart ──────┴──── restart ───────┘
//! ```
//!
//! 描画は`RenderSurface`トレイトに委譲するため、ブラウザなしでテストできます。
//! 乱数源と現在時刻は呼び出し側から注入します。

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::api::QuestionKind;
use crate::scoring::{answers_match, ScoreReport};
use crate::types::{QuestionRecord, QuizOption};

/// セッションの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// 開始前（乱数設定と開始ボタンのみ表示）
    Idle,
    /// 解答中
    Running,
    /// 提出済み（成績と振り返りを表示）
    Finished,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Running => "running",
            Phase::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// セッション操作のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Quiz has no questions")]
    EmptyQuestionSet,

    #[error("Cannot {action} while {phase}")]
    InvalidTransition { action: &'static str, phase: Phase },

    #[error("Question index {index} is out of range (total: {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Option index {index} is out of range (total: {len})")]
    OptionOutOfRange { index: usize, len: usize },

    #[error("Current question is not a {expected:?} question")]
    WrongKind { expected: QuestionKind },

    #[error("Submit is not available yet")]
    SubmitUnavailable,
}

/// 選択肢に付ける即時フィードバック
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    /// 特に表示なし
    Plain,
    /// 正解の選択肢
    Correct,
    /// 選択された不正解の選択肢
    Incorrect,
}

/// 選択直後のフィードバック
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionFeedback {
    /// 出題順インデックス
    pub question_index: usize,

    /// 選ばれた選択肢（表示順インデックス）
    pub selected: usize,

    /// 選択が正解だったか
    pub is_correct: bool,

    /// 表示順の各選択肢のマーク
    pub marks: Vec<OptionMark>,
}

/// 1問分の表示内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView<'a> {
    /// 出題順インデックス（0始まり）
    pub index: usize,

    pub total: usize,

    pub question: &'a QuestionRecord,

    /// 今回の受験での表示順に並べた選択肢
    pub options: Vec<&'a QuizOption>,

    /// 現在の解答
    pub user_answer: Option<&'a str>,
}

/// 描画先
///
/// ブラウザでは DOM 操作、テストでは呼び出し記録に対応します。
pub trait RenderSurface {
    /// 開始前の画面（乱数設定のトグル状態）を表示
    fn show_controls(&mut self, shuffle_questions: bool, shuffle_options: bool);

    /// 問題を1問表示
    fn show_question(&mut self, view: &QuestionView<'_>);

    /// 選択問題の即時フィードバックを表示
    fn show_feedback(&mut self, feedback: &SelectionFeedback);

    /// 解答済み数を表示
    fn update_progress(&mut self, answered: usize, total: usize);

    /// 提出ボタンの表示可否
    fn set_submit_available(&mut self, available: bool);

    /// 成績と振り返りを表示
    fn show_results(&mut self, report: &ScoreReport);
}

/// 受験開始時に固定される設定
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttemptOptions {
    /// 出題順をシャッフルする
    pub shuffle_questions: bool,

    /// 選択肢の順をシャッフルする
    pub shuffle_options: bool,
}

/// 1回分の受験状態
#[derive(Debug, Clone)]
struct Attempt {
    /// 出題順（元の問題リストへのインデックス）
    order: Vec<usize>,

    /// 出題順ごとの選択肢表示順
    option_orders: Vec<Vec<usize>>,

    /// 出題順インデックス → 解答
    answers: BTreeMap<usize, String>,

    current: usize,

    started_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
enum State {
    Idle,
    Running(Attempt),
    Finished(Attempt, ScoreReport),
}

/// 受験セッション
pub struct QuizSession<S: RenderSurface> {
    /// 元の問題リスト（変更しない）
    questions: Vec<QuestionRecord>,

    surface: S,

    options: AttemptOptions,

    state: State,
}

impl<S: RenderSurface> QuizSession<S> {
    /// セッションを生成し、開始前の画面を描画する
    ///
    /// # 戻り値
    ///
    /// * `Err(SessionError::EmptyQuestionSet)` - 問題が1問もない場合
    pub fn new(questions: Vec<QuestionRecord>, mut surface: S) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::EmptyQuestionSet);
        }
        surface.show_controls(false, false);
        Ok(Self {
            questions,
            surface,
            options: AttemptOptions::default(),
            state: State::Idle,
        })
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            State::Idle => Phase::Idle,
            State::Running(_) => Phase::Running,
            State::Finished(..) => Phase::Finished,
        }
    }

    /// 描画先への参照
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// 現在のトグル状態
    pub fn attempt_options(&self) -> AttemptOptions {
        self.options
    }

    /// 出題順シャッフルのトグル（開始前のみ）
    pub fn set_shuffle_questions(&mut self, enabled: bool) -> Result<(), SessionError> {
        self.require_phase(Phase::Idle, "change shuffle settings")?;
        self.options.shuffle_questions = enabled;
        Ok(())
    }

    /// 選択肢シャッフルのトグル（開始前のみ）
    pub fn set_shuffle_options(&mut self, enabled: bool) -> Result<(), SessionError> {
        self.require_phase(Phase::Idle, "change shuffle settings")?;
        self.options.shuffle_options = enabled;
        Ok(())
    }

    /// 受験を開始する
    ///
    /// 開始時点のトグル状態で出題順・選択肢順を決め、受験中は固定します。
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        self.require_phase(Phase::Idle, "start")?;

        let mut order: Vec<usize> = (0..self.questions.len()).collect();
        if self.options.shuffle_questions {
            order.shuffle(rng);
        }

        let option_orders = order
            .iter()
            .map(|&question| {
                let mut option_order: Vec<usize> =
                    (0..self.questions[question].options.len()).collect();
                if self.options.shuffle_options {
                    option_order.shuffle(rng);
                }
                option_order
            })
            .collect();

        log::debug!(
            "attempt started: {} questions, options {:?}",
            order.len(),
            self.options
        );

        self.state = State::Running(Attempt {
            order,
            option_orders,
            answers: BTreeMap::new(),
            current: 0,
            started_at: now,
        });
        self.show_current();
        self.refresh_progress();
        Ok(())
    }

    /// 出題順の問題リスト
    pub fn working_order(&self) -> Vec<&QuestionRecord> {
        match self.attempt() {
            Some(attempt) => attempt
                .order
                .iter()
                .map(|&index| &self.questions[index])
                .collect(),
            None => Vec::new(),
        }
    }

    /// 出題順インデックスの問題について、表示順の選択肢を返す
    pub fn options_for(&self, index: usize) -> Vec<&QuizOption> {
        let Some(attempt) = self.attempt() else {
            return Vec::new();
        };
        let Some(&question) = attempt.order.get(index) else {
            return Vec::new();
        };
        attempt.option_orders[index]
            .iter()
            .map(|&option| &self.questions[question].options[option])
            .collect()
    }

    /// 現在の出題順インデックス
    pub fn current_index(&self) -> Option<usize> {
        self.attempt().map(|attempt| attempt.current)
    }

    /// 出題順インデックスの解答
    pub fn answer(&self, index: usize) -> Option<&str> {
        self.attempt()
            .and_then(|attempt| attempt.answers.get(&index))
            .map(String::as_str)
    }

    /// 解答済みの問題数
    pub fn answered_count(&self) -> usize {
        self.attempt().map_or(0, |attempt| attempt.answers.len())
    }

    /// 受験開始時刻
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.attempt().map(|attempt| attempt.started_at)
    }

    /// 直近の成績（提出済みの場合のみ）
    pub fn report(&self) -> Option<&ScoreReport> {
        match &self.state {
            State::Finished(_, report) => Some(report),
            _ => None,
        }
    }

    /// 現在の選択問題で、表示順`option_index`の選択肢を選ぶ
    ///
    /// 選択は即座に判定され、正解の選択肢と選んだ選択肢がマークされます。
    /// 選び直すと再判定されますが、比較対象は常に問題の正解テキストです。
    pub fn select_option(&mut self, option_index: usize) -> Result<SelectionFeedback, SessionError> {
        let (current, question) = self.current_question("select an option")?;
        if question.kind != QuestionKind::MultipleChoice {
            return Err(SessionError::WrongKind {
                expected: QuestionKind::MultipleChoice,
            });
        }

        let options = self.options_for(current);
        let selected = options.get(option_index).ok_or(SessionError::OptionOutOfRange {
            index: option_index,
            len: options.len(),
        })?;
        let selected_text = selected.text.clone();
        let is_correct = answers_match(&selected_text, &question.answer);
        let marks = options
            .iter()
            .enumerate()
            .map(|(i, option)| {
                if answers_match(&option.text, &question.answer) {
                    OptionMark::Correct
                } else if i == option_index {
                    OptionMark::Incorrect
                } else {
                    OptionMark::Plain
                }
            })
            .collect();

        let feedback = SelectionFeedback {
            question_index: current,
            selected: option_index,
            is_correct,
            marks,
        };

        if let State::Running(attempt) = &mut self.state {
            attempt.answers.insert(current, selected_text);
        }
        self.surface.show_feedback(&feedback);
        self.refresh_progress();
        Ok(feedback)
    }

    /// 現在の穴埋め問題に解答を入力する
    ///
    /// 解答は前後の空白を除去して保存します。空になった場合は未解答に戻します。
    pub fn enter_answer(&mut self, text: &str) -> Result<(), SessionError> {
        let (current, question) = self.current_question("enter an answer")?;
        if question.kind != QuestionKind::FillBlank {
            return Err(SessionError::WrongKind {
                expected: QuestionKind::FillBlank,
            });
        }

        if let State::Running(attempt) = &mut self.state {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                attempt.answers.remove(&current);
            } else {
                attempt.answers.insert(current, trimmed.to_string());
            }
        }
        self.refresh_progress();
        Ok(())
    }

    /// 出題順インデックスを指定して移動する
    pub fn go_to(&mut self, index: usize) -> Result<(), SessionError> {
        let len = match &self.state {
            State::Running(attempt) => attempt.order.len(),
            _ => return Err(self.invalid("navigate")),
        };
        if index >= len {
            return Err(SessionError::IndexOutOfRange { index, len });
        }
        if let State::Running(attempt) = &mut self.state {
            attempt.current = index;
        }
        self.show_current();
        self.refresh_progress();
        Ok(())
    }

    /// 次の問題へ移動する（最後の問題では何もしない）
    pub fn next(&mut self) -> Result<(), SessionError> {
        let (current, _) = self.current_question("navigate")?;
        if current + 1 < self.questions.len() {
            self.go_to(current + 1)?;
        }
        Ok(())
    }

    /// 前の問題へ移動する（最初の問題では何もしない）
    pub fn previous(&mut self) -> Result<(), SessionError> {
        let (current, _) = self.current_question("navigate")?;
        if current > 0 {
            self.go_to(current - 1)?;
        }
        Ok(())
    }

    /// 提出可能か
    ///
    /// 現在の問題が最後の問題であるか、すべての問題に解答がある場合に提出できます。
    pub fn can_submit(&self) -> bool {
        match &self.state {
            State::Running(attempt) => {
                attempt.current + 1 == attempt.order.len()
                    || attempt.answers.len() == attempt.order.len()
            }
            _ => false,
        }
    }

    /// 提出して成績を確定する
    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<&ScoreReport, SessionError> {
        self.require_phase(Phase::Running, "submit")?;
        if !self.can_submit() {
            return Err(SessionError::SubmitUnavailable);
        }

        let State::Running(attempt) = std::mem::replace(&mut self.state, State::Idle) else {
            return Err(self.invalid("submit"));
        };

        let elapsed_secs = (now - attempt.started_at).num_seconds().max(0) as u64;
        let working: Vec<&QuestionRecord> = attempt
            .order
            .iter()
            .map(|&index| &self.questions[index])
            .collect();
        let report = ScoreReport::grade(
            &working,
            |index| attempt.answers.get(&index).map(String::as_str),
            elapsed_secs,
        );

        log::debug!(
            "attempt submitted: {}/{} correct in {}s",
            report.correct,
            report.total,
            report.elapsed_secs
        );

        self.surface.show_results(&report);
        self.state = State::Finished(attempt, report);
        match &self.state {
            State::Finished(_, report) => Ok(report),
            _ => Err(self.invalid("submit")),
        }
    }

    /// 開始前の状態に戻す
    ///
    /// 解答・出題順・開始時刻を破棄し、両方のシャッフル設定をオフに戻します。
    pub fn restart(&mut self) -> Result<(), SessionError> {
        if self.phase() == Phase::Idle {
            return Err(self.invalid("restart"));
        }
        self.state = State::Idle;
        self.options = AttemptOptions::default();
        self.surface.show_controls(false, false);
        Ok(())
    }

    fn attempt(&self) -> Option<&Attempt> {
        match &self.state {
            State::Running(attempt) | State::Finished(attempt, _) => Some(attempt),
            State::Idle => None,
        }
    }

    fn current_question(
        &self,
        action: &'static str,
    ) -> Result<(usize, QuestionRecord), SessionError> {
        match &self.state {
            State::Running(attempt) => Ok((
                attempt.current,
                self.questions[attempt.order[attempt.current]].clone(),
            )),
            _ => Err(self.invalid(action)),
        }
    }

    fn require_phase(&self, phase: Phase, action: &'static str) -> Result<(), SessionError> {
        if self.phase() == phase {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn invalid(&self, action: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            action,
            phase: self.phase(),
        }
    }

    fn show_current(&mut self) {
        let State::Running(attempt) = &self.state else {
            return;
        };
        let index = attempt.current;
        let view = QuestionView {
            index,
            total: attempt.order.len(),
            question: &self.questions[attempt.order[index]],
            options: attempt.option_orders[index]
                .iter()
                .map(|&option| &self.questions[attempt.order[index]].options[option])
                .collect(),
            user_answer: attempt.answers.get(&index).map(String::as_str),
        };
        self.surface.show_question(&view);
    }

    fn refresh_progress(&mut self) {
        let (answered, total) = match &self.state {
            State::Running(attempt) => (attempt.answers.len(), attempt.order.len()),
            _ => return,
        };
        let submit_available = self.can_submit();
        self.surface.update_progress(answered, total);
        self.surface.set_submit_available(submit_available);
    }
}
