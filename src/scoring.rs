//! Scoring Module
//!
//! 解答の判定と成績レポートの集計。
//!
//! 判定は常に「前後の空白除去 + 小文字化」後のテキスト一致で行います。
//! 選択問題でも選択肢の同一性ではなくテキストで比較するため、
//! 同じテキストの選択肢が2つあれば、どちらを選んでも正解になります。

use serde::Serialize;

use crate::api::QuestionKind;
use crate::types::QuestionRecord;

/// 未解答の問題に表示する文字列
pub const UNANSWERED: &str = "unanswered";

/// 解答が正解と一致するか判定する
pub fn answers_match(user_answer: &str, answer: &str) -> bool {
    user_answer.trim().to_lowercase() == answer.trim().to_lowercase()
}

/// 正答率から決まる成績ランク
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreGrade {
    /// 90%以上
    Excellent,
    /// 70%以上
    Good,
    /// 70%未満
    NeedsWork,
}

impl ScoreGrade {
    pub fn from_accuracy(accuracy: u32) -> Self {
        if accuracy >= 90 {
            ScoreGrade::Excellent
        } else if accuracy >= 70 {
            ScoreGrade::Good
        } else {
            ScoreGrade::NeedsWork
        }
    }
}

/// 1問分の振り返り
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewEntry {
    /// 出題順での番号（1始まり）
    pub position: usize,

    /// 問題ID
    pub question_id: u32,

    pub prompt: String,

    pub kind: QuestionKind,

    /// 利用者の解答（未解答なら`None`）
    pub user_answer: Option<String>,

    /// 正解
    pub correct_answer: String,

    pub is_correct: bool,
}

impl ReviewEntry {
    /// 表示用の解答文字列（未解答なら`unanswered`）
    pub fn display_answer(&self) -> &str {
        self.user_answer.as_deref().unwrap_or(UNANSWERED)
    }
}

/// 成績レポート
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreReport {
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,

    /// 正答率（`round(correct / total * 100)`）
    pub accuracy: u32,

    pub grade: ScoreGrade,

    /// 所要時間（秒、切り捨て）
    pub elapsed_secs: u64,

    /// 出題順の振り返り
    pub review: Vec<ReviewEntry>,
}

impl ScoreReport {
    /// 出題順の問題と解答から成績を集計する
    ///
    /// `answer_for(index)`は出題順インデックスの解答を返し、未解答なら`None`です。
    pub fn grade<'a, F>(questions: &[&QuestionRecord], answer_for: F, elapsed_secs: u64) -> Self
    where
        F: Fn(usize) -> Option<&'a str>,
    {
        let review: Vec<ReviewEntry> = questions
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let user_answer = answer_for(index);
                let is_correct = user_answer
                    .map(|answer| answers_match(answer, &question.answer))
                    .unwrap_or(false);
                ReviewEntry {
                    position: index + 1,
                    question_id: question.id,
                    prompt: question.prompt.clone(),
                    kind: question.kind,
                    user_answer: user_answer.map(str::to_string),
                    correct_answer: question.answer.clone(),
                    is_correct,
                }
            })
            .collect();

        let total = review.len();
        let correct = review.iter().filter(|entry| entry.is_correct).count();
        let accuracy = accuracy_percent(correct, total);

        Self {
            total,
            correct,
            incorrect: total - correct,
            accuracy,
            grade: ScoreGrade::from_accuracy(accuracy),
            elapsed_secs,
            review,
        }
    }

    /// 所要時間を`m:ss`形式で返す
    pub fn elapsed_display(&self) -> String {
        format_elapsed(self.elapsed_secs)
    }
}

/// 正答率を整数パーセントで計算（四捨五入）
///
/// 問題数が0の場合は0を返します。
pub fn accuracy_percent(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (correct as f64 / total as f64 * 100.0).round() as u32
}

/// 秒数を`m:ss`形式に変換
pub fn format_elapsed(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
