//! Question Model Module
//!
//! 生の表から正規化された`QuestionRecord`の列を構築する純粋な変換。
//!
//! # 処理フロー
//!
//! 1. 必須列の存在を検証（不足があれば不足列名を列挙して即座に失敗）
//! 2. 各行の選択肢セルの数から問題の種類を判定
//! 3. 選択問題では答案の文字を選択肢テキストに解決
//! 4. 有効な行に1始まりのIDを振る
//!
//! 同じ入力からは常に同じ結果が得られます。

use std::collections::BTreeMap;
use std::fmt;

use crate::api::{ColumnSchema, OptionLabel, OptionShape, QuestionKind};
use crate::error::QuizError;
use crate::types::{QuestionRecord, QuizOption, RawTable};

/// 必須列の列インデックス
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    prompt: usize,
    options: [usize; 4],
    answer: usize,
}

/// 構築時の警告
///
/// いずれも構築自体は継続し、ビルドレポートに表示されます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildWarning {
    /// 答案の文字が、値の入っている選択肢のどれとも一致しなかった
    ///
    /// 答案セルのテキストがそのまま正解として使用されます。
    AnswerResolutionFallback {
        /// 表計算ソフト上の行番号
        row: usize,
        /// 割り当てられた問題ID
        question_id: u32,
        /// 答案セルの値
        raw_answer: String,
    },

    /// 問題文または答案が空のため、行を読み飛ばした
    SkippedRow {
        /// 表計算ソフト上の行番号
        row: usize,
        /// 理由
        reason: SkipReason,
    },
}

/// 行を読み飛ばした理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyPrompt,
    EmptyAnswer,
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildWarning::AnswerResolutionFallback {
                row,
                question_id,
                raw_answer,
            } => write!(
                f,
                "row {} (question {}): answer '{}' does not match any filled option; using it verbatim",
                row, question_id, raw_answer
            ),
            BuildWarning::SkippedRow { row, reason } => {
                let reason = match reason {
                    SkipReason::EmptyPrompt => "prompt is empty",
                    SkipReason::EmptyAnswer => "answer is empty",
                };
                write!(f, "row {} skipped: {}", row, reason)
            }
        }
    }
}

/// 構築結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    /// 正規化された問題（IDは1から連番）
    pub questions: Vec<QuestionRecord>,

    /// 構築時の警告（行順）
    pub warnings: Vec<BuildWarning>,
}

impl BuildOutcome {
    /// 問題の統計情報
    pub fn stats(&self) -> QuestionStats {
        QuestionStats::from_questions(&self.questions)
    }
}

/// 問題形状ごとの件数
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionStats {
    /// 総問題数
    pub total: usize,

    /// 形状ごとの件数（形状の順序で並ぶ）
    pub by_shape: BTreeMap<OptionShape, usize>,
}

impl QuestionStats {
    /// 問題の列から統計を集計
    pub fn from_questions(questions: &[QuestionRecord]) -> Self {
        let mut by_shape = BTreeMap::new();
        for question in questions {
            let shape = OptionShape::from_option_count(question.options.len());
            *by_shape.entry(shape).or_insert(0) += 1;
        }
        Self {
            total: questions.len(),
            by_shape,
        }
    }

    /// 形状ごとの件数
    pub fn count(&self, shape: OptionShape) -> usize {
        self.by_shape.get(&shape).copied().unwrap_or(0)
    }
}

impl fmt::Display for QuestionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .by_shape
            .iter()
            .map(|(shape, count)| format!("{}: {}", shape.label(), count))
            .collect();
        write!(f, "{} questions ({})", self.total, parts.join(", "))
    }
}

/// 表の列がスキーマを満たすか検証する
///
/// # 戻り値
///
/// * `Ok(())` - すべての必須列が存在する場合
/// * `Err(QuizError::Schema)` - 不足列をスキーマ定義順に列挙したエラー
pub fn validate_columns(table: &RawTable, schema: &ColumnSchema) -> Result<(), QuizError> {
    resolve_columns(table, schema).map(|_| ())
}

fn resolve_columns(table: &RawTable, schema: &ColumnSchema) -> Result<ColumnMap, QuizError> {
    let missing: Vec<String> = schema
        .required_columns()
        .into_iter()
        .filter(|name| table.column_index(name).is_none())
        .map(str::to_string)
        .collect();

    if !missing.is_empty() {
        return Err(QuizError::Schema { missing });
    }

    // 上の検証ですべての列が存在することは確認済み
    let index = |name: &str| table.column_index(name).unwrap_or_default();
    Ok(ColumnMap {
        prompt: index(schema.prompt.as_str()),
        options: [
            index(schema.option_column(OptionLabel::A)),
            index(schema.option_column(OptionLabel::B)),
            index(schema.option_column(OptionLabel::C)),
            index(schema.option_column(OptionLabel::D)),
        ],
        answer: index(schema.answer.as_str()),
    })
}

/// 4つの選択肢セルから問題の種類を判定する
///
/// 空白のみのセルは空として扱います。
pub fn classify(option_cells: &[&str; 4]) -> QuestionKind {
    if option_cells.iter().all(|cell| cell.trim().is_empty()) {
        QuestionKind::FillBlank
    } else {
        QuestionKind::MultipleChoice
    }
}

/// 答案の文字を選択肢テキストに解決する
///
/// 一致する選択肢がなければ`None`を返します。
pub fn resolve_answer<'a>(options: &'a [QuizOption], raw_answer: &str) -> Option<&'a str> {
    let label = OptionLabel::parse(raw_answer)?;
    options
        .iter()
        .find(|option| option.label == label)
        .map(|option| option.text.as_str())
}

/// 生の表から問題を構築する
///
/// # 戻り値
///
/// * `Ok(BuildOutcome)` - 1問以上の有効な問題がある場合
/// * `Err(QuizError::Schema)` - 必須列が不足している場合（部分的な処理は行わない）
/// * `Err(QuizError::EmptyBank)` - 有効な行が1行もない場合
///
/// # 使用例
///
/// ```rust
/// use xlsxquiz::{build_questions, ColumnSchema, QuestionKind, RawTable};
///
/// let schema = ColumnSchema::english();
/// let table = RawTable::new(
///     ["prompt", "A", "B", "C", "D", "answer"].iter().map(|s| s.to_string()).collect(),
///     vec![["2+2=?", "3", "4", "5", "", "B"].iter().map(|s| s.to_string()).collect()],
/// );
///
/// let outcome = build_questions(&table, &schema).unwrap();
/// assert_eq!(outcome.questions[0].kind, QuestionKind::MultipleChoice);
/// assert_eq!(outcome.questions[0].answer, "4");
/// ```
pub fn build_questions(table: &RawTable, schema: &ColumnSchema) -> Result<BuildOutcome, QuizError> {
    let columns = resolve_columns(table, schema)?;

    let mut questions = Vec::new();
    let mut warnings = Vec::new();

    for row in 0..table.row_count() {
        let sheet_row = table.sheet_row_number(row);
        let prompt = table.cell(row, columns.prompt).trim();
        let raw_answer = table.cell(row, columns.answer).trim();
        let option_cells = [
            table.cell(row, columns.options[0]),
            table.cell(row, columns.options[1]),
            table.cell(row, columns.options[2]),
            table.cell(row, columns.options[3]),
        ];

        let kind = classify(&option_cells);

        // 完全な空行は警告なしで読み飛ばす
        if prompt.is_empty() && raw_answer.is_empty() && kind == QuestionKind::FillBlank {
            continue;
        }
        if prompt.is_empty() {
            log::warn!("row {}: prompt is empty, skipped", sheet_row);
            warnings.push(BuildWarning::SkippedRow {
                row: sheet_row,
                reason: SkipReason::EmptyPrompt,
            });
            continue;
        }
        if raw_answer.is_empty() {
            log::warn!("row {}: answer is empty, skipped", sheet_row);
            warnings.push(BuildWarning::SkippedRow {
                row: sheet_row,
                reason: SkipReason::EmptyAnswer,
            });
            continue;
        }

        let id = questions.len() as u32 + 1;

        let (options, answer) = match kind {
            QuestionKind::FillBlank => (Vec::new(), raw_answer.to_string()),
            QuestionKind::MultipleChoice => {
                let options: Vec<QuizOption> = OptionLabel::ALL
                    .iter()
                    .zip(option_cells.iter())
                    .filter(|(_, text)| !text.trim().is_empty())
                    .map(|(label, text)| QuizOption::new(*label, text.trim()))
                    .collect();

                let answer = match resolve_answer(&options, raw_answer) {
                    Some(text) => text.to_string(),
                    None => {
                        log::warn!(
                            "row {}: answer '{}' does not match any filled option",
                            sheet_row,
                            raw_answer
                        );
                        warnings.push(BuildWarning::AnswerResolutionFallback {
                            row: sheet_row,
                            question_id: id,
                            raw_answer: raw_answer.to_string(),
                        });
                        raw_answer.to_string()
                    }
                };
                (options, answer)
            }
        };

        questions.push(QuestionRecord {
            id,
            prompt: prompt.to_string(),
            kind,
            options,
            answer,
        });
    }

    if questions.is_empty() {
        return Err(QuizError::EmptyBank);
    }

    Ok(BuildOutcome {
        questions,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn english_table(rows: &[[&str; 6]]) -> RawTable {
        RawTable::new(
            ["prompt", "A", "B", "C", "D", "answer"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rows.iter()
                .map(|row| row.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    fn build(rows: &[[&str; 6]]) -> BuildOutcome {
        build_questions(&english_table(rows), &ColumnSchema::english()).unwrap()
    }

    #[test]
    fn test_multiple_choice_answer_is_option_text() {
        let outcome = build(&[["2+2=?", "3", "4", "5", "", "B"]]);
        let question = &outcome.questions[0];

        assert_eq!(question.id, 1);
        assert_eq!(question.kind, QuestionKind::MultipleChoice);
        assert_eq!(
            question.options,
            vec![
                QuizOption::new(OptionLabel::A, "3"),
                QuizOption::new(OptionLabel::B, "4"),
                QuizOption::new(OptionLabel::C, "5"),
            ]
        );
        assert_eq!(question.answer, "4");
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_fill_blank_when_all_options_blank() {
        let outcome = build(&[["Capital of France?", "", "  ", "", "", " Paris "]]);
        let question = &outcome.questions[0];

        assert_eq!(question.kind, QuestionKind::FillBlank);
        assert!(question.options.is_empty());
        assert_eq!(question.answer, "Paris");
    }

    #[test]
    fn test_answer_letter_is_case_insensitive_and_trimmed() {
        let outcome = build(&[["Pick", "x", "y", "z", "w", " d "]]);
        assert_eq!(outcome.questions[0].answer, "w");
    }

    #[test]
    fn test_options_skip_empty_cells_keeping_source_labels() {
        let outcome = build(&[["Pick", "", "yes", "", "no", "D"]]);
        let question = &outcome.questions[0];

        assert_eq!(
            question.options,
            vec![
                QuizOption::new(OptionLabel::B, "yes"),
                QuizOption::new(OptionLabel::D, "no"),
            ]
        );
        assert_eq!(question.answer, "no");
    }

    #[test]
    fn test_single_option_is_still_multiple_choice() {
        let outcome = build(&[["Only one", "", "", "lonely", "", "C"]]);
        assert_eq!(outcome.questions[0].kind, QuestionKind::MultipleChoice);
        assert_eq!(outcome.questions[0].answer, "lonely");
    }

    #[test]
    fn test_unmatched_letter_falls_back_with_warning() {
        let outcome = build(&[["Pick", "x", "y", "", "", "C"]]);
        let question = &outcome.questions[0];

        assert_eq!(question.answer, "C");
        assert_eq!(
            outcome.warnings,
            vec![BuildWarning::AnswerResolutionFallback {
                row: 2,
                question_id: 1,
                raw_answer: "C".to_string(),
            }]
        );
    }

    #[test]
    fn test_non_letter_answer_for_choice_falls_back() {
        let outcome = build(&[["Pick", "red", "blue", "", "", "blue"]]);
        assert_eq!(outcome.questions[0].answer, "blue");
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[test]
    fn test_missing_columns_are_all_named() {
        let table = RawTable::new(
            vec!["prompt".to_string(), "A".to_string(), "B".to_string()],
            vec![vec!["q".to_string(), "a".to_string(), "b".to_string()]],
        );

        match build_questions(&table, &ColumnSchema::english()) {
            Err(QuizError::Schema { missing }) => {
                assert_eq!(missing, vec!["C", "D", "answer"]);
            }
            other => panic!("Expected Schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_columns_may_appear_in_any_order() {
        let table = RawTable::new(
            ["answer", "D", "C", "B", "A", "prompt", "notes"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            vec![["A", "", "", "no", "yes", "Agree?", "ignored"]
                .iter()
                .map(|s| s.to_string())
                .collect()],
        );

        let outcome = build_questions(&table, &ColumnSchema::english()).unwrap();
        assert_eq!(outcome.questions[0].prompt, "Agree?");
        assert_eq!(outcome.questions[0].answer, "yes");
        assert_eq!(outcome.questions[0].options[0].label, OptionLabel::A);
    }

    #[test]
    fn test_blank_rows_are_dropped_and_ids_stay_contiguous() {
        let outcome = build(&[
            ["first", "", "", "", "", "one"],
            ["", "", "", "", "", ""],
            ["", "x", "", "", "", "A"],
            ["no answer", "", "", "", "", ""],
            ["second", "", "", "", "", "two"],
        ]);

        let ids: Vec<u32> = outcome.questions.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(outcome.questions[1].prompt, "second");
        assert_eq!(
            outcome.warnings,
            vec![
                BuildWarning::SkippedRow {
                    row: 4,
                    reason: SkipReason::EmptyPrompt
                },
                BuildWarning::SkippedRow {
                    row: 5,
                    reason: SkipReason::EmptyAnswer
                },
            ]
        );
    }

    #[test]
    fn test_empty_bank_is_error() {
        let result = build_questions(&english_table(&[]), &ColumnSchema::english());
        assert!(matches!(result, Err(QuizError::EmptyBank)));
    }

    #[test]
    fn test_stats_by_shape() {
        let outcome = build(&[
            ["four", "a", "b", "c", "d", "A"],
            ["three", "a", "b", "c", "", "A"],
            ["two", "a", "b", "", "", "A"],
            ["blank", "", "", "", "", "x"],
            ["blank2", "", "", "", "", "y"],
        ]);
        let stats = outcome.stats();

        assert_eq!(stats.total, 5);
        assert_eq!(stats.count(OptionShape::FourOptions), 1);
        assert_eq!(stats.count(OptionShape::ThreeOptions), 1);
        assert_eq!(stats.count(OptionShape::OtherChoice), 1);
        assert_eq!(stats.count(OptionShape::FillBlank), 2);
        assert_eq!(
            stats.to_string(),
            "5 questions (four-option choice: 1, three-option choice: 1, other choice: 1, fill-in-the-blank: 2)"
        );
    }

    #[test]
    fn test_warning_display() {
        let warning = BuildWarning::SkippedRow {
            row: 7,
            reason: SkipReason::EmptyAnswer,
        };
        assert_eq!(warning.to_string(), "row 7 skipped: answer is empty");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn cell() -> impl Strategy<Value = String> {
            prop_oneof![
                Just(String::new()),
                Just("  ".to_string()),
                "[a-z0-9]{1,6}",
            ]
        }

        proptest! {
            #[test]
            fn test_classification_totality(a in cell(), b in cell(), c in cell(), d in cell()) {
                let cells = [a.as_str(), b.as_str(), c.as_str(), d.as_str()];
                let all_blank = cells.iter().all(|s| s.trim().is_empty());
                let kind = classify(&cells);
                prop_assert_eq!(kind == QuestionKind::FillBlank, all_blank);
            }

            #[test]
            fn test_resolved_answer_is_never_the_letter(
                texts in proptest::collection::vec("[a-z]{2,6}", 4),
                answer_index in 0usize..4,
            ) {
                let letter = OptionLabel::ALL[answer_index].as_str();
                let row = [
                    "question", texts[0].as_str(), texts[1].as_str(),
                    texts[2].as_str(), texts[3].as_str(), letter,
                ];
                let outcome = build(&[row]);
                prop_assert_eq!(&outcome.questions[0].answer, &texts[answer_index]);
                prop_assert!(outcome.warnings.is_empty());
            }

            #[test]
            fn test_rebuild_is_idempotent(
                rows in proptest::collection::vec(
                    (cell(), cell(), cell(), cell(), cell(), prop_oneof![Just("A".to_string()), cell()]),
                    1..12,
                )
            ) {
                let rows: Vec<[&str; 6]> = rows
                    .iter()
                    .map(|(p, a, b, c, d, ans)| [p.as_str(), a.as_str(), b.as_str(), c.as_str(), d.as_str(), ans.as_str()])
                    .collect();
                let table = english_table(&rows);
                let schema = ColumnSchema::english();

                let first = build_questions(&table, &schema);
                let second = build_questions(&table, &schema);
                match (first, second) {
                    (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
                    (Err(QuizError::EmptyBank), Err(QuizError::EmptyBank)) => {}
                    (a, b) => prop_assert!(false, "diverging results: {:?} / {:?}", a, b),
                }
            }
        }
    }
}
