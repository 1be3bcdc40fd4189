//! xlsxquiz - Turn spreadsheet question banks into self-contained HTML quizzes
//!
//! 表計算ファイル（XLSX / XLSM / XLS / ODS）の問題集を読み込み、
//! ネットワーク接続なしで動作する1枚のHTMLテストページに変換します。
//!
//! 問題集の1行が1問に対応し、次の6列が必要です（列名は変更可能）。
//!
//! | 题干 | 选项A | 选项B | 选项C | 选项D | 答案 |
//! |------|-------|-------|-------|-------|------|
//! | 2+2=? | 3 | 4 | 5 | | B |
//! | 法国的首都是？ | | | | | 巴黎 |
//!
//! 選択肢が1つでもあれば選択問題、4つとも空なら穴埋め問題になります。
//! 選択問題の答案（A〜D）は対応する選択肢のテキストに解決されます。
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use xlsxquiz::QuizGeneratorBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let generator = QuizGeneratorBuilder::new().build()?;
//!
//!     // 1ファイルずつ、または一括で生成
//!     let report = generator.generate_batch(&["第一章.xlsx"], Path::new("outputs"))?;
//!     println!("{}", report);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Custom Configuration
//!
//! ```rust,no_run
//! use std::fs::File;
//! use xlsxquiz::{ColumnSchema, QuizGeneratorBuilder, SheetSelector};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let generator = QuizGeneratorBuilder::new()
//!         .with_sheet_selector(SheetSelector::Name("Unit 1".to_string()))
//!         .with_columns(ColumnSchema::english())
//!         .with_watermark("Grade 7 Math")
//!         .build()?;
//!
//!     let quiz = generator.generate(File::open("unit1.xlsx")?, "Unit 1")?;
//!     for warning in &quiz.outcome.warnings {
//!         eprintln!("warning: {}", warning);
//!     }
//!     std::fs::write("unit1.html", quiz.html)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Quiz Session
//!
//! 生成されたページのランタイムと同じ状態遷移を`QuizSession`で再現できます。
//! 描画先は`RenderSurface`トレイトとして注入します。
//!
//! ```rust
//! use chrono::Utc;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use xlsxquiz::{
//!     OptionLabel, QuestionKind, QuestionRecord, QuestionView, QuizOption, QuizSession,
//!     RenderSurface, ScoreReport, SelectionFeedback,
//! };
//!
//! struct Headless;
//!
//! impl RenderSurface for Headless {
//!     fn show_controls(&mut self, _: bool, _: bool) {}
//!     fn show_question(&mut self, _: &QuestionView<'_>) {}
//!     fn show_feedback(&mut self, _: &SelectionFeedback) {}
//!     fn update_progress(&mut self, _: usize, _: usize) {}
//!     fn set_submit_available(&mut self, _: bool) {}
//!     fn show_results(&mut self, _: &ScoreReport) {}
//! }
//!
//! # fn main() -> Result<(), xlsxquiz::SessionError> {
//! let question = QuestionRecord {
//!     id: 1,
//!     prompt: "2+2=?".to_string(),
//!     kind: QuestionKind::MultipleChoice,
//!     options: vec![QuizOption::new(OptionLabel::A, "3"), QuizOption::new(OptionLabel::B, "4")],
//!     answer: "4".to_string(),
//! };
//!
//! let mut session = QuizSession::new(vec![question], Headless)?;
//! session.start(&mut StdRng::seed_from_u64(0), Utc::now())?;
//! session.select_option(1)?;
//! let report = session.submit(Utc::now())?;
//! assert_eq!(report.accuracy, 100);
//! # Ok(())
//! # }
//! ```

mod api;
mod builder;
mod error;
mod formatter;
mod model;
mod output;
mod parser;
mod preview;
mod report;
mod scoring;
mod security;
mod session;
mod types;

// 公開API
pub use api::{ColumnSchema, OptionLabel, OptionShape, QuestionKind, SheetSelector};
pub use builder::{
    is_spreadsheet, GeneratedQuiz, QuizGenerator, QuizGeneratorBuilder, DEFAULT_WATERMARK,
    MAX_WATERMARK_CHARS, SUPPORTED_EXTENSIONS,
};
pub use error::QuizError;
pub use model::{
    build_questions, classify, resolve_answer, validate_columns, BuildOutcome, BuildWarning,
    QuestionStats, SkipReason,
};
pub use output::{DATA_BLOCK_ID, RUNTIME_SCRIPT, STYLESHEET};
pub use preview::{truncate_to_width, WorkbookPreview, PREVIEW_CELL_WIDTH, PREVIEW_ROWS};
pub use report::{BatchOutcome, BatchReport, FileReport, FileStatus, SkippedInput};
pub use scoring::{
    accuracy_percent, answers_match, format_elapsed, ReviewEntry, ScoreGrade, ScoreReport,
    UNANSWERED,
};
pub use session::{
    AttemptOptions, OptionMark, Phase, QuestionView, QuizSession, RenderSurface, SelectionFeedback,
    SessionError,
};
pub use types::{QuestionRecord, QuizOption, RawTable};
