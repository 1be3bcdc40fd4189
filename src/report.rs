//! Batch Report Module
//!
//! 一括生成の結果を、ファイルごとの成否と全体の集計としてまとめるモジュール。
//! 1ファイルの失敗で一括処理全体が失敗することはなく、部分的な成功も
//! 正式な結果として扱います。

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::QuizError;
use crate::model::{BuildWarning, QuestionStats};

/// 1ファイル分の処理結果
#[derive(Debug)]
pub enum FileStatus {
    /// ページを生成した
    Success {
        /// 書き出したページのパス
        output: PathBuf,

        /// 問題の統計
        stats: QuestionStats,

        /// 構築時の警告
        warnings: Vec<BuildWarning>,
    },

    /// 生成に失敗した（出力先には何も書き込まれていない）
    Failure { error: QuizError },
}

/// 1ファイル分のレポート
#[derive(Debug)]
pub struct FileReport {
    /// 入力ファイル
    pub source: PathBuf,

    pub status: FileStatus,
}

impl FileReport {
    pub fn is_success(&self) -> bool {
        matches!(self.status, FileStatus::Success { .. })
    }

    /// 成功した場合の問題数（失敗時は0）
    pub fn question_count(&self) -> usize {
        match &self.status {
            FileStatus::Success { stats, .. } => stats.total,
            FileStatus::Failure { .. } => 0,
        }
    }
}

/// 表計算ファイルではないため処理しなかった入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedInput {
    pub source: PathBuf,
}

/// 一括処理全体の結果区分
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// 処理対象のファイルがなかった
    NothingAttempted,
    AllSucceeded,
    PartialSuccess,
    AllFailed,
}

/// 一括生成のレポート
///
/// `files`は常に入力順に並びます。
#[derive(Debug)]
pub struct BatchReport {
    /// 処理したファイルの結果（入力順）
    pub files: Vec<FileReport>,

    /// 拡張子が対象外のため処理しなかった入力（入力順）
    pub skipped: Vec<SkippedInput>,

    /// 出力ディレクトリ
    pub output_dir: PathBuf,
}

impl BatchReport {
    pub fn attempted(&self) -> usize {
        self.files.len()
    }

    pub fn succeeded(&self) -> usize {
        self.files.iter().filter(|file| file.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.attempted() - self.succeeded()
    }

    /// 成功したファイルの問題数の合計
    pub fn total_questions(&self) -> usize {
        self.files.iter().map(FileReport::question_count).sum()
    }

    /// 生成されたページのパス（入力順）
    pub fn outputs(&self) -> Vec<&Path> {
        self.files
            .iter()
            .filter_map(|file| match &file.status {
                FileStatus::Success { output, .. } => Some(output.as_path()),
                FileStatus::Failure { .. } => None,
            })
            .collect()
    }

    pub fn outcome(&self) -> BatchOutcome {
        match (self.attempted(), self.succeeded()) {
            (0, _) => BatchOutcome::NothingAttempted,
            (attempted, succeeded) if attempted == succeeded => BatchOutcome::AllSucceeded,
            (_, 0) => BatchOutcome::AllFailed,
            _ => BatchOutcome::PartialSuccess,
        }
    }

    /// 1行の状態表示
    pub fn status_line(&self) -> String {
        match self.outcome() {
            BatchOutcome::NothingAttempted => "No spreadsheet files to process".to_string(),
            BatchOutcome::AllSucceeded => format!(
                "All succeeded: {} file(s) generated, {} questions in total",
                self.succeeded(),
                self.total_questions()
            ),
            BatchOutcome::PartialSuccess => format!(
                "Partial success: {} file(s) generated, {} failed",
                self.succeeded(),
                self.failed()
            ),
            BatchOutcome::AllFailed => "All failed: no file was generated".to_string(),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.status_line())?;

        if !self.skipped.is_empty() {
            writeln!(f)?;
            writeln!(f, "Skipped (not a spreadsheet): {}", self.skipped.len())?;
            for skipped in &self.skipped {
                writeln!(f, "  - {}", file_name(&skipped.source))?;
            }
        }

        if self.succeeded() > 0 {
            writeln!(f)?;
            writeln!(f, "Generated: {}", self.succeeded())?;
            for file in &self.files {
                if let FileStatus::Success {
                    output,
                    stats,
                    warnings,
                } = &file.status
                {
                    writeln!(f, "  - {} -> {}", file_name(&file.source), file_name(output))?;
                    writeln!(f, "    {}", stats)?;
                    for warning in warnings {
                        writeln!(f, "    warning: {}", warning)?;
                    }
                }
            }
        }

        if self.failed() > 0 {
            writeln!(f)?;
            writeln!(f, "Failed: {}", self.failed())?;
            for file in &self.files {
                if let FileStatus::Failure { error } = &file.status {
                    writeln!(f, "  - {}: {}", file_name(&file.source), error)?;
                }
            }
        }

        writeln!(f)?;
        writeln!(f, "Summary:")?;
        writeln!(f, "  files attempted: {}", self.attempted())?;
        writeln!(f, "  succeeded:       {}", self.succeeded())?;
        writeln!(f, "  failed:          {}", self.failed())?;
        writeln!(f, "  skipped:         {}", self.skipped.len())?;
        writeln!(f, "  total questions: {}", self.total_questions())?;
        write!(f, "  output directory: {}", self.output_dir.display())
    }
}
