//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// xlsxquizクレート全体で使用するエラー型
///
/// 問題集ファイルの読み込み、問題モデルの構築、HTMLページの生成中に発生する
/// すべてのエラーを統一的に扱うために使用されます。
///
/// # エラーの種類
///
/// - `Io`: I/O操作中に発生したエラー（ファイル読み込み・書き込み失敗など）
/// - `Parse`: Excelファイルの解析中に発生したエラー（calamine由来）
/// - `Schema`: 必須列が存在しないエラー
/// - `EmptyBank`: 有効な問題行が1件もないエラー
/// - `Config`: 設定の検証に失敗したエラー
///
/// バッチ処理では、これらのエラーはファイル単位で報告され、
/// バッチ全体を中断することはありません。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxquiz::QuizError;
/// use std::fs::File;
///
/// fn open_bank(path: &str) -> Result<(), QuizError> {
///     let _file = File::open(path)?;  // Ioエラーが自動的に変換される
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum QuizError {
    /// I/O操作中に発生したエラー
    ///
    /// 入力ファイルが読めない、出力先に書き込めないなどの場合に使用されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Excelファイルの解析中に発生したエラー
    ///
    /// ファイル形式が不正、破損したファイルなどが原因となります。
    #[error("Failed to parse spreadsheet: {0}")]
    Parse(#[from] calamine::Error),

    /// 必須列が存在しないエラー
    ///
    /// 不足している列名をすべて保持します。このエラーが発生した場合、
    /// 部分的な処理は一切行われません。
    ///
    /// # 例
    ///
    /// ```rust,no_run
    /// use xlsxquiz::QuizError;
    ///
    /// let error = QuizError::Schema {
    ///     missing: vec!["答案".to_string()],
    /// };
    /// assert_eq!(error.to_string(), "Missing required columns: 答案");
    /// ```
    #[error("Missing required columns: {}", .missing.join(", "))]
    Schema {
        /// 不足している列名（スキーマ定義順）
        missing: Vec<String>,
    },

    /// 有効な問題行が1件もないエラー
    #[error("No valid question rows found")]
    EmptyBank,

    /// 設定の検証に失敗したエラー
    ///
    /// `QuizGeneratorBuilder::build()`時の検証や、存在しないシートの指定などで発生します。
    #[error("Configuration error: {0}")]
    Config(String),

    /// 問題データのJSONシリアライズエラー
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// セキュリティ制限に違反したエラー
    ///
    /// 入力ファイルサイズの上限超過などで発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),

    /// 表計算ファイルとして扱えない入力
    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),
}
