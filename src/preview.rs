//! Preview Module
//!
//! 問題ページを生成する前に、ワークブックの中身をざっと確認するためのモジュール。

use std::fmt;

use unicode_width::UnicodeWidthChar;

use crate::api::ColumnSchema;
use crate::types::RawTable;

/// プレビューに含めるデータ行数
pub const PREVIEW_ROWS: usize = 5;

/// プレビューのセルの最大表示幅（全角文字は2桁として数える）
pub const PREVIEW_CELL_WIDTH: usize = 50;

/// ワークブックのプレビュー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbookPreview {
    /// ファイル名
    pub file_name: String,

    /// 読み込んだシート名
    pub sheet_name: String,

    /// データ行数（ヘッダー行を除く）
    pub row_count: usize,

    /// 列名（表の順）
    pub columns: Vec<String>,

    /// 不足している必須列（スキーマ定義順）
    pub missing_columns: Vec<String>,

    /// 先頭のデータ行（各セルは表示幅で切り詰め済み）
    pub rows: Vec<Vec<String>>,
}

impl WorkbookPreview {
    pub(crate) fn from_table(
        file_name: impl Into<String>,
        sheet_name: impl Into<String>,
        table: &RawTable,
        schema: &ColumnSchema,
    ) -> Self {
        let missing_columns = schema
            .required_columns()
            .into_iter()
            .filter(|column| table.column_index(column).is_none())
            .map(str::to_string)
            .collect();

        let rows = table
            .rows
            .iter()
            .take(PREVIEW_ROWS)
            .map(|row| {
                row.iter()
                    .map(|cell| truncate_to_width(cell, PREVIEW_CELL_WIDTH))
                    .collect()
            })
            .collect();

        Self {
            file_name: file_name.into(),
            sheet_name: sheet_name.into(),
            row_count: table.row_count(),
            columns: table.headers.clone(),
            missing_columns,
            rows,
        }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// すべての必須列がそろっているか
    pub fn is_valid(&self) -> bool {
        self.missing_columns.is_empty()
    }
}

impl fmt::Display for WorkbookPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "File:    {}", self.file_name)?;
        writeln!(f, "Sheet:   {}", self.sheet_name)?;
        writeln!(f, "Rows:    {}", self.row_count)?;
        writeln!(f, "Columns: {} ({})", self.column_count(), self.columns.join(", "))?;
        if self.is_valid() {
            writeln!(f, "All required columns present")?;
        } else {
            writeln!(f, "Missing columns: {}", self.missing_columns.join(", "))?;
        }
        for (index, row) in self.rows.iter().enumerate() {
            writeln!(f, "{:>3}: {}", index + 1, row.join(" | "))?;
        }
        Ok(())
    }
}

/// 表示幅が`max_width`を超える文字列を切り詰め、末尾に`...`を付ける
///
/// 全角文字は2桁として数えます。`...`は`max_width`に含めません。
///
/// # 使用例
///
/// * `("abcdef", 3)` → `abc...`
/// * `("日本語", 4)` → `日本...`
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    let mut width = 0;
    for (index, c) in text.char_indices() {
        width += c.width().unwrap_or(0);
        if width > max_width {
            return format!("{}...", &text[..index]);
        }
    }
    text.to_string()
}
