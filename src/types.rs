//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use serde::{Deserialize, Serialize};

use crate::api::{OptionLabel, QuestionKind};

/// 表計算シートから読み出した生の表
///
/// 先頭行をヘッダーとし、以降をデータ行として保持します。
/// セルはすべて正規化済みのテキスト（空セルは空文字列）です。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTable {
    /// ヘッダー行の列名
    pub headers: Vec<String>,

    /// データ行（ヘッダー行を除く）
    pub rows: Vec<Vec<String>>,

    /// ヘッダー行のシート上の位置（0始まり）
    ///
    /// シートの先頭に空行がある場合、使用範囲はその下から始まります。
    pub header_row: usize,
}

impl RawTable {
    /// ヘッダーとデータ行から表を生成
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            headers,
            rows,
            header_row: 0,
        }
    }

    /// ヘッダー行のシート上の位置（0始まり）を設定
    pub fn with_header_row(mut self, header_row: usize) -> Self {
        self.header_row = header_row;
        self
    }

    /// 列名から列インデックスを検索
    ///
    /// 列名は前後の空白を除去して完全一致で比較します。
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header.trim() == name)
    }

    /// セルのテキストを取得
    ///
    /// 行が短い場合など、セルが存在しなければ空文字列を返します。
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    /// データ行数
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// データ行の表計算ソフト上の行番号（1始まり）
    pub fn sheet_row_number(&self, row: usize) -> usize {
        self.header_row + row + 2
    }
}

/// 選択肢
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuizOption {
    /// 元の列に対応するラベル（A〜D）
    pub label: OptionLabel,

    /// 選択肢のテキスト
    pub text: String,
}

impl QuizOption {
    pub fn new(label: OptionLabel, text: impl Into<String>) -> Self {
        Self {
            label,
            text: text.into(),
        }
    }
}

/// 正規化された1問分のレコード
///
/// ビルド時に1度だけ生成され、以降は変更されません。
/// 埋め込みデータとしてそのままJSONにシリアライズされます。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// 1始まりの通し番号
    pub id: u32,

    /// 問題文（空でない）
    pub prompt: String,

    /// 問題の種類
    pub kind: QuestionKind,

    /// 選択肢（選択問題のみ、列順）
    pub options: Vec<QuizOption>,

    /// 正解テキスト
    ///
    /// 選択問題では、答案の文字（A〜D）ではなく対応する選択肢のテキストです。
    pub answer: String,
}

impl QuestionRecord {
    /// 選択問題かどうか
    pub fn is_multiple_choice(&self) -> bool {
        self.kind == QuestionKind::MultipleChoice
    }
}
