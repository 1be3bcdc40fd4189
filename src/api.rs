//! Public API Types
//!
//! 公開APIで使用する列挙型と設定型を定義するモジュール。

use serde::{Deserialize, Serialize};
use std::fmt;

/// シート選択方式
///
/// 問題集として読み込むシートを選択する方法を指定します。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum SheetSelector {
    /// 先頭のシート（デフォルト）
    #[default]
    First,

    /// インデックス指定（0始まり）
    ///
    /// 例: `SheetSelector::Index(1)` は2番目のシートを選択
    Index(usize),

    /// シート名指定
    ///
    /// 例: `SheetSelector::Name("第一章".to_string())`
    Name(String),
}

/// 選択肢のラベル（A〜D）
///
/// 元の表の列順（A→D）がそのまま`Ord`の順序になります。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
}

impl OptionLabel {
    /// 列順に並んだすべてのラベル
    pub const ALL: [OptionLabel; 4] = [OptionLabel::A, OptionLabel::B, OptionLabel::C, OptionLabel::D];

    /// 答案セルの文字列をラベルとして解釈する
    ///
    /// 前後の空白を除去し、大文字・小文字を区別せずに比較します。
    /// `A`〜`D`の1文字以外は`None`を返します。
    ///
    /// ```rust
    /// use xlsxquiz::OptionLabel;
    ///
    /// assert_eq!(OptionLabel::parse(" b "), Some(OptionLabel::B));
    /// assert_eq!(OptionLabel::parse("E"), None);
    /// assert_eq!(OptionLabel::parse("AB"), None);
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "A" => Some(OptionLabel::A),
            "B" => Some(OptionLabel::B),
            "C" => Some(OptionLabel::C),
            "D" => Some(OptionLabel::D),
            _ => None,
        }
    }

    /// 列順のインデックス（A=0 … D=3）
    pub fn index(self) -> usize {
        match self {
            OptionLabel::A => 0,
            OptionLabel::B => 1,
            OptionLabel::C => 2,
            OptionLabel::D => 3,
        }
    }

    /// ラベル文字
    pub fn as_str(self) -> &'static str {
        match self {
            OptionLabel::A => "A",
            OptionLabel::B => "B",
            OptionLabel::C => "C",
            OptionLabel::D => "D",
        }
    }
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 問題の種類
///
/// 4つの選択肢セルのうち、空でないものが1つ以上あれば`MultipleChoice`、
/// すべて空なら`FillBlank`です。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// 選択問題
    MultipleChoice,

    /// 穴埋め問題（自由入力）
    FillBlank,
}

/// 選択肢の数による問題の形状（統計用）
///
/// `QuestionKind`より細かい分類で、ビルドレポートの内訳表示に使用します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionShape {
    /// 4択
    FourOptions,

    /// 3択
    ThreeOptions,

    /// 選択肢が1〜2個の選択問題
    OtherChoice,

    /// 穴埋め
    FillBlank,
}

impl OptionShape {
    /// 空でない選択肢の数から形状を決定する
    pub fn from_option_count(count: usize) -> Self {
        match count {
            0 => OptionShape::FillBlank,
            3 => OptionShape::ThreeOptions,
            4 => OptionShape::FourOptions,
            _ => OptionShape::OtherChoice,
        }
    }

    /// レポート表示用の名称
    pub fn label(self) -> &'static str {
        match self {
            OptionShape::FourOptions => "four-option choice",
            OptionShape::ThreeOptions => "three-option choice",
            OptionShape::OtherChoice => "other choice",
            OptionShape::FillBlank => "fill-in-the-blank",
        }
    }
}

/// 問題集の列名定義
///
/// 入力表のヘッダー行に、ここで定義した6列がすべてそのまま存在する必要があります。
/// デフォルトは中国語の列名（`题干`, `选项A`〜`选项D`, `答案`）です。
///
/// # 使用例
///
/// ```rust
/// use xlsxquiz::ColumnSchema;
///
/// let schema = ColumnSchema::english();
/// assert_eq!(schema.prompt, "prompt");
/// assert_eq!(schema.required_columns().len(), 6);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    /// 題干（問題文）の列名
    pub prompt: String,

    /// 選択肢A〜Dの列名（列順）
    pub options: [String; 4],

    /// 答案の列名
    pub answer: String,
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self {
            prompt: "题干".to_string(),
            options: [
                "选项A".to_string(),
                "选项B".to_string(),
                "选项C".to_string(),
                "选项D".to_string(),
            ],
            answer: "答案".to_string(),
        }
    }
}

impl ColumnSchema {
    /// 英語の列名（`prompt`, `A`〜`D`, `answer`）
    pub fn english() -> Self {
        Self {
            prompt: "prompt".to_string(),
            options: ["A".to_string(), "B".to_string(), "C".to_string(), "D".to_string()],
            answer: "answer".to_string(),
        }
    }

    /// 必須列をスキーマ定義順（題干、選択肢A〜D、答案）で返す
    pub fn required_columns(&self) -> Vec<&str> {
        let mut columns = Vec::with_capacity(6);
        columns.push(self.prompt.as_str());
        columns.extend(self.options.iter().map(String::as_str));
        columns.push(self.answer.as_str());
        columns
    }

    /// 選択肢ラベルに対応する列名
    pub fn option_column(&self, label: OptionLabel) -> &str {
        &self.options[label.index()]
    }
}
