//! Formatter Module
//!
//! セル値を問題モデル用のテキストに正規化するモジュール。
//! 空セル・エラーセルは空文字列となり、すべての結果は前後の空白が除去されます。

use calamine::Data;
use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::error::QuizError;

/// セルフォーマッター
///
/// calamineのセル値をテキストへ変換するファサードとして機能します。
#[derive(Debug, Default)]
pub(crate) struct CellFormatter {
    /// 日付フォーマッター
    date_formatter: DateFormatter,

    /// 数値フォーマッター
    number_formatter: NumberFormatter,
}

impl CellFormatter {
    /// 新しいCellFormatterインスタンスを生成
    pub fn new() -> Self {
        Self::default()
    }

    /// セル値をテキストに変換
    ///
    /// # 戻り値
    ///
    /// * `Ok(String)` - 前後の空白を除去したテキスト（空セルは空文字列）
    /// * `Err(QuizError)` - 日付計算がオーバーフローした場合
    pub fn format_cell(&self, cell: &Data) -> Result<String, QuizError> {
        let text = match cell {
            Data::Int(i) => i.to_string(),
            Data::Float(f) => self.number_formatter.format(*f),
            Data::String(s) => s.clone(),
            Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            Data::DateTime(dt) => self.date_formatter.format(dt.as_f64())?,
            Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
            Data::Error(_) | Data::Empty => String::new(),
        };

        Ok(text.trim().to_string())
    }

}

/// 日付フォーマッター
///
/// Excelのシリアル日付値（1900年システム）をISO 8601形式の文字列に変換します。
#[derive(Debug, Default)]
pub(crate) struct DateFormatter;

impl DateFormatter {
    /// シリアル日付値をフォーマット
    ///
    /// 時刻成分がない場合は`YYYY-MM-DD`、ある場合は`YYYY-MM-DD HH:MM:SS`を返します。
    ///
    /// # エポックシステム
    ///
    /// - シリアル値1 = 1900-01-01
    /// - シリアル値60 = Excelの1900年うるう年バグによる存在しない日（1900-02-29）。
    ///   1900-02-28として扱います
    /// - シリアル値61以降は1899-12-30起算
    pub fn format(&self, serial_value: f64) -> Result<String, QuizError> {
        let overflow = || {
            QuizError::Config(format!(
                "Date calculation overflow: serial_value={}",
                serial_value
            ))
        };
        if !serial_value.is_finite() {
            return Err(overflow());
        }

        let days = serial_value.floor() as i64;
        let epoch = if days < 61 {
            NaiveDate::from_ymd_opt(1899, 12, 31)
        } else {
            NaiveDate::from_ymd_opt(1899, 12, 30)
        }
        .ok_or_else(|| QuizError::Config("Invalid epoch date".to_string()))?;

        let days = if days == 60 { 59 } else { days };
        let date = Duration::try_days(days)
            .and_then(|offset| epoch.checked_add_signed(offset))
            .ok_or_else(overflow)?;

        let seconds = ((serial_value - serial_value.floor()) * 86_400.0).round() as i64;
        if seconds == 0 {
            return Ok(date.format("%Y-%m-%d").to_string());
        }

        let datetime: NaiveDateTime = date
            .and_hms_opt(0, 0, 0)
            .and_then(|midnight| midnight.checked_add_signed(Duration::seconds(seconds)))
            .ok_or_else(|| {
                QuizError::Config(format!(
                    "Time calculation overflow: serial_value={}",
                    serial_value
                ))
            })?;
        Ok(datetime.format("%Y-%m-%d %H:%M:%S").to_string())
    }
}

/// 数値フォーマッター
///
/// 整数値の浮動小数点数は小数部なしで出力します（`4.0` → `4`）。
#[derive(Debug, Default)]
pub(crate) struct NumberFormatter;

impl NumberFormatter {
    pub fn format(&self, value: f64) -> String {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
            format!("{}", value as i64)
        } else {
            value.to_string()
        }
    }
}
