//! Security Module
//!
//! 入力ファイルサイズの制限と、出力ファイル名の無害化を提供するモジュール。

use crate::error::QuizError;

/// セキュリティ設定
#[derive(Debug, Clone)]
pub(crate) struct SecurityConfig {
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 256MB (268_435_456 bytes)
    pub max_input_file_size: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_input_file_size: 268_435_456, // 256MB
        }
    }
}

impl SecurityConfig {
    /// 読み込んだバイト数が上限以内かを検証
    pub fn check_input_size(&self, bytes_read: u64) -> Result<(), QuizError> {
        if bytes_read > self.max_input_file_size {
            return Err(QuizError::SecurityViolation(format!(
                "Input file size exceeds maximum: {} bytes (max: {} bytes)",
                bytes_read, self.max_input_file_size
            )));
        }
        Ok(())
    }
}

/// 出力ファイル名のベース部分を無害化
///
/// パス区切り文字、Windowsで使用できない文字、制御文字を`_`に置き換え、
/// 先頭・末尾の空白とドットを除去します。結果が空になる場合は`quiz`を返します。
///
/// # 使用例
///
/// * `第一章` → `第一章`
/// * `../etc/passwd` → `_etc_passwd`
pub(crate) fn sanitize_file_stem(stem: &str) -> String {
    let replaced: String = stem
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = replaced.trim_matches(|c: char| c == '.' || c.is_whitespace());
    if trimmed.is_empty() {
        "quiz".to_string()
    } else {
        trimmed.to_string()
    }
}
