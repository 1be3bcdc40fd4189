//! Output Module
//!
//! 問題リストを1枚の自己完結したHTMLページとして出力するモジュール。
//!
//! ページは次の3つで構成されます。
//!
//! * 静的なマークアップ（タイトル、透かし、各画面の枠）
//! * 静的なスタイルとランタイムスクリプト（`assets/`から埋め込み）
//! * 問題データのJSONブロック（`<script type="application/json" id="quiz-data">`）
//!
//! ランタイムスクリプトはテンプレート展開されず、ページ読み込み時に
//! JSONブロックを読み取ります。外部リソースへのアクセスはありません。

mod escape;

use std::io::Write;

use serde::Serialize;

use crate::error::QuizError;
use crate::types::QuestionRecord;

pub(crate) use escape::{escape_html, escape_script_json};

/// 埋め込みランタイムスクリプト
pub const RUNTIME_SCRIPT: &str = include_str!("../../assets/runtime.js");

/// 埋め込みスタイルシート
pub const STYLESHEET: &str = include_str!("../../assets/styles.css");

/// 埋め込みデータブロックの要素ID
pub const DATA_BLOCK_ID: &str = "quiz-data";

/// 埋め込みデータの形
#[derive(Serialize)]
struct PageData<'a> {
    questions: &'a [QuestionRecord],
}

/// HTMLページのレンダラー
#[derive(Debug, Clone)]
pub(crate) struct PageRenderer {
    /// ページ下部に表示する透かし文字列
    watermark: String,
}

impl PageRenderer {
    pub fn new(watermark: impl Into<String>) -> Self {
        Self {
            watermark: watermark.into(),
        }
    }

    /// ページを書き出す
    ///
    /// # 引数
    ///
    /// * `title` - ページタイトル（通常は入力ファイルのベース名）
    /// * `questions` - 出題する問題（正規の順序）
    /// * `writer` - 出力先
    ///
    /// # 戻り値
    ///
    /// * `Ok(())` - 出力に成功した場合
    /// * `Err(QuizError::Serialization)` - 問題データのシリアライズに失敗した場合
    /// * `Err(QuizError::Io)` - 書き込みに失敗した場合
    pub fn render<W: Write>(
        &self,
        title: &str,
        questions: &[QuestionRecord],
        writer: &mut W,
    ) -> Result<(), QuizError> {
        let data = serde_json::to_string(&PageData { questions })?;
        let title = escape_html(title);
        let watermark = escape_html(&self.watermark);

        writeln!(writer, "<!DOCTYPE html>")?;
        writeln!(writer, "<html lang=\"zh-CN\">")?;
        writeln!(writer, "<head>")?;
        writeln!(writer, "<meta charset=\"UTF-8\">")?;
        writeln!(
            writer,
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">"
        )?;
        writeln!(writer, "<title>{}</title>", title)?;
        writeln!(writer, "<style>\n{}</style>", STYLESHEET)?;
        writeln!(writer, "</head>")?;
        writeln!(writer, "<body>")?;
        writeln!(writer, "<main class=\"container\">")?;
        writeln!(writer, "<div class=\"quiz-container\">")?;
        writeln!(writer, "<h1 class=\"quiz-title\">{}</h1>", title)?;

        // 開始前
        writeln!(writer, "<div class=\"quiz-controls\" id=\"quizControls\">")?;
        writeln!(
            writer,
            "<div class=\"control-group\"><label for=\"shuffleQuestions\">题目乱序:</label>\
             <label class=\"switch\"><input type=\"checkbox\" id=\"shuffleQuestions\">\
             <span class=\"slider\"></span></label></div>"
        )?;
        writeln!(
            writer,
            "<div class=\"control-group\"><label for=\"shuffleOptions\">选项乱序:</label>\
             <label class=\"switch\"><input type=\"checkbox\" id=\"shuffleOptions\">\
             <span class=\"slider\"></span></label></div>"
        )?;
        writeln!(
            writer,
            "<button type=\"button\" class=\"start-btn\" id=\"startBtn\">开始答题</button>"
        )?;
        writeln!(writer, "</div>")?;

        // 解答中
        writeln!(
            writer,
            "<div class=\"progress-container\" id=\"progressContainer\" style=\"display: none;\">\
             <div class=\"progress-bar\"><div class=\"progress-fill\" id=\"progressFill\"></div></div>\
             <div class=\"progress-text\" id=\"progressText\">0 / {}</div></div>",
            questions.len()
        )?;
        writeln!(
            writer,
            "<div class=\"question-nav\" id=\"questionNav\" style=\"display: none;\"></div>"
        )?;
        writeln!(
            writer,
            "<div class=\"question-container\" id=\"questionArea\" style=\"display: none;\"></div>"
        )?;
        writeln!(
            writer,
            "<div class=\"navigation-container\" id=\"navigationContainer\" style=\"display: none;\">"
        )?;
        writeln!(
            writer,
            "<div class=\"nav-buttons\">\
             <button type=\"button\" class=\"nav-btn\" id=\"prevBtn\" disabled>上一题</button>\
             <button type=\"button\" class=\"nav-btn\" id=\"nextBtn\">下一题</button>\
             <button type=\"button\" class=\"nav-btn\" id=\"submitBtn\" style=\"display: none;\">提交答案</button>\
             </div>"
        )?;
        writeln!(writer, "<div class=\"watermark\">{}</div>", watermark)?;
        writeln!(writer, "</div>")?;

        // 提出後
        writeln!(
            writer,
            "<div id=\"resultsContainer\" style=\"display: none;\"></div>"
        )?;

        writeln!(writer, "</div>")?;
        writeln!(writer, "</main>")?;
        writeln!(
            writer,
            "<script type=\"application/json\" id=\"{}\">{}</script>",
            DATA_BLOCK_ID,
            escape_script_json(&data)
        )?;
        writeln!(writer, "<script>\n{}</script>", RUNTIME_SCRIPT)?;
        writeln!(writer, "</body>")?;
        writeln!(writer, "</html>")?;

        writer.flush()?;
        Ok(())
    }

    /// ページを文字列として返す
    pub fn render_to_string(
        &self,
        title: &str,
        questions: &[QuestionRecord],
    ) -> Result<String, QuizError> {
        let mut buffer = Vec::new();
        self.render(title, questions, &mut buffer)?;

        let page = String::from_utf8(buffer).map_err(|e| {
            QuizError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;

        Ok(page)
    }
}
