//! Builder Module
//!
//! Fluent Builder APIを提供し、`QuizGenerator`インスタンスを段階的に構築する。

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tempfile::NamedTempFile;

use crate::api::{ColumnSchema, SheetSelector};
use crate::error::QuizError;
use crate::model::{build_questions, BuildOutcome};
use crate::output::PageRenderer;
use crate::parser::WorkbookParser;
use crate::preview::WorkbookPreview;
use crate::report::{BatchReport, FileReport, FileStatus, SkippedInput};
use crate::security::sanitize_file_stem;

/// 透かしのデフォルト値
pub const DEFAULT_WATERMARK: &str = "坦克云课堂";

/// 透かしの最大文字数
pub const MAX_WATERMARK_CHARS: usize = 200;

/// 一括処理で受け付ける拡張子（小文字）
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xls", "ods"];

/// 生成処理の設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct GeneratorConfig {
    /// シート選択方式
    pub sheet_selector: SheetSelector,

    /// 必須列の列名
    pub columns: ColumnSchema,

    /// ページに表示する透かし
    pub watermark: String,

    /// ページタイトル（Noneの場合は入力ファイルのベース名）
    pub title: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            sheet_selector: SheetSelector::First,
            columns: ColumnSchema::default(),
            watermark: DEFAULT_WATERMARK.to_string(),
            title: None,
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxquiz::{ColumnSchema, QuizGeneratorBuilder, SheetSelector};
///
/// # fn main() -> Result<(), xlsxquiz::QuizError> {
/// let generator = QuizGeneratorBuilder::new()
///     .with_sheet_selector(SheetSelector::Index(0))
///     .with_columns(ColumnSchema::english())
///     .with_watermark("Unit 3")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct QuizGeneratorBuilder {
    /// 内部設定（構築中）
    config: GeneratorConfig,
}

impl Default for QuizGeneratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizGeneratorBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - シート選択: 先頭のシート
    /// - 列名: `题干`, `选项A`〜`选项D`, `答案`
    /// - 透かし: `坦克云课堂`
    /// - タイトル: 入力ファイルのベース名
    pub fn new() -> Self {
        Self {
            config: GeneratorConfig::default(),
        }
    }

    /// 問題を読み込むシートを選択する
    ///
    /// ```rust,no_run
    /// use xlsxquiz::{QuizGeneratorBuilder, SheetSelector};
    ///
    /// let builder = QuizGeneratorBuilder::new()
    ///     .with_sheet_selector(SheetSelector::Name("第一章".to_string()));
    /// ```
    pub fn with_sheet_selector(mut self, selector: SheetSelector) -> Self {
        self.config.sheet_selector = selector;
        self
    }

    /// 必須列の列名を指定する
    pub fn with_columns(mut self, columns: ColumnSchema) -> Self {
        self.config.columns = columns;
        self
    }

    /// ページに表示する透かしを指定する
    pub fn with_watermark(mut self, watermark: impl Into<String>) -> Self {
        self.config.watermark = watermark.into();
        self
    }

    /// すべてのページに共通のタイトルを指定する
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.title = Some(title.into());
        self
    }

    /// 設定を検証し、`QuizGenerator`インスタンスを生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(QuizGenerator)`: 設定が有効な場合
    /// * `Err(QuizError::Config)`: 設定が無効な場合
    ///
    /// # 発生し得るエラー
    ///
    /// * 列名が空
    /// * 同じ列名が複数の役割に指定されている
    /// * 透かしが`MAX_WATERMARK_CHARS`文字を超える
    pub fn build(self) -> Result<QuizGenerator, QuizError> {
        // 1. 列名の検証
        let mut seen = HashSet::new();
        for column in self.config.columns.required_columns() {
            let column = column.trim();
            if column.is_empty() {
                return Err(QuizError::Config("Column name must not be empty".to_string()));
            }
            if !seen.insert(column) {
                return Err(QuizError::Config(format!(
                    "Column name '{}' is used more than once",
                    column
                )));
            }
        }

        // 2. 透かしの検証
        let watermark_chars = self.config.watermark.chars().count();
        if watermark_chars > MAX_WATERMARK_CHARS {
            return Err(QuizError::Config(format!(
                "Watermark is too long: {} characters (max: {})",
                watermark_chars, MAX_WATERMARK_CHARS
            )));
        }

        Ok(QuizGenerator::new(self.config))
    }
}

/// 1件分の生成結果
#[derive(Debug, Clone)]
pub struct GeneratedQuiz {
    /// 完成したHTMLページ
    pub html: String,

    /// 問題の構築結果
    pub outcome: BuildOutcome,
}

/// 問題ページ生成のファサード
///
/// # 使用例
///
/// ```rust,no_run
/// use std::path::Path;
/// use xlsxquiz::QuizGeneratorBuilder;
///
/// # fn main() -> Result<(), xlsxquiz::QuizError> {
/// let generator = QuizGeneratorBuilder::new().build()?;
/// let report = generator.generate_batch(&["第一章.xlsx", "第二章.xlsx"], Path::new("outputs"))?;
/// println!("{}", report);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct QuizGenerator {
    /// 生成設定
    config: GeneratorConfig,

    /// ページレンダラー
    renderer: PageRenderer,
}

impl QuizGenerator {
    pub(crate) fn new(config: GeneratorConfig) -> Self {
        Self {
            renderer: PageRenderer::new(config.watermark.clone()),
            config,
        }
    }

    /// ワークブックを読み込み、問題モデルを構築する
    ///
    /// # 戻り値
    ///
    /// * `Ok(BuildOutcome)` - 1問以上の問題と警告
    /// * `Err(QuizError::Schema)` - 必須列が不足している場合
    /// * `Err(QuizError::EmptyBank)` - 有効な問題行がない場合
    pub fn load_questions<R: Read>(&self, input: R) -> Result<BuildOutcome, QuizError> {
        let mut parser = WorkbookParser::open(input)?;
        let table = parser.read_selected(&self.config.sheet_selector)?;
        build_questions(&table, &self.config.columns)
    }

    /// ワークブックから問題ページを生成する
    ///
    /// `title`は`with_title`が指定されていない場合のページタイトルです。
    ///
    /// ```rust,no_run
    /// use std::fs::File;
    /// use xlsxquiz::QuizGeneratorBuilder;
    ///
    /// # fn main() -> Result<(), xlsxquiz::QuizError> {
    /// let generator = QuizGeneratorBuilder::new().build()?;
    /// let quiz = generator.generate(File::open("第一章.xlsx")?, "第一章")?;
    /// println!("{} questions", quiz.outcome.questions.len());
    /// # Ok(())
    /// # }
    /// ```
    pub fn generate<R: Read>(&self, input: R, title: &str) -> Result<GeneratedQuiz, QuizError> {
        let outcome = self.load_questions(input)?;
        let title = self.config.title.as_deref().unwrap_or(title);
        let html = self.renderer.render_to_string(title, &outcome.questions)?;
        Ok(GeneratedQuiz { html, outcome })
    }

    /// 入力ファイルから問題ページを生成し、`output`に書き出す
    ///
    /// ページは出力先と同じディレクトリの一時ファイルに書き込んでから
    /// リネームするため、失敗時に出力先へ不完全なファイルが残ることはありません。
    ///
    /// 対応する拡張子以外の入力は`QuizError::UnsupportedInput`を返します。
    pub fn generate_file(&self, source: &Path, output: &Path) -> Result<BuildOutcome, QuizError> {
        if !is_spreadsheet(source) {
            return Err(QuizError::UnsupportedInput(source.display().to_string()));
        }
        log::debug!("generating {} -> {}", source.display(), output.display());

        let input = File::open(source)?;
        let title = source
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let quiz = self.generate(input, &title)?;
        write_atomically(output, &quiz.html)?;

        log::info!(
            "generated {} ({} questions)",
            output.display(),
            quiz.outcome.questions.len()
        );
        Ok(quiz.outcome)
    }

    /// 複数の入力ファイルから問題ページを一括生成する
    ///
    /// 対応する拡張子（`SUPPORTED_EXTENSIONS`）以外の入力は処理せずスキップ扱いにします。
    /// 各ファイルは独立に並列処理され、1ファイルの失敗は他のファイルに影響しません。
    /// レポートは常に入力順に並びます。
    ///
    /// # 戻り値
    ///
    /// * `Ok(BatchReport)` - ファイルごとの成否（一部失敗を含む）
    /// * `Err(QuizError::Io)` - 出力ディレクトリを作成できない場合
    pub fn generate_batch<P: AsRef<Path>>(
        &self,
        inputs: &[P],
        output_dir: &Path,
    ) -> Result<BatchReport, QuizError> {
        fs::create_dir_all(output_dir)?;

        let mut skipped = Vec::new();
        let mut sources = Vec::new();
        for input in inputs {
            let path = input.as_ref();
            if is_spreadsheet(path) {
                sources.push(path.to_path_buf());
            } else {
                log::warn!("skipping {}: not a spreadsheet file", path.display());
                skipped.push(SkippedInput {
                    source: path.to_path_buf(),
                });
            }
        }

        let outputs = plan_output_paths(&sources, output_dir);

        // 各ファイルを並列に処理し、入力順に並べ直す
        let mut files: Vec<(usize, FileReport)> = sources
            .par_iter()
            .zip(outputs.par_iter())
            .enumerate()
            .map(|(index, (source, output))| {
                let status = match self.generate_file(source, output) {
                    Ok(outcome) => FileStatus::Success {
                        output: output.clone(),
                        stats: outcome.stats(),
                        warnings: outcome.warnings,
                    },
                    Err(error) => {
                        log::error!("failed to generate {}: {}", source.display(), error);
                        FileStatus::Failure { error }
                    }
                };
                (
                    index,
                    FileReport {
                        source: source.clone(),
                        status,
                    },
                )
            })
            .collect();

        files.sort_by_key(|(index, _)| *index);

        Ok(BatchReport {
            files: files.into_iter().map(|(_, report)| report).collect(),
            skipped,
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// ワークブックのプレビューを作成する
    ///
    /// 必須列が不足していてもエラーにはせず、不足列としてプレビューに含めます。
    pub fn preview<R: Read>(&self, input: R, file_name: &str) -> Result<WorkbookPreview, QuizError> {
        let mut parser = WorkbookParser::open(input)?;
        let sheet_name = parser.select_sheet(&self.config.sheet_selector)?;
        let table = parser.read_table(&sheet_name)?;
        Ok(WorkbookPreview::from_table(
            file_name,
            sheet_name,
            &table,
            &self.config.columns,
        ))
    }
}

/// 拡張子が対応する表計算形式か（大文字・小文字を区別しない）
pub fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

/// 入力ごとの出力パスを決める
///
/// `<ベース名>.html`を基本とし、同じベース名が続く場合は入力順に
/// `-2`、`-3`…を付けて衝突を避けます。
pub(crate) fn plan_output_paths(sources: &[PathBuf], output_dir: &Path) -> Vec<PathBuf> {
    let mut taken = HashSet::new();
    sources
        .iter()
        .map(|source| {
            let stem = source
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            let base = sanitize_file_stem(&stem);

            let mut name = format!("{}.html", base);
            let mut suffix = 2;
            while !taken.insert(name.to_lowercase()) {
                name = format!("{}-{}.html", base, suffix);
                suffix += 1;
            }
            output_dir.join(name)
        })
        .collect()
}

/// 一時ファイル経由で`path`に書き込む
fn write_atomically(path: &Path, contents: &str) -> Result<(), QuizError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(contents.as_bytes())?;
    temp.flush()?;
    temp.persist(path).map_err(|e| QuizError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiz_generator_builder_new() {
        let builder = QuizGeneratorBuilder::new();
        assert_eq!(builder.config.sheet_selector, SheetSelector::First);
        assert_eq!(builder.config.columns, ColumnSchema::default());
        assert_eq!(builder.config.watermark, DEFAULT_WATERMARK);
        assert!(builder.config.title.is_none());
    }

    #[test]
    fn test_builder_method_chaining() {
        let builder = QuizGeneratorBuilder::new()
            .with_sheet_selector(SheetSelector::Name("Sheet2".to_string()))
            .with_columns(ColumnSchema::english())
            .with_watermark("Unit 3")
            .with_title("Review");

        assert!(matches!(
            builder.config.sheet_selector,
            SheetSelector::Name(ref name) if name == "Sheet2"
        ));
        assert_eq!(builder.config.columns.prompt, "prompt");
        assert_eq!(builder.config.watermark, "Unit 3");
        assert_eq!(builder.config.title.as_deref(), Some("Review"));
    }

    #[test]
    fn test_build_success() {
        assert!(QuizGeneratorBuilder::new().build().is_ok());
        assert!(QuizGeneratorBuilder::new().with_watermark("").build().is_ok());
    }

    #[test]
    fn test_build_with_empty_column_name() {
        let mut columns = ColumnSchema::english();
        columns.answer = "  ".to_string();
        match QuizGeneratorBuilder::new().with_columns(columns).build() {
            Err(QuizError::Config(msg)) => assert!(msg.contains("must not be empty")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_build_with_duplicate_column_name() {
        let mut columns = ColumnSchema::english();
        columns.options[3] = "A".to_string();
        match QuizGeneratorBuilder::new().with_columns(columns).build() {
            Err(QuizError::Config(msg)) => assert!(msg.contains("'A' is used more than once")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_build_with_long_watermark() {
        let result = QuizGeneratorBuilder::new()
            .with_watermark("水".repeat(MAX_WATERMARK_CHARS + 1))
            .build();
        assert!(matches!(result, Err(QuizError::Config(_))));

        let result = QuizGeneratorBuilder::new()
            .with_watermark("水".repeat(MAX_WATERMARK_CHARS))
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_generate_with_invalid_input() {
        let generator = QuizGeneratorBuilder::new().build().unwrap();
        let result = generator.generate(std::io::Cursor::new(Vec::<u8>::new()), "empty");
        assert!(result.is_err());
    }

    #[test]
    fn test_generate_file_rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("notes.txt");
        fs::write(&source, "not a workbook").unwrap();
        let output = dir.path().join("notes.html");

        let generator = QuizGeneratorBuilder::new().build().unwrap();
        match generator.generate_file(&source, &output) {
            Err(QuizError::UnsupportedInput(name)) => assert!(name.ends_with("notes.txt")),
            other => panic!("Expected UnsupportedInput error, got {:?}", other.map(|_| ())),
        }
        assert!(!output.exists());
    }

    #[test]
    fn test_is_spreadsheet() {
        assert!(is_spreadsheet(Path::new("a.xlsx")));
        assert!(is_spreadsheet(Path::new("dir/B.XLS")));
        assert!(is_spreadsheet(Path::new("c.xlsm")));
        assert!(is_spreadsheet(Path::new("d.ods")));
        assert!(!is_spreadsheet(Path::new("e.csv")));
        assert!(!is_spreadsheet(Path::new("xlsx")));
        assert!(!is_spreadsheet(Path::new("f.xlsx.txt")));
    }

    #[test]
    fn test_plan_output_paths_disambiguates_in_input_order() {
        let sources = vec![
            PathBuf::from("a/第一章.xlsx"),
            PathBuf::from("b/第一章.xls"),
            PathBuf::from("c/other.xlsx"),
            PathBuf::from("d/第一章.ods"),
        ];
        let outputs = plan_output_paths(&sources, Path::new("out"));
        assert_eq!(
            outputs,
            vec![
                PathBuf::from("out/第一章.html"),
                PathBuf::from("out/第一章-2.html"),
                PathBuf::from("out/other.html"),
                PathBuf::from("out/第一章-3.html"),
            ]
        );
    }

    #[test]
    fn test_plan_output_paths_sanitizes_names() {
        let sources = vec![PathBuf::from("in/bad:name?.xlsx"), PathBuf::from("in/...xlsx")];
        let outputs = plan_output_paths(&sources, Path::new("out"));
        assert_eq!(outputs[0], PathBuf::from("out/bad_name_.html"));
        assert_eq!(outputs[1], PathBuf::from("out/quiz.html"));
    }

    #[test]
    fn test_write_atomically_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");

        write_atomically(&path, "first").unwrap();
        write_atomically(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
