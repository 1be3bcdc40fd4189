//! Workbook Parser
//!
//! calamineのラッパーとして、ワークブックの読み込みとシートの表抽出を提供します。

use calamine::{open_workbook_auto_from_rs, Reader, Sheets};
use std::io::{Cursor, Read};

use crate::api::SheetSelector;
use crate::error::QuizError;
use crate::formatter::CellFormatter;
use crate::security::SecurityConfig;
use crate::types::RawTable;

/// ワークブックパーサー
///
/// XLSX / XLSM / XLS / ODS を自動判別して開きます。
pub(crate) struct WorkbookParser {
    /// calamineのワークブック
    workbook: Sheets<Cursor<Vec<u8>>>,

    /// セルフォーマッター
    formatter: CellFormatter,
}

impl WorkbookParser {
    /// ワークブックを開く
    ///
    /// 入力全体をメモリに読み込み、サイズ上限を検証してからcalamineで解析します。
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookParser)` - 読み込みに成功した場合
    /// * `Err(QuizError::SecurityViolation)` - 入力サイズが上限を超えた場合
    /// * `Err(QuizError::Parse)` - 表計算ファイルとして解析できない場合
    pub fn open<R: Read>(mut reader: R) -> Result<Self, QuizError> {
        let security_config = SecurityConfig::default();

        let mut buffer = Vec::new();
        let bytes_read = reader.read_to_end(&mut buffer)?;
        security_config.check_input_size(bytes_read as u64)?;

        let workbook = open_workbook_auto_from_rs(Cursor::new(buffer))?;

        Ok(Self {
            workbook,
            formatter: CellFormatter::new(),
        })
    }

    /// すべてのシート名を取得
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    /// シート選択方式に基づいてシート名を決定
    ///
    /// # 戻り値
    ///
    /// * `Ok(String)` - 選択されたシート名
    /// * `Err(QuizError::Config)` - シートが存在しない、またはインデックスが範囲外の場合
    pub fn select_sheet(&self, selector: &SheetSelector) -> Result<String, QuizError> {
        let all_sheet_names = self.sheet_names();

        match selector {
            SheetSelector::First => all_sheet_names
                .into_iter()
                .next()
                .ok_or_else(|| QuizError::Config("Workbook contains no sheets".to_string())),

            SheetSelector::Index(index) => {
                let total = all_sheet_names.len();
                all_sheet_names.into_iter().nth(*index).ok_or_else(|| {
                    QuizError::Config(format!(
                        "Sheet index {} is out of range (total: {})",
                        index, total
                    ))
                })
            }

            SheetSelector::Name(name) => {
                if !all_sheet_names.contains(name) {
                    return Err(QuizError::Config(format!("Sheet '{}' not found", name)));
                }
                Ok(name.clone())
            }
        }
    }

    /// シートを読み込み、先頭行をヘッダーとする表を抽出
    ///
    /// 使用範囲の先頭行がヘッダーになります。空のシートはヘッダーもデータ行も
    /// 空の表として返します（列の検証は問題モデル構築時に行います）。
    pub fn read_table(&mut self, sheet_name: &str) -> Result<RawTable, QuizError> {
        let range = self.workbook.worksheet_range(sheet_name)?;
        let header_offset = range.start().map_or(0, |(row, _)| row as usize);

        let mut rows = range.rows();
        let headers = match rows.next() {
            Some(header_row) => header_row
                .iter()
                .map(|cell| self.formatter.format_cell(cell))
                .collect::<Result<Vec<_>, _>>()?,
            None => return Ok(RawTable::default()),
        };

        let mut data_rows = Vec::new();
        for row in rows {
            let cells = row
                .iter()
                .map(|cell| self.formatter.format_cell(cell))
                .collect::<Result<Vec<_>, _>>()?;
            data_rows.push(cells);
        }

        log::debug!(
            "sheet '{}': {} columns, {} data rows",
            sheet_name,
            headers.len(),
            data_rows.len()
        );

        Ok(RawTable::new(headers, data_rows).with_header_row(header_offset))
    }

    /// 選択方式に従ってシートを選び、表を抽出する
    pub fn read_selected(&mut self, selector: &SheetSelector) -> Result<RawTable, QuizError> {
        let sheet_name = self.select_sheet(selector)?;
        self.read_table(&sheet_name)
    }
}

// 実際のワークブックを必要とするため、テストは統合テスト（tests/）で実装します。
