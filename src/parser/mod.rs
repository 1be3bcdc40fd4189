//! Parser Module
//!
//! calamineを使用した問題集ファイル解析の実装。
//! シートを1枚選択し、ヘッダー行とデータ行からなる`RawTable`を抽出します。

mod workbook;

pub(crate) use workbook::WorkbookParser;
