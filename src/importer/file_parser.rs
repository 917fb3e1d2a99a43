// ==========================================
// 商品目录导入系统 - 文件解析器实现
// ==========================================
// 阶段 0: 文件读取与解析
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 输入为原始字节 + 声明格式，两种格式统一为同一行表示，
// 下游组件对格式无感知
// ==========================================

use crate::importer::error::ImportError;
use crate::importer::product_importer_trait::FileParser;
use calamine::{Reader, Xlsx};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::io::Cursor;

// ==========================================
// RawRow - 原始行记录
// ==========================================
// 字段按表头列名索引；行号为 1 基源文件行号（表头占第 1 行，
// 数据行从第 2 行开始），空白行被跳过但行号继续推进
#[derive(Debug, Clone)]
pub struct RawRow {
    pub row_number: usize,
    pub fields: HashMap<String, String>,
}

impl RawRow {
    /// 读取字段值（TRIM 后），缺列或空值返回 None
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .map(|v| v.as_str())
            .filter(|v| !v.is_empty())
    }
}

// ==========================================
// FileFormat - 文件格式判别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,      // 逗号分隔文本
    Workbook, // Excel 工作簿
}

impl FileFormat {
    /// 按文件扩展名判别格式
    pub fn from_file_name(file_name: &str) -> Result<Self, ImportError> {
        let ext = file_name
            .rsplit('.')
            .next()
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "xlsx" | "xls" => Ok(FileFormat::Workbook),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

/// 按格式选择解析器
pub fn parser_for(format: FileFormat) -> Box<dyn FileParser> {
    match format {
        FileFormat::Csv => Box::new(CsvParser),
        FileFormat::Workbook => Box::new(WorkbookParser),
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_rows(&self, bytes: &[u8]) -> Result<Vec<RawRow>, ImportError> {
        if bytes.is_empty() {
            return Err(ImportError::EmptyFile);
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(Cursor::new(bytes));

        // 读取表头
        let headers: Vec<String> = reader
            .headers()
            .map_err(|_| ImportError::HeaderMissing)?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(ImportError::HeaderMissing);
        }

        // 读取数据行（表头为第 1 行，数据从第 2 行开始）
        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let row_number = idx + 2;

            let mut fields = HashMap::new();
            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    if !header.is_empty() {
                        fields.insert(header.clone(), value.trim().to_string());
                    }
                }
            }

            // 跳过完全空白的行（行号仍按源文件推进）
            if fields.values().all(|v| v.is_empty()) {
                continue;
            }

            rows.push(RawRow { row_number, fields });
        }

        Ok(rows)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct WorkbookParser;

impl FileParser for WorkbookParser {
    fn parse_rows(&self, bytes: &[u8]) -> Result<Vec<RawRow>, ImportError> {
        if bytes.is_empty() {
            return Err(ImportError::EmptyFile);
        }

        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec()))
            .map_err(|e: calamine::XlsxError| ImportError::ExcelParseError(e.to_string()))?;

        // 读取第一个 sheet
        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

        // 提取表头（第一行）
        let mut sheet_rows = range.rows();
        let header_row = sheet_rows.next().ok_or(ImportError::HeaderMissing)?;

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(ImportError::HeaderMissing);
        }

        // 读取数据行
        let mut rows = Vec::new();
        for (idx, data_row) in sheet_rows.enumerate() {
            let row_number = idx + 2;

            let mut fields = HashMap::new();
            for (col_idx, cell) in data_row.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    if !header.is_empty() {
                        fields.insert(header.clone(), cell.to_string().trim().to_string());
                    }
                }
            }

            if fields.values().all(|v| v.is_empty()) {
                continue;
            }

            rows.push(RawRow { row_number, fields });
        }

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_parser_valid_input() {
        let csv = "sku,name_fr,price_base\nLP-001,Lait entier,125.50\nLP-002,Yaourt nature,3.0\n";

        let parser = CsvParser;
        let rows = parser.parse_rows(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_number, 2);
        assert_eq!(rows[0].get("sku"), Some("LP-001"));
        assert_eq!(rows[0].get("price_base"), Some("125.50"));
        assert_eq!(rows[1].row_number, 3);
    }

    #[test]
    fn test_csv_parser_empty_file() {
        let parser = CsvParser;
        let result = parser.parse_rows(b"");
        assert!(matches!(result, Err(ImportError::EmptyFile)));
    }

    #[test]
    fn test_csv_parser_blank_header() {
        let parser = CsvParser;
        let result = parser.parse_rows(b" , , \nLP-001,x,1\n");
        assert!(matches!(result, Err(ImportError::HeaderMissing)));
    }

    #[test]
    fn test_csv_parser_skip_blank_rows_keeps_line_numbers() {
        let csv = "sku,stock_quantity\nLP-001,5\n,\nLP-002,8\n";

        let parser = CsvParser;
        let rows = parser.parse_rows(csv.as_bytes()).unwrap();

        // 空白行被跳过，但后续行号仍对应源文件
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_number, 2);
        assert_eq!(rows[1].row_number, 4);
    }

    #[test]
    fn test_csv_parser_ragged_row() {
        // flexible 模式允许短行，缺失列按空值处理
        let csv = "sku,name_fr,price_base\nLP-001,Lait\n";

        let parser = CsvParser;
        let rows = parser.parse_rows(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("price_base"), None);
    }

    #[test]
    fn test_file_format_from_name() {
        assert_eq!(
            FileFormat::from_file_name("edit.csv").unwrap(),
            FileFormat::Csv
        );
        assert_eq!(
            FileFormat::from_file_name("Catalogue.XLSX").unwrap(),
            FileFormat::Workbook
        );
        assert!(matches!(
            FileFormat::from_file_name("notes.txt"),
            Err(ImportError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_workbook_parser_empty_bytes() {
        let parser = WorkbookParser;
        let result = parser.parse_rows(b"");
        assert!(matches!(result, Err(ImportError::EmptyFile)));
    }
}
