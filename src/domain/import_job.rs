// ==========================================
// 商品目录导入系统 - 导入任务领域模型
// ==========================================
// 对齐: db.rs import_job / audit_log 表
// ==========================================

use crate::domain::types::{ImportMode, ImportType, JobStatus, RowAction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// FieldChange - 单字段差异
// ==========================================
// 用途: UPDATE 行的人工审阅差异（old → new）
// 值以 JSON 表示，数值字段为 Number，文本字段为 String
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub old: serde_json::Value,
    pub new: serde_json::Value,
}

// ==========================================
// PreviewRow - 预览行
// ==========================================
// 用途: 校验阶段为每个源数据行计算一次，提交阶段只读回放
// 不变式: action == ERROR 当且仅当 validation_errors 非空
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewRow {
    pub row_number: usize,                          // 源文件行号（表头 = 第 1 行）
    pub sku: String,                                // 提交的自然键（原样保留）
    pub action: RowAction,                          // 判定动作
    #[serde(default)]
    pub field_changes: BTreeMap<String, FieldChange>, // 字段差异（仅 UPDATE）
    #[serde(default)]
    pub validation_errors: Vec<String>,             // 校验错误（仅 ERROR）
    #[serde(default)]
    pub source_fields: BTreeMap<String, String>,    // 提交的列→值（CREATE 建档与提交期重算依据）
}

// ==========================================
// ImportJob - 导入任务
// ==========================================
// 生命周期: 校验结束时创建一次（VALIDATED），提交执行器再变更一次
// （PROCESSING → 终态）；终态记录不可变
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportJob {
    pub job_id: String,                     // 任务 ID（UUID）
    pub import_type: ImportType,            // 导入类型
    pub mode: ImportMode,                   // 导入模式
    pub file_name: String,                  // 源文件名
    pub status: JobStatus,                  // 当前状态
    pub total_rows: i64,                    // 总行数（= 预览行数）
    pub success_rows: i64,                  // 提交成功行数（提交后回填）
    pub error_rows: i64,                    // 失败行数
    pub preview_rows: Vec<PreviewRow>,      // 预览（按源行号有序）
    pub created_by: String,                 // 发起人
    pub created_at: DateTime<Utc>,          // 创建时间
    pub executed_at: Option<DateTime<Utc>>, // 提交时间（仅提交后）
}

// ==========================================
// ImportJobSummary - 任务历史列表项
// ==========================================
// 用途: 运维可见的历史列表，不携带预览载荷
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportJobSummary {
    pub job_id: String,
    pub import_type: ImportType,
    pub mode: ImportMode,
    pub file_name: String,
    pub status: JobStatus,
    pub total_rows: i64,
    pub success_rows: i64,
    pub error_rows: i64,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub executed_at: Option<DateTime<Utc>>,
}

// ==========================================
// ValidateSummary - 校验汇总
// ==========================================
// 不变式: total == to_create + to_update + skipped + errors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateSummary {
    pub total: usize,
    pub to_create: usize,
    pub to_update: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl ValidateSummary {
    /// 由预览行统计四个分桶
    pub fn from_preview(rows: &[PreviewRow]) -> Self {
        let mut summary = ValidateSummary {
            total: rows.len(),
            to_create: 0,
            to_update: 0,
            skipped: 0,
            errors: 0,
        };
        for row in rows {
            match row.action {
                RowAction::Create => summary.to_create += 1,
                RowAction::Update => summary.to_update += 1,
                RowAction::Skip => summary.skipped += 1,
                RowAction::Error => summary.errors += 1,
            }
        }
        summary
    }
}

// ==========================================
// CommitSummary - 提交汇总
// ==========================================
// SKIP/ERROR 行不计入任何一侧，因此 success + errors ≤ total
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    pub success: usize,
    pub errors: usize,
}

// ==========================================
// AuditRecord - 审计记录
// ==========================================
// 红线: 每个完成的任务恰好一条（非逐行），仅追加
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub audit_id: String,                // 审计 ID（UUID）
    pub action_type: String,             // 动作类型（如 PRODUCT_IMPORT）
    pub entity_type: String,             // 实体类型（ImportJob）
    pub entity_id: String,               // 实体 ID（job_id）
    pub metadata: Option<serde_json::Value>, // 汇总元数据（类型/模式/计数）
    pub actor: String,                   // 操作人
    pub created_at: DateTime<Utc>,       // 记录时间
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preview_row(action: RowAction) -> PreviewRow {
        PreviewRow {
            row_number: 2,
            sku: "SKU-001".to_string(),
            action,
            field_changes: BTreeMap::new(),
            validation_errors: if action == RowAction::Error {
                vec!["出错".to_string()]
            } else {
                Vec::new()
            },
            source_fields: BTreeMap::new(),
        }
    }

    #[test]
    fn test_summary_partitions_all_rows() {
        let rows = vec![
            preview_row(RowAction::Create),
            preview_row(RowAction::Update),
            preview_row(RowAction::Update),
            preview_row(RowAction::Skip),
            preview_row(RowAction::Error),
        ];

        let summary = ValidateSummary::from_preview(&rows);

        assert_eq!(summary.total, 5);
        assert_eq!(summary.to_create, 1);
        assert_eq!(summary.to_update, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.errors, 1);
        assert_eq!(
            summary.total,
            summary.to_create + summary.to_update + summary.skipped + summary.errors
        );
    }

    #[test]
    fn test_preview_row_json_roundtrip() {
        let mut row = preview_row(RowAction::Update);
        row.field_changes.insert(
            "price_base".to_string(),
            FieldChange {
                old: serde_json::json!(125.5),
                new: serde_json::json!(130.0),
            },
        );

        let json = serde_json::to_string(&row).unwrap();
        let back: PreviewRow = serde_json::from_str(&json).unwrap();

        assert_eq!(back.row_number, 2);
        assert_eq!(back.action, RowAction::Update);
        assert_eq!(back.field_changes["price_base"].new, serde_json::json!(130.0));
    }
}
