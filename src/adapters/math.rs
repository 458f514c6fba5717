//! 算式求解适配器
//!
//! 对外契约：`evaluate_expression(expr) -> Result<文本结果, MathError>`。
//! 默认实现复用沙箱的表达式文法（单表达式、fuel / deadline 约束），
//! 并做 Python/数学记法兼容：`^` 视为乘方。

use thiserror::Error;

use crate::sandbox::{self, ExecutionError, SandboxLimits};

/// 求解失败：解析失败与求值失败分开（Router 对二者文案一致，测试需要区分）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("could not parse expression: {0}")]
    Parse(String),

    #[error("could not evaluate expression: {0}")]
    Eval(String),
}

/// 算式求解器
pub trait MathSolver: Send + Sync {
    fn evaluate_expression(&self, expr: &str) -> Result<String, MathError>;
}

/// 默认实现：沙箱表达式求值
#[derive(Debug, Clone, Default)]
pub struct ExprSolver {
    limits: SandboxLimits,
}

impl ExprSolver {
    pub fn new(limits: SandboxLimits) -> Self {
        Self { limits }
    }
}

impl MathSolver for ExprSolver {
    fn evaluate_expression(&self, expr: &str) -> Result<String, MathError> {
        // 数学记法 ^ → Python 乘方
        let normalized = expr.replace('^', "**");
        let value = sandbox::eval_expression(&normalized, &self.limits).map_err(|e| match e {
            ExecutionError::Syntax(msg) | ExecutionError::CapabilityDenied(msg) => {
                MathError::Parse(msg)
            }
            other => MathError::Eval(other.to_string()),
        })?;
        Ok(value.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solver() -> ExprSolver {
        ExprSolver::default()
    }

    #[test]
    fn test_basic_arithmetic() {
        assert_eq!(solver().evaluate_expression("2 + 2").unwrap(), "4");
        assert_eq!(solver().evaluate_expression("10 / 4").unwrap(), "2.5");
    }

    #[test]
    fn test_caret_is_power() {
        assert_eq!(solver().evaluate_expression("2 ^ 8").unwrap(), "256");
    }

    #[test]
    fn test_parse_failure() {
        let err = solver().evaluate_expression("what is love").unwrap_err();
        assert!(matches!(err, MathError::Parse(_) | MathError::Eval(_)));
    }

    #[test]
    fn test_eval_failure() {
        let err = solver().evaluate_expression("1 / 0").unwrap_err();
        assert!(matches!(err, MathError::Eval(_)));
    }

    #[test]
    fn test_assignment_is_not_an_expression() {
        let err = solver().evaluate_expression("x = 1").unwrap_err();
        assert!(matches!(err, MathError::Parse(_)));
    }
}
