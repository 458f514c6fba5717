//! 受限求值沙箱
//!
//! 这是系统唯一的真实安全边界。不执行任意 Python：只接受一个赋值 / 表达式小语言
//! （`name = expr` 与裸表达式，`;` 或换行分隔）。能力限制是结构性的：
//! 语法里没有 import、属性访问、文件、网络、进程等构造，函数调用只能命中固定内建白名单。
//! 求值受双重约束：墙钟 deadline 与 fuel 预算，任一耗尽即 ExecutionError。
//! 整个程序先解析后求值：被拒绝的输入零执行。

mod parse;
mod value;

pub use value::Value;

use std::time::{Duration, Instant};

use thiserror::Error;

use parse::{BinOp, CmpOp, Expr, Stmt, UnaryOp};

/// 沙箱执行失败（全部转为用户可见文本，不向 Router 之外传播）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    #[error("{0}")]
    CapabilityDenied(String),

    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("{0}")]
    Eval(String),

    #[error("execution timed out")]
    Timeout,

    #[error("evaluation budget exhausted")]
    Budget,
}

/// 执行资源上限
#[derive(Debug, Clone)]
pub struct SandboxLimits {
    /// 墙钟上限
    pub timeout: Duration,
    /// 求值步数预算（也约束 range / 重复等结果规模）
    pub fuel: u64,
    /// 单个值渲染的最大字符数，超出降级为占位符
    pub max_render_chars: usize,
}

impl Default for SandboxLimits {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(500),
            fuel: 100_000,
            max_render_chars: 2_000,
        }
    }
}

/// 执行成功的结果：绑定名 → 渲染文本，按首次绑定顺序
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub bindings: Vec<(String, String)>,
}

impl Execution {
    /// `{x: 4, y: 'hi'}` 形式的摘要（Python locals 风格）
    pub fn summary(&self) -> String {
        let inner: Vec<String> = self
            .bindings
            .iter()
            .map(|(name, text)| format!("{}: {}", name, text))
            .collect();
        format!("{{{}}}", inner.join(", "))
    }
}

/// 沙箱执行器：无状态，可跨调用复用；每次 execute 使用全新环境
#[derive(Debug, Clone, Default)]
pub struct SandboxExecutor {
    limits: SandboxLimits,
}

impl SandboxExecutor {
    pub fn new(limits: SandboxLimits) -> Self {
        Self { limits }
    }

    /// 执行一段代码，返回文本渲染后的绑定或 ExecutionError
    pub fn execute(&self, code: &str) -> Result<Execution, ExecutionError> {
        let stmts = parse::parse_program(code)?;
        let mut interp = Interp::new(&self.limits);
        for stmt in &stmts {
            interp.eval_stmt(stmt)?;
        }

        let bindings = interp
            .env
            .into_iter()
            .map(|(name, value)| {
                let rendered = value.render();
                let text = if rendered.chars().count() > self.limits.max_render_chars {
                    "<value too large to display>".to_string()
                } else {
                    rendered
                };
                (name, text)
            })
            .collect();
        Ok(Execution { bindings })
    }
}

/// 单次求值算式（数学适配器复用）：恰好一个表达式，返回其值
pub fn eval_expression(expr: &str, limits: &SandboxLimits) -> Result<Value, ExecutionError> {
    let stmts = parse::parse_program(expr)?;
    match stmts.as_slice() {
        [Stmt::Expr(e)] => Interp::new(limits).eval_expr(e),
        _ => Err(ExecutionError::Syntax(
            "expected a single expression".to_string(),
        )),
    }
}

/// 解释器：绑定环境（保序）、fuel、deadline
struct Interp {
    env: Vec<(String, Value)>,
    fuel: u64,
    deadline: Instant,
}

impl Interp {
    fn new(limits: &SandboxLimits) -> Self {
        Self {
            env: Vec::new(),
            fuel: limits.fuel,
            deadline: Instant::now() + limits.timeout,
        }
    }

    /// 每个求值步骤收取 cost；fuel 耗尽或超过 deadline 即中止
    fn charge(&mut self, cost: u64) -> Result<(), ExecutionError> {
        if self.fuel < cost {
            return Err(ExecutionError::Budget);
        }
        self.fuel -= cost;
        if Instant::now() > self.deadline {
            return Err(ExecutionError::Timeout);
        }
        Ok(())
    }

    fn eval_stmt(&mut self, stmt: &Stmt) -> Result<(), ExecutionError> {
        match stmt {
            Stmt::Assign { name, expr } => {
                let value = self.eval_expr(expr)?;
                if let Some(slot) = self.env.iter_mut().find(|(n, _)| n == name) {
                    slot.1 = value;
                } else {
                    self.env.push((name.clone(), value));
                }
                Ok(())
            }
            // 裸表达式求值但不绑定（与 exec 的 locals 语义一致）
            Stmt::Expr(expr) => self.eval_expr(expr).map(|_| ()),
        }
    }

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value, ExecutionError> {
        self.charge(1)?;
        match expr {
            Expr::Int(n) => Ok(Value::Int(*n)),
            Expr::Float(f) => Ok(Value::Float(*f)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::NoneLit => Ok(Value::None),
            Expr::Name(name) => self
                .env
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| ExecutionError::Eval(format!("name '{}' is not defined", name))),
            Expr::Unary { op, operand } => {
                let v = self.eval_expr(operand)?;
                eval_unary(*op, v)
            }
            Expr::Binary { op, lhs, rhs } => {
                let l = self.eval_expr(lhs)?;
                let r = self.eval_expr(rhs)?;
                self.eval_binary(*op, l, r)
            }
            Expr::Compare { op, lhs, rhs } => {
                let l = self.eval_expr(lhs)?;
                let r = self.eval_expr(rhs)?;
                eval_compare(*op, &l, &r)
            }
            Expr::Call { func, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval_expr(arg)?);
                }
                self.call_builtin(func, values)
            }
            Expr::Index { base, index } => {
                let b = self.eval_expr(base)?;
                let i = self.eval_expr(index)?;
                eval_index(&b, &i)
            }
            Expr::List(elems) => {
                let mut values = Vec::with_capacity(elems.len());
                for e in elems {
                    values.push(self.eval_expr(e)?);
                }
                Ok(Value::List(values))
            }
            Expr::Tuple(elems) => {
                let mut values = Vec::with_capacity(elems.len());
                for e in elems {
                    values.push(self.eval_expr(e)?);
                }
                Ok(Value::Tuple(values))
            }
        }
    }

    fn eval_binary(&mut self, op: BinOp, l: Value, r: Value) -> Result<Value, ExecutionError> {
        use Value::*;
        match (op, l, r) {
            // 序列拼接 / 重复（重复按结果规模计 fuel，防止资源放大）
            (BinOp::Add, Str(a), Str(b)) => {
                self.charge((a.len() + b.len()) as u64)?;
                Ok(Str(a + &b))
            }
            (BinOp::Add, List(mut a), List(b)) => {
                self.charge((a.len() + b.len()) as u64)?;
                a.extend(b);
                Ok(List(a))
            }
            (BinOp::Add, Tuple(mut a), Tuple(b)) => {
                self.charge((a.len() + b.len()) as u64)?;
                a.extend(b);
                Ok(Tuple(a))
            }
            (BinOp::Mul, Str(s), Int(n)) | (BinOp::Mul, Int(n), Str(s)) => {
                let n = usize::try_from(n.max(0)).unwrap_or(0);
                self.charge((s.len().max(1) * n.max(1)) as u64)?;
                Ok(Str(s.repeat(n)))
            }
            (BinOp::Mul, List(items), Int(n)) | (BinOp::Mul, Int(n), List(items)) => {
                let n = usize::try_from(n.max(0)).unwrap_or(0);
                self.charge((items.len().max(1) * n.max(1)) as u64)?;
                let mut out = Vec::with_capacity(items.len() * n);
                for _ in 0..n {
                    out.extend(items.iter().cloned());
                }
                Ok(List(out))
            }
            (op, l, r) => eval_numeric(op, l, r),
        }
    }

    fn call_builtin(&mut self, func: &str, args: Vec<Value>) -> Result<Value, ExecutionError> {
        match func {
            "len" => builtin_len(args),
            "str" => one_arg(func, args).map(|v| Value::Str(v.to_text())),
            "int" => builtin_int(args),
            "float" => builtin_float(args),
            "abs" => builtin_abs(args),
            "min" => builtin_min_max(func, args, false),
            "max" => builtin_min_max(func, args, true),
            "range" => self.builtin_range(args),
            "sum" => builtin_sum(args),
            other => Err(ExecutionError::Eval(format!(
                "function '{}' is not available in the sandbox",
                other
            ))),
        }
    }

    /// range 结果实体化为 list；长度计入 fuel
    fn builtin_range(&mut self, args: Vec<Value>) -> Result<Value, ExecutionError> {
        let ints: Vec<i64> = args
            .iter()
            .map(|v| match v {
                Value::Int(n) => Ok(*n),
                other => Err(ExecutionError::Eval(format!(
                    "range() expects int arguments, got {}",
                    other.type_name()
                ))),
            })
            .collect::<Result<_, _>>()?;
        let (start, stop, step) = match ints.as_slice() {
            [stop] => (0, *stop, 1),
            [start, stop] => (*start, *stop, 1),
            [start, stop, step] => (*start, *stop, *step),
            _ => {
                return Err(ExecutionError::Eval(
                    "range() takes 1 to 3 arguments".to_string(),
                ));
            }
        };
        if step == 0 {
            return Err(ExecutionError::Eval(
                "range() step must not be zero".to_string(),
            ));
        }
        let mut out = Vec::new();
        let mut i = start;
        while (step > 0 && i < stop) || (step < 0 && i > stop) {
            self.charge(1)?;
            out.push(Value::Int(i));
            i = match i.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }
        Ok(Value::List(out))
    }
}

fn one_arg(func: &str, mut args: Vec<Value>) -> Result<Value, ExecutionError> {
    if args.len() != 1 {
        return Err(ExecutionError::Eval(format!(
            "{}() takes exactly one argument",
            func
        )));
    }
    Ok(args.remove(0))
}

fn eval_unary(op: UnaryOp, v: Value) -> Result<Value, ExecutionError> {
    match (op, v) {
        (UnaryOp::Neg, Value::Int(n)) => n
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| ExecutionError::Eval("integer overflow".to_string())),
        (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOp::Pos, v @ (Value::Int(_) | Value::Float(_))) => Ok(v),
        (_, v) => Err(ExecutionError::Eval(format!(
            "bad operand type for unary op: {}",
            v.type_name()
        ))),
    }
}

/// 数值二元运算：int 走 checked 算术，混合或除法提升为 float
fn eval_numeric(op: BinOp, l: Value, r: Value) -> Result<Value, ExecutionError> {
    use Value::{Float, Int};

    match (&l, &r) {
        (Int(a), Int(b)) => {
            let (a, b) = (*a, *b);
            let overflow = || ExecutionError::Eval("integer overflow".to_string());
            match op {
                BinOp::Add => a.checked_add(b).map(Int).ok_or_else(overflow),
                BinOp::Sub => a.checked_sub(b).map(Int).ok_or_else(overflow),
                BinOp::Mul => a.checked_mul(b).map(Int).ok_or_else(overflow),
                // Python 语义：/ 总是浮点除
                BinOp::Div => {
                    if b == 0 {
                        Err(ExecutionError::Eval("division by zero".to_string()))
                    } else {
                        Ok(Float(a as f64 / b as f64))
                    }
                }
                BinOp::FloorDiv => {
                    if b == 0 {
                        Err(ExecutionError::Eval("division by zero".to_string()))
                    } else {
                        Ok(Int(floor_div(a, b)))
                    }
                }
                BinOp::Mod => {
                    if b == 0 {
                        Err(ExecutionError::Eval("modulo by zero".to_string()))
                    } else {
                        Ok(Int(floor_mod(a, b)))
                    }
                }
                BinOp::Pow => {
                    if b < 0 {
                        Ok(Float((a as f64).powf(b as f64)))
                    } else {
                        let exp = u32::try_from(b).map_err(|_| overflow())?;
                        a.checked_pow(exp).map(Int).ok_or_else(overflow)
                    }
                }
            }
        }
        (Int(_) | Float(_), Int(_) | Float(_)) => {
            let a = as_f64(&l);
            let b = as_f64(&r);
            let out = match op {
                BinOp::Add => a + b,
                BinOp::Sub => a - b,
                BinOp::Mul => a * b,
                BinOp::Div => {
                    if b == 0.0 {
                        return Err(ExecutionError::Eval("division by zero".to_string()));
                    }
                    a / b
                }
                BinOp::FloorDiv => {
                    if b == 0.0 {
                        return Err(ExecutionError::Eval("division by zero".to_string()));
                    }
                    (a / b).floor()
                }
                BinOp::Mod => {
                    if b == 0.0 {
                        return Err(ExecutionError::Eval("modulo by zero".to_string()));
                    }
                    a - b * (a / b).floor()
                }
                BinOp::Pow => a.powf(b),
            };
            Ok(Float(out))
        }
        _ => Err(ExecutionError::Eval(format!(
            "unsupported operand types: {} and {}",
            l.type_name(),
            r.type_name()
        ))),
    }
}

/// Python 风格 floor 除法（向负无穷取整）
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if r != 0 && ((r < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

/// Python 风格取模（符号随除数）
fn floor_mod(a: i64, b: i64) -> i64 {
    let r = a % b;
    if r != 0 && ((r < 0) != (b < 0)) {
        r + b
    } else {
        r
    }
}

fn as_f64(v: &Value) -> f64 {
    match v {
        Value::Int(n) => *n as f64,
        Value::Float(f) => *f,
        _ => f64::NAN,
    }
}

/// 相等比较：数值跨 int/float 提升，容器逐元素
fn values_equal(l: &Value, r: &Value) -> bool {
    use Value::*;
    match (l, r) {
        (Int(_) | Float(_), Int(_) | Float(_)) => as_f64(l) == as_f64(r),
        (Str(a), Str(b)) => a == b,
        (Bool(a), Bool(b)) => a == b,
        (None, None) => true,
        (List(a), List(b)) | (Tuple(a), Tuple(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        _ => false,
    }
}

fn eval_compare(op: CmpOp, l: &Value, r: &Value) -> Result<Value, ExecutionError> {
    let result = match op {
        CmpOp::Eq => values_equal(l, r),
        CmpOp::Ne => !values_equal(l, r),
        CmpOp::Lt | CmpOp::Le | CmpOp::Gt | CmpOp::Ge => {
            let ord = match (l, r) {
                (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => as_f64(l)
                    .partial_cmp(&as_f64(r))
                    .ok_or_else(|| ExecutionError::Eval("cannot compare nan".to_string()))?,
                (Value::Str(a), Value::Str(b)) => a.cmp(b),
                _ => {
                    return Err(ExecutionError::Eval(format!(
                        "cannot order {} and {}",
                        l.type_name(),
                        r.type_name()
                    )));
                }
            };
            match op {
                CmpOp::Lt => ord.is_lt(),
                CmpOp::Le => ord.is_le(),
                CmpOp::Gt => ord.is_gt(),
                CmpOp::Ge => ord.is_ge(),
                _ => unreachable!(),
            }
        }
    };
    Ok(Value::Bool(result))
}

fn eval_index(base: &Value, index: &Value) -> Result<Value, ExecutionError> {
    let i = match index {
        Value::Int(n) => *n,
        other => {
            return Err(ExecutionError::Eval(format!(
                "indices must be integers, not {}",
                other.type_name()
            )));
        }
    };
    let get = |len: usize| -> Result<usize, ExecutionError> {
        let idx = if i < 0 { i + len as i64 } else { i };
        if idx < 0 || idx as usize >= len {
            Err(ExecutionError::Eval("index out of range".to_string()))
        } else {
            Ok(idx as usize)
        }
    };
    match base {
        Value::List(items) | Value::Tuple(items) => {
            let idx = get(items.len())?;
            Ok(items[idx].clone())
        }
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let idx = get(chars.len())?;
            Ok(Value::Str(chars[idx].to_string()))
        }
        other => Err(ExecutionError::Eval(format!(
            "{} is not indexable",
            other.type_name()
        ))),
    }
}

fn builtin_len(args: Vec<Value>) -> Result<Value, ExecutionError> {
    match one_arg("len", args)? {
        Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
        Value::List(items) | Value::Tuple(items) => Ok(Value::Int(items.len() as i64)),
        other => Err(ExecutionError::Eval(format!(
            "len() unsupported for {}",
            other.type_name()
        ))),
    }
}

fn builtin_int(args: Vec<Value>) -> Result<Value, ExecutionError> {
    match one_arg("int", args)? {
        Value::Int(n) => Ok(Value::Int(n)),
        Value::Float(f) => Ok(Value::Int(f.trunc() as i64)),
        Value::Bool(b) => Ok(Value::Int(b as i64)),
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| ExecutionError::Eval(format!("invalid literal for int(): '{}'", s))),
        other => Err(ExecutionError::Eval(format!(
            "int() unsupported for {}",
            other.type_name()
        ))),
    }
}

fn builtin_float(args: Vec<Value>) -> Result<Value, ExecutionError> {
    match one_arg("float", args)? {
        Value::Int(n) => Ok(Value::Float(n as f64)),
        Value::Float(f) => Ok(Value::Float(f)),
        Value::Bool(b) => Ok(Value::Float(b as i64 as f64)),
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| ExecutionError::Eval(format!("invalid literal for float(): '{}'", s))),
        other => Err(ExecutionError::Eval(format!(
            "float() unsupported for {}",
            other.type_name()
        ))),
    }
}

fn builtin_abs(args: Vec<Value>) -> Result<Value, ExecutionError> {
    match one_arg("abs", args)? {
        Value::Int(n) => n
            .checked_abs()
            .map(Value::Int)
            .ok_or_else(|| ExecutionError::Eval("integer overflow".to_string())),
        Value::Float(f) => Ok(Value::Float(f.abs())),
        other => Err(ExecutionError::Eval(format!(
            "abs() unsupported for {}",
            other.type_name()
        ))),
    }
}

fn builtin_min_max(func: &str, args: Vec<Value>, want_max: bool) -> Result<Value, ExecutionError> {
    if args.is_empty() {
        return Err(ExecutionError::Eval(format!(
            "{}() expects at least one argument",
            func
        )));
    }
    // 单个序列参数展开为元素集
    let items = if args.len() == 1 {
        match args.into_iter().next().expect("len checked") {
            Value::List(items) | Value::Tuple(items) => items,
            single => vec![single],
        }
    } else {
        args
    };
    if items.is_empty() {
        return Err(ExecutionError::Eval(format!("{}() of empty sequence", func)));
    }
    let mut best = items[0].clone();
    for item in &items[1..] {
        let cmp = eval_compare(CmpOp::Gt, item, &best)?;
        let item_greater = matches!(cmp, Value::Bool(true));
        if item_greater == want_max {
            best = item.clone();
        }
    }
    Ok(best)
}

fn builtin_sum(args: Vec<Value>) -> Result<Value, ExecutionError> {
    let items = match one_arg("sum", args)? {
        Value::List(items) | Value::Tuple(items) => items,
        other => {
            return Err(ExecutionError::Eval(format!(
                "sum() unsupported for {}",
                other.type_name()
            )));
        }
    };
    let mut acc = Value::Int(0);
    for item in items {
        acc = eval_numeric(BinOp::Add, acc, item)?;
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exec(code: &str) -> Result<Execution, ExecutionError> {
        SandboxExecutor::new(SandboxLimits::default()).execute(code)
    }

    #[test]
    fn test_simple_assignment_binds_name() {
        let result = exec("x = 2 + 2").unwrap();
        assert_eq!(result.bindings, vec![("x".to_string(), "4".to_string())]);
    }

    #[test]
    fn test_multiple_statements_and_reassignment() {
        let result = exec("x = 1; y = x + 2\nx = y * 10").unwrap();
        assert_eq!(
            result.bindings,
            vec![
                ("x".to_string(), "30".to_string()),
                ("y".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_import_yields_error_without_partial_execution() {
        // 第一条语句合法，但后面的 import 使整个程序被拒
        let err = exec("x = 1\nimport os").unwrap_err();
        assert!(matches!(err, ExecutionError::CapabilityDenied(_)));
    }

    #[test]
    fn test_open_and_eval_denied() {
        assert!(matches!(
            exec("open('/etc/passwd')").unwrap_err(),
            ExecutionError::CapabilityDenied(_)
        ));
        assert!(matches!(
            exec("eval('1+1')").unwrap_err(),
            ExecutionError::CapabilityDenied(_)
        ));
    }

    #[test]
    fn test_unknown_function_is_eval_error() {
        let err = exec("x = fetch('http://example.com')").unwrap_err();
        assert!(matches!(err, ExecutionError::Eval(_)));
    }

    #[test]
    fn test_python_division_semantics() {
        let result = exec("a = 5 / 2\nb = 5 // 2\nc = -7 // 2\nd = -7 % 2").unwrap();
        assert_eq!(result.bindings[0].1, "2.5");
        assert_eq!(result.bindings[1].1, "2");
        assert_eq!(result.bindings[2].1, "-4");
        assert_eq!(result.bindings[3].1, "1");
    }

    #[test]
    fn test_division_by_zero_is_eval_error() {
        let err = exec("x = 1 / 0").unwrap_err();
        assert!(matches!(err, ExecutionError::Eval(_)));
    }

    #[test]
    fn test_power_and_unary() {
        let result = exec("a = 2 ** 10\nb = -2 ** 2").unwrap();
        assert_eq!(result.bindings[0].1, "1024");
        // Python: ** 比一元负号结合更紧
        assert_eq!(result.bindings[1].1, "-4");
    }

    #[test]
    fn test_strings_lists_and_builtins() {
        let result = exec("s = 'ab' + 'c'\nn = len(s)\nl = [1, 2] + [3]\nm = max(l)").unwrap();
        assert_eq!(result.bindings[0].1, "'abc'");
        assert_eq!(result.bindings[1].1, "3");
        assert_eq!(result.bindings[2].1, "[1, 2, 3]");
        assert_eq!(result.bindings[3].1, "3");
    }

    #[test]
    fn test_range_and_sum() {
        let result = exec("r = range(5)\ns = sum(r)").unwrap();
        assert_eq!(result.bindings[0].1, "[0, 1, 2, 3, 4]");
        assert_eq!(result.bindings[1].1, "10");
    }

    #[test]
    fn test_indexing() {
        let result = exec("l = [10, 20, 30]\na = l[0]\nb = l[-1]\nc = 'hey'[1]").unwrap();
        assert_eq!(result.bindings[1].1, "10");
        assert_eq!(result.bindings[2].1, "30");
        assert_eq!(result.bindings[3].1, "'e'");
    }

    #[test]
    fn test_fuel_bounds_amplification() {
        // 字符串重复呈指数放大，fuel 必须在中途切断
        let err = exec("s = 'a' * 1000000000").unwrap_err();
        assert!(matches!(err, ExecutionError::Budget));
    }

    #[test]
    fn test_huge_range_exhausts_budget() {
        let err = exec("r = range(100000000)").unwrap_err();
        assert!(matches!(err, ExecutionError::Budget));
    }

    #[test]
    fn test_bare_expression_does_not_bind() {
        let result = exec("2 + 2").unwrap();
        assert!(result.bindings.is_empty());
    }

    #[test]
    fn test_comparisons() {
        let result = exec("a = 2 == 2\nb = 1 < 2\nc = 'a' != 'b'\nd = 2 == 2.0").unwrap();
        assert_eq!(result.bindings[0].1, "True");
        assert_eq!(result.bindings[1].1, "True");
        assert_eq!(result.bindings[2].1, "True");
        assert_eq!(result.bindings[3].1, "True");
    }

    #[test]
    fn test_summary_format() {
        let result = exec("x = 4\ny = 'hi'").unwrap();
        assert_eq!(result.summary(), "{x: 4, y: 'hi'}");
    }

    #[test]
    fn test_eval_expression_single_only() {
        let v = eval_expression("2 + 3 * 4", &SandboxLimits::default()).unwrap();
        assert_eq!(v, Value::Int(14));
        let err = eval_expression("x = 1", &SandboxLimits::default()).unwrap_err();
        assert!(matches!(err, ExecutionError::Syntax(_)));
    }
}
