//! 沙箱值模型与文本渲染
//!
//! 渲染遵循 Python 习惯：repr 风格（字符串带引号，容器逐元素 repr）用于绑定结果展示，
//! str 风格（字符串裸露）用于 str() 内建与算式结果。

/// 沙箱内的运行时值
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    None,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::None => "NoneType",
        }
    }

    /// repr 风格渲染：'hi'、[1, 2]、(1,)、True、4.0
    pub fn render(&self) -> String {
        match self {
            Value::Int(n) => n.to_string(),
            Value::Float(f) => render_float(*f),
            Value::Bool(b) => if *b { "True" } else { "False" }.to_string(),
            Value::Str(s) => quote_str(s),
            Value::List(items) => {
                let inner: Vec<String> = items.iter().map(|v| v.render()).collect();
                format!("[{}]", inner.join(", "))
            }
            Value::Tuple(items) => {
                let inner: Vec<String> = items.iter().map(|v| v.render()).collect();
                if items.len() == 1 {
                    format!("({},)", inner[0])
                } else {
                    format!("({})", inner.join(", "))
                }
            }
            Value::None => "None".to_string(),
        }
    }

    /// str 风格渲染：顶层字符串不带引号，其余同 repr
    pub fn to_text(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            other => other.render(),
        }
    }
}

/// 浮点渲染贴近 Python str()：整数值浮点保留 ".0"
fn render_float(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "inf" } else { "-inf" }.to_string()
    } else if f == f.trunc() && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else {
        format!("{}", f)
    }
}

fn quote_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_int_and_float() {
        assert_eq!(Value::Int(4).render(), "4");
        assert_eq!(Value::Float(2.5).render(), "2.5");
        assert_eq!(Value::Float(4.0).render(), "4.0");
    }

    #[test]
    fn test_render_str_quoted_in_repr_only() {
        let v = Value::Str("hi".to_string());
        assert_eq!(v.render(), "'hi'");
        assert_eq!(v.to_text(), "hi");
    }

    #[test]
    fn test_render_containers() {
        let list = Value::List(vec![Value::Int(1), Value::Str("a".to_string())]);
        assert_eq!(list.render(), "[1, 'a']");
        let single = Value::Tuple(vec![Value::Int(1)]);
        assert_eq!(single.render(), "(1,)");
        let pair = Value::Tuple(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(pair.render(), "(1, 2)");
    }

    #[test]
    fn test_render_bool_and_none() {
        assert_eq!(Value::Bool(true).render(), "True");
        assert_eq!(Value::None.render(), "None");
    }
}
