use crate::ast::{Expr, LiteralValue};
use crate::value::format_number;

/// Debug printer for expression trees.
pub struct AstPrinter;

impl AstPrinter {
    /// Canonical prefix form, e.g. `(+ 1 (* 2 3))`.
    pub fn print(&self, expr: &Expr) -> String {
        match expr {
            Expr::Binary {
                left,
                operator,
                right,
                ..
            } => format!("({} {} {})", operator, self.print(left), self.print(right)),

            Expr::Unary {
                operator, right, ..
            } => format!("({} {})", operator, self.print(right)),

            Expr::Literal(literal) => literal_text(literal, false),

            Expr::Grouping(expr) => format!("(group {})", self.print(expr)),

            Expr::Variable { name, .. } => name.lexeme.clone(),

            Expr::Assign { name, value, .. } => {
                format!("(= {} {})", name.lexeme, self.print(value))
            }

            Expr::Logical {
                left,
                operator,
                right,
            } => format!("({} {} {})", operator, self.print(left), self.print(right)),

            Expr::Call {
                callee, arguments, ..
            } => {
                let mut out: String = format!("(call {}", self.print(callee));
                for argument in arguments {
                    out.push(' ');
                    out.push_str(&self.print(argument));
                }
                out.push(')');
                out
            }

            Expr::Get { object, name } => format!("(. {} {})", self.print(object), name.lexeme),

            Expr::Set {
                object,
                name,
                value,
            } => format!(
                "(.= {} {} {})",
                self.print(object),
                name.lexeme,
                self.print(value)
            ),

            Expr::This { .. } => "this".to_string(),

            Expr::Super { method, .. } => format!("(super {})", method.lexeme),
        }
    }

    /// Fully parenthesised infix form that the parser accepts again.
    /// Printing, re-parsing and printing once more yields the same text.
    pub fn print_source(&self, expr: &Expr) -> String {
        match expr {
            Expr::Binary {
                left,
                operator,
                right,
                ..
            } => format!(
                "({} {} {})",
                self.print_source(left),
                operator,
                self.print_source(right)
            ),

            Expr::Unary {
                operator, right, ..
            } => format!("({}{})", operator, self.print_source(right)),

            Expr::Literal(literal) => literal_text(literal, true),

            // The parentheses a grouping stands for are already emitted by
            // its contents, so it prints as its inner expression.
            Expr::Grouping(expr) => self.print_source(expr),

            Expr::Variable { name, .. } => name.lexeme.clone(),

            Expr::Assign { name, value, .. } => {
                format!("({} = {})", name.lexeme, self.print_source(value))
            }

            Expr::Logical {
                left,
                operator,
                right,
            } => format!(
                "({} {} {})",
                self.print_source(left),
                operator,
                self.print_source(right)
            ),

            Expr::Call {
                callee, arguments, ..
            } => {
                let arguments: Vec<String> =
                    arguments.iter().map(|a| self.print_source(a)).collect();
                format!("{}({})", self.print_source(callee), arguments.join(", "))
            }

            Expr::Get { object, name } => {
                format!("{}.{}", self.print_source(object), name.lexeme)
            }

            Expr::Set {
                object,
                name,
                value,
            } => format!(
                "({}.{} = {})",
                self.print_source(object),
                name.lexeme,
                self.print_source(value)
            ),

            Expr::This { .. } => "this".to_string(),

            Expr::Super { method, .. } => format!("super.{}", method.lexeme),
        }
    }
}

fn literal_text(literal: &LiteralValue, quoted: bool) -> String {
    match literal {
        LiteralValue::Number(n) => format_number(*n),
        LiteralValue::Str(s) if quoted => format!("\"{}\"", s),
        LiteralValue::Str(s) => s.clone(),
        LiteralValue::Bool(b) => b.to_string(),
        LiteralValue::Nil => "nil".to_string(),
    }
}
