//! Turns syntax trees back into Harbour source text
//!
//! Operator expressions below statement level are always parenthesised, so
//! the output re-parses to the same tree regardless of precedence. Bodies
//! are indented by three spaces. Comments and directives are printed as they
//! appeared in the source.

use crate::parser::ast::*;
use crate::parser::token::TokenKind;

const INDENT: &str = "   ";

/// Render a node as dialect source text
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Expression {
    fn render(&self) -> String {
        match self {
            Expression::Assign { .. }
            | Expression::BinaryOp { .. }
            | Expression::Prefix { .. }
            | Expression::Postfix { .. } => format!("({})", render_bare(self)),
            _ => render_bare(self),
        }
    }
}

/// Render an expression without parentheses around its outermost operator
pub fn render_bare(expr: &Expression) -> String {
    match expr {
        Expression::Name(name) => name.clone(),
        Expression::Literal { raw, .. } => raw.clone(),
        Expression::Assign { target, op, value } => {
            format!("{} {} {}", target.render(), spell(*op), value.render())
        }
        Expression::BinaryOp { left, op, right } => {
            format!("{} {} {}", left.render(), spell(*op), right.render())
        }
        Expression::Prefix { op, operand } => format!("{}{}", spell(*op), operand.render()),
        Expression::Postfix { operand, op } => format!("{}{}", operand.render(), spell(*op)),
        Expression::Call { callee, args } => format!("{}({})", callee.render(), join(args)),
        Expression::Index { base, indices } => format!("{}[{}]", base.render(), join(indices)),
        Expression::FieldAccess { base, member } => format!("{}:{}", base.render(), member),
        Expression::Conditional {
            condition,
            then_branch,
            else_branch,
        } => format!(
            "iif({}, {}, {})",
            condition.render(),
            then_branch.render(),
            else_branch.render()
        ),
        Expression::ArrayLiteral(elements) if elements.is_empty() => "{ }".to_string(),
        Expression::ArrayLiteral(elements) => format!("{{ {} }}", join(elements)),
        Expression::HashLiteral(pairs) if pairs.is_empty() => "{ => }".to_string(),
        Expression::HashLiteral(pairs) => {
            let pairs: Vec<String> = pairs
                .iter()
                .map(|(key, value)| format!("{} => {}", key.render(), value.render()))
                .collect();
            format!("{{ {} }}", pairs.join(", "))
        }
        Expression::Codeblock { params, body } => {
            format!("{{ |{}| {} }}", params.join(", "), join(body))
        }
    }
}

fn spell(kind: TokenKind) -> &'static str {
    kind.spelling().unwrap_or_default()
}

fn join(exprs: &[Expression]) -> String {
    exprs.iter().map(|e| e.render()).collect::<Vec<_>>().join(", ")
}

impl Render for Statement {
    fn render(&self) -> String {
        let mut printer = Printer::default();
        printer.statement(self);
        printer.finish()
    }
}

impl Render for SourceRoot {
    fn render(&self) -> String {
        let mut printer = Printer::default();
        for node in &self.nodes {
            printer.statement(node);
        }
        printer.out
    }
}

/// Line-oriented writer that tracks body depth
#[derive(Default)]
struct Printer {
    out: String,
    depth: usize,
}

impl Printer {
    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn block(&mut self, body: &[Statement]) {
        self.depth += 1;
        for statement in body {
            self.statement(statement);
        }
        self.depth -= 1;
    }

    fn statement(&mut self, statement: &Statement) {
        match statement {
            Statement::FunctionDef {
                name,
                params,
                body,
                retval,
                is_static,
            } => {
                self.line(&header(*is_static, "function", name, params));
                self.block(body);
                self.line(&format!("return {}", render_bare(retval)));
            }
            Statement::ProcedureDef {
                name,
                params,
                body,
                is_static,
            } => {
                self.line(&header(*is_static, "procedure", name, params));
                self.block(body);
                self.line("return");
            }
            Statement::LocalDecl { name, init } => self.line(&declaration("local", name, init)),
            Statement::StaticDecl { name, init } => self.line(&declaration("static", name, init)),
            Statement::If {
                condition,
                then_body,
                else_ifs,
                else_body,
            } => {
                self.line(&format!("if {}", render_bare(condition)));
                self.block(then_body);
                for arm in else_ifs {
                    self.line(&format!("elseif {}", render_bare(&arm.condition)));
                    self.block(&arm.body);
                }
                if !else_body.is_empty() {
                    self.line("else");
                    self.block(else_body);
                }
                self.line("endif");
            }
            Statement::While { condition, body } => {
                self.line(&format!("while {}", render_bare(condition)));
                self.block(body);
                self.line("endwhile");
            }
            Statement::Return { value: None } => self.line("return"),
            Statement::Return { value: Some(value) } => {
                self.line(&format!("return {}", render_bare(value)))
            }
            Statement::Call(expr) | Statement::Assignment(expr) => self.line(&render_bare(expr)),
            Statement::Comment(text) | Statement::PreprocessorDirective(text) => self.line(text),
        }
    }

    /// Output without the final newline
    fn finish(mut self) -> String {
        if self.out.ends_with('\n') {
            self.out.pop();
        }
        self.out
    }
}

fn header(is_static: bool, keyword: &str, name: &str, params: &[String]) -> String {
    let prefix = if is_static { "static " } else { "" };
    format!("{}{} {}({})", prefix, keyword, name, params.join(", "))
}

fn declaration(keyword: &str, name: &str, init: &Option<Expression>) -> String {
    match init {
        Some(value) => format!("{} {} := {}", keyword, name, render_bare(value)),
        None => format!("{} {}", keyword, name),
    }
}
