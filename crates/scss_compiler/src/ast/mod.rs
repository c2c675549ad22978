//! The typed AST: values, expressions, statements and the evaluated CSS
//! output tree. All nodes are `Copy` handles into the compilation arena;
//! the parser allocates them through the public constructors and the
//! evaluator produces fresh nodes rather than mutating.

pub mod css;
pub mod expr;
pub mod stmt;
pub mod value;

pub use css::CssStmt;
pub use expr::{BinaryOp, CallArgs, Expr, ExprKind, InterpPart, UnaryOp};
pub use stmt::{Block, Callable, Param, SelectorRef, Stmt, StmtKind};
pub use value::{Color, List, ListSeparator, Map, Number, QuoteMark, Str, Value};
