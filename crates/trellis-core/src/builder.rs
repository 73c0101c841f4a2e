//! Incremental builder of statement blocks.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::ast::expr::{Expr, ParamId, Parameter};
use crate::ast::kind::NodeKind;
use crate::ast::stmt::{BlockStmt, Declaration, Modifiers, Stmt};
use crate::ast::value::Value;
use crate::ast::visit::rewrite_stmt;
use crate::transforms::{Optimizer, Substitution, UseCounter};

/// Whether an expression is cheap enough to inline everywhere instead of
/// binding it to a variable: a parameter, a constant, or a cast over one.
pub fn is_simple_expression(expr: &Expr) -> bool {
    match expr {
        Expr::Parameter(_) | Expr::Constant(_) => true,
        Expr::Unary(u) => u.kind == NodeKind::Convert && is_simple_expression(&u.expr),
        _ => false,
    }
}

/// Reuse key of a declaration: its initializer adjusted to the declared
/// type, so declarations with different declared types never share a slot.
fn normalize_declaration(decl: &Declaration) -> Expr {
    let declared = decl.parameter.ty.clone();
    match &decl.initializer {
        None => Expr::typed_constant(Value::Null, declared),
        Some(init) if init.ty() == declared => init.clone(),
        Some(init) => Expr::convert(init.clone(), declared),
    }
}

fn is_safe_for_reuse(decl: &Declaration) -> bool {
    decl.modifiers.contains(Modifiers::FINAL)
        && decl.initializer.is_some()
        && !decl.parameter.name.starts_with('_')
}

/// Builds a [`BlockStmt`], ensuring declared variable names are unique
/// across the chain of parent builders, sharing equal final initializers
/// through a reuse table, and (when optimizing) dropping unused
/// declarations and inlining single-use ones on [`to_block`].
///
/// Not safe to share between concurrent tasks; independent instances are
/// independent.
///
/// [`to_block`]: BlockBuilder::to_block
pub struct BlockBuilder<'p> {
    statements: Vec<Stmt>,
    variables: HashSet<String>,
    /// Final-fine-to-reuse declarations, keyed by normalized initializer.
    expression_for_reuse: HashMap<Expr, Declaration>,
    optimizing: bool,
    parent: Option<&'p BlockBuilder<'p>>,
}

impl<'p> BlockBuilder<'p> {
    /// Creates a builder; `optimizing` controls both common-subexpression
    /// reuse and the two-pass cleanup in [`BlockBuilder::to_block`].
    pub fn new(optimizing: bool) -> BlockBuilder<'static> {
        BlockBuilder {
            statements: Vec::new(),
            variables: HashSet::new(),
            expression_for_reuse: HashMap::new(),
            optimizing,
            parent: None,
        }
    }

    /// Creates a child builder; name lookups and reuse lookups consult the
    /// parent chain.
    pub fn with_parent(optimizing: bool, parent: &'p BlockBuilder<'p>) -> BlockBuilder<'p> {
        BlockBuilder {
            statements: Vec::new(),
            variables: HashSet::new(),
            expression_for_reuse: HashMap::new(),
            optimizing,
            parent: Some(parent),
        }
    }

    pub fn statements(&self) -> &[Stmt] {
        &self.statements
    }

    /// Clears this builder.
    pub fn clear(&mut self) {
        self.statements.clear();
        self.variables.clear();
        self.expression_for_reuse.clear();
    }

    /// Appends a statement. Declaring a name that already exists anywhere in
    /// the scope chain is a programmer error and panics.
    pub fn add(&mut self, statement: Stmt) {
        if let Stmt::Declaration(decl) = &statement {
            if !self.variables.insert(decl.parameter.name.clone()) {
                panic!("duplicate variable {}", decl.parameter.name);
            }
            self.add_expression_for_reuse(decl.clone());
        }
        self.statements.push(statement);
    }

    /// Appends `return expr;`.
    pub fn add_expression(&mut self, expr: Expr) {
        self.add(Stmt::Return(Some(expr)));
    }

    /// Appends an expression and returns an expression (possibly a variable)
    /// that represents its value.
    pub fn append(&mut self, name: &str, expr: Expr) -> Expr {
        self.append_opt(name, expr, true)
    }

    /// Like [`BlockBuilder::append`]; pass `optimize = false` when the
    /// expression has side effects or a time-dependent value, so it is
    /// neither shared nor inlined.
    pub fn append_opt(&mut self, name: &str, expr: Expr, optimize: bool) -> Expr {
        self.fold_trailing_return();
        self.append_internal(name, expr, optimize)
    }

    /// Appends an expression if there is one; `None` passes through.
    pub fn append_if_not_null(&mut self, name: &str, expr: Option<Expr>) -> Option<Expr> {
        expr.map(|e| self.append_opt(name, e, true))
    }

    /// Splices the statements of a finished sub-block into this builder and
    /// returns an expression for the block's result, if it has one.
    ///
    /// Incoming declarations whose names clash with existing variables are
    /// re-declared under fresh names, and later statements of the spliced
    /// block are rewritten to reference the replacements.
    pub fn append_block(&mut self, name: &str, block: BlockStmt) -> Option<Expr> {
        self.append_block_opt(name, block, true)
    }

    pub fn append_block_opt(
        &mut self,
        name: &str,
        block: BlockStmt,
        optimize: bool,
    ) -> Option<Expr> {
        self.fold_trailing_return();

        enum Last {
            Decl(Parameter),
            Ret(Option<Expr>),
            Other,
        }

        let mut result: Option<Expr> = None;
        let mut replacements: HashMap<ParamId, Expr> = HashMap::new();
        let total = block.statements.len();
        for (i, original) in block.statements.into_iter().enumerate() {
            // Save effort: only substitute once something is mapped.
            let statement = if replacements.is_empty() {
                original
            } else {
                rewrite_stmt(&original, &mut Substitution::new(&replacements))
            };
            let last;
            match statement {
                Stmt::Declaration(decl) if self.variables.contains(&decl.parameter.name) => {
                    let fresh = self.new_name_opt(&decl.parameter.name, optimize);
                    let replacement = match decl.initializer {
                        Some(init) => self.append(&fresh, init),
                        None => {
                            let parameter = Parameter::new(fresh, decl.parameter.ty.clone());
                            self.add(Stmt::Declaration(Declaration {
                                modifiers: decl.modifiers,
                                parameter: parameter.clone(),
                                initializer: None,
                            }));
                            Expr::Parameter(parameter)
                        }
                    };
                    // The replacement can be the incoming parameter itself if
                    // exactly the same declaration was already present here.
                    if !matches!(&replacement, Expr::Parameter(p) if p.id == decl.parameter.id) {
                        replacements.insert(decl.parameter.id, replacement.clone());
                    }
                    result = Some(replacement);
                    last = Last::Other;
                }
                Stmt::Declaration(decl) => {
                    last = Last::Decl(decl.parameter.clone());
                    self.add(Stmt::Declaration(decl));
                }
                Stmt::Return(expr) => {
                    last = Last::Ret(expr.clone());
                    self.add(Stmt::Return(expr));
                }
                other => {
                    last = Last::Other;
                    self.add(other);
                }
            }
            if i + 1 == total {
                match last {
                    Last::Decl(parameter) => result = Some(Expr::Parameter(parameter)),
                    Last::Ret(Some(expr)) => {
                        // The block ends by returning a value; strip the
                        // return and bind the value here instead.
                        self.statements.pop();
                        result = Some(self.append_internal(name, expr, optimize));
                    }
                    Last::Ret(None) | Last::Other => {}
                }
            }
        }
        result
    }

    fn append_internal(&mut self, name: &str, expr: Expr, optimize: bool) -> Expr {
        if is_simple_expression(&expr) {
            // Already simple; no need to declare a variable or even to
            // evaluate the expression.
            return expr;
        }
        if self.optimizing && optimize {
            if let Some(decl) = self.computed_expression(&expr) {
                let parameter = decl.parameter.clone();
                trace!(variable = %parameter.name, "reusing computed expression");
                return Expr::Parameter(parameter);
            }
        }
        let parameter = Parameter::new(self.new_name_opt(name, optimize), expr.ty());
        self.add(Stmt::Declaration(Declaration {
            modifiers: Modifiers::FINAL,
            parameter: parameter.clone(),
            initializer: Some(expr),
        }));
        Expr::Parameter(parameter)
    }

    /// Returns the declaration that already computes `expr`, if any,
    /// consulting the parent chain first.
    pub fn computed_expression(&self, expr: &Expr) -> Option<&Declaration> {
        if let Some(parent) = self.parent {
            if let Some(decl) = parent.computed_expression(expr) {
                return Some(decl);
            }
        }
        if self.optimizing {
            self.expression_for_reuse.get(expr)
        } else {
            None
        }
    }

    fn add_expression_for_reuse(&mut self, decl: Declaration) {
        if is_safe_for_reuse(&decl) {
            // Most recent declaration wins.
            self.expression_for_reuse
                .insert(normalize_declaration(&decl), decl);
        }
    }

    // A trailing `return expr;` becomes `expr;` when more code is appended:
    // the caller is folding a finished block into this one, and its result
    // now flows through the appended expression.
    fn fold_trailing_return(&mut self) {
        if let Some(last) = self.statements.last_mut() {
            if let Stmt::Return(expr) = last {
                *last = match expr.take() {
                    Some(expr) => Stmt::Expression(expr),
                    None => Stmt::Empty,
                };
            }
        }
    }

    /// Creates a variable name unique within this block and all ancestors.
    pub fn new_name(&self, suggestion: &str) -> String {
        let mut candidate = suggestion.to_string();
        let mut i = 0;
        while self.has_variable(&candidate) {
            candidate = format!("{suggestion}{i}");
            i += 1;
        }
        candidate
    }

    /// Like [`BlockBuilder::new_name`]; `optimize = false` prefixes the name
    /// with `_`, which keeps the variable out of inlining and reuse.
    pub fn new_name_opt(&self, suggestion: &str, optimize: bool) -> String {
        if !optimize && !suggestion.starts_with('_') {
            return self.new_name(&format!("_{suggestion}"));
        }
        self.new_name(suggestion)
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains(name) || self.parent.is_some_and(|p| p.has_variable(name))
    }

    /// Returns a block of the statements added so far, optimized when this
    /// builder optimizes. The pass runs once per call; callers that need
    /// further optimization rebuild.
    pub fn to_block(&mut self) -> BlockStmt {
        if self.optimizing {
            self.optimize_statements();
            debug!(statements = self.statements.len(), "optimized block");
        }
        BlockStmt {
            statements: self.statements.clone(),
        }
    }

    /// Use-count pass followed by a rebuild pass: unused declarations are
    /// dropped, single-use declarations are recorded for substitution, and
    /// every surviving statement is substituted and re-optimized.
    fn optimize_statements(&mut self) {
        let mut use_counter = UseCounter::new();
        for stmt in &self.statements {
            if let Stmt::Declaration(decl) = stmt {
                use_counter.register(&decl.parameter);
            }
        }
        for stmt in &self.statements {
            use_counter.count_stmt(stmt);
        }

        let mut sub_map: HashMap<ParamId, Expr> = HashMap::new();
        let old_statements = std::mem::take(&mut self.statements);
        for stmt in old_statements {
            if let Stmt::Declaration(decl) = &stmt {
                let mut count = use_counter.count(&decl.parameter);
                if decl.parameter.name.starts_with('_') {
                    // The caller forced the variable to remain distinct.
                    count = u32::MAX;
                }
                if let Some(Expr::New(new)) = &decl.initializer {
                    if !new.members.is_empty() {
                        // Never inline anonymous class bodies; the generator
                        // cannot reference variables through deep nesting.
                        count = u32::MAX;
                    }
                }
                match count {
                    0 => {
                        // Declared, never used.
                        trace!(variable = %decl.parameter.name, "dropping unused declaration");
                        continue;
                    }
                    1 => {
                        trace!(variable = %decl.parameter.name, "inlining single-use declaration");
                        sub_map.insert(decl.parameter.id, normalize_declaration(decl));
                        continue;
                    }
                    _ => {}
                }
            }
            let stmt = if sub_map.is_empty() {
                stmt
            } else {
                rewrite_stmt(&stmt, &mut Substitution::new(&sub_map))
            };
            let stmt = rewrite_stmt(&stmt, &mut Optimizer);
            if stmt != Stmt::Empty {
                self.statements.push(stmt);
            }
        }
    }
}
