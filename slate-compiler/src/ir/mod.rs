//! The IR being built: an in-memory, LLVM-compatible module.
//!
//! The semantic translator drives this through opaque handles and never
//! inspects the structures behind them. `Module` renders to textual IR that
//! `llc` accepts directly.

use std::fmt;

use num_bigint::BigInt;

/// A target-level type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ty {
    Void,
    Int(u32),
    Ptr(Box<Ty>),
    Func { params: Vec<Ty>, ret: Box<Ty> },
    Array { elem: Box<Ty>, len: usize },
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Void => write!(f, "void"),
            Ty::Int(bits) => write!(f, "i{bits}"),
            Ty::Ptr(inner) => write!(f, "{inner}*"),
            Ty::Func { params, ret } => {
                write!(f, "{ret} (")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ")")
            }
            Ty::Array { elem, len } => write!(f, "[{len} x {elem}]"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlobalId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FuncId(usize);

/// A position inside a function's block list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockId {
    func: FuncId,
    block: usize,
}

/// A value handle: constants are self-describing, everything else refers
/// back into the module.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Global(GlobalId),
    Func(FuncId),
    /// An instruction result, rendered `%t<n>`.
    Local { index: usize, ty: Ty },
    ConstInt { ty: Ty, value: BigInt },
    /// A null pointer of the given pointer type.
    Null(Ty),
    /// A byte aggregate, used only as a global initializer (`c"..."`).
    Bytes(Vec<u8>),
    /// Constant GEP to the first element of a byte-array global.
    GepFirst(GlobalId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linkage {
    Default,
    External,
}

#[derive(Debug, Clone)]
pub struct Global {
    pub name: String,
    pub ty: Ty,
    pub init: Value,
}

#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub ty: Ty,
    pub linkage: Linkage,
    blocks: Vec<Block>,
    next_local: usize,
}

#[derive(Debug, Clone)]
struct Block {
    label: String,
    instrs: Vec<Instr>,
}

#[derive(Debug, Clone)]
enum Instr {
    Call {
        result: Option<usize>,
        callee: Value,
        args: Vec<Value>,
    },
    Ret(Value),
    RetVoid,
}

/// The module under construction.
#[derive(Debug, Clone)]
pub struct Module {
    pub name: String,
    triple: Option<String>,
    data_layout: Option<String>,
    globals: Vec<Global>,
    functions: Vec<Function>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            triple: None,
            data_layout: None,
            globals: Vec::new(),
            functions: Vec::new(),
        }
    }

    pub fn set_target(&mut self, triple: impl Into<String>) {
        self.triple = Some(triple.into());
    }

    pub fn set_data_layout(&mut self, layout: impl Into<String>) {
        self.data_layout = Some(layout.into());
    }

    pub fn add_function(&mut self, name: impl Into<String>, ty: Ty, linkage: Linkage) -> FuncId {
        self.functions.push(Function {
            name: name.into(),
            ty,
            linkage,
            blocks: Vec::new(),
            next_local: 0,
        });
        FuncId(self.functions.len() - 1)
    }

    /// Create a module-level constant global with the given initializer.
    pub fn add_global_const(&mut self, name: impl Into<String>, ty: Ty, init: Value) -> GlobalId {
        self.globals.push(Global {
            name: name.into(),
            ty,
            init,
        });
        GlobalId(self.globals.len() - 1)
    }

    pub fn append_block(&mut self, func: FuncId, label: impl Into<String>) -> BlockId {
        let f = &mut self.functions[func.0];
        f.blocks.push(Block {
            label: label.into(),
            instrs: Vec::new(),
        });
        BlockId {
            func,
            block: f.blocks.len() - 1,
        }
    }

    pub fn global(&self, id: GlobalId) -> &Global {
        &self.globals[id.0]
    }

    pub fn function(&self, id: FuncId) -> &Function {
        &self.functions[id.0]
    }

    pub fn globals(&self) -> impl Iterator<Item = &Global> {
        self.globals.iter()
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.iter()
    }

    /// The type of a value when used as an operand. Globals and functions are
    /// referenced through pointers, as in LLVM.
    pub fn value_ty(&self, v: &Value) -> Ty {
        match v {
            Value::Global(id) => Ty::Ptr(Box::new(self.globals[id.0].ty.clone())),
            Value::Func(id) => Ty::Ptr(Box::new(self.functions[id.0].ty.clone())),
            Value::Local { ty, .. } => ty.clone(),
            Value::ConstInt { ty, .. } => ty.clone(),
            Value::Null(ty) => ty.clone(),
            Value::Bytes(bytes) => Ty::Array {
                elem: Box::new(Ty::Int(8)),
                len: bytes.len(),
            },
            Value::GepFirst(id) => match &self.globals[id.0].ty {
                Ty::Array { elem, .. } => Ty::Ptr(elem.clone()),
                other => Ty::Ptr(Box::new(other.clone())),
            },
        }
    }

    fn render_value(&self, v: &Value) -> String {
        match v {
            Value::Global(id) => format!("@{}", self.globals[id.0].name),
            Value::Func(id) => format!("@{}", self.functions[id.0].name),
            Value::Local { index, .. } => format!("%t{index}"),
            Value::ConstInt { value, .. } => value.to_string(),
            Value::Null(_) => "null".to_string(),
            Value::Bytes(bytes) => format!("c\"{}\"", escape_bytes(bytes)),
            Value::GepFirst(id) => {
                let g = &self.globals[id.0];
                format!(
                    "getelementptr inbounds ({ty}, {ty}* @{name}, i64 0, i64 0)",
                    ty = g.ty,
                    name = g.name
                )
            }
        }
    }

    fn render_operand(&self, v: &Value) -> String {
        format!("{} {}", self.value_ty(v), self.render_value(v))
    }

    fn render_instr(&self, instr: &Instr) -> String {
        match instr {
            Instr::Call {
                result,
                callee,
                args,
            } => {
                let (ret, callee_text) = match callee {
                    Value::Func(id) => {
                        let f = &self.functions[id.0];
                        let ret = match &f.ty {
                            Ty::Func { ret, .. } => (**ret).clone(),
                            _ => Ty::Void,
                        };
                        (ret, format!("@{}", f.name))
                    }
                    other => (self.value_ty(other), self.render_value(other)),
                };
                let args = args
                    .iter()
                    .map(|a| self.render_operand(a))
                    .collect::<Vec<_>>()
                    .join(", ");
                match result {
                    Some(index) => format!("%t{index} = call {ret} {callee_text}({args})"),
                    None => format!("call {ret} {callee_text}({args})"),
                }
            }
            Instr::Ret(v) => format!("ret {}", self.render_operand(v)),
            Instr::RetVoid => "ret void".to_string(),
        }
    }

    fn render_signature(&self, f: &Function) -> String {
        let (params, ret) = match &f.ty {
            Ty::Func { params, ret } => (params.clone(), (**ret).clone()),
            other => (Vec::new(), other.clone()),
        };
        let params = params
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        format!("{ret} @{name}({params})", name = f.name)
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; ModuleID = '{}'", self.name)?;
        writeln!(f, "source_filename = \"{}\"", self.name)?;
        if let Some(layout) = &self.data_layout {
            writeln!(f, "target datalayout = \"{layout}\"")?;
        }
        if let Some(triple) = &self.triple {
            writeln!(f, "target triple = \"{triple}\"")?;
        }
        for g in &self.globals {
            writeln!(f)?;
            // Synthesized constants are translation-unit-local.
            writeln!(
                f,
                "@{} = private constant {} {}",
                g.name,
                g.ty,
                self.render_value(&g.init)
            )?;
        }
        for func in &self.functions {
            writeln!(f)?;
            if func.linkage == Linkage::External {
                writeln!(f, "declare {}", self.render_signature(func))?;
                continue;
            }
            writeln!(f, "define {} {{", self.render_signature(func))?;
            for block in &func.blocks {
                writeln!(f, "{}:", block.label)?;
                for instr in &block.instrs {
                    writeln!(f, "  {}", self.render_instr(instr))?;
                }
            }
            writeln!(f, "}}")?;
        }
        Ok(())
    }
}

fn escape_bytes(bytes: &[u8]) -> String {
    let mut out = String::new();
    for &b in bytes {
        if (0x20..=0x7e).contains(&b) && b != b'"' && b != b'\\' {
            out.push(b as char);
        } else {
            out.push_str(&format!("\\{b:02X}"));
        }
    }
    out
}

/// Appends instructions at the end of a block.
#[derive(Debug, Clone, Copy, Default)]
pub struct Builder {
    at: Option<BlockId>,
}

impl Builder {
    pub fn new() -> Self {
        Self { at: None }
    }

    pub fn position_at_end(&mut self, block: BlockId) {
        self.at = Some(block);
    }

    fn push(&self, module: &mut Module, instr: Instr) {
        let at = self.at.expect("builder is not positioned at a block");
        module.functions[at.func.0].blocks[at.block].instrs.push(instr);
    }

    /// Emit a call. Returns the result value, or `None` for void callees.
    pub fn build_call(&self, module: &mut Module, callee: Value, args: Vec<Value>) -> Option<Value> {
        let at = self.at.expect("builder is not positioned at a block");
        let ret = match &callee {
            Value::Func(id) => match &module.functions[id.0].ty {
                Ty::Func { ret, .. } => (**ret).clone(),
                _ => Ty::Void,
            },
            other => module.value_ty(other),
        };
        let result = if ret == Ty::Void {
            None
        } else {
            let f = &mut module.functions[at.func.0];
            let index = f.next_local;
            f.next_local += 1;
            Some(index)
        };
        self.push(
            module,
            Instr::Call {
                result,
                callee,
                args,
            },
        );
        result.map(|index| Value::Local { index, ty: ret })
    }

    pub fn build_ret(&self, module: &mut Module, value: Value) {
        self.push(module, Instr::Ret(value));
    }

    pub fn build_ret_void(&self, module: &mut Module) {
        self.push(module, Instr::RetVoid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_rendering() {
        let i8ptr = Ty::Ptr(Box::new(Ty::Int(8)));
        assert_eq!(i8ptr.to_string(), "i8*");
        let f = Ty::Func {
            params: vec![i8ptr],
            ret: Box::new(Ty::Void),
        };
        assert_eq!(f.to_string(), "void (i8*)");
        let a = Ty::Array {
            elem: Box::new(Ty::Int(8)),
            len: 3,
        };
        assert_eq!(a.to_string(), "[3 x i8]");
    }

    #[test]
    fn byte_escaping() {
        assert_eq!(escape_bytes(b"hi\0"), "hi\\00");
        assert_eq!(escape_bytes(b"a\"b\\c\n"), "a\\22b\\5Cc\\0A");
    }

    #[test]
    fn module_rendering() {
        let mut m = Module::new("main");
        m.set_target("x86_64-apple-darwin");
        m.set_data_layout("e-p:64:64:64");

        let arr = Ty::Array {
            elem: Box::new(Ty::Int(8)),
            len: 3,
        };
        let g = m.add_global_const("p.uint8.0", arr, Value::Bytes(b"hi\0".to_vec()));

        let puts_ty = Ty::Func {
            params: vec![Ty::Ptr(Box::new(Ty::Int(8)))],
            ret: Box::new(Ty::Void),
        };
        let puts = m.add_function("puts", puts_ty, Linkage::External);

        let main_ty = Ty::Func {
            params: vec![],
            ret: Box::new(Ty::Void),
        };
        let main = m.add_function("main", main_ty, Linkage::Default);
        let entry = m.append_block(main, "entry");

        let mut b = Builder::new();
        b.position_at_end(entry);
        let res = b.build_call(&mut m, Value::Func(puts), vec![Value::GepFirst(g)]);
        assert!(res.is_none(), "void call has no result");
        b.build_ret_void(&mut m);

        let text = m.to_string();
        assert!(text.contains("target triple = \"x86_64-apple-darwin\""));
        assert!(text.contains("@p.uint8.0 = private constant [3 x i8] c\"hi\\00\""));
        assert!(text.contains("declare void @puts(i8*)"));
        assert!(text.contains("define void @main() {"));
        assert!(text.contains(
            "call void @puts(i8* getelementptr inbounds ([3 x i8], [3 x i8]* @p.uint8.0, i64 0, i64 0))"
        ));
        assert!(text.contains("ret void"));
    }

    #[test]
    fn call_results_number_per_function() {
        let mut m = Module::new("m");
        let f_ty = Ty::Func {
            params: vec![],
            ret: Box::new(Ty::Int(64)),
        };
        let callee = m.add_function("g", f_ty.clone(), Linkage::External);
        let main = m.add_function("main", f_ty, Linkage::Default);
        let entry = m.append_block(main, "entry");

        let mut b = Builder::new();
        b.position_at_end(entry);
        let r0 = b.build_call(&mut m, Value::Func(callee), vec![]).unwrap();
        let r1 = b.build_call(&mut m, Value::Func(callee), vec![]).unwrap();
        assert_eq!(m.render_value(&r0), "%t0");
        assert_eq!(m.render_value(&r1), "%t1");
        b.build_ret(&mut m, r1);

        let text = m.to_string();
        assert!(text.contains("%t0 = call i64 @g()"));
        assert!(text.contains("ret i64 %t1"));
    }
}
