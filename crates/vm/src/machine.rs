//! VM state management: frames, stacks, operand access.

use crate::error::RuntimeError;
use crate::input::LineSource;
use ippcode_common::{Argument, DataType, Frame, FrameKind, Instruction, Program, Value, Variable};
use std::io::{self, Write};
use tracing::trace;

/// The IPPcode24 virtual machine.
pub struct VM<'a> {
    /// The program being executed.
    pub(crate) program: &'a Program,
    /// Line source for READ.
    pub(crate) input: Box<dyn LineSource + 'a>,
    /// Sink for WRITE.
    pub(crate) stdout: Box<dyn Write + 'a>,
    /// Sink for DPRINT and BREAK.
    pub(crate) stderr: Box<dyn Write + 'a>,
    /// Order of the next instruction to run; `None` halts.
    pub(crate) pc: Option<u64>,
    /// Order of the instruction being executed.
    pub(crate) current: u64,
    /// Number of instructions executed so far.
    pub(crate) executed: u64,
    pub(crate) global: Frame,
    pub(crate) temporary: Option<Frame>,
    /// Local frame stack; the last element is `LF`.
    pub(crate) locals: Vec<Frame>,
    /// Return orders pushed by CALL. `None` returns past the last instruction.
    pub(crate) call_stack: Vec<Option<u64>>,
    pub(crate) data_stack: Vec<Value>,
}

impl<'a> VM<'a> {
    /// Create a VM with no input and discarded output.
    pub fn new(program: &'a Program) -> Self {
        Self {
            program,
            input: Box::new(io::empty()),
            stdout: Box::new(io::sink()),
            stderr: Box::new(io::sink()),
            pc: None,
            current: 0,
            executed: 0,
            global: Frame::new(),
            temporary: None,
            locals: Vec::new(),
            call_stack: Vec::new(),
            data_stack: Vec::new(),
        }
    }

    /// Builder: set the READ input.
    pub fn with_input(mut self, input: impl LineSource + 'a) -> Self {
        self.input = Box::new(input);
        self
    }

    /// Builder: set the WRITE sink.
    pub fn with_stdout(mut self, stdout: impl Write + 'a) -> Self {
        self.stdout = Box::new(stdout);
        self
    }

    /// Builder: set the diagnostic sink.
    pub fn with_stderr(mut self, stderr: impl Write + 'a) -> Self {
        self.stderr = Box::new(stderr);
        self
    }

    /// The global frame.
    pub fn global_frame(&self) -> &Frame {
        &self.global
    }

    /// The data stack, bottom first.
    pub fn data_stack(&self) -> &[Value] {
        &self.data_stack
    }

    /// State report written by BREAK: position, stack depths and every
    /// variable of every live frame, local frames from the bottom up.
    pub fn snapshot(&self) -> String {
        let mut out = format!(
            "BREAK at order {} after {} instruction(s)\n\
             local frames: {}, call stack: {}, data stack: {}\n",
            self.current,
            self.executed,
            self.locals.len(),
            self.call_stack.len(),
            self.data_stack.len(),
        );
        describe_frame(&mut out, "GF", &self.global);
        match &self.temporary {
            Some(frame) => describe_frame(&mut out, "TF", frame),
            None => out.push_str("TF: absent\n"),
        }
        for (depth, frame) in self.locals.iter().enumerate() {
            describe_frame(&mut out, &format!("LF[{depth}]"), frame);
        }
        if !self.data_stack.is_empty() {
            let values: Vec<String> = self.data_stack.iter().map(Value::to_literal).collect();
            out.push_str(&format!("data: {}\n", values.join(" ")));
        }
        out
    }

    // ---- Frames ----

    pub(crate) fn frame(&self, kind: FrameKind) -> Result<&Frame, RuntimeError> {
        let frame = match kind {
            FrameKind::Global => Some(&self.global),
            FrameKind::Local => self.locals.last(),
            FrameKind::Temporary => self.temporary.as_ref(),
        };
        frame.ok_or(RuntimeError::FrameNotFound {
            order: self.current,
            frame: kind,
        })
    }

    pub(crate) fn frame_mut(&mut self, kind: FrameKind) -> Result<&mut Frame, RuntimeError> {
        let order = self.current;
        let frame = match kind {
            FrameKind::Global => Some(&mut self.global),
            FrameKind::Local => self.locals.last_mut(),
            FrameKind::Temporary => self.temporary.as_mut(),
        };
        frame.ok_or(RuntimeError::FrameNotFound { order, frame: kind })
    }

    /// Current value of a declared variable, possibly `Uninit`.
    pub(crate) fn lookup(&self, var: &Variable) -> Result<&Value, RuntimeError> {
        self.frame(var.frame)?
            .get(&var.name)
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                order: self.current,
                variable: var.to_string(),
            })
    }

    /// Assign a declared variable.
    pub(crate) fn store(&mut self, var: &Variable, value: Value) -> Result<(), RuntimeError> {
        let order = self.current;
        trace!(variable = %var, value = %value.to_literal(), "store");
        if self.frame_mut(var.frame)?.set(&var.name, value) {
            Ok(())
        } else {
            Err(RuntimeError::UndefinedVariable {
                order,
                variable: var.to_string(),
            })
        }
    }

    // ---- Operand shapes ----

    pub(crate) fn operand_type(&self, instr: &Instruction) -> RuntimeError {
        RuntimeError::OperandType {
            order: self.current,
            opcode: instr.opcode,
        }
    }

    /// Fail unless exactly the first `count` operand slots are filled.
    pub(crate) fn expect_arity(&self, instr: &Instruction, count: usize) -> Result<(), RuntimeError> {
        if instr.has_arity(count) {
            Ok(())
        } else {
            Err(RuntimeError::OperandCount {
                order: self.current,
                opcode: instr.opcode,
                expected: count,
                found: instr.arity(),
            })
        }
    }

    /// Operand `index` as a variable.
    pub(crate) fn variable<'i>(
        &self,
        instr: &'i Instruction,
        index: usize,
    ) -> Result<&'i Variable, RuntimeError> {
        match instr.arg(index) {
            Some(Argument::Var(var)) => Ok(var),
            _ => Err(self.operand_type(instr)),
        }
    }

    /// Operand `index` as a variable or constant.
    pub(crate) fn symbol<'i>(
        &self,
        instr: &'i Instruction,
        index: usize,
    ) -> Result<&'i Argument, RuntimeError> {
        match instr.arg(index) {
            Some(arg) if arg.is_symbol() => Ok(arg),
            _ => Err(self.operand_type(instr)),
        }
    }

    /// Operand `index` as a label name.
    pub(crate) fn label<'i>(
        &self,
        instr: &'i Instruction,
        index: usize,
    ) -> Result<&'i str, RuntimeError> {
        match instr.arg(index) {
            Some(Argument::Label(name)) => Ok(name),
            _ => Err(self.operand_type(instr)),
        }
    }

    /// Operand `index` as a type name.
    pub(crate) fn data_type(
        &self,
        instr: &Instruction,
        index: usize,
    ) -> Result<DataType, RuntimeError> {
        match instr.arg(index) {
            Some(Argument::Type(ty)) => Ok(*ty),
            _ => Err(self.operand_type(instr)),
        }
    }

    /// Order bound to `label`.
    pub(crate) fn jump_target(&self, label: &str) -> Result<u64, RuntimeError> {
        self.program
            .label(label)
            .ok_or_else(|| RuntimeError::UndefinedLabel {
                order: self.current,
                label: label.to_string(),
            })
    }

    // ---- Operand values ----

    /// Value of a symbol operand. Reading an unassigned variable fails.
    pub(crate) fn value(&self, instr: &Instruction, arg: &Argument) -> Result<Value, RuntimeError> {
        match self.value_or_uninit(instr, arg)? {
            Value::Uninit => Err(RuntimeError::UninitializedVariable {
                order: self.current,
                variable: arg.to_string(),
            }),
            value => Ok(value),
        }
    }

    /// Value of a symbol operand, `Uninit` included.
    pub(crate) fn value_or_uninit(
        &self,
        instr: &Instruction,
        arg: &Argument,
    ) -> Result<Value, RuntimeError> {
        match arg {
            Argument::Var(var) => self.lookup(var).cloned(),
            Argument::Const(value) => Ok(value.clone()),
            Argument::Label(_) | Argument::Type(_) => Err(self.operand_type(instr)),
        }
    }

    // ---- Stacks ----

    pub(crate) fn push(&mut self, value: Value) {
        trace!(value = %value.to_literal(), depth = self.data_stack.len() + 1, "push");
        self.data_stack.push(value);
    }

    pub(crate) fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.data_stack
            .pop()
            .ok_or(RuntimeError::EmptyDataStack {
                order: self.current,
            })
    }

    // ---- I/O ----

    pub(crate) fn io_error(&self, err: io::Error) -> RuntimeError {
        RuntimeError::Io {
            order: self.current,
            message: err.to_string(),
        }
    }
}

fn describe_frame(out: &mut String, title: &str, frame: &Frame) {
    out.push_str(&format!("{title}: {} variable(s)\n", frame.len()));
    for (name, value) in frame.iter() {
        out.push_str(&format!("  {name} = {}\n", value.to_literal()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ippcode_common::Opcode;

    fn gf(name: &str) -> Variable {
        Variable::new(FrameKind::Global, name)
    }

    #[test]
    fn only_global_frame_exists_initially() {
        let program = Program::default();
        let vm = VM::new(&program);
        assert!(vm.frame(FrameKind::Global).is_ok());
        assert!(matches!(
            vm.frame(FrameKind::Local),
            Err(RuntimeError::FrameNotFound {
                frame: FrameKind::Local,
                ..
            })
        ));
        assert!(matches!(
            vm.frame(FrameKind::Temporary),
            Err(RuntimeError::FrameNotFound { .. })
        ));
    }

    #[test]
    fn store_requires_declaration() {
        let program = Program::default();
        let mut vm = VM::new(&program);
        assert!(matches!(
            vm.store(&gf("x"), Value::Int(1)),
            Err(RuntimeError::UndefinedVariable { .. })
        ));
        vm.global.declare("x");
        vm.store(&gf("x"), Value::Int(1)).unwrap();
        assert_eq!(vm.lookup(&gf("x")).unwrap(), &Value::Int(1));
    }

    #[test]
    fn reading_unassigned_variable() {
        let program = Program::default();
        let mut vm = VM::new(&program);
        vm.global.declare("x");
        let instr = Instruction::with_args(1, Opcode::Write, vec![Argument::Var(gf("x"))]);
        let arg = instr.arg(0).unwrap();
        assert_eq!(vm.value_or_uninit(&instr, arg).unwrap(), Value::Uninit);
        assert!(matches!(
            vm.value(&instr, arg),
            Err(RuntimeError::UninitializedVariable { .. })
        ));
    }

    #[test]
    fn operand_shapes() {
        let program = Program::default();
        let vm = VM::new(&program);
        let instr = Instruction::with_args(
            1,
            Opcode::JumpIfEq,
            vec![
                Argument::Label("end".into()),
                Argument::Const(Value::Nil),
                Argument::Type(DataType::Int),
            ],
        );
        assert_eq!(vm.label(&instr, 0).unwrap(), "end");
        assert!(vm.symbol(&instr, 1).is_ok());
        assert!(vm.symbol(&instr, 2).is_err());
        assert!(vm.variable(&instr, 0).is_err());
        assert_eq!(vm.data_type(&instr, 2).unwrap(), DataType::Int);
        assert!(vm.expect_arity(&instr, 3).is_ok());
        assert!(matches!(
            vm.expect_arity(&instr, 2),
            Err(RuntimeError::OperandCount {
                expected: 2,
                found: 3,
                ..
            })
        ));
    }

    #[test]
    fn snapshot_lists_frames() {
        let program = Program::default();
        let mut vm = VM::new(&program);
        vm.global.declare("x");
        vm.global.set("x", Value::Int(5));
        vm.global.declare("y");
        vm.locals.push(Frame::new());
        vm.push(Value::Str("s".into()));

        let report = vm.snapshot();
        assert!(report.contains("local frames: 1, call stack: 0, data stack: 1"));
        assert!(report.contains("GF: 2 variable(s)\n  x = int@5\n  y = (uninitialized)\n"));
        assert!(report.contains("TF: absent"));
        assert!(report.contains("LF[0]: 0 variable(s)"));
        assert!(report.contains("data: string@s"));
    }

    #[test]
    fn pop_empty_data_stack() {
        let program = Program::default();
        let mut vm = VM::new(&program);
        assert_eq!(vm.pop(), Err(RuntimeError::EmptyDataStack { order: 0 }));
        vm.push(Value::Bool(true));
        assert_eq!(vm.pop(), Ok(Value::Bool(true)));
    }
}
