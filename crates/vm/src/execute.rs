//! Main execution loop and opcode dispatch for the IPPcode24 VM.

use crate::error::RuntimeError;
use crate::machine::VM;
use ippcode_common::literal::{decode_escapes_lossy, parse_int};
use ippcode_common::{Argument, DataType, Frame, FrameKind, Instruction, Opcode, Value, Variable};
use std::cmp::Ordering;
use std::io::Write;
use tracing::{debug, info, trace};

impl<'a> VM<'a> {
    /// Execute the program until it runs past its last instruction, EXIT
    /// or error.
    ///
    /// Returns the exit code: 0 on normal completion, or the operand of
    /// EXIT.
    pub fn execute(&mut self) -> Result<i32, RuntimeError> {
        let program = self.program;
        self.pc = program.first_order();
        info!(
            instructions = program.len(),
            labels = program.labels.len(),
            "execution started"
        );

        while let Some(order) = self.pc {
            let Some(instr) = program.get(order) else {
                break;
            };
            self.current = order;
            self.pc = program.next_order(order);
            self.executed += 1;
            debug!(order, opcode = %instr.opcode, "execute");

            match instr.opcode {
                // Frames and function calls
                Opcode::Move => self.exec_move(instr)?,
                Opcode::CreateFrame => self.exec_create_frame(instr)?,
                Opcode::PushFrame => self.exec_push_frame(instr)?,
                Opcode::PopFrame => self.exec_pop_frame(instr)?,
                Opcode::DefVar => self.exec_defvar(instr)?,
                Opcode::Call => self.exec_call(instr)?,
                Opcode::Return => self.exec_return(instr)?,

                // Data stack
                Opcode::PushS => self.exec_pushs(instr)?,
                Opcode::PopS => self.exec_pops(instr)?,

                // Arithmetic, relational, boolean and conversion
                Opcode::Add => self.exec_arithmetic(instr, i64::wrapping_add)?,
                Opcode::Sub => self.exec_arithmetic(instr, i64::wrapping_sub)?,
                Opcode::Mul => self.exec_arithmetic(instr, i64::wrapping_mul)?,
                Opcode::IDiv => self.exec_idiv(instr)?,
                Opcode::Lt => self.exec_relational(instr, Ordering::Less)?,
                Opcode::Gt => self.exec_relational(instr, Ordering::Greater)?,
                Opcode::Eq => self.exec_eq(instr)?,
                Opcode::And => self.exec_logic(instr, |a, b| a && b)?,
                Opcode::Or => self.exec_logic(instr, |a, b| a || b)?,
                Opcode::Not => self.exec_not(instr)?,
                Opcode::Int2Char => self.exec_int2char(instr)?,
                Opcode::Stri2Int => self.exec_stri2int(instr)?,

                // Input / output
                Opcode::Read => self.exec_read(instr)?,
                Opcode::Write => self.exec_write(instr)?,

                // Strings
                Opcode::Concat => self.exec_concat(instr)?,
                Opcode::StrLen => self.exec_strlen(instr)?,
                Opcode::GetChar => self.exec_getchar(instr)?,
                Opcode::SetChar => self.exec_setchar(instr)?,

                // Types
                Opcode::Type => self.exec_type(instr)?,

                // Control flow
                Opcode::Label => self.exec_label(instr)?,
                Opcode::Jump => self.exec_jump(instr)?,
                Opcode::JumpIfEq => self.exec_conditional_jump(instr, true)?,
                Opcode::JumpIfNeq => self.exec_conditional_jump(instr, false)?,
                Opcode::Exit => {
                    let code = self.exec_exit(instr)?;
                    info!(code, executed = self.executed, "program exited");
                    return Ok(code);
                }

                // Debugging
                Opcode::DPrint => self.exec_dprint(instr)?,
                Opcode::Break => self.exec_break(instr)?,
            }
        }

        info!(executed = self.executed, "execution finished");
        Ok(0)
    }

    // ---- Operand groups ----

    /// `<var> <symb>`, the symbol resolved.
    fn unary_operands<'i>(
        &self,
        instr: &'i Instruction,
    ) -> Result<(&'i Variable, Value), RuntimeError> {
        self.expect_arity(instr, 2)?;
        let dest = self.variable(instr, 0)?;
        let arg = self.symbol(instr, 1)?;
        Ok((dest, self.value(instr, arg)?))
    }

    /// `<var> <symb1> <symb2>`, both symbols resolved.
    fn binary_operands<'i>(
        &self,
        instr: &'i Instruction,
    ) -> Result<(&'i Variable, Value, Value), RuntimeError> {
        self.expect_arity(instr, 3)?;
        let dest = self.variable(instr, 0)?;
        let lhs = self.symbol(instr, 1)?;
        let rhs = self.symbol(instr, 2)?;
        Ok((dest, self.value(instr, lhs)?, self.value(instr, rhs)?))
    }

    /// Character position `index` in `text`, checked against its length.
    fn char_index(&self, text: &str, index: i64) -> Result<usize, RuntimeError> {
        let length = text.chars().count();
        usize::try_from(index)
            .ok()
            .filter(|&position| position < length)
            .ok_or(RuntimeError::StringIndexOutOfRange {
                order: self.current,
                index,
                length,
            })
    }

    fn char_at(&self, text: &str, index: i64) -> Result<char, RuntimeError> {
        usize::try_from(index)
            .ok()
            .and_then(|position| text.chars().nth(position))
            .ok_or_else(|| RuntimeError::StringIndexOutOfRange {
                order: self.current,
                index,
                length: text.chars().count(),
            })
    }

    // ---- Frames and function calls ----

    fn exec_move(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        self.expect_arity(instr, 2)?;
        let dest = self.variable(instr, 0)?;
        let value = match instr.arg(1) {
            Some(Argument::Type(ty)) => Value::Str(ty.name().to_string()),
            Some(arg) if arg.is_symbol() => self.value(instr, arg)?,
            _ => return Err(self.operand_type(instr)),
        };
        self.store(dest, value)
    }

    fn exec_create_frame(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        self.expect_arity(instr, 0)?;
        self.temporary = Some(Frame::new());
        trace!("temporary frame created");
        Ok(())
    }

    fn exec_push_frame(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        self.expect_arity(instr, 0)?;
        let frame = self.temporary.take().ok_or(RuntimeError::FrameNotFound {
            order: self.current,
            frame: FrameKind::Temporary,
        })?;
        self.locals.push(frame);
        trace!(depth = self.locals.len(), "frame pushed");
        Ok(())
    }

    fn exec_pop_frame(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        self.expect_arity(instr, 0)?;
        let frame = self.locals.pop().ok_or(RuntimeError::FrameNotFound {
            order: self.current,
            frame: FrameKind::Local,
        })?;
        self.temporary = Some(frame);
        trace!(depth = self.locals.len(), "frame popped");
        Ok(())
    }

    fn exec_defvar(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        self.expect_arity(instr, 1)?;
        let var = self.variable(instr, 0)?;
        let order = self.current;
        if self.frame_mut(var.frame)?.declare(&var.name) {
            trace!(variable = %var, "declared");
            Ok(())
        } else {
            Err(RuntimeError::VariableRedefinition {
                order,
                variable: var.to_string(),
            })
        }
    }

    fn exec_call(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        self.expect_arity(instr, 1)?;
        let label = self.label(instr, 0)?;
        let target = self.jump_target(label)?;
        self.call_stack.push(self.pc);
        trace!(label, target, depth = self.call_stack.len(), "call");
        self.pc = Some(target);
        Ok(())
    }

    fn exec_return(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        self.expect_arity(instr, 0)?;
        let resume = self.call_stack.pop().ok_or(RuntimeError::EmptyCallStack {
            order: self.current,
        })?;
        trace!(?resume, "return");
        self.pc = resume;
        Ok(())
    }

    // ---- Data stack ----

    fn exec_pushs(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        self.expect_arity(instr, 1)?;
        let arg = self.symbol(instr, 0)?;
        let value = self.value(instr, arg)?;
        self.push(value);
        Ok(())
    }

    fn exec_pops(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        self.expect_arity(instr, 1)?;
        let dest = self.variable(instr, 0)?;
        let value = self.pop()?;
        self.store(dest, value)
    }

    // ---- Arithmetic, relational, boolean and conversion ----

    fn exec_arithmetic(
        &mut self,
        instr: &Instruction,
        op: fn(i64, i64) -> i64,
    ) -> Result<(), RuntimeError> {
        let (dest, lhs, rhs) = self.binary_operands(instr)?;
        let result = match (lhs, rhs) {
            (Value::Int(a), Value::Int(b)) => op(a, b),
            _ => return Err(self.operand_type(instr)),
        };
        self.store(dest, Value::Int(result))
    }

    fn exec_idiv(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let (dest, lhs, rhs) = self.binary_operands(instr)?;
        let result = match (lhs, rhs) {
            (Value::Int(_), Value::Int(0)) => {
                return Err(RuntimeError::DivisionByZero {
                    order: self.current,
                });
            }
            (Value::Int(a), Value::Int(b)) => a.wrapping_div(b),
            _ => return Err(self.operand_type(instr)),
        };
        self.store(dest, Value::Int(result))
    }

    /// LT/GT: operands of one non-nil type; strings compare by code point.
    fn exec_relational(&mut self, instr: &Instruction, wanted: Ordering) -> Result<(), RuntimeError> {
        let (dest, lhs, rhs) = self.binary_operands(instr)?;
        let ordering = match (&lhs, &rhs) {
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            _ => return Err(self.operand_type(instr)),
        };
        self.store(dest, Value::Bool(ordering == wanted))
    }

    fn exec_eq(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let (dest, lhs, rhs) = self.binary_operands(instr)?;
        let equal = values_equal(&lhs, &rhs).ok_or_else(|| self.operand_type(instr))?;
        self.store(dest, Value::Bool(equal))
    }

    fn exec_logic(
        &mut self,
        instr: &Instruction,
        op: fn(bool, bool) -> bool,
    ) -> Result<(), RuntimeError> {
        let (dest, lhs, rhs) = self.binary_operands(instr)?;
        match (lhs, rhs) {
            (Value::Bool(a), Value::Bool(b)) => self.store(dest, Value::Bool(op(a, b))),
            _ => Err(self.operand_type(instr)),
        }
    }

    fn exec_not(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let (dest, value) = self.unary_operands(instr)?;
        match value {
            Value::Bool(b) => self.store(dest, Value::Bool(!b)),
            _ => Err(self.operand_type(instr)),
        }
    }

    fn exec_int2char(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let (dest, value) = self.unary_operands(instr)?;
        let Value::Int(code) = value else {
            return Err(self.operand_type(instr));
        };
        let ch = u32::try_from(code)
            .ok()
            .and_then(char::from_u32)
            .ok_or(RuntimeError::InvalidCodePoint {
                order: self.current,
                value: code,
            })?;
        self.store(dest, Value::Str(ch.to_string()))
    }

    fn exec_stri2int(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let (dest, lhs, rhs) = self.binary_operands(instr)?;
        let (Value::Str(text), Value::Int(index)) = (lhs, rhs) else {
            return Err(self.operand_type(instr));
        };
        let ch = self.char_at(&text, index)?;
        self.store(dest, Value::Int(i64::from(u32::from(ch))))
    }

    // ---- Input / output ----

    fn exec_read(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        self.expect_arity(instr, 2)?;
        let dest = self.variable(instr, 0)?;
        let ty = self.data_type(instr, 1)?;
        if ty == DataType::Nil {
            return Err(self.operand_type(instr));
        }

        let line = self.input.next_line().map_err(|e| self.io_error(e))?;
        let value = match line {
            Some(line) => parse_input(ty, &line),
            None => Value::Nil,
        };
        trace!(%ty, value = %value.to_literal(), "read");
        self.store(dest, value)
    }

    fn exec_write(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        self.expect_arity(instr, 1)?;
        let arg = self.symbol(instr, 0)?;
        let value = self.value(instr, arg)?;
        write!(self.stdout, "{value}").map_err(|e| self.io_error(e))
    }

    // ---- Strings ----

    fn exec_concat(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let (dest, lhs, rhs) = self.binary_operands(instr)?;
        match (lhs, rhs) {
            (Value::Str(mut a), Value::Str(b)) => {
                a.push_str(&b);
                self.store(dest, Value::Str(a))
            }
            _ => Err(self.operand_type(instr)),
        }
    }

    fn exec_strlen(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let (dest, value) = self.unary_operands(instr)?;
        let Value::Str(text) = value else {
            return Err(self.operand_type(instr));
        };
        let length = i64::try_from(text.chars().count()).unwrap_or(i64::MAX);
        self.store(dest, Value::Int(length))
    }

    fn exec_getchar(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let (dest, lhs, rhs) = self.binary_operands(instr)?;
        let (Value::Str(text), Value::Int(index)) = (lhs, rhs) else {
            return Err(self.operand_type(instr));
        };
        let ch = self.char_at(&text, index)?;
        self.store(dest, Value::Str(ch.to_string()))
    }

    /// Replace one character of the destination's current string.
    fn exec_setchar(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        self.expect_arity(instr, 3)?;
        let dest = self.variable(instr, 0)?;
        let target = self.symbol(instr, 0)?;
        let index = self.symbol(instr, 1)?;
        let source = self.symbol(instr, 2)?;

        // An unassigned destination is a type error, not a missing value.
        let target = self.value_or_uninit(instr, target)?;
        let index = self.value(instr, index)?;
        let source = self.value(instr, source)?;
        let (Value::Str(text), Value::Int(index), Value::Str(source)) = (target, index, source)
        else {
            return Err(self.operand_type(instr));
        };

        let position = self.char_index(&text, index)?;
        let replacement = source
            .chars()
            .next()
            .ok_or(RuntimeError::EmptySetcharSource {
                order: self.current,
            })?;
        let updated: String = text
            .chars()
            .enumerate()
            .map(|(i, ch)| if i == position { replacement } else { ch })
            .collect();
        self.store(dest, Value::Str(updated))
    }

    // ---- Types ----

    fn exec_type(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        self.expect_arity(instr, 2)?;
        let dest = self.variable(instr, 0)?;
        let arg = self.symbol(instr, 1)?;
        let value = self.value_or_uninit(instr, arg)?;
        self.store(dest, Value::Str(value.type_name().to_string()))
    }

    // ---- Control flow ----

    fn exec_label(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        self.expect_arity(instr, 1)?;
        self.label(instr, 0)?;
        Ok(())
    }

    fn exec_jump(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        self.expect_arity(instr, 1)?;
        let label = self.label(instr, 0)?;
        self.pc = Some(self.jump_target(label)?);
        Ok(())
    }

    /// JUMPIFEQ / JUMPIFNEQ. The label must exist even when the jump is not
    /// taken. An unassigned operand falls through.
    fn exec_conditional_jump(
        &mut self,
        instr: &Instruction,
        jump_if_equal: bool,
    ) -> Result<(), RuntimeError> {
        self.expect_arity(instr, 3)?;
        let label = self.label(instr, 0)?;
        let lhs = self.symbol(instr, 1)?;
        let rhs = self.symbol(instr, 2)?;
        let target = self.jump_target(label)?;

        let lhs = self.value_or_uninit(instr, lhs)?;
        let rhs = self.value_or_uninit(instr, rhs)?;
        if lhs.is_uninit() || rhs.is_uninit() {
            trace!(label, "unassigned operand, not jumping");
            return Ok(());
        }

        let equal = values_equal(&lhs, &rhs).ok_or_else(|| self.operand_type(instr))?;
        if equal == jump_if_equal {
            self.pc = Some(target);
        }
        Ok(())
    }

    fn exec_exit(&mut self, instr: &Instruction) -> Result<i32, RuntimeError> {
        self.expect_arity(instr, 1)?;
        let arg = self.symbol(instr, 0)?;
        match self.value(instr, arg)? {
            Value::Int(code) => i32::try_from(code)
                .ok()
                .filter(|code| (0..=9).contains(code))
                .ok_or(RuntimeError::InvalidExitCode {
                    order: self.current,
                    code,
                }),
            _ => Err(self.operand_type(instr)),
        }
    }

    // ---- Debugging ----

    fn exec_dprint(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        self.expect_arity(instr, 1)?;
        let arg = self.symbol(instr, 0)?;
        let value = self.value(instr, arg)?;
        write!(self.stderr, "{value}").map_err(|e| self.io_error(e))
    }

    fn exec_break(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        self.expect_arity(instr, 0)?;
        let report = self.snapshot();
        self.stderr
            .write_all(report.as_bytes())
            .map_err(|e| self.io_error(e))
    }
}

/// Equality for EQ and the conditional jumps. Values of one type compare
/// by value and `nil` compares with anything; other mixes are `None`.
fn values_equal(lhs: &Value, rhs: &Value) -> Option<bool> {
    match (lhs, rhs) {
        (Value::Nil, _) | (_, Value::Nil) => Some(lhs == rhs),
        (Value::Int(a), Value::Int(b)) => Some(a == b),
        (Value::Bool(a), Value::Bool(b)) => Some(a == b),
        (Value::Str(a), Value::Str(b)) => Some(a == b),
        _ => None,
    }
}

/// Convert a line read by READ. Anything that is not a valid value of the
/// requested type becomes `nil`; an empty line is `""` for strings. String
/// lines have their `\DDD` escapes decoded like string operands.
fn parse_input(ty: DataType, line: &str) -> Value {
    match ty {
        DataType::String => Value::Str(decode_escapes_lossy(line)),
        DataType::Int => parse_int(line.trim()).map_or(Value::Nil, Value::Int),
        DataType::Bool => {
            if line.eq_ignore_ascii_case("true") {
                Value::Bool(true)
            } else if line.eq_ignore_ascii_case("false") {
                Value::Bool(false)
            } else {
                Value::Nil
            }
        }
        DataType::Nil => Value::Nil,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_rules() {
        assert_eq!(values_equal(&Value::Int(1), &Value::Int(1)), Some(true));
        assert_eq!(values_equal(&Value::Nil, &Value::Nil), Some(true));
        assert_eq!(values_equal(&Value::Nil, &Value::Int(0)), Some(false));
        assert_eq!(
            values_equal(&Value::Str("a".into()), &Value::Nil),
            Some(false)
        );
        assert_eq!(values_equal(&Value::Int(1), &Value::Bool(true)), None);
        assert_eq!(values_equal(&Value::Str("1".into()), &Value::Int(1)), None);
    }

    #[test]
    fn read_int() {
        assert_eq!(parse_input(DataType::Int, " 42 "), Value::Int(42));
        assert_eq!(parse_input(DataType::Int, "-0x10"), Value::Int(-16));
        assert_eq!(parse_input(DataType::Int, "4 2"), Value::Nil);
        assert_eq!(parse_input(DataType::Int, "forty"), Value::Nil);
        assert_eq!(parse_input(DataType::Int, ""), Value::Nil);
    }

    #[test]
    fn read_bool() {
        assert_eq!(parse_input(DataType::Bool, "TRUE"), Value::Bool(true));
        assert_eq!(parse_input(DataType::Bool, "false"), Value::Bool(false));
        assert_eq!(parse_input(DataType::Bool, "yes"), Value::Nil);
        assert_eq!(parse_input(DataType::Bool, "true "), Value::Nil);
        assert_eq!(parse_input(DataType::Bool, ""), Value::Nil);
    }

    #[test]
    fn read_string_decodes_escapes() {
        assert_eq!(
            parse_input(DataType::String, r"ab\065c"),
            Value::Str("abAc".into())
        );
        assert_eq!(
            parse_input(DataType::String, r"a\032b #"),
            Value::Str("a b #".into())
        );
        assert_eq!(
            parse_input(DataType::String, r"tab\9 end\"),
            Value::Str(r"tab\9 end\".into())
        );
        assert_eq!(parse_input(DataType::String, ""), Value::Str(String::new()));
    }
}
